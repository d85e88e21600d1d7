//! Connection registry
//!
//! Tracks every open viewer connection together with its bounded outbox.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use crate::models::{ConnectionId, Frame};

/// Sending half of a connection's outbound frame queue
pub type Outbox = mpsc::Sender<Frame>;

/// Outcome of pushing one frame to one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Outbox full, frame dropped for this viewer only
    Dropped,
    /// Socket task already gone; it unregisters itself
    Closed,
}

/// Set of currently open viewer connections
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Outbox>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Add a connection. Returns `false` (and keeps the existing outbox) if already present.
    pub fn register(&self, id: ConnectionId, outbox: Outbox) -> bool {
        match self.connections.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(outbox);
                true
            }
        }
    }

    /// Remove a connection. Returns `false` if it was not registered.
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        self.connections.remove(id).is_some()
    }

    /// Copy of the member set at call time.
    ///
    /// Callers deliver against the copy, so registrations racing with a
    /// broadcast never mutate the collection being iterated.
    pub fn snapshot_members(&self) -> Vec<(ConnectionId, Outbox)> {
        self.connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn outbox(&self, id: &ConnectionId) -> Option<Outbox> {
        self.connections.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// Fire-and-forget push of one frame
pub fn deliver(id: &ConnectionId, outbox: &Outbox, frame: Frame) -> Delivery {
    match outbox.try_send(frame) {
        Ok(()) => Delivery::Sent,
        Err(mpsc::error::TrySendError::Full(_)) => {
            debug!("Outbox full for {}, dropping frame", id);
            Delivery::Dropped
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("Outbox closed for {}", id);
            Delivery::Closed
        }
    }
}
