//! Periodic snapshot broadcast
//!
//! One snapshot is generated per period and pushed to every registered
//! connection. New connections get a one-sample catch-up, and any connection
//! may ask for the latest sample again without disturbing the period.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::generator::SnapshotGenerator;
use super::registry::{deliver, ConnectionRegistry, Delivery, Outbox};
use crate::error::{DashboardError, Result};
use crate::models::{ConnectionId, Frame, ServerMessage, Snapshot};

/// Default broadcast period
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_millis(2000);

/// The most recent snapshot and its encoded `data` frame.
///
/// Encoded once; every broadcast and resend reuses the same bytes.
#[derive(Clone)]
struct Published {
    snapshot: Arc<Snapshot>,
    frame: Frame,
}

/// Broadcast scheduler
pub struct BroadcastScheduler {
    registry: ConnectionRegistry,
    generator: Box<dyn SnapshotGenerator>,
    period: Duration,
    /// Lock order: `latest` before any registry access. Holding it across
    /// join and tick keeps catch-up and broadcast from interleaving.
    latest: Mutex<Option<Published>>,
}

impl BroadcastScheduler {
    pub fn new(generator: Box<dyn SnapshotGenerator>, period: Duration) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            generator,
            period,
            latest: Mutex::new(None),
        }
    }

    fn publish(&self) -> Result<Published> {
        let snapshot = self.generator.generate();
        let frame = ServerMessage::encode_data(&snapshot)?;
        Ok(Published {
            snapshot: Arc::new(snapshot),
            frame,
        })
    }

    fn latest_or_publish(&self, latest: &mut Option<Published>) -> Result<Published> {
        if let Some(published) = latest.as_ref() {
            return Ok(published.clone());
        }
        let published = self.publish()?;
        *latest = Some(published.clone());
        Ok(published)
    }

    /// Generate one snapshot and deliver it to every current member
    pub fn tick(&self) -> Result<Arc<Snapshot>> {
        // Generate under the lock, or a concurrent first join can publish a
        // newer sample ahead of this one.
        let (published, members) = {
            let mut latest = self.latest.lock();
            let published = self.publish()?;
            *latest = Some(published.clone());
            (published, self.registry.snapshot_members())
        };

        let mut dropped = 0usize;
        for (id, outbox) in &members {
            if deliver(id, outbox, published.frame.clone()) == Delivery::Dropped {
                dropped += 1;
            }
        }

        debug!(
            "Broadcast snapshot to {} viewers ({} dropped)",
            members.len(),
            dropped
        );

        Ok(published.snapshot)
    }

    /// Register a connection and send it the catch-up snapshot.
    ///
    /// The catch-up is the latest snapshot, or a freshly generated one if
    /// nothing has been published yet. It is queued before the connection
    /// becomes visible to `tick`, so the viewer never sees an older sample
    /// after a newer one and never gets the same tick twice.
    pub fn join(&self, id: ConnectionId, outbox: Outbox) -> Result<Arc<Snapshot>> {
        let mut latest = self.latest.lock();
        let published = self.latest_or_publish(&mut latest)?;

        if !self.registry.register(id, outbox.clone()) {
            warn!("Connection {} already registered, skipping catch-up", id);
            return Ok(published.snapshot);
        }
        deliver(&id, &outbox, published.frame);

        info!(
            "Viewer {} joined ({} connected)",
            id,
            self.registry.len()
        );
        Ok(published.snapshot)
    }

    /// Remove a connection. Returns `false` if it was not registered.
    pub fn leave(&self, id: &ConnectionId) -> bool {
        let removed = self.registry.unregister(id);
        if removed {
            info!("Viewer {} left ({} connected)", id, self.registry.len());
        }
        removed
    }

    /// Send the latest snapshot to one connection only.
    ///
    /// Does not generate a new sample (unless none exists) and does not touch
    /// the period, so repeated resends carry identical bytes until the next tick.
    pub fn resend(&self, id: &ConnectionId) -> Result<Arc<Snapshot>> {
        let mut latest = self.latest.lock();
        let outbox = self
            .registry
            .outbox(id)
            .ok_or(DashboardError::UnknownConnection(*id))?;
        let published = self.latest_or_publish(&mut latest)?;

        debug!("Resending latest snapshot to {}", id);
        deliver(id, &outbox, published.frame);
        Ok(published.snapshot)
    }

    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.lock().as_ref().map(|p| p.snapshot.clone())
    }

    pub fn viewer_count(&self) -> usize {
        self.registry.len()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Run the periodic broadcast until shutdown (call in a spawned task)
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting broadcast scheduler with {}ms period",
            self.period.as_millis()
        );

        // First broadcast one full period after start, like a plain interval timer.
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick() {
                        error!("Broadcast tick failed: {}", e);
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Broadcast scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// Handle for stopping the broadcast scheduler
pub struct BroadcastHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl BroadcastHandle {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { shutdown_tx: tx }, rx)
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Default for BroadcastHandle {
    fn default() -> Self {
        Self::new().0
    }
}
