//! Bounded sliding history of received snapshots

use std::collections::VecDeque;
use std::sync::Arc;

use crate::models::Snapshot;

/// Default number of snapshots retained for trend views
pub const DEFAULT_MAX_HISTORY_LENGTH: usize = 50;

/// FIFO buffer of snapshots in arrival order.
///
/// Never holds more than `capacity` entries; appending to a full buffer
/// evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    entries: VecDeque<Arc<Snapshot>>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a snapshot, returning the evicted one if the buffer was full
    pub fn push(&mut self, snapshot: Arc<Snapshot>) -> Option<Arc<Snapshot>> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(snapshot);
        evicted
    }

    pub fn latest(&self) -> Option<&Arc<Snapshot>> {
        self.entries.back()
    }

    pub fn oldest(&self) -> Option<&Arc<Snapshot>> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Arc<Snapshot>> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_LENGTH)
    }
}
