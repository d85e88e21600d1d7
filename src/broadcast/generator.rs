//! Synthetic telemetry generation

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

use crate::models::{Event, EventId, EventKind, Metrics, Snapshot};

/// Source of telemetry snapshots
///
/// Generation is total: implementations never fail.
pub trait SnapshotGenerator: Send + Sync {
    /// Produce one new snapshot stamped with the current server time
    fn generate(&self) -> Snapshot;
}

/// Generates uniformly random telemetry
pub struct RandomSnapshotGenerator {
    next_event_id: AtomicU64,
    max_events_per_tick: usize,
}

impl RandomSnapshotGenerator {
    pub fn new() -> Self {
        Self::with_max_events(2)
    }

    pub fn with_max_events(max_events_per_tick: usize) -> Self {
        Self {
            next_event_id: AtomicU64::new(1),
            max_events_per_tick,
        }
    }
}

impl Default for RandomSnapshotGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotGenerator for RandomSnapshotGenerator {
    fn generate(&self) -> Snapshot {
        let mut rng = rand::thread_rng();
        let now = Utc::now();

        let event_count = rng.gen_range(0..=self.max_events_per_tick);
        let events = (0..event_count)
            .map(|_| Event {
                // Monotonic, so ids stay unique for the lifetime of the process
                id: EventId::Number(self.next_event_id.fetch_add(1, Ordering::Relaxed)),
                kind: EventKind::ALL[rng.gen_range(0..EventKind::ALL.len())],
                message: format!("System event {}", rng.gen_range(0..1000)),
                timestamp: now,
            })
            .collect();

        Snapshot {
            timestamp: now,
            metrics: Metrics {
                cpu: rng.gen_range(0.0..100.0),
                memory: rng.gen_range(0.0..100.0),
                network: rng.gen_range(0.0..1000.0),
                disk: rng.gen_range(0.0..100.0),
            },
            events,
            users: rng.gen_range(100..1100),
            transactions: rng.gen_range(1000..6000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_values_in_range() {
        let generator = RandomSnapshotGenerator::new();

        for _ in 0..200 {
            let s = generator.generate();
            assert!((0.0..=100.0).contains(&s.metrics.cpu));
            assert!((0.0..=100.0).contains(&s.metrics.memory));
            assert!((0.0..=100.0).contains(&s.metrics.disk));
            assert!((0.0..=1000.0).contains(&s.metrics.network));
            assert!((100..1100).contains(&s.users));
            assert!((1000..6000).contains(&s.transactions));
            assert!(s.events.len() <= 2);
            for event in &s.events {
                assert_eq!(event.timestamp, s.timestamp);
                assert!(event.message.starts_with("System event "));
            }
        }
    }

    #[test]
    fn test_event_ids_unique() {
        let generator = RandomSnapshotGenerator::with_max_events(3);
        let mut seen = HashSet::new();

        for _ in 0..100 {
            for event in generator.generate().events {
                assert!(seen.insert(event.id), "duplicate event id");
            }
        }
    }

    #[test]
    fn test_no_events_when_disabled() {
        let generator = RandomSnapshotGenerator::with_max_events(0);
        assert!(generator.generate().events.is_empty());
    }
}
