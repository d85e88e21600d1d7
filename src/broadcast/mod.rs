//! Server-side telemetry broadcast
//!
//! The registry tracks open viewer connections; the scheduler generates one
//! snapshot per period and fans it out to every registered connection.

pub mod generator;
pub mod registry;
pub mod scheduler;

pub use generator::{RandomSnapshotGenerator, SnapshotGenerator};
pub use registry::{ConnectionRegistry, Delivery, Outbox};
pub use scheduler::{BroadcastHandle, BroadcastScheduler, DEFAULT_BROADCAST_INTERVAL};
