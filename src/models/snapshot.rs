use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One telemetry sample.
///
/// Shared as `Arc<Snapshot>` once published and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Server clock at generation time
    pub timestamp: DateTime<Utc>,
    pub metrics: Metrics,
    /// Events raised during this tick, in generation order
    pub events: Vec<Event>,
    /// Active user count
    pub users: u64,
    /// Transaction count
    pub transactions: u64,
}

/// System metrics for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// CPU usage percentage (0-100)
    pub cpu: f64,
    /// Memory usage percentage (0-100)
    pub memory: f64,
    /// Network throughput in MB/s (0-1000)
    pub network: f64,
    /// Disk usage percentage (0-100)
    pub disk: f64,
}

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Warning,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Info, EventKind::Warning, EventKind::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Info => "info",
            EventKind::Warning => "warning",
            EventKind::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event identifier. Numeric on this server, but peers may send strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Discrete system event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
