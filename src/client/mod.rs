//! Viewer-side streaming state
//!
//! [`SyncStore`] owns the connection state machine and the bounded snapshot
//! history; [`TransportBridge`] feeds it from a WebSocket.

pub mod bridge;
pub mod history;
pub mod projection;
pub mod reconnect;
pub mod state;
pub mod store;

pub use bridge::TransportBridge;
pub use history::{HistoryBuffer, DEFAULT_MAX_HISTORY_LENGTH};
pub use projection::{
    metric_cards, metrics_series, recent_events, CardKind, EventRow, Level, MetricCard, MetricsPoint,
};
pub use reconnect::ReconnectPolicy;
pub use state::{Action, ApplicationState, AttemptId, ConnectionState, TransportEvent};
pub use store::{Outcome, Subscription, SyncStore};
