//! Viewer application state and its transition function
//!
//! `reduce` is the only code that changes an [`ApplicationState`]. It is pure,
//! so every transition can be tested without a transport.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::HistoryBuffer;
use crate::models::Snapshot;

/// Connection lifecycle as seen by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Identifies one connect attempt. Transport events are tagged with the
/// attempt that produced them so late events from a superseded attempt
/// can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub(crate) u64);

/// Something the transport observed
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection established
    Opened,
    /// Connection could not be established
    ConnectFailed(String),
    /// Connection closed by the server or lost
    Closed,
    /// A `data` event
    Data(Snapshot),
    /// An application-level `error` event
    ServerError(String),
}

/// Closed set of inputs driving the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Begin a connect attempt
    Connect,
    /// Begin a new attempt only if the given attempt is still current
    Retry(AttemptId),
    /// Event from the transport of a given attempt
    Transport(AttemptId, TransportEvent),
    /// Drop everything and return to the initial state
    Teardown,
}

/// Aggregate viewer state
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationState {
    pub connection_state: ConnectionState,
    /// Set only while `connection_state` is `Error`
    pub connection_error: Option<String>,
    pub latest_snapshot: Option<Arc<Snapshot>>,
    /// Local receive time of `latest_snapshot`
    pub last_update: Option<DateTime<Utc>>,
    pub history: HistoryBuffer,
    pub app_error: Option<String>,
    /// True until the first data or error event arrives
    pub is_loading: bool,
}

impl ApplicationState {
    pub fn new(max_history_length: usize) -> Self {
        Self {
            connection_state: ConnectionState::Idle,
            connection_error: None,
            latest_snapshot: None,
            last_update: None,
            history: HistoryBuffer::new(max_history_length),
            app_error: None,
            is_loading: true,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state == ConnectionState::Connected
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new(super::history::DEFAULT_MAX_HISTORY_LENGTH)
    }
}

/// Apply one transport event. Attempt filtering happens in the store.
pub fn reduce(state: &mut ApplicationState, event: TransportEvent) {
    match event {
        TransportEvent::Opened => {
            state.connection_state = ConnectionState::Connected;
            state.connection_error = None;
        }
        TransportEvent::ConnectFailed(message) => {
            state.connection_state = ConnectionState::Error;
            state.connection_error = Some(message);
            state.is_loading = false;
        }
        TransportEvent::Closed => {
            state.connection_state = ConnectionState::Idle;
            state.connection_error = None;
        }
        TransportEvent::Data(snapshot) => {
            let snapshot = Arc::new(snapshot);
            state.history.push(snapshot.clone());
            state.latest_snapshot = Some(snapshot);
            state.last_update = Some(Utc::now());
            state.app_error = None;
            state.is_loading = false;
        }
        TransportEvent::ServerError(message) => {
            state.app_error = Some(message);
            state.is_loading = false;
        }
    }
}

/// Enter `connecting` for a fresh attempt
pub fn begin_connect(state: &mut ApplicationState) {
    state.connection_state = ConnectionState::Connecting;
    state.connection_error = None;
}

/// Return to the initial state, keeping the configured history capacity
pub fn reset(state: &mut ApplicationState) {
    *state = ApplicationState::new(state.history.capacity());
}
