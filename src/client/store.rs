//! Sync store: the single owner of viewer state
//!
//! All mutation goes through [`SyncStore::dispatch`], serialized by one lock.
//! Readers get committed states through a `watch` channel and never observe a
//! half-applied update.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use super::history::DEFAULT_MAX_HISTORY_LENGTH;
use super::projection::{metrics_series, MetricsPoint};
use super::state::{begin_connect, reduce, reset, Action, ApplicationState, AttemptId};

/// What `dispatch` did with an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A connect attempt started
    Started(AttemptId),
    Applied,
    /// Event from a superseded or torn-down attempt
    Ignored,
}

/// Held transport subscription; cancelling it stops the transport task
#[derive(Debug)]
pub struct Subscription {
    shutdown_tx: watch::Sender<bool>,
}

impl Subscription {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { shutdown_tx: tx }, rx)
    }

    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[derive(Default)]
struct Control {
    current: Option<AttemptId>,
    next_attempt: u64,
    subscription: Option<Subscription>,
}

/// Viewer state container
pub struct SyncStore {
    control: Mutex<Control>,
    state_tx: watch::Sender<ApplicationState>,
}

impl SyncStore {
    pub fn new(max_history_length: usize) -> Self {
        let (state_tx, _) = watch::channel(ApplicationState::new(max_history_length));
        Self {
            control: Mutex::new(Control::default()),
            state_tx,
        }
    }

    /// Apply one action
    pub fn dispatch(&self, action: Action) -> Outcome {
        let mut control = self.control.lock();

        match action {
            Action::Connect => Outcome::Started(self.start_attempt(&mut control)),
            Action::Retry(previous) => {
                if control.current != Some(previous) {
                    return Outcome::Ignored;
                }
                Outcome::Started(self.start_attempt(&mut control))
            }
            Action::Transport(attempt, event) => {
                if control.current != Some(attempt) {
                    debug!("Ignoring {:?} from stale attempt {:?}", event, attempt);
                    return Outcome::Ignored;
                }
                self.state_tx.send_modify(|state| reduce(state, event));
                Outcome::Applied
            }
            Action::Teardown => {
                control.current = None;
                if let Some(subscription) = control.subscription.take() {
                    subscription.cancel();
                }
                self.state_tx.send_modify(reset);
                info!("Sync store torn down");
                Outcome::Applied
            }
        }
    }

    fn start_attempt(&self, control: &mut Control) -> AttemptId {
        control.next_attempt += 1;
        let attempt = AttemptId(control.next_attempt);
        control.current = Some(attempt);
        self.state_tx.send_modify(begin_connect);
        debug!("Connect attempt {:?} started", attempt);
        attempt
    }

    /// Start a connect attempt and return its id
    pub fn connect(&self) -> AttemptId {
        let mut control = self.control.lock();
        self.start_attempt(&mut control)
    }

    /// Start the next attempt after `previous` failed or closed.
    ///
    /// Returns `None` if `previous` was superseded or torn down meanwhile.
    pub fn retry(&self, previous: AttemptId) -> Option<AttemptId> {
        match self.dispatch(Action::Retry(previous)) {
            Outcome::Started(attempt) => Some(attempt),
            _ => None,
        }
    }

    /// Hold a transport subscription until teardown.
    ///
    /// Any previously held subscription is cancelled. A subscription for an
    /// attempt that is no longer current is cancelled immediately.
    pub fn attach_subscription(&self, attempt: AttemptId, subscription: Subscription) {
        let mut control = self.control.lock();
        if control.current != Some(attempt) {
            subscription.cancel();
            return;
        }
        if let Some(previous) = control.subscription.replace(subscription) {
            previous.cancel();
        }
    }

    /// Release the transport and reset to the initial state.
    ///
    /// Safe to call when nothing was ever connected.
    pub fn teardown(&self) {
        self.dispatch(Action::Teardown);
    }

    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.control.lock().current
    }

    /// Latest committed state
    pub fn state(&self) -> ApplicationState {
        self.state_tx.borrow().clone()
    }

    /// Receiver notified on every committed update
    pub fn subscribe(&self) -> watch::Receiver<ApplicationState> {
        self.state_tx.subscribe()
    }

    pub fn metrics_series(&self) -> Vec<MetricsPoint> {
        metrics_series(&self.state_tx.borrow().history)
    }
}

impl Default for SyncStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::state::{ConnectionState, TransportEvent};
    use crate::models::{Metrics, Snapshot};
    use chrono::Utc;
    use std::sync::Arc;

    fn snapshot(n: u64) -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            metrics: Metrics {
                cpu: n as f64,
                memory: 1.0,
                network: 2.0,
                disk: 3.0,
            },
            events: Vec::new(),
            users: n,
            transactions: 0,
        }
    }

    #[test]
    fn test_connect_returns_fresh_attempts() {
        let store = SyncStore::default();
        let first = store.connect();
        let second = store.connect();

        assert_ne!(first, second);
        assert_eq!(store.current_attempt(), Some(second));
        assert_eq!(store.state().connection_state, ConnectionState::Connecting);
    }

    #[test]
    fn test_events_from_superseded_attempt_are_ignored() {
        let store = SyncStore::default();
        let old = store.connect();
        let current = store.connect();

        assert_eq!(
            store.dispatch(Action::Transport(old, TransportEvent::Opened)),
            Outcome::Ignored
        );
        assert_eq!(store.state().connection_state, ConnectionState::Connecting);

        assert_eq!(
            store.dispatch(Action::Transport(current, TransportEvent::Opened)),
            Outcome::Applied
        );
        assert!(store.state().is_connected());
    }

    #[test]
    fn test_connect_resolving_after_teardown_does_not_resurrect() {
        let store = SyncStore::new(10);
        let attempt = store.connect();
        store.teardown();

        store.dispatch(Action::Transport(attempt, TransportEvent::Opened));
        store.dispatch(Action::Transport(attempt, TransportEvent::Data(snapshot(1))));

        assert_eq!(store.state(), ApplicationState::new(10));
        assert_eq!(store.current_attempt(), None);
    }

    #[test]
    fn test_retry_only_from_current_attempt() {
        let store = SyncStore::default();
        let first = store.connect();
        store.dispatch(Action::Transport(first, TransportEvent::ConnectFailed("refused".into())));
        assert_eq!(store.state().connection_state, ConnectionState::Error);

        let second = store.retry(first).unwrap();
        assert_eq!(store.state().connection_state, ConnectionState::Connecting);
        assert!(store.state().connection_error.is_none());

        assert_eq!(store.retry(first), None);
        store.teardown();
        assert_eq!(store.retry(second), None);
        assert_eq!(store.state().connection_state, ConnectionState::Idle);
    }

    #[test]
    fn test_teardown_without_connect() {
        let store = SyncStore::new(5);
        store.teardown();
        assert_eq!(store.state(), ApplicationState::new(5));
    }

    #[test]
    fn test_teardown_resets_everything() {
        let store = SyncStore::new(5);
        let attempt = store.connect();
        store.dispatch(Action::Transport(attempt, TransportEvent::Opened));
        for n in 0..8 {
            store.dispatch(Action::Transport(attempt, TransportEvent::Data(snapshot(n))));
        }
        store.dispatch(Action::Transport(attempt, TransportEvent::ServerError("x".into())));

        store.teardown();

        let state = store.state();
        assert_eq!(state, ApplicationState::new(5));
        assert_eq!(state.connection_state, ConnectionState::Idle);
        assert!(state.history.is_empty());
        assert!(state.app_error.is_none());
        assert!(state.connection_error.is_none());
    }

    #[test]
    fn test_teardown_cancels_subscription() {
        let store = SyncStore::default();
        let attempt = store.connect();
        let (subscription, shutdown) = Subscription::new();
        store.attach_subscription(attempt, subscription);
        assert!(!*shutdown.borrow());

        store.teardown();

        assert!(*shutdown.borrow());
    }

    #[test]
    fn test_stale_subscription_cancelled_on_attach() {
        let store = SyncStore::default();
        let attempt = store.connect();
        store.teardown();

        let (subscription, shutdown) = Subscription::new();
        store.attach_subscription(attempt, subscription);

        assert!(*shutdown.borrow());
    }

    #[test]
    fn test_readers_see_consistent_updates() {
        let store = SyncStore::new(3);
        let mut rx = store.subscribe();
        let attempt = store.connect();

        for n in 1..=4 {
            store.dispatch(Action::Transport(attempt, TransportEvent::Data(snapshot(n))));
            assert!(rx.has_changed().unwrap());
            let state = rx.borrow_and_update().clone();
            let latest = state.latest_snapshot.clone().unwrap();
            assert!(Arc::ptr_eq(&latest, state.history.latest().unwrap()));
            assert_eq!(latest.users, n);
        }

        let series = store.metrics_series();
        assert_eq!(series.len(), 3);
        assert_eq!(series.iter().map(|p| p.cpu).collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
    }
}
