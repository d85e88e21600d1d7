//! Transport bridge
//!
//! Owns the WebSocket to the server and turns everything it observes into
//! store actions tagged with the current attempt. The store never sees the
//! socket; the bridge never touches state directly.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::reconnect::ReconnectPolicy;
use super::state::{Action, AttemptId, TransportEvent};
use super::store::{Subscription, SyncStore};
use crate::error::{DashboardError, Result};
use crate::models::{ClientMessage, ServerMessage};

/// Queued outbound requests per bridge
const COMMAND_BUFFER_SIZE: usize = 16;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Translate one server frame into a transport event
pub fn decode_frame(text: &str) -> Result<TransportEvent> {
    Ok(match ServerMessage::decode(text)? {
        ServerMessage::Data(snapshot) => TransportEvent::Data(snapshot),
        ServerMessage::Error(payload) => TransportEvent::ServerError(payload.message),
    })
}

/// How a connected session ended
enum SessionEnd {
    Closed,
    Shutdown,
}

/// Handle to a running bridge task
pub struct TransportBridge {
    store: Arc<SyncStore>,
    commands: mpsc::Sender<ClientMessage>,
    task: JoinHandle<()>,
}

impl TransportBridge {
    /// Start connecting to `url` and feed the store until teardown
    pub fn spawn(store: Arc<SyncStore>, url: Url, policy: ReconnectPolicy) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let (subscription, shutdown) = Subscription::new();

        let attempt = store.connect();
        store.attach_subscription(attempt, subscription);

        let worker = BridgeWorker {
            store: store.clone(),
            url,
            policy,
            shutdown,
            commands: command_rx,
        };
        let task = tokio::spawn(async move { worker.run(attempt).await });

        Self {
            store,
            commands,
            task,
        }
    }

    /// Ask the server to resend its latest snapshot
    pub fn request_data(&self) -> Result<()> {
        self.commands
            .try_send(ClientMessage::RequestData)
            .map_err(|e| DashboardError::Transport(format!("requestData not queued: {}", e)))
    }

    /// Tear down the store (which cancels this bridge) and wait for the task
    pub async fn shutdown(self) {
        self.store.teardown();
        if let Err(e) = self.task.await {
            warn!("Transport bridge task ended abnormally: {}", e);
        }
    }
}

struct BridgeWorker {
    store: Arc<SyncStore>,
    url: Url,
    policy: ReconnectPolicy,
    shutdown: watch::Receiver<bool>,
    commands: mpsc::Receiver<ClientMessage>,
}

impl BridgeWorker {
    #[instrument(skip_all)]
    async fn run(mut self, mut attempt: AttemptId) {
        let mut retries = 0u32;

        loop {
            let connected = tokio::select! {
                result = connect_async(self.url.as_str()) => result,
                // Teardown while connecting: drop the pending connect
                _ = self.shutdown.changed() => break,
            };

            match connected {
                Ok((socket, _)) => {
                    info!("Connected to {}", self.url);
                    retries = 0;
                    self.emit(attempt, TransportEvent::Opened);

                    match self.session(attempt, socket).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Closed => {
                            info!("Disconnected from {}", self.url);
                            self.emit(attempt, TransportEvent::Closed);
                        }
                    }
                }
                Err(e) => {
                    warn!("Connection to {} failed: {}", self.url, e);
                    self.emit(attempt, TransportEvent::ConnectFailed(e.to_string()));
                }
            }

            let Some(delay) = self.policy.delay_for(retries) else {
                info!("Not reconnecting after {} retries", retries);
                break;
            };
            retries += 1;
            debug!("Reconnecting in {:?} (retry {})", delay, retries);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.changed() => break,
            }

            attempt = match self.store.retry(attempt) {
                Some(next) => next,
                None => break,
            };
        }

        debug!("Transport bridge stopped");
    }

    fn emit(&self, attempt: AttemptId, event: TransportEvent) {
        self.store.dispatch(Action::Transport(attempt, event));
    }

    async fn session(&mut self, attempt: AttemptId, socket: Socket) -> SessionEnd {
        let (mut sink, mut source) = socket.split();

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        let _ = sink.send(Message::Close(None)).await;
                        return SessionEnd::Shutdown;
                    };
                    match command.encode() {
                        Ok(text) => {
                            if sink.send(Message::Text(text)).await.is_err() {
                                return SessionEnd::Closed;
                            }
                        }
                        Err(e) => warn!("Failed to encode request: {}", e),
                    }
                }
                frame = source.next() => match frame {
                    Some(Ok(Message::Text(text))) => match decode_frame(&text) {
                        Ok(event) => self.emit(attempt, event),
                        Err(e) => warn!("Ignoring malformed frame: {}", e),
                    },
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Closed,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("WebSocket error: {}", e);
                        return SessionEnd::Closed;
                    }
                },
            }
        }
    }
}
