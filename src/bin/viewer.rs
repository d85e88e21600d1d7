//! Pulseboard Viewer - headless dashboard client
//!
//! Streams snapshots into a sync store and logs the derived cards. Type `r`
//! then Enter to request the latest snapshot, `q` to quit.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

use pulseboard::client::{
    metric_cards, recent_events, ApplicationState, SyncStore, TransportBridge,
};
use pulseboard::config::{LogConfig, ViewerConfig};
use pulseboard::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&LogConfig::from_env());

    let config = ViewerConfig::from_env().context("loading viewer configuration")?;
    info!("Connecting to {}", config.server_url);

    let store = Arc::new(SyncStore::new(config.max_history_length));
    let mut updates = store.subscribe();
    let bridge = TransportBridge::spawn(store.clone(), config.server_url.clone(), config.reconnect);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                report(&state);
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match line.trim() {
                    "r" => {
                        if let Err(e) = bridge.request_data() {
                            warn!("{}", e);
                        }
                    }
                    "q" => break,
                    _ => {}
                },
                // stdin closed: keep streaming until Ctrl+C
                Ok(None) => stdin_open = false,
                Err(e) => warn!("Failed to read stdin: {}", e),
            },
        }
    }

    info!("Shutting down viewer");
    bridge.shutdown().await;
    Ok(())
}

fn report(state: &ApplicationState) {
    if let Some(error) = &state.connection_error {
        warn!("[{}] {}", state.connection_state, error);
        return;
    }
    if let Some(error) = &state.app_error {
        warn!("[{}] server error: {}", state.connection_state, error);
        return;
    }

    let Some(snapshot) = &state.latest_snapshot else {
        info!("[{}] waiting for data", state.connection_state);
        return;
    };

    let cards = metric_cards(snapshot)
        .iter()
        .map(|card| format!("{} {} ({})", card.kind.title(), card.value, card.level.as_str()))
        .collect::<Vec<_>>()
        .join(" | ");

    info!(
        "[{}] {} | events {} | history {}/{}",
        state.connection_state,
        cards,
        snapshot.events.len(),
        state.history.len(),
        state.history.capacity()
    );

    for row in recent_events(snapshot) {
        info!("  {} [{}] {}", row.time, row.kind, row.message);
    }
}
