use crate::client::ReconnectPolicy;
use crate::error::{DashboardError, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Broadcast server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port for the server (default: 3001)
    pub port: u16,
    /// Origin permitted for cross-origin access (default: http://localhost:5173)
    pub client_origin: String,
    /// Broadcast period in milliseconds (default: 2000)
    pub broadcast_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// WebSocket endpoint of the server (default: ws://localhost:3001/ws)
    pub server_url: Url,
    /// Snapshots retained for trend views (default: 50)
    pub max_history_length: usize,
    /// Reconnection policy
    pub reconnect: ReconnectPolicy,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let broadcast_interval_ms: u64 = parse_env("BROADCAST_INTERVAL_MS", "2000")?;
        if broadcast_interval_ms == 0 {
            return Err(DashboardError::InvalidConfig(
                "BROADCAST_INTERVAL_MS must be greater than zero".into(),
            ));
        }

        Ok(ServerConfig {
            host: get_env_or("HOST", "0.0.0.0"),
            port: get_env_or("PORT", "3001").parse().map_err(|_| {
                DashboardError::InvalidConfig("PORT must be a valid port number".into())
            })?,
            client_origin: get_env_or("CLIENT_URL", "http://localhost:5173"),
            broadcast_interval_ms,
        })
    }

    /// Get the server address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self> {
        let raw = get_env_or("SERVER_URL", "ws://localhost:3001/ws");
        let server_url = Url::parse(raw.trim()).map_err(|e| {
            DashboardError::InvalidConfig(format!("SERVER_URL must be a valid URL: {}", e))
        })?;
        if server_url.scheme() != "ws" {
            return Err(DashboardError::InvalidConfig(format!(
                "SERVER_URL has unsupported scheme: {}",
                server_url.scheme()
            )));
        }

        let max_history_length: usize = parse_env("MAX_HISTORY_LENGTH", "50")?;
        if max_history_length == 0 {
            return Err(DashboardError::InvalidConfig(
                "MAX_HISTORY_LENGTH must be greater than zero".into(),
            ));
        }

        let reconnect = ReconnectPolicy {
            max_retries: parse_env("RECONNECT_MAX_RETRIES", "5")?,
            initial_backoff: Duration::from_millis(parse_env("RECONNECT_INITIAL_BACKOFF_MS", "500")?),
            max_backoff: Duration::from_millis(parse_env("RECONNECT_MAX_BACKOFF_MS", "8000")?),
        };

        Ok(ViewerConfig {
            server_url,
            max_history_length,
            reconnect,
        })
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        LogConfig {
            level: get_env_or("LOG_LEVEL", "info"),
            format: get_env_or("LOG_FORMAT", "pretty"),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T: FromStr>(key: &str, default: &str) -> Result<T> {
    get_env_or(key, default)
        .trim()
        .parse()
        .map_err(|_| DashboardError::InvalidConfig(format!("{} must be a valid number", key)))
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
