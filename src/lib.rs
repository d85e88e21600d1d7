//! Pulseboard - Real-time Telemetry Dashboard
//!
//! Streams synthetic system telemetry from one server to any number of
//! viewers over WebSocket.
//!
//! ## Features
//!
//! - Periodic snapshot broadcast with one-sample catch-up for new viewers
//! - On-demand resend of the latest snapshot
//! - Viewer state machine with a bounded sliding history
//! - Bounded reconnection with exponential backoff

pub mod api;
pub mod broadcast;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;

pub use config::{LogConfig, ServerConfig, ViewerConfig};
pub use error::{DashboardError, Result};
