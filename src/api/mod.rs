//! API server implementation
//!
//! Provides the health endpoints and the telemetry WebSocket.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::{ApiServer, AppState};
