//! WebSocket handlers
//!
//! Each connection gets a bounded outbox; broadcasts use `try_send`, so one
//! slow viewer drops frames instead of stalling the others.

pub mod telemetry;

/// Maximum number of frames buffered per WebSocket connection
pub const WS_BUFFER_SIZE: usize = 256;
