pub mod connection;
pub mod message;
pub mod snapshot;

pub use connection::*;
pub use message::*;
pub use snapshot::*;
