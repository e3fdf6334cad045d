//! Observer connections
//!
//! Per-socket identity, lifecycle and the reader/writer pumps.

mod connection;
mod error;
mod transport;

pub use connection::{Connection, ConnectionHandle, ConnectionId, ConnectionState, Frame};
pub use error::TransportError;
pub use transport::serve_socket;
