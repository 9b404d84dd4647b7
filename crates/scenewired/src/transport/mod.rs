//! Loopback TCP transport.
//!
//! The transport module binds the configured loopback endpoint, accepts
//! connections on a background thread, and serves each connection on its own
//! thread until the peer disconnects or the server stops.

mod connection;
mod errors;
mod listener;
mod table;

use std::net::{SocketAddr, TcpStream};

pub use self::errors::ListenerError;
pub(crate) use self::connection::LineConnectionHandler;
pub(crate) use self::listener::{CommandListener, ListenerHandle};
pub(crate) use self::table::ConnectionTable;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection until it ends. Implementations should
    /// avoid panicking.
    fn handle(&self, stream: TcpStream, peer: SocketAddr);
}
