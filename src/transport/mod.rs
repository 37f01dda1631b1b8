//! Transport Layer contract.
//!
//! The protocol core never touches sockets. It talks to a transport through
//! [`ClientTransport`] and [`ServerTransport`], and the transport calls back
//! into it through [`ServerHandler`] (server side) or by handing
//! [`ClientEvent`]s to the client (client side).
//!
//! [`memory`] provides an in-process loopback transport used by the binary
//! and the tests.

pub mod memory;

pub use memory::{MemoryClient, MemoryHub};

use crate::session::ConnectionId;
use crate::Result;

/// Client side of a transport.
pub trait ClientTransport {
    /// Open a connection to `host:port`.
    fn connect(&mut self, host: &str, port: u16) -> Result<()>;

    /// Close the current connection, if any.
    fn disconnect(&mut self) -> Result<()>;

    /// Send one payload to the server.
    fn send(&mut self, payload: &str) -> Result<()>;

    fn is_connected(&self) -> bool;
}

/// Server side of a transport.
pub trait ServerTransport: Send + Sync {
    /// Start accepting connections on `port`.
    fn listen(&self, port: u16) -> Result<()>;

    /// Stop accepting new connections; existing ones stay open.
    fn stop_listening(&self) -> Result<()>;

    /// Stop listening and disconnect every client.
    fn close(&self) -> Result<()>;

    fn is_listening(&self) -> bool;

    /// Deliver a payload to every open connection, sender included.
    fn broadcast(&self, payload: &str) -> Result<()>;

    /// Forcibly drop a single connection.
    fn close_connection(&self, connection: ConnectionId) -> Result<()>;
}

/// Callbacks a server transport invokes on the protocol core.
///
/// Callbacks for one connection arrive in order; callbacks for different
/// connections may run concurrently on different threads.
pub trait ServerHandler: Send + Sync {
    fn on_server_started(&self);

    fn on_server_stopped(&self);

    fn on_client_connected(&self, connection: ConnectionId);

    fn on_client_message(&self, payload: &str, connection: ConnectionId);

    fn on_client_disconnected(&self, connection: ConnectionId);

    /// A connection failed; the transport has already dropped it.
    fn on_client_error(&self, connection: ConnectionId, cause: &str);
}

/// Something the transport reports to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A payload from the server.
    Message(String),
    /// The client closed its own connection.
    Closed,
    /// The connection was lost or dropped by the server.
    Error(String),
}
