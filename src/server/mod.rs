//! Server side of the chat protocol.
//!
//! [`ChatServer`] owns the session registry and reacts to transport
//! callbacks (see [`router`]); [`ServerConsole`] interprets the operator's
//! console lines.

mod console;
pub mod router;

pub use console::{ServerConsole, SERVER_MSG_PREFIX};
pub use router::{route, Route};

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use crate::session::SessionRegistry;
use crate::transport::ServerTransport;
use crate::Result;

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 5555;

/// Chat server bound to a transport.
pub struct ChatServer<T: ServerTransport> {
    transport: Arc<T>,
    registry: SessionRegistry,
    port: AtomicU16,
}

impl<T: ServerTransport> ChatServer<T> {
    /// Create a server that will listen on `port` once started.
    pub fn new(transport: Arc<T>, port: u16) -> Self {
        Self {
            transport,
            registry: SessionRegistry::new(),
            port: AtomicU16::new(port),
        }
    }

    pub fn port(&self) -> u16 {
        self.port.load(Ordering::Relaxed)
    }

    /// Change the port used by the next `listen`.
    pub fn set_port(&self, port: u16) {
        self.port.store(port, Ordering::Relaxed);
    }

    /// Start accepting connections on the configured port.
    pub fn listen(&self) -> Result<()> {
        self.transport.listen(self.port())
    }

    pub fn stop_listening(&self) -> Result<()> {
        self.transport.stop_listening()
    }

    /// Disconnect every client and stop listening.
    pub fn close(&self) -> Result<()> {
        self.transport.close()
    }

    pub fn is_listening(&self) -> bool {
        self.transport.is_listening()
    }

    /// Send a payload to every connected client.
    pub fn broadcast(&self, payload: &str) -> Result<()> {
        self.transport.broadcast(payload)
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }
}
