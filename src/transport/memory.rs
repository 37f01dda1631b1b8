//! In-process loopback transport.
//!
//! [`MemoryHub`] plays the server side and [`MemoryClient`] the client side.
//! Payloads to the server are handed to the attached [`ServerHandler`] on the
//! sending thread; payloads to clients are queued on a per-client tokio
//! channel and drained by whoever owns the client. Queued events carry the
//! connection they belong to, and a client only surfaces those of its latest
//! connection.
//!
//! The hub never calls a handler while holding its own lock, so handlers
//! are free to broadcast or drop connections from inside a callback.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::{ClientEvent, ClientTransport, ServerHandler, ServerTransport};
use crate::error::ChatError;
use crate::session::ConnectionId;
use crate::Result;

/// Host name a hub answers to unless configured otherwise.
pub const DEFAULT_HOST: &str = "localhost";

/// Cause reported to clients when the server shuts down.
const SERVER_CLOSED: &str = "server closed";

/// Cause reported to a client whose connection the server dropped.
const CONNECTION_DROPPED: &str = "connection closed by server";

type Inbox = mpsc::UnboundedSender<(ConnectionId, ClientEvent)>;

#[derive(Default)]
struct HubState {
    listening_on: Option<u16>,
    connections: HashMap<ConnectionId, Inbox>,
}

/// Server side of the loopback transport.
pub struct MemoryHub {
    host: String,
    state: RwLock<HubState>,
    handler: RwLock<Option<Weak<dyn ServerHandler>>>,
}

impl MemoryHub {
    /// Create a hub answering to [`DEFAULT_HOST`].
    pub fn new() -> Self {
        Self::with_host(DEFAULT_HOST)
    }

    /// Create a hub answering to the given host name.
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            state: RwLock::new(HubState::default()),
            handler: RwLock::new(None),
        }
    }

    /// Attach the handler that receives server callbacks.
    ///
    /// Only a weak reference is kept; the handler usually owns the hub.
    pub fn attach<H: ServerHandler + 'static>(&self, handler: &Arc<H>) {
        let weak: Weak<H> = Arc::downgrade(handler);
        let weak: Weak<dyn ServerHandler> = weak;
        if let Ok(mut slot) = self.handler.write() {
            *slot = Some(weak);
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port currently listened on.
    pub fn port(&self) -> Option<u16> {
        self.state.read().ok().and_then(|s| s.listening_on)
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.state.read().map(|s| s.connections.len()).unwrap_or(0)
    }

    /// Check whether a connection is still open.
    pub fn is_open(&self, connection: ConnectionId) -> bool {
        self.state
            .read()
            .map(|s| s.connections.contains_key(&connection))
            .unwrap_or(false)
    }

    /// Drop a connection as if the link had failed.
    ///
    /// The client sees [`ClientEvent::Error`] and the handler gets
    /// `on_client_error`.
    pub fn fail_connection(&self, connection: ConnectionId, cause: &str) -> Result<()> {
        let inbox = self.detach(connection)?;
        let _ = inbox.send((connection, ClientEvent::Error(cause.to_string())));
        if let Some(handler) = self.handler() {
            handler.on_client_error(connection, cause);
        }
        Ok(())
    }

    fn handler(&self) -> Option<Arc<dyn ServerHandler>> {
        self.handler
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().and_then(Weak::upgrade))
    }

    fn detach(&self, connection: ConnectionId) -> Result<Inbox> {
        let mut state = self.state.write().map_err(|_| ChatError::LockPoisoned)?;
        state
            .connections
            .remove(&connection)
            .ok_or_else(|| ChatError::ConnectionNotFound(connection.to_string()))
    }

    fn accept(
        &self,
        host: &str,
        port: u16,
        inbox: Inbox,
    ) -> Result<ConnectionId> {
        let connection = {
            let mut state = self.state.write().map_err(|_| ChatError::LockPoisoned)?;
            if host != self.host || state.listening_on != Some(port) {
                return Err(ChatError::ConnectionRefused {
                    host: host.to_string(),
                    port,
                });
            }
            let connection = ConnectionId::new();
            state.connections.insert(connection, inbox);
            connection
        };

        debug!(%connection, "hub accepted connection");
        if let Some(handler) = self.handler() {
            handler.on_client_connected(connection);
        }
        Ok(connection)
    }

    fn deliver(&self, connection: ConnectionId, payload: &str) -> Result<()> {
        if !self.is_open(connection) {
            return Err(ChatError::NotConnected);
        }
        if let Some(handler) = self.handler() {
            handler.on_client_message(payload, connection);
        }
        Ok(())
    }

    /// Client-initiated close. Returns false if the server had already
    /// dropped the connection.
    fn hang_up(&self, connection: ConnectionId) -> Result<bool> {
        match self.detach(connection) {
            Ok(_) => {
                if let Some(handler) = self.handler() {
                    handler.on_client_disconnected(connection);
                }
                Ok(true)
            }
            Err(ChatError::ConnectionNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Default for MemoryHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerTransport for MemoryHub {
    fn listen(&self, port: u16) -> Result<()> {
        let started = {
            let mut state = self.state.write().map_err(|_| ChatError::LockPoisoned)?;
            if state.listening_on.is_some() {
                false
            } else {
                state.listening_on = Some(port);
                true
            }
        };

        if started {
            if let Some(handler) = self.handler() {
                handler.on_server_started();
            }
        }
        Ok(())
    }

    fn stop_listening(&self) -> Result<()> {
        let stopped = {
            let mut state = self.state.write().map_err(|_| ChatError::LockPoisoned)?;
            state.listening_on.take().is_some()
        };

        if stopped {
            if let Some(handler) = self.handler() {
                handler.on_server_stopped();
            }
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let (was_listening, connections) = {
            let mut state = self.state.write().map_err(|_| ChatError::LockPoisoned)?;
            (
                state.listening_on.take().is_some(),
                std::mem::take(&mut state.connections),
            )
        };

        let handler = self.handler();
        if was_listening {
            if let Some(handler) = &handler {
                handler.on_server_stopped();
            }
        }
        for (connection, inbox) in connections {
            let _ = inbox.send((connection, ClientEvent::Error(SERVER_CLOSED.to_string())));
            if let Some(handler) = &handler {
                handler.on_client_disconnected(connection);
            }
        }
        Ok(())
    }

    fn is_listening(&self) -> bool {
        self.port().is_some()
    }

    fn broadcast(&self, payload: &str) -> Result<()> {
        let inboxes: Vec<_> = {
            let state = self.state.read().map_err(|_| ChatError::LockPoisoned)?;
            state
                .connections
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        for (connection, inbox) in inboxes {
            if inbox
                .send((connection, ClientEvent::Message(payload.to_string())))
                .is_err()
            {
                trace!(%connection, "inbox gone, skipping");
            }
        }
        Ok(())
    }

    fn close_connection(&self, connection: ConnectionId) -> Result<()> {
        let inbox = self.detach(connection)?;
        let _ = inbox.send((connection, ClientEvent::Error(CONNECTION_DROPPED.to_string())));
        if let Some(handler) = self.handler() {
            handler.on_client_disconnected(connection);
        }
        Ok(())
    }
}

/// Client side of the loopback transport.
///
/// Events for the client queue up in an inbox that survives reconnects;
/// events left over from an earlier connection are discarded on read.
pub struct MemoryClient {
    hub: Arc<MemoryHub>,
    /// Latest connection, kept after it closes so its final event still
    /// reaches the owner.
    connection: Option<ConnectionId>,
    tx: Inbox,
    rx: mpsc::UnboundedReceiver<(ConnectionId, ClientEvent)>,
}

impl MemoryClient {
    pub fn new(hub: Arc<MemoryHub>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            hub,
            connection: None,
            tx,
            rx,
        }
    }

    /// Handle of the latest connection, if one was ever opened.
    pub fn connection(&self) -> Option<ConnectionId> {
        self.connection
    }

    fn accept_event(&self, connection: ConnectionId, event: ClientEvent) -> Option<ClientEvent> {
        if self.connection == Some(connection) {
            Some(event)
        } else {
            trace!(%connection, "dropping event from an earlier connection");
            None
        }
    }

    /// Take the next queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<ClientEvent> {
        while let Ok((connection, event)) = self.rx.try_recv() {
            if let Some(event) = self.accept_event(connection, event) {
                return Some(event);
            }
        }
        None
    }

    /// Take every queued event without waiting.
    pub fn drain_events(&mut self) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_next_event() {
            events.push(event);
        }
        events
    }

    /// Wait for the next event.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        while let Some((connection, event)) = self.rx.recv().await {
            if let Some(event) = self.accept_event(connection, event) {
                return Some(event);
            }
        }
        None
    }
}

impl ClientTransport for MemoryClient {
    fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        let connection = self.hub.accept(host, port, self.tx.clone())?;
        self.connection = Some(connection);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(connection) = self.connection {
            if self.hub.hang_up(connection)? {
                self.tx
                    .send((connection, ClientEvent::Closed))
                    .map_err(|_| ChatError::ChannelClosed)?;
            }
        }
        Ok(())
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        let connection = self.connection.ok_or(ChatError::NotConnected)?;
        self.hub.deliver(connection, payload)
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some_and(|c| self.hub.is_open(c))
    }
}
