//! A single chat client endpoint.

use tracing::{debug, info, warn};

use crate::command::{Arity, Directive, DirectiveTable, Flow, Interpreter, LOGIN_DIRECTIVE};
use crate::console::Console;
use crate::server::DEFAULT_PORT;
use crate::session::ClientState;
use crate::transport::{ClientEvent, ClientTransport};
use crate::Result;

/// Connection settings for a new client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Identity announced to the server on every login.
    pub login_id: String,
    pub host: String,
    pub port: u16,
}

impl ClientConfig {
    pub fn new(login_id: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Chat client: connection settings, lifecycle state and the client
/// directive set.
pub struct ChatClient<T: ClientTransport, C: Console> {
    login_id: String,
    host: String,
    port: u16,
    state: ClientState,
    transport: T,
    console: C,
}

impl<T: ClientTransport, C: Console> ChatClient<T, C> {
    /// Create a client and log in straight away.
    ///
    /// A failed login is reported on the console and leaves the client
    /// disconnected; `#login` can retry later.
    pub fn new(config: ClientConfig, transport: T, console: C) -> Self {
        let mut client = Self {
            login_id: config.login_id,
            host: config.host,
            port: config.port,
            state: ClientState::Disconnected,
            transport,
            console,
        };

        if let Err(e) = client.open_connection() {
            client.notify(&format!("Error connecting to server: {}", e));
        }
        client
    }

    pub fn login_id(&self) -> &str {
        &self.login_id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// React to something the transport reported.
    pub fn handle_event(&mut self, event: ClientEvent) -> Flow {
        if self.state.is_terminal() {
            return Flow::Terminate;
        }

        match event {
            ClientEvent::Message(text) => {
                self.console.display(&text);
                Flow::Continue
            }
            ClientEvent::Closed if self.transport.is_connected() => {
                debug!("close of an earlier connection, ignoring");
                Flow::Continue
            }
            ClientEvent::Closed => {
                self.notify("Connection Closed");
                if self.state == ClientState::Connected {
                    self.move_to(ClientState::Disconnected);
                }
                Flow::Continue
            }
            ClientEvent::Error(cause) => {
                debug!(cause = %cause, "connection lost");
                self.notify("The server has shutdown");
                self.quit(None)
            }
        }
    }

    /// Handle a batch of events, stopping at the first termination.
    pub fn handle_events<I>(&mut self, events: I) -> Flow
    where
        I: IntoIterator<Item = ClientEvent>,
    {
        for event in events {
            if self.handle_event(event).is_terminate() {
                return Flow::Terminate;
            }
        }
        Flow::Continue
    }

    fn move_to(&mut self, target: ClientState) {
        if let Err(e) = self.state.transition_to(target) {
            warn!("{}", e);
        }
    }

    /// Connect and announce the login id.
    fn open_connection(&mut self) -> Result<()> {
        self.transport.connect(&self.host, self.port)?;
        self.move_to(ClientState::Connected);
        self.transport
            .send(&format!("{} {}", LOGIN_DIRECTIVE, self.login_id))?;
        info!(host = %self.host, port = self.port, login_id = %self.login_id, "connected");
        Ok(())
    }

    fn quit(&mut self, _argument: Option<&str>) -> Flow {
        // Leaving anyway; a failed close changes nothing
        if let Err(e) = self.transport.disconnect() {
            debug!("disconnect on quit failed: {}", e);
        }
        self.move_to(ClientState::Terminated);
        Flow::Terminate
    }

    fn log_off(&mut self, _argument: Option<&str>) -> Flow {
        match self.transport.disconnect() {
            Ok(()) => {
                if self.state == ClientState::Connected {
                    self.move_to(ClientState::Disconnected);
                }
                self.notify("Logged off successfully.");
            }
            Err(e) => self.notify(&format!("Error logging off: {}", e)),
        }
        Flow::Continue
    }

    fn set_host(&mut self, argument: Option<&str>) -> Flow {
        if self.is_connected() {
            self.notify("Cannot change host while connected.");
            return Flow::Continue;
        }

        let host = argument.unwrap_or_default();
        self.host = host.to_string();
        self.notify(&format!("Host set to {}", host));
        Flow::Continue
    }

    fn set_port(&mut self, argument: Option<&str>) -> Flow {
        if self.is_connected() {
            self.notify("Cannot change port while connected.");
            return Flow::Continue;
        }

        let raw = argument.unwrap_or_default();
        match raw.parse::<u16>() {
            Ok(port) => {
                self.port = port;
                self.notify(&format!("Port set to {}", port));
            }
            Err(_) => self.notify(&format!("Invalid port number: {}", raw)),
        }
        Flow::Continue
    }

    fn login(&mut self, _argument: Option<&str>) -> Flow {
        if self.is_connected() {
            self.notify("Already connected to the server.");
            return Flow::Continue;
        }

        if let Err(e) = self.open_connection() {
            self.notify(&format!("Error connecting to server: {}", e));
        }
        Flow::Continue
    }

    fn get_host(&mut self, _argument: Option<&str>) -> Flow {
        self.notify(&format!("Current host: {}", self.host));
        Flow::Continue
    }

    fn get_port(&mut self, _argument: Option<&str>) -> Flow {
        self.notify(&format!("Current port: {}", self.port));
        Flow::Continue
    }
}

impl<T: ClientTransport, C: Console> Interpreter for ChatClient<T, C> {
    const ROLE: &'static str = "client";

    fn directives() -> DirectiveTable<Self> {
        DirectiveTable::new(vec![
            Directive::new("#quit", Arity::None, Self::quit),
            Directive::new("#logoff", Arity::None, Self::log_off),
            Directive::new("#sethost", Arity::Required, Self::set_host),
            Directive::new("#setport", Arity::Required, Self::set_port),
            Directive::new(LOGIN_DIRECTIVE, Arity::None, Self::login),
            Directive::new("#gethost", Arity::None, Self::get_host),
            Directive::new("#getport", Arity::None, Self::get_port),
        ])
    }

    fn chat(&mut self, text: &str) -> Flow {
        match self.transport.send(text) {
            Ok(()) => Flow::Continue,
            Err(e) => {
                debug!("send failed: {}", e);
                self.notify("Could not send message to server.  Terminating client.");
                self.quit(None)
            }
        }
    }

    fn notify(&self, text: &str) {
        self.console.display(text);
    }
}
