//! Operator console for the server.

use std::sync::Arc;

use tracing::{info, warn};

use super::ChatServer;
use crate::command::{Arity, Directive, DirectiveTable, Flow, Interpreter};
use crate::console::Console;
use crate::transport::ServerTransport;

/// Prefix on every line the operator sends.
pub const SERVER_MSG_PREFIX: &str = "SERVER MSG> ";

/// Interprets operator input for a [`ChatServer`].
pub struct ServerConsole<T: ServerTransport, C: Console> {
    server: Arc<ChatServer<T>>,
    console: C,
}

impl<T: ServerTransport, C: Console> ServerConsole<T, C> {
    pub fn new(server: Arc<ChatServer<T>>, console: C) -> Self {
        Self { server, console }
    }

    pub fn server(&self) -> &Arc<ChatServer<T>> {
        &self.server
    }

    /// Close the server outside of `#quit`, e.g. on an interrupt.
    pub fn shutdown(&self) {
        if let Err(e) = self.server.close() {
            warn!("error closing server during shutdown: {}", e);
        }
    }

    fn quit(&mut self, _argument: Option<&str>) -> Flow {
        match self.server.close() {
            Ok(()) => {
                info!("server console quitting");
                Flow::Terminate
            }
            Err(e) => {
                self.notify(&format!("Error quitting server: {}", e));
                Flow::Continue
            }
        }
    }

    fn stop(&mut self, _argument: Option<&str>) -> Flow {
        if let Err(e) = self.server.stop_listening() {
            warn!("failed to stop listening: {}", e);
        }
        Flow::Continue
    }

    fn close(&mut self, _argument: Option<&str>) -> Flow {
        if let Err(e) = self.server.close() {
            self.notify(&format!("Error closing server: {}", e));
        }
        Flow::Continue
    }

    fn set_port(&mut self, argument: Option<&str>) -> Flow {
        let raw = argument.unwrap_or_default();
        if self.server.is_listening() {
            self.notify("Cannot change port while server is running.");
            return Flow::Continue;
        }

        match raw.parse::<u16>() {
            Ok(port) => {
                self.server.set_port(port);
                self.notify(&format!("Port set to {}", port));
            }
            Err(_) => self.notify(&format!("Invalid port number: {}", raw)),
        }
        Flow::Continue
    }

    fn start(&mut self, _argument: Option<&str>) -> Flow {
        if self.server.is_listening() {
            self.notify("Server is already running.");
        } else if let Err(e) = self.server.listen() {
            self.notify(&format!("Error starting server: {}", e));
        }
        Flow::Continue
    }

    fn get_port(&mut self, _argument: Option<&str>) -> Flow {
        self.notify(&format!("Current port: {}", self.server.port()));
        Flow::Continue
    }
}

impl<T: ServerTransport, C: Console> Interpreter for ServerConsole<T, C> {
    const ROLE: &'static str = "server";

    fn directives() -> DirectiveTable<Self> {
        DirectiveTable::new(vec![
            Directive::new("#quit", Arity::None, Self::quit),
            Directive::new("#stop", Arity::None, Self::stop),
            Directive::new("#close", Arity::None, Self::close),
            Directive::new("#setport", Arity::Required, Self::set_port),
            Directive::new("#start", Arity::None, Self::start),
            Directive::new("#getport", Arity::None, Self::get_port),
        ])
    }

    fn chat(&mut self, text: &str) -> Flow {
        if text.is_empty() {
            return Flow::Continue;
        }

        let line = format!("{}{}", SERVER_MSG_PREFIX, text);
        self.console.display(&line);
        if let Err(e) = self.server.broadcast(&line) {
            warn!("failed to broadcast server message: {}", e);
        }
        Flow::Continue
    }

    fn notify(&self, text: &str) {
        self.console.display(text);
    }
}
