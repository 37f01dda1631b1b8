//! # simple-chat
//!
//! A minimal multi-user chat protocol.
//!
//! A server binds each connection to a login id, broadcasts chat between
//! logged-in clients, and lets an operator console control the listener.
//! Both ends understand an in-band command language of `#`-prefixed
//! directives. The protocol core is transport-agnostic: it talks to the
//! network only through the traits in [`transport`].
//!
//! ## Features
//!
//! - **Session registry**: one login id per connection, bound exactly once
//! - **Broadcast routing**: logins and chat fan out to every connection
//! - **Directive interpreter**: one dispatch algorithm, one table per role
//! - **Loopback transport**: an in-process transport for embedding and tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use simple_chat::{
//!     ChatClient, ChatServer, ClientConfig, Interpreter, MemoryClient, MemoryHub, StdoutConsole,
//! };
//!
//! fn main() -> simple_chat::Result<()> {
//!     simple_chat::logging::try_init().ok();
//!
//!     let hub = Arc::new(MemoryHub::new());
//!     let server = Arc::new(ChatServer::new(Arc::clone(&hub), 5555));
//!     hub.attach(&server);
//!     server.listen()?;
//!
//!     let mut alice = ChatClient::new(
//!         ClientConfig::new("alice"),
//!         MemoryClient::new(Arc::clone(&hub)),
//!         StdoutConsole,
//!     );
//!     alice.interpret("hello everyone");
//!
//!     let events = alice.transport_mut().drain_events();
//!     alice.handle_events(events);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod server;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use client::{ChatClient, ClientConfig};
pub use command::{Flow, Interpreter};
pub use console::{Console, StdoutConsole, Transcript};
pub use error::{ChatError, Result};
pub use server::{ChatServer, ServerConsole};
pub use session::{ClientState, ConnectionId, Session, SessionRegistry};
pub use transport::{
    ClientEvent, ClientTransport, MemoryClient, MemoryHub, ServerHandler, ServerTransport,
};
