//! Client side of the chat protocol.

mod endpoint;

pub use endpoint::{ChatClient, ClientConfig};
