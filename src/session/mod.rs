//! Session management module.
//!
//! Connection identity, the server-side registry binding connections to
//! login ids, and the client-side connection lifecycle.

mod id;
mod registry;
mod state;

pub use id::ConnectionId;
pub use registry::{Session, SessionRegistry};
pub use state::ClientState;
