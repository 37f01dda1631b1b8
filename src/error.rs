//! Error types for simple-chat.

use thiserror::Error;

use crate::session::ClientState;

/// Main error type for simple-chat operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// No server accepted the connection.
    #[error("connection refused: {host}:{port}")]
    ConnectionRefused { host: String, port: u16 },

    /// Operation needs an open connection.
    #[error("not connected")]
    NotConnected,

    /// Connection handle is unknown to the transport.
    #[error("connection not found: {0}")]
    ConnectionNotFound(String),

    /// A login id is already bound to the connection.
    #[error("login id already bound on {connection}: {login_id}")]
    AlreadyLoggedIn {
        connection: String,
        login_id: String,
    },

    /// Invalid client state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition { from: ClientState, to: ClientState },

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// Peer inbox has gone away.
    #[error("channel closed")]
    ChannelClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for simple-chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
