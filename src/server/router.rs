//! Message routing and transport callbacks for the server.

use tracing::{debug, error, info, warn};

use super::ChatServer;
use crate::command::LOGIN_DIRECTIVE;
use crate::error::ChatError;
use crate::session::ConnectionId;
use crate::transport::{ServerHandler, ServerTransport};

/// Where an inbound payload goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    /// Bind this login id to the sender, then announce it.
    Login(&'a str),
    /// Login directive without an id; the sender is dropped.
    MissingLoginId,
    /// Broadcast this line to everyone.
    Chat(String),
    /// Anonymous chat; silently discarded.
    Ignore,
}

/// Decide what to do with `payload` from a connection bound to `login_id`.
pub fn route<'a>(payload: &'a str, login_id: Option<&str>) -> Route<'a> {
    if payload.starts_with(LOGIN_DIRECTIVE) {
        return match payload.split_whitespace().nth(1) {
            Some(id) => Route::Login(id),
            None => Route::MissingLoginId,
        };
    }

    match login_id {
        Some(id) => Route::Chat(format!("{}> {}", id, payload)),
        None => Route::Ignore,
    }
}

/// Broadcast text announcing a new login.
pub fn logged_on_notice(login_id: &str) -> String {
    format!("{} has logged on.", login_id)
}

impl<T: ServerTransport> ChatServer<T> {
    fn broadcast_or_log(&self, payload: &str) {
        if let Err(e) = self.broadcast(payload) {
            error!("broadcast failed: {}", e);
        }
    }

    fn login(&self, connection: ConnectionId, login_id: &str) {
        match self.registry().bind_login(connection, login_id) {
            Ok(()) => {
                info!(%connection, "{} has logged on.", login_id);
                self.broadcast_or_log(&logged_on_notice(login_id));
            }
            Err(ChatError::AlreadyLoggedIn {
                login_id: current, ..
            }) => {
                warn!(%connection, %current, attempted = login_id, "login id already bound, ignoring");
            }
            Err(ChatError::ConnectionNotFound(_)) => {
                debug!(%connection, attempted = login_id, "login from a closed connection, ignoring");
            }
            Err(e) => error!(%connection, "failed to bind login id: {}", e),
        }
    }

    /// Forget a connection and log who left.
    fn forget(&self, connection: ConnectionId) {
        match self.registry().remove(&connection) {
            Ok(Some(session)) => {
                let online = session.opened_at.elapsed();
                match session.login_id() {
                    Some(id) => info!(%connection, ?online, "{} has disconnected.", id),
                    None => info!(%connection, ?online, "A client has disconnected."),
                }
            }
            Ok(None) => info!(%connection, "A client has disconnected."),
            Err(e) => error!(%connection, "failed to forget session: {}", e),
        }
    }
}

impl<T: ServerTransport> ServerHandler for ChatServer<T> {
    fn on_server_started(&self) {
        info!("Server listening for connections on port {}", self.port());
    }

    fn on_server_stopped(&self) {
        info!("Server has stopped listening for connections.");
    }

    fn on_client_connected(&self, connection: ConnectionId) {
        if let Err(e) = self.registry().open(connection) {
            error!(%connection, "failed to open session: {}", e);
            return;
        }
        info!(%connection, "A client has connected.");
    }

    fn on_client_message(&self, payload: &str, connection: ConnectionId) {
        let login_id = match self.registry().login_id(&connection) {
            Ok(id) => id,
            Err(e) => {
                error!(%connection, "session lookup failed: {}", e);
                return;
            }
        };

        info!(
            %connection,
            "Message received: {} from {}",
            payload,
            login_id.as_deref().unwrap_or("null")
        );

        match route(payload, login_id.as_deref()) {
            Route::Login(id) => self.login(connection, id),
            Route::MissingLoginId => {
                warn!(%connection, "ERROR - No login ID provided.");
                if let Err(e) = self.transport().close_connection(connection) {
                    warn!(%connection, "Error closing connection: {}", e);
                }
            }
            Route::Chat(line) => self.broadcast_or_log(&line),
            Route::Ignore => debug!(%connection, "dropping message from anonymous connection"),
        }
    }

    fn on_client_disconnected(&self, connection: ConnectionId) {
        self.forget(connection);
    }

    fn on_client_error(&self, connection: ConnectionId, cause: &str) {
        debug!(%connection, cause, "client connection failed");
        self.forget(connection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use std::sync::{Arc, Mutex};

    /// Transport that only records what the server asked of it.
    #[derive(Default)]
    struct Wire {
        broadcasts: Mutex<Vec<String>>,
        closed: Mutex<Vec<ConnectionId>>,
    }

    impl Wire {
        fn broadcasts(&self) -> Vec<String> {
            self.broadcasts.lock().unwrap().clone()
        }
    }

    impl ServerTransport for Wire {
        fn listen(&self, _port: u16) -> Result<()> {
            Ok(())
        }

        fn stop_listening(&self) -> Result<()> {
            Ok(())
        }

        fn close(&self) -> Result<()> {
            Ok(())
        }

        fn is_listening(&self) -> bool {
            true
        }

        fn broadcast(&self, payload: &str) -> Result<()> {
            self.broadcasts.lock().unwrap().push(payload.to_string());
            Ok(())
        }

        fn close_connection(&self, connection: ConnectionId) -> Result<()> {
            self.closed.lock().unwrap().push(connection);
            Ok(())
        }
    }

    fn server() -> (Arc<Wire>, ChatServer<Wire>) {
        let wire = Arc::new(Wire::default());
        let server = ChatServer::new(Arc::clone(&wire), 5555);
        (wire, server)
    }

    #[test]
    fn test_login_binds_and_announces() {
        let (wire, server) = server();
        let conn = ConnectionId::new();
        server.on_client_connected(conn);
        server.on_client_message("#login alice", conn);
        server.on_client_message("hi", conn);

        assert_eq!(wire.broadcasts(), vec!["alice has logged on.", "alice> hi"]);
        assert_eq!(
            server.registry().login_id(&conn).unwrap().as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn test_missing_login_id_closes_connection() {
        let (wire, server) = server();
        let conn = ConnectionId::new();
        server.on_client_connected(conn);
        server.on_client_message("#login", conn);

        assert_eq!(*wire.closed.lock().unwrap(), vec![conn]);
        assert!(wire.broadcasts().is_empty());
    }

    #[test]
    fn test_late_login_after_disconnect_is_dropped() {
        let (wire, server) = server();
        let conn = ConnectionId::new();
        server.on_client_connected(conn);
        server.on_client_disconnected(conn);

        server.on_client_message("#login ghost", conn);

        assert_eq!(server.registry().count(), 0);
        assert!(wire.broadcasts().is_empty());
    }

    #[test]
    fn test_client_error_forgets_session() {
        let (_wire, server) = server();
        let conn = ConnectionId::new();
        server.on_client_connected(conn);
        server.on_client_message("#login alice", conn);

        server.on_client_error(conn, "reset by peer");

        assert_eq!(server.registry().count(), 0);
    }

    #[test]
    fn test_route_login() {
        assert_eq!(route("#login alice", None), Route::Login("alice"));
        assert_eq!(route("#login   alice  extra", None), Route::Login("alice"));
    }

    #[test]
    fn test_route_login_missing_id() {
        assert_eq!(route("#login", None), Route::MissingLoginId);
        assert_eq!(route("#login   ", Some("bob")), Route::MissingLoginId);
    }

    #[test]
    fn test_route_login_prefix_match() {
        assert_eq!(route("#loginx alice", None), Route::Login("alice"));
        assert_eq!(route("#loginx", None), Route::MissingLoginId);
    }

    #[test]
    fn test_route_chat() {
        assert_eq!(
            route("hello", Some("bob")),
            Route::Chat("bob> hello".to_string())
        );
        assert_eq!(route("", Some("bob")), Route::Chat("bob> ".to_string()));
    }

    #[test]
    fn test_route_anonymous_chat_ignored() {
        assert_eq!(route("hello", None), Route::Ignore);
        assert_eq!(route("#quit", None), Route::Ignore);
    }

    #[test]
    fn test_route_other_directive_is_chat() {
        assert_eq!(
            route("#whatever", Some("bob")),
            Route::Chat("bob> #whatever".to_string())
        );
    }

    #[test]
    fn test_logged_on_notice() {
        assert_eq!(logged_on_notice("alice"), "alice has logged on.");
    }
}
