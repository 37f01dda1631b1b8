//! Server-side mapping from live connections to login ids.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use super::ConnectionId;
use crate::error::ChatError;
use crate::Result;

/// Server-side state for one live connection.
#[derive(Debug, Clone)]
pub struct Session {
    /// Connection this session belongs to.
    pub connection: ConnectionId,
    /// Login id, absent until the client has logged in.
    login_id: Option<String>,
    /// Time of first contact.
    pub opened_at: Instant,
}

impl Session {
    /// Create an anonymous session for the given connection.
    pub fn new(connection: ConnectionId) -> Self {
        Self {
            connection,
            login_id: None,
            opened_at: Instant::now(),
        }
    }

    /// The bound login id, if any.
    pub fn login_id(&self) -> Option<&str> {
        self.login_id.as_deref()
    }

    /// Check whether a login id has been bound.
    pub fn is_logged_in(&self) -> bool {
        self.login_id.is_some()
    }
}

/// Thread-safe registry of sessions keyed by connection.
///
/// Lookups take a shared lock; binding a login id checks and sets under a
/// single exclusive lock so two login attempts on the same connection can
/// never both succeed.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnectionId, Session>>,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Record first contact from a connection.
    ///
    /// Opening an already known connection leaves its session untouched.
    pub fn open(&self, connection: ConnectionId) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| ChatError::LockPoisoned)?;

        sessions
            .entry(connection)
            .or_insert_with(|| Session::new(connection));
        Ok(())
    }

    /// Get a clone of the session for a connection.
    pub fn get(&self, connection: &ConnectionId) -> Result<Option<Session>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| ChatError::LockPoisoned)?;
        Ok(sessions.get(connection).cloned())
    }

    /// Look up the login id bound to a connection.
    pub fn login_id(&self, connection: &ConnectionId) -> Result<Option<String>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| ChatError::LockPoisoned)?;
        Ok(sessions
            .get(connection)
            .and_then(|s| s.login_id.clone()))
    }

    /// Bind a login id to an open connection.
    ///
    /// Fails with [`ChatError::ConnectionNotFound`] if the connection was
    /// never opened or has already been removed. A login id is bound at most
    /// once; a second attempt fails with [`ChatError::AlreadyLoggedIn`] and
    /// leaves the existing binding in place.
    pub fn bind_login(&self, connection: ConnectionId, login_id: &str) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| ChatError::LockPoisoned)?;

        let session = sessions
            .get_mut(&connection)
            .ok_or_else(|| ChatError::ConnectionNotFound(connection.to_string()))?;

        if let Some(existing) = &session.login_id {
            return Err(ChatError::AlreadyLoggedIn {
                connection: connection.to_string(),
                login_id: existing.clone(),
            });
        }

        session.login_id = Some(login_id.to_string());
        Ok(())
    }

    /// Forget a connection.
    ///
    /// Returns the removed session, or None if it was never seen.
    pub fn remove(&self, connection: &ConnectionId) -> Result<Option<Session>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| ChatError::LockPoisoned)?;
        Ok(sessions.remove(connection))
    }

    /// Get the number of live sessions.
    pub fn count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// List the login ids currently bound, in no particular order.
    pub fn login_ids(&self) -> Result<Vec<String>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| ChatError::LockPoisoned)?;
        Ok(sessions
            .values()
            .filter_map(|s| s.login_id.clone())
            .collect())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_anonymous() {
        let registry = SessionRegistry::new();
        let conn = ConnectionId::new();
        registry.open(conn).unwrap();

        let session = registry.get(&conn).unwrap().unwrap();
        assert_eq!(session.connection, conn);
        assert!(!session.is_logged_in());
        assert_eq!(registry.login_id(&conn).unwrap(), None);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_open_twice_keeps_binding() {
        let registry = SessionRegistry::new();
        let conn = ConnectionId::new();
        registry.open(conn).unwrap();
        registry.bind_login(conn, "alice").unwrap();
        registry.open(conn).unwrap();

        assert_eq!(registry.login_id(&conn).unwrap().as_deref(), Some("alice"));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_bind_open_session() {
        let registry = SessionRegistry::new();
        let conn = ConnectionId::new();
        registry.open(conn).unwrap();
        registry.bind_login(conn, "bob").unwrap();

        let session = registry.get(&conn).unwrap().unwrap();
        assert_eq!(session.login_id(), Some("bob"));
    }

    #[test]
    fn test_bind_unknown_connection_fails() {
        let registry = SessionRegistry::new();
        let conn = ConnectionId::new();

        let err = registry.bind_login(conn, "ghost").unwrap_err();
        assert!(matches!(err, ChatError::ConnectionNotFound(_)));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_bind_after_remove_does_not_resurrect() {
        let registry = SessionRegistry::new();
        let conn = ConnectionId::new();
        registry.open(conn).unwrap();
        registry.remove(&conn).unwrap();

        assert!(registry.bind_login(conn, "ghost").is_err());
        assert!(registry.get(&conn).unwrap().is_none());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_bind_is_immutable() {
        let registry = SessionRegistry::new();
        let conn = ConnectionId::new();
        registry.open(conn).unwrap();
        registry.bind_login(conn, "alice").unwrap();

        let err = registry.bind_login(conn, "mallory").unwrap_err();
        assert!(matches!(err, ChatError::AlreadyLoggedIn { ref login_id, .. } if login_id == "alice"));
        assert_eq!(registry.login_id(&conn).unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn test_unknown_connection() {
        let registry = SessionRegistry::new();
        let fake = ConnectionId::from_raw(999_999);

        assert!(registry.get(&fake).unwrap().is_none());
        assert_eq!(registry.login_id(&fake).unwrap(), None);
        assert!(registry.remove(&fake).unwrap().is_none());
    }

    #[test]
    fn test_remove_forgets_login() {
        let registry = SessionRegistry::new();
        let conn = ConnectionId::new();
        registry.open(conn).unwrap();
        registry.bind_login(conn, "carol").unwrap();

        let removed = registry.remove(&conn).unwrap().unwrap();
        assert_eq!(removed.login_id(), Some("carol"));
        assert_eq!(registry.login_id(&conn).unwrap(), None);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_login_ids() {
        let registry = SessionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let anon = ConnectionId::new();
        registry.open(a).unwrap();
        registry.open(b).unwrap();
        registry.bind_login(a, "alice").unwrap();
        registry.bind_login(b, "bob").unwrap();
        registry.open(anon).unwrap();

        let mut ids = registry.login_ids().unwrap();
        ids.sort();
        assert_eq!(ids, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_concurrent_login_same_connection() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(SessionRegistry::new());
        let conn = ConnectionId::new();
        registry.open(conn).unwrap();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.bind_login(conn, &format!("user{}", i)).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        // Exactly one login may bind
        assert_eq!(winners, 1);
        assert_eq!(registry.count(), 1);
    }
}
