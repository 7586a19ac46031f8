//! Session store over the storage port.
//!
//! Login is a mock boundary: it fabricates an identity and an opaque token
//! rather than exchanging credentials with the remote store. The role is
//! fixed at login and never re-derived from server state.

use rand::Rng;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{Role, Session};
use crate::storage::Storage;

/// Storage key holding the serialized session user.
pub const SESSION_KEY: &str = "user";

pub struct SessionStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Start a session. The display name defaults to the email local part
    /// when not given explicitly.
    pub fn login(&self, email: &str, name: Option<&str>, role: Role) -> Result<Session> {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

        let session = Session {
            id: rand::thread_rng().gen_range(1..=999),
            name,
            email: email.to_string(),
            role,
            token: format!("mock-jwt-token-{}", self.clock.now().timestamp_millis()),
        };

        let blob = serde_json::to_string(&session)
            .map_err(|e| crate::error::Error::Storage(format!("cannot encode session: {e}")))?;
        self.storage.set(SESSION_KEY, &blob)?;
        Ok(session)
    }

    /// The current session, if any. Corrupt or unreadable session state
    /// degrades to logged-out rather than failing the caller.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        let blob = match self.storage.get(SESSION_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("session read failed, treating as logged out: {e}");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&blob) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("corrupt session blob, treating as logged out: {e}");
                None
            }
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.storage.remove(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::{SESSION_KEY, SessionStore};
    use crate::clock::SystemClock;
    use crate::model::Role;
    use crate::storage::{MemoryStorage, Storage};
    use std::sync::Arc;

    fn store() -> (Arc<MemoryStorage>, SessionStore) {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = SessionStore::new(storage.clone(), Arc::new(SystemClock));
        (storage, sessions)
    }

    #[test]
    fn login_persists_and_current_reads_back() {
        let (_, sessions) = store();
        let session = sessions
            .login("jane@example.org", None, Role::Citizen)
            .expect("login");
        assert_eq!(session.name, "jane");
        assert!(session.token.starts_with("mock-jwt-token-"));

        let current = sessions.current().expect("should be logged in");
        assert_eq!(current, session);
    }

    #[test]
    fn explicit_name_wins_over_email_local_part() {
        let (_, sessions) = store();
        let session = sessions
            .login("jane@example.org", Some("Jane Doe"), Role::Politician)
            .expect("login");
        assert_eq!(session.name, "Jane Doe");
        assert_eq!(session.role, Role::Politician);
    }

    #[test]
    fn logout_clears_the_session() {
        let (_, sessions) = store();
        sessions
            .login("jane@example.org", None, Role::Admin)
            .expect("login");
        sessions.logout().expect("logout");
        assert!(sessions.current().is_none());
    }

    #[test]
    fn corrupt_session_degrades_to_logged_out() {
        let (storage, sessions) = store();
        storage.set(SESSION_KEY, "{not json").expect("seed corrupt");
        assert!(sessions.current().is_none());
    }
}
