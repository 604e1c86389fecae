//! In-memory session storage.

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::traits::{Session, SessionStore, SharedSession, generate_session_id};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

/// Session store holding a single session record in process memory.
///
/// One store corresponds to one client session. Every operation takes the
/// lock once, so `take` is a true read-then-delete: two concurrent
/// validations of the same single-use token cannot both observe it.
///
/// # Examples
///
/// ```
/// use rampart_session::{MemorySessionStore, SessionConfig, SessionStore};
/// use serde_json::json;
///
/// let store = MemorySessionStore::new(SessionConfig::default());
/// store.set("csrf.session-token", json!("abc")).unwrap();
///
/// assert_eq!(store.take("csrf.session-token").unwrap(), Some(json!("abc")));
/// assert_eq!(store.get("csrf.session-token").unwrap(), None);
/// ```
#[derive(Debug)]
pub struct MemorySessionStore {
    session: RwLock<Session>,
    config: SessionConfig,
}

impl MemorySessionStore {
    /// Create a store backed by a fresh session with a generated ID.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_id(generate_session_id(), config)
    }

    /// Create a store backed by a fresh session with the given ID.
    pub fn with_id(id: impl Into<String>, config: SessionConfig) -> Self {
        let session = Session::new(id, config.effective_ttl());
        Self::from_session(session, config)
    }

    /// Wrap an existing session record.
    pub fn from_session(session: Session, config: SessionConfig) -> Self {
        Self {
            session: RwLock::new(session),
            config,
        }
    }

    /// Convert into the shared handle the CSRF layer expects.
    pub fn shared(self) -> SharedSession {
        Arc::new(self)
    }

    /// The backing session's ID.
    pub fn id(&self) -> String {
        self.session.read().id.clone()
    }

    /// A copy of the current session record.
    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    /// Store configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Push the expiry out by the configured TTL.
    pub fn refresh(&self) {
        let mut session = self.session.write();
        session.extend(self.config.effective_ttl());
        session.touch();
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

fn ensure_live(session: &Session) -> SessionResult<()> {
    if session.is_expired() {
        return Err(SessionError::Expired(session.id.clone()));
    }
    Ok(())
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> SessionResult<Option<Value>> {
        let session = self.session.read();
        ensure_live(&session)?;
        Ok(session.value(key)?.cloned())
    }

    fn set(&self, key: &str, value: Value) -> SessionResult<()> {
        let mut session = self.session.write();
        ensure_live(&session)?;
        trace!(session_id = %session.id, key, "session set");
        session.set(key, value)?;
        session.touch();
        Ok(())
    }

    fn delete(&self, key: &str) -> SessionResult<()> {
        let mut session = self.session.write();
        ensure_live(&session)?;
        trace!(session_id = %session.id, key, "session delete");
        session.remove(key)?;
        session.touch();
        Ok(())
    }

    fn take(&self, key: &str) -> SessionResult<Option<Value>> {
        let mut session = self.session.write();
        ensure_live(&session)?;
        let value = session.remove(key)?;
        session.touch();
        Ok(value)
    }

    fn get_entry(&self, key: &str, field: &str) -> SessionResult<Option<Value>> {
        let session = self.session.read();
        ensure_live(&session)?;
        Ok(session.entry(key, field)?.cloned())
    }

    fn set_entry(&self, key: &str, field: &str, value: Value) -> SessionResult<()> {
        let mut session = self.session.write();
        ensure_live(&session)?;
        trace!(session_id = %session.id, key, field, "session set entry");
        session.set_entry(key, field, value)?;
        session.touch();
        Ok(())
    }

    fn take_entry(&self, key: &str, field: &str) -> SessionResult<Option<Value>> {
        let mut session = self.session.write();
        ensure_live(&session)?;
        let value = session.remove_entry(key, field)?;
        session.touch();
        Ok(value)
    }

    fn delete_entry(&self, key: &str, field: &str) -> SessionResult<()> {
        let mut session = self.session.write();
        ensure_live(&session)?;
        trace!(session_id = %session.id, key, field, "session delete entry");
        session.remove_entry(key, field)?;
        session.touch();
        Ok(())
    }
}
