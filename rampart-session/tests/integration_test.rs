//! Integration tests for rampart-session

use rampart_session::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_session_config_builder() {
    let config = SessionConfig::default()
        .with_default_ttl(Duration::from_secs(600))
        .with_max_ttl(Duration::from_secs(1200));

    assert_eq!(config.default_ttl, Duration::from_secs(600));
    assert_eq!(config.max_ttl, Duration::from_secs(1200));
    assert_eq!(config.effective_ttl(), Duration::from_secs(600));
}

#[test]
fn test_memory_store_uses_configured_ttl() {
    let config = SessionConfig::default().with_default_ttl(Duration::from_secs(60));
    let store = MemorySessionStore::new(config);
    let session = store.snapshot();

    let ttl = session.expires_at - session.created_at;
    assert_eq!(ttl.num_seconds(), 60);
    assert!(!session.is_expired());
}

#[test]
fn test_memory_store_with_id() {
    let store = MemorySessionStore::with_id("session123", SessionConfig::default());
    assert_eq!(store.id(), "session123");
}

#[test]
fn test_shared_handle_sees_same_data() {
    let store = Arc::new(MemorySessionStore::default());
    let shared: SharedSession = store.clone();

    shared.set("csrf.session-token", json!("abc")).unwrap();
    assert_eq!(store.get("csrf.session-token").unwrap(), Some(json!("abc")));
    assert_eq!(
        store.snapshot().data.get("csrf"),
        Some(&json!({"session-token": "abc"}))
    );
}

#[test]
fn test_nested_delete_keeps_parent() {
    let store = MemorySessionStore::default();
    store.set("csrf.form-tokens.a", json!("1")).unwrap();
    store.set("csrf.form-tokens.b", json!("2")).unwrap();

    store.delete("csrf.form-tokens.a").unwrap();

    assert_eq!(store.get("csrf.form-tokens").unwrap(), Some(json!({"b": "2"})));
}

#[test]
fn test_invalid_key_is_rejected() {
    let store = MemorySessionStore::default();
    let err = store.set("csrf.", json!("x")).unwrap_err();
    assert!(matches!(err, SessionError::InvalidKey(_)));
    assert_eq!(err.to_string(), "Invalid session key: \"csrf.\"");
}

/// Store that only implements the required methods, relying on the defaults.
#[derive(Default)]
struct PlainStore(MemorySessionStore);

impl SessionStore for PlainStore {
    fn get(&self, key: &str) -> SessionResult<Option<serde_json::Value>> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: serde_json::Value) -> SessionResult<()> {
        self.0.set(key, value)
    }

    fn delete(&self, key: &str) -> SessionResult<()> {
        self.0.delete(key)
    }
}

#[test]
fn test_default_take_reads_then_deletes() {
    let store = PlainStore::default();
    store.set("once", json!("value")).unwrap();

    assert_eq!(store.take("once").unwrap(), Some(json!("value")));
    assert_eq!(store.take("once").unwrap(), None);
}

#[test]
fn test_default_entry_methods() {
    let store = PlainStore::default();
    store.set_entry("csrf.form-tokens", "user.edit", json!("a")).unwrap();
    store.set_entry("csrf.form-tokens", "user", json!("b")).unwrap();
    store.set_entry("csrf.form-tokens", "", json!("c")).unwrap();

    assert_eq!(
        store.get("csrf.form-tokens").unwrap(),
        Some(json!({"user.edit": "a", "user": "b", "": "c"}))
    );
    assert_eq!(store.take_entry("csrf.form-tokens", "user").unwrap(), Some(json!("b")));
    assert_eq!(store.take_entry("csrf.form-tokens", "user").unwrap(), None);

    store.delete_entry("csrf.form-tokens", "").unwrap();
    assert_eq!(store.get_entry("csrf.form-tokens", "").unwrap(), None);
    assert_eq!(
        store.get_entry("csrf.form-tokens", "user.edit").unwrap(),
        Some(json!("a"))
    );
}

#[test]
fn test_session_ids_are_unique() {
    let a = generate_session_id();
    let b = generate_session_id();
    assert_ne!(a, b);
    assert_eq!(a.len(), 36);
}
