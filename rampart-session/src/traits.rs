//! Session data and the session store contract.

use crate::error::{SessionError, SessionResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Shared handle to a session store, as held by the CSRF manager.
pub type SharedSession = Arc<dyn SessionStore>;

/// Session data structure.
///
/// Data keys are `.`-delimited paths into nested maps: writing
/// `csrf.form-tokens.login` creates (or reuses) the `csrf` and `form-tokens`
/// maps and stores the value under `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Session data as nested key-value maps
    pub data: Map<String, Value>,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last access timestamp
    pub last_accessed_at: DateTime<Utc>,
    /// Session expiration timestamp
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session with the given ID and TTL.
    pub fn new(id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            data: Map::new(),
            created_at: now,
            last_accessed_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or_default(),
        }
    }

    /// Check if the session has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Get the raw value stored at `key`.
    pub fn value(&self, key: &str) -> SessionResult<Option<&Value>> {
        let segments = split_key(key)?;
        Ok(lookup_path(&self.data, &segments))
    }

    /// Get a value from the session data, deserialized into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> SessionResult<Option<T>> {
        match self.value(key)? {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| SessionError::Deserialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Set a value in the session data.
    ///
    /// Intermediate segments that hold a non-map value are replaced by maps.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> SessionResult<()> {
        let segments = split_key(key)?;
        let json_value =
            serde_json::to_value(value).map_err(|e| SessionError::Serialization(e.to_string()))?;
        insert_path(&mut self.data, &segments, json_value);
        Ok(())
    }

    /// Remove a value from the session data.
    pub fn remove(&mut self, key: &str) -> SessionResult<Option<Value>> {
        let segments = split_key(key)?;
        Ok(remove_path(&mut self.data, &segments))
    }

    /// Get `field` of the map stored at `key`.
    ///
    /// `field` is a plain map key, never split on `.`.
    pub fn entry(&self, key: &str, field: &str) -> SessionResult<Option<&Value>> {
        Ok(self.value(key)?.and_then(|map| map.get(field)))
    }

    /// Set `field` of the map stored at `key`, creating the map if needed.
    ///
    /// A non-map value at `key` is replaced by a map.
    pub fn set_entry(&mut self, key: &str, field: &str, value: Value) -> SessionResult<()> {
        let segments = split_key(key)?;
        let mut map = match remove_path(&mut self.data, &segments) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        map.insert(field.to_string(), value);
        insert_path(&mut self.data, &segments, Value::Object(map));
        Ok(())
    }

    /// Remove `field` from the map stored at `key`, leaving other fields.
    pub fn remove_entry(&mut self, key: &str, field: &str) -> SessionResult<Option<Value>> {
        let segments = split_key(key)?;
        Ok(match lookup_path_mut(&mut self.data, &segments) {
            Some(Value::Object(map)) => map.remove(field),
            _ => None,
        })
    }

    /// Check if a key exists in the session data.
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.value(key), Ok(Some(_)))
    }

    /// Clear all session data.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Update the last accessed timestamp.
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// Extend the session expiration.
    pub fn extend(&mut self, ttl: Duration) {
        self.expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default();
    }
}

/// Key/value contract the CSRF drivers persist tokens through.
///
/// Implementations own TTL and transport. Keys are `.`-delimited paths; the
/// `*_entry` methods address one field of the map stored at a key, and that
/// field is taken verbatim.
pub trait SessionStore: Send + Sync {
    /// Get the value stored at `key`, if any.
    fn get(&self, key: &str) -> SessionResult<Option<Value>>;

    /// Store `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> SessionResult<()>;

    /// Delete the value stored at `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> SessionResult<()>;

    /// Read the value at `key` and delete it.
    ///
    /// The default is a plain get followed by a delete, which is not atomic.
    /// Stores shared between concurrent requests should override it.
    fn take(&self, key: &str) -> SessionResult<Option<Value>> {
        let value = self.get(key)?;
        if value.is_some() {
            self.delete(key)?;
        }
        Ok(value)
    }

    /// Get `field` of the map stored at `key`.
    ///
    /// Fields are plain map keys: `.` in a field is not a path separator and
    /// the empty string is a valid field.
    fn get_entry(&self, key: &str, field: &str) -> SessionResult<Option<Value>> {
        Ok(self
            .get(key)?
            .and_then(|mut map| map.get_mut(field).map(Value::take)))
    }

    /// Set `field` of the map stored at `key`, keeping its other fields.
    ///
    /// The default rewrites the whole map through `get` and `set`, which is
    /// not atomic.
    fn set_entry(&self, key: &str, field: &str, value: Value) -> SessionResult<()> {
        let mut map = match self.get(key)? {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        map.insert(field.to_string(), value);
        self.set(key, Value::Object(map))
    }

    /// Read `field` of the map stored at `key` and remove it.
    ///
    /// The default is not atomic; see [`take`](SessionStore::take).
    fn take_entry(&self, key: &str, field: &str) -> SessionResult<Option<Value>> {
        let Some(Value::Object(mut map)) = self.get(key)? else {
            return Ok(None);
        };
        let value = map.remove(field);
        if value.is_some() {
            self.set(key, Value::Object(map))?;
        }
        Ok(value)
    }

    /// Remove `field` from the map stored at `key`. A missing field is not an error.
    fn delete_entry(&self, key: &str, field: &str) -> SessionResult<()> {
        self.take_entry(key, field).map(drop)
    }
}

/// Generate a new unique session ID.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn split_key(key: &str) -> SessionResult<Vec<&str>> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(SessionError::InvalidKey(key.to_string()));
    }
    Ok(segments)
}

fn lookup_path<'a>(map: &'a Map<String, Value>, segments: &[&str]) -> Option<&'a Value> {
    match segments {
        [] => None,
        [last] => map.get(*last),
        [head, rest @ ..] => match map.get(*head) {
            Some(Value::Object(child)) => lookup_path(child, rest),
            _ => None,
        },
    }
}

fn lookup_path_mut<'a>(
    map: &'a mut Map<String, Value>,
    segments: &[&str],
) -> Option<&'a mut Value> {
    match segments {
        [] => None,
        [last] => map.get_mut(*last),
        [head, rest @ ..] => match map.get_mut(*head) {
            Some(Value::Object(child)) => lookup_path_mut(child, rest),
            _ => None,
        },
    }
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = map
                .entry(*head)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child_map) = child {
                insert_path(child_map, rest, value);
            } else {
                let mut child_map = Map::new();
                insert_path(&mut child_map, rest, value);
                *child = Value::Object(child_map);
            }
        }
    }
}

fn remove_path(map: &mut Map<String, Value>, segments: &[&str]) -> Option<Value> {
    match segments {
        [] => None,
        [last] => map.remove(*last),
        [head, rest @ ..] => match map.get_mut(*head) {
            Some(Value::Object(child)) => remove_path(child, rest),
            _ => None,
        },
    }
}
