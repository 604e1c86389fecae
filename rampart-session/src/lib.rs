//! Session store contract for Rampart.
//!
//! The CSRF drivers persist their tokens through [`SessionStore`], a small
//! key/value contract over `.`-delimited keys. Transport (cookies, headers)
//! and durable backends are the host application's concern; this crate only
//! ships [`MemorySessionStore`], which keeps one session record in process
//! memory and is what the tests and benchmarks run against.
//!
//! # Examples
//!
//! ```
//! use rampart_session::prelude::*;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), SessionError> {
//! let config = SessionConfig::default().with_default_ttl(Duration::from_secs(900));
//! let store = MemorySessionStore::new(config);
//!
//! store.set("csrf.form-tokens.login", json!("token-a"))?;
//! store.set("csrf.form-tokens.signup", json!("token-b"))?;
//!
//! // Nested keys share the same parent map
//! let tokens = store.get("csrf.form-tokens")?.unwrap();
//! assert_eq!(tokens["login"], "token-a");
//!
//! // Single-use reads
//! assert_eq!(store.take("csrf.form-tokens.login")?, Some(json!("token-a")));
//! assert_eq!(store.take("csrf.form-tokens.login")?, None);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use memory::MemorySessionStore;
pub use traits::{Session, SessionStore, SharedSession, generate_session_id};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SessionConfig;
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::memory::MemorySessionStore;
    pub use crate::traits::{Session, SessionStore, SharedSession, generate_session_id};
}
