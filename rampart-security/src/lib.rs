//! Input sanitization and CSRF mitigation for Rampart
//!
//! [`SecurityManager`] runs values through configurable filter chains. A
//! chain entry is a registered filter name, a filter instance, a plain
//! function, or (when a name matches no filter) a regex character class
//! whose characters are stripped.
//!
//! Values are modelled by [`Value`]: scalars, owned lists and maps, shared
//! nodes with identity (which may form cycles), and host objects. The
//! traversal records what it has cleaned, so shared nodes are visited once
//! and cycles terminate.
//!
//! # Example
//!
//! ```
//! use rampart_security::prelude::*;
//! use rampart_session::MemorySessionStore;
//!
//! # fn main() -> Result<(), SecurityError> {
//! let config = SecurityConfig::from_toml_str(
//!     r#"
//!     input_filter = ["htmlentities"]
//!     uri_filter = "htmlentities"
//!
//!     [csrf]
//!     driver = "form"
//!     "#,
//! )?;
//!
//! let session = MemorySessionStore::default().shared();
//! let mut security = SecurityManager::new(config).with_session(session);
//!
//! let input = Value::from(serde_json::json!({"comment": "<b>hi</b> & 'q'"}));
//! let cleaned = security.clean(input, FilterKind::Input)?;
//! assert_eq!(
//!     cleaned.to_json(16)?,
//!     serde_json::json!({"comment": "&lt;b&gt;hi&lt;/b&gt; &amp; &#039;q&#039;"})
//! );
//!
//! let token = security.csrf()?.get_token("comment-form")?;
//! assert!(security.csrf()?.validate_token("comment-form", token.as_str())?);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod cleaned;
pub mod config;
pub mod error;
pub mod filter;
pub mod html;
pub mod manager;
pub mod uri;
pub mod value;

pub use chain::{FilterFn, FilterSpec};
pub use cleaned::CleanedSet;
pub use config::{ConfigFormat, DEFAULT_MAX_DEPTH, FilterKind, QuoteStyle, SecurityConfig};
pub use error::{Result, SecurityError};
pub use filter::{
    Filter, FilterContext, FilterFactory, FilterRegistry, HtmlEntities, StripTags, XssFilter,
    clean_value,
};
#[cfg(feature = "ammonia")]
pub use html::AmmoniaCleaner;
pub use html::HtmlCleaner;
pub use manager::SecurityManager;
pub use uri::normalize_path;
pub use value::{Container, ObjectRef, ObjectValue, SharedNode, Value};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chain::FilterSpec;
    pub use crate::config::{FilterKind, QuoteStyle, SecurityConfig};
    pub use crate::error::SecurityError;
    pub use crate::filter::{Filter, FilterRegistry, HtmlEntities};
    pub use crate::html::HtmlCleaner;
    pub use crate::manager::SecurityManager;
    pub use crate::value::{ObjectValue, SharedNode, Value};
    pub use rampart_csrf::{CsrfConfig, CsrfManager, CsrfToken};
}
