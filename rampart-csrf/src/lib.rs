//! CSRF (Cross-Site Request Forgery) mitigation for Rampart
//!
//! Tokens are issued and checked by a driver selected from configuration:
//!
//! - `noop`: mitigation disabled; the sentinel `dummy-token` always validates
//! - `session`: one token per session, reusable until regenerated
//! - `form` (`per_form`): one single-use token per form identifier
//!
//! Drivers persist through the [`rampart_session::SessionStore`] handed to
//! the [`CsrfManager`].
//!
//! # Example
//!
//! ```
//! use rampart_csrf::*;
//! use rampart_session::MemorySessionStore;
//!
//! # fn main() -> Result<()> {
//! let session = MemorySessionStore::default().shared();
//! let csrf = CsrfManager::new(&CsrfConfig::new("session"), Some(session))?;
//!
//! let token = csrf.get_token("")?;
//! assert!(csrf.validate_token("", token.as_str())?);
//! assert!(csrf.validate_token("", token.as_str())?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod manager;
pub mod registry;
pub mod token;

pub use config::CsrfConfig;
pub use driver::{
    CsrfDriver, DriverContext, NOOP_TOKEN, NoopDriver, PerFormTokenDriver, SessionTokenDriver,
};
pub use error::{CsrfError, Result};
pub use manager::CsrfManager;
pub use registry::{DriverFactory, DriverRegistry};
pub use token::{CsrfToken, TOKEN_BYTES, TokenGenerator, TokenSource};
