//! CSRF mitigation drivers.
//!
//! A driver owns the token policy: where a token is stored, whether it
//! survives validation, and what a subject key means. Drivers hold no
//! reference to their manager; the manager passes a [`DriverContext`] on
//! every call instead.

mod form;
mod noop;
mod session;

pub use form::PerFormTokenDriver;
pub use noop::{NOOP_TOKEN, NoopDriver};
pub use session::SessionTokenDriver;

use crate::error::{CsrfError, Result};
use crate::token::CsrfToken;
use rampart_session::SharedSession;
use serde_json::Value;

/// Per-call view of the manager's collaborators
#[derive(Clone, Copy, Default)]
pub struct DriverContext<'a> {
    session: Option<&'a SharedSession>,
}

impl<'a> DriverContext<'a> {
    pub fn new(session: Option<&'a SharedSession>) -> Self {
        Self { session }
    }

    /// The session store, or a configuration error if none is bound
    pub fn session(&self) -> Result<&'a SharedSession> {
        self.session.ok_or_else(|| {
            CsrfError::Config("The CSRF driver requires a session, but none is set".to_string())
        })
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}

/// Token issuance and validation policy
pub trait CsrfDriver: Send + Sync {
    /// Driver name, used in logs and error messages
    fn name(&self) -> &str;

    /// Issue (or return the current) token for `subject`
    fn get_token(&self, ctx: &DriverContext<'_>, subject: &str) -> Result<CsrfToken>;

    /// Check `candidate` against the token bound to `subject`
    fn validate_token(&self, ctx: &DriverContext<'_>, subject: &str, candidate: &str)
    -> Result<bool>;

    /// Force issuance of a new token for `subject`
    fn regenerate_token(&self, _ctx: &DriverContext<'_>, _subject: &str) -> Result<CsrfToken> {
        Err(unsupported(self.name(), "regenerate_token"))
    }

    /// Drop the token bound to `subject`
    fn revoke_token(&self, _ctx: &DriverContext<'_>, _subject: &str) -> Result<()> {
        Err(unsupported(self.name(), "revoke_token"))
    }
}

pub(crate) fn unsupported(driver: &str, operation: &str) -> CsrfError {
    CsrfError::InvalidUsage(format!(
        "There is no CSRF driver method called \"{operation}\" on driver \"{driver}\""
    ))
}

/// A stored value counts as a token only when it is a non-empty string
pub(crate) fn stored_token(value: Option<Value>) -> Option<CsrfToken> {
    match value {
        Some(Value::String(token)) if !token.is_empty() => Some(CsrfToken::new(token)),
        _ => None,
    }
}
