use super::{CsrfDriver, DriverContext, stored_token};
use crate::config::CsrfConfig;
use crate::error::{CsrfError, Result};
use crate::token::CsrfToken;
use rampart_session::SharedSession;
use serde_json::Value;
use tracing::debug;

/// One single-use token per form.
///
/// Tokens live in a map under the session key, one field per subject. The
/// subject is used verbatim as the field name, so any string (including the
/// empty one or one containing `.`) gets its own token. Validation consumes
/// the entry whether or not the candidate matches, so a failed attempt also
/// requires a fresh `get_token`.
#[derive(Debug, Clone)]
pub struct PerFormTokenDriver {
    key: String,
}

impl PerFormTokenDriver {
    pub const NAME: &'static str = "form";

    /// Default session key of the token map
    pub const DEFAULT_KEY: &'static str = "csrf.form-tokens";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Build from configuration. A session must be available.
    pub fn from_config(config: &CsrfConfig, session: Option<&SharedSession>) -> Result<Self> {
        if session.is_none() {
            return Err(CsrfError::Config(format!(
                "The \"{}\" CSRF driver requires a session",
                Self::NAME
            )));
        }
        Ok(Self::new(config.session_key_or(Self::DEFAULT_KEY)))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn issue(&self, session: &SharedSession, subject: &str) -> Result<CsrfToken> {
        let token = CsrfToken::generate();
        session.set_entry(
            &self.key,
            subject,
            Value::String(token.as_str().to_string()),
        )?;
        debug!(key = %self.key, subject, "issued form CSRF token");
        Ok(token)
    }
}

impl Default for PerFormTokenDriver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEY)
    }
}

impl CsrfDriver for PerFormTokenDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_token(&self, ctx: &DriverContext<'_>, subject: &str) -> Result<CsrfToken> {
        self.issue(ctx.session()?, subject)
    }

    fn validate_token(
        &self,
        ctx: &DriverContext<'_>,
        subject: &str,
        candidate: &str,
    ) -> Result<bool> {
        let stored = ctx.session()?.take_entry(&self.key, subject)?;
        Ok(stored_token(stored).is_some_and(|token| token.matches(candidate)))
    }

    fn regenerate_token(&self, ctx: &DriverContext<'_>, subject: &str) -> Result<CsrfToken> {
        self.issue(ctx.session()?, subject)
    }

    fn revoke_token(&self, ctx: &DriverContext<'_>, subject: &str) -> Result<()> {
        ctx.session()?.delete_entry(&self.key, subject)?;
        debug!(key = %self.key, subject, "revoked form CSRF token");
        Ok(())
    }
}
