use super::{CsrfDriver, DriverContext, stored_token};
use crate::config::CsrfConfig;
use crate::error::{CsrfError, Result};
use crate::token::CsrfToken;
use rampart_session::SharedSession;
use serde_json::Value;
use tracing::debug;

/// One token per session, valid until explicitly regenerated or revoked.
///
/// The subject key is ignored: every form in the session shares the token.
#[derive(Debug, Clone)]
pub struct SessionTokenDriver {
    key: String,
}

impl SessionTokenDriver {
    pub const NAME: &'static str = "session";

    /// Default session key the token is stored under
    pub const DEFAULT_KEY: &'static str = "csrf.session-token";

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

    fn issue(&self, session: &SharedSession) -> Result<CsrfToken> {
        let token = CsrfToken::generate();
        session.set(&self.key, Value::String(token.as_str().to_string()))?;
        debug!(key = %self.key, "issued session CSRF token");
        Ok(token)
    }
}

impl Default for SessionTokenDriver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEY)
    }
}

impl CsrfDriver for SessionTokenDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_token(&self, ctx: &DriverContext<'_>, _subject: &str) -> Result<CsrfToken> {
        let session = ctx.session()?;
        match stored_token(session.get(&self.key)?) {
            Some(token) => Ok(token),
            None => self.issue(session),
        }
    }

    fn validate_token(
        &self,
        ctx: &DriverContext<'_>,
        _subject: &str,
        candidate: &str,
    ) -> Result<bool> {
        let session = ctx.session()?;
        Ok(stored_token(session.get(&self.key)?).is_some_and(|token| token.matches(candidate)))
    }

    fn regenerate_token(&self, ctx: &DriverContext<'_>, _subject: &str) -> Result<CsrfToken> {
        self.issue(ctx.session()?)
    }

    fn revoke_token(&self, ctx: &DriverContext<'_>, _subject: &str) -> Result<()> {
        ctx.session()?.delete(&self.key)?;
        debug!(key = %self.key, "revoked session CSRF token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_session::MemorySessionStore;
    use serde_json::json;

    fn session() -> SharedSession {
        MemorySessionStore::default().shared()
    }

    #[test]
    fn test_get_token_is_idempotent() {
        let session = session();
        let ctx = DriverContext::new(Some(&session));
        let driver = SessionTokenDriver::default();

        let first = driver.get_token(&ctx, "login").unwrap();
        let second = driver.get_token(&ctx, "signup").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            session.get("csrf.session-token").unwrap(),
            Some(json!(first.as_str()))
        );
    }

    #[test]
    fn test_validation_does_not_consume() {
        let session = session();
        let ctx = DriverContext::new(Some(&session));
        let driver = SessionTokenDriver::default();

        let token = driver.get_token(&ctx, "").unwrap();
        assert!(driver.validate_token(&ctx, "", token.as_str()).unwrap());
        assert!(driver.validate_token(&ctx, "", token.as_str()).unwrap());
        assert!(!driver.validate_token(&ctx, "", "forged").unwrap());
    }

    #[test]
    fn test_empty_stored_value_is_replaced() {
        let session = session();
        session.set("csrf.session-token", json!("")).unwrap();
        let ctx = DriverContext::new(Some(&session));
        let driver = SessionTokenDriver::default();

        assert!(!driver.validate_token(&ctx, "", "").unwrap());
        let token = driver.get_token(&ctx, "").unwrap();
        assert!(!token.is_empty());
    }

    #[test]
    fn test_regenerate_and_revoke() {
        let session = session();
        let ctx = DriverContext::new(Some(&session));
        let driver = SessionTokenDriver::new("app.csrf");

        let old = driver.get_token(&ctx, "").unwrap();
        let new = driver.regenerate_token(&ctx, "").unwrap();
        assert_ne!(old, new);
        assert!(!driver.validate_token(&ctx, "", old.as_str()).unwrap());
        assert!(driver.validate_token(&ctx, "", new.as_str()).unwrap());

        driver.revoke_token(&ctx, "").unwrap();
        assert!(!driver.validate_token(&ctx, "", new.as_str()).unwrap());
        assert_eq!(session.get("app.csrf").unwrap(), None);
    }

    #[test]
    fn test_from_config_requires_session() {
        let config = CsrfConfig::new("session");
        assert!(matches!(
            SessionTokenDriver::from_config(&config, None),
            Err(CsrfError::Config(_))
        ));

        let session = session();
        let driver =
            SessionTokenDriver::from_config(&config.with_session_key("x.y"), Some(&session))
                .unwrap();
        assert_eq!(driver.key(), "x.y");
    }
}
