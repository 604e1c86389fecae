use super::{CsrfDriver, DriverContext};
use crate::error::Result;
use crate::token::CsrfToken;

/// Sentinel token issued and accepted by [`NoopDriver`]
pub const NOOP_TOKEN: &str = "dummy-token";

/// Driver that disables CSRF mitigation while keeping the call shape intact
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDriver;

impl NoopDriver {
    pub const NAME: &'static str = "noop";
}

impl CsrfDriver for NoopDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_token(&self, _ctx: &DriverContext<'_>, _subject: &str) -> Result<CsrfToken> {
        Ok(CsrfToken::new(NOOP_TOKEN))
    }

    fn validate_token(
        &self,
        _ctx: &DriverContext<'_>,
        _subject: &str,
        candidate: &str,
    ) -> Result<bool> {
        Ok(CsrfToken::new(NOOP_TOKEN).matches(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CsrfError;

    #[test]
    fn test_noop_accepts_only_sentinel() {
        let ctx = DriverContext::default();
        let driver = NoopDriver;

        assert_eq!(driver.get_token(&ctx, "any").unwrap().as_str(), NOOP_TOKEN);
        assert!(driver.validate_token(&ctx, "other", NOOP_TOKEN).unwrap());
        assert!(!driver.validate_token(&ctx, "other", "forged").unwrap());
        assert!(!driver.validate_token(&ctx, "other", "").unwrap());
    }

    #[test]
    fn test_noop_has_no_lifecycle_operations() {
        let ctx = DriverContext::default();
        assert!(matches!(
            NoopDriver.regenerate_token(&ctx, "form"),
            Err(CsrfError::InvalidUsage(_))
        ));
        assert!(matches!(
            NoopDriver.revoke_token(&ctx, "form"),
            Err(CsrfError::InvalidUsage(_))
        ));
    }
}
