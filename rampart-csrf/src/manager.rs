use crate::config::CsrfConfig;
use crate::driver::{CsrfDriver, DriverContext};
use crate::error::{CsrfError, Result};
use crate::registry::DriverRegistry;
use crate::token::CsrfToken;
use rampart_session::SharedSession;
use std::fmt;
use tracing::debug;

/// Entry point for CSRF mitigation.
///
/// Selects a driver from configuration and forwards token operations to it,
/// supplying the session store on every call.
///
/// # Examples
///
/// ```
/// use rampart_csrf::{CsrfConfig, CsrfManager};
/// use rampart_session::MemorySessionStore;
///
/// let session = MemorySessionStore::default().shared();
/// let csrf = CsrfManager::new(&CsrfConfig::new("form"), Some(session)).unwrap();
///
/// let token = csrf.get_token("login").unwrap();
/// assert!(csrf.validate_token("login", token.as_str()).unwrap());
/// assert!(!csrf.validate_token("login", token.as_str()).unwrap());
/// ```
pub struct CsrfManager {
    driver: Box<dyn CsrfDriver>,
    session: Option<SharedSession>,
}

impl CsrfManager {
    /// Create a manager using the built-in drivers
    pub fn new(config: &CsrfConfig, session: Option<SharedSession>) -> Result<Self> {
        Self::with_registry(config, session, &DriverRegistry::new())
    }

    /// Create a manager resolving the driver through `registry`
    pub fn with_registry(
        config: &CsrfConfig,
        session: Option<SharedSession>,
        registry: &DriverRegistry,
    ) -> Result<Self> {
        let name = config
            .driver
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                CsrfError::Config(
                    "The security configuration doesn't define a CSRF mitigation driver"
                        .to_string(),
                )
            })?;

        let driver = registry
            .resolve(name, config, session.as_ref())?
            .ok_or_else(|| {
                CsrfError::Config(format!(
                    "Requested CSRF mitigation driver \"{name}\" does not exist"
                ))
            })?;

        debug!(driver = driver.name(), "CSRF driver initialized");
        Ok(Self { driver, session })
    }

    /// Create a manager around an already-built driver
    pub fn from_driver(driver: Box<dyn CsrfDriver>, session: Option<SharedSession>) -> Self {
        Self { driver, session }
    }

    pub fn driver(&self) -> &dyn CsrfDriver {
        self.driver.as_ref()
    }

    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    pub fn session(&self) -> Option<&SharedSession> {
        self.session.as_ref()
    }

    /// Bind (or replace) the session store
    pub fn set_session(&mut self, session: SharedSession) {
        self.session = Some(session);
    }

    fn context(&self) -> DriverContext<'_> {
        DriverContext::new(self.session.as_ref())
    }

    /// Get a token for `subject`
    pub fn get_token(&self, subject: &str) -> Result<CsrfToken> {
        let token = self.driver.get_token(&self.context(), subject)?;
        debug!(driver = self.driver.name(), subject, "CSRF token issued");
        Ok(token)
    }

    /// Validate a submitted token for `subject`
    pub fn validate_token(&self, subject: &str, candidate: &str) -> Result<bool> {
        let valid = self
            .driver
            .validate_token(&self.context(), subject, candidate)?;
        debug!(driver = self.driver.name(), subject, valid, "CSRF token validated");
        Ok(valid)
    }

    /// Force a new token for `subject`
    pub fn regenerate_token(&self, subject: &str) -> Result<CsrfToken> {
        let token = self.driver.regenerate_token(&self.context(), subject)?;
        debug!(driver = self.driver.name(), subject, "CSRF token regenerated");
        Ok(token)
    }

    /// Revoke the token bound to `subject`
    pub fn revoke_token(&self, subject: &str) -> Result<()> {
        self.driver.revoke_token(&self.context(), subject)?;
        debug!(driver = self.driver.name(), subject, "CSRF token revoked");
        Ok(())
    }
}

impl fmt::Debug for CsrfManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfManager")
            .field("driver", &self.driver.name())
            .field("has_session", &self.session.is_some())
            .finish()
    }
}
