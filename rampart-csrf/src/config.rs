use serde::{Deserialize, Serialize};

/// CSRF mitigation configuration
///
/// Deserialized from the `[csrf]` table of the security configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Name of the mitigation driver (`noop`, `session`, `form`, or a registered name)
    pub driver: Option<String>,

    /// Session key the driver stores its tokens under; each driver has its own default
    pub session_key: Option<String>,
}

impl CsrfConfig {
    /// Create a configuration selecting the given driver
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: Some(driver.into()),
            session_key: None,
        }
    }

    /// Set the driver name
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    /// Override the session storage key
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }

    /// The configured session key, or `default` when none is set
    pub fn session_key_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.session_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .unwrap_or(default)
    }
}
