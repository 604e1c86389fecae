//! Session configuration.

use std::time::Duration;

/// Session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Default session TTL
    pub default_ttl: Duration,
    /// Maximum session TTL (for security)
    pub max_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),  // 1 hour
            max_ttl: Duration::from_secs(86400 * 7), // 7 days
        }
    }
}

impl SessionConfig {
    /// Set the default session TTL.
    ///
    /// # Arguments
    ///
    /// * `ttl` - Default time-to-live for sessions
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the maximum session TTL.
    ///
    /// # Arguments
    ///
    /// * `ttl` - Maximum time-to-live for sessions
    pub fn with_max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }

    /// TTL applied to new sessions: the default, capped at the maximum.
    pub fn effective_ttl(&self) -> Duration {
        self.default_ttl.min(self.max_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_ttl_is_capped() {
        let config = SessionConfig::default()
            .with_default_ttl(Duration::from_secs(100))
            .with_max_ttl(Duration::from_secs(10));
        assert_eq!(config.effective_ttl(), Duration::from_secs(10));

        let config = SessionConfig::default();
        assert_eq!(config.effective_ttl(), Duration::from_secs(3600));
    }
}
