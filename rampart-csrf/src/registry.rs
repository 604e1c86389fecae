use crate::config::CsrfConfig;
use crate::driver::{CsrfDriver, NoopDriver, PerFormTokenDriver, SessionTokenDriver};
use crate::error::Result;
use rampart_session::SharedSession;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Constructor for a named driver
pub type DriverFactory = Arc<
    dyn Fn(&CsrfConfig, Option<&SharedSession>) -> Result<Box<dyn CsrfDriver>> + Send + Sync,
>;

/// Driver name to constructor map. Names are case-insensitive.
#[derive(Clone)]
pub struct DriverRegistry {
    factories: HashMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// Registry with the built-in drivers
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(NoopDriver::NAME, |_, _| Ok(Box::new(NoopDriver)));
        registry.register(SessionTokenDriver::NAME, |config, session| {
            Ok(Box::new(SessionTokenDriver::from_config(config, session)?))
        });
        for name in [PerFormTokenDriver::NAME, "per_form", "perform"] {
            registry.register(name, |config, session| {
                Ok(Box::new(PerFormTokenDriver::from_config(config, session)?))
            });
        }
        registry
    }

    /// Registry with no drivers
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) a driver constructor
    pub fn register<F>(&mut self, name: impl AsRef<str>, factory: F) -> &mut Self
    where
        F: Fn(&CsrfConfig, Option<&SharedSession>) -> Result<Box<dyn CsrfDriver>>
            + Send
            + Sync
            + 'static,
    {
        self.factories
            .insert(name.as_ref().to_lowercase(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Construct the driver registered under `name`.
    ///
    /// `Ok(None)` means no such driver; `Err` is a constructor failure.
    pub fn resolve(
        &self,
        name: &str,
        config: &CsrfConfig,
        session: Option<&SharedSession>,
    ) -> Result<Option<Box<dyn CsrfDriver>>> {
        match self.factories.get(&name.to_lowercase()) {
            Some(factory) => factory(config, session).map(Some),
            None => Ok(None),
        }
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CsrfError;
    use rampart_session::MemorySessionStore;

    #[test]
    fn test_builtin_names() {
        let registry = DriverRegistry::new();
        assert_eq!(
            registry.names(),
            vec!["form", "noop", "per_form", "perform", "session"]
        );
        assert!(registry.contains("Session"));
        assert!(!registry.contains("cookie"));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = DriverRegistry::new();
        let driver = registry
            .resolve("NOOP", &CsrfConfig::default(), None)
            .unwrap()
            .unwrap();
        assert_eq!(driver.name(), "noop");
    }

    #[test]
    fn test_resolve_unknown_is_none() {
        let registry = DriverRegistry::new();
        assert!(
            registry
                .resolve("cookie", &CsrfConfig::default(), None)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_constructor_error_propagates() {
        let registry = DriverRegistry::new();
        let result = registry.resolve("form", &CsrfConfig::default(), None);
        assert!(matches!(result, Err(CsrfError::Config(_))));

        let session = MemorySessionStore::default().shared();
        let driver = registry
            .resolve("PerForm", &CsrfConfig::default(), Some(&session))
            .unwrap()
            .unwrap();
        assert_eq!(driver.name(), "form");
    }

    #[test]
    fn test_register_custom() {
        let mut registry = DriverRegistry::empty();
        registry.register("App::Csrf::Always", |_, _| Ok(Box::new(NoopDriver)));
        assert!(registry.contains("app::csrf::always"));
        assert_eq!(registry.names().len(), 1);
    }
}
