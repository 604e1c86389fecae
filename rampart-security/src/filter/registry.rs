use super::{Filter, HtmlEntities, StripTags};
use crate::config::SecurityConfig;
use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Constructor for a named filter
pub type FilterFactory = Arc<dyn Fn(&SecurityConfig) -> Result<Arc<dyn Filter>> + Send + Sync>;

/// Filter name to constructor map. Names are case-insensitive.
#[derive(Clone)]
pub struct FilterRegistry {
    factories: HashMap<String, FilterFactory>,
}

impl FilterRegistry {
    /// Registry with the built-in filters
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(HtmlEntities::NAME, |config| {
            Ok(Arc::new(HtmlEntities::from_config(config)?))
        });
        registry.register(StripTags::NAME, |_| Ok(Arc::new(StripTags)));
        registry
    }

    /// Registry with no filters
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) a filter constructor
    pub fn register<F>(&mut self, name: impl AsRef<str>, factory: F) -> &mut Self
    where
        F: Fn(&SecurityConfig) -> Result<Arc<dyn Filter>> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.as_ref().to_lowercase(), Arc::new(factory));
        self
    }

    /// Register a ready-made filter instance under its own name
    pub fn register_instance(&mut self, filter: Arc<dyn Filter>) -> &mut Self {
        let name = filter.name().to_string();
        self.register(name, move |_| Ok(filter.clone()))
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

    /// Construct the filter registered under `name`.
    ///
    /// `Ok(None)` means no such filter; `Err` is a constructor failure.
    pub fn resolve(&self, name: &str, config: &SecurityConfig) -> Result<Option<Arc<dyn Filter>>> {
        match self.factories.get(&name.to_lowercase()) {
            Some(factory) => factory(config).map(Some),
            None => Ok(None),
        }
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("names", &self.names())
            .finish()
    }
}
