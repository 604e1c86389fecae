use crate::chain::{FilterSpec, class_pattern, strip_pattern};
use crate::cleaned::CleanedSet;
use crate::config::{FilterKind, SecurityConfig};
use crate::error::{Result, SecurityError};
use crate::filter::{Filter, FilterContext, FilterRegistry, StripTags, XssFilter};
use crate::html::HtmlCleaner;
use crate::uri::normalize_path;
use crate::value::Value;
use rampart_csrf::CsrfManager;
use rampart_session::SharedSession;
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Entry point for input sanitization and CSRF mitigation.
///
/// Intended to live for one request: the cleaned-value record and the
/// filter caches grow with use and are never pruned.
///
/// # Examples
///
/// ```
/// use rampart_security::{FilterKind, SecurityConfig, SecurityManager, Value};
///
/// let config = SecurityConfig::default().with_input_filter(["htmlentities"]);
/// let mut security = SecurityManager::new(config);
///
/// let cleaned = security.clean(Value::from("<b>hi</b>"), FilterKind::Input).unwrap();
/// assert_eq!(cleaned, Value::from("&lt;b&gt;hi&lt;/b&gt;"));
///
/// assert_eq!(security.clean_uri("/a/../b//c", true).unwrap(), "/b/c");
/// ```
pub struct SecurityManager {
    config: SecurityConfig,
    registry: FilterRegistry,
    filters: HashMap<String, Arc<dyn Filter>>,
    misses: HashSet<String>,
    patterns: HashMap<String, Regex>,
    cleaned: CleanedSet,
    html_cleaner: Option<Arc<dyn HtmlCleaner>>,
    session: Option<SharedSession>,
    csrf: Option<CsrfManager>,
}

fn missing_html_cleaner() -> SecurityError {
    SecurityError::MissingCollaborator(
        "No HTML cleaner is installed; enable the `ammonia` feature or call `with_html_cleaner`"
            .to_string(),
    )
}

impl SecurityManager {
    /// Create a manager with the built-in filters
    pub fn new(config: SecurityConfig) -> Self {
        Self::with_registry(config, FilterRegistry::new())
    }

    /// Create a manager resolving filter names through `registry`.
    ///
    /// An `xss` filter bound to the installed HTML cleaner is added unless
    /// the registry already defines one.
    pub fn with_registry(config: SecurityConfig, registry: FilterRegistry) -> Self {
        let define_xss = !registry.contains(XssFilter::NAME);
        let mut manager = Self {
            config,
            registry,
            filters: HashMap::new(),
            misses: HashSet::new(),
            patterns: HashMap::new(),
            cleaned: CleanedSet::new(),
            html_cleaner: default_html_cleaner(),
            session: None,
            csrf: None,
        };
        if define_xss {
            manager.register_xss();
        }
        manager
    }

    /// Bind a session store for the CSRF manager
    pub fn with_session(mut self, session: SharedSession) -> Self {
        self.set_session(session);
        self
    }

    /// Install the HTML cleaner used by `xss_clean` and the `xss` filter
    pub fn with_html_cleaner(mut self, cleaner: Arc<dyn HtmlCleaner>) -> Self {
        self.set_html_cleaner(Some(cleaner));
        self
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn session(&self) -> Option<&SharedSession> {
        self.session.as_ref()
    }

    /// Bind (or replace) the session store, including on an existing CSRF manager
    pub fn set_session(&mut self, session: SharedSession) {
        if let Some(csrf) = self.csrf.as_mut() {
            csrf.set_session(session.clone());
        }
        self.session = Some(session);
    }

    /// Install or remove the HTML cleaner
    pub fn set_html_cleaner(&mut self, cleaner: Option<Arc<dyn HtmlCleaner>>) {
        self.html_cleaner = cleaner;
        self.register_xss();
    }

    pub fn has_html_cleaner(&self) -> bool {
        self.html_cleaner.is_some()
    }

    fn register_xss(&mut self) {
        let cleaner = self.html_cleaner.clone();
        self.register_filter(XssFilter::NAME, move |_| match &cleaner {
            Some(cleaner) => Ok(Arc::new(XssFilter::new(cleaner.clone())) as Arc<dyn Filter>),
            None => Err(missing_html_cleaner()),
        });
    }

    /// Register (or replace) a named filter
    pub fn register_filter<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&SecurityConfig) -> Result<Arc<dyn Filter>> + Send + Sync + 'static,
    {
        let key = name.to_lowercase();
        self.filters.remove(&key);
        self.misses.remove(&key);
        self.registry.register(&key, factory);
    }

    /// The CSRF manager, built from `config.csrf` on first use
    pub fn csrf(&mut self) -> Result<&CsrfManager> {
        let manager = match self.csrf.take() {
            Some(manager) => manager,
            None => CsrfManager::new(&self.config.csrf, self.session.clone())?,
        };
        let manager: &CsrfManager = self.csrf.insert(manager);
        Ok(manager)
    }

    /// Apply the filter chain configured for `kind`
    pub fn clean(&mut self, value: Value, kind: FilterKind) -> Result<Value> {
        let specs: Vec<FilterSpec> = self
            .config
            .filters(kind)
            .iter()
            .map(FilterSpec::from)
            .collect();
        trace!(%kind, filters = specs.len(), "cleaning value");
        self.clean_with(value, &specs)
    }

    /// Apply `filters` in order
    pub fn clean_with(&mut self, value: Value, filters: &[FilterSpec]) -> Result<Value> {
        filters
            .iter()
            .try_fold(value, |value, spec| self.apply(spec, value))
    }

    fn apply(&mut self, spec: &FilterSpec, value: Value) -> Result<Value> {
        match spec {
            FilterSpec::Filter(filter) => self.run_filter(filter.as_ref(), value),
            FilterSpec::Callable(f) => f(value),
            FilterSpec::Named(name) => match self.load_filter(name)? {
                Some(filter) => self.run_filter(filter.as_ref(), value),
                None => {
                    let pattern = self.pattern(name)?;
                    Ok(strip_pattern(pattern, value))
                }
            },
        }
    }

    fn run_filter(&mut self, filter: &dyn Filter, value: Value) -> Result<Value> {
        let mut ctx = FilterContext::new(&mut self.cleaned, &self.config, filter.name());
        filter.clean(value, &mut ctx)
    }

    /// Resolve a filter by name, using the instance cache and the miss cache.
    ///
    /// `Ok(None)` means no filter has that name.
    pub fn load_filter(&mut self, name: &str) -> Result<Option<Arc<dyn Filter>>> {
        let key = name.to_lowercase();
        if let Some(filter) = self.filters.get(&key) {
            return Ok(Some(filter.clone()));
        }
        if self.misses.contains(&key) {
            return Ok(None);
        }

        match self.registry.resolve(&key, &self.config)? {
            Some(filter) => {
                debug!(filter = %key, "filter loaded");
                self.filters.insert(key, filter.clone());
                Ok(Some(filter))
            }
            None => {
                debug!(filter = %key, "no filter registered, treating name as a character class");
                self.misses.insert(key);
                Ok(None)
            }
        }
    }

    fn pattern(&mut self, class: &str) -> Result<&Regex> {
        Ok(match self.patterns.entry(class.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(class_pattern(class)?),
        })
    }

    /// Normalize and filter a URI.
    ///
    /// With `strict`, the path is normalized before the `uri_filter` chain runs.
    pub fn clean_uri(&mut self, uri: &str, strict: bool) -> Result<String> {
        let uri = if strict {
            normalize_path(uri)
        } else {
            uri.to_string()
        };

        match self.clean(Value::String(uri), FilterKind::Uri)? {
            Value::String(uri) => Ok(uri),
            other => Err(SecurityError::InvalidUsage(format!(
                "URI filters must produce a string, got {}",
                other.kind()
            ))),
        }
    }

    /// Strip markup tags from every string in `value`
    pub fn strip_tags(&mut self, value: Value) -> Result<Value> {
        self.run_filter(&StripTags, value)
    }

    /// Run every string in `value` through the HTML cleaner
    pub fn xss_clean(&mut self, value: Value) -> Result<Value> {
        let cleaner = self.html_cleaner.clone().ok_or_else(missing_html_cleaner)?;
        self.run_filter(&XssFilter::new(cleaner), value)
    }

    /// Whether `value` has been produced by a filter or marked clean
    pub fn is_cleaned(&self, value: &Value) -> bool {
        self.cleaned.is_cleaned(value)
    }

    /// Mark `value` as clean for every filter
    pub fn mark_cleaned(&mut self, value: &Value) {
        self.cleaned.mark(value);
    }

    pub fn cleaned(&self) -> &CleanedSet {
        &self.cleaned
    }
}

#[cfg(feature = "ammonia")]
fn default_html_cleaner() -> Option<Arc<dyn HtmlCleaner>> {
    Some(Arc::new(crate::html::AmmoniaCleaner::new()))
}

#[cfg(not(feature = "ammonia"))]
fn default_html_cleaner() -> Option<Arc<dyn HtmlCleaner>> {
    None
}

impl fmt::Debug for SecurityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut loaded: Vec<&String> = self.filters.keys().collect();
        loaded.sort();
        f.debug_struct("SecurityManager")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("loaded_filters", &loaded)
            .field("misses", &self.misses.len())
            .field("cleaned", &self.cleaned.len())
            .field("has_html_cleaner", &self.html_cleaner.is_some())
            .field("has_session", &self.session.is_some())
            .field("csrf", &self.csrf)
            .finish()
    }
}
