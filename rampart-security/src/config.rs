//! Security configuration.
//!
//! Loaded from TOML or JSON. Every key is optional; filter lists accept either
//! a single name or a list of names.

use crate::error::{Result, SecurityError};
use rampart_csrf::CsrfConfig;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Default nesting bound for value traversal
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Which configured filter chain to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Input,
    Output,
    Uri,
}

impl FilterKind {
    /// Configuration key holding this chain
    pub fn config_key(&self) -> &'static str {
        match self {
            FilterKind::Input => "input_filter",
            FilterKind::Output => "output_filter",
            FilterKind::Uri => "uri_filter",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Which quote characters the entity encoder escapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// Double quotes only
    #[serde(alias = "ENT_COMPAT")]
    Compat,
    /// Double and single quotes
    #[default]
    #[serde(alias = "ENT_QUOTES")]
    Quotes,
    /// Neither
    #[serde(alias = "ENT_NOQUOTES")]
    NoQuotes,
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Security subsystem configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// CSRF driver selection
    pub csrf: CsrfConfig,

    /// Filters applied by `clean_uri`
    #[serde(deserialize_with = "one_or_many")]
    pub uri_filter: Vec<String>,

    /// Filters applied to incoming values
    #[serde(deserialize_with = "one_or_many")]
    pub input_filter: Vec<String>,

    /// Filters applied to outgoing values
    #[serde(deserialize_with = "one_or_many")]
    pub output_filter: Vec<String>,

    /// Object type names passed through without sanitization
    #[serde(rename = "whitelistedClasses", alias = "whitelisted_classes")]
    pub whitelisted_classes: Vec<String>,

    /// Quote handling of the `htmlentities` filter
    pub htmlentities_flags: QuoteStyle,

    /// Character encoding of the `htmlentities` filter; only UTF-8 is supported
    pub htmlentities_encoding: String,

    /// Whether `htmlentities` re-encodes existing entities
    pub htmlentities_double_encode: bool,

    /// Maximum nesting depth of sanitized values
    pub max_depth: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            csrf: CsrfConfig::default(),
            uri_filter: Vec::new(),
            input_filter: Vec::new(),
            output_filter: Vec::new(),
            whitelisted_classes: Vec::new(),
            htmlentities_flags: QuoteStyle::Quotes,
            htmlentities_encoding: "UTF-8".to_string(),
            htmlentities_double_encode: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(name)) => vec![name],
        Some(OneOrMany::Many(names)) => names,
    })
}

impl SecurityConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SecurityError::Config(format!("TOML parse error: {}", e)))
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| SecurityError::Config(format!("JSON parse error: {}", e)))
    }

    /// Build from an already-parsed JSON value
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| SecurityError::Config(format!("JSON parse error: {}", e)))
    }

    /// Load from a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SecurityError::Config("No file extension found".to_string()))?;
        let format = ConfigFormat::from_extension(ext)
            .ok_or_else(|| SecurityError::Config(format!("Unsupported format: {}", ext)))?;

        let content = fs::read_to_string(path)
            .map_err(|e| SecurityError::Config(format!("Failed to read file: {}", e)))?;

        match format {
            ConfigFormat::Json => Self::from_json_str(&content),
            ConfigFormat::Toml => Self::from_toml_str(&content),
        }
    }

    /// Filter names configured for `kind`
    pub fn filters(&self, kind: FilterKind) -> &[String] {
        match kind {
            FilterKind::Input => &self.input_filter,
            FilterKind::Output => &self.output_filter,
            FilterKind::Uri => &self.uri_filter,
        }
    }

    /// Whether any of `type_names` is whitelisted (case-insensitive)
    pub fn is_whitelisted<'a>(&self, mut type_names: impl Iterator<Item = &'a str>) -> bool {
        type_names.any(|name| {
            self.whitelisted_classes
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(name))
        })
    }

    pub fn with_csrf(mut self, csrf: CsrfConfig) -> Self {
        self.csrf = csrf;
        self
    }

    pub fn with_input_filter<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_filter = filters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_filter<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_filter = filters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_uri_filter<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uri_filter = filters.into_iter().map(Into::into).collect();
        self
    }

    /// Add a type name to the whitelist
    pub fn with_whitelisted_class(mut self, type_name: impl Into<String>) -> Self {
        self.whitelisted_classes.push(type_name.into());
        self
    }

    pub fn with_quote_style(mut self, style: QuoteStyle) -> Self {
        self.htmlentities_flags = style;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.htmlentities_encoding = encoding.into();
        self
    }

    pub fn with_double_encode(mut self, double_encode: bool) -> Self {
        self.htmlentities_double_encode = double_encode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
