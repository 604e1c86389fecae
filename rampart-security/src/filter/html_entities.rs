use super::Filter;
use crate::config::{QuoteStyle, SecurityConfig};
use crate::error::{Result, SecurityError};
use once_cell::sync::Lazy;
use regex::Regex;

// Named, decimal or hex character reference at the start of the input
static ENTITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});").unwrap()
});

/// HTML entity encoder.
///
/// Escapes `&`, `<` and `>`, plus quotes according to the configured
/// [`QuoteStyle`]. Unless double encoding is enabled, existing character
/// references are left as they are, which makes the filter idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlEntities {
    quote_style: QuoteStyle,
    double_encode: bool,
}

impl HtmlEntities {
    pub const NAME: &'static str = "htmlentities";

    pub fn new() -> Self {
        Self {
            quote_style: QuoteStyle::Quotes,
            double_encode: false,
        }
    }

    /// Build from the `htmlentities_*` settings
    pub fn from_config(config: &SecurityConfig) -> Result<Self> {
        let encoding = config.htmlentities_encoding.to_ascii_lowercase().replace('-', "");
        if encoding != "utf8" {
            return Err(SecurityError::Config(format!(
                "Unsupported htmlentities encoding \"{}\"; only UTF-8 is supported",
                config.htmlentities_encoding
            )));
        }
        Ok(Self {
            quote_style: config.htmlentities_flags,
            double_encode: config.htmlentities_double_encode,
        })
    }

    pub fn with_quote_style(mut self, quote_style: QuoteStyle) -> Self {
        self.quote_style = quote_style;
        self
    }

    pub fn with_double_encode(mut self, double_encode: bool) -> Self {
        self.double_encode = double_encode;
        self
    }

    pub fn quote_style(&self) -> QuoteStyle {
        self.quote_style
    }

    pub fn double_encode(&self) -> bool {
        self.double_encode
    }

    /// Encode `text`
    pub fn encode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 8);
        for (i, c) in text.char_indices() {
            match c {
                '&' if !self.double_encode && ENTITY_PATTERN.is_match(&text[i..]) => out.push('&'),
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' if self.quote_style != QuoteStyle::NoQuotes => out.push_str("&quot;"),
                '\'' if self.quote_style == QuoteStyle::Quotes => out.push_str("&#039;"),
                _ => out.push(c),
            }
        }
        out
    }
}

impl Default for HtmlEntities {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for HtmlEntities {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn clean_string(&self, value: &str) -> Result<String> {
        Ok(self.encode(value))
    }
}
