use super::Filter;
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;

// An unterminated tag runs to the end of the input
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*(?:>|$)").unwrap());

/// Removes markup tags and encodes quotes as numeric references
#[derive(Debug, Clone, Copy, Default)]
pub struct StripTags;

impl StripTags {
    pub const NAME: &'static str = "striptags";

    pub fn strip(text: &str) -> String {
        TAG_PATTERN
            .replace_all(text, "")
            .replace('"', "&#34;")
            .replace('\'', "&#39;")
    }
}

impl Filter for StripTags {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn clean_string(&self, value: &str) -> Result<String> {
        Ok(Self::strip(value))
    }
}
