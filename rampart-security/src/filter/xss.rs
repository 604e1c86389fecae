use super::Filter;
use crate::error::Result;
use crate::html::HtmlCleaner;
use std::fmt;
use std::sync::Arc;

/// Runs strings through an [`HtmlCleaner`]
#[derive(Clone)]
pub struct XssFilter {
    cleaner: Arc<dyn HtmlCleaner>,
}

impl XssFilter {
    pub const NAME: &'static str = "xss";

    pub fn new(cleaner: Arc<dyn HtmlCleaner>) -> Self {
        Self { cleaner }
    }
}

impl fmt::Debug for XssFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XssFilter").finish_non_exhaustive()
    }
}

impl Filter for XssFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn clean_string(&self, value: &str) -> Result<String> {
        Ok(self.cleaner.clean_html(value))
    }
}
