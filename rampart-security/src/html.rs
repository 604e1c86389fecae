//! Deep HTML cleaning collaborator.

/// Cleans untrusted HTML, keeping safe markup
pub trait HtmlCleaner: Send + Sync {
    fn clean_html(&self, html: &str) -> String;
}

impl<F> HtmlCleaner for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn clean_html(&self, html: &str) -> String {
        self(html)
    }
}

#[cfg(feature = "ammonia")]
pub use ammonia_cleaner::AmmoniaCleaner;

#[cfg(feature = "ammonia")]
mod ammonia_cleaner {
    use super::HtmlCleaner;
    use ammonia::Builder;
    use std::collections::HashSet;

    /// [`HtmlCleaner`] backed by `ammonia`
    #[derive(Debug, Clone)]
    pub struct AmmoniaCleaner {
        allowed_tags: Option<Vec<String>>,
        strip_comments: bool,
    }

    impl AmmoniaCleaner {
        /// Cleaner with ammonia's default whitelist
        pub fn new() -> Self {
            Self {
                allowed_tags: None,
                strip_comments: true,
            }
        }

        /// Restrict output to the given tags
        pub fn with_allowed_tags<I, S>(mut self, tags: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.allowed_tags = Some(tags.into_iter().map(Into::into).collect());
            self
        }

        pub fn with_strip_comments(mut self, strip: bool) -> Self {
            self.strip_comments = strip;
            self
        }
    }

    impl Default for AmmoniaCleaner {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HtmlCleaner for AmmoniaCleaner {
        fn clean_html(&self, html: &str) -> String {
            let mut builder = Builder::default();

            if let Some(tags) = &self.allowed_tags {
                builder.tags(tags.iter().map(|s| s.as_str()).collect::<HashSet<_>>());
            }
            builder.strip_comments(self.strip_comments);

            builder.clean(html).to_string()
        }
    }

}
