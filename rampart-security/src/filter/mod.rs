//! Sanitization filters and the shared recursive traversal.

mod html_entities;
mod registry;
mod strip_tags;
mod xss;

pub use html_entities::HtmlEntities;
pub use registry::{FilterFactory, FilterRegistry};
pub use strip_tags::StripTags;
pub use xss::XssFilter;

use crate::cleaned::CleanedSet;
use crate::config::SecurityConfig;
use crate::error::{Result, SecurityError};
use crate::value::{Container, Value};
use indexmap::IndexMap;
use std::iter;

/// State threaded through one filter pass
pub struct FilterContext<'a> {
    cleaned: &'a mut CleanedSet,
    config: &'a SecurityConfig,
    scope: String,
    depth: usize,
    max_depth: usize,
}

impl<'a> FilterContext<'a> {
    /// `scope` is the filter name the cleaned-value entries are recorded under
    pub fn new(
        cleaned: &'a mut CleanedSet,
        config: &'a SecurityConfig,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            cleaned,
            config,
            scope: scope.into().to_lowercase(),
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    pub fn config(&self) -> &SecurityConfig {
        self.config
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_cleaned(&self, value: &Value) -> bool {
        self.cleaned.contains(&self.scope, value)
    }

    pub fn mark_cleaned(&mut self, value: &Value) {
        self.cleaned.insert(&self.scope, value);
    }

    /// Drop a mark this filter recorded, e.g. for a node it failed to finish
    pub fn unmark_cleaned(&mut self, value: &Value) {
        self.cleaned.remove(&self.scope, value);
    }

    /// Run `f` one nesting level deeper
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        if self.depth >= self.max_depth {
            return Err(SecurityError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

/// A sanitization filter.
///
/// Implementors usually override only [`clean_string`](Filter::clean_string)
/// and inherit the traversal in [`clean_value`].
pub trait Filter: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Sanitize one string. The default leaves it unchanged.
    fn clean_string(&self, value: &str) -> Result<String> {
        Ok(value.to_string())
    }

    /// Sanitize a value of any shape
    fn clean(&self, value: Value, ctx: &mut FilterContext<'_>) -> Result<Value> {
        clean_value(self, value, ctx)
    }
}

/// Generic recursive descent shared by all filters.
///
/// - booleans, numbers, null and already-cleaned values pass through
/// - strings go through [`Filter::clean_string`]
/// - owned lists and maps are rebuilt element by element
/// - shared nodes are marked before descending, cleaned in place and
///   returned as the same handle; a node whose contents fail is unmarked
///   and left untouched
/// - whitelisted objects pass through, other objects are replaced by their
///   cleaned string form or rejected
pub fn clean_value<F: Filter + ?Sized>(
    filter: &F,
    value: Value,
    ctx: &mut FilterContext<'_>,
) -> Result<Value> {
    if value.is_scalar() || matches!(value, Value::Null) || ctx.is_cleaned(&value) {
        return Ok(value);
    }

    let cleaned = match value {
        Value::String(text) => Value::String(filter.clean_string(&text)?),
        Value::List(items) => Value::List(ctx.nested(|ctx| clean_list(filter, items, ctx))?),
        Value::Map(entries) => Value::Map(ctx.nested(|ctx| clean_map(filter, entries, ctx))?),
        Value::Shared(node) => {
            // Marking first cuts reference cycles
            let handle = Value::Shared(node.clone());
            ctx.mark_cleaned(&handle);
            let contents = node.snapshot();
            let result = ctx.nested(|ctx| match contents {
                Container::List(items) => clean_list(filter, items, ctx).map(Container::List),
                Container::Map(entries) => clean_map(filter, entries, ctx).map(Container::Map),
            });
            match result {
                Ok(contents) => {
                    node.replace(contents);
                    handle
                }
                Err(err) => {
                    ctx.unmark_cleaned(&handle);
                    return Err(err);
                }
            }
        }
        Value::Object(object) => {
            let names = iter::once(object.type_name()).chain(object.parent_types().iter().copied());
            if ctx.config().is_whitelisted(names) {
                Value::Object(object)
            } else if let Some(text) = object.to_text() {
                Value::String(filter.clean_string(&text)?)
            } else {
                return Err(SecurityError::Unsanitizable {
                    type_name: object.type_name().to_string(),
                });
            }
        }
        other => other,
    };

    ctx.mark_cleaned(&cleaned);
    Ok(cleaned)
}

fn clean_list<F: Filter + ?Sized>(
    filter: &F,
    items: Vec<Value>,
    ctx: &mut FilterContext<'_>,
) -> Result<Vec<Value>> {
    items
        .into_iter()
        .map(|item| filter.clean(item, ctx))
        .collect()
}

fn clean_map<F: Filter + ?Sized>(
    filter: &F,
    entries: IndexMap<String, Value>,
    ctx: &mut FilterContext<'_>,
) -> Result<IndexMap<String, Value>> {
    entries
        .into_iter()
        .map(|(key, value)| Ok((key, filter.clean(value, ctx)?)))
        .collect()
}
