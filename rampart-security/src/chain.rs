//! Filter chain entries.

use crate::error::Result;
use crate::filter::Filter;
use crate::value::Value;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Plain function used as a chain entry
pub type FilterFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// One entry of a filter chain
#[derive(Clone)]
pub enum FilterSpec {
    /// Registered filter name, or a character class to strip if none matches
    Named(String),
    /// Filter instance used as-is
    Filter(Arc<dyn Filter>),
    /// Function applied to the whole value
    Callable(FilterFn),
}

impl FilterSpec {
    pub fn named(name: impl Into<String>) -> Self {
        FilterSpec::Named(name.into())
    }

    pub fn filter(filter: impl Filter + 'static) -> Self {
        FilterSpec::Filter(Arc::new(filter))
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        FilterSpec::Callable(Arc::new(f))
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Named(name) => f.debug_tuple("Named").field(name).finish(),
            FilterSpec::Filter(filter) => f.debug_tuple("Filter").field(&filter.name()).finish(),
            FilterSpec::Callable(_) => f.write_str("Callable"),
        }
    }
}

impl From<&str> for FilterSpec {
    fn from(name: &str) -> Self {
        FilterSpec::Named(name.to_string())
    }
}

impl From<String> for FilterSpec {
    fn from(name: String) -> Self {
        FilterSpec::Named(name)
    }
}

impl From<&String> for FilterSpec {
    fn from(name: &String) -> Self {
        FilterSpec::Named(name.clone())
    }
}

impl From<Arc<dyn Filter>> for FilterSpec {
    fn from(filter: Arc<dyn Filter>) -> Self {
        FilterSpec::Filter(filter)
    }
}

/// Compile `class` as a case-insensitive character class
pub(crate) fn class_pattern(class: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("(?i)[{class}]"))?)
}

/// Remove every match of `pattern` from a string, or from the direct string
/// elements of a list or map. Anything else is returned unchanged.
pub(crate) fn strip_pattern(pattern: &Regex, value: Value) -> Value {
    let strip = |text: String| pattern.replace_all(&text, "").into_owned();

    match value {
        Value::String(text) => Value::String(strip(text)),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(text) => Value::String(strip(text)),
                    other => other,
                })
                .collect(),
        ),
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(key, item)| match item {
                    Value::String(text) => (key, Value::String(strip(text))),
                    other => (key, other),
                })
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SecurityError;

    #[test]
    fn test_strip_pattern_string() {
        let pattern = class_pattern("0-9").unwrap();
        assert_eq!(strip_pattern(&pattern, Value::from("a1b22c")), Value::from("abc"));
    }

    #[test]
    fn test_strip_pattern_is_case_insensitive() {
        let pattern = class_pattern("a-c").unwrap();
        assert_eq!(strip_pattern(&pattern, Value::from("AbCd")), Value::from("d"));
    }

    #[test]
    fn test_strip_pattern_one_level() {
        let pattern = class_pattern("x").unwrap();
        let value = Value::List(vec![
            Value::from("axb"),
            Value::Int(1),
            Value::List(vec![Value::from("x")]),
        ]);
        assert_eq!(
            strip_pattern(&pattern, value),
            Value::List(vec![
                Value::from("ab"),
                Value::Int(1),
                Value::List(vec![Value::from("x")]),
            ])
        );
    }

    #[test]
    fn test_invalid_class() {
        assert!(matches!(
            class_pattern("z-a"),
            Err(SecurityError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", FilterSpec::from("a-z")), "Named(\"a-z\")");
        assert_eq!(format!("{:?}", FilterSpec::callable(Ok)), "Callable");
    }
}
