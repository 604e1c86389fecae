//! Record of values that have already been sanitized.

use crate::value::{ObjectRef, SharedNode, Value, object_id};
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Identity of a tracked value.
///
/// Reference values hold a handle, so their address stays reserved for as
/// long as the set lives.
#[derive(Clone, Debug)]
enum CleanedKey {
    Node(SharedNode),
    Object(ObjectRef),
    Text(String),
}

impl CleanedKey {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Shared(node) => Some(CleanedKey::Node(node.clone())),
            Value::Object(object) => Some(CleanedKey::Object(object.clone())),
            Value::String(text) => Some(CleanedKey::Text(text.clone())),
            _ => None,
        }
    }
}

impl PartialEq for CleanedKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CleanedKey::Node(a), CleanedKey::Node(b)) => a.ptr_eq(b),
            (CleanedKey::Object(a), CleanedKey::Object(b)) => object_id(a) == object_id(b),
            (CleanedKey::Text(a), CleanedKey::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CleanedKey {}

impl Hash for CleanedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CleanedKey::Node(node) => node.id().hash(state),
            CleanedKey::Object(object) => object_id(object).hash(state),
            CleanedKey::Text(text) => text.hash(state),
        }
    }
}

/// Values already processed, scoped per filter.
///
/// Shared nodes and objects are tracked by identity and strings by value.
/// Owned lists and maps are not tracked. Entries added with [`mark`] apply
/// to every filter. Only [`remove`] drops entries, and only scoped ones.
///
/// [`mark`]: CleanedSet::mark
/// [`remove`]: CleanedSet::remove
#[derive(Debug, Default)]
pub struct CleanedSet {
    scoped: HashMap<String, HashSet<CleanedKey>>,
    manual: HashSet<CleanedKey>,
}

impl CleanedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `value` was produced by the filter `scope`, or marked manually
    pub fn contains(&self, scope: &str, value: &Value) -> bool {
        let Some(key) = CleanedKey::of(value) else {
            return false;
        };
        self.manual.contains(&key)
            || self
                .scoped
                .get(scope)
                .is_some_and(|entries| entries.contains(&key))
    }

    /// Record `value` as output of the filter `scope`
    pub fn insert(&mut self, scope: &str, value: &Value) {
        let Some(key) = CleanedKey::of(value) else {
            return;
        };
        match self.scoped.get_mut(scope) {
            Some(entries) => {
                entries.insert(key);
            }
            None => {
                self.scoped
                    .insert(scope.to_string(), HashSet::from([key]));
            }
        }
    }

    /// Mark `value` as clean for every filter
    pub fn mark(&mut self, value: &Value) {
        if let Some(key) = CleanedKey::of(value) {
            self.manual.insert(key);
        }
    }

    /// Forget that the filter `scope` produced `value`. Manual marks stay.
    pub fn remove(&mut self, scope: &str, value: &Value) -> bool {
        let Some(key) = CleanedKey::of(value) else {
            return false;
        };
        let Some(entries) = self.scoped.get_mut(scope) else {
            return false;
        };
        let removed = entries.remove(&key);
        if entries.is_empty() {
            self.scoped.remove(scope);
        }
        removed
    }

    /// Whether any filter produced `value`, or it was marked manually
    pub fn is_cleaned(&self, value: &Value) -> bool {
        CleanedKey::of(value).is_some_and(|key| {
            self.manual.contains(&key)
                || self
                    .scoped
                    .values()
                    .any(|entries| entries.contains(&key))
        })
    }

    /// Number of distinct tracked values
    pub fn len(&self) -> usize {
        self.manual
            .iter()
            .chain(self.scoped.values().flatten())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.scoped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untracked_values() {
        let mut set = CleanedSet::new();
        for value in [
            Value::Null,
            Value::Int(1),
            Value::List(vec![Value::from("a")]),
        ] {
            set.insert("htmlentities", &value);
            assert!(!set.is_cleaned(&value));
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_scopes_are_separate() {
        let mut set = CleanedSet::new();
        let value = Value::from("&lt;b&gt;");
        set.insert("htmlentities", &value);

        assert!(set.contains("htmlentities", &value));
        assert!(!set.contains("striptags", &value));
        assert!(set.is_cleaned(&value));
    }

    #[test]
    fn test_manual_marks_apply_to_every_scope() {
        let mut set = CleanedSet::new();
        let value = Value::from("<b>trusted</b>");
        set.mark(&value);

        assert!(set.contains("htmlentities", &value));
        assert!(set.contains("anything", &value));
    }

    #[test]
    fn test_nodes_tracked_by_identity() {
        let mut set = CleanedSet::new();
        let node = SharedNode::list(vec![Value::from("x")]);
        let twin = SharedNode::list(vec![Value::from("x")]);
        set.insert("f", &Value::Shared(node.clone()));

        assert!(set.contains("f", &Value::Shared(node)));
        assert!(!set.contains("f", &Value::Shared(twin)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_retained_handle_keeps_address_reserved() {
        let mut set = CleanedSet::new();
        let node = SharedNode::list(Vec::new());
        let id = node.id();
        set.insert("f", &Value::Shared(node));

        // The set still owns a handle, so a new node can't reuse the address
        let fresh = SharedNode::list(Vec::new());
        assert_ne!(fresh.id(), id);
        assert!(!set.is_cleaned(&Value::Shared(fresh)));
    }

    #[test]
    fn test_values_in_several_scopes_count_once() {
        let mut set = CleanedSet::new();
        let value = Value::from("plain");
        set.insert("htmlentities", &value);
        set.insert("striptags", &value);
        set.mark(&value);

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_is_scoped() {
        let mut set = CleanedSet::new();
        let node = Value::Shared(SharedNode::list(Vec::new()));
        set.insert("htmlentities", &node);
        set.insert("striptags", &node);

        assert!(set.remove("htmlentities", &node));
        assert!(!set.remove("htmlentities", &node));
        assert!(!set.contains("htmlentities", &node));
        assert!(set.contains("striptags", &node));
        assert!(set.is_cleaned(&node));

        assert!(set.remove("striptags", &node));
        assert!(!set.is_cleaned(&node));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_keeps_manual_marks() {
        let mut set = CleanedSet::new();
        let value = Value::from("trusted");
        set.mark(&value);
        set.insert("htmlentities", &value);

        set.remove("htmlentities", &value);
        assert!(set.contains("htmlentities", &value));
        assert_eq!(set.len(), 1);
    }
}
