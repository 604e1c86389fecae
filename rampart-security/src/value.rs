//! Sanitization input model.
//!
//! Owned scalars and containers form a tree. [`SharedNode`] is a shared,
//! mutable container with identity and is the only way to build a cycle.
//! [`ObjectValue`] lets host types flow through the filters.

use crate::error::{Result, SecurityError};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Host object passed through sanitization
pub trait ObjectValue: fmt::Debug + Send + Sync {
    /// Type name matched against `whitelistedClasses`
    fn type_name(&self) -> &str;

    /// Supertype names, also matched against the whitelist
    fn parent_types(&self) -> &[&str] {
        &[]
    }

    /// String form, if the type has one
    fn to_text(&self) -> Option<String> {
        None
    }
}

pub type ObjectRef = Arc<dyn ObjectValue>;

/// Value to sanitize
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Shared(SharedNode),
    Object(ObjectRef),
}

/// Contents of a [`SharedNode`]
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Container {
    pub fn len(&self) -> usize {
        match self {
            Container::List(items) => items.len(),
            Container::Map(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared container with reference identity.
///
/// Clones are handles to the same node. Equality is identity.
#[derive(Clone)]
pub struct SharedNode(Arc<Mutex<Container>>);

impl SharedNode {
    pub fn new(container: Container) -> Self {
        Self(Arc::new(Mutex::new(container)))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Self::new(Container::List(items))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Self {
        Self::new(Container::Map(entries))
    }

    /// Address-based identity
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &SharedNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Shallow copy of the contents; child nodes are shared, not copied
    pub fn snapshot(&self) -> Container {
        self.0.lock().clone()
    }

    /// Swap in new contents, returning the old
    pub fn replace(&self, container: Container) -> Container {
        std::mem::replace(&mut *self.0.lock(), container)
    }

    /// Append to a list node. Returns `false` for map nodes.
    pub fn push(&self, value: Value) -> bool {
        match &mut *self.0.lock() {
            Container::List(items) => {
                items.push(value);
                true
            }
            Container::Map(_) => false,
        }
    }

    /// Insert into a map node. Returns `false` for list nodes.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> bool {
        match &mut *self.0.lock() {
            Container::Map(entries) => {
                entries.insert(key.into(), value);
                true
            }
            Container::List(_) => false,
        }
    }

    /// Read the contents under the lock. `f` must not lock this node again.
    pub fn with<R>(&self, f: impl FnOnce(&Container) -> R) -> R {
        f(&self.0.lock())
    }
}

impl fmt::Debug for SharedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedNode")
            .field(&format_args!("{:#x}", self.id()))
            .finish()
    }
}

impl PartialEq for SharedNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for SharedNode {}

pub(crate) fn object_id(object: &ObjectRef) -> usize {
    Arc::as_ptr(object) as *const () as usize
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Shared(a), Value::Shared(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => object_id(a) == object_id(b),
            _ => false,
        }
    }
}

impl Value {
    pub fn object(object: impl ObjectValue + 'static) -> Self {
        Value::Object(Arc::new(object))
    }

    pub fn shared_list(items: Vec<Value>) -> Self {
        Value::Shared(SharedNode::list(items))
    }

    pub fn shared_map(entries: IndexMap<String, Value>) -> Self {
        Value::Shared(SharedNode::map(entries))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_shared(&self) -> Option<&SharedNode> {
        match self {
            Value::Shared(node) => Some(node),
            _ => None,
        }
    }

    /// `true` for booleans and numbers, which no filter alters
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Int(_) | Value::Float(_))
    }

    /// Short type label for diagnostics
    pub fn kind(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Shared(_) => "shared",
            Value::Object(object) => object.type_name(),
        }
    }

    /// Convert to JSON, expanding shared nodes and stringable objects.
    ///
    /// Cycles surface as [`SecurityError::NestingTooDeep`].
    pub fn to_json(&self, max_depth: usize) -> Result<serde_json::Value> {
        self.to_json_at(0, max_depth)
    }

    fn to_json_at(&self, depth: usize, max_depth: usize) -> Result<serde_json::Value> {
        use serde_json::Value as Json;

        let nested = |depth: usize| {
            if depth >= max_depth {
                Err(SecurityError::NestingTooDeep { limit: max_depth })
            } else {
                Ok(depth + 1)
            }
        };

        Ok(match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => list_to_json(items, nested(depth)?, max_depth)?,
            Value::Map(entries) => map_to_json(entries, nested(depth)?, max_depth)?,
            Value::Shared(node) => match node.snapshot() {
                Container::List(items) => list_to_json(&items, nested(depth)?, max_depth)?,
                Container::Map(entries) => map_to_json(&entries, nested(depth)?, max_depth)?,
            },
            Value::Object(object) => match object.to_text() {
                Some(text) => Json::String(text),
                None => {
                    return Err(SecurityError::Unsanitizable {
                        type_name: object.type_name().to_string(),
                    });
                }
            },
        })
    }
}

fn list_to_json(items: &[Value], depth: usize, max_depth: usize) -> Result<serde_json::Value> {
    items
        .iter()
        .map(|item| item.to_json_at(depth, max_depth))
        .collect::<Result<Vec<_>>>()
        .map(serde_json::Value::Array)
}

fn map_to_json(
    entries: &IndexMap<String, Value>,
    depth: usize,
    max_depth: usize,
) -> Result<serde_json::Value> {
    let mut map = serde_json::Map::with_capacity(entries.len());
    for (key, value) in entries {
        map.insert(key.clone(), value.to_json_at(depth, max_depth)?);
    }
    Ok(serde_json::Value::Object(map))
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl From<SharedNode> for Value {
    fn from(node: SharedNode) -> Self {
        Value::Shared(node)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}
