//! Shared handles into a parsed configuration tree.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::json_pointer;

/// The kind of value a node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
enum NodeValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(IndexMap<String, Node>),
}

#[derive(Debug)]
struct NodeData {
    /// The key this node is stored under when its parent is an object.
    key: Option<String>,
    value: NodeValue,
}

/// Reference-counted handle to one value of an immutable document tree.
///
/// Cloning a handle is cheap and shares the value; the value is freed when
/// the last handle referring to it is dropped. Children hold their own
/// handles, so a child obtained from [`Node::get`] can be cloned and kept
/// after every handle to the parent is gone.
#[derive(Debug, Clone)]
pub struct Node {
    inner: Arc<NodeData>,
}

impl Node {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if `text` is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// A detached `null` node.
    #[must_use]
    pub fn null() -> Self {
        Self::build(None, Value::Null)
    }

    fn build(key: Option<String>, value: Value) -> Self {
        let value: NodeValue = match value {
            Value::Null => NodeValue::Null,
            Value::Bool(b) => NodeValue::Bool(b),
            Value::Number(n) => NodeValue::Number(n),
            Value::String(s) => NodeValue::String(s),
            Value::Array(items) => {
                NodeValue::Array(items.into_iter().map(|v| Self::build(None, v)).collect())
            }
            Value::Object(map) => NodeValue::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let child: Node = Self::build(Some(k.clone()), v);
                        (k, child)
                    })
                    .collect(),
            ),
        };
        Self {
            inner: Arc::new(NodeData { key, value }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match &self.inner.value {
            NodeValue::Null => NodeKind::Null,
            NodeValue::Bool(_) => NodeKind::Bool,
            NodeValue::Number(n) if n.is_f64() => NodeKind::Float,
            NodeValue::Number(_) => NodeKind::Integer,
            NodeValue::String(_) => NodeKind::String,
            NodeValue::Array(_) => NodeKind::Array,
            NodeValue::Object(_) => NodeKind::Object,
        }
    }

    /// The key under which this node is stored in its parent object.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.inner.key.as_deref()
    }

    /// Looks up a property. Returns `None` if the key is absent or this node
    /// is not an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        match &self.inner.value {
            NodeValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the array element at `index`.
    #[must_use]
    pub fn index(&self, index: usize) -> Option<&Node> {
        match &self.inner.value {
            NodeValue::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Resolves a JSON Pointer relative to this node.
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&Node> {
        let mut current: &Node = self;
        for segment in json_pointer::segments(pointer)? {
            current = match &current.inner.value {
                NodeValue::Object(map) => map.get(&segment)?,
                NodeValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.inner.value {
            NodeValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.inner.value {
            NodeValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match &self.inner.value {
            NodeValue::Number(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.inner.value, NodeValue::Null)
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.inner.value, NodeValue::Object(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.inner.value, NodeValue::Array(_))
    }

    /// Number of array elements or object properties; zero for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.inner.value {
            NodeValue::Array(items) => items.len(),
            NodeValue::Object(map) => map.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn elements(&self) -> Option<&[Node]> {
        match &self.inner.value {
            NodeValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub(crate) fn properties(&self) -> Option<indexmap::map::Values<'_, String, Node>> {
        match &self.inner.value {
            NodeValue::Object(map) => Some(map.values()),
            _ => None,
        }
    }

    /// Converts the subtree rooted at this node back into a `serde_json::Value`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match &self.inner.value {
            NodeValue::Null => Value::Null,
            NodeValue::Bool(b) => Value::Bool(*b),
            NodeValue::Number(n) => Value::Number(n.clone()),
            NodeValue::String(s) => Value::String(s.clone()),
            NodeValue::Array(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            NodeValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }

    /// Serializes the subtree as compact JSON, preserving property order.
    #[must_use]
    pub fn to_compact_string(&self) -> String {
        self.to_value().to_string()
    }

    /// Number of live handles sharing this node.
    #[must_use]
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns true if both handles refer to the same node.
    #[must_use]
    pub fn same_node(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self::build(None, value)
    }
}

impl FromStr for Node {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact_string())
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Value = Deserialize::deserialize(deserializer)?;
        Ok(Self::from(value))
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.inner.value {
            NodeValue::Null => serializer.serialize_unit(),
            NodeValue::Bool(b) => serializer.serialize_bool(*b),
            NodeValue::Number(n) => n.serialize(serializer),
            NodeValue::String(s) => serializer.serialize_str(s),
            NodeValue::Array(items) => serializer.collect_seq(items),
            NodeValue::Object(map) => serializer.collect_map(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_preserves_property_order() {
        let node: Node = Node::parse(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<&str> = node
            .properties()
            .unwrap()
            .map(|child| child.key().unwrap())
            .collect();
        assert_eq!(vec!["zeta", "alpha", "mid"], keys);
        assert_eq!(r#"{"zeta":1,"alpha":2,"mid":3}"#, node.to_compact_string());
    }

    #[test]
    fn kinds_are_reported() {
        let node: Node = Node::from(json!({
            "n": null, "b": true, "i": -3, "u": 18_446_744_073_709_551_615_u64,
            "f": 1.5, "s": "x", "a": [], "o": {}
        }));
        let kind = |key: &str| node.get(key).unwrap().kind();
        assert_eq!(NodeKind::Null, kind("n"));
        assert_eq!(NodeKind::Bool, kind("b"));
        assert_eq!(NodeKind::Integer, kind("i"));
        assert_eq!(NodeKind::Integer, kind("u"));
        assert_eq!(NodeKind::Float, kind("f"));
        assert_eq!(NodeKind::String, kind("s"));
        assert_eq!(NodeKind::Array, kind("a"));
        assert_eq!(NodeKind::Object, kind("o"));
    }

    #[test]
    fn lookup_of_absent_key_is_none() {
        let node: Node = Node::from(json!({ "a": 1 }));
        assert!(node.get("b").is_none());
        assert!(node.get("a").unwrap().get("a").is_none());
    }

    #[test]
    fn children_remember_their_key() {
        let node: Node = Node::from(json!({ "outer": { "inner": 1 } }));
        let inner: &Node = node.get("outer").unwrap().get("inner").unwrap();
        assert_eq!(Some("inner"), inner.key());
        assert_eq!(None, node.key());
    }

    #[test]
    fn pointer_walks_objects_and_arrays() {
        let node: Node = Node::from(json!({ "a/b": [10, { "c": "deep" }] }));
        assert_eq!(Some("deep"), node.pointer("/a~1b/1/c").and_then(Node::as_str));
        assert!(node.pointer("").unwrap().same_node(&node));
        assert!(node.pointer("/a~1b/7").is_none());
        assert!(node.pointer("/a~1b/x").is_none());
    }

    #[test]
    fn cloned_handles_share_the_node() {
        let node: Node = Node::from(json!({ "a": 1 }));
        assert_eq!(1, node.share_count());
        let copy: Node = node.clone();
        assert_eq!(2, node.share_count());
        assert!(copy.same_node(&node));
        drop(copy);
        assert_eq!(1, node.share_count());
    }

    #[test]
    fn child_handle_outlives_parent() {
        let child: Node = {
            let parent: Node = Node::from(json!({ "name": "kept" }));
            parent.get("name").unwrap().clone()
        };
        assert_eq!(Some("kept"), child.as_str());
        assert_eq!(1, child.share_count());
    }

    #[test]
    fn serialize_matches_value_form() {
        let value: Value = json!({ "b": [1, 2.5, "x", null, false], "a": { "k": "v" } });
        let node: Node = Node::from(value.clone());
        assert_eq!(value, serde_json::to_value(&node).unwrap());
        assert_eq!(value, node.to_value());
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(Node::parse("{ not json").is_err());
        assert!("[1,".parse::<Node>().is_err());
    }
}
