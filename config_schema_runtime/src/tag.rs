//! String-keyed dispatch onto a fixed set of tags.
//!
//! A [`TagTable`] is the single place a discriminator string is mapped to a
//! tag value; callers then `match` on the tag exhaustively. Unknown strings
//! are an error, there is no fallback variant.

use std::marker::PhantomData;

use crate::adaptor::{Adaptor, StringAdaptor, required};
use crate::error::AccessError;
use crate::node::Node;

/// Ordered mapping from tag strings to values.
#[derive(Debug, Clone, Copy)]
pub struct TagTable<T: 'static> {
    entries: &'static [(&'static str, T)],
}

impl<T: Copy> TagTable<T> {
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, T)]) -> Self {
        Self { entries }
    }

    /// Returns the value for `tag`; the first matching entry wins.
    #[must_use]
    pub fn lookup(&self, tag: &str) -> Option<T> {
        self.entries
            .iter()
            .find(|(key, _)| *key == tag)
            .map(|&(_, value)| value)
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|&(key, _)| key)
    }

    /// Comma-separated list of the accepted tags, for error messages.
    #[must_use]
    pub fn expected(&self) -> String {
        self.tags().collect::<Vec<&str>>().join(", ")
    }
}

/// A tag type with its string table.
pub trait Tagged: Copy + 'static {
    const TABLE: TagTable<Self>;
}

/// Exposes a string node as the tag `T` it names.
#[derive(Debug, Clone, Copy)]
pub struct EnumAdaptor<T>(PhantomData<fn() -> T>);

impl<'a, T: Tagged> Adaptor<'a> for EnumAdaptor<T> {
    type Output = T;

    fn adapt(node: &'a Node) -> Result<T, AccessError> {
        let tag: &str = StringAdaptor::adapt(node)?;
        T::TABLE
            .lookup(tag)
            .ok_or_else(|| AccessError::UnknownTag {
                tag: tag.to_string(),
                expected: T::TABLE.expected(),
            })
    }
}

/// Reads the discriminator stored under `key` and maps it to its tag.
///
/// # Errors
///
/// Returns `AccessError::MissingRequired` when the discriminator is absent,
/// `AccessError::TypeMismatch` when it is not a string, and
/// `AccessError::UnknownTag` when the string is not in `T::TABLE`.
pub fn dispatch<T: Tagged>(node: &Node, key: &str) -> Result<T, AccessError> {
    required::<EnumAdaptor<T>>(node, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shape {
        Circle,
        Square,
    }

    impl Tagged for Shape {
        const TABLE: TagTable<Self> = TagTable::new(&[("circle", Self::Circle), ("square", Self::Square)]);
    }

    #[test]
    fn lookup_finds_known_tags() {
        assert_eq!(Some(Shape::Circle), Shape::TABLE.lookup("circle"));
        assert_eq!(Some(Shape::Square), Shape::TABLE.lookup("square"));
        assert_eq!(None, Shape::TABLE.lookup("Circle"));
    }

    #[test]
    fn expected_lists_tags_in_order() {
        assert_eq!("circle, square", Shape::TABLE.expected());
    }

    #[test]
    fn dispatch_reads_discriminator() {
        let node: Node = Node::from(json!({ "kind": "square" }));
        assert_eq!(Ok(Shape::Square), dispatch::<Shape>(&node, "kind"));
    }

    #[test]
    fn dispatch_has_no_default_variant() {
        let unknown: Node = Node::from(json!({ "kind": "triangle" }));
        assert_eq!(
            Err(AccessError::UnknownTag {
                tag: "triangle".to_string(),
                expected: "circle, square".to_string(),
            }),
            dispatch::<Shape>(&unknown, "kind")
        );

        let missing: Node = Node::from(json!({}));
        assert_eq!(
            Err(AccessError::MissingRequired {
                key: "kind".to_string(),
            }),
            dispatch::<Shape>(&missing, "kind")
        );

        let wrong_kind: Node = Node::from(json!({ "kind": ["circle"] }));
        assert!(dispatch::<Shape>(&wrong_kind, "kind").is_err());
    }
}
