//! Lazy, restartable ranges over array elements and object properties.

use std::fmt;
use std::marker::PhantomData;

use crate::adaptor::Adaptor;
use crate::error::AccessError;
use crate::node::Node;

/// Which children of a node a [`Range`] visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterMode {
    /// Array elements. Any other non-null value is treated as a one-element array.
    Arrays,
    /// Object property values, in document order. Other values yield nothing.
    Objects,
    /// Array elements or object property values; scalars yield themselves once.
    Both,
}

/// A lazy view over the children of a node, each exposed through adaptor `A`.
///
/// The range owns a handle to its node but no cursor: every call to
/// [`Range::iter`] starts a fresh pass in document order. Ranges are
/// deliberately not `Clone`; clone the underlying [`Node`] instead.
pub struct Range<A> {
    node: Node,
    mode: IterMode,
    adaptor: PhantomData<fn() -> A>,
}

impl<A> Range<A> {
    #[must_use]
    pub fn new(node: Node, mode: IterMode) -> Self {
        Self {
            node,
            mode,
            adaptor: PhantomData,
        }
    }

    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    #[must_use]
    pub fn mode(&self) -> IterMode {
        self.mode
    }

    /// Starts a new pass over the range.
    #[must_use]
    pub fn iter(&self) -> RangeIter<'_, A> {
        RangeIter {
            children: self.children(),
            adaptor: PhantomData,
        }
    }

    /// Number of items a pass yields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn children(&self) -> Children<'_> {
        if self.node.is_null() {
            return Children::One(None);
        }
        if self.mode != IterMode::Objects
            && let Some(elements) = self.node.elements()
        {
            return Children::Elements(elements.iter());
        }
        if self.mode != IterMode::Arrays
            && let Some(properties) = self.node.properties()
        {
            return Children::Properties(properties);
        }
        match self.mode {
            IterMode::Objects => Children::One(None),
            IterMode::Arrays | IterMode::Both => Children::One(Some(&self.node)),
        }
    }
}

impl<A> fmt::Debug for Range<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range")
            .field("node", &self.node)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<'a, A> Adaptor<'a> for Range<A> {
    type Output = Range<A>;

    fn adapt(node: &'a Node) -> Result<Self, AccessError> {
        Ok(Self::new(node.clone(), IterMode::Arrays))
    }
}

impl<'r, A: Adaptor<'r>> IntoIterator for &'r Range<A> {
    type Item = Result<A::Output, AccessError>;
    type IntoIter = RangeIter<'r, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

enum Children<'r> {
    Elements(std::slice::Iter<'r, Node>),
    Properties(indexmap::map::Values<'r, String, Node>),
    One(Option<&'r Node>),
}

impl<'r> Iterator for Children<'r> {
    type Item = &'r Node;

    fn next(&mut self) -> Option<&'r Node> {
        match self {
            Self::Elements(iter) => iter.next(),
            Self::Properties(iter) => iter.next(),
            Self::One(slot) => slot.take(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining: usize = match self {
            Self::Elements(iter) => iter.len(),
            Self::Properties(iter) => iter.len(),
            Self::One(slot) => usize::from(slot.is_some()),
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// One pass over a [`Range`].
pub struct RangeIter<'r, A> {
    children: Children<'r>,
    adaptor: PhantomData<fn() -> A>,
}

impl<'r, A: Adaptor<'r>> Iterator for RangeIter<'r, A> {
    type Item = Result<A::Output, AccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.children.next().map(A::adapt)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl<'r, A: Adaptor<'r>> ExactSizeIterator for RangeIter<'r, A> {}

/// Adapts an object property to its key paired with the value adapted by `A`.
#[derive(Debug, Clone, Copy)]
pub struct PropertyAdaptor<A>(PhantomData<fn() -> A>);

impl<'a, A: Adaptor<'a>> Adaptor<'a> for PropertyAdaptor<A> {
    type Output = (&'a str, A::Output);

    fn adapt(node: &'a Node) -> Result<Self::Output, AccessError> {
        let key: &'a str = node.key().unwrap_or_default();
        Ok((key, A::adapt(node)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptor::{Int64Adaptor, StringAdaptor};
    use serde_json::json;

    fn collect(range: &Range<Int64Adaptor>) -> Vec<i64> {
        range.iter().collect::<Result<Vec<i64>, AccessError>>().unwrap()
    }

    #[test]
    fn array_yields_elements_in_order() {
        let range: Range<Int64Adaptor> = Range::new(Node::from(json!([1, 2, 3])), IterMode::Arrays);
        assert_eq!(vec![1, 2, 3], collect(&range));
        assert_eq!(3, range.len());
    }

    #[test]
    fn scalar_is_a_one_element_sequence() {
        let range: Range<Int64Adaptor> = Range::new(Node::from(json!(5)), IterMode::Arrays);
        assert_eq!(vec![5], collect(&range));
        assert!(!range.is_empty());
    }

    #[test]
    fn null_is_empty() {
        let range: Range<Int64Adaptor> = Range::new(Node::null(), IterMode::Both);
        assert!(range.is_empty());
        assert_eq!(Vec::<i64>::new(), collect(&range));
    }

    #[test]
    fn passes_restart_from_the_beginning() {
        let range: Range<Int64Adaptor> = Range::new(Node::from(json!([7, 8])), IterMode::Arrays);
        let mut first: RangeIter<'_, Int64Adaptor> = range.iter();
        assert_eq!(Some(Ok(7)), first.next());
        assert_eq!(vec![7, 8], collect(&range));
        assert_eq!(Some(Ok(8)), first.next());
        assert_eq!(None, first.next());
    }

    #[test]
    fn objects_mode_visits_properties_in_document_order() {
        let node: Node = Node::parse(r#"{"b": "two", "a": "one"}"#).unwrap();
        let range: Range<PropertyAdaptor<StringAdaptor>> = Range::new(node, IterMode::Objects);
        let pairs: Vec<(&str, &str)> = range
            .iter()
            .collect::<Result<Vec<(&str, &str)>, AccessError>>()
            .unwrap();
        assert_eq!(vec![("b", "two"), ("a", "one")], pairs);
    }

    #[test]
    fn objects_mode_ignores_scalars_and_arrays() {
        let scalar: Range<Int64Adaptor> = Range::new(Node::from(json!(5)), IterMode::Objects);
        let array: Range<Int64Adaptor> = Range::new(Node::from(json!([1])), IterMode::Objects);
        assert!(scalar.is_empty());
        assert!(array.is_empty());
    }

    #[test]
    fn arrays_mode_treats_object_as_single_element() {
        let node: Node = Node::from(json!({ "a": 1 }));
        let range: Range<PropertyAdaptor<Int64Adaptor>> = Range::new(node, IterMode::Arrays);
        assert_eq!(1, range.len());
        assert!(range.iter().next().unwrap().is_err());
    }

    #[test]
    fn conversion_errors_are_per_item() {
        let range: Range<Int64Adaptor> = Range::new(Node::from(json!([1, "x", 3])), IterMode::Arrays);
        let items: Vec<Result<i64, AccessError>> = range.iter().collect();
        assert_eq!(3, items.len());
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
        assert_eq!(Ok(3), items[2]);
    }

    #[test]
    fn nested_ranges_adapt_elements() {
        let node: Node = Node::from(json!([[1, 2], 3]));
        let range: Range<Range<Int64Adaptor>> = Range::new(node, IterMode::Arrays);
        let mut lengths: Vec<usize> = Vec::new();
        for inner in &range {
            lengths.push(inner.unwrap().len());
        }
        assert_eq!(vec![2, 1], lengths);
    }
}
