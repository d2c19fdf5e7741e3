//! Value adaptors: short-lived conversions from a node to a native value.
//!
//! Generated accessors never convert nodes themselves; they name an adaptor
//! and call [`required`] or [`optional`]. An adaptor's output either borrows
//! from the node (strings) or owns what it returns (numbers, generated types,
//! ranges). Borrowed outputs are tied to the node they came from by the
//! `'a` lifetime, so they cannot outlive the document.

use std::time::Duration;

use crate::error::AccessError;
use crate::node::{Node, NodeKind};
use crate::tag::TagTable;

/// Converts a node into a native value.
pub trait Adaptor<'a> {
    type Output;

    /// # Errors
    ///
    /// Returns an `AccessError` if the node cannot be exposed as `Output`.
    fn adapt(node: &'a Node) -> Result<Self::Output, AccessError>;
}

fn mismatch(expected: &'static str, node: &Node) -> AccessError {
    AccessError::TypeMismatch {
        expected,
        found: node.kind(),
    }
}

/// Reads a required property through adaptor `A`.
///
/// # Errors
///
/// Returns `AccessError::MissingRequired` if `key` is absent, or the
/// adaptor's error if the value cannot be converted.
pub fn required<'a, A: Adaptor<'a>>(node: &'a Node, key: &str) -> Result<A::Output, AccessError> {
    let child: &'a Node = node
        .get(key)
        .ok_or_else(|| AccessError::MissingRequired {
            key: key.to_string(),
        })?;
    A::adapt(child)
}

/// Reads an optional property through adaptor `A`.
///
/// The result is `Ok(None)` if and only if `key` is absent.
///
/// # Errors
///
/// Returns the adaptor's error if the key is present but cannot be converted.
pub fn optional<'a, A: Adaptor<'a>>(
    node: &'a Node,
    key: &str,
) -> Result<Option<A::Output>, AccessError> {
    node.get(key).map(A::adapt).transpose()
}

/// Checks that `node` is an object and returns a new handle to it.
///
/// Generated types call this before wrapping a node.
///
/// # Errors
///
/// Returns `AccessError::TypeMismatch` for any other kind of node.
pub fn object(node: &Node) -> Result<Node, AccessError> {
    if node.is_object() {
        Ok(node.clone())
    } else {
        Err(mismatch("object", node))
    }
}

/// Exposes a node as itself, for callers that inspect raw children.
#[derive(Debug, Clone, Copy)]
pub struct NodeAdaptor;

impl<'a> Adaptor<'a> for NodeAdaptor {
    type Output = &'a Node;

    fn adapt(node: &'a Node) -> Result<&'a Node, AccessError> {
        Ok(node)
    }
}

/// Exposes a string node as `&str`, borrowed from the node.
#[derive(Debug, Clone, Copy)]
pub struct StringAdaptor;

impl<'a> Adaptor<'a> for StringAdaptor {
    type Output = &'a str;

    fn adapt(node: &'a Node) -> Result<&'a str, AccessError> {
        node.as_str().ok_or_else(|| mismatch("string", node))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoolAdaptor;

impl<'a> Adaptor<'a> for BoolAdaptor {
    type Output = bool;

    fn adapt(node: &'a Node) -> Result<bool, AccessError> {
        node.as_bool().ok_or_else(|| mismatch("boolean", node))
    }
}

/// 2^64, the first integral float no integer adaptor can hold.
const INTEGRAL_FLOAT_UPPER: f64 = 18_446_744_073_709_551_616.0;

/// -2^63, the most negative value any integer adaptor can hold.
const INTEGRAL_FLOAT_LOWER: f64 = -9_223_372_036_854_775_808.0;

/// Widest integer view of a node. Floats are accepted only when integral.
fn integer(node: &Node, target: &'static str) -> Result<i128, AccessError> {
    if let Some(i) = node.as_i64() {
        return Ok(i128::from(i));
    }
    if let Some(u) = node.as_u64() {
        return Ok(i128::from(u));
    }
    match node.as_f64() {
        Some(f) if f.fract() == 0.0 && f.is_finite() => {
            if !(INTEGRAL_FLOAT_LOWER..INTEGRAL_FLOAT_UPPER).contains(&f) {
                return Err(AccessError::OutOfRange {
                    value: f.to_string(),
                    target,
                });
            }
            #[expect(clippy::cast_possible_truncation)]
            let whole: i128 = f as i128;
            Ok(whole)
        }
        _ => Err(mismatch("integer", node)),
    }
}

macro_rules! integer_adaptor {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Exposes an integral node as `", stringify!($ty), "`, failing if it does not fit.")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl<'a> Adaptor<'a> for $name {
            type Output = $ty;

            fn adapt(node: &'a Node) -> Result<$ty, AccessError> {
                let wide: i128 = integer(node, stringify!($ty))?;
                <$ty>::try_from(wide).map_err(|_| AccessError::OutOfRange {
                    value: wide.to_string(),
                    target: stringify!($ty),
                })
            }
        }
    };
}

integer_adaptor!(Int8Adaptor, i8);
integer_adaptor!(Int16Adaptor, i16);
integer_adaptor!(Int32Adaptor, i32);
integer_adaptor!(Int64Adaptor, i64);
integer_adaptor!(UInt8Adaptor, u8);
integer_adaptor!(UInt16Adaptor, u16);
integer_adaptor!(UInt32Adaptor, u32);
integer_adaptor!(UInt64Adaptor, u64);

/// Exposes any numeric node as `f32`, rounding to the nearest representable value.
#[derive(Debug, Clone, Copy)]
pub struct FloatAdaptor;

impl<'a> Adaptor<'a> for FloatAdaptor {
    type Output = f32;

    fn adapt(node: &'a Node) -> Result<f32, AccessError> {
        let value: f64 = node.as_f64().ok_or_else(|| mismatch("number", node))?;
        #[expect(clippy::cast_possible_truncation)]
        let narrowed: f32 = value as f32;
        Ok(narrowed)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DoubleAdaptor;

impl<'a> Adaptor<'a> for DoubleAdaptor {
    type Output = f64;

    fn adapt(node: &'a Node) -> Result<f64, AccessError> {
        node.as_f64().ok_or_else(|| mismatch("number", node))
    }
}

/// Milliseconds per duration unit suffix. A bare number means seconds.
const DURATION_UNITS: TagTable<f64> = TagTable::new(&[
    ("", 1_000.0),
    ("ms", 1.0),
    ("s", 1_000.0),
    ("min", 60_000.0),
    ("h", 3_600_000.0),
    ("d", 86_400_000.0),
    ("w", 604_800_000.0),
    ("y", 31_536_000_000.0),
]);

fn parse_duration(text: &str) -> Option<Duration> {
    let trimmed: &str = text.trim();
    // Longest matching suffix, so "ms" wins over "s" and exponents such as
    // "1e3ms" stay in the amount.
    let unit: &str = DURATION_UNITS
        .tags()
        .filter(|unit| trimmed.ends_with(unit))
        .max_by_key(|unit| unit.len())
        .unwrap_or_default();
    let amount: f64 = trimmed[..trimmed.len() - unit.len()].trim().parse().ok()?;
    let millis_per_unit: f64 = DURATION_UNITS.lookup(unit)?;
    Duration::try_from_secs_f64(amount * millis_per_unit / 1_000.0).ok()
}

/// Exposes a node as a [`Duration`].
///
/// Numbers are read as seconds. Strings may carry a unit suffix:
/// `ms`, `s`, `min`, `h`, `d`, `w` or `y` (e.g. `"250ms"`, `"5min"`).
#[derive(Debug, Clone, Copy)]
pub struct DurationAdaptor;

impl<'a> Adaptor<'a> for DurationAdaptor {
    type Output = Duration;

    fn adapt(node: &'a Node) -> Result<Duration, AccessError> {
        let invalid = || AccessError::InvalidDuration {
            text: node.to_compact_string(),
        };
        match node.kind() {
            NodeKind::Integer | NodeKind::Float => {
                let seconds: f64 = node.as_f64().ok_or_else(invalid)?;
                Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
            }
            NodeKind::String => node.as_str().and_then(parse_duration).ok_or_else(invalid),
            _ => Err(mismatch("duration", node)),
        }
    }
}
