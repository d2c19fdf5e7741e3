use thiserror::Error;

use crate::node::NodeKind;

/// Error produced when a document node cannot be exposed as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// A property the schema marks as required is absent from the document.
    #[error("required property \"{key}\" is absent")]
    MissingRequired { key: String },

    /// The node holds a different kind of value than the adaptor expects.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: NodeKind,
    },

    /// The node is numeric but does not fit in the target type.
    #[error("value {value} does not fit in {target}")]
    OutOfRange { value: String, target: &'static str },

    /// A discriminator string is not one of the known tags.
    #[error("unknown tag \"{tag}\", expected one of: {expected}")]
    UnknownTag { tag: String, expected: String },

    /// A duration string could not be parsed.
    #[error("invalid duration \"{text}\"")]
    InvalidDuration { text: String },
}
