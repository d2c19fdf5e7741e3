//! Runtime support for configuration accessors generated by `config-schema-rs`.
//!
//! A parsed document is a tree of shared [`Node`] handles. Generated types
//! wrap one handle each and read their properties through [`Adaptor`]s,
//! which turn a node into a native value: strings borrow from the node,
//! everything else is returned by value. Arrays are exposed as lazy
//! [`Range`]s, and an [`EmbeddedSchema`] lets a generated factory validate a
//! document before wrapping it.
//!
//! ```
//! use config_schema_runtime::{Node, StringAdaptor, UInt16Adaptor, optional, required};
//!
//! let node: Node = Node::parse(r#"{"host": "localhost", "port": 8080}"#).unwrap();
//! let host: &str = required::<StringAdaptor>(&node, "host").unwrap();
//! let port: Option<u16> = optional::<UInt16Adaptor>(&node, "port").unwrap();
//! assert_eq!("localhost", host);
//! assert_eq!(Some(8080), port);
//! ```

mod adaptor;
mod embed;
mod error;
pub mod json_pointer;
mod node;
mod range;
mod tag;
mod validate;

pub use adaptor::{
    Adaptor, BoolAdaptor, DoubleAdaptor, DurationAdaptor, FloatAdaptor, Int8Adaptor,
    Int16Adaptor, Int32Adaptor, Int64Adaptor, NodeAdaptor, StringAdaptor, UInt8Adaptor,
    UInt16Adaptor, UInt32Adaptor, UInt64Adaptor, object, optional, required,
};
pub use embed::EmbeddedSchema;
pub use error::AccessError;
pub use node::{Node, NodeKind};
pub use range::{IterMode, PropertyAdaptor, Range, RangeIter};
pub use tag::{EnumAdaptor, TagTable, Tagged, dispatch};
pub use validate::{SchemaLoadError, SchemaValidator, ValidationError};
