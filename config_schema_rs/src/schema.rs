//! Typed view over a schema document.
//!
//! Schema nodes are read through the same runtime the generated code uses:
//! the `type` discriminator goes through a [`TagTable`], properties are a
//! [`Range`] of key/schema pairs, and bounds come out of [`DoubleAdaptor`].

use std::fmt;

use config_schema_runtime::{
    AccessError, Adaptor, DoubleAdaptor, IterMode, Node, PropertyAdaptor, Range, StringAdaptor,
    TagTable, Tagged, dispatch, object, optional, required,
};

/// The six kinds of schema the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

impl Tagged for SchemaKind {
    const TABLE: TagTable<Self> = TagTable::new(&[
        ("object", Self::Object),
        ("array", Self::Array),
        ("string", Self::String),
        ("number", Self::Number),
        ("integer", Self::Integer),
        ("boolean", Self::Boolean),
    ]);
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Metadata every schema kind carries.
#[derive(Debug, Clone)]
pub struct SchemaBase {
    node: Node,
}

impl SchemaBase {
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The `title`, or `""` when absent.
    #[must_use]
    pub fn title(&self) -> &str {
        self.annotation("title").unwrap_or_default()
    }

    /// The `description` with surrounding whitespace removed; blank
    /// descriptions count as absent.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.annotation("description")
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    fn annotation(&self, key: &str) -> Option<&str> {
        optional::<StringAdaptor>(&self.node, key).ok().flatten()
    }
}

#[derive(Debug, Clone)]
pub struct ObjectSchema {
    base: SchemaBase,
}

impl ObjectSchema {
    #[must_use]
    pub fn base(&self) -> &SchemaBase {
        &self.base
    }

    /// Property names paired with their schemas, in document order.
    #[must_use]
    pub fn properties(&self) -> Range<PropertyAdaptor<SchemaNode>> {
        let properties: Node = self
            .base
            .node
            .get("properties")
            .cloned()
            .unwrap_or_else(Node::null);
        Range::new(properties, IterMode::Objects)
    }

    /// Names listed in `required`; `None` when the keyword is absent.
    ///
    /// # Errors
    ///
    /// Returns an `AccessError` if `required` is not an array.
    pub fn required(&self) -> Result<Option<Range<StringAdaptor>>, AccessError> {
        let required: Option<&Node> = self.base.node.get("required");
        if let Some(node) = required
            && !node.is_array()
        {
            return Err(AccessError::TypeMismatch {
                expected: "array",
                found: node.kind(),
            });
        }
        optional::<Range<StringAdaptor>>(&self.base.node, "required")
    }
}

#[derive(Debug, Clone)]
pub struct ArraySchema {
    base: SchemaBase,
}

impl ArraySchema {
    #[must_use]
    pub fn base(&self) -> &SchemaBase {
        &self.base
    }

    /// The element schema. Arrays are always homogeneous.
    ///
    /// # Errors
    ///
    /// Returns an `AccessError` if `items` is absent or is not a schema.
    pub fn items(&self) -> Result<SchemaNode, AccessError> {
        required::<SchemaNode>(&self.base.node, "items")
    }
}

/// Constraints shared by `number` and `integer` schemas.
#[derive(Debug, Clone)]
pub struct NumberSchema {
    base: SchemaBase,
}

impl NumberSchema {
    #[must_use]
    pub fn base(&self) -> &SchemaBase {
        &self.base
    }

    /// # Errors
    ///
    /// Returns an `AccessError` if the bound is present but not a number.
    pub fn minimum(&self) -> Result<Option<f64>, AccessError> {
        self.bound("minimum")
    }

    /// # Errors
    ///
    /// Returns an `AccessError` if the bound is present but not a number.
    pub fn exclusive_minimum(&self) -> Result<Option<f64>, AccessError> {
        self.bound("exclusiveMinimum")
    }

    /// # Errors
    ///
    /// Returns an `AccessError` if the bound is present but not a number.
    pub fn maximum(&self) -> Result<Option<f64>, AccessError> {
        self.bound("maximum")
    }

    /// # Errors
    ///
    /// Returns an `AccessError` if the bound is present but not a number.
    pub fn exclusive_maximum(&self) -> Result<Option<f64>, AccessError> {
        self.bound("exclusiveMaximum")
    }

    /// # Errors
    ///
    /// Returns an `AccessError` if `multipleOf` is present but not a number.
    pub fn multiple_of(&self) -> Result<Option<f64>, AccessError> {
        self.bound("multipleOf")
    }

    fn bound(&self, key: &str) -> Result<Option<f64>, AccessError> {
        optional::<DoubleAdaptor>(&self.base.node, key)
    }
}

/// One schema, discriminated by its `type`.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(SchemaBase),
    Number(NumberSchema),
    Integer(NumberSchema),
    Boolean(SchemaBase),
}

impl SchemaNode {
    /// Reads `node` as a schema.
    ///
    /// # Errors
    ///
    /// Returns an `AccessError` if `node` is not an object, has no `type`,
    /// or names a type outside [`SchemaKind`].
    pub fn from_node(node: &Node) -> Result<Self, AccessError> {
        let base: SchemaBase = SchemaBase {
            node: object(node)?,
        };
        let schema: Self = match dispatch::<SchemaKind>(node, "type")? {
            SchemaKind::Object => Self::Object(ObjectSchema { base }),
            SchemaKind::Array => Self::Array(ArraySchema { base }),
            SchemaKind::String => Self::String(base),
            SchemaKind::Number => Self::Number(NumberSchema { base }),
            SchemaKind::Integer => Self::Integer(NumberSchema { base }),
            SchemaKind::Boolean => Self::Boolean(base),
        };
        Ok(schema)
    }

    #[must_use]
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Object(_) => SchemaKind::Object,
            Self::Array(_) => SchemaKind::Array,
            Self::String(_) => SchemaKind::String,
            Self::Number(_) => SchemaKind::Number,
            Self::Integer(_) => SchemaKind::Integer,
            Self::Boolean(_) => SchemaKind::Boolean,
        }
    }

    #[must_use]
    pub fn base(&self) -> &SchemaBase {
        match self {
            Self::Object(o) => &o.base,
            Self::Array(a) => &a.base,
            Self::Number(n) | Self::Integer(n) => &n.base,
            Self::String(base) | Self::Boolean(base) => base,
        }
    }
}

impl<'a> Adaptor<'a> for SchemaNode {
    type Output = SchemaNode;

    fn adapt(node: &'a Node) -> Result<Self, AccessError> {
        Self::from_node(node)
    }
}

/// The document root: an object schema plus its `$schema` and `$id`.
#[derive(Debug, Clone)]
pub struct Root {
    object: ObjectSchema,
}

impl Root {
    /// # Errors
    ///
    /// Returns an `AccessError` if the document is not an object schema.
    pub fn new(node: &Node) -> Result<Self, AccessError> {
        match SchemaNode::from_node(node)? {
            SchemaNode::Object(object) => Ok(Self { object }),
            other => Err(AccessError::UnknownTag {
                tag: other.kind().to_string(),
                expected: SchemaKind::Object.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn object(&self) -> &ObjectSchema {
        &self.object
    }

    /// The `$schema` URI, or `""` when absent.
    #[must_use]
    pub fn schema(&self) -> &str {
        self.object.base.annotation("$schema").unwrap_or_default()
    }

    /// The `$id` URI, or `""` when absent.
    #[must_use]
    pub fn id(&self) -> &str {
        self.object.base.annotation("$id").unwrap_or_default()
    }
}
