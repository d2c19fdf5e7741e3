//! Decides the Rust type and runtime adaptor for each schema node.

use tracing::debug;

use config_schema_runtime::{AccessError, json_pointer};

use crate::codegen::{self, GeneratedType, NameScope};
use crate::error::ConfigSchemaGenError;
use crate::schema::{NumberSchema, SchemaNode};

/// Fixed-width integer types a numeric property can narrow to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    Int64,
    UInt64,
    Int32,
    UInt32,
    Int16,
    UInt16,
    Int8,
    UInt8,
}

/// Candidates in probe order; the last one that fits wins, so the signed
/// type of a width is always tried before the unsigned one.
const PROBE_ORDER: [NumericType; 8] = [
    NumericType::Int64,
    NumericType::UInt64,
    NumericType::Int32,
    NumericType::UInt32,
    NumericType::Int16,
    NumericType::UInt16,
    NumericType::Int8,
    NumericType::UInt8,
];

impl NumericType {
    #[must_use]
    pub fn rust_type(self) -> &'static str {
        match self {
            Self::Int64 => "i64",
            Self::UInt64 => "u64",
            Self::Int32 => "i32",
            Self::UInt32 => "u32",
            Self::Int16 => "i16",
            Self::UInt16 => "u16",
            Self::Int8 => "i8",
            Self::UInt8 => "u8",
        }
    }

    #[must_use]
    pub fn adaptor(self) -> &'static str {
        match self {
            Self::Int64 => "Int64Adaptor",
            Self::UInt64 => "UInt64Adaptor",
            Self::Int32 => "Int32Adaptor",
            Self::UInt32 => "UInt32Adaptor",
            Self::Int16 => "Int16Adaptor",
            Self::UInt16 => "UInt16Adaptor",
            Self::Int8 => "Int8Adaptor",
            Self::UInt8 => "UInt8Adaptor",
        }
    }

    fn range(self) -> (i128, i128) {
        match self {
            Self::Int64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            Self::UInt64 => (0, i128::from(u64::MAX)),
            Self::Int32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            Self::UInt32 => (0, i128::from(u32::MAX)),
            Self::Int16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
            Self::UInt16 => (0, i128::from(u16::MAX)),
            Self::Int8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
            Self::UInt8 => (0, i128::from(u8::MAX)),
        }
    }

    fn contains(self, lower: i128, upper: i128) -> bool {
        let (min, max): (i128, i128) = self.range();
        lower >= min && upper <= max
    }
}

/// Picks the narrowest integer type whose range covers `[lower, upper]`.
#[must_use]
pub fn choose_numeric_type(lower: i128, upper: i128) -> NumericType {
    // The bounds are clamped to the i64 range, which always fits Int64.
    PROBE_ORDER
        .iter()
        .rev()
        .copied()
        .find(|candidate| candidate.contains(lower, upper))
        .unwrap_or(NumericType::Int64)
}

/// Rust type a property resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Str,
    Bool,
    Integer(NumericType),
    Double,
    /// A generated type, named by its path from the enclosing type's scope.
    Generated(String),
    /// A lazy range whose elements have the inner type.
    Range(Box<ValueType>),
}

impl ValueType {
    /// The type an accessor returns, before optional wrapping.
    #[must_use]
    pub fn rust_type(&self, runtime: &str) -> String {
        match self {
            Self::Str => "&str".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Integer(numeric) => numeric.rust_type().to_string(),
            Self::Double => "f64".to_string(),
            Self::Generated(path) => path.clone(),
            Self::Range(item) => format!("{runtime}::Range<{}>", item.adaptor(runtime)),
        }
    }

    /// The adaptor that reads a node as this type.
    #[must_use]
    pub fn adaptor(&self, runtime: &str) -> String {
        match self {
            Self::Str => format!("{runtime}::StringAdaptor"),
            Self::Bool => format!("{runtime}::BoolAdaptor"),
            Self::Integer(numeric) => format!("{runtime}::{}", numeric.adaptor()),
            Self::Double => format!("{runtime}::DoubleAdaptor"),
            Self::Generated(path) => path.clone(),
            Self::Range(_) => self.rust_type(runtime),
        }
    }

    /// Whether values of this type borrow from the document node.
    #[must_use]
    pub fn borrows_source(&self) -> bool {
        matches!(self, Self::Str)
    }
}

/// The outcome of resolving one schema node.
#[derive(Debug)]
pub struct Resolution {
    pub value_type: ValueType,
    /// A type generated for this node, emitted before the type that uses it.
    pub nested: Option<GeneratedType>,
}

/// Types and modules declared inside one generated type's module.
#[derive(Debug)]
pub struct TypeScope {
    module: String,
    types: NameScope,
    modules: NameScope,
}

impl TypeScope {
    #[must_use]
    pub fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
            types: NameScope::new(""),
            modules: NameScope::new("_"),
        }
    }
}

fn resolution_error(path: &str, source: AccessError) -> ConfigSchemaGenError {
    ConfigSchemaGenError::ResolutionError {
        path: path.to_string(),
        source,
    }
}

fn rounded(value: f64, round: fn(f64) -> f64) -> i128 {
    #[expect(clippy::cast_possible_truncation)]
    let whole: i128 = round(value) as i128;
    whole
}

fn resolve_number(
    number: &NumberSchema,
    integer: bool,
    path: &str,
) -> Result<ValueType, ConfigSchemaGenError> {
    let bound = |read: fn(&NumberSchema) -> Result<Option<f64>, AccessError>, key: &str| {
        read(number).map_err(|e| resolution_error(&json_pointer::format(path, key), e))
    };
    let multiple_of: Option<f64> = bound(NumberSchema::multiple_of, "multipleOf")?;
    let whole_multiple: bool = multiple_of.is_some_and(|m| m.is_finite() && m.fract() == 0.0);
    if !integer && !whole_multiple {
        return Ok(ValueType::Double);
    }

    let mut lower: i128 = i128::from(i64::MIN);
    let mut upper: i128 = i128::from(i64::MAX);
    if let Some(minimum) = bound(NumberSchema::minimum, "minimum")? {
        lower = lower.max(rounded(minimum, f64::ceil));
    }
    if let Some(minimum) = bound(NumberSchema::exclusive_minimum, "exclusiveMinimum")? {
        lower = lower.max(rounded(minimum, f64::floor).saturating_add(1));
    }
    if let Some(maximum) = bound(NumberSchema::maximum, "maximum")? {
        upper = upper.min(rounded(maximum, f64::floor));
    }
    if let Some(maximum) = bound(NumberSchema::exclusive_maximum, "exclusiveMaximum")? {
        upper = upper.min(rounded(maximum, f64::ceil).saturating_sub(1));
    }
    let lower: i128 = lower.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
    let upper: i128 = upper.clamp(i128::from(i64::MIN), i128::from(i64::MAX));

    let chosen: NumericType = choose_numeric_type(lower, upper);
    debug!(path, %lower, %upper, chosen = chosen.rust_type(), "narrowed integer");
    Ok(ValueType::Integer(chosen))
}

/// Resolves `schema`, found at `path`, for a property whose accessor is `base`.
///
/// Object schemas generate a new type named after `base` in `scope`; arrays
/// resolve their items under `base` + `_item`.
///
/// # Errors
///
/// Returns `ConfigSchemaGenError::ResolutionError` if a nested schema cannot
/// be read.
pub fn resolve(
    schema: &SchemaNode,
    base: &str,
    scope: &mut TypeScope,
    path: &str,
) -> Result<Resolution, ConfigSchemaGenError> {
    let plain = |value_type: ValueType| Resolution {
        value_type,
        nested: None,
    };
    let resolution: Resolution = match schema {
        SchemaNode::String(_) => plain(ValueType::Str),
        SchemaNode::Boolean(_) => plain(ValueType::Bool),
        SchemaNode::Integer(number) => plain(resolve_number(number, true, path)?),
        SchemaNode::Number(number) => plain(resolve_number(number, false, path)?),
        SchemaNode::Object(object) => {
            let name: String = scope.types.claim(&codegen::nested_type_name(base));
            let module: String = scope.modules.claim(&codegen::module_name(&name));
            let nested: GeneratedType = codegen::build_type(object, &name, &module, path)?;
            Resolution {
                value_type: ValueType::Generated(format!("{}::{name}", scope.module)),
                nested: Some(nested),
            }
        }
        SchemaNode::Array(array) => {
            let items_path: String = json_pointer::format(path, "items");
            let items: SchemaNode = array
                .items()
                .map_err(|e| resolution_error(&items_path, e))?;
            let item: Resolution = resolve(&items, &format!("{base}_item"), scope, &items_path)?;
            Resolution {
                value_type: ValueType::Range(Box::new(item.value_type)),
                nested: item.nested,
            }
        }
    };
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_schema_runtime::Node;
    use serde_json::json;

    fn resolve_json(schema: serde_json::Value) -> Resolution {
        let schema: SchemaNode = SchemaNode::from_node(&Node::from(schema)).unwrap();
        let mut scope: TypeScope = TypeScope::new("config");
        resolve(&schema, "value", &mut scope, "/properties/value").unwrap()
    }

    fn integer_type(schema: serde_json::Value) -> ValueType {
        resolve_json(schema).value_type
    }

    #[test]
    fn probe_prefers_last_fitting_type() {
        assert_eq!(NumericType::UInt8, choose_numeric_type(0, 255));
        assert_eq!(NumericType::Int8, choose_numeric_type(-100, 100));
        assert_eq!(NumericType::UInt16, choose_numeric_type(0, 256));
        assert_eq!(NumericType::Int16, choose_numeric_type(-129, 0));
        assert_eq!(NumericType::UInt32, choose_numeric_type(1, 4_294_967_295));
        assert_eq!(NumericType::Int32, choose_numeric_type(-1, 65_536));
        assert_eq!(NumericType::UInt64, choose_numeric_type(0, i128::from(i64::MAX)));
        assert_eq!(
            NumericType::Int64,
            choose_numeric_type(i128::from(i64::MIN), i128::from(i64::MAX))
        );
    }

    #[test]
    fn integer_bounds_narrow_the_type() {
        assert_eq!(
            ValueType::Integer(NumericType::UInt8),
            integer_type(json!({ "type": "integer", "minimum": 0, "maximum": 255 }))
        );
        assert_eq!(
            ValueType::Integer(NumericType::Int8),
            integer_type(json!({ "type": "integer", "minimum": -100, "maximum": 100 }))
        );
        assert_eq!(
            ValueType::Integer(NumericType::Int64),
            integer_type(json!({ "type": "integer" }))
        );
    }

    #[test]
    fn exclusive_bounds_are_tightened_by_one() {
        assert_eq!(
            ValueType::Integer(NumericType::UInt8),
            integer_type(json!({ "type": "integer", "exclusiveMinimum": -1, "exclusiveMaximum": 256 }))
        );
        assert_eq!(
            ValueType::Integer(NumericType::Int8),
            integer_type(json!({ "type": "integer", "exclusiveMinimum": -129, "maximum": 127 }))
        );
    }

    #[test]
    fn fractional_bounds_round_inward() {
        assert_eq!(
            ValueType::Integer(NumericType::UInt8),
            integer_type(json!({ "type": "integer", "minimum": -0.5, "maximum": 255.9 }))
        );
    }

    #[test]
    fn out_of_range_bounds_are_clamped() {
        assert_eq!(
            ValueType::Integer(NumericType::UInt64),
            integer_type(json!({ "type": "integer", "minimum": 0, "maximum": 1e30 }))
        );
        assert_eq!(
            ValueType::Integer(NumericType::Int64),
            integer_type(json!({ "type": "integer", "minimum": -1e30, "maximum": 10 }))
        );
    }

    #[test]
    fn numbers_are_doubles_unless_whole_multiple() {
        assert_eq!(ValueType::Double, integer_type(json!({ "type": "number", "minimum": 0 })));
        assert_eq!(
            ValueType::Double,
            integer_type(json!({ "type": "number", "multipleOf": 0.5 }))
        );
        assert_eq!(
            ValueType::Integer(NumericType::UInt16),
            integer_type(json!({ "type": "number", "multipleOf": 2, "minimum": 0, "maximum": 1000 }))
        );
    }

    #[test]
    fn malformed_bound_reports_its_path() {
        let schema: SchemaNode =
            SchemaNode::from_node(&Node::from(json!({ "type": "integer", "maximum": "ten" }))).unwrap();
        let mut scope: TypeScope = TypeScope::new("config");
        let error: ConfigSchemaGenError = resolve(&schema, "value", &mut scope, "/properties/value").unwrap_err();
        assert!(matches!(
            error,
            ConfigSchemaGenError::ResolutionError { ref path, .. } if path == "/properties/value/maximum"
        ));
    }

    #[test]
    fn strings_borrow_from_the_node() {
        let resolution: Resolution = resolve_json(json!({ "type": "string" }));
        assert!(resolution.value_type.borrows_source());
        assert_eq!("&str", resolution.value_type.rust_type("::rt"));
        assert_eq!("::rt::StringAdaptor", resolution.value_type.adaptor("::rt"));
        assert!(!resolve_json(json!({ "type": "boolean" })).value_type.borrows_source());
    }

    #[test]
    fn arrays_become_ranges_of_their_items() {
        let resolution: Resolution =
            resolve_json(json!({ "type": "array", "items": { "type": "array", "items": { "type": "integer", "minimum": 0, "maximum": 9 } } }));
        assert!(resolution.nested.is_none());
        assert_eq!(
            "::rt::Range<::rt::Range<::rt::UInt8Adaptor>>",
            resolution.value_type.rust_type("::rt")
        );
    }

    #[test]
    fn objects_generate_nested_types() {
        let resolution: Resolution = resolve_json(json!({
            "type": "object",
            "properties": { "b": { "type": "string" } }
        }));
        assert_eq!(ValueType::Generated("config::ValueClass".to_string()), resolution.value_type);
        let nested: GeneratedType = resolution.nested.unwrap();
        assert_eq!("ValueClass", nested.name);
        assert_eq!("value_class", nested.module);
    }

    #[test]
    fn array_items_objects_are_named_after_the_item() {
        let resolution: Resolution = resolve_json(json!({
            "type": "array",
            "items": { "type": "object", "properties": {} }
        }));
        assert_eq!(
            "::rt::Range<config::ValueItemClass>",
            resolution.value_type.rust_type("::rt")
        );
        assert_eq!("ValueItemClass", resolution.nested.unwrap().name);
    }

    #[test]
    fn missing_items_is_a_resolution_error() {
        let schema: SchemaNode = SchemaNode::from_node(&Node::from(json!({ "type": "array" }))).unwrap();
        let mut scope: TypeScope = TypeScope::new("config");
        let error: ConfigSchemaGenError = resolve(&schema, "list", &mut scope, "/properties/list").unwrap_err();
        assert_eq!(
            "/properties/list/items: required property \"items\" is absent",
            error.to_string()
        );
    }
}
