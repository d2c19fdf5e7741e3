//! Structural checks run before generation.
//!
//! Walks the schema document and collects every construct the generator
//! cannot turn into accessors, so a bad schema is reported in one pass
//! instead of failing on the first problem.

use config_schema_runtime::{
    IterMode, Node, NodeAdaptor, PropertyAdaptor, Range, TagTable, Tagged, json_pointer,
};
use tracing::warn;

use crate::error::{SchemaIssue, SchemaIssueKind, SchemaValidationError};
use crate::schema::SchemaKind;

/// Keywords that only constrain values. They are kept in the embedded
/// schema and enforced by validation, but do not change generated code.
const VALIDATION_KEYWORDS: &[&str] = &[
    "$comment",
    "enum",
    "const",
    "default",
    "examples",
    "format",
    "pattern",
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
    "additionalProperties",
    "propertyNames",
    "dependentRequired",
    "readOnly",
    "writeOnly",
    "deprecated",
    "contentEncoding",
    "contentMediaType",
];

/// Keywords whose meaning the generated accessors cannot express.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$ref",
    "$defs",
    "definitions",
    "$anchor",
    "$dynamicRef",
    "$recursiveRef",
    "oneOf",
    "anyOf",
    "allOf",
    "not",
    "if",
    "then",
    "else",
    "patternProperties",
    "prefixItems",
    "additionalItems",
    "contains",
    "dependentSchemas",
    "dependencies",
    "unevaluatedProperties",
    "unevaluatedItems",
];

const NUMERIC_KEYWORDS: &[&str] = &[
    "minimum",
    "exclusiveMinimum",
    "maximum",
    "exclusiveMaximum",
    "multipleOf",
];

const ANNOTATION_KEYWORDS: &[&str] = &["$schema", "$id", "title", "description"];

/// Checks that `document` is an object schema built only from constructs
/// the generator supports. Returns every issue found.
pub fn validate_schema(
    document: &Node,
    deny_unknown_keywords: bool,
) -> Result<(), SchemaValidationError> {
    let mut walker: Walker = Walker {
        issues: Vec::new(),
        deny_unknown_keywords,
    };

    if document.is_object() {
        // Missing or malformed types are reported by the walk.
        let root_type: Option<&str> = document.get("type").and_then(Node::as_str);
        if root_type.is_some_and(|ty| ty != "object") {
            walker.push("", SchemaIssueKind::RootNotObject);
        }
        walker.walk(document, "");
    } else {
        walker.push("", SchemaIssueKind::RootNotObject);
    }

    if walker.issues.is_empty() {
        Ok(())
    } else {
        Err(SchemaValidationError {
            issues: walker.issues,
        })
    }
}

struct Walker {
    issues: Vec<SchemaIssue>,
    deny_unknown_keywords: bool,
}

impl Walker {
    fn push(&mut self, path: &str, kind: SchemaIssueKind) {
        self.issues.push(SchemaIssue {
            path: path.to_string(),
            kind,
        });
    }

    fn walk(&mut self, schema: &Node, path: &str) {
        if !schema.is_object() {
            self.push(path, SchemaIssueKind::NotASchema);
            return;
        }

        match schema.get("type") {
            None => self.push(path, SchemaIssueKind::MissingType),
            Some(ty) => self.check_type(ty, &json_pointer::format(path, "type")),
        }

        let is_array: bool = schema.get("type").and_then(Node::as_str) == Some("array");
        if is_array && !schema.contains_key("items") {
            self.push(path, SchemaIssueKind::ArrayMissingItems);
        }

        let fields: Range<PropertyAdaptor<NodeAdaptor>> = entries(schema);
        for (key, value) in fields.iter().flatten() {
            let key_path: String = json_pointer::format(path, key);
            match key {
                "type" => {}
                "properties" => self.check_properties(value, &key_path),
                "required" => self.check_required(value, schema, &key_path),
                "items" => {
                    if value.is_object() {
                        self.walk(value, &key_path);
                    } else {
                        self.push(&key_path, SchemaIssueKind::InvalidItemsFormat);
                    }
                }
                _ if NUMERIC_KEYWORDS.contains(&key) => {
                    if value.as_f64().is_none() {
                        self.push(&key_path, SchemaIssueKind::InvalidNumericBound);
                    }
                }
                _ if ANNOTATION_KEYWORDS.contains(&key) => {
                    if value.as_str().is_none() {
                        self.push(&key_path, SchemaIssueKind::InvalidAnnotation);
                    }
                }
                _ if VALIDATION_KEYWORDS.contains(&key) => {}
                _ if UNSUPPORTED_KEYWORDS.contains(&key) => {
                    self.push(&key_path, SchemaIssueKind::UnsupportedKeyword(key.to_string()));
                }
                _ if self.deny_unknown_keywords => {
                    self.push(&key_path, SchemaIssueKind::UnknownKeyword(key.to_string()));
                }
                _ => warn!(
                    path = json_pointer::display(&key_path),
                    keyword = key,
                    "ignoring unknown keyword"
                ),
            }
        }
    }

    fn check_type(&mut self, ty: &Node, path: &str) {
        if ty.is_array() {
            self.push(path, SchemaIssueKind::TypeArrayNotSupported);
            return;
        }
        let table: TagTable<SchemaKind> = SchemaKind::TABLE;
        match ty.as_str() {
            None => self.push(path, SchemaIssueKind::InvalidTypeValue),
            Some("null") => self.push(path, SchemaIssueKind::NullTypeNotSupported),
            Some(name) if table.lookup(name).is_none() => {
                self.push(path, SchemaIssueKind::UnsupportedType(name.to_string()));
            }
            Some(_) => {}
        }
    }

    fn check_properties(&mut self, properties: &Node, path: &str) {
        if !properties.is_object() {
            self.push(path, SchemaIssueKind::InvalidPropertiesFormat);
            return;
        }
        let declared: Range<PropertyAdaptor<NodeAdaptor>> = entries(properties);
        for (name, property) in declared.iter().flatten() {
            self.walk(property, &json_pointer::format(path, name));
        }
    }

    fn check_required(&mut self, required: &Node, schema: &Node, path: &str) {
        if !required.is_array() {
            self.push(path, SchemaIssueKind::InvalidRequiredFormat);
            return;
        }
        let declared: Option<&Node> = schema.get("properties").filter(|p| p.is_object());
        let names: Range<NodeAdaptor> = Range::new(required.clone(), IterMode::Arrays);
        for (index, name) in names.iter().flatten().enumerate() {
            let name_path: String = json_pointer::format(path, &index.to_string());
            match name.as_str() {
                None => self.push(&name_path, SchemaIssueKind::InvalidRequiredFormat),
                Some(name) if !declared.is_some_and(|p| p.contains_key(name)) => {
                    self.push(
                        &name_path,
                        SchemaIssueKind::RequiredPropertyNotInProperties(name.to_string()),
                    );
                }
                Some(_) => {}
            }
        }
    }
}

fn entries(node: &Node) -> Range<PropertyAdaptor<NodeAdaptor>> {
    Range::new(node.clone(), IterMode::Objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues(schema: serde_json::Value) -> Vec<SchemaIssue> {
        validate_schema(&Node::from(schema), false)
            .err()
            .map(|error| error.issues)
            .unwrap_or_default()
    }

    fn issue(path: &str, kind: SchemaIssueKind) -> SchemaIssue {
        SchemaIssue {
            path: path.to_string(),
            kind,
        }
    }

    #[test]
    fn valid_schema_passes() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "title": "Service",
            "type": "object",
            "required": ["host"],
            "properties": {
                "host": { "type": "string", "minLength": 1 },
                "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                "ratio": { "type": "number", "exclusiveMaximum": 1.0 },
                "tags": { "type": "array", "items": { "type": "string" }, "maxItems": 4 },
                "inner": { "type": "object", "properties": {} }
            },
            "additionalProperties": false
        });
        assert!(issues(schema).is_empty());
    }

    #[test]
    fn root_must_be_an_object_schema() {
        assert_eq!(vec![issue("", SchemaIssueKind::RootNotObject)], issues(json!("string")));
        assert_eq!(
            vec![issue("", SchemaIssueKind::RootNotObject)],
            issues(json!({ "type": "string" }))
        );
        assert_eq!(vec![issue("", SchemaIssueKind::MissingType)], issues(json!({})));
    }

    #[test]
    fn type_forms_are_checked() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": ["string", "null"] },
                "b": { "type": "null" },
                "c": { "type": "date" },
                "d": { "type": 7 },
                "e": {}
            }
        });
        assert_eq!(
            vec![
                issue("/properties/a/type", SchemaIssueKind::TypeArrayNotSupported),
                issue("/properties/b/type", SchemaIssueKind::NullTypeNotSupported),
                issue(
                    "/properties/c/type",
                    SchemaIssueKind::UnsupportedType("date".to_string())
                ),
                issue("/properties/d/type", SchemaIssueKind::InvalidTypeValue),
                issue("/properties/e", SchemaIssueKind::MissingType),
            ],
            issues(schema)
        );
    }

    #[test]
    fn unsupported_keywords_are_collected_everywhere() {
        let schema = json!({
            "type": "object",
            "$ref": "#/$defs/Foo",
            "properties": {
                "a": { "type": "string", "oneOf": [] },
                "b": { "type": "array", "items": { "type": "object", "allOf": [] } }
            }
        });
        assert_eq!(
            vec![
                issue("/$ref", SchemaIssueKind::UnsupportedKeyword("$ref".to_string())),
                issue(
                    "/properties/a/oneOf",
                    SchemaIssueKind::UnsupportedKeyword("oneOf".to_string())
                ),
                issue(
                    "/properties/b/items/allOf",
                    SchemaIssueKind::UnsupportedKeyword("allOf".to_string())
                ),
            ],
            issues(schema)
        );
    }

    #[test]
    fn required_names_must_be_declared_strings() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a", "b", 3]
        });
        assert_eq!(
            vec![
                issue(
                    "/required/1",
                    SchemaIssueKind::RequiredPropertyNotInProperties("b".to_string())
                ),
                issue("/required/2", SchemaIssueKind::InvalidRequiredFormat),
            ],
            issues(schema)
        );
        assert_eq!(
            vec![issue("/required", SchemaIssueKind::InvalidRequiredFormat)],
            issues(json!({ "type": "object", "required": "a" }))
        );
    }

    #[test]
    fn arrays_need_a_single_items_schema() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "array" },
                "b": { "type": "array", "items": [{ "type": "string" }] }
            }
        });
        assert_eq!(
            vec![
                issue("/properties/a", SchemaIssueKind::ArrayMissingItems),
                issue("/properties/b/items", SchemaIssueKind::InvalidItemsFormat),
            ],
            issues(schema)
        );
    }

    #[test]
    fn malformed_values_are_reported() {
        let schema = json!({
            "type": "object",
            "title": 5,
            "properties": {
                "a": { "type": "integer", "minimum": "0" },
                "b": 3,
                "c/d": { "type": "string", "description": ["x"] }
            }
        });
        assert_eq!(
            vec![
                issue("/title", SchemaIssueKind::InvalidAnnotation),
                issue("/properties/a/minimum", SchemaIssueKind::InvalidNumericBound),
                issue("/properties/b", SchemaIssueKind::NotASchema),
                issue("/properties/c~1d/description", SchemaIssueKind::InvalidAnnotation),
            ],
            issues(schema)
        );
        assert_eq!(
            vec![issue("/properties", SchemaIssueKind::InvalidPropertiesFormat)],
            issues(json!({ "type": "object", "properties": [] }))
        );
    }

    #[test]
    fn unknown_keywords_fail_only_when_denied() {
        let schema = json!({
            "type": "object",
            "x-owner": "platform",
            "properties": {}
        });
        assert!(validate_schema(&Node::from(schema.clone()), false).is_ok());
        let error: SchemaValidationError =
            validate_schema(&Node::from(schema), true).unwrap_err();
        assert_eq!(
            vec![issue("/x-owner", SchemaIssueKind::UnknownKeyword("x-owner".to_string()))],
            error.issues
        );
    }
}
