//! Document validation against a compiled JSON Schema.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::json_pointer;
use crate::node::Node;

/// The schema text could not be turned into a validator.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema could not be compiled: {0}")]
    Invalid(String),
}

/// A document failed validation.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", json_pointer::display(.instance_path))]
pub struct ValidationError {
    /// Human readable description of the violated constraint.
    pub message: String,
    /// JSON Pointer to the offending value inside the document.
    pub instance_path: String,
    /// Handle to the offending value, when it could be located.
    pub node: Option<Node>,
}

impl ValidationError {
    fn from_jsonschema(error: &jsonschema::ValidationError<'_>, document: &Node) -> Self {
        let instance_path: String = error.instance_path.to_string();
        let node: Option<Node> = document.pointer(&instance_path).cloned();
        Self {
            message: error.to_string(),
            instance_path,
            node,
        }
    }
}

/// Compiled schema ready to check documents.
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compiles the schema held by `schema`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError::Invalid` if the schema itself is malformed.
    pub fn new(schema: &Node) -> Result<Self, SchemaLoadError> {
        let value: Value = schema.to_value();
        let validator: jsonschema::Validator = jsonschema::options()
            .build(&value)
            .map_err(|e| SchemaLoadError::Invalid(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Parses and compiles schema text.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError::Parse` for malformed JSON and
    /// `SchemaLoadError::Invalid` for a malformed schema.
    pub fn from_text(text: &str) -> Result<Self, SchemaLoadError> {
        let schema: Node = Node::parse(text)?;
        Self::new(&schema)
    }

    /// Checks `document`, reporting the first violation found.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` describing the first violation.
    pub fn validate(&self, document: &Node) -> Result<(), ValidationError> {
        let instance: Value = document.to_value();
        match self.validator.iter_errors(&instance).next() {
            Some(error) => Err(ValidationError::from_jsonschema(&error, document)),
            None => Ok(()),
        }
    }

    /// Every violation in `document`, in the order the validator reports them.
    #[must_use]
    pub fn errors(&self, document: &Node) -> Vec<ValidationError> {
        let instance: Value = document.to_value();
        self.validator
            .iter_errors(&instance)
            .map(|error| ValidationError::from_jsonschema(&error, document))
            .collect()
    }

    #[must_use]
    pub fn is_valid(&self, document: &Node) -> bool {
        self.validator.is_valid(&document.to_value())
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}
