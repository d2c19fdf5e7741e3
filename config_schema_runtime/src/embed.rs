//! Schemas compiled into a generated module.

use std::sync::OnceLock;

use tracing::debug;

use crate::node::Node;
use crate::validate::{SchemaValidator, ValidationError};

/// A schema embedded as text, compiled on first use and shared for the rest
/// of the process.
///
/// Generated factories keep one of these in a `static`, so every call after
/// the first reuses the same validator.
#[derive(Debug)]
pub struct EmbeddedSchema {
    text: &'static str,
    validator: OnceLock<SchemaValidator>,
}

impl EmbeddedSchema {
    #[must_use]
    pub const fn new(text: &'static str) -> Self {
        Self {
            text,
            validator: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &'static str {
        self.text
    }

    /// The compiled validator, built on the first call.
    ///
    /// # Panics
    ///
    /// Panics if the embedded text is not a valid schema. The generator only
    /// embeds schemas it has already parsed, so this indicates a corrupted
    /// generated file.
    #[must_use]
    pub fn validator(&self) -> &SchemaValidator {
        self.validator.get_or_init(|| {
            debug!(bytes = self.text.len(), "compiling embedded schema");
            match SchemaValidator::from_text(self.text) {
                Ok(validator) => validator,
                Err(e) => panic!("embedded schema is invalid: {e}"),
            }
        })
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.validator.get().is_some()
    }

    /// Validates `node` and wraps it with `wrap` on success.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` reported for `node`; `wrap` is not
    /// called in that case.
    pub fn construct<T, F>(&self, node: &Node, wrap: F) -> Result<T, ValidationError>
    where
        F: FnOnce(Node) -> T,
    {
        self.validator().validate(node)?;
        Ok(wrap(node.clone()))
    }
}
