//! Generate typed configuration accessors from JSON Schema.
//!
//! The generated code does not deserialize a document into owned structs.
//! Each generated type wraps a shared [`config_schema_runtime::Node`] and reads
//! its properties on demand, so a configuration can be queried without
//! copying it. Integer properties get the narrowest Rust type their bounds
//! allow, arrays become lazy ranges, and with
//! [`GenerateSettings::embed_schema`] a factory validates documents against
//! the schema before wrapping them.
//!
//! ```
//! use config_schema_rs::{GenerateSettings, generate_to_string};
//!
//! let schema: &str = r#"{
//!     "type": "object",
//!     "required": ["port"],
//!     "properties": { "port": { "type": "integer", "minimum": 1, "maximum": 65535 } }
//! }"#;
//! let code: String = generate_to_string(schema, &GenerateSettings::default()).unwrap();
//! assert!(code.contains("pub fn port(&self)"));
//! assert!(code.contains("UInt16Adaptor"));
//! ```

mod codegen;
mod error;
mod resolve;
pub mod schema;
mod settings;
mod validate;

pub use error::{ConfigSchemaGenError, SchemaIssue, SchemaIssueKind, SchemaValidationError};
pub use settings::{DEFAULT_CLASS_NAME, DEFAULT_RUNTIME_PATH, GenerateSettings};

use std::io::Write;
use std::path::Path;

use tracing::debug;

/// Generate accessor types from a JSON Schema string and write them to `writer`.
///
/// The writer can be any type implementing `Write`, such as `File`, `Vec<u8>`, or
/// `Stdout`. Output is rendered in memory first, so nothing reaches the writer
/// when generation fails.
///
/// # Errors
///
/// Returns `ConfigSchemaGenError` if the schema is not valid JSON, uses a
/// construct the generator cannot express, or writing to the writer fails.
pub fn generate_to_writer<W: Write>(
    schema_json: &str,
    writer: &mut W,
    settings: &GenerateSettings,
) -> Result<(), ConfigSchemaGenError> {
    codegen::generate_to_writer(schema_json, writer, settings)
}

/// Generate accessor types from a JSON Schema string and return the Rust source.
///
/// # Errors
///
/// Returns `ConfigSchemaGenError` under the same conditions as [`generate_to_writer`].
pub fn generate_to_string(
    schema_json: &str,
    settings: &GenerateSettings,
) -> Result<String, ConfigSchemaGenError> {
    let mut output: Vec<u8> = Vec::new();
    generate_to_writer(schema_json, &mut output, settings)?;
    String::from_utf8(output).map_err(|e| ConfigSchemaGenError::from(e.to_string()))
}

/// Generate accessor types from a JSON Schema file and write them to an output file.
///
/// The output file is only created once generation has succeeded.
///
/// # Errors
///
/// Returns `ConfigSchemaGenError` if reading the input file fails, generation
/// fails, or writing the output file fails.
pub fn generate_from_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    settings: &GenerateSettings,
) -> Result<(), ConfigSchemaGenError> {
    let input_path: &Path = input_path.as_ref();
    debug!(input = %input_path.display(), "reading schema");
    let schema_json: String = std::fs::read_to_string(input_path)?;
    let code: String = generate_to_string(&schema_json, settings)?;
    std::fs::write(output_path, code)?;
    Ok(())
}
