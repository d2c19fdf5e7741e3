use std::error;
use std::fmt;

use config_schema_runtime::{AccessError, json_pointer};

/// Error type for configuration accessor generation.
#[derive(Debug)]
pub enum ConfigSchemaGenError {
    /// Generic error with a message.
    GenericError(String),

    /// I/O error (e.g., reading the schema file, writing the output file).
    IoError(std::io::Error),

    /// The schema text is not valid JSON.
    JsonError(serde_json::Error),

    /// The schema uses constructs the generator cannot express.
    InvalidSchema(SchemaValidationError),

    /// A schema node could not be read as the kind of schema it claims to be.
    ResolutionError { path: String, source: AccessError },
}

impl error::Error for ConfigSchemaGenError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::GenericError(_) => None,
            Self::IoError(io_error) => Some(io_error),
            Self::JsonError(json_error) => Some(json_error),
            Self::InvalidSchema(validation_error) => Some(validation_error),
            Self::ResolutionError { source, .. } => Some(source),
        }
    }
}

impl fmt::Display for ConfigSchemaGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenericError(message) => write!(f, "{message}"),
            Self::IoError(io_error) => fmt::Display::fmt(io_error, f),
            Self::JsonError(json_error) => write!(f, "schema is not valid JSON: {json_error}"),
            Self::InvalidSchema(validation_error) => fmt::Display::fmt(validation_error, f),
            Self::ResolutionError { path, source } => {
                write!(f, "{}: {source}", json_pointer::display(path))
            }
        }
    }
}

impl From<&str> for ConfigSchemaGenError {
    fn from(message: &str) -> Self {
        Self::GenericError(message.to_string())
    }
}

impl From<String> for ConfigSchemaGenError {
    fn from(message: String) -> Self {
        Self::GenericError(message)
    }
}

impl From<std::io::Error> for ConfigSchemaGenError {
    fn from(io_error: std::io::Error) -> Self {
        Self::IoError(io_error)
    }
}

impl From<serde_json::Error> for ConfigSchemaGenError {
    fn from(json_error: serde_json::Error) -> Self {
        Self::JsonError(json_error)
    }
}

impl From<SchemaValidationError> for ConfigSchemaGenError {
    fn from(validation_error: SchemaValidationError) -> Self {
        Self::InvalidSchema(validation_error)
    }
}

/// What is wrong at one location of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaIssueKind {
    RootNotObject,
    NotASchema,
    MissingType,
    InvalidTypeValue,
    TypeArrayNotSupported,
    NullTypeNotSupported,
    UnsupportedType(String),
    InvalidPropertiesFormat,
    InvalidRequiredFormat,
    RequiredPropertyNotInProperties(String),
    ArrayMissingItems,
    InvalidItemsFormat,
    InvalidNumericBound,
    InvalidAnnotation,
    UnsupportedKeyword(String),
    /// Only reported when unknown keywords are denied.
    UnknownKeyword(String),
}

impl fmt::Display for SchemaIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotObject => write!(f, "root schema must have type \"object\""),
            Self::NotASchema => write!(f, "schema must be a JSON object"),
            Self::MissingType => write!(f, "schema has no \"type\""),
            Self::InvalidTypeValue => write!(f, "\"type\" must be a string"),
            Self::TypeArrayNotSupported => write!(f, "\"type\" arrays are not supported"),
            Self::NullTypeNotSupported => write!(f, "type \"null\" is not supported"),
            Self::UnsupportedType(ty) => write!(f, "type \"{ty}\" is not supported"),
            Self::InvalidPropertiesFormat => write!(f, "\"properties\" must be an object"),
            Self::InvalidRequiredFormat => {
                write!(f, "\"required\" must be an array of strings")
            }
            Self::RequiredPropertyNotInProperties(name) => {
                write!(f, "required property \"{name}\" is not declared in \"properties\"")
            }
            Self::ArrayMissingItems => write!(f, "array schema has no \"items\""),
            Self::InvalidItemsFormat => {
                write!(f, "\"items\" must be a single schema object (tuple arrays are not supported)")
            }
            Self::InvalidNumericBound => write!(f, "numeric constraint must be a number"),
            Self::InvalidAnnotation => write!(f, "annotation must be a string"),
            Self::UnsupportedKeyword(keyword) => {
                write!(f, "keyword \"{keyword}\" is not supported")
            }
            Self::UnknownKeyword(keyword) => write!(f, "unknown keyword \"{keyword}\""),
        }
    }
}

/// A single problem found while checking a schema, located by JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub path: String,
    pub kind: SchemaIssueKind,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", json_pointer::display(&self.path), self.kind)
    }
}

/// Every issue found in a schema; generation does not start while any remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    pub issues: Vec<SchemaIssue>,
}

impl error::Error for SchemaValidationError {}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema cannot be generated ({} issue", self.issues.len())?;
        if self.issues.len() != 1 {
            write!(f, "s")?;
        }
        write!(f, ")")?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}
