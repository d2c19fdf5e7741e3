use std::collections::BTreeSet;
use std::io::Write;

use heck::{ToSnakeCase, ToUpperCamelCase};
use tracing::{debug, info};

use config_schema_runtime::{AccessError, Node, PropertyAdaptor, Range, json_pointer};

use crate::error::ConfigSchemaGenError;
use crate::resolve::{self, Resolution, TypeScope, ValueType};
use crate::schema::{ObjectSchema, Root, SchemaNode};
use crate::settings::GenerateSettings;
use crate::validate;

/// Words that cannot be used as plain identifiers.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers either.
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Accessor names every generated type already defines.
const RESERVED_ACCESSORS: &[&str] = &["new", "node"];

/// A type to be emitted: one struct wrapping an object node.
#[derive(Debug)]
pub struct GeneratedType {
    pub name: String,
    /// Module holding the nested types; only emitted when `nested` is non-empty.
    pub module: String,
    pub description: Option<String>,
    pub properties: Vec<GeneratedProperty>,
    /// Types this one refers to, in first-use order.
    pub nested: Vec<GeneratedType>,
}

/// One accessor of a generated type.
#[derive(Debug)]
pub struct GeneratedProperty {
    pub accessor: String,
    /// Document key the accessor reads, unchanged from the schema.
    pub key: String,
    pub required: bool,
    pub value_type: ValueType,
    pub borrows_source: bool,
    pub description: Option<String>,
}

/// Names already declared in one scope. Claiming a taken name appends
/// `separator` and the next free number, starting from 2.
#[derive(Debug)]
pub struct NameScope {
    separator: &'static str,
    taken: BTreeSet<String>,
}

impl NameScope {
    #[must_use]
    pub fn new(separator: &'static str) -> Self {
        Self {
            separator,
            taken: BTreeSet::new(),
        }
    }

    fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Returns `base`, or `base` with a numeric suffix if it is already taken.
    pub fn claim(&mut self, base: &str) -> String {
        let mut candidate: String = base.to_string();
        let mut suffix: usize = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}{}{suffix}", self.separator);
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Turns a document key into a snake case identifier without keyword escaping.
/// Characters that cannot appear in an identifier become `_`.
fn identifier_base(key: &str) -> String {
    let mut ident: String = key
        .to_snake_case()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() {
        ident = "property".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Makes `ident` usable in generated code: keywords become raw identifiers,
/// or get a trailing `_` where Rust forbids that.
fn escape_keyword(ident: &str) -> String {
    if NON_RAW_KEYWORDS.contains(&ident) {
        format!("{ident}_")
    } else if RUST_KEYWORDS.contains(&ident) {
        format!("r#{ident}")
    } else {
        ident.to_string()
    }
}

/// Converts a user supplied name to an `UpperCamelCase` type name.
/// Names that already are valid identifiers are kept as written.
/// Returns `None` if nothing usable is left.
fn type_identifier(name: &str) -> Option<String> {
    let already_valid: bool = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_alphabetic());
    let mut ident: String = if already_valid {
        name.to_string()
    } else {
        name.to_upper_camel_case()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect()
    };
    if ident.is_empty() {
        return None;
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert_str(0, "Property");
    }
    Some(escape_keyword(&ident))
}

/// Type name for an object found under accessor `base`, e.g. `servers_item` -> `ServersItemClass`.
pub fn nested_type_name(base: &str) -> String {
    let name: String = format!("{}Class", base.to_upper_camel_case());
    type_identifier(&name).unwrap_or(name)
}

/// Module that holds the nested types of `type_name`.
pub fn module_name(type_name: &str) -> String {
    escape_keyword(&identifier_base(type_name))
}

/// Escape a string for use inside a Rust double-quoted string literal.
fn escape_string_literal(s: &str) -> String {
    let mut escaped: String = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            c if c.is_control() => escaped.push_str(&format!("\\u{{{:x}}}", u32::from(c))),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Replaces characters that may not appear inside a comment line.
fn comment_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn required_names(
    object: &ObjectSchema,
    path: &str,
) -> Result<BTreeSet<String>, ConfigSchemaGenError> {
    let required_path: String = json_pointer::format(path, "required");
    let to_error = |source: AccessError| ConfigSchemaGenError::ResolutionError {
        path: required_path.clone(),
        source,
    };
    let Some(names) = object.required().map_err(to_error)? else {
        return Ok(BTreeSet::new());
    };
    names
        .iter()
        .map(|name| name.map(str::to_string))
        .collect::<Result<BTreeSet<String>, AccessError>>()
        .map_err(to_error)
}

/// Builds the type for `object` and, recursively, every type it needs.
///
/// # Errors
///
/// Returns `ConfigSchemaGenError::ResolutionError` if any property schema
/// under `path` cannot be read.
pub fn build_type(
    object: &ObjectSchema,
    name: &str,
    module: &str,
    path: &str,
) -> Result<GeneratedType, ConfigSchemaGenError> {
    let required: BTreeSet<String> = required_names(object, path)?;
    let mut scope: TypeScope = TypeScope::new(module);
    let mut accessors: NameScope = NameScope::new("_");
    for reserved in RESERVED_ACCESSORS {
        accessors.reserve(reserved);
    }

    let properties_path: String = json_pointer::format(path, "properties");
    let mut properties: Vec<GeneratedProperty> = Vec::new();
    let mut nested: Vec<GeneratedType> = Vec::new();
    let entries: Range<PropertyAdaptor<SchemaNode>> = object.properties();
    for entry in &entries {
        let (key, schema) = entry.map_err(|source| ConfigSchemaGenError::ResolutionError {
            path: properties_path.clone(),
            source,
        })?;
        let property_path: String = json_pointer::format(&properties_path, key);
        let base: String = accessors.claim(&identifier_base(key));
        let Resolution {
            value_type,
            nested: nested_type,
        } = resolve::resolve(&schema, &base, &mut scope, &property_path)?;
        nested.extend(nested_type);

        let property: GeneratedProperty = GeneratedProperty {
            accessor: escape_keyword(&base),
            key: key.to_string(),
            required: required.contains(key),
            borrows_source: value_type.borrows_source(),
            value_type,
            description: schema.base().description().map(str::to_string),
        };
        debug!(
            type_name = name,
            key,
            accessor = %property.accessor,
            required = property.required,
            borrows_source = property.borrows_source,
            "resolved property"
        );
        properties.push(property);
    }

    debug!(
        type_name = name,
        properties = properties.len(),
        nested = nested.len(),
        "built type"
    );
    Ok(GeneratedType {
        name: name.to_string(),
        module: module.to_string(),
        description: object.base().description().map(str::to_string),
        properties,
        nested,
    })
}

/// Emit a doc comment from a description: each line becomes a `///` line.
/// `line_prefix` is prepended to each line.
fn emit_doc_comment<W: Write>(
    writer: &mut W,
    description: Option<&str>,
    line_prefix: &str,
) -> std::io::Result<()> {
    let Some(desc) = description else {
        return Ok(());
    };
    for line in desc.trim().lines() {
        let line: String = comment_line(line.trim_end());
        if line.is_empty() {
            writeln!(writer, "{line_prefix}///")?;
        } else {
            writeln!(writer, "{line_prefix}/// {line}")?;
        }
    }
    Ok(())
}

fn emit_accessor<W: Write>(
    property: &GeneratedProperty,
    runtime: &str,
    pad: &str,
    writer: &mut W,
) -> std::io::Result<()> {
    emit_doc_comment(writer, property.description.as_deref(), &format!("{pad}    "))?;
    let value_type: String = property.value_type.rust_type(runtime);
    let adaptor: String = property.value_type.adaptor(runtime);
    let (result_type, helper): (String, &str) = if property.required {
        (value_type, "required")
    } else {
        (format!("::std::option::Option<{value_type}>"), "optional")
    };
    writeln!(
        writer,
        "{pad}    pub fn {}(&self) -> ::std::result::Result<{result_type}, {runtime}::AccessError> {{",
        property.accessor
    )?;
    writeln!(
        writer,
        "{pad}        {runtime}::{helper}::<{adaptor}>(&self.node, \"{}\")",
        escape_string_literal(&property.key)
    )?;
    writeln!(writer, "{pad}    }}")?;
    Ok(())
}

/// Emit a type, preceded by the module holding its nested types.
fn emit_type<W: Write>(
    generated: &GeneratedType,
    runtime: &str,
    depth: usize,
    writer: &mut W,
) -> std::io::Result<()> {
    let pad: String = "    ".repeat(depth);
    if !generated.nested.is_empty() {
        writeln!(writer, "{pad}pub mod {} {{", generated.module)?;
        for (index, nested) in generated.nested.iter().enumerate() {
            if index > 0 {
                writeln!(writer)?;
            }
            emit_type(nested, runtime, depth + 1, writer)?;
        }
        writeln!(writer, "{pad}}}")?;
        writeln!(writer)?;
    }

    let name: &str = &generated.name;
    emit_doc_comment(writer, generated.description.as_deref(), &pad)?;
    writeln!(writer, "{pad}#[derive(Debug, Clone)]")?;
    writeln!(writer, "{pad}pub struct {name} {{")?;
    writeln!(writer, "{pad}    node: {runtime}::Node,")?;
    writeln!(writer, "{pad}}}")?;
    writeln!(writer)?;

    writeln!(writer, "{pad}impl {name} {{")?;
    writeln!(writer, "{pad}    #[must_use]")?;
    writeln!(writer, "{pad}    pub fn new(node: {runtime}::Node) -> Self {{")?;
    writeln!(writer, "{pad}        Self {{ node }}")?;
    writeln!(writer, "{pad}    }}")?;
    writeln!(writer)?;
    writeln!(writer, "{pad}    #[must_use]")?;
    writeln!(writer, "{pad}    pub fn node(&self) -> &{runtime}::Node {{")?;
    writeln!(writer, "{pad}        &self.node")?;
    writeln!(writer, "{pad}    }}")?;
    for property in &generated.properties {
        writeln!(writer)?;
        emit_accessor(property, runtime, &pad, writer)?;
    }
    writeln!(writer, "{pad}}}")?;
    writeln!(writer)?;

    writeln!(writer, "{pad}impl<'a> {runtime}::Adaptor<'a> for {name} {{")?;
    writeln!(writer, "{pad}    type Output = Self;")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{pad}    fn adapt(node: &'a {runtime}::Node) -> ::std::result::Result<Self, {runtime}::AccessError> {{"
    )?;
    writeln!(writer, "{pad}        {runtime}::object(node).map(Self::new)")?;
    writeln!(writer, "{pad}    }}")?;
    writeln!(writer, "{pad}}}")?;
    Ok(())
}

/// Emit the factory that validates a document against the embedded schema.
fn emit_factory<W: Write>(
    class_name: &str,
    schema: &Node,
    runtime: &str,
    writer: &mut W,
) -> std::io::Result<()> {
    let function: String = escape_keyword(&format!("make_{}", identifier_base(class_name)));
    let schema_text: String = escape_string_literal(&schema.to_compact_string());
    writeln!(
        writer,
        "/// Validates `node` against the embedded schema and wraps it as a [`{class_name}`]."
    )?;
    writeln!(
        writer,
        "pub fn {function}(node: &{runtime}::Node) -> ::std::result::Result<{class_name}, {runtime}::ValidationError> {{"
    )?;
    writeln!(
        writer,
        "    static SCHEMA: {runtime}::EmbeddedSchema = {runtime}::EmbeddedSchema::new(\"{schema_text}\");"
    )?;
    writeln!(writer, "    SCHEMA.construct(node, {class_name}::new)")?;
    writeln!(writer, "}}")?;
    Ok(())
}

fn count_types(generated: &GeneratedType) -> usize {
    1 + generated.nested.iter().map(count_types).sum::<usize>()
}

/// Generate accessor types from a JSON Schema string and write them to `writer`.
///
/// Nothing is written unless generation succeeds.
pub fn generate_to_writer<W: Write>(
    schema_json: &str,
    writer: &mut W,
    settings: &GenerateSettings,
) -> Result<(), ConfigSchemaGenError> {
    let document: Node = Node::parse(schema_json)?;
    validate::validate_schema(&document, settings.deny_unknown_keywords)?;
    let root: Root = Root::new(&document).map_err(|source| {
        ConfigSchemaGenError::ResolutionError {
            path: String::new(),
            source,
        }
    })?;

    let runtime: &str = settings.runtime_path.trim().trim_end_matches("::");
    if runtime.is_empty() {
        return Err("runtime path must not be empty".into());
    }
    let class_name: String = type_identifier(settings.class_name.trim()).ok_or_else(|| {
        format!(
            "class name \"{}\" contains no identifier characters",
            settings.class_name
        )
    })?;

    // Modules share the type namespace, so a lowercase class name must not
    // collide with its own module.
    let mut root_names: NameScope = NameScope::new("_");
    root_names.reserve(&class_name);
    let root_module: String = root_names.claim(&module_name(&class_name));
    let root_type: GeneratedType = build_type(root.object(), &class_name, &root_module, "")?;

    let mut output: Vec<u8> = Vec::new();
    writeln!(
        output,
        "// Generated by config-schema-rs. Do not edit manually."
    )?;
    if !root.id().is_empty() {
        writeln!(output, "// Schema: {}", comment_line(root.id()))?;
    }
    writeln!(output)?;
    emit_type(&root_type, runtime, 0, &mut output)?;
    if settings.embed_schema {
        writeln!(output)?;
        emit_factory(&class_name, &document, runtime, &mut output)?;
    }

    writer.write_all(&output)?;
    info!(
        class_name = %class_name,
        types = count_types(&root_type),
        embedded = settings.embed_schema,
        bytes = output.len(),
        "generated configuration accessors"
    );
    Ok(())
}
