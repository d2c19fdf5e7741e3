//! `config_schema_to_rust!` runs the config-schema-rs generator at compile time.
//!
//! ```ignore
//! config_schema_rs_macro::config_schema_to_rust!(
//!     path = "schemas/service.json",
//!     name = "Service",
//!     embed = true,
//! );
//! ```
//!
//! Arguments are `key = value` pairs:
//!
//! - `schema = "..."`: inline schema text, or
//! - `path = "..."`: schema file relative to `CARGO_MANIFEST_DIR`
//! - `name = "..."`: generated type name (default `Config`)
//! - `runtime = "..."`: path to the runtime crate (default `::config_schema_runtime`)
//! - `embed = true`: also emit the validating `make_<name>` factory
//! - `deny_unknown_keywords = true`: reject keywords the generator does not know

use std::path::PathBuf;

use config_schema_rs::{GenerateSettings, generate_to_string};
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Ident, Lit, LitBool, LitStr, Token, parse_macro_input};

/// Where the schema text comes from.
enum SchemaSource {
    Inline(LitStr),
    File(LitStr),
}

impl SchemaSource {
    fn span(&self) -> Span {
        match self {
            Self::Inline(lit) | Self::File(lit) => lit.span(),
        }
    }
}

struct Argument {
    key: Ident,
    value: Lit,
}

impl Parse for Argument {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: Lit = input.parse()?;
        Ok(Self { key, value })
    }
}

struct MacroInput {
    source: SchemaSource,
    settings: GenerateSettings,
}

fn expect_str(argument: &Argument) -> syn::Result<LitStr> {
    match &argument.value {
        Lit::Str(lit) => Ok(lit.clone()),
        other => Err(syn::Error::new(
            other.span(),
            format!("`{}` expects a string literal", argument.key),
        )),
    }
}

fn expect_bool(argument: &Argument) -> syn::Result<bool> {
    match &argument.value {
        Lit::Bool(LitBool { value, .. }) => Ok(*value),
        other => Err(syn::Error::new(
            other.span(),
            format!("`{}` expects `true` or `false`", argument.key),
        )),
    }
}

impl Parse for MacroInput {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let arguments: Punctuated<Argument, Token![,]> =
            Punctuated::parse_terminated(input)?;

        let mut source: Option<SchemaSource> = None;
        let mut settings: GenerateSettings = GenerateSettings::default();
        let mut seen: Vec<String> = Vec::new();
        for argument in &arguments {
            let key: String = argument.key.to_string();
            if seen.contains(&key) {
                return Err(syn::Error::new(
                    argument.key.span(),
                    format!("duplicate argument `{key}`"),
                ));
            }
            match key.as_str() {
                "schema" | "path" => {
                    if source.is_some() {
                        return Err(syn::Error::new(
                            argument.key.span(),
                            "give either `schema` or `path`, not both",
                        ));
                    }
                    let lit: LitStr = expect_str(argument)?;
                    source = Some(if key == "schema" {
                        SchemaSource::Inline(lit)
                    } else {
                        SchemaSource::File(lit)
                    });
                }
                "name" => settings.class_name = expect_str(argument)?.value(),
                "runtime" => settings.runtime_path = expect_str(argument)?.value(),
                "embed" => settings.embed_schema = expect_bool(argument)?,
                "deny_unknown_keywords" => {
                    settings.deny_unknown_keywords = expect_bool(argument)?;
                }
                _ => {
                    return Err(syn::Error::new(
                        argument.key.span(),
                        format!(
                            "unknown argument `{key}`; expected one of schema, path, name, runtime, embed, deny_unknown_keywords"
                        ),
                    ));
                }
            }
            seen.push(key);
        }

        let source: SchemaSource = source.ok_or_else(|| {
            syn::Error::new(Span::call_site(), "missing `schema = \"...\"` or `path = \"...\"`")
        })?;
        Ok(Self { source, settings })
    }
}

fn expand(input: &MacroInput) -> syn::Result<proc_macro2::TokenStream> {
    let span: Span = input.source.span();
    let (schema_json, tracked_file): (String, Option<String>) = match &input.source {
        SchemaSource::Inline(lit) => (lit.value(), None),
        SchemaSource::File(lit) => {
            let manifest_dir: String = std::env::var("CARGO_MANIFEST_DIR")
                .map_err(|e| syn::Error::new(span, format!("CARGO_MANIFEST_DIR: {e}")))?;
            let file: PathBuf = PathBuf::from(manifest_dir).join(lit.value());
            let text: String = std::fs::read_to_string(&file).map_err(|e| {
                syn::Error::new(span, format!("cannot read {}: {e}", file.display()))
            })?;
            (text, Some(file.to_string_lossy().into_owned()))
        }
    };

    let code: String = generate_to_string(&schema_json, &input.settings)
        .map_err(|e| syn::Error::new(span, e.to_string()))?;
    let generated: proc_macro2::TokenStream = code
        .parse()
        .map_err(|e| syn::Error::new(span, format!("generated code does not tokenize: {e}")))?;

    // Rebuild when the schema file changes.
    let tracking: Option<proc_macro2::TokenStream> = tracked_file.map(|file| {
        quote! { const _: &[u8] = ::std::include_bytes!(#file); }
    });
    Ok(quote! {
        #generated
        #tracking
    })
}

/// Generates configuration accessor types from a JSON Schema at compile time.
///
/// Generation errors are reported as compile errors at the schema argument.
#[proc_macro]
pub fn config_schema_to_rust(input: TokenStream) -> TokenStream {
    let input: MacroInput = parse_macro_input!(input as MacroInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
