//! Binary to generate configuration accessors from a JSON Schema file.
//!
//! Usage: `configschemars schema.json -c Config -o config.rs`
//!
//! Writes the generated Rust to stdout unless `--output` is given. Logs go to
//! stderr and are controlled by `RUST_LOG`.

use std::io::{Write, stdout};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config_schema_rs::{
    ConfigSchemaGenError, DEFAULT_CLASS_NAME, DEFAULT_RUNTIME_PATH, GenerateSettings,
    generate_from_file, generate_to_string,
};

#[derive(Parser, Debug)]
#[command(name = "configschemars", version, about, long_about = None)]
struct Cli {
    /// Path to the JSON Schema file.
    schema: PathBuf,

    /// Name of the generated top-level type.
    #[arg(short = 'c', long = "config-class", default_value = DEFAULT_CLASS_NAME)]
    config_class: String,

    /// File to write the generated code to. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path through which generated code reaches the runtime crate.
    #[arg(short = 'd', long = "detail-namespace", default_value = DEFAULT_RUNTIME_PATH)]
    detail_namespace: String,

    /// Embed the schema and emit a validating `make_<class>` factory.
    #[arg(short, long)]
    embed_schema: bool,

    /// Fail on keywords the generator does not recognize instead of ignoring them.
    #[arg(long)]
    deny_unknown_keywords: bool,
}

fn run(cli: &Cli) -> Result<(), ConfigSchemaGenError> {
    let settings: GenerateSettings = GenerateSettings::default()
        .with_class_name(cli.config_class.as_str())
        .with_runtime_path(cli.detail_namespace.as_str())
        .with_embed_schema(cli.embed_schema)
        .with_deny_unknown_keywords(cli.deny_unknown_keywords);

    match &cli.output {
        Some(output) => generate_from_file(&cli.schema, output, &settings),
        None => {
            let schema_json: String = std::fs::read_to_string(&cli.schema)?;
            let code: String = generate_to_string(&schema_json, &settings)?;
            stdout().write_all(code.as_bytes())?;
            Ok(())
        }
    }
}

fn main() {
    let cli: Cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
