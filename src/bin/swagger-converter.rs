//! Swagger Converter CLI
//!
//! Command-line interface for converting Swagger 1.x documents to Swagger 2.0.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use serde_json::Value;
use swagger_converter::{
    convert_source, list_api_declarations, load_document, load_document_auto, source_url,
    validate_document, ConvertOptions, ValidateError,
};

#[derive(Parser)]
#[command(name = "swagger-converter")]
#[command(about = "Convert Swagger 1.x resource listings into Swagger 2.0 documents")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a resource listing and its API declarations
    Convert {
        /// Resource listing: file path or URL (http:// or https://)
        source: String,

        /// Output file (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// collectionFormat for parameters that allow multiple values (e.g. csv, multi)
        #[arg(long)]
        collection_format: Option<String>,

        /// Name tags after listing paths instead of resourcePath
        #[arg(long)]
        tags_from_paths: bool,

        /// Validate the result against this Swagger 2.0 meta-schema before writing
        #[arg(long, value_name = "META_SCHEMA")]
        validate_against: Option<String>,
    },

    /// List the API declaration URLs a resource listing references
    List {
        /// Resource listing: file path or URL (http:// or https://)
        source: String,
    },

    /// Validate a Swagger 2.0 document against a meta-schema
    Validate {
        /// Document to validate
        document: PathBuf,

        /// Meta-schema: file path or URL (http:// or https://)
        #[arg(long)]
        schema: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = Env::default().filter_or("RUST_LOG", if cli.verbose { "debug" } else { "warn" });
    env_logger::init_from_env(env);

    let result = match cli.command {
        Commands::Convert {
            source,
            output,
            pretty,
            collection_format,
            tags_from_paths,
            validate_against,
        } => {
            let mut options = ConvertOptions::new().build_tags_from_paths(tags_from_paths);
            if let Some(format) = collection_format {
                options = options.collection_format(format);
            }
            run_convert(&source, &options, output, pretty, validate_against.as_deref())
        }

        Commands::List { source } => run_list(&source),

        Commands::Validate {
            document,
            schema,
            json,
        } => run_validate(&document, &schema, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_convert(
    source: &str,
    options: &ConvertOptions,
    output: Option<PathBuf>,
    pretty: bool,
    validate_against: Option<&str>,
) -> Result<(), u8> {
    let document = convert_source(source, options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if let Some(meta_source) = validate_against {
        let meta_schema = load_document_auto(meta_source).map_err(|e| {
            eprintln!("Error loading meta-schema: {}", e);
            e.exit_code() as u8
        })?;
        match validate_document(&document, &meta_schema) {
            Ok(()) => debug!("converted document is valid against {}", meta_source),
            Err(ValidateError::Invalid { errors }) => {
                eprintln!("Converted document failed validation:");
                for error in errors {
                    eprintln!("  {}", error);
                }
                return Err(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(e.exit_code() as u8);
            }
        }
    }

    let json_output = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_list(source: &str) -> Result<(), u8> {
    let base = source_url(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let listing = load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let locations = list_api_declarations(&base, &listing).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let output: serde_json::Map<String, Value> = locations
        .into_iter()
        .map(|(path, url)| (path, Value::String(url.into())))
        .collect();
    let json_output = serde_json::to_string_pretty(&output).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", json_output);
    Ok(())
}

fn run_validate(document_path: &Path, schema_source: &str, json_output: bool) -> Result<(), u8> {
    let document: Value = load_document(document_path).map_err(|e| {
        report_error(json_output, &format!("loading document: {}", e));
        e.exit_code() as u8
    })?;

    let meta_schema = load_document_auto(schema_source).map_err(|e| {
        report_error(json_output, &format!("loading meta-schema: {}", e));
        e.exit_code() as u8
    })?;

    match validate_document(&document, &meta_schema) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
