//! UI Schema CLI
//!
//! Command-line interface for generating, merging and cleaning UI schemas.

use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use ui_schema::{
    allowed_widgets, clean, export_document, generate, import_document, load_document_auto,
    parse_path, path, resolve_refs, FieldType, GenerationOptions, ImportOptions, RefMode,
};

#[derive(Parser)]
#[command(name = "ui-schema")]
#[command(about = "Generate and maintain UI schemas for JSON Schema forms")]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a UI schema from a JSON Schema
    Generate {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        #[command(flatten)]
        generation: GenerationArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Inline $ref pointers in a JSON Schema
    Resolve {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Follow every local JSON pointer, not only #/definitions/<name>
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Merge a {schema, ui-schema} document with a freshly generated UI schema
    Import {
        /// Document source: file path or URL (http:// or https://)
        document: String,

        #[command(flatten)]
        generation: GenerationArgs,

        /// Print only the cleaned UI schema a form renderer needs
        #[arg(long)]
        render: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Strip bookkeeping and empty settings from a UI schema
    Clean {
        /// UI schema source: file path or URL (http:// or https://)
        ui_schema: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write or delete one value in a UI schema
    Set {
        /// UI schema source: file path or URL (http:// or https://)
        ui_schema: String,

        /// Target path, e.g. /address/ui:widget or address/street/ui:title
        #[arg(long)]
        path: String,

        /// JSON value to write
        #[arg(long, conflicts_with = "delete", required_unless_present = "delete")]
        value: Option<String>,

        /// Delete the value at the path
        #[arg(long)]
        delete: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the widgets allowed for a field type
    Widgets {
        /// Field type (string, number, bool, enum, array, anyOf, allOf, oneOf, object, unknown)
        field_type: String,

        /// Output as a JSON list
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct GenerationArgs {
    /// Generation options file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write derived settings under ui:options instead of ui:<key>
    #[arg(long)]
    wrap_options: bool,

    /// Default widget for a type or string format, e.g. string=textarea (repeatable)
    #[arg(long = "widget", value_name = "KEY=WIDGET", value_parser = parse_widget)]
    widgets: Vec<(String, String)>,

    /// Emit ui:globalOptions.copyable on the root node
    #[arg(long)]
    copyable: bool,

    /// Value for ui:rootFieldId
    #[arg(long)]
    root_field_id: Option<String>,

    /// Inline every $ref, not only #/definitions/<name>
    #[arg(long)]
    all_refs: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (stdout if not specified)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            schema,
            generation,
            output,
        } => run_generate(&schema, &generation, &output),

        Commands::Resolve {
            schema,
            all,
            output,
        } => run_resolve(&schema, all, &output),

        Commands::Import {
            document,
            generation,
            render,
            output,
        } => run_import(&document, &generation, render, &output),

        Commands::Clean { ui_schema, output } => run_clean(&ui_schema, &output),

        Commands::Set {
            ui_schema,
            path: target,
            value,
            delete: _,
            output,
        } => run_set(&ui_schema, &target, value.as_deref(), &output),

        Commands::Widgets { field_type, json } => run_widgets(&field_type, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn parse_widget(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, widget)) if !key.is_empty() && !widget.is_empty() => {
            Ok((key.to_string(), widget.to_string()))
        }
        _ => Err(format!("expected KEY=WIDGET, got \"{}\"", s)),
    }
}

/// Print an error and hand back its exit code.
fn fail(err: impl Display, code: i32) -> u8 {
    eprintln!("Error: {}", err);
    u8::try_from(code).unwrap_or(1)
}

fn import_options(args: &GenerationArgs) -> Result<ImportOptions, u8> {
    let mut generation = match &args.config {
        Some(file) => GenerationOptions::from_file(file).map_err(|e| fail(&e, e.exit_code()))?,
        None => GenerationOptions::default(),
    };

    // Flags override the options file
    if args.wrap_options {
        generation = generation.wrapped(true);
    }
    for (key, widget) in &args.widgets {
        generation = generation.widget(key, widget);
    }
    if args.copyable {
        generation = generation.copyable(true);
    }
    if let Some(id) = &args.root_field_id {
        generation = generation.root_field_id(id);
    }

    let refs = if args.all_refs {
        RefMode::All
    } else {
        RefMode::Definitions
    };
    Ok(ImportOptions::new(generation).refs(refs))
}

fn load(source: &str) -> Result<Value, u8> {
    load_document_auto(source).map_err(|e| fail(&e, e.exit_code()))
}

fn run_generate(schema_source: &str, args: &GenerationArgs, output: &OutputArgs) -> Result<(), u8> {
    let options = import_options(args)?;
    let schema = load(schema_source)?;
    let resolved = resolve_refs(&schema, options.refs).map_err(|e| fail(&e, e.exit_code()))?;
    write_output(&generate(&resolved, &options.generation), output)
}

fn run_resolve(schema_source: &str, all: bool, output: &OutputArgs) -> Result<(), u8> {
    let schema = load(schema_source)?;
    let mode = if all { RefMode::All } else { RefMode::Definitions };
    let resolved = resolve_refs(&schema, mode).map_err(|e| fail(&e, e.exit_code()))?;
    write_output(&resolved, output)
}

fn run_import(source: &str, args: &GenerationArgs, render: bool, output: &OutputArgs) -> Result<(), u8> {
    let options = import_options(args)?;
    let document = load(source)?;
    let imported = import_document(&document, &options).map_err(|e| fail(&e, e.exit_code()))?;

    let result = if render {
        clean(&imported.ui_schema)
    } else {
        export_document(&imported.schema, &imported.ui_schema)
    };
    write_output(&result, output)
}

fn run_clean(source: &str, output: &OutputArgs) -> Result<(), u8> {
    let ui = load(source)?;
    write_output(&clean(&ui), output)
}

fn run_set(source: &str, target: &str, value: Option<&str>, output: &OutputArgs) -> Result<(), u8> {
    let ui = load(source)?;
    let value = value
        .map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| fail(format!("invalid --value: {}", e), 2))?;
    write_output(&path::set(&ui, &parse_path(target), value), output)
}

fn run_widgets(name: &str, json_output: bool) -> Result<(), u8> {
    let field_type = FieldType::parse(name).ok_or_else(|| fail(format!("unknown field type: {}", name), 2))?;
    let widgets = allowed_widgets(field_type);

    if json_output {
        println!("{}", serde_json::json!(widgets));
    } else {
        for widget in widgets {
            println!("{}", widget);
        }
    }
    Ok(())
}

fn write_output(value: &Value, output: &OutputArgs) -> Result<(), u8> {
    let json_output = if output.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| fail(format!("serializing output: {}", e), 2))?;

    match &output.output {
        Some(file) => {
            std::fs::write(file, &json_output)
                .map_err(|e| fail(format!("writing to {}: {}", file.display(), e), 3))?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}
