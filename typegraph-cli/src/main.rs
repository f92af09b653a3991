use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use typegraph::config::{load_config, GeneratorConfig, DEFAULT_CONFIG_FILE};
use typegraph::validation::{check, DiagnosticReport};
use typegraph::{ancestry_of, load_schema_from_config, reformat, Schema, TypeGraphError};
use typegraph_codegen::{generate, write_files, EmitOptions, Target};

/// typegraph CLI: check, inspect and generate code from type hierarchies
#[derive(Parser)]
#[command(name = "typegraph", version, about)]
struct Cli {
    /// Config file (default: ./typegraph.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Entity hierarchy root, overriding the config
    #[arg(long)]
    entities: Option<PathBuf>,

    /// Predicate hierarchy root, overriding the config
    #[arg(long)]
    predicates: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run every integrity check and print the findings by category
    Check {
        /// Fail on warnings as well as errors
        #[arg(long)]
        deny_warnings: bool,
    },

    /// List the resolved fields of an entity, inherited ones first
    Fields {
        /// Entity name
        entity: String,
    },

    /// Show a node (entities are searched before predicates)
    Show {
        /// Node name
        name: String,
    },

    /// Expand a slash-separated path into its ancestry
    Ancestry {
        /// Path, e.g. Item/Person/Student
        path: String,
    },

    /// Write generated artifacts
    Generate {
        /// Emitters to run (rust, json, pod-db, python, explorer, swift, typescript)
        #[arg(long = "target", required = true, num_args = 1.., value_parser = Target::from_str)]
        targets: Vec<Target>,
        /// Output directory (default: output_dir from the config)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Rewrite every node as a single JSON file
    Reformat {
        /// Show the files that would be written without writing them
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Check { deny_warnings } => {
            let schema = load_schema_from_config(&config)?;
            let report = check(&schema, &config.check_options());
            print_output(&report_value(&report), &cli.format)?;

            let errors = report.errors().count();
            let warnings = report.warnings().count();
            if errors > 0 || (deny_warnings && warnings > 0) {
                return Err(format!("check failed: {errors} errors, {warnings} warnings").into());
            }
        }

        Command::Fields { entity } => {
            let schema = load_schema_from_config(&config)?;
            let fields = schema
                .resolved_field_names(&entity)
                .ok_or_else(|| TypeGraphError::UnknownNode(entity.clone()))?;
            print_output(&fields, &cli.format)?;
        }

        Command::Show { name } => {
            let schema = load_schema_from_config(&config)?;
            print_output(&show_value(&schema, &name)?, &cli.format)?;
        }

        Command::Ancestry { path } => {
            let ancestry = ancestry_of(&path)?;
            print_output(&ancestry, &cli.format)?;
        }

        Command::Generate { targets, out } => {
            let schema = load_schema_from_config(&config)?;
            let out_dir = out.unwrap_or_else(|| config.output_dir.clone());
            let options = EmitOptions::from_config(&config);

            let mut written = Vec::new();
            for target in targets {
                let files = generate(&schema, &options, target)?;
                written.extend(write_files(&out_dir, &files)?);
            }
            print_output(&serde_json::json!({ "ok": true, "written": written }), &cli.format)?;
        }

        Command::Reformat { dry_run } => {
            let schema = load_schema_from_config(&config)?;
            let rewrites = reformat::plan(&schema);
            if dry_run {
                let planned: Vec<_> = rewrites
                    .iter()
                    .map(|r| serde_json::json!({ "path": r.path, "document": r.document }))
                    .collect();
                print_output(
                    &serde_json::json!({ "dry_run": true, "would_write": planned }),
                    &cli.format,
                )?;
            } else {
                reformat::apply(&rewrites)?;
                let written: Vec<_> = rewrites.iter().map(|r| &r.path).collect();
                print_output(&serde_json::json!({ "ok": true, "written": written }), &cli.format)?;
            }
        }
    }

    Ok(())
}

/// Config from `--config`, else `./typegraph.yaml` when present, else defaults;
/// hierarchy flags override whichever was found.
fn resolve_config(cli: &Cli) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            load_config(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => GeneratorConfig::default(),
    };
    if let Some(root) = &cli.entities {
        config.entities.root = root.clone();
    }
    if let Some(root) = &cli.predicates {
        config.predicates.root = root.clone();
    }
    log::debug!(
        "Entities at {}, predicates at {}",
        config.entities.root.display(),
        config.predicates.root.display()
    );
    Ok(config)
}

fn report_value(report: &DiagnosticReport) -> serde_json::Value {
    let categories: Vec<_> = report
        .by_category()
        .into_iter()
        .map(|(category, diagnostics)| {
            let entries: Vec<_> = diagnostics
                .iter()
                .map(|d| serde_json::json!({ "path": d.path, "message": d.message }))
                .collect();
            serde_json::json!({
                "category": category,
                "title": category.title(),
                "severity": category.severity(),
                "diagnostics": entries,
            })
        })
        .collect();

    serde_json::json!({
        "ok": report.is_ok(),
        "errors": report.errors().count(),
        "warnings": report.warnings().count(),
        "categories": categories,
    })
}

fn show_value(schema: &Schema, name: &str) -> Result<serde_json::Value, TypeGraphError> {
    if let Some(entity) = schema.entity(name) {
        return Ok(serde_json::json!({
            "hierarchy": "entity",
            "node": entity,
            "resolved_fields": schema.resolved_fields(name),
        }));
    }
    if let Some(predicate) = schema.predicate(name) {
        return Ok(serde_json::json!({
            "hierarchy": "predicate",
            "node": predicate,
            "type": schema.predicate_type(name),
            "declared_by": schema.entities_declaring(name),
        }));
    }
    Err(TypeGraphError::UnknownNode(name.to_string()))
}

fn print_output<T: Serialize + ?Sized>(
    value: &T,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
