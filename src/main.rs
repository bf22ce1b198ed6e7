//! CLI entry point for `sql2rel`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use sql2rel::catalog::ddl::DdlCatalog;
use sql2rel::options::{BuilderOptions, OverrideConfig};
use sql2rel::output::formatter;
use sql2rel::relations::inferencer;

#[derive(Parser)]
#[command(
    name = "sql2rel",
    about = "Infer ORM relationship plans from SQL schema files"
)]
struct Cli {
    /// Input SQL files
    #[arg(required_unless_present = "schema_dir")]
    input: Vec<PathBuf>,

    /// Process all .sql files in directory
    #[arg(long)]
    schema_dir: Option<PathBuf>,

    /// JSON file with override maps (moniker_map, rel_name_map, ...)
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Only consider tables in this schema
    #[arg(long)]
    db_schema: Option<String>,

    /// Only consider tables matching this regex
    #[arg(long)]
    constraint: Option<String>,

    /// Skip tables matching this regex
    #[arg(long)]
    exclude: Option<String>,

    /// Output directory
    #[arg(long, default_value = "sql2rel-output")]
    output_dir: PathBuf,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,

    /// Exit non-zero when any warning was emitted
    #[arg(long)]
    deny_warnings: bool,
}

fn main() {
    let cli = Cli::parse();

    // Collect input files
    let mut sql_files = cli.input.clone();
    if let Some(dir) = &cli.schema_dir {
        match std::fs::read_dir(dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|e| e == "sql") {
                        sql_files.push(path);
                    }
                }
                sql_files.sort();
            }
            Err(e) => {
                eprintln!("Error reading schema directory: {e}");
                process::exit(2);
            }
        }
    }

    if sql_files.is_empty() {
        eprintln!("No input SQL files provided");
        process::exit(2);
    }

    // Read and concatenate all SQL
    let mut combined_sql = String::new();
    for path in &sql_files {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                combined_sql.push_str(&content);
                combined_sql.push('\n');
            }
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(2);
            }
        }
    }

    // Options: override file first, then CLI flags on top.
    let mut options = BuilderOptions::new();
    if let Some(path) = &cli.overrides {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                if let Err(e) = options.load_from_json(&content) {
                    eprintln!("Error in {}: {e}", path.display());
                    process::exit(2);
                }
            }
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(2);
            }
        }
    }
    let flags = OverrideConfig {
        db_schema: cli.db_schema.clone(),
        constraint: cli.constraint.clone(),
        exclude: cli.exclude.clone(),
        ..OverrideConfig::default()
    };
    if let Err(e) = options.apply_config(flags) {
        eprintln!("{e}");
        process::exit(2);
    }

    // Parse the schema into a catalog; prior output preserves edited names.
    let catalog = match DdlCatalog::parse(&combined_sql) {
        Ok(catalog) => catalog.with_dump_dir(&cli.output_dir),
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let plan = match inferencer::build_plan(&catalog, &options) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    if cli.verbose {
        eprintln!(
            "Planned {} relationships across {} sources",
            plan.len(),
            plan.sources.len()
        );
        for (moniker, rels) in &plan.relationships {
            for rel in rels {
                eprintln!("  {moniker}.{} {} {}", rel.name, rel.method, rel.target_source);
            }
        }
    }

    for warning in &plan.warnings {
        eprintln!("warning: {warning}");
    }

    if let Err(e) = formatter::write_output(&cli.output_dir, &plan) {
        eprintln!("Error writing output: {e}");
        process::exit(2);
    }

    if cli.deny_warnings && !plan.warnings.is_empty() {
        process::exit(1);
    }
}
