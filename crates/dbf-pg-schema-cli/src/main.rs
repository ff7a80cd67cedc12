//! dbf-pg-schema CLI - Translate DBF table structures into PostgreSQL tables.

use clap::{Parser, Subcommand};
use dbf_pg_schema::{
    Config, DbfSource, DdlTarget, ExecuteOutcome, FieldFilter, PgTarget, SchemaError,
    SchemaTranslator, TableDefinition, TypeMapping,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

const TABLE_MODES: [&str; 3] = ["basic", "timestamp", "audit"];

#[derive(Parser)]
#[command(name = "dbf-pg-schema")]
#[command(about = "Translate DBF table structures into PostgreSQL CREATE TABLE statements")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the table name and field descriptors of a DBF file
    Inspect {
        /// DBF file to read
        file: PathBuf,
    },

    /// Print the CREATE TABLE statement for a DBF file
    Generate {
        /// DBF file to read
        file: PathBuf,

        /// Override table mode
        #[arg(long, value_parser = TABLE_MODES)]
        mode: Option<String>,

        /// Exclude a field (repeatable, case-insensitive)
        #[arg(long = "exclude", value_name = "NAME")]
        exclude: Vec<String>,

        /// Also write the statement to a preview file
        #[arg(long)]
        preview: bool,

        /// Override the preview output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate the table and create it in PostgreSQL
    Create {
        /// DBF file to read
        file: PathBuf,

        /// Override table mode
        #[arg(long, value_parser = TABLE_MODES)]
        mode: Option<String>,

        /// Exclude a field (repeatable, case-insensitive)
        #[arg(long = "exclude", value_name = "NAME")]
        exclude: Vec<String>,

        /// Show the statement without connecting to the database
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), SchemaError> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.verbosity, &cli.log_format).map_err(SchemaError::Config)?;

    let mut config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Inspect { file } => {
            let source = DbfSource::open(&file)?;
            let table_name = source.table_name();

            if cli.output_json {
                let output = serde_json::json!({
                    "table_name": table_name,
                    "header": source.header(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let header = source.header();
                println!("Table: {}", table_name);
                println!("  Version: {} (0x{:02X})", header.version_name(), header.version);
                if let Some(date) = header.last_update {
                    println!("  Last update: {}", date);
                }
                println!("  Records: {}", header.record_count);
                println!("  Fields: {}", header.fields.len());
                for field in source.fields() {
                    println!(
                        "    {:<11} {} {:>4} {:>3}",
                        field.name,
                        field.type_code,
                        field.length.unwrap_or(0),
                        field.decimal.unwrap_or(0)
                    );
                }
            }
        }

        Commands::Generate {
            file,
            mode,
            exclude,
            preview,
            output_dir,
        } => {
            if let Some(mode) = mode {
                config.features.table_mode = mode;
            }
            if preview {
                config.features.preview_mode = true;
            }
            if let Some(dir) = output_dir {
                config.paths.sql_output_directory = dir;
            }

            let table = translate(&config, &file, &exclude)?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                println!("{}", table.ddl());
                if let Some(path) = &table.preview {
                    eprintln!("Preview written to {}", path.display());
                }
            }
        }

        Commands::Create {
            file,
            mode,
            exclude,
            dry_run,
        } => {
            if let Some(mode) = mode {
                config.features.table_mode = mode;
            }

            let table = translate(&config, &file, &exclude)?;
            let ddl = table.ddl();
            let table_name = &table.schema.table_name;

            if dry_run {
                if cli.output_json {
                    println!("{}", serde_json::to_string_pretty(&table)?);
                } else {
                    println!("-- Dry run: nothing executed\n{}", ddl);
                }
                return Ok(());
            }

            let target = PgTarget::new(&config.database).await?;
            let result = create_table(&target, &config.database.schema, table_name, &ddl).await;
            target.close().await;
            let outcome = result?;

            let created = outcome != ExecuteOutcome::AlreadyExists;
            if cli.output_json {
                let output = serde_json::json!({
                    "schema": config.database.schema,
                    "table_name": table_name,
                    "created": created,
                    "ddl": ddl,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if created {
                println!("Created table {}.{}", config.database.schema, table_name);
            } else {
                println!(
                    "Table {}.{} already exists, left unchanged",
                    config.database.schema, table_name
                );
            }
        }
    }

    Ok(())
}

/// Read a DBF file, drop excluded fields and translate it.
fn translate(config: &Config, file: &Path, exclude: &[String]) -> Result<TableDefinition, SchemaError> {
    let source = DbfSource::open(file)?;

    let mut filter = FieldFilter::new();
    filter.configure_with(config.translation.exclude_fields.iter().chain(exclude));
    let fields = filter.included_fields(source.fields())?;

    for name in filter.excluded_fields() {
        if !source.fields().iter().any(|f| f.normalized_name() == name) {
            warn!("Excluded field '{}' is not present in {}", name, file.display());
        }
    }

    let translator = SchemaTranslator::from_config(config, TypeMapping::new());
    translator.generate_table(&source.table_name(), &fields)
}

async fn create_table(
    target: &dyn DdlTarget,
    schema: &str,
    table_name: &str,
    ddl: &str,
) -> Result<ExecuteOutcome, SchemaError> {
    target.create_schema(schema).await?;

    if target.table_exists(schema, table_name).await? {
        warn!("Table {}.{} already exists", schema, table_name);
        return Ok(ExecuteOutcome::AlreadyExists);
    }

    let outcome = target.execute_ddl(ddl).await?;
    info!("Executed DDL for {}.{}: {:?}", schema, table_name, outcome);
    Ok(outcome)
}

/// Setup logging based on verbosity and format.
///
/// Logs go to stderr so stdout carries only command output. `RUST_LOG`
/// overrides `--verbosity` when set.
fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}', expected text or json", other)),
    }

    Ok(())
}

/// The library and binary log at `level`; dependencies stay at warn.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!(
            "warn,dbf_pg_schema={level}",
            level = level
        ))
    })
}
