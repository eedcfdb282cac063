//! Rowgate command-line runner.
//!
//! Opens a database over a schema (a JSON schema document or the built-in
//! studio schema) and executes `{cmd, kwargs}` requests against it.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod demo;
mod error;
mod executor;
mod formatter;

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use error::CliError;
use formatter::OutputFormat;
use rowgate_core::id::DEFAULT_ID_BITS;
use rowgate_core::{Catalog, Database, DatabaseConfig, IdStrategy};
use tracing_subscriber::EnvFilter;

/// Rowgate command-line runner
#[derive(Parser, Debug)]
#[command(name = "rowgate")]
#[command(version, about = "Run declarative CRUD requests against a SQLite database")]
pub struct Args {
    /// Database URI, sqlite:// for in-memory or sqlite:///path/to/file.db
    #[arg(long, default_value = "sqlite://", global = true)]
    pub uri: String,

    /// JSON schema document; the built-in studio schema when omitted
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Generate random keys for created rows that have none
    #[arg(long, global = true)]
    pub ids: bool,

    /// Width of generated keys in bits
    #[arg(long, default_value_t = DEFAULT_ID_BITS, global = true)]
    pub id_bits: u32,

    /// Output format
    #[arg(long, default_value = "table", value_enum, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tables of the schema
    Tables,
    /// Print the DDL for the schema
    Schema,
    /// Execute a JSON request, or a list of requests, from a file or stdin
    Exec {
        /// Input file, or - for stdin
        input: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rowgate=info")),
        )
        .init();

    let args = Args::parse();
    let formatter = formatter::create_formatter(args.format);

    if let Err(e) = run(args, &*formatter) {
        eprintln!("{}", formatter.format_error(&e.to_string()));
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args, formatter: &dyn formatter::Formatter) -> Result<(), CliError> {
    let catalog = load_catalog(args.schema.as_ref())?;

    match args.command {
        Command::Tables => println!("{}", formatter.format_tables(&catalog)),
        Command::Schema => {
            for statement in catalog.create_statements() {
                println!("{};", statement);
            }
        }
        Command::Exec { input } => {
            let mut config = DatabaseConfig::from_uri(&args.uri)?;
            if args.ids {
                config = config.with_id_strategy(IdStrategy::Uuid { bits: args.id_bits });
            }
            let db = Database::open(config, catalog)?;
            for output in executor::execute(&db, &read_input(&input)?, formatter)? {
                println!("{}", output);
            }
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&PathBuf>) -> Result<Catalog, CliError> {
    match path {
        Some(path) => {
            let document = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Ok(Catalog::from_json(&document)?)
        }
        None => Ok(demo::studio_catalog()?),
    }
}

fn read_input(input: &str) -> Result<String, CliError> {
    let io_error = |source: std::io::Error| CliError::Io {
        path: input.to_string(),
        source,
    };
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(io_error)?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).map_err(io_error)
    }
}
