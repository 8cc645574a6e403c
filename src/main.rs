use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

use rust_sqlanywhere::config::{load_engine_config, ConnectionData};
use rust_sqlanywhere::types::{derive_type, AsaDbType, LangType, TypeMappings};

#[derive(Parser)]
#[command(name = "rust-sqlanywhere")]
#[command(author, version, about = "SQL Anywhere type tables, naming rules and connection settings")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the native type tables
    Types,

    /// Derive the native type of a raw catalog type name
    DeriveType {
        /// Domain name as reported by the catalog (e.g. "char", "long varchar")
        name: String,

        /// Column width in bytes
        #[arg(short, long, default_value_t = 0)]
        length: i32,
    },

    /// Pick the native column type for a language type
    ColumnType {
        /// Language type (bytes, bool, string, datetime, decimal, f64, f32, i64, ...)
        #[arg(value_parser = parse_lang_type)]
        lang_type: LangType,

        #[arg(short, long, default_value_t = 0)]
        length: i32,

        #[arg(short, long, default_value_t = 0)]
        precision: i32,

        #[arg(short, long, default_value_t = 0)]
        scale: i32,
    },

    /// Apply the configured schema name overwrites to a schema name
    SchemaName {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,

        name: String,
    },

    /// Apply the configured schema name overwrites to a `schema.procedure` name
    ProcName {
        /// Path to the configuration file
        #[arg(short, long)]
        config: PathBuf,

        name: String,
    },

    /// Build a connection string
    ConnectionString {
        #[arg(long)]
        server: String,

        #[arg(long)]
        database: String,

        #[arg(long)]
        login: String,

        #[arg(long, default_value = "")]
        password: String,
    },
}

fn parse_lang_type(s: &str) -> Result<LangType, String> {
    LangType::ALL
        .iter()
        .copied()
        .find(|t| t.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown language type '{}'", s))
}

fn init_logging(verbose: bool, configured: Option<LevelFilter>) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        configured.unwrap_or(LevelFilter::Warn)
    };
    // RUST_LOG still wins over the configured level
    if let Err(e) = env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .try_init()
    {
        log::debug!("Keeping the existing logger: {}", e);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Types => {
            init_logging(cli.verbose, None);
            let mappings = TypeMappings::global();
            println!(
                "{:<18} {:<22} {:<10} {:<28} {}",
                "enum", "provider type", "lang", "canonical", "sort"
            );
            for db_type in AsaDbType::ALL {
                let sort = mappings
                    .sort_order(db_type)
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<18} {:<22} {:<10} {:<28} {}",
                    db_type.enum_name(),
                    db_type.provider_type_name(),
                    db_type.lang_type(),
                    db_type.canonical_name(),
                    sort
                );
            }
        }
        Commands::DeriveType { name, length } => {
            init_logging(cli.verbose, None);
            let db_type = derive_type(&name, length);
            println!("{} ({})", db_type.enum_name(), db_type.provider_type_name());
        }
        Commands::ColumnType {
            lang_type,
            length,
            precision,
            scale,
        } => {
            init_logging(cli.verbose, None);
            let mappings = TypeMappings::global();
            let chosen = mappings
                .choose_column_type(lang_type, length, precision, scale)
                .ok_or_else(|| anyhow!("no native type matches {} (length {})", lang_type, length))?;
            println!("chosen: {}", chosen);
            for candidate in mappings.candidate_types(lang_type, length, precision, scale) {
                println!("  candidate: {}", candidate);
            }
        }
        Commands::SchemaName { config, name } => {
            let engine_config = load_engine_config(&config)
                .with_context(|| format!("Failed to load {}", config.display()))?;
            init_logging(cli.verbose, engine_config.trace_level);
            println!("{}", engine_config.schema_overwrites.get_new_schema_name(&name));
        }
        Commands::ProcName { config, name } => {
            let engine_config = load_engine_config(&config)
                .with_context(|| format!("Failed to load {}", config.display()))?;
            init_logging(cli.verbose, engine_config.trace_level);
            println!(
                "{}",
                engine_config
                    .schema_overwrites
                    .get_new_stored_procedure_name(&name)
            );
        }
        Commands::ConnectionString {
            server,
            database,
            login,
            password,
        } => {
            init_logging(cli.verbose, None);
            let data = ConnectionData::new(server, database, login, password);
            if !data.validate() {
                return Err(anyhow!("server, database and login must not be empty"));
            }
            println!("{}", data.connection_string());
        }
    }

    Ok(())
}
