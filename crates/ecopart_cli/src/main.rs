//! Command-line entry point for EcoPart list searches.
//!
//! # Responsibility
//! - Resolve config (file + `ECOPART_*` env) and bootstrap db/logging.
//! - Run one list search and print the JSON response.

use clap::{Parser, Subcommand, ValueEnum};
use ecopart_core::{
    init_from_config, open_db, open_db_in_memory, CoreConfig, SearchOptions, SearchRepository,
    SearchService, SqliteEcotaxaAccountRepository, SqliteInstrumentModelRepository,
    SqliteTaskRepository, SqliteUserRepository,
};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ecopart")]
#[command(about = "EcoPart list-search utility", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core linkage and version
    Ping,

    /// List one page of a resource
    Search {
        #[arg(long, value_enum)]
        resource: Resource,

        /// SQLite database file (defaults to config, then in-memory)
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// JSON config file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Sort statements, e.g. `asc(instrument_model_id),desc(bodc_url)`
        #[arg(long, value_name = "SORT")]
        sort_by: Option<String>,

        /// JSON array of `{"field", "operator", "value"}` filters
        #[arg(long, value_name = "JSON")]
        filter: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Resource {
    InstrumentModels,
    Users,
    Tasks,
    EcotaxaAccounts,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Ping => {
            println!("ecopart_core ping={}", ecopart_core::ping());
            println!("ecopart_core version={}", ecopart_core::core_version());
            Ok(())
        }
        Commands::Search {
            resource,
            db,
            config,
            sort_by,
            filter,
            page,
            limit,
        } => {
            let mut config = CoreConfig::load(config.as_deref())?;
            if db.is_some() {
                config.db_path = db;
            }
            init_from_config(&config)?;

            let conn = match &config.db_path {
                Some(path) => open_db(path)?,
                None => open_db_in_memory()?,
            };
            let options = SearchOptions {
                page,
                limit,
                sort_by,
                filter: filter.as_deref().map(parse_filter).transpose()?,
            };
            info!(
                "event=cli_search module=cli status=start resource={:?}",
                resource
            );

            let output = search(&conn, resource, &options)?;
            println!("{output}");
            Ok(())
        }
    }
}

fn search(
    conn: &Connection,
    resource: Resource,
    options: &SearchOptions,
) -> Result<String, Box<dyn Error>> {
    match resource {
        Resource::InstrumentModels => {
            run_list(SqliteInstrumentModelRepository::new(conn), options)
        }
        Resource::Users => run_list(SqliteUserRepository::new(conn), options),
        Resource::Tasks => run_list(SqliteTaskRepository::new(conn), options),
        Resource::EcotaxaAccounts => run_list(SqliteEcotaxaAccountRepository::new(conn), options),
    }
}

fn run_list<R>(repo: R, options: &SearchOptions) -> Result<String, Box<dyn Error>>
where
    R: SearchRepository,
    R::Item: Serialize,
{
    let response = SearchService::new(repo).list(options)?;
    Ok(serde_json::to_string_pretty(&response)?)
}

fn parse_filter(raw: &str) -> Result<Vec<serde_json::Value>, Box<dyn Error>> {
    match serde_json::from_str(raw)? {
        serde_json::Value::Array(filters) => Ok(filters),
        _ => Err("--filter must be a JSON array".into()),
    }
}
