//! Core list-search engine for EcoPart resources.
//!
//! Turns loosely-typed list options (page, limit, sort string, JSON filters)
//! into one parameterized SQLite statement per request, gated by a
//! per-resource allowlist.

pub mod config;
pub mod db;
pub mod logging;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use repo::ecotaxa_account_repo::{EcotaxaAccountRecord, SqliteEcotaxaAccountRepository};
pub use repo::instrument_model_repo::{InstrumentModel, SqliteInstrumentModelRepository};
pub use repo::search_repo::{ResourceRepository, SearchRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRecord};
pub use repo::user_repo::{SqliteUserRepository, UserRecord};
pub use search::error::{QueryResult, SearchError};
pub use search::model::{ListResponse, SearchInfo, SearchOptions};
pub use service::search_service::SearchService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
