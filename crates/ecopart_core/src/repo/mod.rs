//! Searchable resource repositories.
//!
//! # Responsibility
//! - Wire each resource adapter to its allowlist and the SQLite store.
//! - Keep SQL shape (table, projection, enrichment) out of the service layer.
//!
//! # Invariants
//! - Secrets (password hashes, account tokens) are never projected.

pub mod ecotaxa_account_repo;
pub mod instrument_model_repo;
pub mod search_repo;
pub mod task_repo;
pub mod user_repo;
