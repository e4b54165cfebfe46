//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, repository search and pagination metadata.
//! - Keep CLI/host layers decoupled from storage details.

pub mod search_service;
