//! Generic list-search engine shared by every resource.
//!
//! # Responsibility
//! - Validate raw sort/filter/page input (`formatter`).
//! - Gate requests through per-resource allowlists (`policy`).
//! - Compile one parameterized "count + page" statement (`compiler`).
//! - Derive pagination metadata (`info`).
//!
//! # Invariants
//! - Validation and authorization finish before the store is touched.
//! - Filters combine with `AND` only; there is no OR, grouping or nesting.

pub mod adapter;
pub mod compiler;
pub mod error;
pub mod formatter;
pub mod info;
pub mod model;
pub mod policy;
pub mod store;
