//! Per-resource allowlist gate in front of the query compiler.
//!
//! # Invariants
//! - A policy is immutable once built and is injected into repositories.
//! - Any out-of-policy term rejects the whole request; terms are never
//!   silently dropped.

use crate::search::error::{AuthorizationIssue, QueryResult, SearchError};
use crate::search::model::{Filter, FilterOperator, SortTerm};
use std::collections::BTreeSet;

/// Sort directions accepted by every built-in resource.
pub const DEFAULT_SORT_DIRECTIONS: &[&str] = &["asc", "desc"];

/// Queryable fields, operators and sort directions of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePolicy {
    allowed_fields: BTreeSet<String>,
    allowed_operators: BTreeSet<FilterOperator>,
    allowed_sort_directions: BTreeSet<String>,
}

impl ResourcePolicy {
    pub fn new<'a>(
        fields: impl IntoIterator<Item = &'a str>,
        operators: impl IntoIterator<Item = FilterOperator>,
        sort_directions: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            allowed_fields: fields.into_iter().map(str::to_string).collect(),
            allowed_operators: operators.into_iter().collect(),
            allowed_sort_directions: sort_directions.into_iter().map(str::to_string).collect(),
        }
    }

    /// Policy with every operator and `asc`/`desc` sorting over `fields`.
    pub fn with_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            fields,
            FilterOperator::ALL,
            DEFAULT_SORT_DIRECTIONS.iter().copied(),
        )
    }

    pub fn allows_field(&self, field: &str) -> bool {
        self.allowed_fields.contains(field)
    }

    pub fn allows_operator(&self, operator: FilterOperator) -> bool {
        self.allowed_operators.contains(&operator)
    }

    pub fn allows_sort_direction(&self, direction: &str) -> bool {
        self.allowed_sort_directions.contains(direction)
    }

    pub fn allowed_fields(&self) -> impl Iterator<Item = &str> {
        self.allowed_fields.iter().map(String::as_str)
    }

    /// Checks sort terms first, then filters, in input order.
    pub fn authorize(&self, filters: &[Filter], sort: &[SortTerm]) -> QueryResult<()> {
        let mut issues = Vec::new();

        for term in sort {
            if !self.allows_field(&term.field) {
                issues.push(AuthorizationIssue::SortField(term.field.clone()));
            }
            if !self.allows_sort_direction(&term.direction) {
                issues.push(AuthorizationIssue::SortDirection(term.direction.clone()));
            }
        }

        for filter in filters {
            if !self.allows_field(&filter.field) {
                issues.push(AuthorizationIssue::FilterField(filter.field.clone()));
            }
            if !self.allows_operator(filter.operator) {
                issues.push(AuthorizationIssue::FilterOperator(
                    filter.operator.as_str().to_string(),
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SearchError::Unauthorized(issues))
        }
    }
}
