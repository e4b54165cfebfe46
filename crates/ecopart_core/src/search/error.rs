//! Search error taxonomy.
//!
//! # Invariants
//! - Grammar and authorization failures keep every independent issue found in
//!   one pass, in input order.
//! - The outward `Display` form joins issue messages with `", "`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type QueryResult<T> = Result<T, SearchError>;

/// Malformed request input, detected before authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarIssue {
    InvalidPage(u32),
    InvalidSortStatement {
        statement: String,
    },
    MissingFilterMember {
        filter: String,
    },
    InvalidFilterField {
        filter: String,
    },
    InvalidFilterOperator {
        filter: String,
    },
    InvalidFilterValue {
        operator: &'static str,
        expected: &'static str,
        filter: String,
    },
}

impl Display for GrammarIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPage(page) => write!(f, "Invalid page: {page} (must be >= 1)"),
            Self::InvalidSortStatement { statement } => {
                write!(f, "Invalid sorting statement: '{statement}'")
            }
            Self::MissingFilterMember { filter } => {
                write!(f, "Filter must have field, operator and value: {filter}")
            }
            Self::InvalidFilterField { filter } => {
                write!(f, "Invalid field in filter: {filter}")
            }
            Self::InvalidFilterOperator { filter } => {
                write!(f, "Invalid operator in filter: {filter}")
            }
            Self::InvalidFilterValue {
                operator,
                expected,
                filter,
            } => write!(
                f,
                "Invalid value for {operator} operator (expected {expected}) in filter: {filter}"
            ),
        }
    }
}

/// Request term outside the resource allowlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationIssue {
    SortField(String),
    SortDirection(String),
    FilterField(String),
    FilterOperator(String),
}

impl Display for AuthorizationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SortField(field) => write!(f, "Unauthorized sort_by: {field}"),
            Self::SortDirection(direction) => write!(f, "Unauthorized order_by: {direction}"),
            Self::FilterField(field) => write!(f, "Filter field: {field}"),
            Self::FilterOperator(operator) => write!(f, "Filter operator: {operator}"),
        }
    }
}

/// Search-layer error for validation, authorization and execution.
#[derive(Debug)]
pub enum SearchError {
    Grammar(Vec<GrammarIssue>),
    Unauthorized(Vec<AuthorizationIssue>),
    Db(DbError),
    /// A row or identifier could not be decoded/trusted.
    InvalidData(String),
}

impl SearchError {
    /// Grammar and authorization failures are fixable by the caller.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Grammar(_) | Self::Unauthorized(_))
    }

    /// Short stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Grammar(_) => "search_grammar",
            Self::Unauthorized(_) => "search_unauthorized",
            Self::Db(_) => "search_db",
            Self::InvalidData(_) => "search_invalid_data",
        }
    }
}

fn join_issues<T: Display>(issues: &[T]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grammar(issues) => f.write_str(&join_issues(issues)),
            Self::Unauthorized(issues) => f.write_str(&join_issues(issues)),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search data: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthorizationIssue, GrammarIssue, SearchError};

    #[test]
    fn unauthorized_issues_join_with_comma() {
        let err = SearchError::Unauthorized(vec![
            AuthorizationIssue::SortField("password".to_string()),
            AuthorizationIssue::FilterOperator("LIKE".to_string()),
        ]);
        assert_eq!(
            err.to_string(),
            "Unauthorized sort_by: password, Filter operator: LIKE"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn grammar_issue_quotes_raw_statement() {
        let err = SearchError::Grammar(vec![GrammarIssue::InvalidSortStatement {
            statement: "asc(".to_string(),
        }]);
        assert_eq!(err.to_string(), "Invalid sorting statement: 'asc('");
    }
}
