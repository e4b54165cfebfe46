//! Value shapes exchanged by the list-search pipeline.
//!
//! # Responsibility
//! - Define raw inbound options and their validated, typed counterparts.
//! - Define result and pagination metadata envelopes.
//!
//! # Invariants
//! - A validated [`Filter`] carries a [`FilterPredicate`] decided once at the
//!   grammar boundary; downstream code never inspects raw JSON again.
//! - All values here are request-scoped and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Page number used when the caller does not send one.
pub const DEFAULT_PAGE: u32 = 1;

/// Raw list-request options, as decoded from an HTTP query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size; resource default applies when absent.
    pub limit: Option<u32>,
    /// Raw sort grammar string, e.g. `asc(name),desc(id)`.
    pub sort_by: Option<String>,
    /// Raw filter objects, validated by the search formatter.
    pub filter: Option<Vec<serde_json::Value>>,
}

/// Filter operators accepted by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterOperator {
    Eq,
    NotEq,
    Different,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    Like,
}

impl FilterOperator {
    /// Every operator the grammar knows about.
    pub const ALL: [FilterOperator; 9] = [
        Self::Eq,
        Self::NotEq,
        Self::Different,
        Self::Gt,
        Self::Lt,
        Self::Gte,
        Self::Lte,
        Self::In,
        Self::Like,
    ];

    /// Parses the exact wire token. Matching is case-sensitive.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::NotEq),
            "<>" => Some(Self::Different),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Gte),
            "<=" => Some(Self::Lte),
            "IN" => Some(Self::In),
            "LIKE" => Some(Self::Like),
            _ => None,
        }
    }

    /// Wire token, also used verbatim as the SQL operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Different => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::In => "IN",
            Self::Like => "LIKE",
        }
    }

    /// Whether the operator only accepts numeric values.
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Lt | Self::Gte | Self::Lte)
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single bindable value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Null,
}

/// Why a filter compiles to no predicate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmissionReason {
    /// `IN` with an empty list or a list holding `null`.
    DegenerateInList,
    /// `"null"` sentinel with an operator other than `=` / `!=`.
    NullSentinelOperator,
}

impl OmissionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DegenerateInList => "degenerate_in_list",
            Self::NullSentinelOperator => "null_sentinel_operator",
        }
    }
}

/// Typed predicate shape of one validated filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// `field = 1` / `field = 0`.
    Bool(bool),
    /// `field IS NULL` / `field IS NOT NULL`.
    NullCheck { negated: bool },
    /// `field <op> (?)`.
    Comparison(ScalarValue),
    /// `field IN (?, ...)`; never empty.
    In(Vec<ScalarValue>),
    /// `field LIKE (?)`.
    Like(String),
    /// Compiles to nothing.
    Omitted(OmissionReason),
}

/// Validated filter term.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub predicate: FilterPredicate,
}

/// One compound ORDER BY member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortTerm {
    /// Lower-cased field name.
    pub field: String,
    /// Direction token exactly as submitted; checked against policy later.
    pub direction: String,
}

impl SortTerm {
    pub fn new(field: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: direction.into(),
        }
    }

    /// Canonical grammar form: `direction(field)`.
    pub fn to_statement(&self) -> String {
        format!("{}({})", self.direction, self.field)
    }
}

/// Serializes sort terms back to the raw `sort_by` grammar.
pub fn format_sort_terms(terms: &[SortTerm]) -> String {
    terms
        .iter()
        .map(SortTerm::to_statement)
        .collect::<Vec<_>>()
        .join(",")
}

/// Effective pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Rows to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Fully validated list request, ready for authorization and compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub filters: Vec<Filter>,
    pub sort: Vec<SortTerm>,
    pub page: Page,
}

/// One page of rows plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> SearchResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Pagination metadata returned next to list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchInfo {
    pub total: u64,
    pub limit: u32,
    pub total_on_page: u64,
    pub page: u32,
    pub pages: u64,
}

/// Use-case level list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub search_info: SearchInfo,
}

#[cfg(test)]
mod tests {
    use super::{format_sort_terms, FilterOperator, Page, SortTerm};

    #[test]
    fn operator_tokens_roundtrip() {
        for operator in FilterOperator::ALL {
            assert_eq!(FilterOperator::parse(operator.as_str()), Some(operator));
        }
        assert_eq!(FilterOperator::parse("like"), None);
        assert_eq!(FilterOperator::parse("toto"), None);
    }

    #[test]
    fn page_offset_is_zero_based() {
        assert_eq!(Page::new(1, 10).offset(), 0);
        assert_eq!(Page::new(3, 25).offset(), 50);
        assert_eq!(Page::new(4, 0).offset(), 0);
    }

    #[test]
    fn sort_terms_serialize_to_grammar() {
        let terms = vec![SortTerm::new("name", "asc"), SortTerm::new("id", "DESC")];
        assert_eq!(format_sort_terms(&terms), "asc(name),DESC(id)");
    }
}
