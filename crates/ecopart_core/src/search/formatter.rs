//! Search grammar parser and validator.
//!
//! # Responsibility
//! - Parse the raw `sort_by` grammar (`dir(field),dir(field)`) into sort terms.
//! - Validate raw filter objects and classify each into a [`FilterPredicate`].
//! - Resolve the effective page window.
//!
//! # Invariants
//! - Every pass collects all of its issues before failing.
//! - Sort fields are lower-cased; sort directions keep their casing so that
//!   case mismatches surface as authorization errors, not grammar errors.
//! - A key that is absent is missing; `null`, `false` and `0` are not.

use crate::search::error::{GrammarIssue, QueryResult, SearchError};
use crate::search::model::{
    Filter, FilterOperator, FilterPredicate, OmissionReason, Page, ScalarValue, SearchOptions,
    SearchRequest, SortTerm, DEFAULT_PAGE,
};
use serde_json::Value;

const EXPECT_SCALAR_LIST: &str = "an array of strings, numbers, booleans or nulls";
const EXPECT_STRING: &str = "a string";
const EXPECT_NUMBER: &str = "a number";
const EXPECT_COMPARABLE: &str = "a string, number or boolean";
const EXPECT_NULLABLE: &str = "a string, number, boolean or null";

/// Runs every grammar pass: page, then sort, then filters.
///
/// Each pass fails on its own with all of its issues.
pub fn format_search_options(
    options: &SearchOptions,
    default_limit: u32,
) -> QueryResult<SearchRequest> {
    let page = resolve_page(options, default_limit)?;
    let sort = parse_sort_by(options.sort_by.as_deref())?;
    let filters = validate_filters(options.filter.as_deref().unwrap_or(&[]))?;
    Ok(SearchRequest {
        filters,
        sort,
        page,
    })
}

/// Applies page/limit defaults and rejects `page = 0`.
pub fn resolve_page(options: &SearchOptions, default_limit: u32) -> QueryResult<Page> {
    let page = options.page.unwrap_or(DEFAULT_PAGE);
    if page == 0 {
        return Err(SearchError::Grammar(vec![GrammarIssue::InvalidPage(page)]));
    }
    Ok(Page::new(page, options.limit.unwrap_or(default_limit)))
}

/// Parses `dir1(field1),dir2(field2),...`.
///
/// Absent or blank input yields no sort terms.
pub fn parse_sort_by(raw: Option<&str>) -> QueryResult<Vec<SortTerm>> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(Vec::new());
    };

    let mut terms = Vec::new();
    let mut issues = Vec::new();
    for statement in raw.split(',').map(str::trim) {
        match parse_sort_statement(statement) {
            Some(term) => terms.push(term),
            None => issues.push(GrammarIssue::InvalidSortStatement {
                statement: statement.to_string(),
            }),
        }
    }

    if !issues.is_empty() {
        return Err(SearchError::Grammar(issues));
    }
    Ok(terms)
}

fn parse_sort_statement(statement: &str) -> Option<SortTerm> {
    let (direction, rest) = statement.split_once('(')?;
    let field = rest.strip_suffix(')')?;
    if direction.is_empty() || field.is_empty() {
        return None;
    }
    Some(SortTerm::new(field.to_lowercase(), direction))
}

/// Validates raw filter objects, in order, into typed filters.
pub fn validate_filters(raw: &[Value]) -> QueryResult<Vec<Filter>> {
    let mut filters = Vec::with_capacity(raw.len());
    let mut issues = Vec::new();
    for candidate in raw {
        match validate_filter(candidate) {
            Ok(filter) => filters.push(filter),
            Err(issue) => issues.push(issue),
        }
    }

    if !issues.is_empty() {
        return Err(SearchError::Grammar(issues));
    }
    Ok(filters)
}

fn validate_filter(candidate: &Value) -> Result<Filter, GrammarIssue> {
    let members = candidate.as_object().map(|object| {
        (
            object.get("field"),
            object.get("operator"),
            object.get("value"),
        )
    });
    let Some((Some(field), Some(operator), Some(value))) = members else {
        return Err(GrammarIssue::MissingFilterMember {
            filter: candidate.to_string(),
        });
    };

    let Some(field) = field.as_str() else {
        return Err(GrammarIssue::InvalidFilterField {
            filter: candidate.to_string(),
        });
    };
    let Some(operator) = operator.as_str().and_then(FilterOperator::parse) else {
        return Err(GrammarIssue::InvalidFilterOperator {
            filter: candidate.to_string(),
        });
    };
    let predicate =
        classify(operator, value).map_err(|expected| GrammarIssue::InvalidFilterValue {
            operator: operator.as_str(),
            expected,
            filter: candidate.to_string(),
        })?;

    Ok(Filter {
        field: field.to_string(),
        operator,
        predicate,
    })
}

/// Checks the operator/value contract and picks the predicate shape.
///
/// Precedence: `IN` lists, then boolean values (`true`/`"true"`,
/// `false`/`"false"`), then the `"null"` sentinel, then plain comparison.
fn classify(operator: FilterOperator, value: &Value) -> Result<FilterPredicate, &'static str> {
    if operator == FilterOperator::In {
        return classify_in_list(value);
    }

    let accepted = match operator {
        FilterOperator::Like => value.is_string(),
        op if op.is_ordering() => value.is_number(),
        FilterOperator::NotEq => !value.is_array() && !value.is_object(),
        _ => value.is_string() || value.is_number() || value.is_boolean(),
    };
    if !accepted {
        return Err(expected_for(operator));
    }

    let predicate = match value {
        Value::Bool(true) => FilterPredicate::Bool(true),
        Value::Bool(false) => FilterPredicate::Bool(false),
        Value::String(text) if text == "true" => FilterPredicate::Bool(true),
        Value::String(text) if text == "false" => FilterPredicate::Bool(false),
        Value::String(text) if text == "null" => match operator {
            FilterOperator::Eq => FilterPredicate::NullCheck { negated: false },
            FilterOperator::NotEq => FilterPredicate::NullCheck { negated: true },
            _ => FilterPredicate::Omitted(OmissionReason::NullSentinelOperator),
        },
        Value::String(text) if operator == FilterOperator::Like => {
            FilterPredicate::Like(text.clone())
        }
        other => FilterPredicate::Comparison(to_scalar(other).ok_or(expected_for(operator))?),
    };
    Ok(predicate)
}

fn classify_in_list(value: &Value) -> Result<FilterPredicate, &'static str> {
    let items = value.as_array().ok_or(EXPECT_SCALAR_LIST)?;
    let scalars = items
        .iter()
        .map(to_scalar)
        .collect::<Option<Vec<_>>>()
        .ok_or(EXPECT_SCALAR_LIST)?;

    if scalars.is_empty() || scalars.contains(&ScalarValue::Null) {
        return Ok(FilterPredicate::Omitted(OmissionReason::DegenerateInList));
    }
    Ok(FilterPredicate::In(scalars))
}

fn expected_for(operator: FilterOperator) -> &'static str {
    match operator {
        FilterOperator::In => EXPECT_SCALAR_LIST,
        FilterOperator::Like => EXPECT_STRING,
        FilterOperator::NotEq => EXPECT_NULLABLE,
        op if op.is_ordering() => EXPECT_NUMBER,
        _ => EXPECT_COMPARABLE,
    }
}

fn to_scalar(value: &Value) -> Option<ScalarValue> {
    match value {
        Value::Null => Some(ScalarValue::Null),
        Value::Bool(flag) => Some(ScalarValue::Bool(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Some(ScalarValue::Integer(integer)),
            None => number.as_f64().map(ScalarValue::Real),
        },
        Value::String(text) => Some(ScalarValue::Text(text.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}
