//! Compiles authorized filters, sort terms and a page into one statement.
//!
//! # Responsibility
//! - Emit a single statement returning the page rows together with the
//!   unpaginated match count (scalar count subquery).
//! - Bind every user value as a positional parameter.
//!
//! # Invariants
//! - Count subquery and page query share one predicate text.
//! - Parameter order: count predicate values, page predicate values, limit,
//!   offset.
//! - Filters are joined with `AND` only.
//! - Identifiers are re-checked before they are spliced into SQL.

use crate::search::adapter::ResourceAdapter;
use crate::search::error::{QueryResult, SearchError};
use crate::search::model::{
    Filter, FilterPredicate, OmissionReason, ScalarValue, SearchRequest, SortTerm,
};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;

/// Alias of the count column appended to every compiled projection.
pub const TOTAL_COLUMN: &str = "search_total";

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid identifier regex"));

/// SQL text plus positional parameters, in binding order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builds the "count + page" statement for one authorized request.
pub fn compile_search<A>(adapter: &A, request: &SearchRequest) -> QueryResult<CompiledQuery>
where
    A: ResourceAdapter + ?Sized,
{
    let table = checked_identifier(adapter.table())?;
    let (predicate, predicate_params) =
        compile_predicate(adapter.resource(), table, &request.filters)?;
    let order_by = compile_order_by(table, &request.sort)?;

    let where_clause = if predicate.is_empty() {
        String::new()
    } else {
        format!(" WHERE {predicate}")
    };
    let join = adapter
        .enrichment_join()
        .map(|join| format!(" {join}"))
        .unwrap_or_default();

    let mut sql = format!(
        "SELECT {projection}, (SELECT COUNT(*) FROM {table}{where_clause}) AS {TOTAL_COLUMN} FROM {table}{join}{where_clause}",
        projection = adapter.projection(),
    );
    if !order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by);
    }
    sql.push_str(" LIMIT ? OFFSET ?");

    let offset = i64::try_from(request.page.offset()).map_err(|_| {
        SearchError::InvalidData(format!("offset out of range for page {}", request.page.page))
    })?;

    let mut params = Vec::with_capacity(predicate_params.len() * 2 + 2);
    params.extend(predicate_params.iter().cloned());
    params.extend(predicate_params);
    params.push(Value::Integer(i64::from(request.page.limit)));
    params.push(Value::Integer(offset));

    Ok(CompiledQuery { sql, params })
}

/// Compiles filters into one `AND`-joined predicate and its parameters.
///
/// Returns an empty predicate when no filter yields a fragment.
pub fn compile_predicate(
    resource: &str,
    table: &str,
    filters: &[Filter],
) -> QueryResult<(String, Vec<Value>)> {
    let mut fragments = Vec::with_capacity(filters.len());
    let mut params = Vec::new();

    for filter in filters {
        let column = format!("{table}.{}", checked_identifier(&filter.field)?);
        let fragment = match &filter.predicate {
            FilterPredicate::In(values) => {
                let placeholders = vec!["?"; values.len()].join(",");
                params.extend(values.iter().map(to_sql_value));
                format!("{column} IN ({placeholders})")
            }
            FilterPredicate::Bool(true) => format!("{column} = 1"),
            FilterPredicate::Bool(false) => format!("{column} = 0"),
            FilterPredicate::NullCheck { negated: false } => format!("{column} IS NULL"),
            FilterPredicate::NullCheck { negated: true } => format!("{column} IS NOT NULL"),
            FilterPredicate::Comparison(value) => {
                params.push(to_sql_value(value));
                format!("{column} {} (?)", filter.operator)
            }
            FilterPredicate::Like(pattern) => {
                params.push(Value::Text(pattern.clone()));
                format!("{column} LIKE (?)")
            }
            FilterPredicate::Omitted(reason) => {
                log_omission(resource, filter, *reason);
                continue;
            }
        };
        fragments.push(fragment);
    }

    Ok((fragments.join(" AND "), params))
}

/// Compiles sort terms into an `ORDER BY` body; empty when there are none.
pub fn compile_order_by(table: &str, sort: &[SortTerm]) -> QueryResult<String> {
    let terms = sort
        .iter()
        .map(|term| -> QueryResult<String> {
            let field = checked_identifier(&term.field)?;
            let direction = checked_direction(&term.direction)?;
            Ok(format!("{table}.{field} {direction}"))
        })
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(terms.join(", "))
}

fn log_omission(resource: &str, filter: &Filter, reason: OmissionReason) {
    match reason {
        OmissionReason::DegenerateInList => debug!(
            "event=search_compile module=search status=omitted resource={} field={} operator={} reason={}",
            resource,
            filter.field,
            filter.operator,
            reason.as_str()
        ),
        OmissionReason::NullSentinelOperator => warn!(
            "event=search_compile module=search status=omitted resource={} field={} operator={} reason={}",
            resource,
            filter.field,
            filter.operator,
            reason.as_str()
        ),
    }
}

fn checked_identifier(identifier: &str) -> QueryResult<&str> {
    if IDENTIFIER_RE.is_match(identifier) {
        Ok(identifier)
    } else {
        Err(SearchError::InvalidData(format!(
            "refusing to compile identifier `{identifier}`"
        )))
    }
}

fn checked_direction(direction: &str) -> QueryResult<&str> {
    if direction.eq_ignore_ascii_case("asc") || direction.eq_ignore_ascii_case("desc") {
        Ok(direction)
    } else {
        Err(SearchError::InvalidData(format!(
            "refusing to compile sort direction `{direction}`"
        )))
    }
}

fn to_sql_value(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Text(text) => Value::Text(text.clone()),
        ScalarValue::Integer(integer) => Value::Integer(*integer),
        ScalarValue::Real(real) => Value::Real(*real),
        ScalarValue::Bool(flag) => Value::Integer(i64::from(*flag)),
        ScalarValue::Null => Value::Null,
    }
}
