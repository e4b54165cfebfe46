//! Minimal store-access boundary used by compiled searches.
//!
//! # Responsibility
//! - Execute one compiled statement and hand back owned rows.
//! - Keep row decoding helpers independent from `rusqlite::Row` lifetimes.
//!
//! # Invariants
//! - `execute` is called at most once per list request.
//! - Store errors are propagated unchanged; nothing is retried here.

use crate::search::compiler::CompiledQuery;
use crate::search::error::{QueryResult, SearchError};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::sync::Arc;

/// Executes compiled statements against a relational store.
pub trait SearchStore {
    fn execute(&self, query: &CompiledQuery) -> QueryResult<Vec<SqlRow>>;
}

/// SQLite-backed store over a migrated connection.
pub struct SqliteSearchStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSearchStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SearchStore for SqliteSearchStore<'_> {
    fn execute(&self, query: &CompiledQuery) -> QueryResult<Vec<SqlRow>> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..columns.len())
                .map(|index| row.get::<_, Value>(index))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            out.push(SqlRow::new(Arc::clone(&columns), values));
        }

        Ok(out)
    }
}

/// Owned result row addressed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl SqlRow {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .unzip();
        Self::new(columns.into(), values)
    }

    pub fn get(&self, column: &str) -> QueryResult<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
            .ok_or_else(|| SearchError::InvalidData(format!("missing column `{column}`")))
    }

    pub fn integer(&self, column: &str) -> QueryResult<i64> {
        self.opt_integer(column)?
            .ok_or_else(|| SearchError::InvalidData(format!("unexpected NULL in `{column}`")))
    }

    pub fn opt_integer(&self, column: &str) -> QueryResult<Option<i64>> {
        match self.get(column)? {
            Value::Integer(value) => Ok(Some(*value)),
            Value::Null => Ok(None),
            other => Err(type_mismatch(column, "integer", other)),
        }
    }

    pub fn text(&self, column: &str) -> QueryResult<String> {
        self.opt_text(column)?
            .ok_or_else(|| SearchError::InvalidData(format!("unexpected NULL in `{column}`")))
    }

    pub fn opt_text(&self, column: &str) -> QueryResult<Option<String>> {
        match self.get(column)? {
            Value::Text(value) => Ok(Some(value.clone())),
            Value::Null => Ok(None),
            other => Err(type_mismatch(column, "text", other)),
        }
    }

    /// Reads a `0`/`1` integer column as a boolean.
    pub fn flag(&self, column: &str) -> QueryResult<bool> {
        match self.integer(column)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SearchError::InvalidData(format!(
                "invalid boolean value `{other}` in `{column}`"
            ))),
        }
    }
}

fn type_mismatch(column: &str, expected: &str, found: &Value) -> SearchError {
    SearchError::InvalidData(format!(
        "expected {expected} in `{column}`, found {:?}",
        found.data_type()
    ))
}
