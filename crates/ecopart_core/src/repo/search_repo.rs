//! Generic searchable repository.
//!
//! # Responsibility
//! - Authorize validated requests against the injected resource policy.
//! - Compile and execute exactly one statement per request.
//! - Shape stored rows into `{items, total}`.
//!
//! # Invariants
//! - Authorization failures never reach the store.
//! - Partial results are never returned: either every row maps or the
//!   request fails.

use crate::search::adapter::ResourceAdapter;
use crate::search::compiler::{compile_search, TOTAL_COLUMN};
use crate::search::error::{QueryResult, SearchError};
use crate::search::model::{SearchRequest, SearchResult};
use crate::search::policy::ResourcePolicy;
use crate::search::store::{SearchStore, SqlRow};
use log::{debug, error, info};
use std::time::Instant;

/// Repository interface consumed by the list use-case.
pub trait SearchRepository {
    type Item;

    /// Stable resource name used in log events.
    fn resource(&self) -> &'static str;

    /// Page size applied when the caller sends no limit.
    fn default_limit(&self) -> u32;

    /// Authorizes, compiles and runs one validated list request.
    fn search(&self, request: &SearchRequest) -> QueryResult<SearchResult<Self::Item>>;
}

/// One resource adapter + policy + store, wired as a repository.
pub struct ResourceRepository<A, S> {
    adapter: A,
    policy: ResourcePolicy,
    store: S,
}

impl<A, S> ResourceRepository<A, S> {
    /// Builds a repository with an explicit allowlist.
    pub fn with_policy(adapter: A, policy: ResourcePolicy, store: S) -> Self {
        Self {
            adapter,
            policy,
            store,
        }
    }

    pub fn policy(&self) -> &ResourcePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<A, S> SearchRepository for ResourceRepository<A, S>
where
    A: ResourceAdapter,
    S: SearchStore,
{
    type Item = A::Item;

    fn resource(&self) -> &'static str {
        self.adapter.resource()
    }

    fn default_limit(&self) -> u32 {
        self.adapter.default_limit()
    }

    fn search(&self, request: &SearchRequest) -> QueryResult<SearchResult<A::Item>> {
        let started_at = Instant::now();
        let resource = self.adapter.resource();

        if let Err(err) = self.policy.authorize(&request.filters, &request.sort) {
            info!(
                "event=search_execute module=search status=rejected resource={} error_code={} error={}",
                resource,
                err.code(),
                err
            );
            return Err(err);
        }

        let query = compile_search(&self.adapter, request)?;
        debug!(
            "event=search_compile module=search status=ok resource={} params={} sql={}",
            resource,
            query.params.len(),
            query.sql
        );

        let outcome = self
            .store
            .execute(&query)
            .and_then(|rows| shape_rows(&self.adapter, &rows));
        match outcome {
            Ok(result) => {
                info!(
                    "event=search_execute module=search status=ok resource={} filters={} sort_terms={} page={} limit={} total={} returned={} duration_ms={}",
                    resource,
                    request.filters.len(),
                    request.sort.len(),
                    request.page.page,
                    request.page.limit,
                    result.total,
                    result.items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(result)
            }
            Err(err) => {
                error!(
                    "event=search_execute module=search status=error resource={} duration_ms={} error_code={} error={}",
                    resource,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Reads the shared count column and maps every row.
///
/// No rows means `{items: [], total: 0}`.
fn shape_rows<A: ResourceAdapter>(
    adapter: &A,
    rows: &[SqlRow],
) -> QueryResult<SearchResult<A::Item>> {
    let Some(first) = rows.first() else {
        return Ok(SearchResult::empty());
    };

    let total = first.integer(TOTAL_COLUMN)?;
    let total = u64::try_from(total).map_err(|_| {
        SearchError::InvalidData(format!("negative `{TOTAL_COLUMN}` value {total}"))
    })?;
    let items = rows
        .iter()
        .map(|row| adapter.map_row(row))
        .collect::<QueryResult<Vec<_>>>()?;

    Ok(SearchResult { items, total })
}
