//! List use-case service.
//!
//! # Responsibility
//! - Turn raw caller options into a validated [`SearchRequest`].
//! - Delegate authorization and execution to the repository.
//! - Wrap results with pagination metadata.
//!
//! # Invariants
//! - Grammar failures never reach the repository.
//! - The same `Page` drives both the query and the returned `search_info`.

use crate::repo::search_repo::SearchRepository;
use crate::search::error::QueryResult;
use crate::search::formatter::format_search_options;
use crate::search::info::compute_search_info;
use crate::search::model::{ListResponse, SearchOptions, SearchRequest};
use log::info;

/// Use-case service wrapper for one searchable resource.
pub struct SearchService<R: SearchRepository> {
    repo: R,
}

impl<R: SearchRepository> SearchService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Validates options without touching the store.
    pub fn prepare(&self, options: &SearchOptions) -> QueryResult<SearchRequest> {
        format_search_options(options, self.repo.default_limit()).inspect_err(|err| {
            info!(
                "event=search_format module=search status=rejected resource={} error_code={} error={}",
                self.repo.resource(),
                err.code(),
                err
            );
        })
    }

    /// Lists one page of the resource.
    ///
    /// # Errors
    /// - `Grammar` when page, sort or filter input is malformed.
    /// - `Unauthorized` when a field, operator or direction is not allowed.
    /// - `Db` / `InvalidData` on store or row decoding failures.
    pub fn list(&self, options: &SearchOptions) -> QueryResult<ListResponse<R::Item>> {
        let request = self.prepare(options)?;
        let result = self.repo.search(&request)?;
        let search_info = compute_search_info(&result, request.page);

        Ok(ListResponse {
            items: result.items,
            search_info,
        })
    }
}
