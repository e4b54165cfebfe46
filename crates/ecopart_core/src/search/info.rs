//! Pagination metadata derived from one search result.

use crate::search::model::{Page, SearchInfo, SearchResult};

/// Builds `SearchInfo` for `result` fetched with `page`.
///
/// `pages` is `ceil(total / limit)` floored at 1, so an empty search still
/// reports one page. A zero limit also reports one page.
pub fn compute_search_info<T>(result: &SearchResult<T>, page: Page) -> SearchInfo {
    let pages = match page.limit {
        0 => 1,
        limit => result.total.div_ceil(u64::from(limit)).max(1),
    };

    SearchInfo {
        total: result.total,
        limit: page.limit,
        total_on_page: result.items.len() as u64,
        page: page.page,
        pages,
    }
}
