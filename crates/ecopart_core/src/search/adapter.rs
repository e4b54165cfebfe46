//! Resource adapter seam of the generic search engine.

use crate::search::error::QueryResult;
use crate::search::store::SqlRow;

/// Page size used when neither the caller nor the resource specifies one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Static description of one searchable resource.
///
/// The enrichment join and projection are fixed per resource; they are never
/// reachable from the filter grammar because filter and sort fields are
/// always qualified with [`ResourceAdapter::table`].
pub trait ResourceAdapter {
    /// Public response shape of one row.
    type Item;

    /// Stable resource name used in log events.
    fn resource(&self) -> &'static str;

    /// Base table holding every filterable and sortable column.
    fn table(&self) -> &'static str;

    /// Select list; each column aliased to the name `map_row` reads.
    fn projection(&self) -> &'static str;

    /// Optional `LEFT JOIN ...` clause for display enrichment.
    fn enrichment_join(&self) -> Option<&'static str> {
        None
    }

    fn default_limit(&self) -> u32 {
        DEFAULT_PAGE_LIMIT
    }

    /// Maps one stored row to the public shape.
    fn map_row(&self, row: &SqlRow) -> QueryResult<Self::Item>;
}
