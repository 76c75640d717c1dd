//! Free-text search for candidate books

use super::client::{Catalog, CatalogError, VolumeQuery};
use crate::domain::BookRecord;
use crate::storage::CatalogConfig;

/// Queries shorter than this return no candidates without a request
pub const MIN_QUERY_LEN: usize = 2;

/// Searches the catalog and normalizes each hit
///
/// Hits without an id are skipped since they could never be shelved.
pub fn search(
    catalog: &dyn Catalog,
    config: &CatalogConfig,
    query: &str,
) -> Result<Vec<BookRecord>, CatalogError> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        tracing::debug!(%query, "query too short, skipping search");
        return Ok(Vec::new());
    }

    let request = VolumeQuery::new(query, config.search_results).lang(config.lang.as_str());
    let volumes = catalog.query(&request)?;

    Ok(volumes
        .iter()
        .map(BookRecord::from_volume)
        .filter(|r| !r.id.is_empty())
        .collect())
}
