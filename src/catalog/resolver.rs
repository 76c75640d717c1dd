//! Book identity resolution
//!
//! Turns an opaque catalog id into a normalized [`BookRecord`]. Lookups that
//! fail for any reason resolve to `None`; the caller treats that as "no book
//! added" and leaves the library untouched.

use super::client::Catalog;
use crate::domain::BookRecord;

pub struct Resolver<'a> {
    catalog: &'a dyn Catalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self { catalog }
    }

    /// Resolves `id` to a record, or `None` if the lookup failed
    pub fn resolve(&self, id: &str) -> Option<BookRecord> {
        let id = id.trim();

        match self.catalog.volume(id) {
            Ok(volume) => {
                let record = BookRecord::from_volume(&volume);
                if record.id.is_empty() {
                    tracing::warn!(%id, "catalog returned a volume without an id");
                    return None;
                }
                tracing::debug!(id = %record.id, title = %record.title, "resolved volume");
                Some(record)
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to resolve volume");
                None
            }
        }
    }
}
