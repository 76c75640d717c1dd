//! In-memory catalog (for testing and offline use)

use std::collections::HashMap;

use super::client::{Catalog, CatalogError, VolumeQuery};
use super::types::Volume;

/// A fixed set of volumes served from memory
///
/// Queries match case-insensitively on title or author; `start_index` and
/// `max_results` are honoured.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    volumes: Vec<Volume>,
    by_id: HashMap<String, usize>,
    offline: bool,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.by_id.insert(volume.id.clone(), self.volumes.len());
        self.volumes.push(volume);
        self
    }

    /// Makes every request fail as if the network were down
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn check_online(&self) -> Result<(), CatalogError> {
        if self.offline {
            return Err(CatalogError::Unavailable("memory catalog is offline".into()));
        }
        Ok(())
    }
}

impl Catalog for MemoryCatalog {
    fn volume(&self, id: &str) -> Result<Volume, CatalogError> {
        self.check_online()?;
        self.by_id
            .get(id)
            .map(|&i| self.volumes[i].clone())
            .ok_or_else(|| CatalogError::Status {
                status: 404,
                url: format!("memory://volumes/{}", id),
            })
    }

    fn query(&self, query: &VolumeQuery) -> Result<Vec<Volume>, CatalogError> {
        self.check_online()?;
        let needle = query.q.to_lowercase();

        Ok(self
            .volumes
            .iter()
            .filter(|v| {
                let info = &v.volume_info;
                let title = info.title.as_deref().unwrap_or("").to_lowercase();
                let authors = info.authors.as_deref().unwrap_or(&[]).join(" ").to_lowercase();
                title.contains(&needle) || authors.contains(&needle)
            })
            .skip(query.start_index.unwrap_or(0) as usize)
            .take(query.max_results as usize)
            .cloned()
            .collect())
    }
}
