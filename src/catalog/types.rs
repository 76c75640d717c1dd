//! Wire types for the catalog's volumes API
//!
//! Only the fields the tracker reads are modelled; everything else in the
//! response is ignored. Every field is optional on the wire.

use serde::{Deserialize, Serialize};

/// A single catalog volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub volume_info: VolumeInfo,
}

/// Descriptive metadata of a volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: Option<String>,

    /// Authors in catalog order; the first one is displayed
    #[serde(default)]
    pub authors: Option<Vec<String>>,

    #[serde(default)]
    pub image_links: Option<ImageLinks>,
}

/// Cover image links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub small_thumbnail: Option<String>,
}

/// Response of a volumes query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeList {
    /// Absent when the query matched nothing
    #[serde(default)]
    pub items: Vec<Volume>,
}
