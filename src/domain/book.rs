//! Book records
//!
//! A [`BookRecord`] is the normalized form of a catalog volume, and the only
//! shape ever stored on a shelf. All defaulting of optional catalog fields
//! happens in [`BookRecord::from_volume`].

use serde::{Deserialize, Serialize};

use crate::catalog::{ImageLinks, Volume};

/// Author used when the catalog lists none
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Title used when the catalog omits one
pub const UNTITLED: &str = "Untitled";

/// Cover used when the catalog has no usable image link
pub const PLACEHOLDER_COVER: &str = "https://via.placeholder.com/128x192?text=No+Cover";

/// A book as stored on a shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Catalog-assigned identifier
    pub id: String,
    pub title: String,
    pub author: String,
    /// Cover image URL (always https, or the placeholder)
    #[serde(rename = "cover")]
    pub cover_url: String,
}

impl BookRecord {
    /// Creates a record from already-normalized fields
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        cover_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            cover_url: cover_url.into(),
        }
    }

    /// Normalizes a catalog volume into a record
    pub fn from_volume(volume: &Volume) -> Self {
        let info = &volume.volume_info;

        let title = info
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED);

        Self {
            id: volume.id.trim().to_string(),
            title: title.to_string(),
            author: primary_author(info.authors.as_deref()).to_string(),
            cover_url: secure_cover_url(info.image_links.as_ref()),
        }
    }

    /// Replaces blank title, author or cover with their defaults
    ///
    /// Returns true if any field changed.
    pub fn fill_defaults(&mut self) -> bool {
        let mut changed = false;
        for (field, default) in [
            (&mut self.title, UNTITLED),
            (&mut self.author, UNKNOWN_AUTHOR),
            (&mut self.cover_url, PLACEHOLDER_COVER),
        ] {
            if field.trim().is_empty() {
                *field = default.to_string();
                changed = true;
            }
        }
        changed
    }
}

/// First listed author, or [`UNKNOWN_AUTHOR`]
pub fn primary_author(authors: Option<&[String]>) -> &str {
    authors
        .and_then(|a| a.first())
        .map(String::as_str)
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
}

/// Picks the best cover link and upgrades it to https
///
/// Prefers `thumbnail`, then `smallThumbnail`; falls back to
/// [`PLACEHOLDER_COVER`] when neither yields a non-empty URL.
pub fn secure_cover_url(links: Option<&ImageLinks>) -> String {
    let Some(links) = links else {
        return PLACEHOLDER_COVER.to_string();
    };

    let url = links
        .thumbnail
        .as_deref()
        .filter(|u| !u.is_empty())
        .or(links.small_thumbnail.as_deref())
        .unwrap_or("")
        .replacen("http://", "https://", 1);

    if url.is_empty() {
        PLACEHOLDER_COVER.to_string()
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VolumeInfo;

    fn volume(info: VolumeInfo) -> Volume {
        Volume {
            id: "zyTCAlFPjgYC".to_string(),
            volume_info: info,
        }
    }

    fn links(thumbnail: Option<&str>, small: Option<&str>) -> ImageLinks {
        ImageLinks {
            thumbnail: thumbnail.map(String::from),
            small_thumbnail: small.map(String::from),
        }
    }

    #[test]
    fn full_volume_keeps_fields() {
        let record = BookRecord::from_volume(&volume(VolumeInfo {
            title: Some("The Google Story".to_string()),
            authors: Some(vec!["David A. Vise".to_string(), "Mark Malseed".to_string()]),
            image_links: Some(links(Some("https://books.google.com/t.jpg"), None)),
        }));

        assert_eq!(record.id, "zyTCAlFPjgYC");
        assert_eq!(record.title, "The Google Story");
        assert_eq!(record.author, "David A. Vise");
        assert_eq!(record.cover_url, "https://books.google.com/t.jpg");
    }

    #[test]
    fn missing_authors_default() {
        let record = BookRecord::from_volume(&volume(VolumeInfo {
            title: Some("Anonymous".to_string()),
            ..Default::default()
        }));
        assert_eq!(record.author, UNKNOWN_AUTHOR);

        assert_eq!(primary_author(Some(&[])), UNKNOWN_AUTHOR);
        assert_eq!(primary_author(Some(&["  ".to_string()])), UNKNOWN_AUTHOR);
    }

    #[test]
    fn missing_title_defaults() {
        let record = BookRecord::from_volume(&volume(VolumeInfo::default()));
        assert_eq!(record.title, UNTITLED);
    }

    #[test]
    fn cover_prefers_thumbnail() {
        let url = secure_cover_url(Some(&links(Some("https://a/t"), Some("https://a/s"))));
        assert_eq!(url, "https://a/t");
    }

    #[test]
    fn cover_falls_back_to_small_thumbnail() {
        let url = secure_cover_url(Some(&links(None, Some("https://a/s"))));
        assert_eq!(url, "https://a/s");

        let url = secure_cover_url(Some(&links(Some(""), Some("https://a/s"))));
        assert_eq!(url, "https://a/s");
    }

    #[test]
    fn cover_is_upgraded_to_https() {
        let url = secure_cover_url(Some(&links(Some("http://books.google.com/x?zoom=1"), None)));
        assert_eq!(url, "https://books.google.com/x?zoom=1");
    }

    #[test]
    fn cover_placeholder_when_absent() {
        assert_eq!(secure_cover_url(None), PLACEHOLDER_COVER);
        assert_eq!(secure_cover_url(Some(&links(None, None))), PLACEHOLDER_COVER);
        assert_eq!(secure_cover_url(Some(&links(Some(""), Some("")))), PLACEHOLDER_COVER);
    }

    #[test]
    fn serializes_cover_field_name() {
        let record = BookRecord::new("B1", "T", "A", "U");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "B1", "title": "T", "author": "A", "cover": "U"})
        );
    }

    #[test]
    fn fill_defaults_repairs_blank_fields() {
        let mut record = BookRecord::new("B1", " ", "", "");

        assert!(record.fill_defaults());
        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.author, UNKNOWN_AUTHOR);
        assert_eq!(record.cover_url, PLACEHOLDER_COVER);

        let mut complete = BookRecord::new("B2", "T", "A", "U");
        assert!(!complete.fill_defaults());
        assert_eq!(complete, BookRecord::new("B2", "T", "A", "U"));
    }
}
