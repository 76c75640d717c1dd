//! Catalog client
//!
//! [`Catalog`] is the seam between the tracker and the remote book catalog.
//! [`GoogleBooks`] implements it over the Google Books volumes API; tests
//! substitute an in-memory implementation.

use std::time::Duration;

use thiserror::Error;

use super::types::{Volume, VolumeList};
use crate::storage::CatalogConfig;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid volume id: '{0}'")]
    InvalidId(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Malformed catalog response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Ordering of query results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Relevance,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Relevance => "relevance",
        }
    }
}

/// Parameters of a volumes query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeQuery {
    pub q: String,
    pub max_results: u32,
    pub start_index: Option<u32>,
    pub order_by: Option<OrderBy>,
    pub lang: Option<String>,
}

impl VolumeQuery {
    pub fn new(q: impl Into<String>, max_results: u32) -> Self {
        Self {
            q: q.into(),
            max_results,
            start_index: None,
            order_by: None,
            lang: None,
        }
    }

    pub fn start_index(mut self, index: u32) -> Self {
        self.start_index = Some(index);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        let lang = lang.into();
        self.lang = if lang.is_empty() { None } else { Some(lang) };
        self
    }

    /// Query-string pairs in request order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("q", self.q.clone()),
            ("maxResults", self.max_results.to_string()),
        ];
        if let Some(start) = self.start_index {
            pairs.push(("startIndex", start.to_string()));
        }
        if let Some(order) = self.order_by {
            pairs.push(("orderBy", order.as_str().to_string()));
        }
        if let Some(lang) = &self.lang {
            pairs.push(("langRestrict", lang.clone()));
        }
        pairs
    }
}

/// A remote book catalog
pub trait Catalog {
    /// Looks up a single volume by id
    fn volume(&self, id: &str) -> Result<Volume, CatalogError>;

    /// Runs a free-text query
    fn query(&self, query: &VolumeQuery) -> Result<Vec<Volume>, CatalogError>;
}

/// Google Books volumes API client
pub struct GoogleBooks {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl GoogleBooks {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("shelf-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::HttpClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_text(&self, request: reqwest::blocking::RequestBuilder) -> Result<String, CatalogError> {
        let response = request.send()?;
        let status = response.status();
        let url = response.url().to_string();
        let text = response.text()?;

        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(text)
    }
}

impl Catalog for GoogleBooks {
    fn volume(&self, id: &str) -> Result<Volume, CatalogError> {
        if !is_valid_volume_id(id) {
            return Err(CatalogError::InvalidId(id.to_string()));
        }

        let url = format!("{}/volumes/{}", self.base_url, id);
        tracing::debug!(%url, "fetching volume");

        let text = self.get_text(self.http.get(&url))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn query(&self, query: &VolumeQuery) -> Result<Vec<Volume>, CatalogError> {
        let url = format!("{}/volumes", self.base_url);
        tracing::debug!(%url, q = %query.q, max = query.max_results, "querying volumes");

        let text = self.get_text(self.http.get(&url).query(&query.to_pairs()))?;
        let list: VolumeList = serde_json::from_str(&text)?;
        Ok(list.items)
    }
}

/// Volume ids are short url-safe tokens
pub fn is_valid_volume_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
