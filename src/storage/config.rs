//! Configuration handling
//!
//! Configuration is stored in `config.toml` inside the shelf home directory.
//! Every field is optional; missing fields take the built-in defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ShelfKey;

/// Default catalog endpoint
pub const DEFAULT_CATALOG_URL: &str = "https://www.googleapis.com/books/v1";

/// Written to `config.toml` the first time a home directory is used
pub const DEFAULT_CONFIG_TOML: &str = r#"# shelf configuration

[catalog]
# Volumes API endpoint (overridden by $SHELF_CATALOG_URL)
base_url = "https://www.googleapis.com/books/v1"
# Request timeout in seconds
timeout_secs = 15
# Restrict results to this language
lang = "en"
# Candidates returned by 'shelf search'
search_results = 5
# Books returned by 'shelf recommend'
recommendations = 12

[library]
# Shelf used by 'shelf add' and 'shelf pick' when --shelf is omitted
default_shelf = "toRead"
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Catalog client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the volumes API, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Language restriction for searches and recommendations
    pub lang: String,

    /// Maximum candidates per search
    pub search_results: u32,

    /// Maximum books per recommendation fetch
    pub recommendations: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: 15,
            lang: "en".to_string(),
            search_results: 5,
            recommendations: 12,
        }
    }
}

/// Library behaviour settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Shelf used when a command does not name one
    pub default_shelf: ShelfKey,
}

/// Combined configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub library: LibraryConfig,
}

impl Config {
    /// Parses configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, or defaults if the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Overrides the catalog endpoint (from a flag or the environment)
    pub fn with_catalog_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.catalog.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog.base_url must not be empty".into()));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(ConfigError::Invalid("catalog.timeout_secs must be at least 1".into()));
        }
        if self.catalog.search_results == 0 || self.catalog.recommendations == 0 {
            return Err(ConfigError::Invalid(
                "catalog.search_results and catalog.recommendations must be at least 1".into(),
            ));
        }
        // The volumes API rejects maxResults above 40
        if self.catalog.search_results > 40 || self.catalog.recommendations > 40 {
            return Err(ConfigError::Invalid(
                "catalog.search_results and catalog.recommendations must be at most 40".into(),
            ));
        }
        Ok(())
    }
}
