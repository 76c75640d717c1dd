//! Shelf home directory
//!
//! The home directory holds everything the tracker persists:
//!
//! ```text
//! <home>/
//! ├── library.json   # The three shelves
//! ├── library.json.lock  # Writer lock
//! └── config.toml    # Configuration (written with defaults on first use)
//! ```
//!
//! It is `--home`, else `$SHELF_HOME`, else the platform data directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use thiserror::Error;

use super::backend::JsonFileBackend;
use super::config::{Config, DEFAULT_CONFIG_TOML};
use super::store::LibraryStore;

pub const LIBRARY_FILE: &str = "library.json";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum HomeError {
    #[error("Could not determine a data directory; set SHELF_HOME or pass --home")]
    NoDataDir,
}

/// An opened shelf home directory
pub struct Home {
    root: PathBuf,
    config: Config,
}

impl Home {
    /// Platform data directory for the tracker
    pub fn default_root() -> Option<PathBuf> {
        ProjectDirs::from("dev", "shelf", "shelf").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Picks the home directory: an explicit path wins over the default
    pub fn resolve(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(Self::default_root().ok_or(HomeError::NoDataDir)?),
        }
    }

    /// Opens the home directory, creating it and a default config if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create shelf home: {}", root.display()))?;

        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG_TOML)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
            tracing::debug!(path = %config_path.display(), "wrote default config");
        }

        let config = Config::load(&config_path)?;

        Ok(Self { root, config })
    }

    /// Returns the home directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn library_path(&self) -> PathBuf {
        self.root.join(LIBRARY_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Loads the library store backed by `library.json`
    pub fn open_store(&self) -> Result<LibraryStore> {
        LibraryStore::open(JsonFileBackend::new(self.library_path()))
    }
}
