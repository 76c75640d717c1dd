//! # Storage Layer
//!
//! Persistence for the reading tracker.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Library | JSON (one document, all shelves) | `<home>/library.json` |
//! | Config | TOML | `<home>/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - Writers hold an `fs2` exclusive lock on `library.json.lock` from load to save
//! - [`LibraryStore`] re-reads the file under that lock before each change
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Home`] - Entry point for the data directory
//! - [`LibraryStore`] - Owns the library and saves it after every change
//! - [`LibraryBackend`] - Where snapshots go ([`JsonFileBackend`], [`MemoryBackend`])
//! - [`Config`] - Catalog and library settings

mod backend;
mod config;
mod home;
mod store;

pub use backend::{parse_library, JsonFileBackend, LibraryBackend, LibraryLock, MemoryBackend};
pub use config::{CatalogConfig, Config, ConfigError, LibraryConfig, DEFAULT_CATALOG_URL, DEFAULT_CONFIG_TOML};
pub use home::{Home, HomeError, CONFIG_FILE, LIBRARY_FILE};
pub use store::{LibraryStore, PersistWarning, StoreError};
