//! shelf - a local-first reading tracker
//!
//! Books found in a remote catalog are kept on three shelves: to read,
//! reading and completed. The library lives in a single JSON file and is
//! saved after every change.

pub mod catalog;
pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{BookRecord, Library, ShelfKey};
pub use storage::LibraryStore;
