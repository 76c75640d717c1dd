//! Library store
//!
//! [`LibraryStore`] is the single owner of the library for the lifetime of
//! a command. It applies the [`Library`] rules and saves the whole snapshot
//! through its backend after every change.
//!
//! Every mutation runs under the backend lock against a fresh copy of the
//! stored library, so changes made by another process since this store was
//! opened are kept rather than overwritten.
//!
//! A failed save never undoes the change: the in-memory library stays
//! correct, the failure is logged, and a [`PersistWarning`] is kept for the
//! caller to report.

use std::fmt;

use anyhow::Result;
use thiserror::Error;

use super::backend::{LibraryBackend, MemoryBackend};
use crate::domain::{AddOutcome, BookRecord, Library, MoveOutcome, RemoveOutcome, ShelfKey};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Book id must not be empty")]
    EmptyId,
}

/// A save that did not reach storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistWarning {
    pub target: String,
    pub message: String,
}

impl fmt::Display for PersistWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "changes were not saved to {} ({}); they are kept for this session only",
            self.target, self.message
        )
    }
}

pub struct LibraryStore {
    library: Library,
    backend: Box<dyn LibraryBackend>,
    warning: Option<PersistWarning>,

    /// The in-memory library holds changes the last save did not write
    unsaved: bool,
}

/// Repairs a stored library that may have been edited by hand
fn sanitize(stored: Option<Library>, source: &str) -> Library {
    let mut library = stored.unwrap_or_default();

    let dropped = library.enforce_unique();
    if dropped > 0 {
        tracing::warn!(
            target_store = %source,
            dropped,
            "dropped duplicate or id-less entries from stored library"
        );
    }

    library
}

impl LibraryStore {
    /// Loads the library from `backend`, starting empty if nothing usable is stored
    pub fn open(backend: impl LibraryBackend + 'static) -> Result<Self> {
        let library = sanitize(backend.load()?, &backend.describe());

        tracing::debug!(
            source = %backend.describe(),
            books = library.len(),
            "library loaded"
        );

        Ok(Self {
            library,
            backend: Box::new(backend),
            warning: None,
            unsaved: false,
        })
    }

    /// An empty store that keeps everything in memory
    pub fn in_memory() -> Self {
        Self {
            library: Library::new(),
            backend: Box::new(MemoryBackend::new()),
            warning: None,
            unsaved: false,
        }
    }

    /// The whole library
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Ordered contents of a shelf
    pub fn snapshot(&self, shelf: ShelfKey) -> &[BookRecord] {
        self.library.shelf(shelf)
    }

    /// Number of books on a shelf
    pub fn count(&self, shelf: ShelfKey) -> usize {
        self.library.count(shelf)
    }

    /// The shelf currently holding `id`
    pub fn locate(&self, id: &str) -> Option<ShelfKey> {
        self.library.locate(id)
    }

    /// The stored record for `id`
    pub fn find(&self, id: &str) -> Option<&BookRecord> {
        self.library.find(id)
    }

    /// Adds `record` to `shelf` unless its id is already shelved
    pub fn add_book(&mut self, record: BookRecord, shelf: ShelfKey) -> Result<AddOutcome, StoreError> {
        if record.id.trim().is_empty() {
            return Err(StoreError::EmptyId);
        }

        let id = record.id.clone();
        let outcome = self.mutate(|library| {
            let outcome = library.add(record, shelf);
            (outcome, outcome == AddOutcome::Added)
        });
        match outcome {
            AddOutcome::Added => tracing::debug!(%id, %shelf, "book added"),
            AddOutcome::AlreadyShelved(existing) => {
                tracing::debug!(%id, requested = %shelf, %existing, "book already shelved, not added");
            }
        }
        Ok(outcome)
    }

    /// Removes `id` from `shelf`
    pub fn remove_book(&mut self, id: &str, shelf: ShelfKey) -> RemoveOutcome {
        let outcome = self.mutate(|library| {
            let outcome = library.remove(id, shelf);
            (outcome, outcome == RemoveOutcome::Removed)
        });
        if outcome == RemoveOutcome::Removed {
            tracing::debug!(%id, %shelf, "book removed");
        }
        outcome
    }

    /// Moves `id` to the end of `target`
    pub fn move_book(&mut self, id: &str, target: ShelfKey) -> MoveOutcome {
        let outcome = self.mutate(|library| {
            let outcome = library.move_to(id, target);
            (outcome, matches!(outcome, MoveOutcome::Moved { .. }))
        });
        if let MoveOutcome::Moved { from, to } = outcome {
            tracing::debug!(%id, %from, %to, "book moved");
        }
        outcome
    }

    /// Saves the full snapshot, returning any failure to the caller
    pub fn persist(&mut self) -> Result<()> {
        let _lock = self.backend.lock()?;
        self.backend.save(&self.library)?;
        self.warning = None;
        self.unsaved = false;
        Ok(())
    }

    /// Re-reads the library from the backend, discarding in-memory state
    pub fn reload(&mut self) -> Result<()> {
        self.library = sanitize(self.backend.load()?, &self.backend.describe());
        self.unsaved = false;
        Ok(())
    }

    /// Takes the warning left by the last failed save, if any
    pub fn take_warning(&mut self) -> Option<PersistWarning> {
        self.warning.take()
    }

    /// Applies `change` to the current stored library under the backend lock
    ///
    /// `change` returns its result and whether it modified the library; only
    /// modifications are saved. Unsaved changes from an earlier failed save
    /// are kept instead of being replaced by the stored copy.
    fn mutate<T>(&mut self, change: impl FnOnce(&mut Library) -> (T, bool)) -> T {
        let lock = match self.backend.lock() {
            Ok(lock) => Some(lock),
            Err(e) => {
                tracing::warn!(
                    target_store = %self.backend.describe(),
                    error = %format!("{:#}", e),
                    "could not lock library, changing the loaded copy"
                );
                None
            }
        };

        if lock.is_some() && !self.unsaved {
            self.refresh();
        }

        let (result, changed) = change(&mut self.library);
        if changed {
            self.save();
        }

        drop(lock);
        result
    }

    /// Picks up changes other processes saved since this store loaded
    fn refresh(&mut self) {
        match self.backend.load() {
            Ok(stored) => self.library = sanitize(stored, &self.backend.describe()),
            Err(e) => tracing::warn!(
                target_store = %self.backend.describe(),
                error = %format!("{:#}", e),
                "could not re-read library, changing the loaded copy"
            ),
        }
    }

    fn save(&mut self) {
        match self.backend.save(&self.library) {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                let warning = PersistWarning {
                    target: self.backend.describe(),
                    message: format!("{:#}", e),
                };
                tracing::warn!(target_store = %warning.target, error = %warning.message, "failed to save library");
                self.warning = Some(warning);
                self.unsaved = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileBackend;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn record(id: &str) -> BookRecord {
        BookRecord::new(id, format!("Title {}", id), "Author", "https://cover")
    }

    fn ids(store: &LibraryStore, shelf: ShelfKey) -> Vec<String> {
        store.snapshot(shelf).iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn scenario_add_move_remove() {
        let mut store = LibraryStore::in_memory();

        let outcome = store
            .add_book(BookRecord::new("B1", "T", "A", "U"), ShelfKey::ToRead)
            .unwrap();
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(ids(&store, ShelfKey::ToRead), vec!["B1"]);

        store.move_book("B1", ShelfKey::Reading);
        assert!(store.snapshot(ShelfKey::ToRead).is_empty());
        assert_eq!(ids(&store, ShelfKey::Reading), vec!["B1"]);

        store.remove_book("B1", ShelfKey::Reading);
        assert!(store.snapshot(ShelfKey::Reading).is_empty());
    }

    #[test]
    fn empty_id_is_rejected() {
        let mut store = LibraryStore::in_memory();

        assert_eq!(
            store.add_book(record(""), ShelfKey::ToRead),
            Err(StoreError::EmptyId)
        );
        assert_eq!(
            store.add_book(record("  "), ShelfKey::ToRead),
            Err(StoreError::EmptyId)
        );
        assert!(store.library().is_empty());
    }

    #[test]
    fn every_change_is_saved() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = LibraryStore::open(Rc::clone(&backend)).unwrap();

        store.add_book(record("a"), ShelfKey::ToRead).unwrap();
        assert_eq!(backend.saves(), 1);

        store.move_book("a", ShelfKey::Completed);
        assert_eq!(backend.saves(), 2);

        store.remove_book("a", ShelfKey::Completed);
        assert_eq!(backend.saves(), 3);

        assert_eq!(backend.load().unwrap(), Some(Library::new()));
    }

    #[test]
    fn no_ops_do_not_save() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = LibraryStore::open(Rc::clone(&backend)).unwrap();
        store.add_book(record("a"), ShelfKey::ToRead).unwrap();

        store.add_book(record("a"), ShelfKey::Reading).unwrap();
        store.move_book("a", ShelfKey::ToRead);
        store.move_book("missing", ShelfKey::ToRead);
        store.remove_book("missing", ShelfKey::ToRead);

        assert_eq!(backend.saves(), 1);
    }

    #[test]
    fn failed_save_keeps_state_and_warns() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = LibraryStore::open(Rc::clone(&backend)).unwrap();
        backend.set_failing(true);

        store.add_book(record("a"), ShelfKey::ToRead).unwrap();

        assert_eq!(store.locate("a"), Some(ShelfKey::ToRead));
        let warning = store.take_warning().unwrap();
        assert_eq!(warning.target, "memory");
        assert!(warning.message.contains("storage unavailable"));
        assert!(store.take_warning().is_none());
    }

    #[test]
    fn explicit_persist_reports_errors() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = LibraryStore::open(Rc::clone(&backend)).unwrap();

        backend.set_failing(true);
        assert!(store.persist().is_err());

        backend.set_failing(false);
        store.persist().unwrap();
        assert_eq!(backend.load().unwrap(), Some(Library::new()));
    }

    #[test]
    fn malformed_document_opens_empty() {
        let store = LibraryStore::open(MemoryBackend::with_document("{\"toRead\": 3}")).unwrap();
        assert!(store.library().is_empty());
    }

    #[test]
    fn open_enforces_uniqueness() {
        let doc = r#"{
            "toRead": [{"id": "a", "title": "A", "author": "x", "cover": "u"}],
            "reading": [{"id": "a", "title": "A", "author": "x", "cover": "u"}],
            "completed": []
        }"#;
        let store = LibraryStore::open(MemoryBackend::with_document(doc)).unwrap();

        assert_eq!(store.count(ShelfKey::ToRead), 1);
        assert_eq!(store.count(ShelfKey::Reading), 0);
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = LibraryStore::open(Rc::clone(&backend)).unwrap();

        let mut other = Library::new();
        other.add(record("z"), ShelfKey::Reading);
        backend.save(&other).unwrap();

        store.reload().unwrap();
        assert_eq!(store.locate("z"), Some(ShelfKey::Reading));
    }

    #[test]
    fn file_round_trip_preserves_shelves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");

        {
            let mut store = LibraryStore::open(JsonFileBackend::new(&path)).unwrap();
            for id in ["a", "b", "c"] {
                store.add_book(record(id), ShelfKey::ToRead).unwrap();
            }
            store.move_book("a", ShelfKey::Reading);
            store.move_book("a", ShelfKey::ToRead);
            store.move_book("b", ShelfKey::Completed);
        }

        let store = LibraryStore::open(JsonFileBackend::new(&path)).unwrap();
        assert_eq!(ids(&store, ShelfKey::ToRead), vec!["c", "a"]);
        assert!(store.snapshot(ShelfKey::Reading).is_empty());
        assert_eq!(ids(&store, ShelfKey::Completed), vec!["b"]);
    }

    #[test]
    fn sessions_sharing_a_file_keep_each_others_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");

        let mut board = LibraryStore::open(JsonFileBackend::new(&path)).unwrap();
        board.add_book(record("a"), ShelfKey::ToRead).unwrap();

        let mut cli = LibraryStore::open(JsonFileBackend::new(&path)).unwrap();
        cli.add_book(record("b"), ShelfKey::ToRead).unwrap();

        // The board's copy predates "b"
        board.move_book("a", ShelfKey::Reading);
        assert_eq!(board.locate("b"), Some(ShelfKey::ToRead));

        let stored = LibraryStore::open(JsonFileBackend::new(&path)).unwrap();
        assert_eq!(ids(&stored, ShelfKey::ToRead), vec!["b"]);
        assert_eq!(ids(&stored, ShelfKey::Reading), vec!["a"]);
    }

    #[test]
    fn stale_session_sees_books_shelved_elsewhere() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");

        let mut first = LibraryStore::open(JsonFileBackend::new(&path)).unwrap();
        let mut second = LibraryStore::open(JsonFileBackend::new(&path)).unwrap();
        second.add_book(record("b"), ShelfKey::Completed).unwrap();

        let outcome = first.add_book(record("b"), ShelfKey::ToRead).unwrap();

        assert_eq!(outcome, AddOutcome::AlreadyShelved(ShelfKey::Completed));
        let stored = LibraryStore::open(JsonFileBackend::new(&path)).unwrap();
        assert_eq!(stored.library().len(), 1);
    }

    #[test]
    fn unsaved_changes_survive_the_next_mutation() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = LibraryStore::open(Rc::clone(&backend)).unwrap();

        backend.set_failing(true);
        store.add_book(record("a"), ShelfKey::ToRead).unwrap();
        assert!(store.take_warning().is_some());

        backend.set_failing(false);
        store.add_book(record("b"), ShelfKey::ToRead).unwrap();

        let saved = backend.load().unwrap().unwrap();
        assert_eq!(saved.locate("a"), Some(ShelfKey::ToRead));
        assert_eq!(saved.locate("b"), Some(ShelfKey::ToRead));
    }

    #[test]
    fn warning_display_mentions_target() {
        let warning = PersistWarning {
            target: "/tmp/library.json".to_string(),
            message: "disk full".to_string(),
        };
        let text = warning.to_string();
        assert!(text.contains("/tmp/library.json"));
        assert!(text.contains("disk full"));
    }
}
