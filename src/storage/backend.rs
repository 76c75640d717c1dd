//! Library persistence backends
//!
//! The library is always written as one whole JSON document. The file
//! backend writes through a temp file + rename so readers never see a
//! partial document, and serializes writers with an exclusive lock on a
//! `library.json.lock` sidecar held across each load-modify-save cycle.

use std::cell::{Cell, RefCell};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::Library;

/// Somewhere a library snapshot can be loaded from and saved to
pub trait LibraryBackend {
    /// Loads the stored library
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored document is
    /// not a library. Errors are reserved for storage that exists but cannot
    /// be read.
    fn load(&self) -> Result<Option<Library>>;

    /// Replaces the stored library with `library`
    ///
    /// Callers that loaded the library first should hold [`lock`](Self::lock)
    /// across the load and the save.
    fn save(&self, library: &Library) -> Result<()>;

    /// Takes the exclusive lock that serializes writers
    fn lock(&self) -> Result<LibraryLock> {
        Ok(LibraryLock::unshared())
    }

    /// Short description for log messages
    fn describe(&self) -> String;
}

/// Exclusive hold on a stored library
///
/// The lock is released when this is dropped.
#[derive(Debug)]
pub struct LibraryLock {
    _file: Option<File>,
}

impl LibraryLock {
    /// A lock for storage no other process can see
    pub fn unshared() -> Self {
        Self { _file: None }
    }
}

/// Parses a stored document, treating any shape mismatch as absent
pub fn parse_library(content: &str, source: &str) -> Option<Library> {
    if content.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Library>(content) {
        Ok(library) => Some(library),
        Err(e) => {
            tracing::warn!(%source, error = %e, "stored library is malformed, starting empty");
            None
        }
    }
}

/// Library stored as a JSON file
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the library file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Sidecar file that carries the writer lock
    ///
    /// `library.json` itself is replaced on every save, so a lock on it would
    /// not survive the rename.
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

impl LibraryBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<Library>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open library: {}", self.path.display()))?;

        let mut content = String::new();
        if let Err(e) = file.read_to_string(&mut content) {
            // Not UTF-8 (or unreadable mid-way): same as any other bad shape
            tracing::warn!(path = %self.path.display(), error = %e, "could not read library text");
            return Ok(None);
        }

        Ok(parse_library(&content, &self.describe()))
    }

    fn save(&self, library: &Library) -> Result<()> {
        self.ensure_parent()?;

        let temp_path = self.temp_path();

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, library)
                .context("Failed to serialize library")?;
            writeln!(writer).context("Failed to write library")?;
            writer.flush().context("Failed to flush library")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    fn lock(&self) -> Result<LibraryLock> {
        self.ensure_parent()?;

        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        // Blocks while another process is mid-update
        file.lock_exclusive()
            .context("Failed to acquire write lock on library")?;

        Ok(LibraryLock { _file: Some(file) })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory backend (for testing)
///
/// Holds the last saved document as JSON text so loads go through the same
/// parsing path as the file backend.
#[derive(Default)]
pub struct MemoryBackend {
    document: RefCell<Option<String>>,
    failing: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given raw document
    pub fn with_document(document: impl Into<String>) -> Self {
        let backend = Self::default();
        *backend.document.borrow_mut() = Some(document.into());
        backend
    }

    /// Makes subsequent saves fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Raw stored document, if any
    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl LibraryBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Library>> {
        Ok(self
            .document
            .borrow()
            .as_deref()
            .and_then(|doc| parse_library(doc, "memory")))
    }

    fn save(&self, library: &Library) -> Result<()> {
        if self.failing.get() {
            anyhow::bail!("storage unavailable");
        }
        let json = serde_json::to_string(library).context("Failed to serialize library")?;
        *self.document.borrow_mut() = Some(json);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

impl<B: LibraryBackend + ?Sized> LibraryBackend for std::rc::Rc<B> {
    fn load(&self) -> Result<Option<Library>> {
        (**self).load()
    }

    fn save(&self, library: &Library) -> Result<()> {
        (**self).save(library)
    }

    fn lock(&self) -> Result<LibraryLock> {
        (**self).lock()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookRecord, ShelfKey};
    use tempfile::TempDir;

    fn sample() -> Library {
        let mut library = Library::new();
        library.add(BookRecord::new("a", "Dune", "Frank Herbert", "https://c/a"), ShelfKey::ToRead);
        library.add(BookRecord::new("b", "Emma", "Jane Austen", "https://c/b"), ShelfKey::ToRead);
        library.add(BookRecord::new("c", "Ulysses", "James Joyce", "https://c/c"), ShelfKey::Completed);
        library
    }

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("library.json"));

        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("library.json"));

        let library = sample();
        backend.save(&library).unwrap();

        assert_eq!(backend.load().unwrap(), Some(library));
    }

    #[test]
    fn malformed_file_loads_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        let backend = JsonFileBackend::new(&path);

        for content in ["not json", "[]", r#"{"toRead": "x"}"#, r#"{"shelves": {}}"#, ""] {
            fs::write(&path, content).unwrap();
            assert!(backend.load().unwrap().is_none(), "content: {}", content);
        }

        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested").join("library.json"));

        backend.save(&Library::new()).unwrap();

        assert!(backend.path().exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("library.json"));

        backend.save(&sample()).unwrap();

        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn lock_is_exclusive_until_dropped() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("library.json"));

        let lock = backend.lock().unwrap();
        let other = OpenOptions::new()
            .write(true)
            .open(backend.lock_path())
            .unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(lock);
        assert!(other.try_lock_exclusive().is_ok());
    }

    #[test]
    fn lock_survives_saves() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("library.json"));

        let _lock = backend.lock().unwrap();
        backend.save(&sample()).unwrap();
        backend.save(&Library::new()).unwrap();

        assert!(backend.lock_path().exists());
        assert_eq!(backend.load().unwrap(), Some(Library::new()));
    }

    #[test]
    fn save_into_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let backend = JsonFileBackend::new(blocker.join("library.json"));

        assert!(backend.save(&sample()).is_err());
    }

    #[test]
    fn stored_layout_uses_shelf_keys() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("library.json"));
        backend.save(&sample()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(backend.path()).unwrap()).unwrap();

        assert_eq!(raw["toRead"][0]["id"], "a");
        assert_eq!(raw["toRead"][1]["cover"], "https://c/b");
        assert_eq!(raw["reading"], serde_json::json!([]));
        assert_eq!(raw["completed"][0]["author"], "James Joyce");
    }

    #[test]
    fn memory_backend_round_trip() {
        let backend = MemoryBackend::new();
        assert!(backend.load().unwrap().is_none());

        backend.save(&sample()).unwrap();
        assert_eq!(backend.load().unwrap(), Some(sample()));
        assert_eq!(backend.saves(), 1);
    }

    #[test]
    fn memory_backend_failing() {
        let backend = MemoryBackend::new();
        backend.set_failing(true);

        assert!(backend.save(&sample()).is_err());
        assert!(backend.document().is_none());
    }
}
