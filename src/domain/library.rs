//! The library: three ordered shelves of books
//!
//! [`Library`] holds the shelf contents and enforces membership rules:
//!
//! - a book id appears on at most one shelf
//! - a book id appears at most once within a shelf
//! - insertion order is display order; a moved book goes to the end of its
//!   new shelf
//!
//! This type does no I/O. Persistence is layered on top by
//! [`crate::storage::LibraryStore`].

use serde::{Deserialize, Serialize};

use super::book::BookRecord;
use super::shelf::ShelfKey;

/// Result of adding a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Appended to the requested shelf
    Added,
    /// Already on a shelf (possibly a different one); nothing changed
    AlreadyShelved(ShelfKey),
}

/// Result of removing a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Result of moving a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: ShelfKey, to: ShelfKey },
    /// Already on the target shelf; order left untouched
    AlreadyThere,
    NotFound,
}

/// Books grouped into the three shelves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    #[serde(rename = "toRead")]
    to_read: Vec<BookRecord>,
    reading: Vec<BookRecord>,
    completed: Vec<BookRecord>,
}

impl Library {
    /// Creates a library with three empty shelves
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered contents of a shelf
    pub fn shelf(&self, key: ShelfKey) -> &[BookRecord] {
        match key {
            ShelfKey::ToRead => &self.to_read,
            ShelfKey::Reading => &self.reading,
            ShelfKey::Completed => &self.completed,
        }
    }

    fn shelf_mut(&mut self, key: ShelfKey) -> &mut Vec<BookRecord> {
        match key {
            ShelfKey::ToRead => &mut self.to_read,
            ShelfKey::Reading => &mut self.reading,
            ShelfKey::Completed => &mut self.completed,
        }
    }

    /// Number of books on a shelf
    pub fn count(&self, key: ShelfKey) -> usize {
        self.shelf(key).len()
    }

    /// Total number of books across all shelves
    pub fn len(&self) -> usize {
        ShelfKey::ALL.iter().map(|&k| self.count(k)).sum()
    }

    /// Returns true if every shelf is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The shelf currently holding `id`, if any
    pub fn locate(&self, id: &str) -> Option<ShelfKey> {
        ShelfKey::ALL
            .into_iter()
            .find(|&key| self.shelf(key).iter().any(|b| b.id == id))
    }

    /// The stored record for `id`, if any
    pub fn find(&self, id: &str) -> Option<&BookRecord> {
        ShelfKey::ALL
            .into_iter()
            .flat_map(|key| self.shelf(key).iter())
            .find(|b| b.id == id)
    }

    /// Appends `record` to `key` unless its id is already shelved anywhere
    ///
    /// An id already present on another shelf is left where it is.
    pub fn add(&mut self, record: BookRecord, key: ShelfKey) -> AddOutcome {
        if let Some(existing) = self.locate(&record.id) {
            return AddOutcome::AlreadyShelved(existing);
        }
        self.shelf_mut(key).push(record);
        AddOutcome::Added
    }

    /// Removes `id` from `key`; other shelves are not touched
    pub fn remove(&mut self, id: &str, key: ShelfKey) -> RemoveOutcome {
        let shelf = self.shelf_mut(key);
        let before = shelf.len();
        shelf.retain(|b| b.id != id);
        if shelf.len() == before {
            RemoveOutcome::NotFound
        } else {
            RemoveOutcome::Removed
        }
    }

    /// Moves `id` to the end of `target`
    pub fn move_to(&mut self, id: &str, target: ShelfKey) -> MoveOutcome {
        let Some(source) = self.locate(id) else {
            return MoveOutcome::NotFound;
        };
        if source == target {
            return MoveOutcome::AlreadyThere;
        }

        let from = self.shelf_mut(source);
        let Some(index) = from.iter().position(|b| b.id == id) else {
            return MoveOutcome::NotFound;
        };
        let record = from.remove(index);
        self.shelf_mut(target).push(record);

        MoveOutcome::Moved {
            from: source,
            to: target,
        }
    }

    /// Drops entries that break the membership rules, keeping the first
    /// occurrence of each id in shelf order, and refills blank fields of the
    /// entries that remain
    ///
    /// Returns the number of entries dropped. Used on data read from disk,
    /// which may have been edited by hand.
    pub fn enforce_unique(&mut self) -> usize {
        let mut seen = std::collections::HashSet::new();
        let mut dropped = 0;

        for key in ShelfKey::ALL {
            let shelf = self.shelf_mut(key);
            let before = shelf.len();
            shelf.retain(|b| !b.id.trim().is_empty() && seen.insert(b.id.clone()));
            dropped += before - shelf.len();

            for book in shelf.iter_mut() {
                book.fill_defaults();
            }
        }

        dropped
    }
}
