//! Shelf keys
//!
//! The library has exactly three shelves. Every place that needs to talk
//! about a shelf (storage key, board column, label, command-line alias) goes
//! through the tables on [`ShelfKey`] so that adding or renaming a shelf is a
//! compile error everywhere it matters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ShelfParseError {
    #[error("Unknown shelf '{0}': expected one of to-read, reading, completed")]
    Unknown(String),
}

/// One of the three fixed shelves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ShelfKey {
    #[default]
    #[serde(rename = "toRead")]
    ToRead,
    #[serde(rename = "reading")]
    Reading,
    #[serde(rename = "completed")]
    Completed,
}

impl ShelfKey {
    /// All shelves in display order
    pub const ALL: [ShelfKey; 3] = [ShelfKey::ToRead, ShelfKey::Reading, ShelfKey::Completed];

    /// Key used in the persisted library document
    pub fn storage_key(self) -> &'static str {
        match self {
            ShelfKey::ToRead => "toRead",
            ShelfKey::Reading => "reading",
            ShelfKey::Completed => "completed",
        }
    }

    /// Column identifier used by the board and the command line
    pub fn column_id(self) -> &'static str {
        match self {
            ShelfKey::ToRead => "to-read",
            ShelfKey::Reading => "reading",
            ShelfKey::Completed => "completed",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            ShelfKey::ToRead => "To Read",
            ShelfKey::Reading => "Reading",
            ShelfKey::Completed => "Completed",
        }
    }

    /// Position in [`ShelfKey::ALL`]
    pub fn index(self) -> usize {
        match self {
            ShelfKey::ToRead => 0,
            ShelfKey::Reading => 1,
            ShelfKey::Completed => 2,
        }
    }

    /// The shelf to the left on the board, if any
    pub fn prev(self) -> Option<ShelfKey> {
        match self {
            ShelfKey::ToRead => None,
            ShelfKey::Reading => Some(ShelfKey::ToRead),
            ShelfKey::Completed => Some(ShelfKey::Reading),
        }
    }

    /// The shelf to the right on the board, if any
    pub fn next(self) -> Option<ShelfKey> {
        match self {
            ShelfKey::ToRead => Some(ShelfKey::Reading),
            ShelfKey::Reading => Some(ShelfKey::Completed),
            ShelfKey::Completed => None,
        }
    }
}

impl fmt::Display for ShelfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_id())
    }
}

impl FromStr for ShelfKey {
    type Err = ShelfParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toread" | "to-read" | "to_read" | "todo" => Ok(ShelfKey::ToRead),
            "reading" | "read" | "current" => Ok(ShelfKey::Reading),
            "completed" | "done" | "finished" => Ok(ShelfKey::Completed),
            _ => Err(ShelfParseError::Unknown(s.to_string())),
        }
    }
}
