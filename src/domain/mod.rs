//! Domain models for the reading tracker
//!
//! Contains the shelf rules without any I/O concerns.

mod book;
mod library;
mod shelf;

pub use book::{
    primary_author, secure_cover_url, BookRecord, PLACEHOLDER_COVER, UNKNOWN_AUTHOR, UNTITLED,
};
pub use library::{AddOutcome, Library, MoveOutcome, RemoveOutcome};
pub use shelf::{ShelfKey, ShelfParseError};
