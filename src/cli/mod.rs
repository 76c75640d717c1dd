//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Discover | Browse the catalog | `search`, `recommend` |
//! | Shelve | Put books on shelves | `add`, `pick` |
//! | Organize | Change shelves | `move`, `remove`, `board` |
//! | Inspect | Read the library | `list`, `show`, `status` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod board;
mod discover;
mod output;
mod shelves;
mod utils;

pub use app::{run, Cli, Commands, Context};
pub use output::{Output, OutputFormat};
pub use shelves::{shelve_by_id, Shelving};
