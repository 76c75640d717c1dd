//! # Book Catalog
//!
//! Client side of the remote book catalog (Google Books volumes API).
//!
//! | Piece | Purpose |
//! |-------|---------|
//! | [`Catalog`] | Trait for volume lookup and free-text queries |
//! | [`GoogleBooks`] | HTTP implementation (reqwest, blocking) |
//! | [`MemoryCatalog`] | In-memory implementation for tests |
//! | [`Resolver`] | Volume id to [`BookRecord`](crate::domain::BookRecord), failures become `None` |
//! | [`search()`] | Candidate books for a query |
//! | [`recommend()`] | Shuffled recommendations for a [`Genre`] |

mod client;
mod memory;
mod recommend;
mod resolver;
mod search;
mod types;

pub use client::{is_valid_volume_id, Catalog, CatalogError, GoogleBooks, OrderBy, VolumeQuery};
pub use memory::MemoryCatalog;
pub use recommend::{recommend, recommendation_query, Genre, MAX_START_OFFSET, RANDOM_QUERIES};
pub use resolver::Resolver;
pub use search::{search, MIN_QUERY_LEN};
pub use types::{ImageLinks, Volume, VolumeInfo, VolumeList};
