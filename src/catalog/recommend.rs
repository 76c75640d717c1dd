//! Recommendations
//!
//! A recommendation fetch turns a genre into a catalog query, starts at a
//! random offset so repeated fetches differ, and shuffles what comes back.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::client::{Catalog, CatalogError, OrderBy, VolumeQuery};
use crate::domain::BookRecord;
use crate::storage::CatalogConfig;

/// Queries drawn from for the `random` genre
pub const RANDOM_QUERIES: [&str; 16] = [
    "bestseller",
    "award winning",
    "popular",
    "classic literature",
    "contemporary",
    "highly rated",
    "recommended reading",
    "top rated",
    "must read",
    "trending",
    "notable",
    "critically acclaimed",
    "blockbuster",
    "celebrated",
    "distinguished",
    "remarkable",
];

/// Upper bound (exclusive) of the random start offset
pub const MAX_START_OFFSET: u32 = 100;

/// What to recommend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Genre {
    /// A random general-interest query
    #[default]
    Random,
    Nonfiction,
    /// A catalog subject, e.g. `fantasy`
    Subject(String),
}

impl Genre {
    /// Catalog query for this genre
    pub fn query<R: Rng>(&self, rng: &mut R) -> String {
        match self {
            Genre::Random => RANDOM_QUERIES
                .choose(rng)
                .copied()
                .unwrap_or(RANDOM_QUERIES[0])
                .to_string(),
            Genre::Nonfiction => "subject:nonfiction".to_string(),
            Genre::Subject(subject) => format!("subject:\"{}\"", subject),
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Genre::Random => f.write_str("random"),
            Genre::Nonfiction => f.write_str("nonfiction-books"),
            Genre::Subject(s) => f.write_str(s),
        }
    }
}

impl FromStr for Genre {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.to_lowercase().as_str() {
            "" | "random" => Genre::Random,
            "nonfiction" | "nonfiction-books" | "non-fiction" => Genre::Nonfiction,
            _ => Genre::Subject(s.to_string()),
        })
    }
}

/// Builds the catalog query for a recommendation fetch
pub fn recommendation_query<R: Rng>(
    genre: &Genre,
    config: &CatalogConfig,
    rng: &mut R,
) -> VolumeQuery {
    VolumeQuery::new(genre.query(rng), config.recommendations)
        .start_index(rng.random_range(0..MAX_START_OFFSET))
        .order_by(OrderBy::Relevance)
        .lang(config.lang.as_str())
}

/// Fetches a shuffled batch of recommendations
pub fn recommend<R: Rng>(
    catalog: &dyn Catalog,
    config: &CatalogConfig,
    genre: &Genre,
    rng: &mut R,
) -> Result<Vec<BookRecord>, CatalogError> {
    let query = recommendation_query(genre, config, rng);
    tracing::debug!(%genre, q = %query.q, start = ?query.start_index, "fetching recommendations");

    let mut records: Vec<BookRecord> = catalog
        .query(&query)?
        .iter()
        .map(BookRecord::from_volume)
        .filter(|r| !r.id.is_empty())
        .collect();
    records.shuffle(rng);

    Ok(records)
}
