//! Catalog browsing commands: search and recommendations

use anyhow::{Context as _, Result};

use super::app::Context;
use super::utils::truncate_str;
use crate::catalog::{self, Genre, MIN_QUERY_LEN};
use crate::domain::BookRecord;

fn print_candidates(books: &[BookRecord], shelved: impl Fn(&str) -> Option<&'static str>) {
    println!("{:<4} {:<16} {:<40} {:<24} SHELF", "#", "ID", "TITLE", "AUTHOR");
    println!("{}", "-".repeat(92));

    for (i, book) in books.iter().enumerate() {
        println!(
            "{:<4} {:<16} {:<40} {:<24} {}",
            i + 1,
            book.id,
            truncate_str(&book.title, 40),
            truncate_str(&book.author, 24),
            shelved(&book.id).unwrap_or("-")
        );
    }
}

fn candidates_json(books: &[BookRecord], shelved: impl Fn(&str) -> Option<&'static str>) -> serde_json::Value {
    books
        .iter()
        .map(|b| {
            serde_json::json!({
                "id": b.id,
                "title": b.title,
                "author": b.author,
                "cover": b.cover_url,
                "shelf": shelved(&b.id),
            })
        })
        .collect()
}

pub fn search(ctx: &Context, query: &str) -> Result<()> {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        ctx.output.warn(&format!(
            "Search queries need at least {} characters",
            MIN_QUERY_LEN
        ));
        if ctx.output.is_json() {
            ctx.output.data(&serde_json::json!([]));
        }
        return Ok(());
    }

    let catalog = ctx.catalog()?;
    let results = catalog::search(&catalog, &ctx.config().catalog, query)
        .with_context(|| format!("Search for '{}' failed", query.trim()))?;
    let store = ctx.home.open_store()?;
    let shelved = |id: &str| store.locate(id).map(|s| s.storage_key());

    if ctx.output.is_json() {
        ctx.output.data(&candidates_json(&results, shelved));
    } else if results.is_empty() {
        println!("No results found for '{}'", query.trim());
    } else {
        print_candidates(&results, shelved);
        println!();
        println!("Add one with: shelf pick \"{}\" --index <#>", query.trim());
    }

    Ok(())
}

pub fn recommend(ctx: &Context, genre: &str) -> Result<()> {
    // Infallible: unknown genres become catalog subjects
    let genre: Genre = genre.parse().unwrap_or_default();

    let catalog = ctx.catalog()?;
    let mut rng = rand::rng();
    let books = catalog::recommend(&catalog, &ctx.config().catalog, &genre, &mut rng)
        .context("Failed to load recommendations")?;
    let store = ctx.home.open_store()?;
    let shelved = |id: &str| store.locate(id).map(|s| s.storage_key());

    if ctx.output.is_json() {
        ctx.output.data(&serde_json::json!({
            "genre": genre.to_string(),
            "books": candidates_json(&books, shelved),
        }));
    } else if books.is_empty() {
        println!("No recommendations for '{}' right now; try again", genre);
    } else {
        println!("Recommendations ({})", genre);
        println!();
        print_candidates(&books, shelved);
        println!();
        println!("Add one with: shelf add <ID> [--shelf to-read|reading|completed]");
    }

    Ok(())
}
