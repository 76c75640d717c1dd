//! Shelf CLI commands

use anyhow::Result;

use super::app::Context;
use super::utils::{book_count, truncate_str};
use crate::catalog::{self, Catalog, Resolver};
use crate::domain::{AddOutcome, BookRecord, MoveOutcome, RemoveOutcome, ShelfKey};
use crate::storage::LibraryStore;

/// What happened to an add request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shelving {
    /// The id could not be resolved; nothing changed
    Unresolved,
    Added(BookRecord, ShelfKey),
    /// Already on a shelf; the book was left where it was
    AlreadyShelved(BookRecord, ShelfKey),
}

/// Resolves `id` and adds the resulting record to `shelf`
pub fn shelve_by_id(
    store: &mut LibraryStore,
    catalog: &dyn Catalog,
    id: &str,
    shelf: ShelfKey,
) -> Result<Shelving> {
    let Some(record) = Resolver::new(catalog).resolve(id) else {
        return Ok(Shelving::Unresolved);
    };

    match store.add_book(record.clone(), shelf)? {
        AddOutcome::Added => Ok(Shelving::Added(record, shelf)),
        AddOutcome::AlreadyShelved(existing) => {
            let stored = store.find(&record.id).cloned().unwrap_or(record);
            Ok(Shelving::AlreadyShelved(stored, existing))
        }
    }
}

fn report_shelving(ctx: &Context, id: &str, shelving: &Shelving) {
    let output = &ctx.output;

    match shelving {
        Shelving::Unresolved => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "added": false,
                    "id": id,
                    "reason": "unresolved",
                }));
            }
            output.warn(&format!("Could not look up book '{}'; nothing was added", id));
        }
        Shelving::Added(record, shelf) => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "added": true,
                    "shelf": shelf.storage_key(),
                    "book": record,
                }));
            } else {
                output.success(&format!(
                    "Added '{}' by {} to {}",
                    record.title,
                    record.author,
                    shelf.label()
                ));
            }
        }
        Shelving::AlreadyShelved(record, existing) => {
            if output.is_json() {
                output.data(&serde_json::json!({
                    "added": false,
                    "reason": "already_shelved",
                    "shelf": existing.storage_key(),
                    "book": record,
                }));
            } else {
                output.success(&format!(
                    "'{}' is already on {}; use 'shelf move' to change shelves",
                    record.title,
                    existing.label()
                ));
            }
        }
    }
}

fn report_persistence(ctx: &Context, store: &mut LibraryStore) {
    if let Some(warning) = store.take_warning() {
        ctx.output.warn(&warning.to_string());
    }
}

pub fn add(ctx: &Context, id: &str, shelf: Option<ShelfKey>) -> Result<()> {
    let shelf = ctx.shelf_or_default(shelf);
    let catalog = ctx.catalog()?;
    let mut store = ctx.home.open_store()?;

    let shelving = shelve_by_id(&mut store, &catalog, id, shelf)?;
    report_shelving(ctx, id, &shelving);
    report_persistence(ctx, &mut store);

    Ok(())
}

pub fn pick(ctx: &Context, query: &str, index: usize, shelf: Option<ShelfKey>) -> Result<()> {
    let shelf = ctx.shelf_or_default(shelf);
    let catalog = ctx.catalog()?;

    let candidates = catalog::search(&catalog, &ctx.config().catalog, query)?;
    if candidates.is_empty() {
        ctx.output.warn(&format!("No results for '{}'; nothing was added", query.trim()));
        return Ok(());
    }

    if index == 0 || index > candidates.len() {
        anyhow::bail!(
            "Result {} out of range: '{}' returned {} result(s)",
            index,
            query.trim(),
            candidates.len()
        );
    }
    let chosen = &candidates[index - 1];
    tracing::debug!(id = %chosen.id, title = %chosen.title, "picked search result");

    let mut store = ctx.home.open_store()?;
    let shelving = shelve_by_id(&mut store, &catalog, &chosen.id, shelf)?;
    report_shelving(ctx, &chosen.id, &shelving);
    report_persistence(ctx, &mut store);

    Ok(())
}

pub fn move_book(ctx: &Context, id: &str, target: ShelfKey) -> Result<()> {
    let mut store = ctx.home.open_store()?;
    let outcome = store.move_book(id, target);
    let output = &ctx.output;

    if output.is_json() {
        let (moved, from) = match outcome {
            MoveOutcome::Moved { from, .. } => (true, Some(from.storage_key())),
            MoveOutcome::AlreadyThere => (false, Some(target.storage_key())),
            MoveOutcome::NotFound => (false, None),
        };
        output.data(&serde_json::json!({
            "id": id,
            "moved": moved,
            "from": from,
            "to": target.storage_key(),
        }));
    } else {
        match outcome {
            MoveOutcome::Moved { from, to } => {
                let title = store.find(id).map(|b| b.title.as_str()).unwrap_or(id);
                output.success(&format!("Moved '{}' from {} to {}", title, from.label(), to.label()));
            }
            MoveOutcome::AlreadyThere => {
                output.success(&format!("'{}' is already on {}", id, target.label()));
            }
            MoveOutcome::NotFound => {
                output.success(&format!("'{}' is not on any shelf", id));
            }
        }
    }

    report_persistence(ctx, &mut store);
    Ok(())
}

pub fn remove(ctx: &Context, id: &str, shelf: Option<ShelfKey>) -> Result<()> {
    let mut store = ctx.home.open_store()?;
    let output = &ctx.output;

    let Some(shelf) = shelf.or_else(|| store.locate(id)) else {
        if output.is_json() {
            output.data(&serde_json::json!({ "id": id, "removed": false, "shelf": null }));
        } else {
            output.success(&format!("'{}' is not on any shelf", id));
        }
        return Ok(());
    };

    let title = store.find(id).map(|b| b.title.clone());
    let outcome = store.remove_book(id, shelf);

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "removed": outcome == RemoveOutcome::Removed,
            "shelf": shelf.storage_key(),
        }));
    } else {
        match outcome {
            RemoveOutcome::Removed => output.success(&format!(
                "Removed '{}' from {}",
                title.as_deref().unwrap_or(id),
                shelf.label()
            )),
            RemoveOutcome::NotFound => {
                output.success(&format!("'{}' is not on {}", id, shelf.label()))
            }
        }
    }

    report_persistence(ctx, &mut store);
    Ok(())
}

fn print_shelf(store: &LibraryStore, shelf: ShelfKey) {
    let books = store.snapshot(shelf);
    println!("{} ({})", shelf.label(), book_count(books.len()));

    if books.is_empty() {
        println!("  (empty)");
        return;
    }

    println!("  {:<16} {:<40} AUTHOR", "ID", "TITLE");
    for book in books {
        println!(
            "  {:<16} {:<40} {}",
            book.id,
            truncate_str(&book.title, 40),
            truncate_str(&book.author, 30)
        );
    }
}

pub fn list(ctx: &Context, shelf: Option<ShelfKey>) -> Result<()> {
    let store = ctx.home.open_store()?;
    let output = &ctx.output;

    if output.is_json() {
        match shelf {
            Some(shelf) => output.data(&serde_json::json!({
                "shelf": shelf.storage_key(),
                "count": store.count(shelf),
                "books": store.snapshot(shelf),
            })),
            None => output.data(store.library()),
        }
        return Ok(());
    }

    match shelf {
        Some(shelf) => print_shelf(&store, shelf),
        None => {
            for (i, shelf) in ShelfKey::ALL.into_iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_shelf(&store, shelf);
            }
        }
    }

    Ok(())
}

pub fn show(ctx: &Context, id: &str) -> Result<()> {
    let store = ctx.home.open_store()?;

    let (Some(shelf), Some(book)) = (store.locate(id), store.find(id)) else {
        anyhow::bail!("Book not found: {}", id);
    };

    if ctx.output.is_json() {
        ctx.output.data(&serde_json::json!({
            "shelf": shelf.storage_key(),
            "book": book,
        }));
    } else {
        println!("ID:     {}", book.id);
        println!("Title:  {}", book.title);
        println!("Author: {}", book.author);
        println!("Cover:  {}", book.cover_url);
        println!("Shelf:  {}", shelf.label());
    }

    Ok(())
}

pub fn status(ctx: &Context) -> Result<()> {
    let store = ctx.home.open_store()?;

    if ctx.output.is_json() {
        ctx.output.data(&serde_json::json!({
            "toRead": store.count(ShelfKey::ToRead),
            "reading": store.count(ShelfKey::Reading),
            "completed": store.count(ShelfKey::Completed),
            "total": store.library().len(),
        }));
    } else {
        for shelf in ShelfKey::ALL {
            println!("{:<10} {}", shelf.label(), book_count(store.count(shelf)));
        }
        println!("{:<10} {}", "Total", book_count(store.library().len()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ImageLinks, MemoryCatalog, Volume, VolumeInfo};
    use crate::domain::UNKNOWN_AUTHOR;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_volume(Volume {
                id: "dune1".to_string(),
                volume_info: VolumeInfo {
                    title: Some("Dune".to_string()),
                    authors: Some(vec!["Frank Herbert".to_string()]),
                    image_links: Some(ImageLinks {
                        thumbnail: Some("http://img/dune".to_string()),
                        small_thumbnail: None,
                    }),
                },
            })
            .with_volume(Volume {
                id: "anon".to_string(),
                volume_info: VolumeInfo {
                    title: Some("Beowulf".to_string()),
                    ..Default::default()
                },
            })
    }

    #[test]
    fn shelves_resolved_record() {
        let mut store = LibraryStore::in_memory();

        let result = shelve_by_id(&mut store, &catalog(), "dune1", ShelfKey::Reading).unwrap();

        let Shelving::Added(record, shelf) = result else {
            panic!("expected Added, got {:?}", result);
        };
        assert_eq!(shelf, ShelfKey::Reading);
        assert_eq!(record.cover_url, "https://img/dune");
        assert_eq!(store.snapshot(ShelfKey::Reading), &[record]);
    }

    #[test]
    fn normalizes_missing_fields_before_storing() {
        let mut store = LibraryStore::in_memory();

        shelve_by_id(&mut store, &catalog(), "anon", ShelfKey::ToRead).unwrap();

        assert_eq!(store.find("anon").unwrap().author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn unresolved_id_changes_nothing() {
        let mut store = LibraryStore::in_memory();

        let result = shelve_by_id(&mut store, &catalog(), "missing", ShelfKey::ToRead).unwrap();
        assert_eq!(result, Shelving::Unresolved);

        let result =
            shelve_by_id(&mut store, &catalog().offline(), "dune1", ShelfKey::ToRead).unwrap();
        assert_eq!(result, Shelving::Unresolved);

        assert!(store.library().is_empty());
    }

    #[test]
    fn already_shelved_elsewhere_stays_put() {
        let mut store = LibraryStore::in_memory();
        shelve_by_id(&mut store, &catalog(), "dune1", ShelfKey::Completed).unwrap();

        let result = shelve_by_id(&mut store, &catalog(), "dune1", ShelfKey::ToRead).unwrap();

        assert!(matches!(result, Shelving::AlreadyShelved(_, ShelfKey::Completed)));
        assert_eq!(store.locate("dune1"), Some(ShelfKey::Completed));
        assert!(store.snapshot(ShelfKey::ToRead).is_empty());
    }
}
