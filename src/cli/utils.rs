//! Shared text helpers for terminal output

/// Truncate a string to max_len characters, ending in "…" if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// "1 book", "3 books"
pub fn book_count(n: usize) -> String {
    if n == 1 {
        "1 book".to_string()
    } else {
        format!("{} books", n)
    }
}
