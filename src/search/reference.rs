//! Scripture reference parsing for free-text queries.
//!
//! Turns "John 3:16", "ps 23" or "1 cor 13:4" into a validated chapter
//! key plus an optional verse number. Anything that does not resolve
//! against the canon is simply not a reference; the caller falls through
//! to the keyword scan.

use std::sync::OnceLock;

use regex::Regex;

use crate::canon::{self, ChapterKey};

/// A parsed reference-form query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    /// The addressed chapter.
    pub key: ChapterKey,
    /// Specific verse, when the query carried one.
    pub verse: Option<u32>,
}

/// Matches `<book> <chapter>[:<verse>]` with an optional leading book
/// ordinal ("1 John 4:7").
fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^\s*([1-3]?\s*[A-Za-z][A-Za-z ]*?)\s+(\d{1,3})\s*(?::\s*(\d{1,3}))?\s*$")
            .expect("reference regex is valid")
    })
}

/// Attempts to read a query as a scripture reference.
///
/// Returns `None` when the shape does not match, the book is unknown, or
/// the chapter is out of the book's range.
#[must_use]
pub fn parse_reference(query: &str) -> Option<ParsedReference> {
    let captures = reference_regex().captures(query)?;

    let book = captures.get(1)?.as_str();
    let chapter: u32 = captures.get(2)?.as_str().parse().ok()?;
    let verse: Option<u32> = match captures.get(3) {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };

    let key = canon::chapter_key(book, chapter).ok()?;
    Some(ParsedReference { key, verse })
}
