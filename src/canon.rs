//! Static canon reference data and chapter addressing.
//!
//! The 66-book canon table is fixed at compile time: book name, ordinal
//! position, chapter count, and testament. All fetch and cache addressing
//! goes through [`ChapterKey`], which can only be constructed via
//! [`chapter_key`], so a key in hand always names a recognized book and an
//! in-range chapter.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which testament a book belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Testament {
    /// Old Testament (Genesis through Malachi).
    Old,
    /// New Testament (Matthew through Revelation).
    New,
}

/// A single book of the canon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    /// Canonical display name, also used in cache keys and fetch URLs.
    pub name: &'static str,
    /// 1-based position in canonical order.
    pub ordinal: u8,
    /// Number of chapters in this book.
    pub chapters: u32,
    /// Old or New Testament.
    pub testament: Testament,
}

/// Errors from canon lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanonError {
    /// The name does not match any canonical book or known abbreviation.
    #[error("unknown book: {name}")]
    UnknownBook {
        /// The name that failed to resolve.
        name: String,
    },

    /// The chapter number is outside the book's canonical range.
    #[error("chapter {chapter} out of range for {book} (1..={max})")]
    ChapterOutOfRange {
        /// Book whose range was violated.
        book: &'static str,
        /// The requested chapter.
        chapter: u32,
        /// The book's chapter count.
        max: u32,
    },
}

/// Addressing unit for both fetch and cache: one `(book, chapter)` pair.
///
/// Construction is validated, so the book is always a canonical name and
/// `1 <= chapter <= book.chapters`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterKey {
    book: String,
    chapter: u32,
}

impl ChapterKey {
    /// Returns the canonical book name.
    #[must_use]
    pub fn book(&self) -> &str {
        &self.book
    }

    /// Returns the 1-based chapter number.
    #[must_use]
    pub fn chapter(&self) -> u32 {
        self.chapter
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.chapter)
    }
}

/// A single verse as stored and as returned by the remote source.
///
/// Verse numbers within a chapter ascend but are not necessarily
/// contiguous; some source chapters skip numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// 1-based verse number within the chapter.
    pub verse: u32,
    /// Verse text, trimmed of surrounding whitespace.
    pub text: String,
}

macro_rules! canon_table {
    ($(($name:literal, $ord:literal, $ch:literal, $t:ident)),+ $(,)?) => {
        &[$(Book { name: $name, ordinal: $ord, chapters: $ch, testament: Testament::$t }),+]
    };
}

/// The 66-book canon in canonical order. Chapter counts are fixed by canon.
static CANON: &[Book] = canon_table![
    ("Genesis", 1, 50, Old),
    ("Exodus", 2, 40, Old),
    ("Leviticus", 3, 27, Old),
    ("Numbers", 4, 36, Old),
    ("Deuteronomy", 5, 34, Old),
    ("Joshua", 6, 24, Old),
    ("Judges", 7, 21, Old),
    ("Ruth", 8, 4, Old),
    ("1 Samuel", 9, 31, Old),
    ("2 Samuel", 10, 24, Old),
    ("1 Kings", 11, 22, Old),
    ("2 Kings", 12, 25, Old),
    ("1 Chronicles", 13, 29, Old),
    ("2 Chronicles", 14, 36, Old),
    ("Ezra", 15, 10, Old),
    ("Nehemiah", 16, 13, Old),
    ("Esther", 17, 10, Old),
    ("Job", 18, 42, Old),
    ("Psalms", 19, 150, Old),
    ("Proverbs", 20, 31, Old),
    ("Ecclesiastes", 21, 12, Old),
    ("Song of Solomon", 22, 8, Old),
    ("Isaiah", 23, 66, Old),
    ("Jeremiah", 24, 52, Old),
    ("Lamentations", 25, 5, Old),
    ("Ezekiel", 26, 48, Old),
    ("Daniel", 27, 12, Old),
    ("Hosea", 28, 14, Old),
    ("Joel", 29, 3, Old),
    ("Amos", 30, 9, Old),
    ("Obadiah", 31, 1, Old),
    ("Jonah", 32, 4, Old),
    ("Micah", 33, 7, Old),
    ("Nahum", 34, 3, Old),
    ("Habakkuk", 35, 3, Old),
    ("Zephaniah", 36, 3, Old),
    ("Haggai", 37, 2, Old),
    ("Zechariah", 38, 14, Old),
    ("Malachi", 39, 4, Old),
    ("Matthew", 40, 28, New),
    ("Mark", 41, 16, New),
    ("Luke", 42, 24, New),
    ("John", 43, 21, New),
    ("Acts", 44, 28, New),
    ("Romans", 45, 16, New),
    ("1 Corinthians", 46, 16, New),
    ("2 Corinthians", 47, 13, New),
    ("Galatians", 48, 6, New),
    ("Ephesians", 49, 6, New),
    ("Philippians", 50, 4, New),
    ("Colossians", 51, 4, New),
    ("1 Thessalonians", 52, 5, New),
    ("2 Thessalonians", 53, 3, New),
    ("1 Timothy", 54, 6, New),
    ("2 Timothy", 55, 4, New),
    ("Titus", 56, 3, New),
    ("Philemon", 57, 1, New),
    ("Hebrews", 58, 13, New),
    ("James", 59, 5, New),
    ("1 Peter", 60, 5, New),
    ("2 Peter", 61, 3, New),
    ("1 John", 62, 5, New),
    ("2 John", 63, 1, New),
    ("3 John", 64, 1, New),
    ("Jude", 65, 1, New),
    ("Revelation", 66, 22, New),
];

/// Returns the full canon in canonical order.
#[must_use]
pub fn books() -> &'static [Book] {
    CANON
}

/// Resolves an abbreviation to a canonical book name.
///
/// Covers the common short forms a reference query might use; full names
/// are matched directly by [`find_book`].
fn expand_abbreviation(normalized: &str) -> Option<&'static str> {
    let name = match normalized {
        "gen" => "Genesis",
        "ex" | "exod" => "Exodus",
        "lev" => "Leviticus",
        "num" => "Numbers",
        "deut" => "Deuteronomy",
        "josh" => "Joshua",
        "judg" => "Judges",
        "1 sam" => "1 Samuel",
        "2 sam" => "2 Samuel",
        "1 kgs" | "1 kings" => "1 Kings",
        "2 kgs" | "2 kings" => "2 Kings",
        "1 chr" | "1 chron" => "1 Chronicles",
        "2 chr" | "2 chron" => "2 Chronicles",
        "neh" => "Nehemiah",
        "esth" => "Esther",
        "ps" | "psalm" => "Psalms",
        "prov" => "Proverbs",
        "eccl" => "Ecclesiastes",
        "song" => "Song of Solomon",
        "isa" => "Isaiah",
        "jer" => "Jeremiah",
        "lam" => "Lamentations",
        "ezek" => "Ezekiel",
        "dan" => "Daniel",
        "hos" => "Hosea",
        "matt" | "mt" => "Matthew",
        "mk" => "Mark",
        "lk" => "Luke",
        "jn" => "John",
        "rom" => "Romans",
        "1 cor" => "1 Corinthians",
        "2 cor" => "2 Corinthians",
        "gal" => "Galatians",
        "eph" => "Ephesians",
        "phil" => "Philippians",
        "col" => "Colossians",
        "1 thess" => "1 Thessalonians",
        "2 thess" => "2 Thessalonians",
        "1 tim" => "1 Timothy",
        "2 tim" => "2 Timothy",
        "heb" => "Hebrews",
        "jas" => "James",
        "1 pet" => "1 Peter",
        "2 pet" => "2 Peter",
        "1 jn" => "1 John",
        "2 jn" => "2 John",
        "3 jn" => "3 John",
        "rev" => "Revelation",
        _ => return None,
    };
    Some(name)
}

/// Looks up a book by name, case-insensitively.
///
/// Accepts the canonical name or a common abbreviation ("ps", "1 cor").
#[must_use]
pub fn find_book(name: &str) -> Option<&'static Book> {
    let normalized = name.trim().to_lowercase();
    let target = expand_abbreviation(&normalized);
    CANON.iter().find(|b| match target {
        Some(full) => b.name == full,
        None => b.name.to_lowercase() == normalized,
    })
}

/// Builds a validated chapter key for `(book, chapter)`.
///
/// # Errors
///
/// Returns [`CanonError::UnknownBook`] if the name does not resolve, or
/// [`CanonError::ChapterOutOfRange`] if the chapter is 0 or beyond the
/// book's canonical count.
pub fn chapter_key(book: &str, chapter: u32) -> Result<ChapterKey, CanonError> {
    let found = find_book(book).ok_or_else(|| CanonError::UnknownBook {
        name: book.to_string(),
    })?;
    if chapter == 0 || chapter > found.chapters {
        return Err(CanonError::ChapterOutOfRange {
            book: found.name,
            chapter,
            max: found.chapters,
        });
    }
    Ok(ChapterKey {
        book: found.name.to_string(),
        chapter,
    })
}

/// Reconstructs a key from trusted storage columns without re-validation.
///
/// Persisted rows were validated on the way in; a row whose book no longer
/// resolves is skipped by callers rather than panicking.
pub(crate) fn key_from_storage(book: &str, chapter: u32) -> ChapterKey {
    ChapterKey {
        book: book.to_string(),
        chapter,
    }
}
