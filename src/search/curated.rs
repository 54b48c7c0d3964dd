//! Curated dataset of well-known verses for the keyword scan.
//!
//! The keyword stage of search runs against this fixed table rather than
//! the full text, which keeps offline search useful without a full-text
//! index. Order is significant: it is the stable tie-break order for
//! results within a relevance group.

/// One curated verse with its parsed reference parts.
#[derive(Debug, Clone, Copy)]
pub struct CuratedVerse {
    /// Human-readable reference ("John 3:16").
    pub reference: &'static str,
    /// Canonical book name.
    pub book: &'static str,
    /// Chapter number.
    pub chapter: u32,
    /// Verse number.
    pub verse: u32,
    /// KJV verse text.
    pub text: &'static str,
}

macro_rules! curated {
    ($(($r:literal, $b:literal, $c:literal, $v:literal, $t:literal)),+ $(,)?) => {
        &[$(CuratedVerse { reference: $r, book: $b, chapter: $c, verse: $v, text: $t }),+]
    };
}

/// The curated verse table, in insertion (tie-break) order.
pub static CURATED_VERSES: &[CuratedVerse] = curated![
    (
        "John 3:16",
        "John",
        3,
        16,
        "For God so loved the world, that he gave his only begotten Son, that whosoever believeth in him should not perish, but have everlasting life."
    ),
    (
        "Genesis 1:1",
        "Genesis",
        1,
        1,
        "In the beginning God created the heaven and the earth."
    ),
    (
        "Psalms 23:1",
        "Psalms",
        23,
        1,
        "The LORD is my shepherd; I shall not want."
    ),
    (
        "Philippians 4:13",
        "Philippians",
        4,
        13,
        "I can do all things through Christ which strengtheneth me."
    ),
    (
        "Philippians 4:7",
        "Philippians",
        4,
        7,
        "And the peace of God, which passeth all understanding, shall keep your hearts and minds through Christ Jesus."
    ),
    (
        "Proverbs 3:5",
        "Proverbs",
        3,
        5,
        "Trust in the LORD with all thine heart; and lean not unto thine own understanding."
    ),
    (
        "Romans 8:28",
        "Romans",
        8,
        28,
        "And we know that all things work together for good to them that love God, to them who are the called according to his purpose."
    ),
    (
        "Jeremiah 29:11",
        "Jeremiah",
        29,
        11,
        "For I know the thoughts that I think toward you, saith the LORD, thoughts of peace, and not of evil, to give you an expected end."
    ),
    (
        "Isaiah 41:10",
        "Isaiah",
        41,
        10,
        "Fear thou not; for I am with thee: be not dismayed; for I am thy God: I will strengthen thee; yea, I will help thee; yea, I will uphold thee with the right hand of my righteousness."
    ),
    (
        "Matthew 11:28",
        "Matthew",
        11,
        28,
        "Come unto me, all ye that labour and are heavy laden, and I will give you rest."
    ),
    (
        "John 14:27",
        "John",
        14,
        27,
        "Peace I leave with you, my peace I give unto you: not as the world giveth, give I unto you. Let not your heart be troubled, neither let it be afraid."
    ),
    (
        "Joshua 1:9",
        "Joshua",
        1,
        9,
        "Have not I commanded thee? Be strong and of a good courage; be not afraid, neither be thou dismayed: for the LORD thy God is with thee whithersoever thou goest."
    ),
    (
        "Romans 12:2",
        "Romans",
        12,
        2,
        "And be not conformed to this world: but be ye transformed by the renewing of your mind, that ye may prove what is that good, and acceptable, and perfect, will of God."
    ),
    (
        "1 Corinthians 13:4",
        "1 Corinthians",
        13,
        4,
        "Charity suffereth long, and is kind; charity envieth not; charity vaunteth not itself, is not puffed up,"
    ),
    (
        "Psalms 46:1",
        "Psalms",
        46,
        1,
        "God is our refuge and strength, a very present help in trouble."
    ),
    (
        "Galatians 5:22",
        "Galatians",
        5,
        22,
        "But the fruit of the Spirit is love, joy, peace, longsuffering, gentleness, goodness, faith,"
    ),
    (
        "Hebrews 11:1",
        "Hebrews",
        11,
        1,
        "Now faith is the substance of things hoped for, the evidence of things not seen."
    ),
    (
        "2 Timothy 1:7",
        "2 Timothy",
        1,
        7,
        "For God hath not given us the spirit of fear; but of power, and of love, and of a sound mind."
    ),
    (
        "1 Peter 5:7",
        "1 Peter",
        5,
        7,
        "Casting all your care upon him; for he careth for you."
    ),
    (
        "Ephesians 2:8",
        "Ephesians",
        2,
        8,
        "For by grace are ye saved through faith; and that not of yourselves: it is the gift of God:"
    ),
    (
        "Micah 6:8",
        "Micah",
        6,
        8,
        "He hath shewed thee, O man, what is good; and what doth the LORD require of thee, but to do justly, and to love mercy, and to walk humbly with thy God?"
    ),
    (
        "Matthew 6:33",
        "Matthew",
        6,
        33,
        "But seek ye first the kingdom of God, and his righteousness; and all these things shall be added unto you."
    ),
    (
        "John 8:32",
        "John",
        8,
        32,
        "And ye shall know the truth, and the truth shall make you free."
    ),
    (
        "Romans 5:8",
        "Romans",
        5,
        8,
        "But God commendeth his love toward us, in that, while we were yet sinners, Christ died for us."
    ),
    (
        "Revelation 21:4",
        "Revelation",
        21,
        4,
        "And God shall wipe away all tears from their eyes; and there shall be no more death, neither sorrow, nor crying, neither shall there be any more pain: for the former things are passed away."
    ),
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::canon;

    #[test]
    fn test_curated_books_resolve_against_canon() {
        for entry in CURATED_VERSES {
            let book = canon::find_book(entry.book)
                .unwrap_or_else(|| panic!("{} not in canon", entry.book));
            assert!(
                entry.chapter >= 1 && entry.chapter <= book.chapters,
                "{} chapter out of range",
                entry.reference
            );
        }
    }

    #[test]
    fn test_curated_references_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entry in CURATED_VERSES {
            assert!(seen.insert(entry.reference), "duplicate {}", entry.reference);
        }
    }
}
