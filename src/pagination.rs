use std::convert::TryFrom;

use crate::errors::LibraryError;

/// Verses in lyrics are separated by a blank line.
pub const VERSE_SEPARATOR: &str = "\n\n";

/// The largest value `page * page_size` may take.
const MAX_TOTAL: u64 = 1 << 31;

/// A validated 1-indexed page of `size` items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Result<Self, LibraryError> {
        if number == 0 || size == 0 {
            return Err(LibraryError::InvalidPage {
                page: number,
                page_size: size,
            });
        }

        match number.checked_mul(size) {
            Some(total) if u64::from(total) <= MAX_TOTAL => Ok(Page { number, size }),
            _ => Err(LibraryError::PageOverflow {
                page: number,
                page_size: size,
            }),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Index of the first item on this page.
    pub fn lower_bound(&self) -> usize {
        (self.number as usize - 1) * self.size as usize
    }

    /// Index one past the last item on this page.
    pub fn upper_bound(&self) -> usize {
        self.number as usize * self.size as usize
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::try_from(self.lower_bound()).unwrap_or(i64::MAX)
    }
}

pub fn split_verses(lyrics: &str) -> Vec<&str> {
    lyrics.split(VERSE_SEPARATOR).collect()
}

/// Returns the verses of `lyrics` on `page`. Asking for a page that
/// starts past the last verse is an error.
pub fn paginate_verses(lyrics: &str, page: Page) -> Result<Vec<String>, LibraryError> {
    let verses = split_verses(lyrics);
    let lower = page.lower_bound();

    if verses.len() <= lower {
        return Err(LibraryError::EmptyPage {
            page: page.number,
            page_size: page.size,
            verses: verses.len(),
        });
    }

    let upper = page.upper_bound().min(verses.len());

    Ok(verses[lower..upper].iter().map(|v| (*v).to_owned()).collect())
}
