use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TOTAL_CHAPTERS;
use crate::error::{Result, VerseError};
use crate::metadata::QuranInfo;

/// Chapters that open without the bismillah
const NO_BISMILLAH_CHAPTERS: [u16; 2] = [1, 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPosition {
    pub chapter: u16,
    pub verse: u16,
}

impl Default for ReadingPosition {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for ReadingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

/// Outcome of stepping forward one verse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    To(ReadingPosition),
    /// Already at the last verse of the last chapter
    Completed,
}

impl ReadingPosition {
    pub const fn new(chapter: u16, verse: u16) -> Self {
        Self { chapter, verse }
    }

    pub fn shows_bismillah(&self) -> bool {
        !NO_BISMILLAH_CHAPTERS.contains(&self.chapter)
    }

    pub fn next(&self, info: &QuranInfo) -> Result<Advance> {
        let count = info
            .verse_count(self.chapter)
            .ok_or(VerseError::PositionOutOfRange {
                chapter: self.chapter,
                verse: self.verse,
            })?;

        if self.verse < count {
            return Ok(Advance::To(Self::new(self.chapter, self.verse + 1)));
        }

        if self.chapter >= TOTAL_CHAPTERS {
            Ok(Advance::Completed)
        } else {
            Ok(Advance::To(Self::new(self.chapter + 1, 1)))
        }
    }

    /// Reading progress as a percentage of the whole text
    pub fn progress_percent(&self, info: &QuranInfo) -> f64 {
        let total = info.total_verses();
        if total == 0 {
            return 0.0;
        }
        f64::from(info.verses_through(*self)) / f64::from(total) * 100.0
    }
}
