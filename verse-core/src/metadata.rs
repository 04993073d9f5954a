// Static chapter/verse metadata served as `info.json`

use serde::{Deserialize, Deserializer};

use crate::config::{TOTAL_CHAPTERS, TOTAL_JUZS};
use crate::error::{Result, VerseError};
use crate::position::ReadingPosition;

#[derive(Debug, Clone, Deserialize)]
pub struct QuranInfo {
    pub chapters: Vec<ChapterInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterInfo {
    pub chapter: u16,
    /// Transliterated name
    pub name: String,
    #[serde(default)]
    pub englishname: String,
    #[serde(default)]
    pub arabicname: String,
    #[serde(default)]
    pub revelation: String,
    pub verses: Vec<VerseInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerseInfo {
    pub verse: u16,
    #[serde(default)]
    pub line: u16,
    #[serde(default)]
    pub juz: u8,
    #[serde(default)]
    pub page: u16,
    /// `false`, or an object describing the prostration
    #[serde(default, deserialize_with = "deserialize_sajda")]
    pub sajda: bool,
}

fn deserialize_sajda<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(!matches!(
        value,
        serde_json::Value::Null | serde_json::Value::Bool(false)
    ))
}

impl QuranInfo {
    /// Parse and validate an `info.json` document
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let info: QuranInfo = serde_json::from_slice(bytes)
            .map_err(|e| VerseError::InvalidMetadata(e.to_string()))?;
        info.validate()?;
        Ok(info)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chapters.len() != usize::from(TOTAL_CHAPTERS) {
            return Err(VerseError::InvalidMetadata(format!(
                "expected {} chapters, found {}",
                TOTAL_CHAPTERS,
                self.chapters.len()
            )));
        }

        for (idx, chapter) in self.chapters.iter().enumerate() {
            if chapter.verses.is_empty() {
                return Err(VerseError::InvalidMetadata(format!(
                    "chapter {} has no verses",
                    idx + 1
                )));
            }
            if u16::try_from(chapter.verses.len()).is_err() {
                return Err(VerseError::InvalidMetadata(format!(
                    "chapter {} has {} verses",
                    idx + 1,
                    chapter.verses.len()
                )));
            }
            if let Some(bad) = chapter
                .verses
                .iter()
                .find(|v| v.juz > TOTAL_JUZS)
            {
                return Err(VerseError::InvalidMetadata(format!(
                    "verse {}:{} is in juz {}",
                    idx + 1,
                    bad.verse,
                    bad.juz
                )));
            }
        }

        Ok(())
    }

    /// Chapter record for a 1-based chapter number
    pub fn chapter(&self, chapter: u16) -> Option<&ChapterInfo> {
        let idx = usize::from(chapter).checked_sub(1)?;
        self.chapters.get(idx)
    }

    pub fn verse_count(&self, chapter: u16) -> Option<u16> {
        self.chapter(chapter).map(ChapterInfo::verse_count)
    }

    pub fn verse(&self, position: ReadingPosition) -> Option<&VerseInfo> {
        self.chapter(position.chapter)?
            .verses
            .iter()
            .find(|v| v.verse == position.verse)
    }

    pub fn is_sajda(&self, position: ReadingPosition) -> bool {
        self.verse(position).is_some_and(|v| v.sajda)
    }

    pub fn total_verses(&self) -> u32 {
        self.chapters
            .iter()
            .map(|c| u32::from(c.verse_count()))
            .sum()
    }

    /// Verses up to and including `position`, counted from 1:1
    pub fn verses_through(&self, position: ReadingPosition) -> u32 {
        let before: u32 = self
            .chapters
            .iter()
            .take(usize::from(position.chapter.saturating_sub(1)))
            .map(|c| u32::from(c.verse_count()))
            .sum();
        before + u32::from(position.verse)
    }

    pub fn contains(&self, position: ReadingPosition) -> bool {
        self.verse_count(position.chapter)
            .is_some_and(|count| position.verse >= 1 && position.verse <= count)
    }
}

impl ChapterInfo {
    /// Saturates at `u16::MAX`; `QuranInfo::validate` rejects longer chapters
    pub fn verse_count(&self) -> u16 {
        u16::try_from(self.verses.len()).unwrap_or(u16::MAX)
    }

    /// "الفاتحة - Al Faatiha (The Opening)"
    pub fn title(&self) -> String {
        format!("{} - {} ({})", self.arabicname, self.name, self.englishname)
    }
}
