mod reading_controls;
mod verse_card;

pub use reading_controls::ReadingControls;
pub use verse_card::VerseCard;
