use thiserror::Error;

/// Errors raised by the scheduler, the presenter and their host services
#[derive(Debug, Error)]
pub enum VerseError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid Quran metadata: {0}")]
    InvalidMetadata(String),

    #[error("empty verse text for edition {edition} at {position}")]
    EmptyContent { edition: String, position: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("host error: {0}")]
    Host(String),

    #[error("position {chapter}:{verse} is outside the text")]
    PositionOutOfRange { chapter: u16, verse: u16 },
}

pub type Result<T> = std::result::Result<T, VerseError>;
