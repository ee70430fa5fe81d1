// src/app/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no network connection")]
    NetworkUnavailable,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("malformed TMDb response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unsupported resource: {0}")]
    UnsupportedResource(String),

    #[error("unknown column `{column}` for table {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("local store error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    #[error("unreadable row: {0}")]
    CorruptRow(String),

    #[error("movie store lock poisoned")]
    LockPoisoned,

    #[error("no TMDb API key configured (set TMDB_API_KEY or tmdb_api_key in config.json)")]
    MissingApiKey,

    #[error("movie {0} has no poster bytes to store")]
    MissingPoster(i64),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Fatal errors point at a coding defect or a broken local store; the
    /// rest collapse into an empty/offline view.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedResource(_)
                | Self::UnknownColumn { .. }
                | Self::Persistence(_)
                | Self::ConsistencyViolation(_)
                | Self::CorruptRow(_)
                | Self::LockPoisoned
        )
    }
}
