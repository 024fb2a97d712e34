//! Error types for voxbridge

use thiserror::Error;

/// Result type alias for voxbridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in voxbridge
///
/// Only the four pipeline stage variants abort a translation. Cache and
/// charging failures never surface here from the pipeline; they are logged
/// and treated as a miss or skipped.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech recognition adapter failed
    #[error("failed to recognize text from speech: {0}")]
    Recognition(String),

    /// No candidate sample rate produced a usable transcript
    #[error("speech recognition returned no results")]
    RecognitionEmpty,

    /// Translation adapter failed
    #[error("failed to translate text: {0}")]
    Translation(String),

    /// Speech synthesis adapter failed
    #[error("failed to generate speech: {0}")]
    Synthesis(String),

    /// Delivery channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether this error aborted a pipeline stage
    #[must_use]
    pub const fn is_stage_failure(&self) -> bool {
        matches!(
            self,
            Self::Recognition(_) | Self::RecognitionEmpty | Self::Translation(_) | Self::Synthesis(_)
        )
    }
}
