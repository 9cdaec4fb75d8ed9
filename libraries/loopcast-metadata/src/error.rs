/// Metadata-specific errors
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File or directory not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Path exists but is not a directory that can be scanned
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Tag parsing error
    #[error("Tag parsing error: {0}")]
    ParseError(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Lofty error
    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
}

impl From<MetadataError> for loopcast_core::LoopcastError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::Io(e) => loopcast_core::LoopcastError::Io(e),
            other => loopcast_core::LoopcastError::metadata(other.to_string()),
        }
    }
}
