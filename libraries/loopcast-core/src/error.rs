/// Core error types for Loopcast
use thiserror::Error;

/// Result type alias using `LoopcastError`
pub type Result<T> = std::result::Result<T, LoopcastError>;

/// Core error type for Loopcast
#[derive(Error, Debug)]
pub enum LoopcastError {
    /// Metadata parsing errors
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// File extension does not map to a known audio format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LoopcastError {
    /// Create a metadata error
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
