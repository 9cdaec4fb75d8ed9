/// Streaming pipeline errors
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `StreamError`
pub type Result<T> = std::result::Result<T, StreamError>;

/// Stream error types
#[derive(Error, Debug)]
pub enum StreamError {
    /// No usable files at catalog build time
    #[error("Catalog is empty: no playable audio files")]
    EmptyCatalog,

    /// The external encoder cannot be located or started
    #[error("Encoder unavailable: {program}")]
    EncoderUnavailable {
        program: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The encoder process died or one of its pipes broke mid-track
    #[error("Transcode conduit broken: {0}")]
    ConduitBroken(String),

    /// The client sink is no longer writable
    #[error("Client disconnected")]
    Disconnected,

    /// A catalog entry could not be opened or read
    #[error("Unreadable track {path:?}: {source}")]
    UnreadableTrack {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every track in a full pass over the catalog failed
    #[error("All {failures} tracks failed in a row, giving up")]
    CatalogExhausted { failures: usize },
}

impl StreamError {
    /// Create a broken conduit error
    pub fn conduit(msg: impl Into<String>) -> Self {
        Self::ConduitBroken(msg.into())
    }

    /// Create an unavailable encoder error
    pub fn encoder_unavailable(program: impl Into<String>, source: Option<std::io::Error>) -> Self {
        Self::EncoderUnavailable {
            program: program.into(),
            source,
        }
    }

    /// Per-track failures skip to the next track instead of ending the session
    pub fn is_track_local(&self) -> bool {
        matches!(
            self,
            StreamError::ConduitBroken(_) | StreamError::UnreadableTrack { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_local_classification() {
        assert!(StreamError::conduit("exit status 1").is_track_local());
        assert!(StreamError::UnreadableTrack {
            path: PathBuf::from("/music/a.mp3"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .is_track_local());
        assert!(!StreamError::Disconnected.is_track_local());
        assert!(!StreamError::encoder_unavailable("ffmpeg", None).is_track_local());
        assert!(!StreamError::CatalogExhausted { failures: 3 }.is_track_local());
    }
}
