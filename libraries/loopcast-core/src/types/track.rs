/// Track input types
use crate::types::AudioFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file discovered on disk that may become a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// File path on disk
    pub path: PathBuf,

    /// Source format detected from the extension
    pub format: AudioFormat,
}

impl CandidateFile {
    pub fn new(path: PathBuf, format: AudioFormat) -> Self {
        Self { path, format }
    }

    /// Build a candidate from a path, detecting its format from the extension
    ///
    /// Returns `None` for files with an unknown extension.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let format = AudioFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    /// File name without directories, lossily converted
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Embedded tags relevant to "now playing" display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl TrackTags {
    pub fn new(title: Option<String>, artist: Option<String>) -> Self {
        Self { title, artist }
    }

    /// Tags with blank values treated as missing
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            title: keep(self.title),
            artist: keep(self.artist),
        }
    }
}
