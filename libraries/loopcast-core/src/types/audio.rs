/// Audio-related types
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::LoopcastError;

/// Container/codec family of an audio file or of the outgoing stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Ogg,
    Flac,
    Wav,
    Opus,
    M4a,
}

impl AudioFormat {
    /// All formats the scanner picks up
    pub const ALL: [AudioFormat; 6] = [
        AudioFormat::Mp3,
        AudioFormat::Ogg,
        AudioFormat::Flac,
        AudioFormat::Wav,
        AudioFormat::Opus,
        AudioFormat::M4a,
    ];

    /// Detect the format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "ogg" | "oga" => Some(AudioFormat::Ogg),
            "flac" => Some(AudioFormat::Flac),
            "wav" => Some(AudioFormat::Wav),
            "opus" => Some(AudioFormat::Opus),
            "m4a" | "aac" => Some(AudioFormat::M4a),
            _ => None,
        }
    }

    /// Detect the format of a file from its path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::Opus => "opus",
            AudioFormat::M4a => "m4a",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Opus => "audio/opus",
            AudioFormat::M4a => "audio/mp4",
        }
    }

    /// Muxer name understood by `ffmpeg -f`
    pub fn ffmpeg_muxer(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::Opus => "opus",
            // Fragment-free AAC for pipes
            AudioFormat::M4a => "adts",
        }
    }

    /// Demuxer name for reading this format with `ffmpeg -f`
    ///
    /// `M4a` maps to the MP4 demuxer. That demuxer needs the index (`moov`
    /// atom) before the audio when reading a pipe, and raw `.aac` files that
    /// share the variant only demux without a forced format.
    pub fn ffmpeg_demuxer(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg | AudioFormat::Opus => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "mov",
        }
    }

    /// Encoder name understood by `ffmpeg -c:a`
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "libmp3lame",
            AudioFormat::Ogg => "libvorbis",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "pcm_s16le",
            AudioFormat::Opus => "libopus",
            AudioFormat::M4a => "aac",
        }
    }

    /// Whether the format can be written progressively to a pipe as a
    /// continuous stream that players accept mid-way
    pub fn is_streamable_output(&self) -> bool {
        matches!(
            self,
            AudioFormat::Mp3 | AudioFormat::Ogg | AudioFormat::Opus | AudioFormat::Flac
        )
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = LoopcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim().trim_start_matches('.'))
            .ok_or_else(|| LoopcastError::UnsupportedFormat(s.to_string()))
    }
}
