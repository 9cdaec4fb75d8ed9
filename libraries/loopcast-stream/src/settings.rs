/// Per-engine streaming settings
use crate::conduit::DEFAULT_GRACE;
use loopcast_core::AudioFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Audio bytes between two metadata blocks, as in common ICY servers
pub const DEFAULT_METADATA_INTERVAL: usize = 16_000;

/// Bytes pulled from a track or encoder per read
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Longest wait for encoder output before the track is abandoned
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Whether a session interleaves metadata blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataMode {
    /// Follow the client's `Icy-MetaData` request header
    #[default]
    Auto,
    /// Always interleave
    Forced,
    /// Never interleave, whatever the client asks for
    Disable,
}

impl MetadataMode {
    pub fn wants_metadata(self, client_requested: bool) -> bool {
        match self {
            MetadataMode::Auto => client_requested,
            MetadataMode::Forced => true,
            MetadataMode::Disable => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub output_format: AudioFormat,
    pub bitrate_kbps: u32,
    pub chunk_size: usize,
    pub metadata_interval: usize,
    pub metadata_mode: MetadataMode,
    /// How long an encoder may take to exit once its pipes are closed
    pub kill_grace: Duration,
    /// How long a transcoded track may go without producing output
    pub stall_timeout: Duration,
    /// Capacity of each client's outgoing channel, in chunks
    pub client_buffer_chunks: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            output_format: AudioFormat::Mp3,
            bitrate_kbps: 128,
            chunk_size: DEFAULT_CHUNK_SIZE,
            metadata_interval: DEFAULT_METADATA_INTERVAL,
            metadata_mode: MetadataMode::Auto,
            kill_grace: DEFAULT_GRACE,
            stall_timeout: DEFAULT_STALL_TIMEOUT,
            client_buffer_chunks: 32,
        }
    }
}
