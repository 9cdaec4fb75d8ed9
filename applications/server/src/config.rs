/// Server configuration
use crate::error::{Result, ServerError};
use loopcast_core::AudioFormat;
use loopcast_stream::{EncoderCommand, MetadataMode, StreamSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_station")]
    pub station: StationSettings,

    #[serde(default = "default_stream")]
    pub stream: StreamConfig,

    #[serde(default = "default_transcoding")]
    pub transcoding: TranscodingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Advertised in `icy-url`; the request's Host is used when unset
    #[serde(default)]
    pub public_url: Option<String>,
}

/// Values sent in the `icy-*` response headers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationSettings {
    #[serde(default = "default_station_name")]
    pub name: String,

    #[serde(default = "default_genre")]
    pub genre: String,

    #[serde(default = "default_public")]
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_metadata_interval")]
    pub metadata_interval: usize,

    #[serde(default)]
    pub metadata_mode: MetadataMode,

    #[serde(default = "default_client_buffer_chunks")]
    pub client_buffer_chunks: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodingSettings {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default = "EncoderCommand::default_ffmpeg_args")]
    pub args: Vec<String>,

    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,

    /// Abandon a track whose encoder produces nothing for this long
    #[serde(default = "default_stall_timeout_ms")]
    pub stall_timeout_ms: u64,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `config.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) if !path.exists() => {
                return Err(ServerError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => {
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. LOOPCAST_SERVER__PORT=8000
        settings = settings.add_source(
            config::Environment::with_prefix("LOOPCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.stream.chunk_size == 0 {
            return Err(ServerError::Config(
                "stream.chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.stream.metadata_interval == 0 {
            return Err(ServerError::Config(
                "stream.metadata_interval must be greater than 0".to_string(),
            ));
        }

        if self.stream.bitrate_kbps == 0 {
            return Err(ServerError::Config(
                "stream.bitrate_kbps must be greater than 0".to_string(),
            ));
        }

        if !self.stream.output_format.is_streamable_output() {
            return Err(ServerError::Config(format!(
                "Output format {} cannot be streamed (use mp3, ogg, opus or flac)",
                self.stream.output_format
            )));
        }

        if !self.encoder().is_available() {
            // Passthrough-only catalogs still work without an encoder
            tracing::warn!(
                "Encoder not found at {:?}; only tracks already in {} can be streamed",
                self.transcoding.ffmpeg_path,
                self.stream.output_format
            );
        }

        Ok(())
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            output_format: self.stream.output_format,
            bitrate_kbps: self.stream.bitrate_kbps,
            chunk_size: self.stream.chunk_size,
            metadata_interval: self.stream.metadata_interval,
            metadata_mode: self.stream.metadata_mode,
            kill_grace: Duration::from_millis(self.transcoding.kill_grace_ms),
            stall_timeout: Duration::from_millis(self.transcoding.stall_timeout_ms),
            client_buffer_chunks: self.stream.client_buffer_chunks,
        }
    }

    pub fn encoder(&self) -> EncoderCommand {
        EncoderCommand::new(
            self.transcoding.ffmpeg_path.clone(),
            self.transcoding.args.clone(),
        )
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
        public_url: None,
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_station() -> StationSettings {
    StationSettings {
        name: default_station_name(),
        genre: default_genre(),
        public: default_public(),
    }
}

fn default_station_name() -> String {
    "Live Audio Stream".to_string()
}

fn default_genre() -> String {
    "Various".to_string()
}

fn default_public() -> bool {
    true
}

fn default_stream() -> StreamConfig {
    StreamConfig {
        audio_dir: default_audio_dir(),
        output_format: default_output_format(),
        bitrate_kbps: default_bitrate(),
        chunk_size: default_chunk_size(),
        metadata_interval: default_metadata_interval(),
        metadata_mode: MetadataMode::default(),
        client_buffer_chunks: default_client_buffer_chunks(),
    }
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio")
}

fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

fn default_bitrate() -> u32 {
    128
}

fn default_chunk_size() -> usize {
    loopcast_stream::settings::DEFAULT_CHUNK_SIZE
}

fn default_metadata_interval() -> usize {
    loopcast_stream::settings::DEFAULT_METADATA_INTERVAL
}

fn default_client_buffer_chunks() -> usize {
    32
}

fn default_transcoding() -> TranscodingSettings {
    TranscodingSettings {
        ffmpeg_path: default_ffmpeg_path(),
        args: EncoderCommand::default_ffmpeg_args(),
        kill_grace_ms: default_kill_grace_ms(),
        stall_timeout_ms: default_stall_timeout_ms(),
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_kill_grace_ms() -> u64 {
    2000
}

fn default_stall_timeout_ms() -> u64 {
    10_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            station: default_station(),
            stream: default_stream(),
            transcoding: default_transcoding(),
        }
    }
}
