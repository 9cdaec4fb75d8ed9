/// Common test utilities and fixtures
use axum::Router;
use loopcast_core::AudioFormat;
use loopcast_server::{create_router, AppState, ServerConfig};
use loopcast_stream::{EncoderCommand, StreamEngine, Track, TrackCatalog};
use std::path::Path;
use tempfile::TempDir;

pub mod fixtures {
    pub const STATION_NAME: &str = "Test Station";
    pub const FIRST_TITLE: &str = "First Light";
    pub const FIRST_ARTIST: &str = "The Testers";
    pub const SECOND_TITLE: &str = "Second Wind";
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.station.name = fixtures::STATION_NAME.to_string();
    config
}

/// Two small MP3-named tracks, streamed as MP3 without an encoder
pub fn write_catalog(dir: &Path) -> TrackCatalog {
    let first = dir.join("01_first.mp3");
    let second = dir.join("02_second.mp3");
    std::fs::write(&first, vec![0x11u8; 20_000]).unwrap();
    std::fs::write(&second, vec![0x22u8; 20_000]).unwrap();

    TrackCatalog::from_tracks(vec![
        Track {
            path: first,
            source_format: AudioFormat::Mp3,
            title: fixtures::FIRST_TITLE.to_string(),
            artist: Some(fixtures::FIRST_ARTIST.to_string()),
        },
        Track {
            path: second,
            source_format: AudioFormat::Mp3,
            title: fixtures::SECOND_TITLE.to_string(),
            artist: None,
        },
    ])
    .unwrap()
}

/// Router over a playable catalog; the temp dir must outlive the router
pub fn create_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config();
    let engine = StreamEngine::new(
        write_catalog(temp_dir.path()),
        config.stream_settings(),
        config.encoder(),
    );

    (create_router(AppState::new(Some(engine), &config)), temp_dir)
}

/// Router whose audio directory had nothing playable
pub fn create_empty_app() -> Router {
    create_router(AppState::new(None, &test_config()))
}

/// Router whose catalog needs an encoder that does not exist
pub fn create_app_without_encoder() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("track.flac");
    std::fs::write(&path, b"fLaC").unwrap();

    let catalog = TrackCatalog::from_tracks(vec![Track {
        path,
        source_format: AudioFormat::Flac,
        title: "Lossless".to_string(),
        artist: None,
    }])
    .unwrap();

    let config = test_config();
    let engine = StreamEngine::new(
        catalog,
        config.stream_settings(),
        EncoderCommand::new("/definitely/not/an/encoder", Vec::new()),
    );

    (create_router(AppState::new(Some(engine), &config)), temp_dir)
}
