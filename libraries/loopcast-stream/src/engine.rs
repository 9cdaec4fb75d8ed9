/// Shared entry point for opening client sessions
use crate::catalog::{PlaylistEntry, TrackCatalog};
use crate::cursor::PlaylistCursor;
use crate::encoder::EncoderCommand;
use crate::error::{Result, StreamError};
use crate::session::StreamSession;
use crate::settings::StreamSettings;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Point-in-time view of what the station is playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub track_title: String,
    pub track_artist: Option<String>,
    pub cursor_index: usize,
    pub catalog_size: usize,
}

/// Cheap to clone; every clone shares the catalog, cursor and shutdown token
#[derive(Clone)]
pub struct StreamEngine {
    catalog: Arc<TrackCatalog>,
    cursor: Arc<PlaylistCursor>,
    settings: Arc<StreamSettings>,
    encoder: Arc<EncoderCommand>,
    shutdown: CancellationToken,
}

impl StreamEngine {
    pub fn new(catalog: TrackCatalog, settings: StreamSettings, encoder: EncoderCommand) -> Self {
        Self::with_shared_catalog(Arc::new(catalog), settings, encoder)
    }

    /// Engine over a catalog that other engines may also read
    pub fn with_shared_catalog(
        catalog: Arc<TrackCatalog>,
        settings: StreamSettings,
        encoder: EncoderCommand,
    ) -> Self {
        Self {
            catalog,
            cursor: Arc::new(PlaylistCursor::default()),
            settings: Arc::new(settings),
            encoder: Arc::new(encoder),
            shutdown: CancellationToken::new(),
        }
    }

    /// Replace the shutdown token, typically with a child of the server's
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Create a session starting at `start_index` (taken modulo the catalog
    /// length)
    pub fn open_session(
        &self,
        start_index: usize,
        client_requested_metadata: bool,
    ) -> Result<StreamSession> {
        if self.catalog.requires_transcoding(self.settings.output_format)
            && !self.encoder.is_available()
        {
            return Err(StreamError::encoder_unavailable(
                self.encoder.program_name(),
                None,
            ));
        }

        let wants_metadata = self
            .settings
            .metadata_mode
            .wants_metadata(client_requested_metadata);

        Ok(StreamSession::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.cursor),
            Arc::clone(&self.settings),
            Arc::clone(&self.encoder),
            self.shutdown.clone(),
            start_index,
            wants_metadata,
        ))
    }

    /// Audio bytes between metadata blocks, for the `icy-metaint` header
    pub fn metadata_interval_bytes(&self) -> usize {
        self.settings.metadata_interval
    }

    /// Track index most recently started by any session
    ///
    /// New clients join the loop here.
    pub fn cursor_index(&self) -> usize {
        self.cursor.snapshot() % self.catalog.len()
    }

    pub fn current_status_snapshot(&self) -> StatusSnapshot {
        let index = self.cursor_index();
        let track = self.catalog.track_at(index);

        StatusSnapshot {
            track_title: track.title.clone(),
            track_artist: track.artist.clone(),
            cursor_index: index,
            catalog_size: self.catalog.len(),
        }
    }

    pub fn playlist(&self) -> Vec<PlaylistEntry> {
        self.catalog.playlist()
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop every session opened from this engine
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Track;
    use loopcast_core::AudioFormat;
    use std::path::PathBuf;

    fn catalog() -> TrackCatalog {
        TrackCatalog::from_tracks(vec![
            Track {
                path: PathBuf::from("/music/one.mp3"),
                source_format: AudioFormat::Mp3,
                title: "One".to_string(),
                artist: Some("Band".to_string()),
            },
            Track {
                path: PathBuf::from("/music/two.flac"),
                source_format: AudioFormat::Flac,
                title: "Two".to_string(),
                artist: None,
            },
        ])
        .unwrap()
    }

    #[test]
    fn status_snapshot_follows_cursor() {
        let engine = StreamEngine::new(
            catalog(),
            StreamSettings::default(),
            EncoderCommand::default(),
        );
        let status = engine.current_status_snapshot();
        assert_eq!(status.track_title, "One");
        assert_eq!(status.track_artist.as_deref(), Some("Band"));
        assert_eq!(status.catalog_size, 2);

        engine.cursor.store(1);
        let status = engine.current_status_snapshot();
        assert_eq!(status.cursor_index, 1);
        assert_eq!(status.track_title, "Two");
        assert_eq!(status.track_artist, None);
    }

    #[test]
    fn open_session_needs_encoder_when_transcoding() {
        let engine = StreamEngine::new(
            catalog(),
            StreamSettings::default(),
            EncoderCommand::new("/definitely/not/an/encoder", Vec::new()),
        );
        let err = engine.open_session(0, true).err().unwrap();
        assert!(matches!(err, StreamError::EncoderUnavailable { .. }));
    }

    #[test]
    fn passthrough_only_catalog_needs_no_encoder() {
        let catalog = TrackCatalog::from_tracks(vec![catalog().track_at(0).clone()]).unwrap();
        let engine = StreamEngine::new(
            catalog,
            StreamSettings::default(),
            EncoderCommand::new("/definitely/not/an/encoder", Vec::new()),
        );

        let session = engine.open_session(5, true).unwrap();
        assert_eq!(session.position(), 0);
        assert!(session.wants_metadata());
        assert_eq!(engine.metadata_interval_bytes(), 16_000);
        assert_eq!(engine.playlist()[0].filename, "one.mp3");
    }
}
