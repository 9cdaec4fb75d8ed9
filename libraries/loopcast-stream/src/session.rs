//! Per-client streaming loop
//!
//! A session walks the shared catalog from its own position, forever. Each
//! track is either copied straight from disk (when it is already in the
//! output format) or pushed through its own encoder process. Audio goes to
//! the client sink with metadata blocks spliced in at exact byte offsets.
//!
//! Sessions share nothing mutable except the status cursor, so one client
//! disconnecting, stalling, or hitting a broken file never affects another.

use crate::catalog::{Track, TrackCatalog};
use crate::conduit::TranscodeConduit;
use crate::cursor::PlaylistCursor;
use crate::encoder::EncoderCommand;
use crate::error::{Result, StreamError};
use crate::framer;
use crate::injector::{MetadataInjector, Segment};
use crate::settings::StreamSettings;
use crate::sink::ClientSink;
use bytes::{Bytes, BytesMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Why a session stopped without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client went away
    Disconnected,
    /// The server is shutting down
    Shutdown,
}

/// One client's stream, created by `StreamEngine::open_session`
pub struct StreamSession {
    id: Uuid,
    catalog: Arc<TrackCatalog>,
    cursor: Arc<PlaylistCursor>,
    settings: Arc<StreamSettings>,
    encoder: Arc<EncoderCommand>,
    shutdown: CancellationToken,
    position: usize,
    injector: Option<MetadataInjector>,
}

enum TrackSource {
    Passthrough { file: File, path: PathBuf },
    Transcode(TranscodeConduit),
}

impl TrackSource {
    async fn read(&mut self, max: usize) -> Result<Option<Bytes>> {
        match self {
            TrackSource::Passthrough { file, path } => {
                let mut buf = BytesMut::with_capacity(max.max(1));
                let n = file
                    .read_buf(&mut buf)
                    .await
                    .map_err(|source| StreamError::UnreadableTrack {
                        path: path.clone(),
                        source,
                    })?;
                Ok((n > 0).then(|| buf.freeze()))
            }
            TrackSource::Transcode(conduit) => conduit.read(max).await,
        }
    }

    async fn finish(&mut self) -> Result<()> {
        match self {
            TrackSource::Passthrough { .. } => Ok(()),
            TrackSource::Transcode(conduit) => conduit.finish().await,
        }
    }

    async fn close(&mut self) {
        if let TrackSource::Transcode(conduit) = self {
            conduit.close().await;
        }
    }
}

/// How a single track ended
enum TrackOutcome {
    Played { audio_bytes: u64 },
    Stopped(SessionEnd),
}

impl StreamSession {
    pub(crate) fn new(
        catalog: Arc<TrackCatalog>,
        cursor: Arc<PlaylistCursor>,
        settings: Arc<StreamSettings>,
        encoder: Arc<EncoderCommand>,
        shutdown: CancellationToken,
        start_index: usize,
        wants_metadata: bool,
    ) -> Self {
        let position = start_index % catalog.len();
        let injector = wants_metadata.then(|| MetadataInjector::new(settings.metadata_interval));

        Self {
            id: Uuid::new_v4(),
            catalog,
            cursor,
            settings,
            encoder,
            shutdown,
            position,
            injector,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    /// Whether the stream carries interleaved metadata blocks
    pub fn wants_metadata(&self) -> bool {
        self.injector.is_some()
    }

    /// Catalog index of the track this session plays next
    pub fn position(&self) -> usize {
        self.position
    }

    /// Stream into `sink` until the client leaves, the server shuts down, or
    /// every track in the catalog fails in a row
    pub async fn run<S>(mut self, sink: &mut S) -> Result<SessionEnd>
    where
        S: ClientSink + ?Sized,
    {
        let span = tracing::info_span!("session", id = %self.id);
        async move { self.stream(sink).await }
            .instrument(span)
            .await
    }

    async fn stream<S>(&mut self, sink: &mut S) -> Result<SessionEnd>
    where
        S: ClientSink + ?Sized,
    {
        tracing::info!(
            start = self.position,
            metadata = self.wants_metadata(),
            "Session started"
        );

        let catalog = Arc::clone(&self.catalog);
        let mut failures = 0usize;

        loop {
            let track = catalog.track_at(self.position);
            self.cursor.store(self.position);
            tracing::debug!(index = self.position, "Now playing {}", track.path.display());

            match self.play_track(track, sink).await {
                Ok(TrackOutcome::Played { audio_bytes }) if audio_bytes > 0 => {
                    failures = 0;
                }
                Ok(TrackOutcome::Played { .. }) => {
                    tracing::warn!("Track {} produced no audio, skipping", track.path.display());
                    failures += 1;
                }
                Ok(TrackOutcome::Stopped(end)) => {
                    match end {
                        SessionEnd::Disconnected => tracing::debug!("Client disconnected"),
                        SessionEnd::Shutdown => tracing::info!("Session stopped for shutdown"),
                    }
                    return Ok(end);
                }
                Err(e) if e.is_track_local() => {
                    tracing::warn!("Skipping track {}: {}", track.path.display(), e);
                    failures += 1;
                }
                Err(e) => {
                    tracing::error!("Session failed: {}", e);
                    return Err(e);
                }
            }

            if failures >= catalog.len() {
                tracing::error!("Every track failed in a row, ending session");
                return Err(StreamError::CatalogExhausted { failures });
            }

            self.position = catalog.next_index(self.position);
        }
    }

    async fn play_track<S>(&mut self, track: &Track, sink: &mut S) -> Result<TrackOutcome>
    where
        S: ClientSink + ?Sized,
    {
        let mut source = self.open_source(track).await?;

        match self.pump(&mut source, track, sink).await {
            Ok(TrackOutcome::Played { audio_bytes }) => {
                source.finish().await?;
                Ok(TrackOutcome::Played { audio_bytes })
            }
            other => {
                source.close().await;
                other
            }
        }
    }

    async fn open_source(&self, track: &Track) -> Result<TrackSource> {
        let file = open_track(&track.path).await?;

        if track.source_format == self.settings.output_format {
            return Ok(TrackSource::Passthrough {
                file,
                path: track.path.clone(),
            });
        }

        let mut conduit = TranscodeConduit::open(
            &self.encoder,
            track.source_format,
            self.settings.output_format,
            self.settings.bitrate_kbps,
            self.settings.kill_grace,
        )?
        .with_stall_timeout(self.settings.stall_timeout);
        conduit.spawn_feeder(file, track.path.clone(), self.settings.chunk_size)?;
        Ok(TrackSource::Transcode(conduit))
    }

    /// Move one track's audio to the sink
    async fn pump<S>(
        &mut self,
        source: &mut TrackSource,
        track: &Track,
        sink: &mut S,
    ) -> Result<TrackOutcome>
    where
        S: ClientSink + ?Sized,
    {
        let shutdown = self.shutdown.clone();
        let block = self
            .injector
            .is_some()
            .then(|| framer::frame(&track.title, track.artist.as_deref()));
        let mut audio_bytes = 0u64;

        loop {
            let chunk = tokio::select! {
                biased;
                () = shutdown.cancelled() => return Ok(TrackOutcome::Stopped(SessionEnd::Shutdown)),
                () = sink.closed() => return Ok(TrackOutcome::Stopped(SessionEnd::Disconnected)),
                chunk = source.read(self.settings.chunk_size) => chunk?,
            };
            let Some(chunk) = chunk else {
                return Ok(TrackOutcome::Played { audio_bytes });
            };
            audio_bytes += chunk.len() as u64;

            let segments = match (self.injector.as_mut(), &block) {
                (Some(injector), Some(_)) => injector.splice(chunk),
                _ => vec![Segment::Audio(chunk)],
            };

            for segment in segments {
                let bytes = match segment {
                    Segment::Audio(bytes) => bytes,
                    Segment::Metadata => block.clone().unwrap_or_default(),
                };
                if let Some(end) = send(&shutdown, sink, bytes).await {
                    return Ok(TrackOutcome::Stopped(end));
                }
            }
        }
    }
}

async fn open_track(path: &Path) -> Result<File> {
    File::open(path)
        .await
        .map_err(|source| StreamError::UnreadableTrack {
            path: path.to_path_buf(),
            source,
        })
}

/// Write one piece, racing the shutdown token
async fn send<S>(shutdown: &CancellationToken, sink: &mut S, bytes: Bytes) -> Option<SessionEnd>
where
    S: ClientSink + ?Sized,
{
    tokio::select! {
        biased;
        () = shutdown.cancelled() => Some(SessionEnd::Shutdown),
        result = sink.write(bytes) => result.err().map(|_| SessionEnd::Disconnected),
    }
}
