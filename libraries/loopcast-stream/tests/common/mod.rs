//! Shared helpers for session integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use loopcast_core::AudioFormat;
use loopcast_stream::framer::{parse_block, parse_stream_title};
use loopcast_stream::{ClientSink, StreamError, Track, TrackCatalog};
use std::path::Path;
use tempfile::TempDir;

/// Write `len` bytes of `fill` to `dir/name` and describe it as a track
pub fn write_track(dir: &Path, name: &str, fill: u8, len: usize, title: &str) -> Track {
    let path = dir.join(name);
    std::fs::write(&path, vec![fill; len]).unwrap();
    track_at(&path, title)
}

/// Track entry for a path that may or may not exist
pub fn track_at(path: &Path, title: &str) -> Track {
    Track {
        path: path.to_path_buf(),
        source_format: AudioFormat::from_path(path).unwrap(),
        title: title.to_string(),
        artist: None,
    }
}

pub fn catalog(tracks: Vec<Track>) -> TrackCatalog {
    TrackCatalog::from_tracks(tracks).unwrap()
}

pub fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Collects everything in memory, hanging up once `limit` bytes arrived
#[derive(Debug, Default)]
pub struct MemorySink {
    pub bytes: Vec<u8>,
    limit: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit: Some(limit),
        }
    }
}

#[async_trait]
impl ClientSink for MemorySink {
    async fn write(&mut self, bytes: Bytes) -> loopcast_stream::Result<()> {
        if self.limit.is_some_and(|limit| self.bytes.len() >= limit) {
            return Err(StreamError::Disconnected);
        }
        self.bytes.extend_from_slice(&bytes);
        Ok(())
    }
}

/// Stream split back into audio and metadata
#[derive(Debug, Default)]
pub struct Demuxed {
    pub audio: Vec<u8>,
    /// Audio offset of each block and the title it carried
    pub titles: Vec<(usize, Option<String>)>,
}

/// Split an ICY stream with the given interval
///
/// A trailing partial interval or block is ignored.
pub fn demux(stream: &[u8], interval: usize) -> Demuxed {
    let mut out = Demuxed::default();
    let mut rest = stream;

    loop {
        if rest.len() < interval {
            out.audio.extend_from_slice(rest);
            return out;
        }
        out.audio.extend_from_slice(&rest[..interval]);
        rest = &rest[interval..];

        let Some(&length) = rest.first() else {
            return out;
        };
        let size = 1 + length as usize * 16;
        if rest.len() < size {
            return out;
        }
        let title = parse_block(&rest[..size]).and_then(|text| parse_stream_title(&text));
        out.titles.push((out.audio.len(), title));
        rest = &rest[size..];
    }
}
