//! Ordered, immutable track catalog
//!
//! Built once at startup from the scanner's candidate list and a tag reader.
//! Sessions only ever read from it, so it is shared behind an `Arc` without
//! any locking.

use crate::error::{Result, StreamError};
use loopcast_core::{AudioFormat, CandidateFile, TagReader, TrackTags};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// File path on disk
    pub path: PathBuf,

    /// Format of the file as stored
    pub source_format: AudioFormat,

    /// Display title (file stem when untagged)
    pub title: String,

    /// Display artist, if tagged
    pub artist: Option<String>,
}

impl Track {
    /// Build a track from a candidate and its (possibly missing) tags
    pub fn from_candidate(candidate: CandidateFile, tags: TrackTags) -> Self {
        let tags = tags.normalized();
        let title = tags
            .title
            .unwrap_or_else(|| title_from_filename(&candidate.path));

        Self {
            path: candidate.path,
            source_format: candidate.format,
            title,
            artist: tags.artist,
        }
    }

    /// File name without directories, lossily converted
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn title_from_filename(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Playlist row as exposed by the `/playlist` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistEntry {
    pub index: usize,
    pub filename: String,
    pub title: String,
    pub artist: Option<String>,
}

/// Ordered sequence of tracks, looped by index modulo its length
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
}

impl TrackCatalog {
    /// Build the catalog in candidate order
    ///
    /// Tag read failures fall back to the file name and are not fatal; only an
    /// empty candidate list is.
    pub fn build<R>(candidates: Vec<CandidateFile>, reader: &R) -> Result<Self>
    where
        R: TagReader + ?Sized,
    {
        let tracks: Vec<Track> = candidates
            .into_iter()
            .map(|candidate| {
                let tags = match reader.read_tags(&candidate.path) {
                    Ok(tags) => tags,
                    Err(e) => {
                        tracing::debug!(
                            "No tags for {}: {}",
                            candidate.path.display(),
                            e
                        );
                        TrackTags::default()
                    }
                };
                Track::from_candidate(candidate, tags)
            })
            .collect();

        Self::from_tracks(tracks)
    }

    /// Wrap already-resolved tracks
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(StreamError::EmptyCatalog);
        }
        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false for a built catalog; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index` modulo the catalog length
    pub fn track_at(&self, index: usize) -> &Track {
        &self.tracks[index % self.tracks.len()]
    }

    /// Index that follows `index`, wrapping to 0 after the last track
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Whether streaming in `output` needs the external encoder for any track
    pub fn requires_transcoding(&self, output: AudioFormat) -> bool {
        self.tracks.iter().any(|t| t.source_format != output)
    }

    pub fn playlist(&self) -> Vec<PlaylistEntry> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, track)| PlaylistEntry {
                index,
                filename: track.file_name(),
                title: track.title.clone(),
                artist: track.artist.clone(),
            })
            .collect()
    }
}
