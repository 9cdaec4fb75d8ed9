/// Tag reader implementation using lofty
use crate::error::MetadataError;
use lofty::TaggedFileExt;
use loopcast_core::{TagReader, TrackTags};
use std::path::Path;

/// Tag reader using the lofty library
pub struct LoftyTagReader;

impl LoftyTagReader {
    /// Create a new tag reader
    pub fn new() -> Self {
        Self
    }

    /// Extract title/artist from lofty tag
    fn extract_from_tag(tag: &lofty::Tag) -> TrackTags {
        let mut tags = TrackTags::default();

        // lofty 0.18 API - iterate through items
        for item in tag.items() {
            match item.key() {
                lofty::ItemKey::TrackTitle if tags.title.is_none() => {
                    tags.title = item.value().text().map(|s| s.to_string());
                }
                lofty::ItemKey::TrackArtist if tags.artist.is_none() => {
                    tags.artist = item.value().text().map(|s| s.to_string());
                }
                _ => {}
            }
        }

        tags.normalized()
    }
}

impl Default for LoftyTagReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> loopcast_core::Result<TrackTags> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()).into());
        }

        let tagged_file = lofty::read_from_path(path).map_err(MetadataError::from)?;

        // Primary tag first, then whichever tag the container carries
        let tags = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.tags().first())
            .map(Self::extract_from_tag)
            .unwrap_or_default();

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_nonexistent_file_returns_error() {
        let reader = LoftyTagReader::new();
        let result = reader.read_tags(Path::new("/nonexistent/file.mp3"));
        assert!(result.is_err());
    }
}
