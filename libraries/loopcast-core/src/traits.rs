/// Core traits for Loopcast
use crate::error::Result;
use crate::types::TrackTags;
use std::path::Path;

/// Tag reader trait
///
/// Implementers extract the embedded title/artist of an audio file. Missing
/// tags are reported as `None` fields, not as errors; errors are reserved for
/// files that cannot be opened or parsed at all.
pub trait TagReader: Send + Sync {
    /// Read title and artist tags from the given file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its tags cannot be parsed
    fn read_tags(&self, path: &Path) -> Result<TrackTags>;
}

impl<F> TagReader for F
where
    F: Fn(&Path) -> Result<TrackTags> + Send + Sync,
{
    fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        self(path)
    }
}
