/// Music directory scanner
use crate::error::{MetadataError, Result};
use loopcast_core::{AudioFormat, CandidateFile};
use std::path::Path;

/// Scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Formats to pick up (default: every known format)
    pub formats: Vec<AudioFormat>,

    /// Follow symbolic links while walking (default: false)
    pub follow_links: bool,

    /// Skip dot-files and dot-directories (default: true)
    pub skip_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            formats: AudioFormat::ALL.to_vec(),
            follow_links: false,
            skip_hidden: true,
        }
    }
}

/// Library scanner
///
/// Walks a directory recursively and returns every supported audio file,
/// ordered by full path. That order is the catalog order.
#[derive(Debug, Clone, Default)]
pub struct LibraryScanner {
    config: ScanConfig,
}

impl LibraryScanner {
    /// Create a new library scanner
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan a directory for audio files
    ///
    /// A single file path yields that file alone when its format is supported.
    pub fn scan(&self, path: &Path) -> Result<Vec<CandidateFile>> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }

        if path.is_file() {
            return Ok(self.candidate(path).into_iter().collect());
        }

        if !path.is_dir() {
            return Err(MetadataError::NotADirectory(path.display().to_string()));
        }

        let mut files = Vec::new();
        let skip_hidden = self.config.skip_hidden;

        let walker = walkdir::WalkDir::new(path)
            .follow_links(self.config.follow_links)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(skip_hidden && is_hidden(e)));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() || (self.config.follow_links && entry.path().is_file())
            {
                if let Some(candidate) = self.candidate(entry.path()) {
                    files.push(candidate);
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::info!("Found {} audio files in {}", files.len(), path.display());

        Ok(files)
    }

    /// Build a candidate if the file is a supported audio format
    fn candidate(&self, path: &Path) -> Option<CandidateFile> {
        CandidateFile::from_path(path.to_path_buf())
            .filter(|c| self.config.formats.contains(&c.format))
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
