//! Loopcast Metadata
//!
//! Tag extraction and music directory scanning for Loopcast.
//!
//! This crate provides:
//! - Title/artist tag reading from audio files (MP3, FLAC, OGG, WAV, M4A, OPUS)
//! - Recursive directory scanning producing an ordered candidate list with
//!   the detected source format of each file
//!
//! # Example
//!
//! ```rust,no_run
//! use loopcast_core::TagReader;
//! use loopcast_metadata::{LibraryScanner, LoftyTagReader};
//! use std::path::Path;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Discover audio files, alphabetically ordered
//! let candidates = LibraryScanner::default().scan(Path::new("/music"))?;
//!
//! // Read tags from the first one
//! let reader = LoftyTagReader::new();
//! let tags = reader.read_tags(&candidates[0].path)?;
//! # Ok(())
//! # }
//! ```

mod error;
mod reader;
mod scanner;

pub use error::{MetadataError, Result};
pub use reader::LoftyTagReader;
pub use scanner::{LibraryScanner, ScanConfig};
