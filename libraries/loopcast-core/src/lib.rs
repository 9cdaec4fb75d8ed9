//! Loopcast Core
//!
//! Platform-agnostic types, traits, and error handling shared by the Loopcast
//! crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `AudioFormat`, `CandidateFile`, `TrackTags`
//! - **Core Traits**: `TagReader`
//! - **Error Handling**: Unified `LoopcastError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use loopcast_core::{AudioFormat, CandidateFile};
//! use std::path::PathBuf;
//!
//! let candidate = CandidateFile::from_path(PathBuf::from("/music/song.mp3"));
//! assert_eq!(candidate.map(|c| c.format), Some(AudioFormat::Mp3));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Error types
pub mod error;
/// Core traits
pub mod traits;
/// Domain types
pub mod types;

// Re-export commonly used types
pub use error::{LoopcastError, Result};
pub use traits::TagReader;
pub use types::{AudioFormat, CandidateFile, TrackTags};
