//! Loopcast Stream - looping ICY audio sessions
//!
//! This crate turns a [`TrackCatalog`] into endless per-client byte streams:
//! - Passthrough for tracks already in the output format
//! - A dedicated encoder process per session for everything else
//! - ICY metadata blocks spliced in every `metadata_interval` audio bytes
//!
//! # Example
//!
//! ```no_run
//! use loopcast_stream::{ChannelSink, EncoderCommand, StreamEngine, StreamSettings, TrackCatalog};
//!
//! # async fn example(catalog: TrackCatalog) -> loopcast_stream::Result<()> {
//! let engine = StreamEngine::new(catalog, StreamSettings::default(), EncoderCommand::default());
//! let session = engine.open_session(0, true)?;
//! let (mut sink, _body) = ChannelSink::channel(32);
//! let end = session.run(&mut sink).await?;
//! # let _ = end;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod conduit;
pub mod cursor;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod framer;
pub mod injector;
pub mod session;
pub mod settings;
pub mod sink;

pub use catalog::{PlaylistEntry, Track, TrackCatalog};
pub use conduit::{EncoderInput, TranscodeConduit};
pub use cursor::PlaylistCursor;
pub use encoder::EncoderCommand;
pub use engine::{StatusSnapshot, StreamEngine};
pub use error::{Result, StreamError};
pub use injector::{MetadataInjector, Segment};
pub use session::{SessionEnd, StreamSession};
pub use settings::{MetadataMode, StreamSettings};
pub use sink::{ChannelSink, ClientSink};
