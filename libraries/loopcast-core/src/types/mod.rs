mod audio;
mod track;

pub use audio::AudioFormat;
pub use track::{CandidateFile, TrackTags};
