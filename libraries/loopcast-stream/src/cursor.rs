/// Shared "now playing" cursor
use std::sync::atomic::{AtomicUsize, Ordering};

/// Best-effort index of the track most recently started by any session
///
/// Every session stores into it when it crosses a track boundary; nobody
/// reads it back for streaming decisions. Concurrent stores race and the last
/// one wins, which only affects status reporting.
#[derive(Debug, Default)]
pub struct PlaylistCursor {
    index: AtomicUsize,
}

impl PlaylistCursor {
    pub fn new(index: usize) -> Self {
        Self {
            index: AtomicUsize::new(index),
        }
    }

    /// Current value
    pub fn snapshot(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    /// Overwrite the value
    pub fn store(&self, index: usize) {
        self.index.store(index, Ordering::Relaxed);
    }
}
