/// Metadata injection byte counter
use bytes::Bytes;

/// Piece of outgoing stream produced by [`MetadataInjector::splice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Audio bytes to forward unchanged
    Audio(Bytes),
    /// A metadata block is due at this exact offset
    Metadata,
}

/// Counts audio bytes sent to one client and marks every interval boundary
///
/// The counter survives track changes: it is only reset by a metadata point,
/// never by the start of a new track.
#[derive(Debug, Clone)]
pub struct MetadataInjector {
    interval: usize,
    since_last: usize,
}

impl MetadataInjector {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            since_last: 0,
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Audio bytes emitted since the last metadata point
    pub fn bytes_since_last(&self) -> usize {
        self.since_last
    }

    /// Split `chunk` at every interval boundary it crosses
    ///
    /// A boundary that coincides with the end of the chunk yields a trailing
    /// `Metadata`, so the block is emitted before any byte of the next chunk.
    pub fn splice(&mut self, mut chunk: Bytes) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(2);

        while !chunk.is_empty() {
            let room = self.interval - self.since_last;
            if chunk.len() < room {
                self.since_last += chunk.len();
                segments.push(Segment::Audio(chunk));
                break;
            }

            segments.push(Segment::Audio(chunk.split_to(room)));
            segments.push(Segment::Metadata);
            self.since_last = 0;
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(len: usize) -> Bytes {
        Bytes::from(vec![7u8; len])
    }

    fn shape(segments: &[Segment]) -> Vec<Option<usize>> {
        segments
            .iter()
            .map(|s| match s {
                Segment::Audio(b) => Some(b.len()),
                Segment::Metadata => None,
            })
            .collect()
    }

    #[test]
    fn chunk_below_interval_passes_through() {
        let mut injector = MetadataInjector::new(100);
        assert_eq!(shape(&injector.splice(audio(40))), vec![Some(40)]);
        assert_eq!(injector.bytes_since_last(), 40);
    }

    #[test]
    fn boundary_inside_chunk_splits_it() {
        let mut injector = MetadataInjector::new(100);
        injector.splice(audio(70));
        assert_eq!(
            shape(&injector.splice(audio(50))),
            vec![Some(30), None, Some(20)]
        );
        assert_eq!(injector.bytes_since_last(), 20);
    }

    #[test]
    fn chunk_spanning_several_boundaries() {
        let mut injector = MetadataInjector::new(10);
        assert_eq!(
            shape(&injector.splice(audio(35))),
            vec![Some(10), None, Some(10), None, Some(10), None, Some(5)]
        );
        assert_eq!(injector.bytes_since_last(), 5);
    }

    #[test]
    fn boundary_at_chunk_end_injects_immediately() {
        let mut injector = MetadataInjector::new(10);
        assert_eq!(shape(&injector.splice(audio(10))), vec![Some(10), None]);
        assert_eq!(injector.bytes_since_last(), 0);
    }

    #[test]
    fn empty_chunk_is_a_no_op() {
        let mut injector = MetadataInjector::new(10);
        injector.splice(audio(3));
        assert!(injector.splice(Bytes::new()).is_empty());
        assert_eq!(injector.bytes_since_last(), 3);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let injector = MetadataInjector::new(0);
        assert_eq!(injector.interval(), 1);
    }
}
