/// Client byte sinks
use crate::error::{Result, StreamError};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Destination for one client's outgoing bytes
///
/// A write either accepts the whole chunk or fails with
/// [`StreamError::Disconnected`]; sessions never retry.
#[async_trait]
pub trait ClientSink: Send + Sync {
    async fn write(&mut self, bytes: Bytes) -> Result<()>;

    /// Resolves once the client is known to be gone
    ///
    /// Lets a session notice a hang-up while it is waiting on its source
    /// rather than on its next write. Sinks that cannot tell never resolve.
    async fn closed(&self) {
        std::future::pending::<()>().await;
    }
}

/// Sink backed by a bounded channel
///
/// The receiving half usually feeds an HTTP response body. The channel bound
/// is the only buffering between a session and its client, so a slow client
/// stalls its own session and nothing else.
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }

    /// Create a sink and the receiver it delivers to
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl ClientSink for ChannelSink {
    async fn write(&mut self, bytes: Bytes) -> Result<()> {
        self.tx
            .send(bytes)
            .await
            .map_err(|_| StreamError::Disconnected)
    }

    async fn closed(&self) {
        self.tx.closed().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_sink_delivers_in_order() {
        let (mut sink, mut rx) = ChannelSink::channel(4);
        sink.write(Bytes::from_static(b"ab")).await.unwrap();
        sink.write(Bytes::from_static(b"cd")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"ab"));
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"cd"));
    }

    #[tokio::test]
    async fn dropped_receiver_is_a_disconnect() {
        let (mut sink, rx) = ChannelSink::channel(1);
        drop(rx);

        let err = sink.write(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, StreamError::Disconnected));
    }

    #[tokio::test]
    async fn closed_resolves_when_the_receiver_goes_away() {
        let (sink, rx) = ChannelSink::channel(1);
        drop(rx);

        tokio::time::timeout(std::time::Duration::from_secs(1), sink.closed())
            .await
            .expect("closed() should resolve");
    }
}
