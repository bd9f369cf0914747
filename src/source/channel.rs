//! Channel-based snapshot source.
//!
//! Receives snapshots pushed by in-process producers, for example a message
//! bus subscriber that decodes its own wire format.

use futures_util::stream::{self, StreamExt};
use soh_types::StationSnapshot;
use tokio::sync::mpsc;

use super::{SnapshotSource, SnapshotStream};

/// A source fed through a tokio mpsc channel.
///
/// The batch is complete once every sender has been dropped.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<StationSnapshot>,
    description: String,
}

impl ChannelSource {
    /// Wrap an existing receiver.
    pub fn new(receiver: mpsc::Receiver<StationSnapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
        }
    }

    /// Create a sender and the source it feeds.
    pub fn create(source_description: &str) -> (mpsc::Sender<StationSnapshot>, Self) {
        let (tx, rx) = mpsc::channel(64);
        (tx, Self::new(rx, source_description))
    }
}

impl SnapshotSource for ChannelSource {
    fn description(&self) -> &str {
        &self.description
    }

    fn snapshots(self: Box<Self>) -> SnapshotStream {
        stream::unfold(self.receiver, |mut rx| async move {
            rx.recv().await.map(|snapshot| (Ok(snapshot), rx))
        })
        .boxed()
    }
}
