//! Snapshot sources for one monitoring cycle.
//!
//! A source turns some input (a batch file, a TCP connection, an in-process
//! channel) into a stream of station snapshots. The stream ends when the
//! batch is complete, which is what the rollup pipeline waits for.

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::{parse_batch, FileSource};
pub use stream::StreamSource;

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;

use futures_util::stream::BoxStream;
use soh_types::StationSnapshot;

/// The snapshot stream a source produces.
pub type SnapshotStream = BoxStream<'static, Result<StationSnapshot, SourceError>>;

/// Errors raised while reading snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid station snapshot at {location}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot stream failed")]
    Io(#[from] io::Error),
}

/// Something that can produce one batch of station snapshots.
///
/// # Example
///
/// ```
/// use futures_util::TryStreamExt;
/// use soh_doctor::{ChannelSource, SnapshotSource};
/// use soh_types::StationSnapshot;
///
/// # tokio_test::block_on(async {
/// let (tx, source) = ChannelSource::create("collector");
/// tx.send(StationSnapshot::new("ASAR")).await.unwrap();
/// drop(tx);
///
/// let snapshots: Vec<_> = Box::new(source).snapshots().try_collect().await.unwrap();
/// assert_eq!(snapshots.len(), 1);
/// # });
/// ```
pub trait SnapshotSource: Send + Debug {
    /// Human-readable description of where snapshots come from.
    fn description(&self) -> &str;

    /// Consume the source into its snapshot stream.
    fn snapshots(self: Box<Self>) -> SnapshotStream;
}
