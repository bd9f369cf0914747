//! Stream-based snapshot source.
//!
//! Receives station snapshots as newline-delimited JSON from an async byte
//! stream such as a TCP connection. The batch ends when the stream does.

use futures_util::stream::{self, StreamExt};
use soh_types::StationSnapshot;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{SnapshotSource, SnapshotStream, SourceError};

type Item = Result<StationSnapshot, SourceError>;

/// A source fed by a background task reading an async stream.
///
/// Malformed lines are logged and skipped so one bad producer message does
/// not discard the cycle. A read error ends the stream with that error.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use soh_doctor::{SnapshotSource, StreamSource};
///
/// # tokio_test::block_on(async {
/// let stream = Cursor::new(b"{\"id\":\"67e55044-10b1-426f-9247-bb680e5fe0c8\",\"station_name\":\"ASAR\"}\n".to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// assert_eq!(source.description(), "stream: example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<Item>,
    description: String,
}

impl StreamSource {
    /// Spawn a task reading newline-delimited snapshots from `reader`.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(64);
        let desc = description.to_string();

        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            let mut line_number = 0usize;

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        line_number += 1;
                        if line.trim().is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<StationSnapshot>(&line) {
                            Ok(snapshot) => {
                                if tx.send(Ok(snapshot)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Skipping line {} from {}: {}", line_number, desc, e);
                            }
                        }
                    }
                    Ok(None) => {
                        debug!("{} closed after {} lines", desc, line_number);
                        break;
                    }
                    Err(e) => {
                        let _ = tx.send(Err(SourceError::Io(e))).await;
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
        }
    }

    /// Build a source from a channel of raw JSON messages, one snapshot each.
    ///
    /// The batch ends when every sender is dropped.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, snapshot_rx) = mpsc::channel(64);
        let desc = description.to_string();

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                match serde_json::from_slice::<StationSnapshot>(&bytes) {
                    Ok(snapshot) => {
                        if tx.send(Ok(snapshot)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Skipping message from {}: {}", desc, e),
                }
            }
        });

        Self {
            receiver: snapshot_rx,
            description: format!("stream: {}", description),
        }
    }
}

impl SnapshotSource for StreamSource {
    fn description(&self) -> &str {
        &self.description
    }

    fn snapshots(self: Box<Self>) -> SnapshotStream {
        stream::unfold(self.receiver, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use soh_types::{MonitorType, Status};
    use std::io::Cursor;

    fn snapshot_line(station: &str) -> String {
        let snapshot = StationSnapshot::builder(station)
            .channel(format!("{}.01.SHZ", station), |c| {
                c.status(MonitorType::Lag, Status::Bad)
            })
            .build();
        serde_json::to_string(&snapshot).unwrap()
    }

    async fn collect(source: StreamSource) -> Vec<StationSnapshot> {
        Box::new(source).snapshots().try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn test_stream_source_reads_until_eof() {
        let data = format!("{}\n{}\n", snapshot_line("ASAR"), snapshot_line("PDAR"));
        let source = StreamSource::spawn(Cursor::new(data), "test");

        let snapshots = collect(source).await;
        assert_eq!(snapshots.len(), 2);
        assert_eq!(
            snapshots[1].status_of("PDAR.01.SHZ", MonitorType::Lag),
            Some(Status::Bad)
        );
    }

    #[tokio::test]
    async fn test_stream_source_skips_malformed_lines() {
        let data = format!(
            "not valid json\n\n{}\n{{\"station_name\": 3}}\n",
            snapshot_line("TXAR")
        );
        let source = StreamSource::spawn(Cursor::new(data), "test");

        let snapshots = collect(source).await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].station_name, "TXAR");
    }

    #[tokio::test]
    async fn test_stream_source_empty_stream() {
        let source = StreamSource::spawn(Cursor::new(""), "test");
        assert!(collect(source).await.is_empty());
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://localhost:9090");
        assert_eq!(source.description(), "stream: tcp://localhost:9090");
    }

    #[tokio::test]
    async fn test_stream_source_from_bytes_channel() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let source = StreamSource::from_bytes_channel(rx, "test-channel");

        tx.send(snapshot_line("ASAR").into_bytes()).await.unwrap();
        tx.send(b"garbage".to_vec()).await.unwrap();
        tx.send(snapshot_line("PDAR").into_bytes()).await.unwrap();
        drop(tx);

        let snapshots = collect(source).await;
        let names: Vec<_> = snapshots.iter().map(|s| s.station_name.as_str()).collect();
        assert_eq!(names, ["ASAR", "PDAR"]);
    }
}
