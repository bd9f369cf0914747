//! File-based snapshot source.
//!
//! A batch file holds either a JSON array of station snapshots or one
//! snapshot per line.

use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt};
use soh_types::StationSnapshot;
use tracing::debug;

use super::{SnapshotSource, SnapshotStream, SourceError};

/// A source that reads one batch of station snapshots from a file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole batch.
    pub async fn read(&self) -> Result<Vec<StationSnapshot>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Read {
                path: self.path.clone(),
                source,
            })?;
        let snapshots = parse_batch(&content)?;
        debug!(
            "Read {} station snapshots from {}",
            snapshots.len(),
            self.path.display()
        );
        Ok(snapshots)
    }
}

impl SnapshotSource for FileSource {
    fn description(&self) -> &str {
        &self.description
    }

    /// The file is read when the stream is first polled.
    fn snapshots(self: Box<Self>) -> SnapshotStream {
        stream::once(async move { self.read().await })
            .flat_map(|batch| {
                let items: Vec<_> = match batch {
                    Ok(snapshots) => snapshots.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .boxed()
    }
}

/// Parse batch content: a JSON array, or newline-delimited JSON.
///
/// Blank lines are ignored in the line-delimited form. Any malformed entry
/// fails the whole batch.
pub fn parse_batch(content: &str) -> Result<Vec<StationSnapshot>, SourceError> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(|source| SourceError::Parse {
            location: "batch array".to_string(),
            source,
        });
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| SourceError::Parse {
                location: format!("line {}", index + 1),
                source,
            })
        })
        .collect()
}
