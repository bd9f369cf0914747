//! Group rollup - the output of one capability evaluation.

use std::collections::{BTreeMap, BTreeSet};

use crate::{SnapshotId, Status};

/// Aggregate status of a station group for one monitoring cycle.
///
/// Besides the group status, a rollup records the status computed for every
/// station the group's operator tree references and the ids of the station
/// snapshots that fed the evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupRollup {
    pub group_name: String,

    pub status: Status,

    /// Unix timestamp in milliseconds the rollup was evaluated for.
    pub timestamp_ms: u64,

    /// Ids of the station snapshots that contributed to this rollup.
    pub station_snapshot_ids: BTreeSet<SnapshotId>,

    /// Status of each referenced station, keyed by station name.
    pub station_statuses: BTreeMap<String, Status>,
}

impl GroupRollup {
    pub fn station_status(&self, station_name: &str) -> Option<Status> {
        self.station_statuses.get(station_name).copied()
    }

    /// Count of referenced stations with the given status.
    pub fn count(&self, status: Status) -> usize {
        self.station_statuses.values().filter(|s| **s == status).count()
    }

    /// Number of station snapshots that contributed.
    pub fn reporting_count(&self) -> usize {
        self.station_snapshot_ids.len()
    }
}
