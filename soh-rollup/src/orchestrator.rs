//! Three-tier rollup orchestration over one batch of station snapshots.
//!
//! The same evaluator runs three times with a different leaf domain each
//! time: monitor types for a channel, channels for a station, stations for a
//! group. Each tier resolves its leaves from the tier below it, and anything
//! missing from the batch resolves to `MARGINAL` rather than failing the
//! rollup.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::RwLock;
use soh_types::{ChannelSnapshot, GroupRollup, MonitorType, StationSnapshot, Status};
use tracing::{debug, info};

use crate::definition::{ChannelRollupDefinition, GroupRollupDefinition, StationRollupDefinition};
use crate::error::RollupError;
use crate::evaluator::evaluate;
use crate::tree::RollupOperator;

/// One monitoring cycle's station snapshots, looked up by station name.
///
/// A batch holds at most one snapshot per station. When a station reports
/// twice, the later snapshot replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationBatch {
    snapshots: BTreeMap<String, StationSnapshot>,
}

impl StationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a snapshot, returning the one it replaced, if any.
    pub fn insert(&mut self, snapshot: StationSnapshot) -> Option<StationSnapshot> {
        let replaced = self
            .snapshots
            .insert(snapshot.station_name.clone(), snapshot);
        if let Some(old) = &replaced {
            debug!(
                "Station {} reported more than once in batch, keeping the latest snapshot",
                old.station_name
            );
        }
        replaced
    }

    pub fn get(&self, station_name: &str) -> Option<&StationSnapshot> {
        self.snapshots.get(station_name)
    }

    pub fn contains(&self, station_name: &str) -> bool {
        self.snapshots.contains_key(station_name)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshots in station name order.
    pub fn iter(&self) -> impl Iterator<Item = &StationSnapshot> {
        self.snapshots.values()
    }

    pub fn station_names(&self) -> impl Iterator<Item = &str> {
        self.snapshots.keys().map(String::as_str)
    }
}

impl FromIterator<StationSnapshot> for StationBatch {
    fn from_iter<I: IntoIterator<Item = StationSnapshot>>(iter: I) -> Self {
        let mut batch = StationBatch::new();
        batch.extend(iter);
        batch
    }
}

impl Extend<StationSnapshot> for StationBatch {
    fn extend<I: IntoIterator<Item = StationSnapshot>>(&mut self, iter: I) {
        for snapshot in iter {
            self.insert(snapshot);
        }
    }
}

/// Channel tier: roll a channel's monitor readings up into one status.
///
/// A monitor type the channel has no reading for resolves to `MARGINAL`.
/// The definition is validated first, so a malformed tree fails whatever the
/// channel reported.
pub fn channel_status(
    definition: &ChannelRollupDefinition,
    channel: &ChannelSnapshot,
) -> Result<Status, RollupError> {
    definition.validate()?;
    rollup_channel(definition, channel)
}

fn rollup_channel(
    definition: &ChannelRollupDefinition,
    channel: &ChannelSnapshot,
) -> Result<Status, RollupError> {
    evaluate(
        &definition.operator,
        RollupOperator::monitor_type_operands,
        |monitor_type: &MonitorType| channel.status(*monitor_type).unwrap_or(Status::Marginal),
    )
}

/// Station tier: roll a station's channel statuses up into one status.
///
/// Channel statuses are computed first for every channel in the snapshot that
/// has a definition. A channel the snapshot does not contain resolves to
/// `MARGINAL`. The station definition is validated against the snapshot's
/// station name before anything is resolved.
pub fn station_status(
    definition: &StationRollupDefinition,
    snapshot: &StationSnapshot,
) -> Result<Status, RollupError> {
    definition.validate(&snapshot.station_name)?;
    rollup_station(definition, snapshot)
}

fn rollup_station(
    definition: &StationRollupDefinition,
    snapshot: &StationSnapshot,
) -> Result<Status, RollupError> {
    let channel_statuses = snapshot
        .channels
        .iter()
        .filter_map(|(name, channel)| {
            definition
                .channel_definition(name)
                .map(|def| rollup_channel(def, channel).map(|status| (name.as_str(), status)))
        })
        .collect::<Result<HashMap<&str, Status>, RollupError>>()?;

    evaluate(
        &definition.operator,
        RollupOperator::channel_operands,
        |channel_name: &String| {
            channel_statuses
                .get(channel_name.as_str())
                .copied()
                .unwrap_or(Status::Marginal)
        },
    )
}

/// Group tier evaluation against one collected batch.
///
/// A station's status is computed at most once per batch for each distinct
/// station definition, then reused by every group sharing that definition.
/// The cache is behind a lock, so one evaluator can serve group evaluations
/// running on several threads.
pub struct BatchEvaluator<'a> {
    batch: &'a StationBatch,
    timestamp_ms: u64,
    station_cache: RwLock<HashMap<(&'a str, &'a StationRollupDefinition), Status>>,
}

impl<'a> BatchEvaluator<'a> {
    pub fn new(batch: &'a StationBatch, timestamp_ms: u64) -> Self {
        Self {
            batch,
            timestamp_ms,
            station_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn batch(&self) -> &StationBatch {
        self.batch
    }

    /// Number of station statuses computed so far.
    pub fn cached_stations(&self) -> usize {
        self.station_cache.read().len()
    }

    /// Evaluate one group definition.
    ///
    /// Only stations the group tree references are evaluated. A referenced
    /// station missing from the batch resolves to `MARGINAL` and contributes
    /// no snapshot id.
    ///
    /// The whole definition is validated up front, so configuration errors
    /// do not depend on which stations happen to be in the batch.
    pub fn evaluate(&self, definition: &'a GroupRollupDefinition) -> Result<GroupRollup, RollupError> {
        definition.validate()?;

        let mut station_statuses = BTreeMap::new();
        let mut station_snapshot_ids = BTreeSet::new();

        for station_name in definition.referenced_stations() {
            let status = match self.batch.get(station_name) {
                Some(snapshot) => {
                    let station_definition = definition
                        .station_definition(station_name)
                        .ok_or_else(|| RollupError::UndefinedStation {
                            group: definition.name.clone(),
                            station: station_name.to_string(),
                        })?;
                    station_snapshot_ids.insert(snapshot.id);
                    self.station_status(station_name, station_definition, snapshot)?
                }
                None => {
                    debug!(
                        "Group {}: no snapshot for station {}, resolving to {}",
                        definition.name,
                        station_name,
                        Status::Marginal
                    );
                    Status::Marginal
                }
            };
            station_statuses.insert(station_name.to_string(), status);
        }

        let status = evaluate(
            &definition.operator,
            RollupOperator::station_operands,
            |station_name: &String| {
                station_statuses
                    .get(station_name)
                    .copied()
                    .unwrap_or(Status::Marginal)
            },
        )?;

        info!(
            "Group {} rolled up to {} from {} of {} referenced stations",
            definition.name,
            status,
            station_snapshot_ids.len(),
            station_statuses.len()
        );

        Ok(GroupRollup {
            group_name: definition.name.clone(),
            status,
            timestamp_ms: self.timestamp_ms,
            station_snapshot_ids,
            station_statuses,
        })
    }

    /// Evaluate every definition, in order.
    pub fn evaluate_all(
        &self,
        definitions: &'a [GroupRollupDefinition],
    ) -> Result<Vec<GroupRollup>, RollupError> {
        definitions.iter().map(|def| self.evaluate(def)).collect()
    }

    fn station_status(
        &self,
        station_name: &'a str,
        definition: &'a StationRollupDefinition,
        snapshot: &StationSnapshot,
    ) -> Result<Status, RollupError> {
        let key = (station_name, definition);
        if let Some(status) = self.station_cache.read().get(&key).copied() {
            return Ok(status);
        }

        let status = rollup_station(definition, snapshot)?;
        self.station_cache.write().insert(key, status);
        Ok(status)
    }
}

/// Evaluate every group definition against one batch.
pub fn evaluate_groups(
    definitions: &[GroupRollupDefinition],
    batch: &StationBatch,
    timestamp_ms: u64,
) -> Result<Vec<GroupRollup>, RollupError> {
    BatchEvaluator::new(batch, timestamp_ms).evaluate_all(definitions)
}
