//! Station snapshots - one monitoring cycle's worth of health data for a station.

use std::collections::BTreeMap;

use crate::{MonitorReading, MonitorReadingBuilder, MonitorType, SnapshotId, Status};

/// Monitor readings for one channel of a station.
///
/// Readings are keyed by monitor type, so a channel carries at most one
/// reading per monitor type.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSnapshot {
    pub channel_name: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub readings: BTreeMap<MonitorType, MonitorReading>,
}

impl ChannelSnapshot {
    pub fn new(channel_name: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            readings: BTreeMap::new(),
        }
    }

    pub fn builder(channel_name: impl Into<String>) -> ChannelSnapshotBuilder {
        ChannelSnapshotBuilder::new(channel_name)
    }

    /// Status reported for a monitor type, if the channel has a reading for it.
    pub fn status(&self, monitor_type: MonitorType) -> Option<Status> {
        self.readings.get(&monitor_type).map(|r| r.status)
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// A point-in-time view of one station's health.
///
/// Snapshots are produced once per monitoring cycle by an external collector
/// and consumed read-only by the rollup engine.
///
/// # Example
///
/// ```rust
/// use soh_types::{MonitorType, StationSnapshot, Status};
///
/// let snapshot = StationSnapshot::builder("PDAR")
///     .timestamp_ms(1703160000000)
///     .channel("PDAR.PD01.SHZ", |c| c.status(MonitorType::Missing, Status::Good))
///     .build();
///
/// assert_eq!(snapshot.station_name, "PDAR");
/// assert!(snapshot.channel("PDAR.PD01.SHZ").is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationSnapshot {
    /// Opaque identifier of this snapshot.
    pub id: SnapshotId,

    pub station_name: String,

    /// Unix timestamp in milliseconds when this snapshot was taken.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp_ms: u64,

    /// Channel snapshots, keyed by channel name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub channels: BTreeMap<String, ChannelSnapshot>,
}

impl StationSnapshot {
    /// Create an empty snapshot with a fresh id and the current timestamp.
    pub fn new(station_name: impl Into<String>) -> Self {
        Self {
            id: SnapshotId::new_v4(),
            station_name: station_name.into(),
            timestamp_ms: current_timestamp_ms(),
            channels: BTreeMap::new(),
        }
    }

    pub fn builder(station_name: impl Into<String>) -> StationSnapshotBuilder {
        StationSnapshotBuilder::new(station_name)
    }

    pub fn channel(&self, channel_name: &str) -> Option<&ChannelSnapshot> {
        self.channels.get(channel_name)
    }

    /// Status a channel reported for a monitor type.
    pub fn status_of(&self, channel_name: &str, monitor_type: MonitorType) -> Option<Status> {
        self.channel(channel_name)?.status(monitor_type)
    }

    /// Number of channels in the snapshot.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Builder for `ChannelSnapshot`.
#[derive(Debug)]
pub struct ChannelSnapshotBuilder {
    channel_name: String,
    readings: BTreeMap<MonitorType, MonitorReading>,
}

impl ChannelSnapshotBuilder {
    pub fn new(channel_name: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            readings: BTreeMap::new(),
        }
    }

    /// Add a reading that only carries a status.
    pub fn status(self, monitor_type: MonitorType, status: Status) -> Self {
        self.reading(monitor_type, status, |r| r)
    }

    /// Add a reading built with a closure. A later reading for the same
    /// monitor type replaces the earlier one.
    pub fn reading<F>(mut self, monitor_type: MonitorType, status: Status, f: F) -> Self
    where
        F: FnOnce(MonitorReadingBuilder) -> MonitorReadingBuilder,
    {
        let reading = f(MonitorReadingBuilder::new(monitor_type, status)).build();
        self.readings.insert(monitor_type, reading);
        self
    }

    /// Add a pre-built reading.
    pub fn monitor_reading(mut self, reading: MonitorReading) -> Self {
        self.readings.insert(reading.monitor_type, reading);
        self
    }

    pub fn build(self) -> ChannelSnapshot {
        ChannelSnapshot {
            channel_name: self.channel_name,
            readings: self.readings,
        }
    }
}

/// Builder for `StationSnapshot`.
#[derive(Debug)]
pub struct StationSnapshotBuilder {
    id: Option<SnapshotId>,
    station_name: String,
    timestamp_ms: Option<u64>,
    channels: BTreeMap<String, ChannelSnapshot>,
}

impl StationSnapshotBuilder {
    pub fn new(station_name: impl Into<String>) -> Self {
        Self {
            id: None,
            station_name: station_name.into(),
            timestamp_ms: None,
            channels: BTreeMap::new(),
        }
    }

    /// Use a specific snapshot id instead of a random one.
    pub fn id(mut self, id: SnapshotId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Add a channel with readings built using a closure.
    pub fn channel<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(ChannelSnapshotBuilder) -> ChannelSnapshotBuilder,
    {
        let name = name.into();
        let channel = f(ChannelSnapshotBuilder::new(name.clone())).build();
        self.channels.insert(name, channel);
        self
    }

    /// Add a pre-built channel snapshot.
    pub fn channel_snapshot(mut self, channel: ChannelSnapshot) -> Self {
        self.channels.insert(channel.channel_name.clone(), channel);
        self
    }

    pub fn build(self) -> StationSnapshot {
        StationSnapshot {
            id: self.id.unwrap_or_else(SnapshotId::new_v4),
            station_name: self.station_name,
            timestamp_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            channels: self.channels,
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
