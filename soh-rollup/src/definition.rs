//! Rollup definitions for the three tiers.
//!
//! A definition wraps one operator tree scoped to its tier. Station
//! definitions carry the channel definitions their tree needs, and group
//! definitions carry the station definitions theirs needs, so one
//! [`GroupRollupDefinition`] is everything required to evaluate a group.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RollupError;
use crate::evaluator::validate_tree;
use crate::tree::RollupOperator;

/// How a channel's monitor readings roll up into a channel status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ChannelRollupDefinition {
    pub operator: RollupOperator,
}

impl ChannelRollupDefinition {
    pub fn new(operator: RollupOperator) -> Self {
        Self { operator }
    }

    pub fn validate(&self) -> Result<(), RollupError> {
        validate_tree(&self.operator, RollupOperator::monitor_type_operands)
    }
}

/// How a station's channel statuses roll up into a station status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StationRollupDefinition {
    pub operator: RollupOperator,

    /// Channel definitions, keyed by channel name.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelRollupDefinition>,
}

impl StationRollupDefinition {
    pub fn new(operator: RollupOperator) -> Self {
        Self {
            operator,
            channels: BTreeMap::new(),
        }
    }

    /// Add the definition for one channel.
    pub fn channel(mut self, name: impl Into<String>, definition: ChannelRollupDefinition) -> Self {
        self.channels.insert(name.into(), definition);
        self
    }

    pub fn channel_definition(&self, channel_name: &str) -> Option<&ChannelRollupDefinition> {
        self.channels.get(channel_name)
    }

    /// Channel names the station tree references.
    pub fn referenced_channels(&self) -> BTreeSet<&str> {
        self.operator
            .leaves(RollupOperator::channel_operands)
            .into_iter()
            .map(String::as_str)
            .collect()
    }

    /// Check the station tree and its channel definitions.
    ///
    /// Every channel leaf must have a channel definition; channel
    /// definitions the tree never references are allowed.
    pub fn validate(&self, station_name: &str) -> Result<(), RollupError> {
        validate_tree(&self.operator, RollupOperator::channel_operands)?;

        if let Some(channel) = self
            .referenced_channels()
            .into_iter()
            .find(|c| !self.channels.contains_key(*c))
        {
            return Err(RollupError::UndefinedChannel {
                station: station_name.to_string(),
                channel: channel.to_string(),
            });
        }

        self.channels
            .values()
            .try_for_each(ChannelRollupDefinition::validate)
    }
}

/// How a station group's station statuses roll up into one capability
/// status.
///
/// # Example
///
/// ```rust
/// use soh_rollup::{
///     ChannelRollupDefinition, GroupRollupDefinition, RollupOperator, StationRollupDefinition,
/// };
/// use soh_types::MonitorType;
///
/// let channel = ChannelRollupDefinition::new(
///     RollupOperator::worst_of().monitor_types([MonitorType::Missing, MonitorType::Lag]),
/// );
/// let station = StationRollupDefinition::new(RollupOperator::best_of().channels(["ASAR.AS01.SHZ"]))
///     .channel("ASAR.AS01.SHZ", channel);
/// let group = GroupRollupDefinition::new("Primary", RollupOperator::best_of().stations(["ASAR"]))
///     .station("ASAR", station);
///
/// assert!(group.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GroupRollupDefinition {
    pub name: String,

    pub operator: RollupOperator,

    /// Station definitions, keyed by station name.
    #[serde(default)]
    pub stations: BTreeMap<String, StationRollupDefinition>,
}

impl GroupRollupDefinition {
    pub fn new(name: impl Into<String>, operator: RollupOperator) -> Self {
        Self {
            name: name.into(),
            operator,
            stations: BTreeMap::new(),
        }
    }

    /// Add the definition for one station.
    pub fn station(mut self, name: impl Into<String>, definition: StationRollupDefinition) -> Self {
        self.stations.insert(name.into(), definition);
        self
    }

    pub fn station_definition(&self, station_name: &str) -> Option<&StationRollupDefinition> {
        self.stations.get(station_name)
    }

    /// Station names the group tree references.
    pub fn referenced_stations(&self) -> BTreeSet<&str> {
        self.operator
            .leaves(RollupOperator::station_operands)
            .into_iter()
            .map(String::as_str)
            .collect()
    }

    /// Check every tree reachable from this group.
    ///
    /// Reports degenerate nodes, station leaves without a station definition
    /// and channel leaves without a channel definition.
    pub fn validate(&self) -> Result<(), RollupError> {
        validate_tree(&self.operator, RollupOperator::station_operands)?;

        if let Some(station) = self
            .referenced_stations()
            .into_iter()
            .find(|s| !self.stations.contains_key(*s))
        {
            return Err(RollupError::UndefinedStation {
                group: self.name.clone(),
                station: station.to_string(),
            });
        }

        self.stations
            .iter()
            .try_for_each(|(name, station)| station.validate(name))
    }
}

#[cfg(test)]
mod tests {
    use soh_types::MonitorType;

    use super::*;
    use crate::operator::OperatorKind;

    fn channel() -> ChannelRollupDefinition {
        ChannelRollupDefinition::new(
            RollupOperator::worst_of().monitor_types([MonitorType::Missing, MonitorType::Lag]),
        )
    }

    fn station(channels: &[&str]) -> StationRollupDefinition {
        channels.iter().fold(
            StationRollupDefinition::new(RollupOperator::best_of().channels(channels.iter().copied())),
            |def, name| def.channel(*name, channel()),
        )
    }

    #[test]
    fn valid_group() {
        let group = GroupRollupDefinition::new(
            "Primary",
            RollupOperator::min_good_of(1, 0)
                .stations(["ASAR"])
                .child(RollupOperator::best_of().stations(["PDAR"])),
        )
        .station("ASAR", station(&["ASAR.AS01.SHZ"]))
        .station("PDAR", station(&["PDAR.PD01.SHZ", "PDAR.PD02.SHZ"]));

        assert_eq!(group.validate(), Ok(()));
        assert_eq!(
            group.referenced_stations().into_iter().collect::<Vec<_>>(),
            ["ASAR", "PDAR"]
        );
    }

    #[test]
    fn undefined_station_is_reported() {
        let group = GroupRollupDefinition::new(
            "Primary",
            RollupOperator::best_of().stations(["ASAR", "TXAR"]),
        )
        .station("ASAR", station(&["ASAR.AS01.SHZ"]));

        assert_eq!(
            group.validate(),
            Err(RollupError::UndefinedStation {
                group: "Primary".to_string(),
                station: "TXAR".to_string(),
            })
        );
    }

    #[test]
    fn undefined_channel_is_reported() {
        let station = StationRollupDefinition::new(
            RollupOperator::worst_of().channels(["ASAR.AS01.SHZ", "ASAR.AS02.SHZ"]),
        )
        .channel("ASAR.AS01.SHZ", channel());

        assert_eq!(
            station.validate("ASAR"),
            Err(RollupError::UndefinedChannel {
                station: "ASAR".to_string(),
                channel: "ASAR.AS02.SHZ".to_string(),
            })
        );
    }

    #[test]
    fn degenerate_channel_tree_is_reported() {
        let empty_channel = ChannelRollupDefinition::new(RollupOperator::best_of());
        let station = StationRollupDefinition::new(RollupOperator::best_of().channels(["c"]))
            .channel("c", empty_channel);
        let group = GroupRollupDefinition::new("G", RollupOperator::best_of().stations(["S"]))
            .station("S", station);

        assert_eq!(
            group.validate(),
            Err(RollupError::EmptyOperands {
                kind: OperatorKind::BestOf
            })
        );
    }

    #[test]
    fn unreferenced_definitions_are_allowed() {
        let station = station(&["ASAR.AS01.SHZ"]).channel("ASAR.AS99.SHZ", channel());
        assert!(station.validate("ASAR").is_ok());
        assert_eq!(
            station.referenced_channels().into_iter().collect::<Vec<_>>(),
            ["ASAR.AS01.SHZ"]
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let group = GroupRollupDefinition::new("Primary", RollupOperator::best_of().stations(["ASAR"]))
            .station("ASAR", station(&["ASAR.AS01.SHZ"]));
        let json = serde_json::to_string(&group).unwrap();
        let parsed: GroupRollupDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(group, parsed);
    }
}
