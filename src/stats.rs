//! Statistics over a resolved deployment.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use soh_rollup::{GroupRollupDefinition, OperatorKind, RollupOperator};

/// Shape of a set of group definitions, as printed by `soh-doctor check`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentStats {
    pub groups: usize,

    /// Number of station definitions per group.
    pub stations_per_group: BTreeMap<String, usize>,

    /// Stations defined by at least one group.
    pub distinct_stations: usize,

    /// Distinct station channels with a channel definition.
    pub channels: usize,

    /// Operator nodes across every tier, by kind.
    pub nodes_by_kind: BTreeMap<String, usize>,

    /// Deepest operator tree at any tier.
    pub max_depth: usize,
}

impl DeploymentStats {
    pub fn from_definitions(definitions: &[GroupRollupDefinition]) -> Self {
        let mut stats = Self {
            groups: definitions.len(),
            ..Self::default()
        };
        let mut kinds: BTreeMap<OperatorKind, usize> = BTreeMap::new();
        let mut stations = BTreeSet::new();
        let mut channels = BTreeSet::new();

        let mut visit = |tree: &RollupOperator, max_depth: &mut usize| {
            *max_depth = (*max_depth).max(tree.depth());
            tree.walk(&mut |node: &RollupOperator| *kinds.entry(node.kind()).or_insert(0) += 1);
        };

        for group in definitions {
            stats
                .stations_per_group
                .insert(group.name.clone(), group.stations.len());
            visit(&group.operator, &mut stats.max_depth);

            for (station_name, station) in &group.stations {
                stations.insert(station_name.as_str());
                visit(&station.operator, &mut stats.max_depth);

                for (channel_name, channel) in &station.channels {
                    channels.insert((station_name.as_str(), channel_name.as_str()));
                    visit(&channel.operator, &mut stats.max_depth);
                }
            }
        }

        stats.distinct_stations = stations.len();
        stats.channels = channels.len();
        stats.nodes_by_kind = kinds
            .into_iter()
            .map(|(kind, count)| (kind.to_string(), count))
            .collect();
        stats
    }

    /// Total operator nodes across every tier.
    pub fn node_count(&self) -> usize {
        self.nodes_by_kind.values().sum()
    }
}

impl fmt::Display for DeploymentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Groups:            {}", self.groups)?;
        for (group, count) in &self.stations_per_group {
            writeln!(f, "  {:<16} {} stations", group, count)?;
        }
        writeln!(f, "Distinct stations: {}", self.distinct_stations)?;
        writeln!(f, "Channels:          {}", self.channels)?;
        writeln!(f, "Operator nodes:    {}", self.node_count())?;
        for (kind, count) in &self.nodes_by_kind {
            writeln!(f, "  {:<16} {}", kind, count)?;
        }
        write!(f, "Max tree depth:    {}", self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soh_rollup::{ChannelRollupDefinition, StationRollupDefinition};
    use soh_types::MonitorType;

    fn station(channels: &[&str]) -> StationRollupDefinition {
        channels.iter().fold(
            StationRollupDefinition::new(RollupOperator::worst_of().channels(channels.iter().copied())),
            |station, channel| {
                station.channel(
                    *channel,
                    ChannelRollupDefinition::new(
                        RollupOperator::worst_of().monitor_types([MonitorType::Missing]),
                    ),
                )
            },
        )
    }

    fn definitions() -> Vec<GroupRollupDefinition> {
        let primary = GroupRollupDefinition::new(
            "Primary",
            RollupOperator::best_of()
                .child(RollupOperator::min_good_of(1, 1).stations(["ASAR", "PDAR"]))
                .child(RollupOperator::worst_of().stations(["TXAR"])),
        )
        .station("ASAR", station(&["AS01", "AS02"]))
        .station("PDAR", station(&["PD01"]))
        .station("TXAR", station(&["TX01"]));

        let auxiliary =
            GroupRollupDefinition::new("Auxiliary", RollupOperator::worst_of().stations(["ASAR"]))
                .station("ASAR", station(&["AS01", "AS02"]));

        vec![primary, auxiliary]
    }

    #[test]
    fn counts_groups_stations_and_channels() {
        let stats = DeploymentStats::from_definitions(&definitions());
        assert_eq!(stats.groups, 2);
        assert_eq!(stats.stations_per_group["Primary"], 3);
        assert_eq!(stats.stations_per_group["Auxiliary"], 1);
        assert_eq!(stats.distinct_stations, 3);
        assert_eq!(stats.channels, 4);
    }

    #[test]
    fn counts_nodes_by_kind_across_tiers() {
        let stats = DeploymentStats::from_definitions(&definitions());
        // Primary: 3 group nodes, 3 stations, 4 channels. Auxiliary: 1 + 1 + 2.
        assert_eq!(stats.nodes_by_kind["BEST_OF"], 1);
        assert_eq!(stats.nodes_by_kind["MIN_GOOD_OF"], 1);
        assert_eq!(stats.nodes_by_kind["WORST_OF"], 1 + 3 + 4 + 1 + 1 + 2);
        assert_eq!(stats.node_count(), 14);
        assert_eq!(stats.max_depth, 2);
    }

    #[test]
    fn empty_deployment() {
        let stats = DeploymentStats::from_definitions(&[]);
        assert_eq!(stats, DeploymentStats::default());
        let text = stats.to_string();
        assert!(text.starts_with("Groups:"));
        assert!(text.ends_with("0"));
    }

    #[test]
    fn serializes_to_json() {
        let stats = DeploymentStats::from_definitions(&definitions());
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["groups"], 2);
        assert_eq!(json["nodes_by_kind"]["BEST_OF"], 1);
    }
}
