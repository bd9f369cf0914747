//! Deployment file layout, as deserialized before resolution.
//!
//! ```toml
//! [defaults.channel_rollup]
//! operator_type = "WORST_OF"
//! monitor_type_operands = ["MISSING", "LAG"]
//!
//! [[operators]]
//! name = "two-good"
//! rollup = { operator_type = "MIN_GOOD_OF", good_threshold = 2, marginal_threshold = 1 }
//!
//! [[stations]]
//! name = "ASAR"
//! channels = ["ASAR.AS01.SHZ", "ASAR.AS02.SHZ", "ASAR.AS03.SHZ"]
//! rollup = { reference = "two-good" }
//!
//! [[station_groups]]
//! name = "Primary"
//! stations = ["ASAR"]
//! rollup = { operator_type = "BEST_OF" }
//! ```

use serde::Deserialize;

/// Top level of a deployment file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentFile {
    #[serde(default)]
    pub defaults: RollupDefaults,

    /// Named operators, usable anywhere through `reference`.
    #[serde(default)]
    pub operators: Vec<NamedOperator>,

    #[serde(default)]
    pub stations: Vec<StationConfig>,

    #[serde(default)]
    pub station_groups: Vec<StationGroupConfig>,
}

/// Operators used when nothing more specific is configured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RollupDefaults {
    pub group_rollup: Option<OperatorConfig>,
    pub station_rollup: Option<OperatorConfig>,
    pub channel_rollup: Option<OperatorConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedOperator {
    pub name: String,
    pub rollup: OperatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: String,

    /// Every channel of the station.
    #[serde(default)]
    pub channels: Vec<String>,

    /// Channels to station rollup.
    pub rollup: Option<OperatorConfig>,

    /// Monitor types to channel rollup for the channels without their own.
    pub channel_rollup: Option<OperatorConfig>,

    #[serde(default)]
    pub channel_rollups: Vec<ChannelRollupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRollupConfig {
    pub channel: String,
    pub rollup: OperatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationGroupConfig {
    pub name: String,

    /// Member stations.
    #[serde(default)]
    pub stations: Vec<String>,

    /// Stations to group rollup.
    pub rollup: Option<OperatorConfig>,

    /// Group-specific station rollups, replacing the station's own.
    #[serde(default)]
    pub station_rollups: Vec<StationRollupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationRollupConfig {
    pub station: String,
    pub rollup: OperatorConfig,
}

/// One operator node as written in configuration.
///
/// Every field is optional here so that missing and conflicting fields can
/// be reported with configuration-level errors rather than serde messages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorConfig {
    pub operator_type: Option<String>,
    pub good_threshold: Option<i64>,
    pub marginal_threshold: Option<i64>,
    pub station_operands: Option<Vec<String>>,
    pub channel_operands: Option<Vec<String>>,
    pub monitor_type_operands: Option<Vec<String>>,
    pub rollup_operator_operands: Option<Vec<OperatorConfig>>,

    /// Name of an entry in `operators`; excludes every other field.
    pub reference: Option<String>,
}

impl OperatorConfig {
    /// An operator of the given kind with every other field unset.
    pub fn of_type(operator_type: impl Into<String>) -> Self {
        Self {
            operator_type: Some(operator_type.into()),
            ..Self::default()
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            reference: Some(name.into()),
            ..Self::default()
        }
    }

    /// Leaf fields that are present, with their names.
    pub(crate) fn present_leaf_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.station_operands.is_some() {
            fields.push("station_operands");
        }
        if self.channel_operands.is_some() {
            fields.push("channel_operands");
        }
        if self.monitor_type_operands.is_some() {
            fields.push("monitor_type_operands");
        }
        fields
    }

    /// True when any field besides `reference` is set.
    pub(crate) fn has_operator_fields(&self) -> bool {
        self.operator_type.is_some()
            || self.good_threshold.is_some()
            || self.marginal_threshold.is_some()
            || self.rollup_operator_operands.is_some()
            || !self.present_leaf_fields().is_empty()
    }
}
