//! Deployment configuration: loading a file and resolving it into group
//! rollup definitions.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use soh_rollup::{
    ChannelRollupDefinition, GroupRollupDefinition, RollupOperator, StationRollupDefinition,
};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::file::{DeploymentFile, OperatorConfig, StationConfig, StationGroupConfig};
use crate::resolve::{builtin_default, OperatorResolver};
use crate::tier::Tier;

/// Prefix of environment variables that override file settings, e.g.
/// `SOH_DEFAULTS__GROUP_ROLLUP__OPERATOR_TYPE=BEST_OF`.
pub const ENV_PREFIX: &str = "SOH";

/// A deployment configuration, loaded but not yet resolved.
///
/// # Example
///
/// ```rust
/// use soh_config::{DeploymentConfig, FileFormat};
///
/// let deployment = DeploymentConfig::parse(
///     r#"
///     [[stations]]
///     name = "ASAR"
///     channels = ["ASAR.AS01.SHZ", "ASAR.AS02.SHZ"]
///
///     [[station_groups]]
///     name = "Primary"
///     stations = ["ASAR"]
///     rollup = { operator_type = "BEST_OF" }
///     "#,
///     FileFormat::Toml,
/// )
/// .unwrap();
///
/// let groups = deployment.group_definitions().unwrap();
/// assert_eq!(groups[0].name, "Primary");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeploymentConfig {
    file: DeploymentFile,
}

impl DeploymentConfig {
    /// Load a deployment file, applying `SOH_` environment overrides.
    ///
    /// The format follows the file extension (TOML, JSON, YAML, ...).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let file: DeploymentFile = config.try_deserialize()?;
        info!(
            "Loaded deployment configuration from {}: {} stations, {} station groups",
            path.display(),
            file.stations.len(),
            file.station_groups.len()
        );
        Ok(Self { file })
    }

    /// Parse a deployment from a string.
    pub fn parse(contents: &str, format: FileFormat) -> Result<Self> {
        let file = Config::builder()
            .add_source(File::from_str(contents, format))
            .build()?
            .try_deserialize()?;
        Ok(Self { file })
    }

    pub fn from_file(file: DeploymentFile) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &DeploymentFile {
        &self.file
    }

    /// Resolve every station group into a validated definition.
    ///
    /// Groups are returned in file order. The first error stops resolution
    /// and names the group, station or operator it was found in.
    pub fn group_definitions(&self) -> Result<Vec<GroupRollupDefinition>> {
        let resolution = Resolution::new(&self.file)?;
        let definitions = self
            .file
            .station_groups
            .iter()
            .map(|group| {
                resolution
                    .group(group)
                    .map_err(|e| e.at(format!("station_groups[{}]", group.name)))
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Resolved {} station group definitions", definitions.len());
        Ok(definitions)
    }
}

/// Load a deployment file and resolve its group definitions.
pub fn load_group_definitions(path: impl AsRef<Path>) -> Result<Vec<GroupRollupDefinition>> {
    DeploymentConfig::load(path)?.group_definitions()
}

struct Resolution<'f> {
    resolver: OperatorResolver<'f>,
    stations: HashMap<&'f str, &'f StationConfig>,
    group_default: OperatorConfig,
    station_default: OperatorConfig,
    channel_default: OperatorConfig,
}

impl<'f> Resolution<'f> {
    fn new(file: &'f DeploymentFile) -> Result<Self> {
        let resolver = OperatorResolver::new(&file.operators)?;

        check_unique(file.station_groups.iter().map(|g| g.name.as_str()), "station group")?;
        check_unique(file.stations.iter().map(|s| s.name.as_str()), "station")?;
        for station in &file.stations {
            check_unique(station.channels.iter().map(String::as_str), "channel")
                .map_err(|e| e.at(format!("stations[{}]", station.name)))?;
        }

        let defaults = &file.defaults;
        Ok(Self {
            resolver,
            stations: file.stations.iter().map(|s| (s.name.as_str(), s)).collect(),
            group_default: defaults.group_rollup.clone().unwrap_or_else(builtin_default),
            station_default: defaults.station_rollup.clone().unwrap_or_else(builtin_default),
            channel_default: defaults.channel_rollup.clone().unwrap_or_else(builtin_default),
        })
    }

    fn group(&self, group: &StationGroupConfig) -> Result<GroupRollupDefinition> {
        check_unique(group.stations.iter().map(String::as_str), "member station")?;
        let members: HashSet<&str> = group.stations.iter().map(String::as_str).collect();
        let undeclared = |station: &str| ConfigError::UndeclaredStation {
            group: group.name.clone(),
            station: station.to_string(),
        };

        if let Some(station) = group
            .stations
            .iter()
            .find(|s| !self.stations.contains_key(s.as_str()))
        {
            return Err(undeclared(station));
        }

        let mut overrides = HashMap::new();
        for entry in &group.station_rollups {
            if !members.contains(entry.station.as_str()) {
                return Err(undeclared(&entry.station));
            }
            if overrides.insert(entry.station.as_str(), &entry.rollup).is_some() {
                return Err(ConfigError::DuplicateName {
                    kind: "station rollup",
                    name: entry.station.clone(),
                });
            }
        }

        let rollup = group.rollup.as_ref().unwrap_or(&self.group_default);
        let operator = self
            .resolver
            .resolve(rollup, Tier::Group, &group.stations)
            .map_err(|e| e.at("rollup"))?;

        if let Some(station) = operator
            .leaves(RollupOperator::station_operands)
            .into_iter()
            .find(|s| !members.contains(s.as_str()))
        {
            return Err(undeclared(station));
        }

        let mut definition = GroupRollupDefinition::new(group.name.clone(), operator);
        for name in &group.stations {
            let station = self.stations[name.as_str()];
            let rollup = overrides
                .get(name.as_str())
                .copied()
                .or(station.rollup.as_ref())
                .unwrap_or(&self.station_default);
            let station_definition = self
                .station(station, rollup)
                .map_err(|e| e.at(format!("stations[{}]", name)))?;
            definition = definition.station(name.clone(), station_definition);
        }

        definition.validate()?;
        debug!(
            "Resolved station group {} with {} stations",
            definition.name,
            definition.stations.len()
        );
        Ok(definition)
    }

    fn station(&self, station: &StationConfig, rollup: &OperatorConfig) -> Result<StationRollupDefinition> {
        let undeclared = |channel: &str| ConfigError::UndeclaredChannel {
            station: station.name.clone(),
            channel: channel.to_string(),
        };

        let mut overrides = HashMap::new();
        for entry in &station.channel_rollups {
            if !station.channels.contains(&entry.channel) {
                return Err(undeclared(&entry.channel));
            }
            if overrides.insert(entry.channel.as_str(), &entry.rollup).is_some() {
                return Err(ConfigError::DuplicateName {
                    kind: "channel rollup",
                    name: entry.channel.clone(),
                });
            }
        }

        let operator = self
            .resolver
            .resolve(rollup, Tier::Station, &station.channels)
            .map_err(|e| e.at("rollup"))?;
        let referenced: Vec<String> = operator
            .leaves(RollupOperator::channel_operands)
            .into_iter()
            .cloned()
            .collect();

        let mut definition = StationRollupDefinition::new(operator);
        for channel in referenced {
            if !station.channels.contains(&channel) {
                return Err(undeclared(&channel));
            }
            if definition.channels.contains_key(&channel) {
                continue;
            }
            let rollup = overrides
                .get(channel.as_str())
                .copied()
                .or(station.channel_rollup.as_ref())
                .unwrap_or(&self.channel_default);
            let operator = self
                .resolver
                .resolve(rollup, Tier::Channel, &[])
                .map_err(|e| e.at(format!("channel_rollups[{}]", channel)))?;
            definition = definition.channel(channel, ChannelRollupDefinition::new(operator));
        }

        Ok(definition)
    }
}

fn check_unique<'a>(names: impl IntoIterator<Item = &'a str>, kind: &'static str) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
