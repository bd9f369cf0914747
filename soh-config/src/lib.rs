//! # soh-config
//!
//! Deployment configuration for station state-of-health rollups.
//!
//! A deployment file declares stations with their channels, station groups
//! with their member stations, and the rollup operators to apply at each
//! tier. This crate loads such a file with the [`config`] crate and resolves
//! it into validated [`GroupRollupDefinition`](soh_rollup::GroupRollupDefinition)s
//! ready for the rollup engine.
//!
//! ## Resolution Rules
//!
//! - An operator config sets `operator_type` and, for `MIN_GOOD_OF` only,
//!   `good_threshold` and `marginal_threshold`. Unknown fields are rejected.
//! - A node with `rollup_operator_operands` may not list leaves. A terminal
//!   node may only list the leaves of the tier it is resolved for.
//! - A terminal node without leaves gets the tier's default leaves: the
//!   group's member stations, the station's channels, or every monitor type.
//! - `reference = "<name>"` stands for the named entry in `operators` and
//!   excludes every other field. Cyclic references are rejected at load time.
//! - The most specific operator wins: a group's `station_rollups` entry over
//!   the station's own `rollup`, a station's `channel_rollups` entry over its
//!   `channel_rollup`, and all of them over `defaults`. With nothing
//!   configured, a tier rolls up with `WORST_OF`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use soh_config::load_group_definitions;
//!
//! let groups = load_group_definitions("deployment.toml")?;
//! for group in &groups {
//!     println!("{}: {} stations", group.name, group.stations.len());
//! }
//! # Ok::<(), soh_config::ConfigError>(())
//! ```

mod deployment;
mod error;
mod file;
mod resolve;
mod tier;

pub use config::FileFormat;
pub use deployment::{load_group_definitions, DeploymentConfig, ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use file::{
    ChannelRollupConfig, DeploymentFile, NamedOperator, OperatorConfig, RollupDefaults,
    StationConfig, StationGroupConfig, StationRollupConfig,
};
pub use resolve::{builtin_default, OperatorResolver};
pub use tier::Tier;
