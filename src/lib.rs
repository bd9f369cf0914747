//! # soh-doctor
//!
//! A diagnostic CLI and library for station state-of-health rollup
//! deployments.
//!
//! The crate checks a deployment configuration, collects one batch of
//! station snapshots from a file or a network stream, and reports the group
//! rollups the engine computes for it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          soh-doctor                          │
//! │  ┌──────────┐    ┌───────────┐    ┌────────┐    ┌─────────┐  │
//! │  │  source  │───▶│   cycle   │───▶│ report │───▶│ stdout  │  │
//! │  │ (input)  │    │(soh-rollup)    │        │    │ / JSON  │  │
//! │  └──────────┘    └─────▲─────┘    └────────┘    └─────────┘  │
//! │                        │                                     │
//! │                  ┌─────┴─────┐    ┌───────┐                  │
//! │                  │soh-config │───▶│ stats │                  │
//! │                  └───────────┘    └───────┘                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the [`SnapshotSource`] trait with file, stream and
//!   channel implementations
//! - **[`cycle`]**: one collect-then-rollup cycle over a source
//! - **[`report`]**: per-group output and JSON export
//! - **[`stats`]**: the shape of a resolved deployment
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Validate a deployment and print its statistics
//! soh-doctor check --config deployment.toml
//!
//! # Roll up a batch file
//! soh-doctor rollup --config deployment.toml --batch snapshots.json
//!
//! # Roll up whatever a collector sends within 30 seconds
//! soh-doctor rollup --config deployment.toml --connect localhost:9090 --cycle-timeout 30s
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use soh_doctor::{run_cycle, ChannelSource};
//! use soh_rollup::{
//!     ChannelRollupDefinition, GroupRollupDefinition, RollupOperator, RollupPipeline,
//!     StationRollupDefinition,
//! };
//! use soh_types::{MonitorType, Status};
//!
//! # tokio_test::block_on(async {
//! let station = StationRollupDefinition::new(RollupOperator::worst_of().channels(["AS01"]))
//!     .channel(
//!         "AS01",
//!         ChannelRollupDefinition::new(RollupOperator::worst_of().monitor_types([MonitorType::Missing])),
//!     );
//! let pipeline = RollupPipeline::builder()
//!     .group(
//!         GroupRollupDefinition::new("Primary", RollupOperator::worst_of().stations(["ASAR"]))
//!             .station("ASAR", station),
//!     )
//!     .build()
//!     .unwrap();
//!
//! // Nothing is sent, so ASAR is missing and resolves to MARGINAL.
//! let (tx, source) = ChannelSource::create("collector");
//! drop(tx);
//!
//! let report = run_cycle(&pipeline, Box::new(source), None).await.unwrap();
//! assert_eq!(report.groups[0].status, Status::Marginal);
//! # });
//! ```

pub mod cycle;
pub mod duration;
pub mod report;
pub mod source;
pub mod stats;

pub use cycle::run_cycle;
pub use report::{ReportSummary, RollupReport};
pub use source::{
    parse_batch, ChannelSource, FileSource, SnapshotSource, SnapshotStream, SourceError,
    StreamSource,
};
pub use stats::DeploymentStats;
