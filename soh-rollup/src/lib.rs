//! # soh-rollup
//!
//! Rollup evaluation engine for station state-of-health.
//!
//! Station health flows leaf to root through three tiers: monitor readings
//! roll up into a channel status, channel statuses into a station status,
//! and station statuses into the status of a station group. Every tier is
//! driven by a configurable tree of [`RollupOperator`]s and evaluated by the
//! same generic [`RollupEvaluator`].
//!
//! ## Quick Start
//!
//! ```rust
//! use soh_rollup::{
//!     BatchEvaluator, ChannelRollupDefinition, GroupRollupDefinition, RollupOperator,
//!     StationBatch, StationRollupDefinition,
//! };
//! use soh_types::{MonitorType, StationSnapshot, Status};
//!
//! // Channel: worst of its MISSING and LAG monitors.
//! let channel = ChannelRollupDefinition::new(
//!     RollupOperator::worst_of().monitor_types([MonitorType::Missing, MonitorType::Lag]),
//! );
//!
//! // Station: at least one GOOD channel.
//! let station = StationRollupDefinition::new(
//!     RollupOperator::min_good_of(1, 0).channels(["ASAR.AS01.SHZ", "ASAR.AS02.SHZ"]),
//! )
//! .channel("ASAR.AS01.SHZ", channel.clone())
//! .channel("ASAR.AS02.SHZ", channel);
//!
//! let group = GroupRollupDefinition::new("Primary", RollupOperator::best_of().stations(["ASAR"]))
//!     .station("ASAR", station);
//!
//! let batch: StationBatch = [StationSnapshot::builder("ASAR")
//!     .channel("ASAR.AS01.SHZ", |c| {
//!         c.status(MonitorType::Missing, Status::Good)
//!             .status(MonitorType::Lag, Status::Good)
//!     })
//!     .build()]
//! .into_iter()
//! .collect();
//!
//! let rollup = BatchEvaluator::new(&batch, 1703160000000).evaluate(&group).unwrap();
//! assert_eq!(rollup.status, Status::Good);
//! ```
//!
//! ## Missing Data
//!
//! Anything a tree references but the batch does not contain resolves to
//! `MARGINAL`: a monitor type a channel did not report, a channel a station
//! did not report, a station that did not report at all. Missing data never
//! fails a rollup. Malformed configuration always does, see [`RollupError`].

mod definition;
mod error;
mod evaluator;
mod operator;
mod orchestrator;
mod pipeline;
mod tree;

pub use definition::{ChannelRollupDefinition, GroupRollupDefinition, StationRollupDefinition};
pub use error::{PipelineError, RollupError};
pub use evaluator::{evaluate, validate_tree, RollupEvaluator};
pub use operator::{Operator, OperatorKind};
pub use orchestrator::{channel_status, evaluate_groups, station_status, BatchEvaluator, StationBatch};
pub use pipeline::{collect_batch, rollup_stream, RollupPipeline, RollupPipelineBuilder};
pub use tree::RollupOperator;

// Re-export types for convenience
pub use soh_types::{GroupRollup, MonitorType, StationSnapshot, Status};
