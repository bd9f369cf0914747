//! # soh-types
//!
//! Core types for station state-of-health (SOH) rollups. This crate defines
//! the vocabulary shared by the rollup engine, the configuration loader and
//! anything that produces or consumes station health data.
//!
//! ## Design Goals
//!
//! - **Small dependency surface**: Core types only need `uuid` for station ids
//! - **Optional serialization**: Enable the `serde` feature for JSON and friends
//! - **Immutable snapshots**: Snapshots are built once per monitoring cycle and read-only afterwards
//! - **Ergonomic builders**: Fluent API for constructing station snapshots
//!
//! ## Features
//!
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use soh_types::{MonitorType, StationSnapshot, Status};
//! use std::time::Duration;
//!
//! let snapshot = StationSnapshot::builder("ASAR")
//!     .channel("ASAR.AS01.SHZ", |c| {
//!         c.reading(MonitorType::Missing, Status::Good, |r| r.percent(0.5))
//!          .reading(MonitorType::Lag, Status::Bad, |r| r.duration(Duration::from_secs(90)))
//!     })
//!     .channel("ASAR.AS02.SHZ", |c| c.status(MonitorType::Missing, Status::Marginal))
//!     .build();
//!
//! assert_eq!(snapshot.channels.len(), 2);
//! assert_eq!(
//!     snapshot.status_of("ASAR.AS01.SHZ", MonitorType::Lag),
//!     Some(Status::Bad)
//! );
//! ```
//!
//! ## Status Order
//!
//! [`Status`] is totally ordered from worst to best, so `max` picks the best
//! status and `min` picks the worst one.

mod duration;
mod monitor;
mod rollup;
mod snapshot;
mod status;

pub use duration::*;
pub use monitor::*;
pub use rollup::*;
pub use snapshot::*;
pub use status::*;

/// Opaque identifier of a single station snapshot.
pub type SnapshotId = uuid::Uuid;
