//! One monitoring cycle: collect a batch from a source, roll it up, report.

use std::time::Duration;

use futures_util::StreamExt;
use soh_rollup::{PipelineError, RollupPipeline};
use soh_types::current_timestamp_ms;
use tracing::info;

use crate::duration::format_duration;
use crate::report::RollupReport;
use crate::source::{SnapshotSource, SourceError};

/// Evaluate every group of `pipeline` against one batch from `source`.
///
/// With a `cycle_timeout`, the batch closes after that long even if the
/// source is still open, and whatever arrived by then is evaluated.
pub async fn run_cycle(
    pipeline: &RollupPipeline,
    source: Box<dyn SnapshotSource>,
    cycle_timeout: Option<Duration>,
) -> Result<RollupReport, PipelineError<SourceError>> {
    let description = source.description().to_string();
    let timestamp_ms = current_timestamp_ms();

    let snapshots = match cycle_timeout {
        Some(timeout) => {
            info!(
                "Collecting batch from {} for at most {}",
                description,
                format_duration(timeout)
            );
            source
                .snapshots()
                .take_until(tokio::time::sleep(timeout))
                .boxed()
        }
        None => {
            info!("Collecting batch from {}", description);
            source.snapshots()
        }
    };

    let rollups = pipeline.run(snapshots, timestamp_ms).await?;
    Ok(RollupReport::new(description, timestamp_ms, rollups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChannelSource, FileSource};
    use soh_rollup::{
        ChannelRollupDefinition, GroupRollupDefinition, RollupOperator, StationRollupDefinition,
    };
    use soh_types::{MonitorType, StationSnapshot, Status};

    fn pipeline() -> RollupPipeline {
        let station = |name: &str| {
            let channel = format!("{}.01.SHZ", name);
            StationRollupDefinition::new(RollupOperator::worst_of().channels([channel.clone()]))
                .channel(
                    channel,
                    ChannelRollupDefinition::new(
                        RollupOperator::worst_of().monitor_types([MonitorType::Missing]),
                    ),
                )
        };
        let group = GroupRollupDefinition::new(
            "Primary",
            RollupOperator::worst_of().stations(["ASAR", "PDAR"]),
        )
        .station("ASAR", station("ASAR"))
        .station("PDAR", station("PDAR"));
        RollupPipeline::builder().group(group).build().unwrap()
    }

    fn good(name: &str) -> StationSnapshot {
        StationSnapshot::builder(name)
            .channel(format!("{}.01.SHZ", name), |c| {
                c.status(MonitorType::Missing, Status::Good)
            })
            .build()
    }

    #[tokio::test]
    async fn rolls_up_a_complete_batch() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(good("ASAR")).await.unwrap();
        tx.send(good("PDAR")).await.unwrap();
        drop(tx);

        let report = run_cycle(&pipeline(), Box::new(source), None).await.unwrap();
        assert_eq!(report.source, "channel: test");
        assert_eq!(report.groups[0].status, Status::Good);
        assert_eq!(report.summary.reporting_stations, 2);
    }

    #[tokio::test]
    async fn timeout_closes_an_open_batch() {
        let (tx, source) = ChannelSource::create("test");
        tx.send(good("ASAR")).await.unwrap();

        let report = run_cycle(
            &pipeline(),
            Box::new(source),
            Some(Duration::from_millis(50)),
        )
        .await
        .unwrap();
        drop(tx);

        // PDAR never reported.
        let group = &report.groups[0];
        assert_eq!(group.status, Status::Marginal);
        assert_eq!(group.station_status("ASAR"), Some(Status::Good));
        assert_eq!(group.station_status("PDAR"), Some(Status::Marginal));
    }

    #[tokio::test]
    async fn source_errors_pass_through() {
        let source = FileSource::new("/nonexistent/batch.json");
        let err = run_cycle(&pipeline(), Box::new(source), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.upstream(),
            Some(SourceError::Read { .. })
        ));
    }
}
