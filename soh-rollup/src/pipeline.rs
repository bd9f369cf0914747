//! Streaming collect-then-reduce over a station snapshot source.
//!
//! Rollups are a barrier operation: no group can be evaluated until the
//! whole batch is in. The pipeline therefore consumes its upstream exactly
//! once, materializes a [`StationBatch`], and only then runs one pure group
//! evaluation per definition against that shared batch.

use std::future;
use std::sync::Arc;

use futures_util::stream::{self, Stream, StreamExt, TryStreamExt};
use soh_types::{GroupRollup, StationSnapshot};
use tracing::info;

use crate::definition::GroupRollupDefinition;
use crate::error::{PipelineError, RollupError};
use crate::orchestrator::{BatchEvaluator, StationBatch};

/// Drain a snapshot stream into a batch.
///
/// This is the pipeline's only suspension point. The first upstream error
/// ends collection and is returned as is.
pub async fn collect_batch<S, E>(snapshots: S) -> Result<StationBatch, E>
where
    S: Stream<Item = Result<StationSnapshot, E>>,
{
    snapshots
        .try_fold(StationBatch::new(), |mut batch, snapshot| {
            batch.insert(snapshot);
            future::ready(Ok(batch))
        })
        .await
}

/// Collect one batch and emit one rollup per definition, in definition order.
///
/// Upstream is polled only until the batch completes; every definition is
/// evaluated against that single batch. An upstream failure is emitted as
/// the stream's only item.
pub fn rollup_stream<'a, S, E>(
    definitions: &'a [GroupRollupDefinition],
    snapshots: S,
    timestamp_ms: u64,
) -> impl Stream<Item = Result<GroupRollup, PipelineError<E>>> + 'a
where
    S: Stream<Item = Result<StationSnapshot, E>> + 'a,
    E: 'a,
{
    stream::once(collect_batch(snapshots)).flat_map(move |collected| {
        let results: Vec<Result<GroupRollup, PipelineError<E>>> = match collected {
            Ok(batch) => {
                info!(
                    "Collected batch of {} station snapshots for {} group definitions",
                    batch.len(),
                    definitions.len()
                );
                let evaluator = BatchEvaluator::new(&batch, timestamp_ms);
                definitions
                    .iter()
                    .map(|definition| evaluator.evaluate(definition).map_err(PipelineError::from))
                    .collect()
            }
            Err(e) => vec![Err(PipelineError::Upstream(e))],
        };
        stream::iter(results)
    })
}

/// A validated set of group definitions, ready to evaluate batches.
///
/// # Example
///
/// ```rust
/// use futures_util::stream;
/// use soh_rollup::{
///     ChannelRollupDefinition, GroupRollupDefinition, RollupOperator, RollupPipeline,
///     StationRollupDefinition,
/// };
/// use soh_types::{MonitorType, StationSnapshot, Status};
///
/// # tokio_test::block_on(async {
/// let group = GroupRollupDefinition::new("Primary", RollupOperator::best_of().stations(["ASAR"]))
///     .station(
///         "ASAR",
///         StationRollupDefinition::new(RollupOperator::worst_of().channels(["ASAR.AS01.SHZ"]))
///             .channel(
///                 "ASAR.AS01.SHZ",
///                 ChannelRollupDefinition::new(
///                     RollupOperator::worst_of().monitor_types([MonitorType::Missing]),
///                 ),
///             ),
///     );
///
/// let pipeline = RollupPipeline::builder().group(group).build().unwrap();
///
/// let snapshot = StationSnapshot::builder("ASAR")
///     .channel("ASAR.AS01.SHZ", |c| c.status(MonitorType::Missing, Status::Good))
///     .build();
/// let source = stream::iter(vec![Ok::<_, std::io::Error>(snapshot)]);
///
/// let rollups = pipeline.run(source, 1703160000000).await.unwrap();
/// assert_eq!(rollups[0].status, Status::Good);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RollupPipeline {
    definitions: Arc<[GroupRollupDefinition]>,
}

impl RollupPipeline {
    /// Validate the definitions and build a pipeline from them.
    pub fn new(definitions: Vec<GroupRollupDefinition>) -> Result<Self, RollupError> {
        definitions
            .iter()
            .try_for_each(GroupRollupDefinition::validate)?;
        info!(
            "Rollup pipeline ready with {} group definitions",
            definitions.len()
        );
        Ok(Self {
            definitions: definitions.into(),
        })
    }

    pub fn builder() -> RollupPipelineBuilder {
        RollupPipelineBuilder::new()
    }

    pub fn definitions(&self) -> &[GroupRollupDefinition] {
        &self.definitions
    }

    /// Evaluate every group against an already collected batch.
    pub fn evaluate_batch(
        &self,
        batch: &StationBatch,
        timestamp_ms: u64,
    ) -> Result<Vec<GroupRollup>, RollupError> {
        BatchEvaluator::new(batch, timestamp_ms).evaluate_all(&self.definitions)
    }

    /// Stream one rollup per group for the batch the source produces.
    pub fn rollups<'a, S, E>(
        &'a self,
        snapshots: S,
        timestamp_ms: u64,
    ) -> impl Stream<Item = Result<GroupRollup, PipelineError<E>>> + 'a
    where
        S: Stream<Item = Result<StationSnapshot, E>> + 'a,
        E: 'a,
    {
        rollup_stream(&self.definitions, snapshots, timestamp_ms)
    }

    /// Collect one batch and return every group's rollup.
    pub async fn run<S, E>(
        &self,
        snapshots: S,
        timestamp_ms: u64,
    ) -> Result<Vec<GroupRollup>, PipelineError<E>>
    where
        S: Stream<Item = Result<StationSnapshot, E>>,
    {
        self.rollups(snapshots, timestamp_ms).try_collect().await
    }
}

/// Builder for a [`RollupPipeline`].
#[derive(Debug, Default)]
pub struct RollupPipelineBuilder {
    definitions: Vec<GroupRollupDefinition>,
}

impl RollupPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one group definition.
    pub fn group(mut self, definition: GroupRollupDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add several group definitions.
    pub fn groups(mut self, definitions: impl IntoIterator<Item = GroupRollupDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Validate every definition and build the pipeline.
    pub fn build(self) -> Result<RollupPipeline, RollupError> {
        RollupPipeline::new(self.definitions)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use soh_types::{MonitorType, Status};

    use super::*;
    use crate::definition::{ChannelRollupDefinition, StationRollupDefinition};
    use crate::tree::RollupOperator;

    #[derive(Debug, PartialEq)]
    struct SourceFailed;

    fn station(name: &str) -> StationRollupDefinition {
        let channel = format!("{}.01.SHZ", name);
        StationRollupDefinition::new(RollupOperator::worst_of().channels([channel.clone()])).channel(
            channel,
            ChannelRollupDefinition::new(RollupOperator::worst_of().monitor_types([MonitorType::Lag])),
        )
    }

    fn snapshot(name: &str, status: Status) -> StationSnapshot {
        StationSnapshot::builder(name)
            .channel(format!("{}.01.SHZ", name), |c| c.status(MonitorType::Lag, status))
            .build()
    }

    fn group(name: &str, stations: &[&str]) -> GroupRollupDefinition {
        stations.iter().fold(
            GroupRollupDefinition::new(name, RollupOperator::best_of().stations(stations.iter().copied())),
            |def, s| def.station(*s, station(s)),
        )
    }

    #[tokio::test]
    async fn collect_batch_drains_the_stream() {
        let source = stream::iter(vec![
            Ok::<_, SourceFailed>(snapshot("A", Status::Good)),
            Ok(snapshot("B", Status::Bad)),
        ]);
        let batch = collect_batch(source).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.contains("A"));
    }

    #[tokio::test]
    async fn collect_batch_stops_at_first_error() {
        let source = stream::iter(vec![
            Ok(snapshot("A", Status::Good)),
            Err(SourceFailed),
            Ok(snapshot("B", Status::Bad)),
        ]);
        assert_eq!(collect_batch(source).await, Err(SourceFailed));
    }

    #[tokio::test]
    async fn upstream_is_consumed_once_for_all_groups() {
        let polled = AtomicUsize::new(0);
        let source = stream::iter(vec![
            snapshot("A", Status::Good),
            snapshot("B", Status::Bad),
            snapshot("C", Status::Marginal),
        ])
        .inspect(|_| {
            polled.fetch_add(1, Ordering::SeqCst);
        })
        .map(Ok::<_, SourceFailed>);

        let definitions = vec![group("G1", &["A"]), group("G2", &["B", "C"]), group("G3", &["D"])];
        let rollups: Vec<_> = rollup_stream(&definitions, source, 7)
            .try_collect::<Vec<_>>()
            .await
            .unwrap();

        assert_eq!(polled.load(Ordering::SeqCst), 3);
        let names: Vec<_> = rollups.iter().map(|r| r.group_name.as_str()).collect();
        assert_eq!(names, ["G1", "G2", "G3"]);
        assert_eq!(rollups[0].status, Status::Good);
        assert_eq!(rollups[1].status, Status::Marginal);
        assert_eq!(rollups[2].status, Status::Marginal);
        assert!(rollups.iter().all(|r| r.timestamp_ms == 7));
    }

    #[tokio::test]
    async fn upstream_error_is_passed_through() {
        let definitions = vec![group("G1", &["A"]), group("G2", &["A"])];
        let source = stream::iter(vec![Ok(snapshot("A", Status::Good)), Err(SourceFailed)]);

        let items: Vec<_> = rollup_stream(&definitions, source, 0).collect().await;
        assert_eq!(items.len(), 1);
        match &items[0] {
            Err(e) => assert_eq!(e.upstream(), Some(&SourceFailed)),
            Ok(rollup) => panic!("unexpected rollup: {:?}", rollup),
        }
    }

    #[test]
    fn builder_rejects_invalid_definitions() {
        let broken = GroupRollupDefinition::new("Broken", RollupOperator::best_of().stations(["A"]));
        let err = RollupPipeline::builder()
            .group(group("Fine", &["A"]))
            .group(broken)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RollupError::UndefinedStation {
                group: "Broken".to_string(),
                station: "A".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn pipeline_runs_batches_repeatedly() {
        let pipeline = RollupPipeline::builder()
            .groups([group("G1", &["A", "B"])])
            .build()
            .unwrap();
        assert_eq!(pipeline.definitions().len(), 1);

        let first = pipeline
            .run(
                stream::iter(vec![Ok::<_, SourceFailed>(snapshot("A", Status::Bad))]),
                1,
            )
            .await
            .unwrap();
        assert_eq!(first[0].status, Status::Marginal);

        let second = pipeline
            .run(
                stream::iter(vec![
                    Ok::<_, SourceFailed>(snapshot("A", Status::Bad)),
                    Ok(snapshot("B", Status::Good)),
                ]),
                2,
            )
            .await
            .unwrap();
        assert_eq!(second[0].status, Status::Good);
        assert_eq!(second[0].reporting_count(), 2);

        let batch: StationBatch = [snapshot("B", Status::Bad)].into_iter().collect();
        let rollups = pipeline.evaluate_batch(&batch, 3).unwrap();
        assert_eq!(rollups[0].status, Status::Marginal);
    }
}
