//! End to end: deployment file and batch file in, rollup report out.

use std::fs;
use std::path::{Path, PathBuf};

use soh_config::load_group_definitions;
use soh_doctor::{run_cycle, DeploymentStats, FileSource};
use soh_rollup::RollupPipeline;
use soh_types::{MonitorType, StationSnapshot, Status};

const DEPLOYMENT: &str = r#"
[defaults.channel_rollup]
operator_type = "WORST_OF"
monitor_type_operands = ["MISSING", "LAG"]

[[stations]]
name = "ASAR"
channels = ["ASAR.AS01.SHZ", "ASAR.AS02.SHZ", "ASAR.AS03.SHZ"]
rollup = { operator_type = "MIN_GOOD_OF", good_threshold = 2, marginal_threshold = 1 }

[[stations]]
name = "PDAR"
channels = ["PDAR.PD01.SHZ"]

[[station_groups]]
name = "Primary"
stations = ["ASAR", "PDAR"]
rollup = { operator_type = "BEST_OF" }

[[station_groups]]
name = "Backbone"
stations = ["ASAR", "PDAR"]
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn batch() -> String {
    let asar = StationSnapshot::builder("ASAR")
        .channel("ASAR.AS01.SHZ", |c| {
            c.status(MonitorType::Missing, Status::Good)
                .status(MonitorType::Lag, Status::Good)
        })
        .channel("ASAR.AS02.SHZ", |c| {
            c.status(MonitorType::Missing, Status::Good)
                .status(MonitorType::Lag, Status::Bad)
        })
        .build();
    let pdar = StationSnapshot::builder("PDAR")
        .channel("PDAR.PD01.SHZ", |c| {
            c.status(MonitorType::Missing, Status::Good)
                .status(MonitorType::Lag, Status::Good)
        })
        .build();

    [asar, pdar]
        .iter()
        .map(|s| serde_json::to_string(s).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

fn pipeline(dir: &Path) -> RollupPipeline {
    let config = write(dir, "deployment.toml", DEPLOYMENT);
    RollupPipeline::new(load_group_definitions(&config).unwrap()).unwrap()
}

#[test]
fn check_reports_deployment_shape() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());

    let stats = DeploymentStats::from_definitions(pipeline.definitions());
    assert_eq!(stats.groups, 2);
    assert_eq!(stats.distinct_stations, 2);
    assert_eq!(stats.channels, 4);
    assert_eq!(stats.nodes_by_kind["MIN_GOOD_OF"], 2);
    assert_eq!(stats.max_depth, 1);
}

#[tokio::test]
async fn rollup_of_a_batch_file() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let batch = write(dir.path(), "batch.ndjson", &batch());

    let report = run_cycle(&pipeline, Box::new(FileSource::new(&batch)), None)
        .await
        .unwrap();

    // ASAR: AS01 GOOD, AS02 BAD, AS03 unreported and MARGINAL; one GOOD
    // channel meets only the marginal threshold.
    let primary = &report.groups[0];
    assert_eq!(primary.group_name, "Primary");
    assert_eq!(primary.station_status("ASAR"), Some(Status::Marginal));
    assert_eq!(primary.station_status("PDAR"), Some(Status::Good));
    assert_eq!(primary.status, Status::Good);

    let backbone = &report.groups[1];
    assert_eq!(backbone.group_name, "Backbone");
    assert_eq!(backbone.status, Status::Marginal);

    assert_eq!(report.summary.reporting_stations, 2);
    assert_eq!(report.overall_status(), Some(Status::Marginal));

    let export = dir.path().join("report.json");
    report.export(&export).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(json["groups"][1]["status"], "MARGINAL");
}
