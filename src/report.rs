//! Rollup reports for one evaluated batch.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use soh_types::{GroupRollup, Status};

/// Group rollups for one batch plus a summary by status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupReport {
    pub timestamp_ms: u64,

    /// Where the batch came from.
    pub source: String,

    pub summary: ReportSummary,

    pub groups: Vec<GroupRollup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_groups: usize,

    /// Number of groups per status.
    pub groups_by_status: BTreeMap<Status, usize>,

    /// Distinct station snapshots that fed any group.
    pub reporting_stations: usize,
}

impl RollupReport {
    pub fn new(source: impl Into<String>, timestamp_ms: u64, groups: Vec<GroupRollup>) -> Self {
        let mut groups_by_status = BTreeMap::new();
        for group in &groups {
            *groups_by_status.entry(group.status).or_insert(0) += 1;
        }
        let reporting_stations = groups
            .iter()
            .flat_map(|g| g.station_snapshot_ids.iter())
            .collect::<std::collections::BTreeSet<_>>()
            .len();

        Self {
            timestamp_ms,
            source: source.into(),
            summary: ReportSummary {
                total_groups: groups.len(),
                groups_by_status,
                reporting_stations,
            },
            groups,
        }
    }

    /// Worst status over every group, if there are any.
    pub fn overall_status(&self) -> Option<Status> {
        self.groups.iter().map(|g| g.status).min()
    }

    /// Write the report as pretty-printed JSON.
    pub fn export(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// One line per group: name, status, then each referenced station's status.
impl fmt::Display for RollupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .groups
            .iter()
            .map(|g| g.group_name.len())
            .max()
            .unwrap_or(0);

        for group in &self.groups {
            write!(f, "{:<width$}  {:<8}", group.group_name, group.status.as_str())?;
            for (station, status) in &group.station_statuses {
                write!(f, " {}={}", station, status)?;
            }
            writeln!(f)?;
        }

        write!(
            f,
            "{} groups, {} reporting stations",
            self.summary.total_groups, self.summary.reporting_stations
        )?;
        for status in Status::ALL.iter().rev() {
            if let Some(count) = self.summary.groups_by_status.get(status) {
                write!(f, ", {} {}", count, status)?;
            }
        }
        Ok(())
    }
}
