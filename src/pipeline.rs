//! Run driver.
//!
//! Walks the groups in order, converts every located snapshot and appends
//! each group's tables to the CSV outputs once the group is done.

use crate::analysis::GroupTables;
use crate::extract::RatingDocument;
use crate::models::{
    DemographicRecord, HistogramRecord, PerTable, RegionRecord, TableKind, TableSelection,
};
use crate::report::{CsvSink, RunSummary, TableCount};
use crate::scanner::{SnapshotFile, SnapshotLocator};
use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything a run needs, already merged from config and command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_dir: PathBuf,
    pub groups: u32,
    pub tables: TableSelection,
    /// Global cap on opened files.
    pub max_files: Option<usize>,
    pub strict: bool,
    pub outputs: PerTable<PathBuf>,
    pub show_progress: bool,
}

struct Sinks {
    histogram: CsvSink<HistogramRecord>,
    demographic: CsvSink<DemographicRecord>,
    region: CsvSink<RegionRecord>,
}

impl Sinks {
    fn new(outputs: &PerTable<PathBuf>) -> Self {
        Self {
            histogram: CsvSink::new(&outputs.histogram),
            demographic: CsvSink::new(&outputs.demographic),
            region: CsvSink::new(&outputs.region),
        }
    }

    fn flush(&mut self, kind: TableKind, tables: &GroupTables) -> Result<usize> {
        match kind {
            TableKind::Histogram => self.histogram.append_group(&tables.histogram),
            TableKind::Demographic => self.demographic.append_group(&tables.demographic),
            TableKind::Region => self.region.append_group(&tables.region),
        }
    }

    fn written(&self, kind: TableKind) -> (&Path, usize) {
        match kind {
            TableKind::Histogram => (self.histogram.path(), self.histogram.rows_written()),
            TableKind::Demographic => (self.demographic.path(), self.demographic.rows_written()),
            TableKind::Region => (self.region.path(), self.region.rows_written()),
        }
    }
}

/// Process groups `1..=groups` and write the selected tables.
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let started_at = Utc::now();
    let start = Instant::now();

    let locator = SnapshotLocator::new(&options.input_dir, options.strict);
    let mut sinks = Sinks::new(&options.outputs);

    let mut files_opened = 0usize;
    let mut groups_processed = 0u32;
    let mut capped = false;
    let mut tables: PerTable<TableCount> = PerTable::default();
    let mut notices: Vec<String> = Vec::new();

    let pb = progress_bar(options);

    for group in 1..=options.groups {
        if cap_reached(options, files_opened) {
            capped = true;
            info!("Reached the cap of {} opened files before E{}", files_opened, group);
            break;
        }

        pb.set_message(format!("E{}", group));
        let snapshots = locator.locate(group)?;
        let mut group_tables = GroupTables::new();

        for snapshot in &snapshots {
            if cap_reached(options, files_opened) {
                capped = true;
                break;
            }
            files_opened += 1;
            for notice in convert_snapshot(snapshot, options, &mut group_tables)? {
                pb.suspend(|| println!("{}", notice));
                notices.push(notice);
            }
        }

        for kind in options.tables.iter() {
            let written = sinks
                .flush(kind, &group_tables)
                .with_context(|| format!("Failed to write {} table for group E{}", kind, group))?;
            let count = tables.get_mut(kind);
            count.converted += group_tables.contributed(kind);
            count.rows_written += written;
        }

        if group_tables.is_empty() {
            debug!("Group E{}: nothing to write", group);
        }
        debug!(
            "Group E{}: {} snapshots, {} histogram / {} demographic / {} region records",
            group,
            snapshots.len(),
            group_tables.record_count(TableKind::Histogram),
            group_tables.record_count(TableKind::Demographic),
            group_tables.record_count(TableKind::Region)
        );

        groups_processed += 1;
        pb.inc(1);

        if capped {
            info!("Reached the cap of {} opened files", files_opened);
            break;
        }
    }

    pb.finish_and_clear();

    for kind in options.tables.iter() {
        match sinks.written(kind) {
            (path, 0) => info!("No {} rows written, {} left untouched", kind, path.display()),
            (path, rows) => info!("Wrote {} {} rows to {}", rows, kind, path.display()),
        }
    }

    for kind in TableKind::ALL {
        let count = tables.get_mut(kind);
        count.skipped = files_opened - count.converted;
    }

    Ok(RunSummary {
        started_at,
        duration_seconds: start.elapsed().as_secs_f64(),
        groups_processed,
        files_opened,
        capped,
        tables,
        notices,
    })
}

/// Extract the selected tables of one snapshot into `group_tables`.
///
/// Returns the console notices for whatever was skipped.
fn convert_snapshot(
    snapshot: &SnapshotFile,
    options: &RunOptions,
    group_tables: &mut GroupTables,
) -> Result<Vec<String>> {
    let source = snapshot.read()?;

    let doc = match RatingDocument::parse(&source) {
        Ok(doc) => doc,
        Err(reason) => {
            warn!("Skipping {}: {}", snapshot.path.display(), reason);
            return Ok(vec![format!("skipped: {}", snapshot.path.display())]);
        }
    };

    let mut notices = Vec::new();
    for kind in options.tables.iter() {
        match group_tables.absorb(kind, &doc, snapshot) {
            Ok(added) => debug!("{}: {} {} records", snapshot.file_name(), added, kind),
            Err(e) if options.strict => {
                return Err(e).with_context(|| {
                    format!("Failed to convert {}", snapshot.path.display())
                });
            }
            Err(e) => {
                warn!("Skipping {} table of {}: {}", kind, snapshot.path.display(), e);
                notices.push(format!("skipped ({}): {}", kind, snapshot.path.display()));
            }
        }
    }

    Ok(notices)
}

fn cap_reached(options: &RunOptions, files_opened: usize) -> bool {
    options.max_files.is_some_and(|cap| files_opened >= cap)
}

fn progress_bar(options: &RunOptions) -> ProgressBar {
    if !options.show_progress {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(options.groups as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => debug!("Falling back to the default progress style: {}", e),
    }
    pb
}
