//! End-of-run summary.
//!
//! Rendered as the four console lines of the converter, and optionally as
//! JSON for scripting.

use crate::models::{PerTable, TableKind};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Outcome of a run for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCount {
    /// Files that contributed at least one record.
    pub converted: usize,
    /// Files opened but not converted for this table, for any reason.
    pub skipped: usize,
    pub rows_written: usize,
}

/// Totals of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration_seconds: f64,
    /// Groups that were located. A group is never counted once the cap
    /// on opened files has been reached.
    pub groups_processed: u32,
    pub files_opened: usize,
    /// Whether the processed-file cap stopped the run early.
    pub capped: bool,
    pub tables: PerTable<TableCount>,
    /// Skip notices, in the order they were printed.
    pub notices: Vec<String>,
}

impl RunSummary {
    pub fn table(&self, kind: TableKind) -> &TableCount {
        self.tables.get(kind)
    }
}

/// The console summary printed at the end of a run.
pub fn render_text(summary: &RunSummary) -> String {
    let mut text = format!("{} files were opened\n", summary.files_opened);
    for kind in TableKind::ALL {
        let count = summary.table(kind);
        text.push_str(&format!(
            "({}) {} files were converted into data and {} files were skipped\n",
            kind, count.converted, count.skipped
        ));
    }
    text
}

/// Generate a JSON summary.
pub fn generate_json_summary(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write a JSON summary to a file.
pub fn write_json_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    let content = generate_json_summary(summary)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write summary to {}", path.display()))
}
