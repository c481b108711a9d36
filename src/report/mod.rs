//! Output of a run: the CSV datasets and the end-of-run summary.

pub mod sink;
pub mod summary;

pub use sink::CsvSink;
pub use summary::{render_text, write_json_summary, RunSummary, TableCount};
