//! Append-only CSV output.
//!
//! A sink owns one output file for the whole run. The first group that
//! writes to it truncates the file and emits the header; later groups
//! append rows only. The file is opened and closed once per write.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV destination for records of type `R`.
#[derive(Debug)]
pub struct CsvSink<R> {
    path: PathBuf,
    started: bool,
    rows_written: usize,
    _record: PhantomData<R>,
}

impl<R: Serialize> CsvSink<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: false,
            rows_written: 0,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written during this run.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Write one group's records. Empty groups leave the file untouched.
    pub fn append_group(&mut self, records: &[R]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
        }

        let file = if self.started {
            OpenOptions::new().append(true).create(true).open(&self.path)
        } else {
            File::create(&self.path)
        }
        .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut writer = WriterBuilder::new()
            .has_headers(!self.started)
            .from_writer(file);
        for record in records {
            writer
                .serialize(record)
                .with_context(|| format!("Failed to write a row to {}", self.path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;

        debug!(
            "Wrote {} rows to {}{}",
            records.len(),
            self.path.display(),
            if self.started { "" } else { " (with header)" }
        );

        self.started = true;
        self.rows_written += records.len();
        Ok(records.len())
    }
}
