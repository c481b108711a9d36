//! Record tagging and per-group aggregation.
//!
//! Extractor rows get the snapshot's capture time and group attached, then
//! collect into one table per kind for the whole group.

use crate::error::ConvertError;
use crate::extract::{extract_demographic, extract_histogram, extract_region, RatingDocument};
use crate::models::{
    DemographicRecord, DemographicRow, HistogramRecord, HistogramRow, PerTable, RegionRecord,
    RegionRow, TableKind,
};
use crate::scanner::SnapshotFile;
use chrono::NaiveDateTime;

/// A row that can be tagged with its snapshot's capture time and group.
pub trait Tag {
    type Record;

    fn tag(self, date_time: NaiveDateTime, episode: u32) -> Self::Record;
}

impl Tag for HistogramRow {
    type Record = HistogramRecord;

    fn tag(self, date_time: NaiveDateTime, episode: u32) -> HistogramRecord {
        HistogramRecord {
            rating: self.rating,
            vote_counts: self.vote_counts,
            date_time,
            episode,
        }
    }
}

impl Tag for DemographicRow {
    type Record = DemographicRecord;

    fn tag(self, date_time: NaiveDateTime, episode: u32) -> DemographicRecord {
        DemographicRecord {
            gender: self.gender,
            age_group: self.age_group,
            rating: self.rating,
            vote_count: self.vote_count,
            date_time,
            episode,
        }
    }
}

impl Tag for RegionRow {
    type Record = RegionRecord;

    fn tag(self, date_time: NaiveDateTime, episode: u32) -> RegionRecord {
        RegionRecord {
            region: self.region,
            rating: self.rating,
            vote_counts: self.vote_counts,
            date_time,
            episode,
        }
    }
}

/// Tag every row with the capture time and group of `snapshot`.
pub fn tag<R: Tag>(rows: Vec<R>, snapshot: &SnapshotFile) -> Vec<R::Record> {
    rows.into_iter()
        .map(|row| row.tag(snapshot.captured_at, snapshot.group))
        .collect()
}

/// All records extracted from the snapshots of one group.
#[derive(Debug, Default)]
pub struct GroupTables {
    pub histogram: Vec<HistogramRecord>,
    pub demographic: Vec<DemographicRecord>,
    pub region: Vec<RegionRecord>,
    /// Snapshots that added at least one record, per table.
    contributed: PerTable<usize>,
}

impl GroupTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract `kind` from `doc` and append its tagged records.
    ///
    /// Nothing is appended when extraction fails. Returns the number of
    /// records added.
    pub fn absorb(
        &mut self,
        kind: TableKind,
        doc: &RatingDocument,
        snapshot: &SnapshotFile,
    ) -> Result<usize, ConvertError> {
        let table = doc.table(kind)?;
        let added = match kind {
            TableKind::Histogram => {
                append(&mut self.histogram, tag(extract_histogram(table)?, snapshot))
            }
            TableKind::Demographic => {
                append(&mut self.demographic, tag(extract_demographic(table)?, snapshot))
            }
            TableKind::Region => append(&mut self.region, tag(extract_region(table)?, snapshot)),
        };

        if added > 0 {
            *self.contributed.get_mut(kind) += 1;
        }
        Ok(added)
    }

    /// Number of snapshots that added records to `kind`.
    pub fn contributed(&self, kind: TableKind) -> usize {
        *self.contributed.get(kind)
    }

    pub fn record_count(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::Histogram => self.histogram.len(),
            TableKind::Demographic => self.demographic.len(),
            TableKind::Region => self.region.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        TableKind::ALL.iter().all(|k| self.record_count(*k) == 0)
    }
}

fn append<T>(target: &mut Vec<T>, mut records: Vec<T>) -> usize {
    let added = records.len();
    target.append(&mut records);
    added
}
