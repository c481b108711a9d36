//! Data models for the ratings converter.
//!
//! This module contains the table kinds, the constrained label sets of the
//! demographic and region tables, and the row/record shapes that flow from
//! the extractors to the CSV sinks.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Format of the capture timestamp embedded in snapshot file names.
pub const CAPTURE_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// One of the three rating tables found on a ratings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Histogram,
    Demographic,
    Region,
}

impl TableKind {
    /// All tables, in page order.
    pub const ALL: [TableKind; 3] = [
        TableKind::Histogram,
        TableKind::Demographic,
        TableKind::Region,
    ];

    /// Position of this table among the page's `<table>` elements.
    pub fn position(self) -> usize {
        match self {
            TableKind::Histogram => 0,
            TableKind::Demographic => 1,
            TableKind::Region => 2,
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            TableKind::Histogram => "histogram.csv",
            TableKind::Demographic => "demographic.csv",
            TableKind::Region => "region.csv",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TableKind::Histogram => "histogram",
            TableKind::Demographic => "demographic",
            TableKind::Region => "region",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "histogram" => Ok(TableKind::Histogram),
            "demographic" | "demographics" => Ok(TableKind::Demographic),
            "region" => Ok(TableKind::Region),
            other => Err(format!(
                "unknown table '{}' (expected histogram, demographic or region)",
                other
            )),
        }
    }
}

/// Which tables a run extracts and writes.
///
/// Parsed from `all` or a comma-separated list of table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableSelection {
    histogram: bool,
    demographic: bool,
    region: bool,
}

impl TableSelection {
    pub fn all() -> Self {
        Self {
            histogram: true,
            demographic: true,
            region: true,
        }
    }

    pub fn only(kind: TableKind) -> Self {
        let mut selection = Self {
            histogram: false,
            demographic: false,
            region: false,
        };
        selection.insert(kind);
        selection
    }

    fn insert(&mut self, kind: TableKind) {
        match kind {
            TableKind::Histogram => self.histogram = true,
            TableKind::Demographic => self.demographic = true,
            TableKind::Region => self.region = true,
        }
    }

    pub fn contains(&self, kind: TableKind) -> bool {
        match kind {
            TableKind::Histogram => self.histogram,
            TableKind::Demographic => self.demographic,
            TableKind::Region => self.region,
        }
    }

    /// Selected tables, in page order.
    pub fn iter(&self) -> impl Iterator<Item = TableKind> + '_ {
        TableKind::ALL.into_iter().filter(|k| self.contains(*k))
    }

    pub fn is_all(&self) -> bool {
        self.histogram && self.demographic && self.region
    }
}

impl Default for TableSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for TableSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let mut kinds = s.split(',').map(str::trim).filter(|p| !p.is_empty());
        let first: TableKind = kinds
            .next()
            .ok_or_else(|| "table selection is empty".to_string())?
            .parse()?;

        let mut selection = Self::only(first);
        for part in kinds {
            selection.insert(part.parse()?);
        }
        Ok(selection)
    }
}

impl TryFrom<String> for TableSelection {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TableSelection> for String {
    fn from(selection: TableSelection) -> Self {
        selection.to_string()
    }
}

impl fmt::Display for TableSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return f.write_str("all");
        }
        let names: Vec<&str> = self.iter().map(TableKind::name).collect();
        f.write_str(&names.join(","))
    }
}

/// Gender rows of the demographic table, stored as single-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    #[serde(rename = "A")]
    All,
    #[serde(rename = "M")]
    Males,
    #[serde(rename = "F")]
    Females,
}

impl Gender {
    /// Resolve a row label ("All", "Males", "Females") by its first character.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().chars().next()? {
            'A' => Some(Gender::All),
            'M' => Some(Gender::Males),
            'F' => Some(Gender::Females),
            _ => None,
        }
    }
}

/// Age-group columns of the demographic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeGroup {
    #[serde(rename = "All Ages")]
    AllAges,
    #[serde(rename = "<18")]
    Under18,
    #[serde(rename = "18-29")]
    From18To29,
    #[serde(rename = "30-44")]
    From30To44,
    #[serde(rename = "45+")]
    Over45,
}

impl AgeGroup {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "All Ages" => Some(AgeGroup::AllAges),
            "<18" => Some(AgeGroup::Under18),
            "18-29" => Some(AgeGroup::From18To29),
            "30-44" => Some(AgeGroup::From30To44),
            "45+" => Some(AgeGroup::Over45),
            _ => None,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgeGroup::AllAges => "All Ages",
            AgeGroup::Under18 => "<18",
            AgeGroup::From18To29 => "18-29",
            AgeGroup::From30To44 => "30-44",
            AgeGroup::Over45 => "45+",
        };
        f.write_str(label)
    }
}

/// Region columns of the region table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    #[serde(rename = "Top 1000 Voters")]
    Top1000Voters,
    #[serde(rename = "US Users")]
    UsUsers,
    #[serde(rename = "Non-US Users")]
    NonUsUsers,
}

impl Region {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Top 1000 Voters" => Some(Region::Top1000Voters),
            "US Users" => Some(Region::UsUsers),
            "Non-US Users" => Some(Region::NonUsUsers),
            _ => None,
        }
    }
}

/// A value kept once per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerTable<T> {
    pub histogram: T,
    pub demographic: T,
    pub region: T,
}

impl<T> PerTable<T> {
    pub fn get(&self, kind: TableKind) -> &T {
        match kind {
            TableKind::Histogram => &self.histogram,
            TableKind::Demographic => &self.demographic,
            TableKind::Region => &self.region,
        }
    }

    pub fn get_mut(&mut self, kind: TableKind) -> &mut T {
        match kind {
            TableKind::Histogram => &mut self.histogram,
            TableKind::Demographic => &mut self.demographic,
            TableKind::Region => &mut self.region,
        }
    }
}

/// One histogram row as read from a page, before tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRow {
    pub rating: u8,
    pub vote_counts: u64,
}

/// One demographic cell (gender × age group) as read from a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicRow {
    pub gender: Gender,
    pub age_group: AgeGroup,
    /// `None` when the page shows `-` (too few votes to compute a rating).
    pub rating: Option<f64>,
    pub vote_count: u64,
}

/// One region column as read from a page.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRow {
    pub region: Region,
    pub rating: Option<f64>,
    pub vote_counts: u64,
}

/// A row of `histogram.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramRecord {
    pub rating: u8,
    pub vote_counts: u64,
    #[serde(serialize_with = "serialize_capture_time")]
    pub date_time: NaiveDateTime,
    pub episode: u32,
}

/// A row of `demographic.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicRecord {
    pub gender: Gender,
    pub age_group: AgeGroup,
    pub rating: Option<f64>,
    pub vote_count: u64,
    #[serde(serialize_with = "serialize_capture_time")]
    pub date_time: NaiveDateTime,
    pub episode: u32,
}

/// A row of `region.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRecord {
    pub region: Region,
    pub rating: Option<f64>,
    pub vote_counts: u64,
    #[serde(serialize_with = "serialize_capture_time")]
    pub date_time: NaiveDateTime,
    pub episode: u32,
}

/// Write a capture time back in the file-name form it was read from.
fn serialize_capture_time<S: Serializer>(
    value: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(CAPTURE_TIME_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_kind_from_str() {
        assert_eq!("histogram".parse::<TableKind>(), Ok(TableKind::Histogram));
        assert_eq!("Demographics".parse::<TableKind>(), Ok(TableKind::Demographic));
        assert_eq!(" region ".parse::<TableKind>(), Ok(TableKind::Region));
        assert!("votes".parse::<TableKind>().is_err());
    }

    #[test]
    fn test_table_positions_follow_page_order() {
        let positions: Vec<usize> = TableKind::ALL.iter().map(|k| k.position()).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_table_selection_parsing() {
        let all: TableSelection = "all".parse().unwrap();
        assert!(all.is_all());
        assert_eq!(all.to_string(), "all");

        let one: TableSelection = "region".parse().unwrap();
        assert!(one.contains(TableKind::Region));
        assert!(!one.contains(TableKind::Histogram));
        assert_eq!(one.iter().collect::<Vec<_>>(), vec![TableKind::Region]);

        let two: TableSelection = "region, histogram".parse().unwrap();
        assert_eq!(
            two.iter().collect::<Vec<_>>(),
            vec![TableKind::Histogram, TableKind::Region]
        );
        assert_eq!(two.to_string(), "histogram,region");

        assert!("".parse::<TableSelection>().is_err());
        assert!("histogram,ages".parse::<TableSelection>().is_err());
    }

    #[test]
    fn test_gender_from_label() {
        assert_eq!(Gender::from_label("All"), Some(Gender::All));
        assert_eq!(Gender::from_label(" Males"), Some(Gender::Males));
        assert_eq!(Gender::from_label("Females"), Some(Gender::Females));
        assert_eq!(Gender::from_label("Other"), None);
        assert_eq!(Gender::from_label(""), None);
    }

    #[test]
    fn test_label_sets() {
        assert_eq!(AgeGroup::from_label("<18"), Some(AgeGroup::Under18));
        assert_eq!(AgeGroup::from_label("45+"), Some(AgeGroup::Over45));
        assert_eq!(AgeGroup::from_label("65+"), None);
        assert_eq!(AgeGroup::From30To44.to_string(), "30-44");
        assert_eq!(Region::from_label("Non-US Users"), Some(Region::NonUsUsers));
        assert_eq!(Region::from_label("EU Users"), None);
    }
}
