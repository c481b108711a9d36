//! Snapshot locator.
//!
//! Snapshots of one group live under `<root>/E<group>/` and are named
//! `E<group>_<YYYY-MM-DD_HH-MM-SS>.html`; the timestamp in the name is the
//! capture time of the page.

use crate::error::ConvertError;
use crate::models::CAPTURE_TIME_FORMAT;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use glob::{glob, Pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static CAPTURE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}").expect("capture time pattern is valid")
});

/// One snapshot file selected for a group.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub group: u32,
    pub captured_at: NaiveDateTime,
}

impl SnapshotFile {
    /// Read the raw HTML of the snapshot.
    pub fn read(&self) -> Result<String> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read snapshot {}", self.path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Extract the capture time from a snapshot file name.
pub fn parse_capture_time(path: &Path) -> Result<NaiveDateTime, ConvertError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ConvertError::MalformedFilename(path.to_path_buf()))?;

    let found = CAPTURE_TIME
        .find(name)
        .ok_or_else(|| ConvertError::MalformedFilename(path.to_path_buf()))?;

    NaiveDateTime::parse_from_str(found.as_str(), CAPTURE_TIME_FORMAT)
        .map_err(|_| ConvertError::MalformedFilename(path.to_path_buf()))
}

/// Finds the snapshot files belonging to a group.
pub struct SnapshotLocator {
    root: PathBuf,
    strict: bool,
}

impl SnapshotLocator {
    /// Create a locator over `root`.
    ///
    /// With `strict`, a selected file without a capture timestamp fails the
    /// whole lookup; otherwise it is logged and left out.
    pub fn new(root: impl Into<PathBuf>, strict: bool) -> Self {
        Self {
            root: root.into(),
            strict,
        }
    }

    pub fn group_dir(&self, group: u32) -> PathBuf {
        self.root.join(format!("E{}", group))
    }

    /// Snapshots of `group`, ordered by path.
    pub fn locate(&self, group: u32) -> Result<Vec<SnapshotFile>> {
        let dir = self.group_dir(group);
        if !dir.is_dir() {
            debug!("No snapshot directory for group {}: {}", group, dir.display());
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/E{}_*.html",
            Pattern::escape(&dir.to_string_lossy()),
            group
        );

        let mut paths: Vec<PathBuf> = Vec::new();
        let entries =
            glob(&pattern).with_context(|| format!("Invalid snapshot pattern {}", pattern))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => warn!("Cannot read snapshot entry: {}", e),
            }
        }
        paths.sort();

        let mut snapshots = Vec::with_capacity(paths.len());
        for path in paths {
            match parse_capture_time(&path) {
                Ok(captured_at) => snapshots.push(SnapshotFile {
                    path,
                    group,
                    captured_at,
                }),
                Err(e) if self.strict => return Err(e.into()),
                Err(e) => warn!("Ignoring snapshot: {}", e),
            }
        }

        debug!("Group {}: {} snapshots", group, snapshots.len());
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), "<html></html>").unwrap();
    }

    #[test]
    fn test_parse_capture_time() {
        let ts = parse_capture_time(Path::new("htmls/E2/E2_2019-05-03_23-10-36.html")).unwrap();
        let expected = NaiveDate::from_ymd_opt(2019, 5, 3)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(23, 10, 36).unwrap());
        assert_eq!(ts, expected);
    }

    #[test]
    fn test_parse_capture_time_rejects_missing_or_invalid() {
        assert!(matches!(
            parse_capture_time(Path::new("E1_latest.html")),
            Err(ConvertError::MalformedFilename(_))
        ));
        assert!(matches!(
            parse_capture_time(Path::new("E1_2019-13-40_25-00-00.html")),
            Err(ConvertError::MalformedFilename(_))
        ));
    }

    #[test]
    fn test_locate_selects_group_files_in_order() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("E1");
        touch(&dir, "E1_2019-05-04_08-00-00.html");
        touch(&dir, "E1_2019-05-03_23-10-36.html");
        touch(&dir, "E2_2019-05-03_23-10-36.html");
        touch(&dir, "notes.txt");

        let locator = SnapshotLocator::new(tmp.path(), false);
        let found = locator.locate(1).unwrap();

        let names: Vec<String> = found.iter().map(|s| s.file_name()).collect();
        assert_eq!(
            names,
            vec!["E1_2019-05-03_23-10-36.html", "E1_2019-05-04_08-00-00.html"]
        );
        assert!(found.iter().all(|s| s.group == 1));
    }

    #[test]
    fn test_locate_missing_group_is_empty() {
        let tmp = TempDir::new().unwrap();
        let locator = SnapshotLocator::new(tmp.path(), true);
        assert!(locator.locate(7).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_name_lenient_and_strict() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("E3");
        touch(&dir, "E3_2019-05-03_23-10-36.html");
        touch(&dir, "E3_copy.html");

        let lenient = SnapshotLocator::new(tmp.path(), false);
        assert_eq!(lenient.locate(3).unwrap().len(), 1);

        let strict = SnapshotLocator::new(tmp.path(), true);
        let err = strict.locate(3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::MalformedFilename(_))
        ));
    }
}
