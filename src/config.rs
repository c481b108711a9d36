//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ratingsnap.toml` files.

use crate::models::{PerTable, TableKind, TableSelection};
use crate::pipeline::RunOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".ratingsnap.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where snapshots are read from.
    #[serde(default)]
    pub input: InputConfig,

    /// Where the CSV datasets are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// What a run converts.
    #[serde(default)]
    pub run: RunConfig,

    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Snapshot source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the `E<n>/` folders.
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,

    /// Number of groups, processed as E1..=E<groups>.
    #[serde(default = "default_groups")]
    pub groups: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            groups: default_groups(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("htmls")
}

fn default_groups() -> u32 {
    6
}

/// CSV output paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_histogram_out")]
    pub histogram: PathBuf,

    #[serde(default = "default_demographic_out")]
    pub demographic: PathBuf,

    #[serde(default = "default_region_out")]
    pub region: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            histogram: default_histogram_out(),
            demographic: default_demographic_out(),
            region: default_region_out(),
        }
    }
}

fn default_histogram_out() -> PathBuf {
    PathBuf::from(TableKind::Histogram.default_output())
}

fn default_demographic_out() -> PathBuf {
    PathBuf::from(TableKind::Demographic.default_output())
}

fn default_region_out() -> PathBuf {
    PathBuf::from(TableKind::Region.default_output())
}

/// Run settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// `"all"` or a comma-separated list of table names.
    #[serde(default)]
    pub tables: TableSelection,

    /// Cap on opened snapshot files. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,

    /// Abort on malformed file names and unexpected table layouts.
    #[serde(default)]
    pub strict: bool,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Show a progress bar over groups (never in quiet mode).
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Write the run summary as JSON to this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_json: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            progress: true,
            summary_json: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.input.dir = input.clone();
        }
        if let Some(groups) = args.groups {
            self.input.groups = groups;
        }

        if let Some(ref path) = args.histogram_out {
            self.output.histogram = path.clone();
        }
        if let Some(ref path) = args.demographic_out {
            self.output.demographic = path.clone();
        }
        if let Some(ref path) = args.region_out {
            self.output.region = path.clone();
        }

        if let Some(tables) = args.tables {
            self.run.tables = tables;
        }
        if args.max_files.is_some() {
            self.run.max_files = args.max_files;
        }

        // Flags only switch behavior on
        if args.strict {
            self.run.strict = true;
        }
        if args.summary_json.is_some() {
            self.general.summary_json = args.summary_json.clone();
        }
    }

    /// Check values that the file can set but the type cannot rule out.
    pub fn validate(&self) -> Result<()> {
        if self.input.groups == 0 {
            anyhow::bail!("Groups must be at least 1");
        }
        if self.run.max_files == Some(0) {
            anyhow::bail!("Max files must be at least 1");
        }
        Ok(())
    }

    /// Build the options of a run from the merged configuration.
    ///
    /// The progress bar is shown only when both `show_progress` and the
    /// `general.progress` setting allow it.
    pub fn run_options(&self, show_progress: bool) -> RunOptions {
        RunOptions {
            input_dir: self.input.dir.clone(),
            groups: self.input.groups,
            tables: self.run.tables,
            max_files: self.run.max_files,
            strict: self.run.strict,
            outputs: PerTable {
                histogram: self.output.histogram.clone(),
                demographic: self.output.demographic.clone(),
                region: self.output.region.clone(),
            },
            show_progress: show_progress && self.general.progress,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
