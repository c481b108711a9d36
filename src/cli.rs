//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Values left unset fall back to the
//! configuration file and then to built-in defaults.

use crate::models::TableSelection;
use clap::Parser;
use std::path::PathBuf;

/// ratingsnap - convert saved ratings pages into CSV datasets
///
/// Reads the snapshots stored as <input>/E<n>/E<n>_<YYYY-MM-DD_HH-MM-SS>.html
/// for groups 1..=N and appends the histogram, demographic and region tables
/// to three CSV files.
///
/// Examples:
///   ratingsnap --input htmls --groups 6
///   ratingsnap --tables region --region-out data/region.csv
///   ratingsnap --max-files 3 --strict -v
///   ratingsnap --dry-run
///   ratingsnap --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding the E<n>/ snapshot folders
    ///
    /// Defaults to the config value, or "htmls".
    #[arg(short, long, value_name = "DIR", env = "RATINGSNAP_INPUT")]
    pub input: Option<PathBuf>,

    /// Number of groups to process, starting at E1
    #[arg(short, long, value_name = "N")]
    pub groups: Option<u32>,

    /// Tables to extract: "all" or a comma-separated list
    ///
    /// Example: --tables histogram,region
    #[arg(short, long, value_name = "LIST")]
    pub tables: Option<TableSelection>,

    /// Stop after this many snapshot files have been opened
    #[arg(long, value_name = "COUNT")]
    pub max_files: Option<usize>,

    /// Output file for the rating histogram
    #[arg(long, value_name = "FILE")]
    pub histogram_out: Option<PathBuf>,

    /// Output file for the demographic breakdown
    #[arg(long, value_name = "FILE")]
    pub demographic_out: Option<PathBuf>,

    /// Output file for the regional breakdown
    #[arg(long, value_name = "FILE")]
    pub region_out: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ratingsnap.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Abort on malformed file names or unexpected table layouts
    ///
    /// Without this flag such files are reported and skipped.
    #[arg(long)]
    pub strict: bool,

    /// List the snapshots that would be converted and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the run summary as JSON
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .ratingsnap.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.groups == Some(0) {
            return Err("Groups must be at least 1".to_string());
        }

        if self.max_files == Some(0) {
            return Err("Max files must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            validate_input_dir(input)?;
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Check that `path` is an existing directory.
pub fn validate_input_dir(path: &std::path::Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Input directory does not exist: {}", path.display()));
    }
    if !path.is_dir() {
        return Err(format!("Input path is not a directory: {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TableKind;

    fn make_args() -> Args {
        Args {
            input: None,
            groups: Some(6),
            tables: None,
            max_files: None,
            histogram_out: None,
            demographic_out: None,
            region_out: None,
            config: None,
            strict: false,
            dry_run: false,
            summary_json: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_groups() {
        let mut args = make_args();
        args.groups = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_max_files() {
        let mut args = make_args();
        args.max_files = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/definitely/not/here/htmls"));
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "ratingsnap",
            "--groups",
            "3",
            "--tables",
            "histogram,region",
            "--max-files",
            "10",
            "--strict",
        ])
        .unwrap();

        assert_eq!(args.groups, Some(3));
        assert_eq!(args.max_files, Some(10));
        assert!(args.strict);
        let tables = args.tables.unwrap();
        assert!(tables.contains(TableKind::Histogram));
        assert!(!tables.contains(TableKind::Demographic));
    }

    #[test]
    fn test_rejects_unknown_table() {
        assert!(Args::try_parse_from(["ratingsnap", "--tables", "ratings"]).is_err());
    }
}
