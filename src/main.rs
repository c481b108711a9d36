//! ratingsnap - ratings page snapshot converter
//!
//! A CLI tool that reads saved ratings pages, grouped by episode under
//! `E<n>/` folders, and appends their histogram, demographic and region
//! tables to three CSV datasets.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, unreadable input, strict-mode violation, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod extract;
mod models;
mod pipeline;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use scanner::SnapshotLocator;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ratingsnap v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_conversion(args) {
        error!("Conversion failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .ratingsnap.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the input folder, group count, tables and outputs.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over `-v`/`-q` when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete conversion workflow.
fn run_conversion(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    cli::validate_input_dir(&config.input.dir).map_err(anyhow::Error::msg)?;

    // Handle --dry-run: locate snapshots and exit
    if args.dry_run {
        return handle_dry_run(&config);
    }

    if !args.quiet {
        println!(
            "🔄 Converting {} groups from {} (tables: {})",
            config.input.groups,
            config.input.dir.display(),
            config.run.tables
        );
    }

    let options = config.run_options(!args.quiet);
    let summary = pipeline::run(&options)?;

    print!("{}", report::render_text(&summary));

    if summary.capped {
        info!("Stopped early after {} files", summary.files_opened);
    }
    debug!("Finished in {:.2}s", summary.duration_seconds);

    if let Some(ref path) = config.general.summary_json {
        report::write_json_summary(&summary, path)?;
        info!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Handle --dry-run: list the snapshots of every group, write nothing.
fn handle_dry_run(config: &Config) -> Result<()> {
    println!("\n🔍 Dry run: locating snapshots (nothing is written)...\n");

    let locator = SnapshotLocator::new(&config.input.dir, config.run.strict);
    let mut total = 0usize;

    for group in 1..=config.input.groups {
        let snapshots = locator.locate(group)?;
        if snapshots.is_empty() {
            println!("   E{}: no snapshots in {}", group, locator.group_dir(group).display());
            continue;
        }

        println!("   E{}: {} snapshots", group, snapshots.len());
        for snapshot in &snapshots {
            println!("     📄 {} ({})", snapshot.file_name(), snapshot.captured_at);
        }
        total += snapshots.len();
    }

    let opened = config.run.max_files.map_or(total, |cap| total.min(cap));
    println!("\n   Total: {} files, {} would be opened", total, opened);
    println!("\n✅ Dry run complete. No files were written.");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
