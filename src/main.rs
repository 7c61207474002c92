//! Partyroll - per-party candidate statistics from election rosters
//!
//! Reads candidate roster CSV files, decodes sex and age from each
//! candidate's identity code, and reports per-party statistics as JSON
//! or Markdown.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad arguments, unreadable roster, malformed record)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod roster;
mod scanner;

use analysis::{AnalysisOptions, Aggregator};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::RunSummary;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

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

    info!("Partyroll v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .partyroll.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            config::DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::DEFAULT_CONFIG_FILE))?;

    eprintln!("Created {} with default settings.", config::DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout is reserved for the report.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Read the rosters, aggregate, and write the report.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = args.input_path();
    let scan_config = scanner::ScanConfig::from(&config.scanner);
    let files = scanner::RosterScanner::new(input.to_path_buf(), scan_config).scan()?;

    // Handle --dry-run: list files and exit
    if args.dry_run {
        return handle_dry_run(&files);
    }

    let options = config.analysis_options();
    info!(
        "Analyzing {} roster file(s): order keys {}, reference year {}, {:?} policy",
        files.len(),
        options.order_keys,
        options.reference_year,
        options.policy
    );

    let aggregator = aggregate_files(&files, &config, &options, args.show_progress())?;

    let records_read = aggregator.records_seen();
    let records_skipped = aggregator.skipped();
    if records_skipped > 0 {
        warn!(
            "Skipped {} of {} records with malformed fields",
            records_skipped, records_read
        );
    }

    let reports = report::build(aggregator)?;
    info!(
        "Built statistics for {} parties from {} records",
        reports.len(),
        records_read - records_skipped
    );

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&reports)?,
        OutputFormat::Markdown => {
            let summary = RunSummary {
                source: input.display().to_string(),
                generated_at: Utc::now(),
                files_read: files.len(),
                records_read,
                records_skipped,
                parties: reports.len(),
                order_key_mode: options.order_keys,
                reference_year: options.reference_year,
            };
            report::generate_markdown_report(&summary, &reports)
        }
    };

    report::write_report(&output, args.output_path())?;

    if let Some(path) = args.output_path() {
        info!("Report saved to: {}", path.display());
    }
    debug!("Finished in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Fold each roster file into its own shard and merge them in file order.
fn aggregate_files(
    files: &[std::path::PathBuf],
    config: &Config,
    options: &AnalysisOptions,
    show_progress: bool,
) -> Result<Aggregator> {
    let mut total = Aggregator::new(*options);

    for file in files {
        let records = roster::read_roster(file, &config.columns, show_progress)?;
        let shard = analysis::aggregate(records, options)
            .with_context(|| format!("Failed to aggregate {}", file.display()))?;
        debug!(
            "{}: {} records, {} parties",
            file.display(),
            shard.records_seen(),
            shard.parties().len()
        );
        total.merge(shard);
    }

    Ok(total)
}

/// Handle --dry-run: print the roster files that would be read, exit.
fn handle_dry_run(files: &[std::path::PathBuf]) -> Result<()> {
    println!("Dry run: {} roster file(s) would be read:\n", files.len());

    let mut rows = 0;
    for file in files {
        let count = roster::count_rows(file)?;
        rows += count;
        println!("  {} ({} rows)", file.display(), count);
    }

    println!("\nTotal: {} rows", rows);
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// A config file that exists but fails to load aborts the run.
fn load_config(args: &Args) -> Result<Config> {
    Config::resolve(args.config.as_deref(), Path::new("."))
}
