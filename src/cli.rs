//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::REFERENCE_YEARS;
use crate::models::OrderKeyMode;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Partyroll - per-party candidate statistics from election rosters
///
/// Reads candidate rosters (CSV) and reports, per party, the number of
/// men and women, median age, share of women, and the make-up of the
/// first ten list positions.
///
/// Examples:
///   partyroll all.csv
///   partyroll all.csv --output parties.json
///   partyroll rosters/ --format markdown --output report.md
///   partyroll all.csv --order-keys lexical --lenient
///   partyroll --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Roster file, or a directory searched for roster files
    #[arg(value_name = "INPUT", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report (stdout if omitted or "-")
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, markdown)
    ///
    /// Defaults to the config file setting, or json.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .partyroll.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "PARTYROLL_CONFIG")]
    pub config: Option<PathBuf>,

    /// How list positions are compared when picking the top ten
    #[arg(long, value_name = "MODE")]
    pub order_keys: Option<OrderKeyMode>,

    /// Year ages are computed against (default 2019)
    #[arg(long, value_name = "YEAR")]
    pub reference_year: Option<i32>,

    /// Skip malformed records with a warning instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Name of the identity code column
    #[arg(long, value_name = "NAME")]
    pub id_column: Option<String>,

    /// Name of the party column
    #[arg(long, value_name = "NAME")]
    pub party_column: Option<String>,

    /// Name of the list position column
    #[arg(long, value_name = "NAME")]
    pub order_column: Option<String>,

    /// Roster file extensions to include when INPUT is a directory (comma-separated)
    #[arg(long, value_name = "EXTS", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: list the roster files that would be read and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .partyroll.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of party objects (default)
    #[default]
    Json,
    /// Markdown summary
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the input path (validated to be present unless --init-config).
    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Output path, or `None` for stdout.
    pub fn output_path(&self) -> Option<&Path> {
        self.output
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(year) = self.reference_year {
            if !REFERENCE_YEARS.contains(&year) {
                return Err(format!(
                    "Reference year must be between {} and {}",
                    REFERENCE_YEARS.start(),
                    REFERENCE_YEARS.end()
                ));
            }
        }

        if let Some(ref extensions) = self.extensions {
            if extensions.iter().all(|e| e.trim().is_empty()) {
                return Err("At least one extension is required".to_string());
            }
        }

        for (flag, value) in [
            ("--id-column", &self.id_column),
            ("--party-column", &self.party_column),
            ("--order-column", &self.order_column),
        ] {
            if matches!(value, Some(name) if name.trim().is_empty()) {
                return Err(format!("{} must not be empty", flag));
            }
        }

        // Validate input path if provided
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input path does not exist: {}", input.display()));
            }
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

    /// Whether to draw progress spinners.
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from(".")),
            output: None,
            format: None,
            config: None,
            order_keys: None,
            reference_year: None,
            lenient: false,
            id_column: None,
            party_column: None,
            order_column: None,
            extensions: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "partyroll",
            "rosters",
            "--format",
            "markdown",
            "--order-keys",
            "lexical",
            "--reference-year",
            "2024",
            "--extensions",
            "csv,txt",
            "-o",
            "report.md",
        ]);

        assert_eq!(args.input, Some(PathBuf::from("rosters")));
        assert_eq!(args.format, Some(OutputFormat::Markdown));
        assert_eq!(args.order_keys, Some(OrderKeyMode::Lexical));
        assert_eq!(args.reference_year, Some(2024));
        assert_eq!(
            args.extensions,
            Some(vec!["csv".to_string(), "txt".to_string()])
        );
        assert_eq!(args.output_path(), Some(Path::new("report.md")));
    }

    #[test]
    fn test_input_required_unless_init_config() {
        assert!(Args::try_parse_from(["partyroll"]).is_err());
        assert!(Args::try_parse_from(["partyroll", "--init-config"]).is_ok());
    }

    #[test]
    fn test_dash_output_means_stdout() {
        let mut args = make_args();
        args.output = Some(PathBuf::from("-"));
        assert_eq!(args.output_path(), None);
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
        args.input = Some(PathBuf::from("/nonexistent/roster.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_empty_column() {
        let mut args = make_args();
        args.party_column = Some("  ".to_string());
        assert_eq!(
            args.validate().unwrap_err(),
            "--party-column must not be empty"
        );
    }

    #[test]
    fn test_validation_reference_year() {
        let mut args = make_args();
        args.reference_year = Some(19);
        assert!(args.validate().is_err());
        args.reference_year = Some(2019);
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
        assert!(!args.show_progress());
    }
}
