//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.partyroll.toml` files.

use crate::analysis::{AnalysisOptions, ErrorPolicy, DEFAULT_REFERENCE_YEAR, REFERENCE_YEARS};
use crate::cli::OutputFormat;
use crate::models::OrderKeyMode;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".partyroll.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Roster column names.
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Header names of the roster columns the analysis reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Column holding the national identity code.
    #[serde(default = "default_identity_column")]
    pub identity: String,

    /// Column holding the party name.
    #[serde(default = "default_party_column")]
    pub party: String,

    /// Column holding the list position.
    #[serde(default = "default_order_column")]
    pub order: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            identity: default_identity_column(),
            party: default_party_column(),
            order: default_order_column(),
        }
    }
}

fn default_identity_column() -> String {
    "IDNumber".to_string()
}

fn default_party_column() -> String {
    "Party name".to_string()
}

fn default_order_column() -> String {
    "Order Number".to_string()
}

/// Analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Year ages are computed against.
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,

    /// How order numbers are compared ("numeric" or "lexical").
    #[serde(default)]
    pub order_keys: OrderKeyMode,

    /// Skip malformed records with a warning instead of failing.
    #[serde(default)]
    pub lenient: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_year: default_reference_year(),
            order_keys: OrderKeyMode::default(),
            lenient: false,
        }
    }
}

fn default_reference_year() -> i32 {
    DEFAULT_REFERENCE_YEAR
}

impl From<&AnalysisConfig> for AnalysisOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            reference_year: config.reference_year,
            order_keys: config.order_keys,
            policy: if config.lenient {
                ErrorPolicy::Lenient
            } else {
                ErrorPolicy::Strict
            },
        }
    }
}

/// Roster file discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// File extensions to include.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory or file names to exclude.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            excludes: default_excludes(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_excludes() -> Vec<String> {
    vec!["target", "node_modules"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Report generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check values the TOML types alone cannot rule out.
    pub fn validate(&self) -> Result<()> {
        let year = self.analysis.reference_year;
        if !REFERENCE_YEARS.contains(&year) {
            bail!(
                "analysis.reference_year must be between {} and {}, got {}",
                REFERENCE_YEARS.start(),
                REFERENCE_YEARS.end(),
                year
            );
        }

        for (key, name) in [
            ("columns.identity", &self.columns.identity),
            ("columns.party", &self.columns.party),
            ("columns.order", &self.columns.order),
        ] {
            if name.trim().is_empty() {
                bail!("{} must not be empty", key);
            }
        }

        Ok(())
    }

    /// Try to load `.partyroll.toml` from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must load. Otherwise `.partyroll.toml` in `dir` is
    /// used when present, and a file that exists but does not parse or
    /// validate is an error.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from: {}", path.display());
            return Self::load(path);
        }

        match Self::load_from_dir(dir)? {
            Some(config) => {
                info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
                Ok(config)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref identity) = args.id_column {
            self.columns.identity = identity.clone();
        }
        if let Some(ref party) = args.party_column {
            self.columns.party = party.clone();
        }
        if let Some(ref order) = args.order_column {
            self.columns.order = order.clone();
        }

        if let Some(year) = args.reference_year {
            self.analysis.reference_year = year;
        }
        if let Some(mode) = args.order_keys {
            self.analysis.order_keys = mode;
        }

        // Flags only ever switch lenient mode on
        if args.lenient {
            self.analysis.lenient = true;
        }

        if let Some(ref extensions) = args.extensions {
            self.scanner.extensions = extensions.clone();
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Analysis options for the pipeline.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions::from(&self.analysis)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
