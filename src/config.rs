//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.m8analytics.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".m8analytics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Event source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output path. Derived from the format when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where events come from and whose they are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON export file or directory.
    #[serde(default = "default_events")]
    pub events: String,

    /// Advisor whose events are reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Directory or file names to skip.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Maximum export file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            events: default_events(),
            user_id: None,
            excludes: default_excludes(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_events() -> String {
    "events.json".to_string()
}

fn default_excludes() -> Vec<String> {
    vec!["archive", "drafts"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_file_size() -> u64 {
    16 * 1024 * 1024 // 16MB
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Events listed in the "Top Events" section.
    #[serde(default = "default_top_events")]
    pub top_events: usize,

    /// Symbol prefixed to currency amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Include the full per-event table in Markdown reports.
    #[serde(default = "default_true")]
    pub include_events_table: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_events: default_top_events(),
            currency_symbol: default_currency_symbol(),
            include_events_table: true,
        }
    }
}

fn default_top_events() -> usize {
    5
}

fn default_currency_symbol() -> String {
    "$".to_string()
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
        let default_path = Path::new(CONFIG_FILE);

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
        if let Some(ref events) = args.events {
            self.data.events = events.to_string_lossy().to_string();
        }
        if let Some(ref user) = args.user {
            self.data.user_id = Some(user.clone());
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.to_string_lossy().to_string());
        }
        if let Some(top) = args.top {
            self.report.top_events = top;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Where the report goes for the chosen format.
    pub fn output_path(&self, format: crate::cli::OutputFormat) -> PathBuf {
        self.general
            .output
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format.default_file_name()))
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
