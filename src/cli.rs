//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{parse_calendar_date, DateWindow};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// M8 Analytics - event ROI and conversion reports for advisors
///
/// Aggregates marketing events (attendance, production, expenses and
/// appointments) into summary, monthly and per-type metrics, and writes
/// a Markdown, JSON or CSV report.
///
/// Examples:
///   m8-analytics --events ./exports --user advisor-1
///   m8-analytics --events events.json --user advisor-1 --from 2024-01-01 --to 2024-06-30
///   m8-analytics --events events.json --user advisor-1 --format csv --output -
///   m8-analytics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Event export to analyze (a JSON file or a directory of JSON files)
    ///
    /// Falls back to `[data] events` in .m8analytics.toml.
    #[arg(short, long, value_name = "PATH", env = "M8_EVENTS")]
    pub events: Option<PathBuf>,

    /// Signed-in advisor; rows owned by other users are ignored
    #[arg(short, long, value_name = "USER_ID", env = "M8_USER_ID")]
    pub user: Option<String>,

    /// First event date to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last event date to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Output file path for the report (`-` for stdout)
    ///
    /// Defaults to m8_report.<md|json|csv> depending on --format
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, csv)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .m8analytics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of top events listed in the Markdown report
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load and list events without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .m8analytics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// CSV, one row per event
    Csv,
}

impl OutputFormat {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "m8_report.md",
            OutputFormat::Json => "m8_report.json",
            OutputFormat::Csv => "m8_report.csv",
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_calendar_date(raw)
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The reporting window selected with --from/--to.
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.from, self.to)
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

        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(format!("--from ({}) is after --to ({})", from, to));
            }
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
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
