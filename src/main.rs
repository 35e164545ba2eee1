//! M8 Analytics - event ROI reports for financial advisors
//!
//! A CLI tool that loads marketing events exported from the M8 Business
//! Suite, aggregates them and writes a Markdown, JSON or CSV report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing export, bad config, signed out, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use m8_analytics::analysis::{aggregate_window, ROI_SENTINEL};
use m8_analytics::cli::{Args, OutputFormat};
use m8_analytics::config::{Config, CONFIG_FILE};
use m8_analytics::loader::{EventStore, LoaderConfig};
use m8_analytics::models::{Report, ReportMetadata};
use m8_analytics::report;
use m8_analytics::session::StaticSession;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
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

    // Config first, so its verbosity setting reaches the logger
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("m8-analytics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args, config).await {
        error!("Report failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .m8analytics.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the event export, advisor and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        Level::DEBUG
    } else {
        args.log_level()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load, aggregate and write the report.
async fn run(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    let session = Arc::new(StaticSession::from_optional(config.data.user_id.as_deref()));
    let store = EventStore::new(
        PathBuf::from(&config.data.events),
        LoaderConfig::from(&config.data),
        session,
    );

    if args.dry_run {
        return handle_dry_run(&store).await;
    }

    let output_path = config.output_path(args.format);
    let to_stdout = output_path == Path::new("-");
    let chatty = !args.quiet && !to_stdout;

    if chatty {
        println!("📥 Loading events from {}", config.data.events);
    }

    let events = store
        .load()
        .await
        .with_context(|| format!("Failed to load events from {}", config.data.events))?;

    let window = args.window();
    if !window.is_unbounded() {
        info!("Reporting window: {}", window);
    }

    let analytics = aggregate_window(&events, &window);
    if analytics.is_empty() {
        warn!("No events matched {}", window);
    }

    let report = Report {
        metadata: ReportMetadata {
            source: config.data.events.clone(),
            user_id: config.data.user_id.clone(),
            window,
            generated_at: Utc::now(),
            events_loaded: events.len(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        analytics,
    };

    let output = match args.format {
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Csv => report::generate_csv_report(&report.analytics.events)?,
    };

    if to_stdout {
        print!("{}", output);
    } else {
        std::fs::write(&output_path, &output)
            .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    }

    if chatty {
        let summary = &report.analytics.summary;
        let roi = if summary.overall_roi == ROI_SENTINEL {
            "N/A (no spend)".to_string()
        } else {
            format!("{:.1}%", summary.overall_roi)
        };

        println!("\n📊 Summary ({}):", report.metadata.window);
        println!("   Events: {}", summary.total_events);
        println!(
            "   Revenue: {:.2} | Expenses: {:.2} | Profit: {:.2}",
            summary.total_revenue, summary.total_expenses, summary.total_profit
        );
        println!(
            "   ROI: {} | Conversion: {:.1}%",
            roi, summary.overall_conversion_rate
        );
        println!(
            "\n✅ Report saved to: {}",
            output_path.display()
        );
    }

    Ok(())
}

/// Handle --dry-run: list what would be loaded, exit.
async fn handle_dry_run(store: &EventStore) -> Result<()> {
    println!("\n🔍 Dry run: loading events (no report written)...\n");

    let files = store.discover()?;
    for file in &files {
        println!("     📄 {}", file.display());
    }

    let events = store.load().await?;
    if events.is_empty() {
        println!("   No events found.");
    } else {
        println!("\n   Found {} events:\n", events.len());
        for event in &events {
            println!(
                "     {}  {}  {}",
                event.date,
                event.marketing_type.as_deref().unwrap_or("-"),
                event.name.as_deref().unwrap_or(&event.id)
            );
        }
    }

    println!("\n✅ Dry run complete.");
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
