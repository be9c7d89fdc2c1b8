//! Site-Auditor main entry point
//!
//! This is the command-line interface for the Site-Auditor single-page audit.

use anyhow::Context;
use clap::Parser;
use site_auditor::config::{load_config_with_hash, Config};
use site_auditor::output::{print_history, print_report, write_markdown_report};
use site_auditor::recommend::build_recommendations;
use site_auditor::{AnalysisMode, AnalysisOrchestrator, AnalysisRequest, AuditError};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Auditor: performance, SEO and accessibility audit for one URL
///
/// Fetches the page, inspects its markup, probes a sample of its links and,
/// when providers are configured, adds lab performance metrics, off-page
/// authority data and AI-written action items.
#[derive(Parser, Debug)]
#[command(name = "site-auditor")]
#[command(version)]
#[command(about = "Performance, SEO and accessibility audit for a single URL", long_about = None)]
struct Cli {
    /// URL to audit; the scheme defaults to https
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Analysis mode: fast or deep
    #[arg(short, long, default_value = "fast")]
    mode: AnalysisMode,

    /// Append the result to the scan history file
    #[arg(long, conflicts_with = "history")]
    save_history: bool,

    /// Print the result as JSON instead of a report
    #[arg(long)]
    json: bool,

    /// Write a Markdown report to this file
    #[arg(long, value_name = "FILE", conflicts_with = "history")]
    report: Option<PathBuf>,

    /// Show stored scan history for the URL and exit
    #[arg(long)]
    history: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_ref())?;
    let orchestrator = AnalysisOrchestrator::new(&config).context("Failed to set up the analyzer")?;

    if cli.history {
        handle_history(&orchestrator, &cli)?;
    } else {
        handle_analyze(&orchestrator, &cli).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_auditor=info,warn"),
            1 => EnvFilter::new("site_auditor=debug,info"),
            2 => EnvFilter::new("site_auditor=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so `--json` output stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --history mode: prints stored records for the URL
fn handle_history(orchestrator: &AnalysisOrchestrator, cli: &Cli) -> anyhow::Result<()> {
    let records = orchestrator
        .history()
        .get_history(&cli.url)
        .context("Failed to read scan history")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_history(&cli.url, &records);
    }
    Ok(())
}

/// Handles the main analysis; Ctrl-C cancels it
async fn handle_analyze(orchestrator: &AnalysisOrchestrator, cli: &Cli) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling analysis");
            interrupt.cancel();
        }
    });

    let request = AnalysisRequest::new(cli.url.clone(), cli.mode);
    let result = match orchestrator.analyze(&request, cli.save_history, &cancel).await {
        Ok(result) => result,
        Err(AuditError::Cancelled) => anyhow::bail!("Analysis cancelled"),
        Err(e) => return Err(e).context("Analysis failed"),
    };
    let recommendations = build_recommendations(&result);

    if let Some(path) = &cli.report {
        write_markdown_report(&result, &recommendations, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    if cli.json {
        let output = serde_json::json!({
            "result": result,
            "recommendations": recommendations,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !cli.quiet {
        print_report(&result, &recommendations);
    }

    Ok(())
}
