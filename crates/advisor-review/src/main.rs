//! Ad-Visor command line front end.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use advisor_gemini::GeminiClient;
use advisor_models::{CombinedTable, KpiPoint};
use advisor_review::logging::init_tracing;
use advisor_review::metrics::init_metrics;
use advisor_review::{
    AnalysisOrchestrator, CancelHandle, CancelSignal, LogReporter, ReviewConfig, ReviewSession,
};

#[derive(Parser)]
#[command(name = "advisor")]
#[command(version, about = "Cultural, DE&I and performance review of advertising videos")]
struct Cli {
    /// Print collected metrics (Prometheus text format) to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review a single video
    Review {
        /// Video file to review
        video: PathBuf,
    },

    /// Compare a video against the mock video using both KPI datasets
    Compare {
        /// Current version of the video
        video: PathBuf,

        /// Previous version of the video [default: <analytics dir>/mock.mp4]
        #[arg(long)]
        mock: Option<PathBuf>,
    },

    /// Show the imported KPI data
    Kpis {
        /// Include the previous-version dataset
        #[arg(long)]
        with_previous: bool,

        /// Print the table and chart series as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing();

    let metrics = init_metrics().context("Failed to install metrics recorder")?;

    let cli = Cli::parse();
    let config = ReviewConfig::from_env();
    info!("Review config: {:?}", config);

    let result = match cli.command {
        Command::Review { video } => review(&config, video).await,
        Command::Compare { video, mock } => compare(&config, video, mock).await,
        Command::Kpis {
            with_previous,
            json,
        } => kpis(&config, with_previous, json).await,
    };

    if cli.metrics {
        eprintln!("{}", metrics.render());
    }
    result
}

fn orchestrator(config: &ReviewConfig) -> Result<AnalysisOrchestrator> {
    let client = GeminiClient::from_env().context("Failed to create Gemini client")?;
    info!("Using model {}", client.model());
    Ok(AnalysisOrchestrator::new(Arc::new(client), config).with_reporter(Arc::new(LogReporter)))
}

/// Cancel the running operation on Ctrl-C.
fn cancel_on_interrupt() -> CancelSignal {
    let (handle, signal) = CancelHandle::pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received interrupt, cancelling");
            handle.cancel();
        }
    });
    signal
}

async fn review(config: &ReviewConfig, video: PathBuf) -> Result<()> {
    let orchestrator = orchestrator(config)?;
    let cancel = cancel_on_interrupt();

    let mut session = ReviewSession::new();
    session.set_video(&video);
    let outcome = session
        .review(&orchestrator, &cancel)
        .await
        .with_context(|| format!("Review of {} failed", video.display()))?;

    println!("{}", outcome.result.text());
    if let Some(asset) = outcome.asset {
        info!("Remote asset {} kept", asset.id);
    }
    Ok(())
}

async fn compare(config: &ReviewConfig, video: PathBuf, mock: Option<PathBuf>) -> Result<()> {
    let orchestrator = orchestrator(config)?;
    let cancel = cancel_on_interrupt();
    let mock = mock.unwrap_or_else(|| config.mock_video_path());

    let mut session = ReviewSession::new();
    session.set_video(&video);
    session
        .import_current_fixture(config)
        .await
        .context("Failed to import current analytics")?;
    session
        .import_previous_fixture(config)
        .await
        .context("Failed to import previous analytics")?;

    let report = session.compare(&orchestrator, &mock, &cancel).await?;

    println!("# Current video\n\n{}\n", report.current_summary.text());
    println!("# Mock video\n\n{}\n", report.mock_summary.text());
    println!("# Comparison\n\n{}", report.comparison.text());
    Ok(())
}

async fn kpis(config: &ReviewConfig, with_previous: bool, json: bool) -> Result<()> {
    let mut session = ReviewSession::new();
    session
        .import_current_fixture(config)
        .await
        .context("Failed to import current analytics")?;
    if with_previous {
        session
            .import_previous_fixture(config)
            .await
            .context("Failed to import previous analytics")?;
    }

    let table = session
        .combined_table()
        .context("No analytics imported")?;

    if json {
        let series: BTreeMap<&str, Vec<KpiPoint>> = table
            .available_kpis()
            .into_iter()
            .map(|kpi| (kpi.as_str(), table.column(kpi)))
            .collect();
        let output = serde_json::json!({
            "rows": table.rows(),
            "series": series,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_table(&table));
    }
    Ok(())
}

fn render_table(table: &CombinedTable) -> String {
    let kpis = table.available_kpis();

    let mut out = String::from("date       | version");
    for kpi in &kpis {
        out.push_str(&format!(" | {:>8}", kpi.as_str()));
    }
    out.push('\n');

    for row in table.rows() {
        out.push_str(&format!("{} | {:<7}", row.record.date, row.version.as_str()));
        for kpi in &kpis {
            match row.record.values.get(*kpi) {
                Some(value) => out.push_str(&format!(" | {:>8.2}", value)),
                None => out.push_str(&format!(" | {:>8}", "-")),
            }
        }
        out.push('\n');
    }
    out
}
