use anyhow::Context;
use clap::{Parser, Subcommand};
use job_scout::config::{LedgerSettings, Settings};
use job_scout::core::{Matcher, Pipeline};
use job_scout::services::{build_dispatcher, HttpListingSource, Ledger};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Scheduled job listing matcher with digest notifications
#[derive(Parser, Debug)]
#[command(name = "job-scout", version, about)]
struct Cli {
    /// Config file to load instead of config/default.toml + config/local.toml
    #[arg(long, env = "JOBSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Run a single cycle and exit (for cron deployments)
    #[arg(long)]
    once: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the most recently notified jobs
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_logging();

    let cli = Cli::parse();

    // Reading the ledger needs neither criteria nor a source
    if let Some(Command::History { limit }) = cli.command {
        let ledger_settings = LedgerSettings::load(cli.config.as_deref())
            .context("Failed to load ledger configuration")?;
        return print_history(&ledger_settings, limit).await;
    }

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("Failed to load configuration")?;

    let criteria = settings.criteria().context("Invalid criteria configuration")?;

    info!("Job Scout started");
    info!("Keywords: {:?}", criteria.keywords);
    info!("Skills: {} configured", criteria.skills.len());
    info!("Companies: {:?}", criteria.companies);
    info!("Match threshold: {}%", criteria.match_threshold);

    let source = HttpListingSource::new(&settings.source).context("Failed to build listing source")?;
    let dispatcher = build_dispatcher(&settings.notifications);
    info!("{} notification channel(s) enabled", dispatcher.channel_count());

    let pipeline = Pipeline::new(
        Box::new(source),
        Matcher::new(criteria),
        dispatcher,
        settings.ledger.retention_days,
    );

    if cli.once {
        info!("Running in single-run mode");
        return run_cycle(&pipeline, &settings).await;
    }

    let interval_minutes = settings.schedule.interval_minutes.max(1);
    info!("Checking every {} minute(s)", interval_minutes);

    // First tick fires immediately, so the first cycle runs at startup
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Agent stopped by user");
                break;
            }
            _ = ticker.tick() => {
                run_cycle(&pipeline, &settings).await?;
            }
        }
    }

    Ok(())
}

/// Run one cycle; a ledger failure ends the process
async fn run_cycle(pipeline: &Pipeline, settings: &Settings) -> anyhow::Result<()> {
    match pipeline.run_scoped(&settings.ledger).await {
        Ok(report) => {
            info!(outcome = ?report.outcome, "Cycle finished");
            Ok(())
        }
        Err(e) => {
            error!("Cycle aborted: {}", e);
            Err(e).context("Ledger failure, stopping to avoid duplicate notifications")
        }
    }
}

async fn print_history(settings: &LedgerSettings, limit: usize) -> anyhow::Result<()> {
    let ledger = Ledger::from_settings(settings)
        .await
        .context("Failed to open ledger")?;

    let entries = ledger.recent(limit).await;
    let total = ledger.count().await;
    ledger.close().await;

    let entries = entries.context("Failed to read ledger")?;
    for entry in &entries {
        println!(
            "{}  {:>6.2}%  {} at {}  {}",
            entry.notified_at.format("%Y-%m-%d %H:%M"),
            entry.score,
            entry.title,
            entry.company,
            entry.url
        );
    }
    println!("{} of {} notified job(s)", entries.len(), total.context("Failed to count ledger")?);

    Ok(())
}

fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}
