use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tenki_core::{
    Category, Config, Extractor, HttpPageSource, MemoryGateway, ReadingGateway, RunOptions,
    SummaryStats, filter_readings, gateway_from_config, run_once,
};
use tracing::{error, info};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tenki", version, about = "Scrape and store local weather observations")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape the source page once and store the reading.
    Scrape {
        /// Extract and print the values without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Scrape on a timer until interrupted.
    Watch {
        /// Seconds between runs; defaults to the configured schedule.
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show stored readings, newest first.
    List {
        /// Case-insensitive text to search for.
        #[arg(long, short, default_value = "")]
        search: String,

        /// Column to search: all, date, temperature, wind or precipitation.
        #[arg(long, short, default_value = "all")]
        category: Category,

        /// Show at most this many rows.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Configure the persistence gateway interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        config.apply_env(|name| std::env::var(name).ok());

        match self.command {
            Command::Scrape { dry_run } => scrape(&config, dry_run).await,
            Command::Watch { interval } => watch(&config, interval).await,
            Command::List { search, category, limit } => {
                list(&config, &search, category, limit).await
            }
            Command::Configure => configure(config, self.config),
        }
    }
}

async fn scrape(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let extractor = Extractor::new(HttpPageSource::new(&config.source)?);

    let gateway: Arc<dyn ReadingGateway> = if dry_run {
        Arc::new(MemoryGateway::new())
    } else {
        gateway_from_config(&config.gateway)?
    };

    let options = RunOptions { dry_run, ..RunOptions::from_config(&config.source) };
    let outcome = run_once(&extractor, gateway.as_ref(), options)
        .await
        .with_context(|| format!("Scrape of {} failed", config.source.url))?;

    output::print_outcome(&outcome);
    Ok(())
}

async fn watch(config: &Config, interval: Option<u64>) -> anyhow::Result<()> {
    let extractor = Extractor::new(HttpPageSource::new(&config.source)?);
    let gateway = gateway_from_config(&config.gateway)?;
    let options = RunOptions::from_config(&config.source);

    let secs = interval.unwrap_or(config.schedule.interval_secs).max(1);
    info!(interval_secs = secs, url = %config.source.url, "watching source page");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("interrupted, stopping");
    };

    let extractor = &extractor;
    let gateway = gateway.as_ref();
    run_until(shutdown, Duration::from_secs(secs), move || async move {
        // A failed run only costs this tick.
        if let Err(e) = run_once(extractor, gateway, options).await {
            error!(error = %e, "run failed");
        }
    })
    .await;

    Ok(())
}

/// Calls `run` on every tick until `shutdown` resolves; returns the number
/// of runs. The shutdown future lives across ticks, so a signal that
/// arrives mid-run stops the loop before the next tick.
async fn run_until<S, F, Fut>(shutdown: S, period: Duration, mut run: F) -> usize
where
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    tokio::pin!(shutdown);

    let mut runs = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => return runs,
            _ = ticker.tick() => {
                run().await;
                runs += 1;
            }
        }
    }
}

async fn list(
    config: &Config,
    search: &str,
    category: Category,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let gateway = gateway_from_config(&config.gateway)?;
    let rows = gateway.select_all().await.context("Failed to load readings")?;

    let mut shown = filter_readings(&rows, search, category);
    let stats = SummaryStats::from_readings(&shown);
    if let Some(limit) = limit {
        shown.truncate(limit);
    }

    output::print_stats(&stats);
    output::print_table(&shown);
    Ok(())
}

fn configure(mut config: Config, path: Option<PathBuf>) -> anyhow::Result<()> {
    let url = Text::new("Gateway URL:")
        .with_default(&config.gateway.url)
        .with_help_message("e.g. https://xyz.supabase.co")
        .prompt()?;

    let key = Password::new("Gateway API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let table = Text::new("Table name:").with_default(&config.gateway.table).prompt()?;

    // Pasted keys often carry a trailing newline.
    config.gateway.url = url.trim().to_string();
    config.gateway.key = key.trim().to_string();
    config.gateway.table = table.trim().to_string();

    config.gateway.require_credentials()?;

    let saved = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };
    println!("Saved configuration to {}", saved.display());

    Ok(())
}
