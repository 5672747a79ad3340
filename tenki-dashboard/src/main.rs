use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tenki_core::{Config, gateway_from_config};
use tenki_dashboard::AppState;
use tenki_dashboard::routes::app;
use tenki_dashboard::shutdown::listen_for_shutdown_signals;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "tenki-dashboard", version, about = "Web dashboard for stored readings")]
struct Args {
    /// Config file to use instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:3000.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env(|name| std::env::var(name).ok());

    let gateway = gateway_from_config(&config.gateway)?;
    let router = app(AppState::new(gateway));

    let bind = args.bind.unwrap_or(config.dashboard.bind);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind to {bind}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(listen_for_shutdown_signals())
        .await
        .context("server error")?;

    Ok(())
}
