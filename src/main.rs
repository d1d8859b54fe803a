//! dispatch-monitor: binary entrypoint
//! Resolves configuration, wires the feed, notifier and dedupe tracker into the
//! poll loop, and runs it until SIGINT/SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! dispatch-monitor --topic my-alerts
//! dispatch-monitor --topic police-watch --search FORELAND --interval 60
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dispatch_monitor::{Config, ConfigOverrides, DedupeTracker, HttpFeed, Monitor, Notifier};

/// Monitor a police active-calls feed for a location and alert on new calls.
#[derive(Parser, Debug)]
#[command(name = "dispatch-monitor")]
#[command(version)]
struct Args {
    /// ntfy topic to send push notifications to
    #[arg(long)]
    topic: Option<String>,

    /// Search term for call locations (default: FORELAND)
    #[arg(long = "search")]
    search_term: Option<String>,

    /// Polling interval in seconds (default: 30)
    #[arg(long = "interval")]
    poll_interval_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,

    /// Resend API key for email notifications
    #[arg(long)]
    resend_api_key: Option<String>,

    /// Email address(es) to notify (comma-separated for multiple)
    #[arg(long)]
    email_to: Option<String>,

    /// Email address to send notifications from
    #[arg(long)]
    email_from: Option<String>,

    /// Override the active-calls feed URL
    #[arg(long)]
    feed_url: Option<String>,

    /// TOML config file (default: config/monitor.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,
}

impl Args {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            topic: self.topic,
            search_term: self.search_term,
            poll_interval_secs: self.poll_interval_secs,
            verbose: self.verbose.then_some(true),
            resend_api_key: self.resend_api_key,
            email_to: self.email_to,
            email_from: self.email_from,
            feed_url: self.feed_url,
            config_path: self.config,
            metrics_addr: self.metrics_addr,
        }
    }
}

/// RUST_LOG wins; otherwise `verbose` picks debug for this crate.
/// MONITOR_LOG_FORMAT=json switches to JSON lines.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "dispatch_monitor=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let json = std::env::var("MONITOR_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, using Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = Config::resolve(args.into_overrides()).context("resolving configuration")?;

    init_tracing(config.verbose);

    if let Some(addr) = config.metrics_addr {
        dispatch_monitor::telemetry::install_exporter(addr)?;
        tracing::info!(%addr, "metrics exporter listening");
    }

    tracing::info!(
        topic = %config.topic,
        term = %config.search_term,
        interval_secs = config.poll_interval_secs,
        feed = %config.feed_url,
        "dispatch monitor starting"
    );
    match config.email() {
        Some(email) => {
            let recipients = email.to.join(", ");
            tracing::info!(from = email.from, to = %recipients, "email notifications enabled");
        }
        None => tracing::info!("email notifications disabled (missing configuration)"),
    }

    let feed = HttpFeed::new(config.feed_url.clone(), config.fetch_timeout())
        .context("building feed client")?;
    let notifier = Notifier::from_config(&config).context("building notifier")?;
    let mut monitor = Monitor::new(&config, Box::new(feed), notifier, DedupeTracker::new());

    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown().await;
        tracing::info!("shutdown signal received, stopping after current step");
        let _ = tx.send(true);
    });

    let summary = monitor.run(rx).await;
    tracing::info!(
        cycles = summary.cycles,
        failed_cycles = summary.failed_cycles,
        notified = summary.incidents_tracked,
        "monitor stopped"
    );
    Ok(())
}
