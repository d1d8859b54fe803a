//! Sends one synthetic call through the configured channels and prints the outcome.
//! Uses the same configuration layers as the monitor (env, .env, config file).

use anyhow::{Context, Result};
use dispatch_monitor::notify::ChannelOutcome;
use dispatch_monitor::{CallRecord, Config, ConfigOverrides, Notifier};

fn describe(outcome: &ChannelOutcome) -> String {
    match outcome {
        ChannelOutcome::Delivered { receipt: Some(id) } => format!("delivered (id {id})"),
        ChannelOutcome::Delivered { receipt: None } => "delivered".to_string(),
        ChannelOutcome::Skipped => "skipped (not configured)".to_string(),
        ChannelOutcome::Failed(e) => format!("failed: {e}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let config = Config::resolve(ConfigOverrides::default()).context("resolving configuration")?;
    let notifier = Notifier::from_config(&config).context("building notifier")?;

    let call = CallRecord::new(
        "DEMO-0001",
        "Notification test",
        chrono::Local::now().format("%-m/%-d/%Y %H:%M").to_string(),
        format!("100 {} TEST ST", config.search_term.to_uppercase()),
        "--",
    );
    let out = notifier.notify(&call).await;

    println!("push  -> {}: {}", config.push_url(), describe(&out.push));
    println!("email -> {}", describe(&out.email));
    println!("notify-demo done");
    Ok(())
}
