// src/telemetry.rs
use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("monitor_cycles_total", "Poll cycles started.");
        describe_counter!("monitor_fetch_errors_total", "Feed fetch failures.");
        describe_counter!("monitor_parse_errors_total", "Feed parse failures.");
        describe_counter!(
            "monitor_calls_parsed_total",
            "Call records parsed from feed snapshots."
        );
        describe_counter!(
            "monitor_matches_total",
            "Call records whose location matched the search term."
        );
        describe_counter!(
            "monitor_duplicates_total",
            "Matches skipped because the incident was already notified."
        );
        describe_counter!(
            "monitor_notifications_total",
            "Notifications delivered, by channel."
        );
        describe_counter!(
            "monitor_notify_errors_total",
            "Notification send failures, by channel."
        );
        describe_gauge!(
            "monitor_tracked_incidents",
            "Incident ids held in the dedupe set."
        );
        describe_gauge!(
            "monitor_last_cycle_ts",
            "Unix ts when the last poll cycle finished."
        );
        describe_histogram!("monitor_fetch_ms", "Feed fetch time in milliseconds.");
        describe_histogram!("monitor_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Install the Prometheus recorder with its own HTTP listener on `addr`.
/// Must run inside the Tokio runtime.
pub fn install_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("installing prometheus exporter on {addr}"))?;
    ensure_described();
    Ok(())
}
