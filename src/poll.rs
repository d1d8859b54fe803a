// src/poll.rs
//! The poll loop: fetch → parse → filter → dedupe → notify, then sleep.
//!
//! Every error inside a cycle is logged and contained to that cycle. Shutdown is
//! observed between cycles and while sleeping; an in-flight cycle always finishes.

use std::time::Duration;

use metrics::{counter, gauge};
use tokio::sync::watch;

use crate::config::Config;
use crate::dedupe::DedupeTracker;
use crate::error::{FetchError, ParseError};
use crate::feed::{parse_calls, CallRecord, FeedSource};
use crate::filter::matching_location;
use crate::notify::{ChannelOutcome, Notifier, NotifyOutcome};

/// Consecutive failed cycles before the streak is logged at error level.
pub const FAILURE_STREAK_ALERT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Parsing,
    Filtering,
    Notifying,
    Sleeping,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub parsed: usize,
    pub matched: usize,
    /// Matches not seen before; each got exactly one notify attempt.
    pub new: usize,
    pub duplicates: usize,
    pub push_sent: usize,
    pub push_failed: usize,
    pub email_sent: usize,
    pub email_failed: usize,
}

impl CycleReport {
    fn absorb(&mut self, outcome: &NotifyOutcome) {
        self.new += 1;
        match outcome.push {
            ChannelOutcome::Delivered { .. } => self.push_sent += 1,
            ChannelOutcome::Failed(_) => self.push_failed += 1,
            ChannelOutcome::Skipped => {}
        }
        match outcome.email {
            ChannelOutcome::Delivered { .. } => self.email_sent += 1,
            ChannelOutcome::Failed(_) => self.email_failed += 1,
            ChannelOutcome::Skipped => {}
        }
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    FetchFailed(FetchError),
    ParseFailed(ParseError),
    Completed(CycleReport),
}

impl CycleOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, CycleOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Completed(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub incidents_tracked: usize,
}

pub struct Monitor {
    feed: Box<dyn FeedSource>,
    notifier: Notifier,
    tracker: DedupeTracker,
    search_term: String,
    interval: Duration,
    state: PollState,
    cycles: u64,
    failed_cycles: u64,
    failure_streak: u32,
}

impl Monitor {
    pub fn new(
        cfg: &Config,
        feed: Box<dyn FeedSource>,
        notifier: Notifier,
        tracker: DedupeTracker,
    ) -> Self {
        crate::telemetry::ensure_described();
        Self {
            feed,
            notifier,
            tracker,
            search_term: cfg.search_term.clone(),
            interval: cfg.poll_interval(),
            state: PollState::Idle,
            cycles: 0,
            failed_cycles: 0,
            failure_streak: 0,
        }
    }

    /// Override the sleep between cycles.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn tracker(&self) -> &DedupeTracker {
        &self.tracker
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.cycles,
            failed_cycles: self.failed_cycles,
            incidents_tracked: self.tracker.len(),
        }
    }

    fn enter(&mut self, next: PollState) {
        tracing::trace!(from = ?self.state, to = ?next, "poll state");
        self.state = next;
    }

    /// One full cycle. Never panics on feed or notification failures.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;
        counter!("monitor_cycles_total").increment(1);
        tracing::debug!(cycle = self.cycles, "poll cycle start");

        self.enter(PollState::Fetching);
        let body = match self.feed.fetch().await {
            Ok(b) => b,
            Err(e) => {
                counter!("monitor_fetch_errors_total").increment(1);
                tracing::warn!(feed = self.feed.name(), error = %e, "feed fetch failed");
                return self.finish(CycleOutcome::FetchFailed(e));
            }
        };

        self.enter(PollState::Parsing);
        let calls = match parse_calls(&body) {
            Ok(c) => c,
            Err(e) => {
                counter!("monitor_parse_errors_total").increment(1);
                let sample: String = body.chars().take(200).collect();
                tracing::warn!(error = %e, "feed parse failed");
                tracing::debug!(sample = %sample, "unparsable feed sample");
                return self.finish(CycleOutcome::ParseFailed(e));
            }
        };

        self.enter(PollState::Filtering);
        let matches = matching_location(&calls, &self.search_term);
        counter!("monitor_matches_total").increment(matches.len() as u64);
        tracing::info!(
            active = calls.len(),
            matched = matches.len(),
            term = %self.search_term,
            "feed checked"
        );

        self.enter(PollState::Notifying);
        let mut report = CycleReport {
            parsed: calls.len(),
            matched: matches.len(),
            ..Default::default()
        };
        for call in matches {
            if !self.tracker.is_new(&call.incident_id) {
                report.duplicates += 1;
                counter!("monitor_duplicates_total").increment(1);
                tracing::debug!(incident = %call.incident_id, "already notified, skipping");
                continue;
            }
            let outcome = self.notifier.notify(call).await;
            // Marked seen whatever the outcome; failed sends are never retried.
            self.tracker.mark_seen(&call.incident_id);
            log_outcome(call, &outcome);
            report.absorb(&outcome);
        }
        gauge!("monitor_tracked_incidents").set(self.tracker.len() as f64);

        if report.new > 0 {
            tracing::info!(
                new = report.new,
                duplicates = report.duplicates,
                tracked = self.tracker.len(),
                "notifications processed"
            );
        }
        self.finish(CycleOutcome::Completed(report))
    }

    fn finish(&mut self, outcome: CycleOutcome) -> CycleOutcome {
        if outcome.is_failure() {
            self.failed_cycles += 1;
            self.failure_streak += 1;
            if self.failure_streak >= FAILURE_STREAK_ALERT {
                tracing::error!(
                    streak = self.failure_streak,
                    "feed has failed for consecutive cycles; still polling"
                );
            }
        } else {
            if self.failure_streak > 0 {
                tracing::info!(after = self.failure_streak, "feed recovered");
            }
            self.failure_streak = 0;
        }
        gauge!("monitor_last_cycle_ts").set(chrono::Utc::now().timestamp() as f64);
        self.enter(PollState::Idle);
        outcome
    }

    /// Poll until `shutdown` turns true (or its sender is dropped).
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            term = %self.search_term,
            "poll loop started"
        );
        loop {
            if *shutdown.borrow() {
                break;
            }
            self.run_cycle().await;
            if *shutdown.borrow() {
                break;
            }

            self.enter(PollState::Sleeping);
            tracing::debug!(secs = self.interval.as_secs_f64(), "sleeping");
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            self.enter(PollState::Idle);
        }
        self.enter(PollState::Idle);
        tracing::info!(
            cycles = self.cycles,
            failed = self.failed_cycles,
            tracked = self.tracker.len(),
            "poll loop stopped"
        );
        self.summary()
    }
}

fn log_outcome(call: &CallRecord, outcome: &NotifyOutcome) {
    match &outcome.push {
        ChannelOutcome::Delivered { .. } => tracing::info!(
            incident = %call.incident_id,
            location = %call.location,
            "push notification sent"
        ),
        ChannelOutcome::Failed(e) => tracing::error!(
            incident = %call.incident_id,
            error = %e,
            "push notification failed"
        ),
        ChannelOutcome::Skipped => {}
    }
    match &outcome.email {
        ChannelOutcome::Delivered { receipt } => tracing::info!(
            incident = %call.incident_id,
            id = receipt.as_deref().unwrap_or_default(),
            "email notification sent"
        ),
        ChannelOutcome::Failed(e) => tracing::error!(
            incident = %call.incident_id,
            error = %e,
            "email notification failed"
        ),
        ChannelOutcome::Skipped => {
            tracing::debug!(incident = %call.incident_id, "email not configured, skipped")
        }
    }
}
