// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod dedupe;
pub mod error;
pub mod feed;
pub mod filter;
pub mod notify;
pub mod poll;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::{Config, ConfigOverrides};
pub use crate::dedupe::DedupeTracker;
pub use crate::error::{ConfigError, FetchError, NotifyError, ParseError};
pub use crate::feed::{CallRecord, FeedSource, HttpFeed};
pub use crate::notify::{NotifyOutcome, Notifier};
pub use crate::poll::{CycleOutcome, CycleReport, Monitor, PollState, RunSummary};
