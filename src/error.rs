// src/error.rs
//! Error taxonomy for the monitor.
//!
//! `FetchError`, `ParseError` and `NotifyError` are cycle-local: the poll loop
//! logs them and moves on. `ConfigError` is the only fatal class and is raised
//! before the loop starts.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to retrieve the feed body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("feed {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// The feed body could not be turned into call records.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("feed body is not XML (starts with {prefix:?})")]
    NotXml { prefix: String },

    #[error("malformed feed XML: {0}")]
    Xml(#[from] quick_xml::DeError),
}

/// Which outbound notification channel an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Push,
    Email,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Push => "push",
            Channel::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single channel send failed. Never propagated past the notifier.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{channel} request failed: {source}")]
    Request {
        channel: Channel,
        #[source]
        source: reqwest::Error,
    },

    #[error("{channel} rejected with HTTP {status}: {body}")]
    Rejected {
        channel: Channel,
        status: u16,
        body: String,
    },

    #[error("{channel} response unreadable: {reason}")]
    InvalidResponse { channel: Channel, reason: String },
}

impl NotifyError {
    pub fn channel(&self) -> Channel {
        match self {
            NotifyError::Request { channel, .. }
            | NotifyError::Rejected { channel, .. }
            | NotifyError::InvalidResponse { channel, .. } => *channel,
        }
    }
}

/// Startup misconfiguration. Aborts before the poll loop begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option `topic` (use --topic or MONITOR_TOPIC)")]
    MissingTopic,

    #[error("invalid value {value:?} for `{key}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("reading config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
