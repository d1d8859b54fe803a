// src/config/file.rs
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/monitor.toml";

/// Recipients may be written as a single comma-separated string or as a list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn into_list(self) -> Vec<String> {
        match self {
            Recipients::One(s) => super::split_recipients(&s),
            Recipients::Many(v) => v
                .iter()
                .flat_map(|s| super::split_recipients(s))
                .collect(),
        }
    }
}

/// Optional TOML layer. Every key is optional; env and explicit flags win over it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub topic: Option<String>,
    pub search_term: Option<String>,
    pub poll_interval_seconds: Option<u64>,
    pub verbose: Option<bool>,
    pub resend_api_key: Option<String>,
    pub email_to: Option<Recipients>,
    pub email_from: Option<String>,
    pub feed_url: Option<String>,
    pub feed_label: Option<String>,
    pub push_base_url: Option<String>,
    pub resend_base_url: Option<String>,
    pub fetch_timeout_seconds: Option<u64>,
    pub notify_timeout_seconds: Option<u64>,
    pub metrics_addr: Option<String>,
}

impl FileConfig {
    /// Load from an explicit path. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Locate the config file:
    /// 1) `explicit` (from `--config`)
    /// 2) $MONITOR_CONFIG_PATH
    /// 3) config/monitor.toml, only if present
    ///
    /// No file at all yields an empty layer.
    pub fn locate<E>(explicit: Option<&Path>, env: &E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        if let Some(p) = explicit {
            return Self::load_from(p);
        }
        if let Some(p) = env(ENV_CONFIG_PATH).filter(|p| !p.trim().is_empty()) {
            return Self::load_from(&PathBuf::from(p));
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        Ok(Self::default())
    }
}
