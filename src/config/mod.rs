// src/config/mod.rs
//! Immutable monitor configuration, resolved once at startup.
//!
//! Precedence per option: explicit override > environment > config file > default.
//! Blank strings count as "not set" at every layer.

pub mod file;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
pub use file::{FileConfig, Recipients};

pub const DEFAULT_FEED_URL: &str =
    "https://www1.cityoforlando.net/opd/activecalls/activecadpolice.xml";
pub const DEFAULT_FEED_LABEL: &str = "Orlando PD";
pub const DEFAULT_SEARCH_TERM: &str = "FORELAND";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PUSH_BASE_URL: &str = "https://ntfy.sh";
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

pub const ENV_TOPIC: &str = "MONITOR_TOPIC";
pub const ENV_SEARCH_TERM: &str = "MONITOR_SEARCH_TERM";
pub const ENV_POLL_INTERVAL: &str = "MONITOR_POLL_INTERVAL_SECS";
pub const ENV_VERBOSE: &str = "MONITOR_VERBOSE";
pub const ENV_RESEND_API_KEY: &str = "RESEND_API_KEY";
pub const ENV_EMAIL_TO: &str = "EMAIL_TO";
pub const ENV_EMAIL_FROM: &str = "EMAIL_FROM";
pub const ENV_FEED_URL: &str = "MONITOR_FEED_URL";
pub const ENV_FEED_LABEL: &str = "MONITOR_FEED_LABEL";
pub const ENV_PUSH_BASE_URL: &str = "MONITOR_PUSH_BASE_URL";
pub const ENV_RESEND_BASE_URL: &str = "MONITOR_RESEND_BASE_URL";
pub const ENV_FETCH_TIMEOUT: &str = "MONITOR_FETCH_TIMEOUT_SECS";
pub const ENV_NOTIFY_TIMEOUT: &str = "MONITOR_NOTIFY_TIMEOUT_SECS";
pub const ENV_METRICS_ADDR: &str = "MONITOR_METRICS_ADDR";

/// Values given explicitly by the caller (CLI flags in the binary).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub topic: Option<String>,
    pub search_term: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub verbose: Option<bool>,
    pub resend_api_key: Option<String>,
    /// Comma-separated list, split during resolution.
    pub email_to: Option<String>,
    pub email_from: Option<String>,
    pub feed_url: Option<String>,
    pub config_path: Option<PathBuf>,
    pub metrics_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Push channel identifier (ntfy topic).
    pub topic: String,
    pub search_term: String,
    pub poll_interval_secs: u64,
    /// Controls log detail only.
    pub verbose: bool,
    pub resend_api_key: Option<String>,
    pub email_to: Vec<String>,
    pub email_from: Option<String>,
    pub feed_url: String,
    /// Human name of the feed owner, used in alert titles.
    pub feed_label: String,
    pub push_base_url: String,
    pub resend_base_url: String,
    pub fetch_timeout_secs: u64,
    pub notify_timeout_secs: u64,
    pub metrics_addr: Option<SocketAddr>,
}

/// Email settings, present only when key, recipients and sender are all set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings<'a> {
    pub api_key: &'a str,
    pub to: &'a [String],
    pub from: &'a str,
}

impl Config {
    /// Resolve from the process environment and the located config file.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let env = |k: &str| std::env::var(k).ok();
        let file = FileConfig::locate(overrides.config_path.as_deref(), &env)?;
        Self::resolve_from(overrides, file, env)
    }

    /// Pure resolution over explicit layers; `env` stands in for the process environment.
    pub fn resolve_from<E>(
        overrides: ConfigOverrides,
        file: FileConfig,
        env: E,
    ) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let topic = pick(overrides.topic, env(ENV_TOPIC), file.topic)
            .ok_or(ConfigError::MissingTopic)?;

        let search_term = pick(overrides.search_term, env(ENV_SEARCH_TERM), file.search_term)
            .unwrap_or_else(|| DEFAULT_SEARCH_TERM.to_string());

        let poll_interval_secs = positive_secs(
            "poll_interval_seconds",
            overrides.poll_interval_secs,
            env(ENV_POLL_INTERVAL),
            file.poll_interval_seconds,
            DEFAULT_POLL_INTERVAL_SECS,
        )?;

        let verbose = match overrides.verbose {
            Some(v) => v,
            None => match non_blank(env(ENV_VERBOSE)) {
                Some(raw) => parse_bool("verbose", &raw)?,
                None => file.verbose.unwrap_or(false),
            },
        };

        let email_to = match non_blank(overrides.email_to) {
            Some(raw) => split_recipients(&raw),
            None => match non_blank(env(ENV_EMAIL_TO)) {
                Some(raw) => split_recipients(&raw),
                None => file.email_to.map(Recipients::into_list).unwrap_or_default(),
            },
        };

        let metrics_addr = match overrides.metrics_addr {
            Some(a) => Some(a),
            None => match pick(None, env(ENV_METRICS_ADDR), file.metrics_addr) {
                Some(raw) => Some(
                    raw.parse::<SocketAddr>()
                        .map_err(|e| ConfigError::invalid("metrics_addr", &raw, e.to_string()))?,
                ),
                None => None,
            },
        };

        Ok(Self {
            topic,
            search_term,
            poll_interval_secs,
            verbose,
            resend_api_key: pick(
                overrides.resend_api_key,
                env(ENV_RESEND_API_KEY),
                file.resend_api_key,
            ),
            email_to,
            email_from: pick(overrides.email_from, env(ENV_EMAIL_FROM), file.email_from),
            feed_url: pick(overrides.feed_url, env(ENV_FEED_URL), file.feed_url)
                .unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            feed_label: pick(None, env(ENV_FEED_LABEL), file.feed_label)
                .unwrap_or_else(|| DEFAULT_FEED_LABEL.to_string()),
            push_base_url: pick(None, env(ENV_PUSH_BASE_URL), file.push_base_url)
                .unwrap_or_else(|| DEFAULT_PUSH_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            resend_base_url: pick(None, env(ENV_RESEND_BASE_URL), file.resend_base_url)
                .unwrap_or_else(|| DEFAULT_RESEND_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            fetch_timeout_secs: positive_secs(
                "fetch_timeout_seconds",
                None,
                env(ENV_FETCH_TIMEOUT),
                file.fetch_timeout_seconds,
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?,
            notify_timeout_secs: positive_secs(
                "notify_timeout_seconds",
                None,
                env(ENV_NOTIFY_TIMEOUT),
                file.notify_timeout_seconds,
                DEFAULT_NOTIFY_TIMEOUT_SECS,
            )?,
            metrics_addr,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    /// Full push endpoint, e.g. `https://ntfy.sh/my-topic`.
    pub fn push_url(&self) -> String {
        format!("{}/{}", self.push_base_url, self.topic)
    }

    /// `Some` only when all three email options are present; any subset disables email.
    pub fn email(&self) -> Option<EmailSettings<'_>> {
        match (&self.resend_api_key, self.email_to.is_empty(), &self.email_from) {
            (Some(api_key), false, Some(from)) => Some(EmailSettings {
                api_key,
                to: &self.email_to,
                from,
            }),
            _ => None,
        }
    }
}

/// Split a comma-separated recipient list, dropping blanks.
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn pick(explicit: Option<String>, env: Option<String>, file: Option<String>) -> Option<String> {
    non_blank(explicit)
        .or_else(|| non_blank(env))
        .or_else(|| non_blank(file))
}

fn positive_secs(
    key: &'static str,
    explicit: Option<u64>,
    env: Option<String>,
    file: Option<u64>,
    default: u64,
) -> Result<u64, ConfigError> {
    let secs = match explicit {
        Some(v) => v,
        None => match non_blank(env) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid(key, &raw, e.to_string()))?,
            None => file.unwrap_or(default),
        },
    };
    if secs == 0 {
        return Err(ConfigError::invalid(key, "0", "must be at least 1 second"));
    }
    Ok(secs)
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected true/false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    fn with_topic() -> ConfigOverrides {
        ConfigOverrides {
            topic: Some("opd-watch".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_when_only_topic_given() {
        let cfg = Config::resolve_from(with_topic(), FileConfig::default(), env_of(&[])).unwrap();
        assert_eq!(cfg.topic, "opd-watch");
        assert_eq!(cfg.search_term, "FORELAND");
        assert_eq!(cfg.poll_interval_secs, 30);
        assert!(!cfg.verbose);
        assert_eq!(cfg.feed_url, DEFAULT_FEED_URL);
        assert_eq!(cfg.push_url(), "https://ntfy.sh/opd-watch");
        assert!(cfg.email().is_none());
        assert!(cfg.metrics_addr.is_none());
    }

    #[test]
    fn missing_topic_is_fatal() {
        let err = Config::resolve_from(
            ConfigOverrides::default(),
            FileConfig::default(),
            env_of(&[(ENV_TOPIC, "   ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingTopic));
    }

    #[test]
    fn explicit_beats_env_beats_file() {
        let file = FileConfig {
            topic: Some("file-topic".into()),
            search_term: Some("file-term".into()),
            poll_interval_seconds: Some(90),
            ..Default::default()
        };
        let env = env_of(&[(ENV_SEARCH_TERM, "env-term"), (ENV_POLL_INTERVAL, "60")]);
        let overrides = ConfigOverrides {
            poll_interval_secs: Some(5),
            ..Default::default()
        };

        let cfg = Config::resolve_from(overrides, file, env).unwrap();
        assert_eq!(cfg.topic, "file-topic");
        assert_eq!(cfg.search_term, "env-term");
        assert_eq!(cfg.poll_interval_secs, 5);
    }

    #[test]
    fn zero_or_garbage_interval_is_rejected() {
        let zero = Config::resolve_from(
            ConfigOverrides {
                poll_interval_secs: Some(0),
                ..with_topic()
            },
            FileConfig::default(),
            env_of(&[]),
        );
        assert!(matches!(zero, Err(ConfigError::Invalid { key: "poll_interval_seconds", .. })));

        let garbage = Config::resolve_from(
            with_topic(),
            FileConfig::default(),
            env_of(&[(ENV_POLL_INTERVAL, "soon")]),
        );
        assert!(matches!(garbage, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn email_to_is_split_on_commas() {
        let overrides = ConfigOverrides {
            email_to: Some(" a@x.io, ,b@x.io ".into()),
            resend_api_key: Some("re_123".into()),
            email_from: Some("alerts@x.io".into()),
            ..with_topic()
        };
        let cfg = Config::resolve_from(overrides, FileConfig::default(), env_of(&[])).unwrap();
        let email = cfg.email().expect("email enabled");
        assert_eq!(email.to, &["a@x.io".to_string(), "b@x.io".to_string()]);
        assert_eq!(email.from, "alerts@x.io");
        assert_eq!(email.api_key, "re_123");
    }

    #[test]
    fn partial_email_config_disables_email_without_error() {
        let cfg = Config::resolve_from(
            with_topic(),
            FileConfig::default(),
            env_of(&[(ENV_RESEND_API_KEY, "re_123"), (ENV_EMAIL_FROM, "a@x.io")]),
        )
        .unwrap();
        assert_eq!(cfg.resend_api_key.as_deref(), Some("re_123"));
        assert!(cfg.email_to.is_empty());
        assert!(cfg.email().is_none());
    }

    #[test]
    fn verbose_env_accepts_common_spellings() {
        for (raw, want) in [("1", true), ("YES", true), ("off", false), ("false", false)] {
            let cfg = Config::resolve_from(
                with_topic(),
                FileConfig::default(),
                env_of(&[(ENV_VERBOSE, raw)]),
            )
            .unwrap();
            assert_eq!(cfg.verbose, want, "MONITOR_VERBOSE={raw}");
        }
        let bad = Config::resolve_from(
            with_topic(),
            FileConfig::default(),
            env_of(&[(ENV_VERBOSE, "loud")]),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn base_urls_lose_trailing_slash() {
        let cfg = Config::resolve_from(
            with_topic(),
            FileConfig::default(),
            env_of(&[(ENV_PUSH_BASE_URL, "http://127.0.0.1:9000/")]),
        )
        .unwrap();
        assert_eq!(cfg.push_url(), "http://127.0.0.1:9000/opd-watch");
    }

    #[test]
    fn metrics_addr_from_env_must_parse() {
        let ok = Config::resolve_from(
            with_topic(),
            FileConfig::default(),
            env_of(&[(ENV_METRICS_ADDR, "127.0.0.1:9102")]),
        )
        .unwrap();
        assert_eq!(ok.metrics_addr, Some("127.0.0.1:9102".parse().unwrap()));

        let bad = Config::resolve_from(
            with_topic(),
            FileConfig::default(),
            env_of(&[(ENV_METRICS_ADDR, "nine-one-oh-two")]),
        );
        assert!(matches!(bad, Err(ConfigError::Invalid { key: "metrics_addr", .. })));
    }
}
