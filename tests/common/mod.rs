// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use dispatch_monitor::config::FileConfig;
use dispatch_monitor::error::Channel;
use dispatch_monitor::notify::{AlertTemplate, EmailMessage, EmailSink, PushMessage, PushSink};
use dispatch_monitor::{Config, ConfigOverrides, FeedSource, FetchError, Notifier};
use parking_lot::Mutex;

pub const FIXTURE: &str = include_str!("../fixtures/active_calls.xml");

pub fn g1_feed() -> String {
    r#"<CALLS>
  <CALL incident="G1">
    <DATE>5/27/2025 13:08</DATE>
    <DESC>General disturbance</DESC>
    <LOCATION>1234 FORELAND DRIVE</LOCATION>
    <DISTRICT>C3</DISTRICT>
  </CALL>
</CALLS>"#
        .to_string()
}

pub fn config(topic: &str) -> Config {
    Config::resolve_from(
        ConfigOverrides {
            topic: Some(topic.into()),
            ..Default::default()
        },
        FileConfig::default(),
        |_: &str| None,
    )
    .expect("test config")
}

/// Feed that replays scripted responses, then repeats `fallback` forever.
pub struct ScriptedFeed {
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    fallback: String,
    pub calls: Arc<Mutex<usize>>,
}

impl ScriptedFeed {
    pub fn new(script: Vec<Result<String, FetchError>>, fallback: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: fallback.into(),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn always(body: impl Into<String>) -> Self {
        Self::new(Vec::new(), body)
    }
}

#[async_trait::async_trait]
impl FeedSource for ScriptedFeed {
    async fn fetch(&self) -> Result<String, FetchError> {
        *self.calls.lock() += 1;
        match self.script.lock().pop_front() {
            Some(next) => next,
            None => Ok(self.fallback.clone()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn timeout() -> FetchError {
    FetchError::Timeout {
        url: "http://feed.test/calls.xml".into(),
    }
}

#[derive(Clone, Default)]
pub struct RecordingPush {
    pub sent: Arc<Mutex<Vec<PushMessage>>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl PushSink for RecordingPush {
    async fn push(&self, msg: &PushMessage) -> Result<(), dispatch_monitor::NotifyError> {
        self.sent.lock().push(msg.clone());
        if self.fail {
            return Err(dispatch_monitor::NotifyError::Rejected {
                channel: Channel::Push,
                status: 502,
                body: "bad gateway".into(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingEmail {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
}

#[async_trait::async_trait]
impl EmailSink for RecordingEmail {
    async fn send(&self, msg: &EmailMessage) -> Result<String, dispatch_monitor::NotifyError> {
        let mut sent = self.sent.lock();
        sent.push(msg.clone());
        Ok(format!("email-{}", sent.len()))
    }
}

pub fn notifier(push: &RecordingPush, email: Option<&RecordingEmail>) -> Notifier {
    Notifier::new(
        AlertTemplate::new("Orlando PD", "FORELAND"),
        Box::new(push.clone()),
        email.map(|e| Box::new(e.clone()) as Box<dyn EmailSink>),
    )
}
