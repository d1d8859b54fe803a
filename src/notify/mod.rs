// src/notify/mod.rs
//! Outbound alerts: one push per new match, plus email when fully configured.
//!
//! Channels are independent and best-effort. `Notifier::notify` never fails;
//! it reports a per-channel `ChannelOutcome` and leaves logging to the caller.

pub mod format;
pub mod ntfy;
pub mod resend;

use metrics::counter;

use crate::config::Config;
use crate::error::{Channel, NotifyError};
use crate::feed::CallRecord;
pub use format::{AlertTemplate, EmailMessage, PushMessage};
pub use ntfy::NtfyPush;
pub use resend::ResendEmail;

#[async_trait::async_trait]
pub trait PushSink: Send + Sync {
    async fn push(&self, msg: &PushMessage) -> Result<(), NotifyError>;
}

#[async_trait::async_trait]
pub trait EmailSink: Send + Sync {
    /// Returns the provider's message id.
    async fn send(&self, msg: &EmailMessage) -> Result<String, NotifyError>;
}

#[derive(Debug)]
pub enum ChannelOutcome {
    Delivered { receipt: Option<String> },
    Skipped,
    Failed(NotifyError),
}

impl ChannelOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ChannelOutcome::Delivered { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ChannelOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct NotifyOutcome {
    pub push: ChannelOutcome,
    pub email: ChannelOutcome,
}

impl NotifyOutcome {
    /// At least one channel got the alert out.
    pub fn any_delivered(&self) -> bool {
        self.push.is_delivered() || self.email.is_delivered()
    }
}

pub struct Notifier {
    template: AlertTemplate,
    push: Box<dyn PushSink>,
    email: Option<Box<dyn EmailSink>>,
}

impl Notifier {
    pub fn new(
        template: AlertTemplate,
        push: Box<dyn PushSink>,
        email: Option<Box<dyn EmailSink>>,
    ) -> Self {
        Self {
            template,
            push,
            email,
        }
    }

    /// ntfy push always; Resend email only when key, recipients and sender are all set.
    pub fn from_config(cfg: &Config) -> Result<Self, NotifyError> {
        let push = NtfyPush::new(cfg.push_url(), cfg.notify_timeout())?;
        let email: Option<Box<dyn EmailSink>> = match cfg.email() {
            Some(settings) => Some(Box::new(ResendEmail::new(
                &cfg.resend_base_url,
                &settings,
                cfg.notify_timeout(),
            )?)),
            None => None,
        };
        Ok(Self::new(
            AlertTemplate::new(cfg.feed_label.clone(), &cfg.search_term),
            Box::new(push),
            email,
        ))
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    pub async fn notify(&self, call: &CallRecord) -> NotifyOutcome {
        let push = match self.push.push(&self.template.push_message(call)).await {
            Ok(()) => ChannelOutcome::Delivered { receipt: None },
            Err(e) => ChannelOutcome::Failed(e),
        };
        record(Channel::Push, &push);

        let email = match &self.email {
            None => ChannelOutcome::Skipped,
            Some(sink) => match sink.send(&self.template.email_message(call)).await {
                Ok(id) => ChannelOutcome::Delivered { receipt: Some(id) },
                Err(e) => ChannelOutcome::Failed(e),
            },
        };
        record(Channel::Email, &email);

        NotifyOutcome { push, email }
    }
}

fn record(channel: Channel, outcome: &ChannelOutcome) {
    match outcome {
        ChannelOutcome::Delivered { .. } => {
            counter!("monitor_notifications_total", "channel" => channel.as_str()).increment(1)
        }
        ChannelOutcome::Failed(_) => {
            counter!("monitor_notify_errors_total", "channel" => channel.as_str()).increment(1)
        }
        ChannelOutcome::Skipped => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakePush {
        sent: Arc<Mutex<Vec<PushMessage>>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl PushSink for FakePush {
        async fn push(&self, msg: &PushMessage) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Rejected {
                    channel: Channel::Push,
                    status: 503,
                    body: "relay down".into(),
                });
            }
            self.sent.lock().unwrap().push(msg.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeEmail {
        sent: Arc<Mutex<Vec<EmailMessage>>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl EmailSink for FakeEmail {
        async fn send(&self, msg: &EmailMessage) -> Result<String, NotifyError> {
            if self.fail {
                return Err(NotifyError::InvalidResponse {
                    channel: Channel::Email,
                    reason: "no id".into(),
                });
            }
            self.sent.lock().unwrap().push(msg.clone());
            Ok("email-1".into())
        }
    }

    fn g1() -> CallRecord {
        CallRecord::new("G1", "General disturbance", "5/27/2025 13:08", "1234 FORELAND DRIVE", "C3")
    }

    fn template() -> AlertTemplate {
        AlertTemplate::new("Orlando PD", "FORELAND")
    }

    #[tokio::test]
    async fn without_email_sink_email_is_skipped() {
        let push = FakePush::default();
        let n = Notifier::new(template(), Box::new(push.clone()), None);
        let out = n.notify(&g1()).await;
        assert!(out.push.is_delivered());
        assert!(matches!(out.email, ChannelOutcome::Skipped));
        assert_eq!(push.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn push_failure_does_not_block_email() {
        let email = FakeEmail::default();
        let n = Notifier::new(
            template(),
            Box::new(FakePush {
                fail: true,
                ..Default::default()
            }),
            Some(Box::new(email.clone())),
        );
        let out = n.notify(&g1()).await;
        assert!(out.push.is_failed());
        assert!(matches!(
            out.email,
            ChannelOutcome::Delivered { receipt: Some(ref id) } if id == "email-1"
        ));
        assert!(out.any_delivered());
        assert_eq!(email.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn email_failure_keeps_push_delivered() {
        let push = FakePush::default();
        let n = Notifier::new(
            template(),
            Box::new(push.clone()),
            Some(Box::new(FakeEmail {
                fail: true,
                ..Default::default()
            })),
        );
        let out = n.notify(&g1()).await;
        assert!(out.push.is_delivered());
        assert!(out.email.is_failed());
        assert_eq!(push.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn partial_email_config_builds_push_only_notifier() {
        use crate::config::{ConfigOverrides, FileConfig};
        let cfg = Config::resolve_from(
            ConfigOverrides {
                topic: Some("t".into()),
                resend_api_key: Some("re_123".into()),
                ..Default::default()
            },
            FileConfig::default(),
            |_: &str| None,
        )
        .unwrap();
        let n = Notifier::from_config(&cfg).unwrap();
        assert!(!n.email_enabled());
    }
}
