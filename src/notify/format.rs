// src/notify/format.rs
use html_escape::encode_text;

use crate::feed::CallRecord;

/// Plain-text push payload plus the relay headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub priority: &'static str,
    pub tags: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Renders alerts for one feed label and search term.
#[derive(Debug, Clone)]
pub struct AlertTemplate {
    label: String,
    term: String,
}

impl AlertTemplate {
    pub fn new(label: impl Into<String>, search_term: &str) -> Self {
        Self {
            label: label.into(),
            term: search_term.to_uppercase(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} Alert: {}", self.label, self.term)
    }

    pub fn push_message(&self, call: &CallRecord) -> PushMessage {
        let body = format!(
            "{label} ALERT: {term}\n\n\
             Type: {kind}\n\
             Time: {time}\n\
             Location: {loc}\n\
             District: {district}\n\
             Incident: {id}\n\n\
             This call contains \"{term}\" in the location field.",
            label = self.label.to_uppercase(),
            term = self.term,
            kind = call.call_type,
            time = call.timestamp,
            loc = call.location,
            district = call.district,
            id = call.incident_id,
        );
        PushMessage {
            title: self.title(),
            body,
            priority: "urgent",
            tags: "police,alert",
        }
    }

    pub fn email_message(&self, call: &CallRecord) -> EmailMessage {
        let subject = format!("{} - {}", self.title(), call.call_type);

        let text = format!(
            "{title}\n\n\
             Incident Type: {kind}\n\
             Time: {time}\n\
             Location: {loc}\n\
             District: {district}\n\
             Incident Number: {id}\n\n\
             Alert Reason: This call contains \"{term}\" in the location field.\n\n\
             ---\n\
             This is an automated notification from dispatch-monitor.\n\
             Data source: {label} active calls feed\n",
            title = self.title(),
            kind = call.call_type,
            time = call.timestamp,
            loc = call.location,
            district = call.district,
            id = call.incident_id,
            term = self.term,
            label = self.label,
        );

        let row = |name: &str, value: &str, emphasize: bool| {
            let style = if emphasize {
                "padding: 12px; border: 1px solid #ddd; color: #d73502; font-weight: bold;"
            } else {
                "padding: 12px; border: 1px solid #ddd;"
            };
            format!(
                "<tr><td style=\"padding: 12px; border: 1px solid #ddd; font-weight: bold;\">{name}:</td>\
                 <td style=\"{style}\">{}</td></tr>",
                encode_text(value)
            )
        };

        let html = format!(
            "<html><body>\
             <h2>{title}</h2>\
             <table style=\"border-collapse: collapse; width: 100%; max-width: 600px;\">{rows}</table>\
             <p style=\"margin-top: 20px; padding: 12px; background-color: #fff3cd; border: 1px solid #ffeeba;\">\
             <strong>Alert Reason:</strong> This call contains \"<strong>{term}</strong>\" in the location field.</p>\
             <p style=\"color: #6c757d; font-size: 12px;\">This is an automated notification from dispatch-monitor.<br>\
             Data source: {label} active calls feed</p>\
             </body></html>",
            title = encode_text(&self.title()),
            rows = [
                row("Incident Type", &call.call_type, false),
                row("Time", &call.timestamp, false),
                row("Location", &call.location, true),
                row("District", &call.district, false),
                row("Incident Number", &call.incident_id, false),
            ]
            .concat(),
            term = encode_text(&self.term),
            label = encode_text(&self.label),
        );

        EmailMessage {
            subject,
            html,
            text,
        }
    }
}
