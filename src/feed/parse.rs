// src/feed/parse.rs
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::ParseError;
use crate::feed::types::CallRecord;

// <CALLS>
//   <CALL incident="2025-00192513">
//     <DATE>5/27/2025 13:36</DATE>
//     <DESC>General investigation</DESC>
//     <LOCATION>2400 BLOCK 29TH ST</LOCATION>
//     <DISTRICT>G8</DISTRICT>
//   </CALL>
// </CALLS>
#[derive(Debug, Deserialize)]
struct Calls {
    #[serde(rename = "CALL", default)]
    call: Vec<Call>,
}

#[derive(Debug, Deserialize)]
struct Call {
    #[serde(rename = "@incident", default)]
    incident: Option<String>,
    #[serde(rename = "DATE", default)]
    date: Option<String>,
    #[serde(rename = "DESC", default)]
    desc: Option<String>,
    #[serde(rename = "LOCATION", default)]
    location: Option<String>,
    #[serde(rename = "DISTRICT", default)]
    district: Option<String>,
}

fn text(v: Option<String>) -> String {
    v.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Parse a feed snapshot into call records.
///
/// An empty body is an empty snapshot. Anything that is not well-formed XML is a
/// `ParseError`; there is no partial result.
pub fn parse_calls(body: &str) -> Result<Vec<CallRecord>, ParseError> {
    let t0 = std::time::Instant::now();

    let cleaned = scrub_html_entities_for_xml(strip_bom(body));
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        tracing::warn!("feed body is empty");
        return Ok(Vec::new());
    }
    if !trimmed.starts_with('<') {
        return Err(ParseError::NotXml {
            prefix: trimmed.chars().take(40).collect(),
        });
    }

    let doc: Calls = from_str(trimmed)?;

    let mut out = Vec::with_capacity(doc.call.len());
    for c in doc.call {
        let incident = text(c.incident);
        if incident.is_empty() {
            tracing::debug!("skipping call without incident id");
            continue;
        }
        let record = CallRecord::new(
            incident,
            text(c.desc),
            text(c.date),
            text(c.location),
            text(c.district),
        );
        tracing::debug!(raw = %record.raw, "parsed call");
        out.push(record);
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("monitor_parse_ms").record(ms);
    counter!("monitor_calls_parsed_total").increment(out.len() as u64);
    Ok(out)
}

fn strip_bom(s: &str) -> &str {
    let s = s.strip_prefix('\u{feff}').unwrap_or(s);
    // UTF-8 BOM bytes mis-decoded as Latin-1
    s.strip_prefix("ï»¿").unwrap_or(s)
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
