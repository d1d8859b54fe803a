// src/feed/types.rs
use chrono::NaiveDateTime;

use crate::error::FetchError;

/// One active dispatch call as listed in a single feed snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub incident_id: String,
    pub call_type: String, // e.g. "General disturbance"
    pub timestamp: String, // source format, e.g. "5/27/2025 13:08"
    pub location: String,
    pub district: String,
    pub raw: String, // "id | time | type | location | district"
}

impl CallRecord {
    pub fn new(
        incident_id: impl Into<String>,
        call_type: impl Into<String>,
        timestamp: impl Into<String>,
        location: impl Into<String>,
        district: impl Into<String>,
    ) -> Self {
        let incident_id = incident_id.into();
        let call_type = call_type.into();
        let timestamp = timestamp.into();
        let location = location.into();
        let district = district.into();
        let raw = format!("{incident_id} | {timestamp} | {call_type} | {location} | {district}");
        Self {
            incident_id,
            call_type,
            timestamp,
            location,
            district,
            raw,
        }
    }

    /// Best-effort parse of the feed's `M/D/YYYY HH:MM` local time.
    pub fn reported_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.timestamp.trim(), "%m/%d/%Y %H:%M").ok()
    }
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Raw feed body. No retries; the next poll cycle is the retry.
    async fn fetch(&self) -> Result<String, FetchError>;
    fn name(&self) -> &str;
}
