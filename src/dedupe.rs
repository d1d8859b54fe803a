// src/dedupe.rs
use std::collections::HashSet;

/// Incident ids already notified during this process lifetime.
///
/// Identity is the incident id alone: a re-listed or edited call is never
/// notified twice. Nothing is persisted, so a restart starts from empty.
#[derive(Debug, Default, Clone)]
pub struct DedupeTracker {
    seen: HashSet<String>,
}

impl DedupeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new(&self, incident_id: &str) -> bool {
        !self.seen.contains(incident_id)
    }

    /// Returns `false` if the id was already recorded.
    pub fn mark_seen(&mut self, incident_id: &str) -> bool {
        let inserted = self.seen.insert(incident_id.to_string());
        if inserted {
            tracing::debug!(incident = incident_id, "marked incident as notified");
        }
        inserted
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
