// src/filter.rs
use crate::feed::CallRecord;

/// Records whose location contains `term`, ignoring case. Order is preserved.
pub fn matching_location<'a>(records: &'a [CallRecord], term: &str) -> Vec<&'a CallRecord> {
    let needle = term.to_uppercase();
    records
        .iter()
        .filter(|r| r.location.to_uppercase().contains(&needle))
        .collect()
}
