//! Per-domain cache of successful analyses.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use siteprobe_protocols::{AnalysisRecord, CacheEntry};
use tracing::{debug, info};

/// In-memory analysis cache keyed by domain.
///
/// Entries older than the TTL are treated as absent and pruned on access.
pub struct AnalysisCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Fresh entry for `domain`, if any.
    pub fn get(&self, domain: &str) -> Option<CacheEntry> {
        if domain.is_empty() {
            return None;
        }
        let mut entries = self.entries.lock();
        match entries.get(domain) {
            Some(entry) if entry.is_fresh(Utc::now(), self.ttl) => Some(entry.clone()),
            Some(_) => {
                debug!("Cache entry for {} expired", domain);
                entries.remove(domain);
                None
            }
            None => None,
        }
    }

    /// Stamp `record` with the current time and store it under its domain.
    ///
    /// Records without a domain are returned stamped but not stored.
    pub fn insert(&self, record: AnalysisRecord) -> CacheEntry {
        let entry = CacheEntry::new(record, Utc::now());
        if entry.record.domain.is_empty() {
            return entry;
        }
        self.entries
            .lock()
            .insert(entry.record.domain.clone(), entry.clone());
        info!(
            "Analysis data cached for {} ({})",
            entry.record.domain, entry.record.analysis_type
        );
        entry
    }

    /// Drop the entry for `domain`. Returns whether one existed.
    pub fn invalidate(&self, domain: &str) -> bool {
        self.entries.lock().remove(domain).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
