use shared::Result;
use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::CacheStatistics;
use crate::ports::CacheStore;

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size with binary multiples, e.g. `1800` -> `2 KB`.
pub fn format_size(bytes: u64) -> String {
    let mut unit = 0;
    let mut magnitude = 1u64;
    while unit + 1 < UNITS.len() && bytes >= magnitude * 1024 {
        magnitude *= 1024;
        unit += 1;
    }
    let value = bytes as f64 / magnitude as f64;
    format!("{:.0} {}", value, UNITS[unit])
}

/// Read-only aggregate view over a store's keyspace.
#[derive(Debug, Clone)]
pub struct StatsCollector {
    clock: Arc<dyn Clock>,
}

impl StatsCollector {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Never mutates the store. Entries written or removed while the listing
    /// runs may or may not be counted.
    pub async fn snapshot(&self, store: &dyn CacheStore) -> Result<CacheStatistics> {
        let now = self.clock.now();
        let policy = store.expiration();
        let entries = store.entries().await?;

        let total_size_bytes: u64 = entries.iter().map(|e| e.size_bytes).sum();
        let expired_count = entries
            .iter()
            .filter(|e| policy.is_expired(e.created_at, now))
            .count() as u64;

        Ok(CacheStatistics {
            total_entries: entries.len() as u64,
            total_size_bytes,
            total_size_formatted: format_size(total_size_bytes),
            expired_count,
            location: store.location(),
            backend: store.backend_type().to_string(),
            observed_at: now,
        })
    }
}
