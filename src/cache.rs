//! Per-exporter cache of the last materialized metric

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// The last metric materialized for an exporter and when it was built
#[derive(Debug, Clone)]
pub struct CacheEntry<M> {
    /// Materialized metric
    pub metric: M,
    /// Value carried by the metric
    pub value: f64,
    /// When the metric was materialized
    pub fetched_at: Instant,
}

impl<M> CacheEntry<M> {
    /// Create an entry stamped with the current time
    pub fn new(metric: M, value: f64) -> Self {
        Self {
            metric,
            value,
            fetched_at: Instant::now(),
        }
    }

    /// Whether the entry is younger than `interval` at `now`
    pub fn is_fresh_at(&self, interval: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < interval
    }

    /// Whether the entry is younger than `interval`
    pub fn is_fresh(&self, interval: Duration) -> bool {
        self.is_fresh_at(interval, Instant::now())
    }
}

/// Exporter name to last metric, shared between concurrent scrapes
///
/// Freshness checks take the read lock and may run in parallel; updates take
/// the write lock.
pub struct MetricCache<M> {
    entries: RwLock<HashMap<String, CacheEntry<M>>>,
}

impl<M: Clone> MetricCache<M> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Retrieve the entry for an exporter
    pub async fn get(&self, name: &str) -> Option<CacheEntry<M>> {
        self.entries.read().await.get(name).cloned()
    }

    /// Retrieve the entry only if it is still fresh for `interval`
    pub async fn get_fresh(&self, name: &str, interval: Duration) -> Option<CacheEntry<M>> {
        let entries = self.entries.read().await;
        entries
            .get(name)
            .filter(|entry| entry.is_fresh(interval))
            .cloned()
    }

    /// Store an entry, replacing any previous one for the exporter
    pub async fn put(&self, name: impl Into<String>, entry: CacheEntry<M>) {
        self.entries.write().await.insert(name.into(), entry);
    }

    /// Number of cached exporters
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl<M: Clone> Default for MetricCache<M> {
    fn default() -> Self {
        Self::new()
    }
}
