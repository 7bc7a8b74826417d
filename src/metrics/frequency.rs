//! Access-frequency metrics for [`FixedSizeMap`](crate::FixedSizeMap).

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Core counters plus frequency-bucket statistics.
#[derive(Debug, Clone)]
pub struct FixedSizeMapMetrics {
    /// Counters shared by every map flavour
    pub core: CoreCacheMetrics,

    /// Number of promotions (one per successful `get`)
    pub promotions: u64,

    /// Highest access count any entry has reached
    pub max_access_count: u64,

    /// Number of non-empty frequency buckets
    pub active_frequency_levels: u64,

    /// Sum of the access counts of all evicted entries
    pub evicted_access_total: u64,
}

impl FixedSizeMapMetrics {
    /// Creates empty metrics for a map of the given capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            core: CoreCacheMetrics::new(capacity),
            promotions: 0,
            max_access_count: 0,
            active_frequency_levels: 0,
            evicted_access_total: 0,
        }
    }

    /// Records a hit that moved an entry up to `new_count`.
    pub fn record_promotion(&mut self, new_count: usize) {
        self.core.record_hit();
        self.promotions += 1;
        self.max_access_count = self.max_access_count.max(new_count as u64);
    }

    /// Records a `get` for a key that is not present.
    pub fn record_miss(&mut self) {
        self.core.record_miss();
    }

    /// Records the eviction of an entry that had reached `access_count`.
    pub fn record_eviction(&mut self, access_count: usize) {
        self.core.record_eviction();
        self.evicted_access_total += access_count as u64;
    }

    /// Refreshes the bucket statistics after a structural change.
    pub fn update_frequency_levels(&mut self, active_levels: usize) {
        self.active_frequency_levels = active_levels as u64;
    }

    /// Average access count of evicted entries, or 0.0 if nothing was evicted.
    pub fn average_evicted_access_count(&self) -> f64 {
        if self.core.evictions > 0 {
            self.evicted_access_total as f64 / self.core.evictions as f64
        } else {
            0.0
        }
    }

    /// Converts the metrics to a `BTreeMap` for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        metrics.insert("promotions".to_string(), self.promotions as f64);
        metrics.insert("max_access_count".to_string(), self.max_access_count as f64);
        metrics.insert(
            "active_frequency_levels".to_string(),
            self.active_frequency_levels as f64,
        );
        metrics.insert(
            "average_evicted_access_count".to_string(),
            self.average_evicted_access_count(),
        );

        metrics
    }
}

impl CacheMetrics for FixedSizeMapMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}
