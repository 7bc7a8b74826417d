//! Map Metrics
//!
//! Counters recorded by [`FixedSizeMap`](crate::FixedSizeMap) as it serves
//! requests, reported through the [`CacheMetrics`] trait as a `BTreeMap` so
//! that the output order is stable across runs.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod frequency;

pub use frequency::FixedSizeMapMetrics;

/// Counters shared by every map flavour.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of `get` calls
    pub requests: u64,

    /// Number of `get` calls that found their key
    pub cache_hits: u64,

    /// Number of `put` calls that added a new key
    pub insertions: u64,

    /// Number of `put` calls that replaced the value of an existing key
    pub overwrites: u64,

    /// Number of entries removed to make room for a new key
    pub evictions: u64,

    /// Number of entries currently stored
    pub entries: u64,

    /// Maximum number of entries the map can hold
    pub capacity: u64,
}

impl CoreCacheMetrics {
    /// Creates an empty set of counters for a map of the given capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Records a `get` that found its key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a `get` that did not find its key.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a `put` that added a new key.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
        self.entries += 1;
    }

    /// Records a `put` that overwrote an existing key.
    pub fn record_overwrite(&mut self) {
        self.overwrites += 1;
    }

    /// Records an eviction.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
        self.entries -= 1;
    }

    /// Fraction of requests that were hits, or 0.0 before the first request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of requests that were misses, or 0.0 before the first request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// How full the map is, between 0.0 and 1.0.
    pub fn utilization(&self) -> f64 {
        if self.capacity > 0 {
            self.entries as f64 / self.capacity as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a `BTreeMap` for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("overwrites".to_string(), self.overwrites as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics.insert("entries".to_string(), self.entries as f64);
        metrics.insert("capacity".to_string(), self.capacity as f64);
        metrics.insert("utilization".to_string(), self.utilization());

        if self.insertions > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.insertions as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics reporting for every map type in the crate.
pub trait CacheMetrics {
    /// Returns all metrics as name/value pairs in sorted order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Identifies the eviction policy, e.g. `"LFU"`.
    fn algorithm_name(&self) -> &'static str;
}
