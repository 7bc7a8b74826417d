#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## How eviction picks a victim
//!
//! ```text
//!   put(new key) on a full map
//!            │
//!            ▼
//!   bucket[min-frequency cursor]  ── oldest key ──▶ evicted
//!            │
//!            ▼
//!   new key appended to bucket[0], cursor reset to 0
//!
//!   get(key) at count c:   bucket[c] ──▶ back of bucket[c + 1]
//! ```
//!
//! | Operation | Cost | Effect on access count |
//! |-----------|------|------------------------|
//! | `put` (new key) | O(1) | set to 0, may evict one entry |
//! | `put` (existing key) | O(1) | reset to 0, never evicts |
//! | `get` / `get_mut` | O(1) | incremented on a hit |
//! | `peek` / `contains_key` / `access_count` | O(1) | unchanged |
//!
//! ## Modules
//!
//! - [`map`]: the [`FixedSizeMap`] itself
//! - [`config`]: construction parameters
//! - [`error`]: error types
//! - [`metrics`]: counters reported through [`metrics::CacheMetrics`]
//! - [`concurrent`]: a single-lock thread-safe wrapper (requires `concurrent` feature)

#![no_std]

#[cfg(any(test, not(feature = "hashbrown")))]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

/// Intrusive doubly linked list backing each frequency bucket.
///
/// Internal infrastructure built on raw pointers; not part of the public API.
pub(crate) mod list;

/// Access count to insertion-ordered bucket of keys, plus the
/// minimum-frequency cursor.
pub(crate) mod frequency;

/// Map configuration.
pub mod config;

/// Error types.
pub mod error;

/// The bounded least-frequently-used map.
pub mod map;

/// Metrics collected while the map serves requests.
pub mod metrics;

/// Thread-safe wrapper guarding a whole map with one lock.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use config::FixedSizeMapConfig;
pub use error::{Error, InvariantError, Result};
pub use map::FixedSizeMap;

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentFixedSizeMap;
