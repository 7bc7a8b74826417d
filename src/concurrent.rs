//! Concurrent Fixed Size Map
//!
//! A thread-safe wrapper around [`FixedSizeMap`] for sharing one map between
//! threads, typically through an `Arc`.
//!
//! # Locking
//!
//! The entry table and the frequency buckets are updated together by every
//! `put` and every `get`, so the whole map sits behind a single
//! `parking_lot::Mutex`. There is no lock striping: splitting keys across
//! independently locked segments would give each segment its own frequency
//! buckets and change which entry gets evicted.
//!
//! `RwLock` would buy nothing here, because `get` promotes the entry and is
//! therefore a write.
//!
//! The guard is dropped on every exit path, including a miss and the panic
//! raised by [`FixedSizeMap::put`] when it finds no eviction candidate.
//! `parking_lot` mutexes are not poisoned, and that panic happens before the
//! map is modified, so the map stays usable afterwards.
//!
//! # Example
//!
//! ```rust
//! use fixed_size_map::ConcurrentFixedSizeMap;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let map = Arc::new(ConcurrentFixedSizeMap::new(1_000).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let map = Arc::clone(&map);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 map.put(format!("key-{t}-{i}"), i);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert_eq!(map.len(), 400);
//! ```

extern crate alloc;

use crate::config::FixedSizeMapConfig;
use crate::error::Result;
use crate::map::FixedSizeMap;
use crate::metrics::CacheMetrics;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A [`FixedSizeMap`] guarded by one exclusive lock.
pub struct ConcurrentFixedSizeMap<K, V, S = DefaultHashBuilder> {
    inner: Mutex<FixedSizeMap<K, V, S>>,
}

impl<K: Hash + Eq, V> ConcurrentFixedSizeMap<K, V, DefaultHashBuilder> {
    /// Creates an empty concurrent map holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(FixedSizeMap::new(capacity)?),
        })
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ConcurrentFixedSizeMap<K, V, S> {
    /// Creates an empty concurrent map with a custom hash builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// `capacity` is zero.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(FixedSizeMap::with_hasher(capacity, hash_builder)?),
        })
    }

    /// Creates a concurrent map from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// the configured capacity is zero.
    pub fn init(config: FixedSizeMapConfig, hasher: Option<S>) -> Result<Self>
    where
        S: Default,
    {
        Ok(Self {
            inner: Mutex::new(FixedSizeMap::init(config, hasher)?),
        })
    }

    /// Returns the maximum number of entries the map can hold.
    pub fn cap(&self) -> NonZeroUsize {
        self.inner.lock().cap()
    }

    /// Returns the number of entries currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Gets a clone of the value for `key`, promoting the entry.
    ///
    /// Use [`ConcurrentFixedSizeMap::get_with`] to avoid the clone.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Promotes the entry for `key` and applies `f` to its value while the
    /// lock is held.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.inner.lock().get(key).map(f)
    }

    /// Gets a clone of the value for `key` without promoting it.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Returns `true` if `key` is present, without promoting it.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().contains_key(key)
    }

    /// Returns how many times `key` has been read since it was last written.
    pub fn access_count<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().access_count(key)
    }

    /// Associates `value` with `key` and returns the previous value, if any.
    ///
    /// # Panics
    ///
    /// Under the same condition as [`FixedSizeMap::put`]. The lock is
    /// released and the map is left unchanged.
    pub fn put(&self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        self.inner.lock().put(key, value)
    }

    /// Verifies the map's internal invariants under the lock.
    pub fn check_invariants(&self) -> core::result::Result<(), crate::error::InvariantError> {
        self.inner.lock().check_invariants()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for ConcurrentFixedSizeMap<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentLFU"
    }
}

impl<K, V, S> core::fmt::Debug for ConcurrentFixedSizeMap<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.inner.try_lock() {
            Some(map) => f
                .debug_struct("ConcurrentFixedSizeMap")
                .field("inner", &*map)
                .finish(),
            None => f
                .debug_struct("ConcurrentFixedSizeMap")
                .field("inner", &"<locked>")
                .finish(),
        }
    }
}
