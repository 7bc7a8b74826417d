//! Fixed Size Map Implementation.
//!
//! A bounded key/value map that evicts the least frequently used entry when a
//! new key needs room. Entries that have been read the same number of times
//! are evicted oldest first, where "oldest" means the entry that entered its
//! access-count bucket earliest.
//!
//! # Structure
//!
//! ```text
//!   entries (hash map)                      frequency index
//!  ┌───────┬───────────────────────┐      ┌───────┬──────────────────────┐
//!  │  key  │ value │ count │ node ─┼────▶ │ count │ keys, oldest first   │
//!  ├───────┼───────┼───────┼───────┤      ├───────┼──────────────────────┤
//!  │  "a"  │  ...  │   1   │   ●   │      │   0   │ "c" ◀─▶ "d"          │
//!  │  "c"  │  ...  │   0   │   ●   │      │   1   │ "a"                  │
//!  │  "d"  │  ...  │   0   │   ●   │      └───────┴──────────────────────┘
//!  └───────┴───────┴───────┴───────┘       min-frequency cursor ──▶ 0
//! ```
//!
//! Each entry slot holds the value (the association) together with the access
//! count and the handle of the key's node in its bucket (the ledger). The
//! node handle lets `get` and `put` unlink a key from its bucket without
//! searching it, so both operations are O(1).
//!
//! # Minimum-frequency cursor
//!
//! `put` always resets the cursor to 0, since the key it just wrote sits in
//! bucket 0. `get` never moves it. Eviction reads the oldest key of the bucket
//! under the cursor. If a run of `get` calls has emptied bucket 0 and the next
//! call is a `put` of a new key into a full map, there is no candidate and
//! `put` panics; see [`FixedSizeMap::put`].

extern crate alloc;

use crate::config::FixedSizeMapConfig;
use crate::error::{InvariantError, Result};
use crate::frequency::{FrequencyIndex, INITIAL_COUNT};
use crate::list::Node;
use crate::metrics::{CacheMetrics, FixedSizeMapMetrics};
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;
use tracing::{debug, error, trace};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Upper bound on the table space reserved at construction. Larger maps grow
/// on demand.
const MAX_PREALLOCATED_ENTRIES: usize = 1024;

/// Value plus ledger data for one key.
struct Slot<K, V> {
    value: V,
    count: usize,
    node: *mut Node<K>,
}

/// A bounded map with least-frequently-used eviction.
///
/// # Examples
///
/// ```
/// use fixed_size_map::FixedSizeMap;
///
/// let mut map = FixedSizeMap::new(3).unwrap();
/// map.put("a", "aValue");
/// map.put("b", "bValue");
/// map.put("c", "cValue");
///
/// map.get(&"a");
/// map.get(&"b");
///
/// // "c" was never read, so it makes room for "d"
/// map.put("d", "dValue");
/// assert_eq!(map.get(&"c"), None);
/// assert_eq!(map.get(&"d"), Some(&"dValue"));
/// ```
pub struct FixedSizeMap<K, V, S = DefaultHashBuilder> {
    cap: NonZeroUsize,

    /// Association table and access ledger
    entries: HashMap<K, Slot<K, V>, S>,

    /// Buckets of keys per access count, plus the minimum-frequency cursor
    index: FrequencyIndex<K>,

    metrics: FixedSizeMapMetrics,
}

// SAFETY: the raw node pointers in `entries` only point into lists owned by
// `index`, so moving the whole map to another thread moves everything they
// reference along with it.
unsafe impl<K: Send, V: Send, S: Send> Send for FixedSizeMap<K, V, S> {}

// SAFETY: every mutation goes through `&mut self`, so shared references never race.
unsafe impl<K: Sync, V: Sync, S: Sync> Sync for FixedSizeMap<K, V, S> {}

impl<K: Hash + Eq, V> FixedSizeMap<K, V> {
    /// Creates an empty map holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixed_size_map::{Error, FixedSizeMap};
    ///
    /// let map: FixedSizeMap<&str, u32> = FixedSizeMap::new(10).unwrap();
    /// assert!(map.is_empty());
    ///
    /// let err = FixedSizeMap::<&str, u32>::new(0).unwrap_err();
    /// assert_eq!(err, Error::InvalidCapacity { capacity: 0 });
    /// ```
    pub fn new(capacity: usize) -> Result<FixedSizeMap<K, V, DefaultHashBuilder>> {
        FixedSizeMap::with_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> FixedSizeMap<K, V, S> {
    /// Creates an empty map with the given capacity and hash builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// `capacity` is zero.
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Self::from_parts(FixedSizeMapConfig { capacity }, hash_builder)
    }

    /// Creates a map from a configuration.
    ///
    /// When `hasher` is `None` the default hash builder for `S` is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if
    /// the configured capacity is zero.
    pub fn init(config: FixedSizeMapConfig, hasher: Option<S>) -> Result<Self>
    where
        S: Default,
    {
        Self::from_parts(config, hasher.unwrap_or_default())
    }

    fn from_parts(config: FixedSizeMapConfig, hash_builder: S) -> Result<Self> {
        let cap = config.validate()?;
        debug!(capacity = cap.get(), "creating fixed size map");
        Ok(FixedSizeMap {
            cap,
            entries: HashMap::with_capacity_and_hasher(
                cap.get().min(MAX_PREALLOCATED_ENTRIES),
                hash_builder,
            ),
            index: FrequencyIndex::new(),
            metrics: FixedSizeMapMetrics::new(cap.get() as u64),
        })
    }

    /// Returns the maximum number of entries the map can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Returns the number of entries currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the access count the next eviction will draw from.
    #[inline]
    pub fn min_frequency(&self) -> usize {
        self.index.min_frequency()
    }

    /// Returns the metrics recorded so far.
    #[inline]
    pub fn stats(&self) -> &FixedSizeMapMetrics {
        &self.metrics
    }

    /// Returns a reference to the value for `key`, promoting the entry.
    ///
    /// A hit moves the key from the bucket for its access count `c` to the
    /// back of the bucket for `c + 1`. A miss leaves the map untouched.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.promote(key).map(|slot| &slot.value)
    }

    /// Returns a mutable reference to the value for `key`, promoting the entry.
    ///
    /// Promotion works exactly as in [`FixedSizeMap::get`].
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.promote(key).map(|slot| &mut slot.value)
    }

    fn promote<Q>(&mut self, key: &Q) -> Option<&mut Slot<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(slot) = self.entries.get_mut(key) else {
            self.metrics.record_miss();
            return None;
        };

        let old_count = slot.count;
        // SAFETY: slot.node was handed out by index.insert(slot.count, ..) and
        // every path that unlinks it also replaces it
        let owned_key = unsafe { self.index.remove(old_count, slot.node) }?;
        slot.count = old_count + 1;
        slot.node = self.index.insert(slot.count, owned_key);

        self.metrics.record_promotion(slot.count);
        self.metrics.update_frequency_levels(self.index.active_levels());

        Some(slot)
    }

    /// Returns the value for `key` without touching its access count.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Returns `true` if `key` is present, without touching its access count.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.entries.contains_key(key)
    }

    /// Returns how many times `key` has been read since it was last written.
    pub fn access_count<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.entries.get(key).map(|slot| slot.count)
    }

    /// Returns the key the next eviction would remove, if there is one.
    ///
    /// `None` on a full map means the next `put` of a new key will panic.
    pub fn next_eviction(&self) -> Option<&K> {
        self.index.peek_oldest()
    }

    /// Associates `value` with `key` and returns the previous value, if any.
    ///
    /// Whether the key is new or not, it ends up with an access count of 0 at
    /// the back of the count-0 bucket, and the minimum-frequency cursor is
    /// reset to 0. Overwriting an existing key never evicts. Adding a new key
    /// to a full map first evicts the oldest key in the bucket under the
    /// cursor.
    ///
    /// # Panics
    ///
    /// Panics if a new key must be added to a full map while the bucket under
    /// the cursor is empty. This happens when every key written since the last
    /// `put` has been read before the next `put` of a new key:
    ///
    /// ```should_panic
    /// use fixed_size_map::FixedSizeMap;
    ///
    /// let mut map = FixedSizeMap::new(1).unwrap();
    /// map.put("a", 1);
    /// map.get(&"a");
    /// map.put("b", 2); // bucket 0 is empty, nothing to evict
    /// ```
    ///
    /// The panic is raised before anything is modified, so the map is left
    /// exactly as it was.
    pub fn put(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        if let Some(slot) = self.entries.get_mut(&key) {
            // SAFETY: slot.node is the live handle for this key in bucket slot.count
            let _stale_key = unsafe { self.index.remove(slot.count, slot.node) };
            trace!(previous_count = slot.count, "overwriting existing entry");
            slot.count = INITIAL_COUNT;
            slot.node = self.index.insert(INITIAL_COUNT, key);
            self.index.reset_min_frequency();

            self.metrics.core.record_overwrite();
            self.metrics.update_frequency_levels(self.index.active_levels());
            return Some(mem::replace(&mut slot.value, value));
        }

        if self.entries.len() >= self.cap.get() {
            self.evict();
        }

        let node = self.index.insert(INITIAL_COUNT, key.clone());
        self.index.reset_min_frequency();
        self.entries.insert(
            key,
            Slot {
                value,
                count: INITIAL_COUNT,
                node,
            },
        );

        self.metrics.core.record_insertion();
        self.metrics.update_frequency_levels(self.index.active_levels());
        None
    }

    /// Removes the oldest key in the bucket under the cursor.
    fn evict(&mut self) {
        let cursor = self.index.min_frequency();
        let Some(victim) = self.index.pop_oldest() else {
            error!(
                cursor,
                len = self.entries.len(),
                "no eviction candidate in minimum-frequency bucket"
            );
            panic!("FixedSizeMap: bucket for access count {cursor} is empty, nothing to evict");
        };

        if let Some(slot) = self.entries.remove(&victim) {
            trace!(access_count = slot.count, "evicted least frequently used entry");
            self.metrics.record_eviction(slot.count);
        }
    }

    /// Verifies that the entry table and the frequency buckets agree.
    ///
    /// Checks that bucket 0 exists, that every bucketed key is stored with the
    /// matching access count and node, that the bucket sizes add up to the
    /// number of entries, and that the number of entries is within capacity.
    pub fn check_invariants(&self) -> core::result::Result<(), InvariantError> {
        if self.entries.len() > self.cap.get() {
            return Err(InvariantError("more entries than capacity"));
        }
        if !self.index.buckets().any(|(count, _)| count == INITIAL_COUNT) {
            return Err(InvariantError("bucket for access count 0 is missing"));
        }
        if self.index.total_len() != self.entries.len() {
            return Err(InvariantError("bucket sizes do not add up to entry count"));
        }
        for (count, keys) in self.index.buckets() {
            for key in keys {
                let slot = self
                    .entries
                    .get(key)
                    .ok_or(InvariantError("bucketed key has no entry"))?;
                if slot.count != count {
                    return Err(InvariantError("entry count does not match its bucket"));
                }
            }
        }
        for (key, slot) in self.entries.iter() {
            // SAFETY: slot.node is a live node owned by the index
            let bucketed = unsafe { (*slot.node).value() };
            if bucketed != key {
                return Err(InvariantError("entry node holds a different key"));
            }
        }
        Ok(())
    }
}

impl<K, V, S> core::fmt::Debug for FixedSizeMap<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FixedSizeMap")
            .field("capacity", &self.cap)
            .field("len", &self.entries.len())
            .field("min_frequency", &self.index.min_frequency())
            .finish()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for FixedSizeMap<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}
