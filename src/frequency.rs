//! Frequency index: access count to insertion-ordered bucket of keys.
//!
//! Every key in the map lives in exactly one bucket, the one for its current
//! access count. Within a bucket keys are ordered by when they entered it, so
//! the front of a bucket is the oldest key at that count.
//!
//! The index also carries the minimum-frequency cursor. The cursor is only
//! ever moved by [`FrequencyIndex::reset_min_frequency`]; promotions leave it
//! alone even when they empty the bucket it points at.

extern crate alloc;

use crate::list::{Iter, List, Node};

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Access count given to freshly inserted or overwritten keys.
pub(crate) const INITIAL_COUNT: usize = 0;

/// Buckets of keys grouped by access count.
pub(crate) struct FrequencyIndex<K> {
    buckets: HashMap<usize, List<K>>,
    min_frequency: usize,
}

impl<K> FrequencyIndex<K> {
    /// Creates an index holding only the (empty) bucket for count 0.
    pub(crate) fn new() -> Self {
        let mut buckets = HashMap::default();
        buckets.insert(INITIAL_COUNT, List::new());
        FrequencyIndex {
            buckets,
            min_frequency: INITIAL_COUNT,
        }
    }

    #[inline]
    pub(crate) fn min_frequency(&self) -> usize {
        self.min_frequency
    }

    /// Points the cursor back at the count-0 bucket.
    #[inline]
    pub(crate) fn reset_min_frequency(&mut self) {
        self.min_frequency = INITIAL_COUNT;
    }

    /// Appends `key` to the bucket for `count`, creating it if needed.
    pub(crate) fn insert(&mut self, count: usize, key: K) -> *mut Node<K> {
        self.buckets.entry(count).or_default().push_back(key)
    }

    /// Unlinks `node` from the bucket for `count` and returns its key.
    ///
    /// Buckets other than count 0 are dropped once they become empty.
    ///
    /// # Safety
    ///
    /// `node` must have been returned by [`FrequencyIndex::insert`] with the
    /// same `count` and not removed since.
    pub(crate) unsafe fn remove(&mut self, count: usize, node: *mut Node<K>) -> Option<K> {
        let bucket = self.buckets.get_mut(&count)?;
        // SAFETY: caller guarantees node belongs to this bucket and is still linked
        let key = unsafe { bucket.remove(node) };
        if bucket.is_empty() && count != INITIAL_COUNT {
            self.buckets.remove(&count);
        }
        Some(key)
    }

    /// Returns the oldest key in the bucket under the cursor.
    pub(crate) fn peek_oldest(&self) -> Option<&K> {
        self.buckets.get(&self.min_frequency)?.front()
    }

    /// Removes and returns the oldest key in the bucket under the cursor.
    ///
    /// Returns `None` when that bucket is empty or missing.
    pub(crate) fn pop_oldest(&mut self) -> Option<K> {
        let count = self.min_frequency;
        let bucket = self.buckets.get_mut(&count)?;
        let key = bucket.pop_front()?;
        if bucket.is_empty() && count != INITIAL_COUNT {
            self.buckets.remove(&count);
        }
        Some(key)
    }

    /// Number of keys currently at `count`.
    pub(crate) fn bucket_len(&self, count: usize) -> usize {
        self.buckets.get(&count).map_or(0, List::len)
    }

    /// Number of non-empty buckets.
    pub(crate) fn active_levels(&self) -> usize {
        let idle_zero = usize::from(self.bucket_len(INITIAL_COUNT) == 0);
        self.buckets.len() - idle_zero
    }

    /// Total number of keys across all buckets.
    pub(crate) fn total_len(&self) -> usize {
        self.buckets.values().map(List::len).sum()
    }

    /// Iterates over `(count, keys)` pairs in no particular order.
    pub(crate) fn buckets(&self) -> impl Iterator<Item = (usize, Iter<'_, K>)> {
        self.buckets.iter().map(|(&count, list)| (count, list.iter()))
    }
}

impl<K> core::fmt::Debug for FrequencyIndex<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrequencyIndex")
            .field("buckets", &self.buckets.len())
            .field("min_frequency", &self.min_frequency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn keys_at<K: Clone>(index: &FrequencyIndex<K>, count: usize) -> Vec<K> {
        index
            .buckets()
            .find(|(c, _)| *c == count)
            .map(|(_, keys)| keys.cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_new_index_has_empty_zero_bucket() {
        let index = FrequencyIndex::<&str>::new();
        assert_eq!(index.min_frequency(), 0);
        assert_eq!(index.bucket_len(0), 0);
        assert_eq!(index.buckets().count(), 1);
        assert_eq!(index.active_levels(), 0);
        assert!(index.peek_oldest().is_none());
    }

    #[test]
    fn test_insert_appends_in_order() {
        let mut index = FrequencyIndex::new();
        index.insert(0, "a");
        index.insert(0, "b");
        index.insert(2, "c");

        assert_eq!(keys_at(&index, 0), ["a", "b"]);
        assert_eq!(keys_at(&index, 2), ["c"]);
        assert_eq!(index.total_len(), 3);
        assert_eq!(index.active_levels(), 2);
        assert_eq!(index.peek_oldest(), Some(&"a"));
    }

    #[test]
    fn test_remove_moves_between_buckets() {
        let mut index = FrequencyIndex::new();
        let a = index.insert(0, "a");
        index.insert(0, "b");

        let key = unsafe { index.remove(0, a) }.unwrap();
        index.insert(1, key);

        assert_eq!(keys_at(&index, 0), ["b"]);
        assert_eq!(keys_at(&index, 1), ["a"]);
        assert_eq!(index.peek_oldest(), Some(&"b"));
    }

    #[test]
    fn test_empty_nonzero_bucket_is_dropped() {
        let mut index = FrequencyIndex::new();
        let a = index.insert(3, "a");
        assert_eq!(index.buckets().count(), 2);

        assert_eq!(unsafe { index.remove(3, a) }, Some("a"));
        assert_eq!(index.buckets().count(), 1);
        assert_eq!(index.bucket_len(3), 0);
    }

    #[test]
    fn test_zero_bucket_survives_being_emptied() {
        let mut index = FrequencyIndex::new();
        let a = index.insert(0, "a");
        assert_eq!(unsafe { index.remove(0, a) }, Some("a"));
        assert_eq!(index.buckets().count(), 1);
        assert_eq!(index.bucket_len(0), 0);
    }

    #[test]
    fn test_pop_oldest_uses_cursor_bucket() {
        let mut index = FrequencyIndex::new();
        index.insert(0, "a");
        index.insert(0, "b");
        index.insert(1, "c");

        assert_eq!(index.pop_oldest(), Some("a"));
        assert_eq!(index.pop_oldest(), Some("b"));
        // cursor stays on the now-empty count-0 bucket
        assert_eq!(index.pop_oldest(), None);
        assert_eq!(keys_at(&index, 1), ["c"]);
    }

    #[test]
    fn test_cursor_only_moves_on_reset() {
        let mut index = FrequencyIndex::new();
        let a = index.insert(0, "a");
        let key = unsafe { index.remove(0, a) }.unwrap();
        index.insert(1, key);

        assert_eq!(index.min_frequency(), 0);
        assert!(index.peek_oldest().is_none());

        index.reset_min_frequency();
        assert_eq!(index.min_frequency(), 0);
    }
}
