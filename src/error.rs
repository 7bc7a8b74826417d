//! Error types for `fixed-size-map`.
//!
//! Constructing a map with a zero capacity is the only failure a caller can
//! trigger through the public API. [`InvariantError`] exists for
//! [`FixedSizeMap::check_invariants`](crate::FixedSizeMap::check_invariants).

use thiserror::Error;

/// Result type alias for fallible map operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned when building a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested capacity was zero.
    #[error("max size must be greater than 0")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },
}

/// Returned when the table, ledger and frequency buckets disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invariant violated: {0}")]
pub struct InvariantError(pub(crate) &'static str);

impl InvariantError {
    /// Returns a description of the invariant that failed.
    #[inline]
    pub fn message(&self) -> &'static str {
        self.0
    }
}
