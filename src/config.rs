//! Map Configuration
//!
//! Configuration for [`FixedSizeMap`](crate::FixedSizeMap) and, with the
//! `concurrent` feature, [`ConcurrentFixedSizeMap`](crate::ConcurrentFixedSizeMap).
//!
//! Like the rest of the crate's configs this is a plain struct with public
//! fields. Validation happens when the map is built, so a config holding a
//! zero capacity can be created but never turned into a map.
//!
//! # Examples
//!
//! ```
//! use fixed_size_map::config::FixedSizeMapConfig;
//! use fixed_size_map::FixedSizeMap;
//!
//! let config = FixedSizeMapConfig { capacity: 100 };
//! let map: FixedSizeMap<String, i32> = FixedSizeMap::init(config, None).unwrap();
//! assert_eq!(map.cap().get(), 100);
//!
//! let bad = FixedSizeMapConfig { capacity: 0 };
//! assert!(FixedSizeMap::<String, i32>::init(bad, None).is_err());
//! ```

use crate::error::{Error, Result};
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a [`FixedSizeMap`](crate::FixedSizeMap).
///
/// # Fields
///
/// - `capacity`: Maximum number of entries the map can hold. Must be positive.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeMapConfig {
    /// Maximum number of key-value pairs the map can hold
    pub capacity: usize,
}

impl FixedSizeMapConfig {
    /// Checks the configuration and returns the capacity as a `NonZeroUsize`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn validate(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity).ok_or(Error::InvalidCapacity {
            capacity: self.capacity,
        })
    }
}

impl fmt::Debug for FixedSizeMapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedSizeMapConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}
