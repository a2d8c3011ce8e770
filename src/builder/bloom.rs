//! Builder for Bloom filters.
//!
//! # Type-State Pattern
//!
//! Required parameters are enforced at compile time:
//!
//! ```text
//! Initial → WithItems → Complete → BloomFilter
//!     ↓         ↓           ↓
//!   .expected_items()  .false_positive_rate()  .build()
//! ```
//!
//! # Examples
//!
//! ```
//! use sbtree::builder::BloomFilterBuilder;
//!
//! let filter = BloomFilterBuilder::new()
//!     .expected_items(1_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.size(), 9586);
//! ```
//!
//! Invalid values surface at `build`:
//!
//! ```
//! use sbtree::builder::BloomFilterBuilder;
//!
//! let result = BloomFilterBuilder::new()
//!     .expected_items(0)
//!     .false_positive_rate(0.01)
//!     .build();
//! assert!(result.is_err());
//! ```

use crate::error::Result;
use crate::filters::BloomFilter;
use crate::hash::{FilterHasher, XxHasher};
use std::marker::PhantomData;

/// Type-state marker: no parameters set.
pub struct Initial;

/// Type-state marker: item count set.
pub struct WithItems;

/// Type-state marker: all required parameters set.
pub struct Complete;

/// Builder for [`BloomFilter`] with type-state guarantees.
pub struct BloomFilterBuilder<State, H = XxHasher> {
    expected_items: usize,
    fp_rate: f64,
    hasher: H,
    _state: PhantomData<State>,
}

impl BloomFilterBuilder<Initial, XxHasher> {
    /// Create a builder using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expected_items: 0,
            fp_rate: 0.0,
            hasher: XxHasher::new(),
            _state: PhantomData,
        }
    }
}

impl Default for BloomFilterBuilder<Initial, XxHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State, H> BloomFilterBuilder<State, H> {
    /// Replace the hasher. Available in every state.
    #[must_use]
    pub fn hasher<H2: FilterHasher>(self, hasher: H2) -> BloomFilterBuilder<State, H2> {
        BloomFilterBuilder {
            expected_items: self.expected_items,
            fp_rate: self.fp_rate,
            hasher,
            _state: PhantomData,
        }
    }
}

impl<H> BloomFilterBuilder<Initial, H> {
    /// Set the expected number of items. Required.
    #[must_use]
    pub fn expected_items(self, items: usize) -> BloomFilterBuilder<WithItems, H> {
        BloomFilterBuilder {
            expected_items: items,
            fp_rate: self.fp_rate,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }
}

impl<H> BloomFilterBuilder<WithItems, H> {
    /// Set the target false positive rate. Required.
    #[must_use]
    pub fn false_positive_rate(self, fp_rate: f64) -> BloomFilterBuilder<Complete, H> {
        BloomFilterBuilder {
            expected_items: self.expected_items,
            fp_rate,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }
}

impl<H: FilterHasher> BloomFilterBuilder<Complete, H> {
    /// Build the filter.
    ///
    /// # Errors
    ///
    /// - [`SbtError::InvalidItemCount`](crate::SbtError::InvalidItemCount) if
    ///   the item count is zero
    /// - [`SbtError::FalsePositiveRateOutOfBounds`](crate::SbtError::FalsePositiveRateOutOfBounds)
    ///   if the rate is not in (0, 1)
    pub fn build(self) -> Result<BloomFilter<H>> {
        BloomFilter::with_hasher(self.expected_items, self.fp_rate, self.hasher)
    }
}
