//! Builder for cuckoo filters.
//!
//! Unlike the Bloom builder there is no required parameter: an unconfigured
//! builder produces the default manual layout. Sizing mode is checked at
//! build time, where asking for automatic sizing alongside a manual layout
//! field fails with [`SbtError::ConflictingSizing`](crate::SbtError::ConflictingSizing).
//!
//! # Examples
//!
//! ```
//! use sbtree::builder::CuckooFilterBuilder;
//!
//! let filter = CuckooFilterBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(0.01)
//!     .auto_size()
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.num_buckets(), 2618);
//!
//! let conflicting = CuckooFilterBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(0.01)
//!     .auto_size()
//!     .bucket_size(2)
//!     .build();
//! assert!(conflicting.is_err());
//! ```

use super::config::FilterConfig;
use crate::bucket::{BucketArray, FingerprintStore, PackedBucketArray};
use crate::error::{Result, SbtError};
use crate::filters::{CuckooFilter, CuckooFilterBit, GenericCuckooFilter, StashedCuckooFilter};

/// Fluent builder over a [`FilterConfig`].
#[derive(Debug, Clone, Default)]
pub struct CuckooFilterBuilder {
    config: FilterConfig,
}

impl CuckooFilterBuilder {
    /// Start from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    #[must_use]
    pub fn from_config(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Expected number of items, used by automatic sizing.
    #[must_use]
    pub fn expected_items(mut self, items: usize) -> Self {
        self.config.expected_num = Some(items);
        self
    }

    /// Target false positive rate, used by automatic sizing.
    #[must_use]
    pub fn false_positive_rate(mut self, fp_prob: f64) -> Self {
        self.config.fp_prob = Some(fp_prob);
        self
    }

    /// Derive the layout from the expected item count and rate.
    #[must_use]
    pub fn auto_size(mut self) -> Self {
        self.config.auto = true;
        self
    }

    /// Manual bucket count.
    #[must_use]
    pub fn num_buckets(mut self, num_buckets: usize) -> Self {
        self.config.num_buckets = Some(num_buckets);
        self
    }

    /// Manual fingerprint width in bits.
    #[must_use]
    pub fn fingerprint_size(mut self, bits: u32) -> Self {
        self.config.fp_size = Some(bits);
        self
    }

    /// Manual bucket size.
    #[must_use]
    pub fn bucket_size(mut self, bucket_size: usize) -> Self {
        self.config.bucket_size = Some(bucket_size);
        self
    }

    /// Displacement bound. Defaults to 500.
    #[must_use]
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter;
        self
    }

    /// Overflow stash size, used by [`build_stashed`](Self::build_stashed).
    #[must_use]
    pub fn stash_size(mut self, stash_size: usize) -> Self {
        self.config.stash_size = stash_size;
        self
    }

    /// Fix the eviction RNG seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// The configuration collected so far.
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Build a bucket-array filter.
    ///
    /// # Errors
    ///
    /// See [`FilterConfig::cuckoo_params`]. A nonzero `stash_size` is
    /// rejected; use [`build_stashed`](Self::build_stashed) instead.
    pub fn build(self) -> Result<CuckooFilter> {
        build_filter::<BucketArray>(&self.config)
    }

    /// Build a bit-packed filter.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_bit(self) -> Result<CuckooFilterBit> {
        build_filter::<PackedBucketArray>(&self.config)
    }

    /// Build a bucket-array filter with an overflow stash of `stash_size`.
    ///
    /// # Errors
    ///
    /// See [`FilterConfig::cuckoo_params`].
    pub fn build_stashed(self) -> Result<StashedCuckooFilter> {
        build_stashed::<BucketArray>(&self.config)
    }

    /// Build a bit-packed filter with an overflow stash of `stash_size`.
    ///
    /// # Errors
    ///
    /// See [`FilterConfig::cuckoo_params`].
    pub fn build_stashed_bit(self) -> Result<StashedCuckooFilter<PackedBucketArray>> {
        build_stashed::<PackedBucketArray>(&self.config)
    }
}

/// Check a configuration for a filter without a stash.
pub(crate) fn validate_unstashed(config: &FilterConfig) -> Result<()> {
    if config.stash_size > 0 {
        return Err(SbtError::invalid_parameters(format!(
            "stash_size={} needs a stashed filter",
            config.stash_size
        )));
    }
    config.validate()
}

/// Build a cuckoo filter over storage `S` from a configuration.
pub(crate) fn build_filter<S: FingerprintStore>(config: &FilterConfig) -> Result<GenericCuckooFilter<S>> {
    validate_unstashed(config)?;
    build_table(config)
}

/// Build a stashed cuckoo filter over storage `S` from a configuration.
pub(crate) fn build_stashed<S: FingerprintStore>(config: &FilterConfig) -> Result<StashedCuckooFilter<S>> {
    let filter = build_table::<S>(config)?;
    Ok(StashedCuckooFilter::from_filter(filter, config.stash_size))
}

fn build_table<S: FingerprintStore>(config: &FilterConfig) -> Result<GenericCuckooFilter<S>> {
    let params = config.cuckoo_params()?;
    GenericCuckooFilter::from_params(params, config.max_iter, config.seed)
}
