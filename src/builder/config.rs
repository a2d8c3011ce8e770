//! Plain-data filter configuration.
//!
//! [`FilterConfig`] carries every recognised sizing option in one struct so
//! it can be stored in a [`TreeConfig`](crate::tree::TreeConfig), built from
//! command-line flags, or (with the `serde` feature) loaded from a file.
//! Nothing is checked until [`FilterConfig::validate`] or one of the
//! resolving methods runs.
//!
//! # Sizing modes
//!
//! - **Manual**: `num_buckets`, `fp_size` and `bucket_size` name the layout.
//!   Unset fields fall back to [`DEFAULT_NUM_BUCKETS`], [`DEFAULT_FP_SIZE`]
//!   and [`DEFAULT_BUCKET_SIZE`].
//! - **Auto**: `auto = true` derives the layout from `expected_num` and
//!   `fp_prob`. Setting any manual layout field as well is an error.
//!
//! Bloom filters always size from `expected_num` and `fp_prob`.

use crate::core::params::{self, CuckooParams};
use crate::error::{Result, SbtError};

/// Bucket count used when manual sizing leaves it unset.
pub const DEFAULT_NUM_BUCKETS: usize = 6500;

/// Fingerprint width used when manual sizing leaves it unset.
pub const DEFAULT_FP_SIZE: u32 = 16;

/// Bucket size used when manual sizing leaves it unset.
pub const DEFAULT_BUCKET_SIZE: usize = 64;

/// Displacement bound used when none is given.
pub const DEFAULT_MAX_ITER: usize = 500;

/// Sizing and behaviour options shared by every filter kind.
///
/// # Examples
///
/// ```
/// use sbtree::builder::FilterConfig;
///
/// let config = FilterConfig::auto(10_000, 0.01);
/// let params = config.cuckoo_params().unwrap();
/// assert_eq!(params.bucket_size, 4);
///
/// let manual = FilterConfig::manual(10, 8, 1);
/// assert_eq!(manual.cuckoo_params().unwrap().num_buckets, 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterConfig {
    /// Expected number of items (Bloom sizing and cuckoo auto-sizing).
    pub expected_num: Option<usize>,
    /// Target false positive probability.
    pub fp_prob: Option<f64>,
    /// Manual cuckoo bucket count.
    pub num_buckets: Option<usize>,
    /// Manual cuckoo fingerprint width in bits.
    pub fp_size: Option<u32>,
    /// Manual cuckoo bucket size.
    pub bucket_size: Option<usize>,
    /// Cuckoo displacement bound.
    pub max_iter: usize,
    /// Cuckoo overflow stash size. Zero disables the stash.
    pub stash_size: usize,
    /// Derive the cuckoo layout from `expected_num` and `fp_prob`.
    pub auto: bool,
    /// Seed for eviction randomness. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_num: None,
            fp_prob: None,
            num_buckets: None,
            fp_size: None,
            bucket_size: None,
            max_iter: DEFAULT_MAX_ITER,
            stash_size: 0,
            auto: false,
            seed: None,
        }
    }
}

impl FilterConfig {
    /// Configuration for a Bloom filter, or an auto-sized cuckoo filter.
    #[must_use]
    pub fn auto(expected_num: usize, fp_prob: f64) -> Self {
        Self {
            expected_num: Some(expected_num),
            fp_prob: Some(fp_prob),
            auto: true,
            ..Self::default()
        }
    }

    /// Configuration for a Bloom filter. Same fields as [`auto`](Self::auto)
    /// without the cuckoo auto-sizing flag.
    #[must_use]
    pub fn bloom(expected_num: usize, fp_prob: f64) -> Self {
        Self {
            expected_num: Some(expected_num),
            fp_prob: Some(fp_prob),
            ..Self::default()
        }
    }

    /// Configuration for a manually laid out cuckoo filter.
    #[must_use]
    pub fn manual(num_buckets: usize, fp_size: u32, bucket_size: usize) -> Self {
        Self {
            num_buckets: Some(num_buckets),
            fp_size: Some(fp_size),
            bucket_size: Some(bucket_size),
            ..Self::default()
        }
    }

    /// Set the displacement bound.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the stash size.
    #[must_use]
    pub fn with_stash(mut self, stash_size: usize) -> Self {
        self.stash_size = stash_size;
        self
    }

    /// Fix the eviction RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Resolve the cuckoo layout.
    ///
    /// # Errors
    ///
    /// - [`SbtError::ConflictingSizing`] if `auto` is set together with any
    ///   manual layout field
    /// - [`SbtError::InvalidParameters`] if `auto` is set without
    ///   `expected_num` or `fp_prob`
    /// - any error from [`CuckooParams::auto`] or [`CuckooParams::new`]
    pub fn cuckoo_params(&self) -> Result<CuckooParams> {
        if !self.auto {
            return CuckooParams::new(
                self.num_buckets.unwrap_or(DEFAULT_NUM_BUCKETS),
                self.fp_size.unwrap_or(DEFAULT_FP_SIZE),
                self.bucket_size.unwrap_or(DEFAULT_BUCKET_SIZE),
            );
        }

        let manual: Vec<&str> = [
            ("num_buckets", self.num_buckets.is_some()),
            ("fp_size", self.fp_size.is_some()),
            ("bucket_size", self.bucket_size.is_some()),
        ]
        .iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| *name)
        .collect();
        if !manual.is_empty() {
            return Err(SbtError::conflicting_sizing(manual.join(", ")));
        }

        let (expected_num, fp_prob) = self.expected_and_fp("auto sizing")?;
        CuckooParams::auto(expected_num, fp_prob)
    }

    /// Resolve Bloom sizing as `(expected_num, fp_prob)`.
    ///
    /// # Errors
    ///
    /// - [`SbtError::InvalidParameters`] if either field is unset
    /// - [`SbtError::InvalidItemCount`] or
    ///   [`SbtError::FalsePositiveRateOutOfBounds`] for out-of-range values
    pub fn bloom_sizing(&self) -> Result<(usize, f64)> {
        let (expected_num, fp_prob) = self.expected_and_fp("Bloom sizing")?;
        params::optimal_bit_count(expected_num, fp_prob)?;
        Ok((expected_num, fp_prob))
    }

    /// Check the configuration as a cuckoo filter configuration.
    ///
    /// # Errors
    ///
    /// Same as [`cuckoo_params`](Self::cuckoo_params).
    pub fn validate(&self) -> Result<()> {
        self.cuckoo_params().map(|_| ())
    }

    fn expected_and_fp(&self, purpose: &str) -> Result<(usize, f64)> {
        match (self.expected_num, self.fp_prob) {
            (Some(n), Some(p)) => Ok((n, p)),
            _ => Err(SbtError::invalid_parameters(format!(
                "{} requires both expected_num and fp_prob",
                purpose
            ))),
        }
    }
}
