//! Error types for sbtree operations.
//!
//! Construction of filters, builders and trees is fallible and reports an
//! [`SbtError`]. Hot-path operations (`insert`, `contains`, `delete`) never
//! return errors: a full cuckoo table or a rejected duplicate is reported as
//! `false`, and the filter stays valid.
//!
//! # Propagating with `?`
//!
//! ```
//! use sbtree::{Result, SbtError};
//! use sbtree::core::params::{optimal_bit_count, optimal_hash_count};
//!
//! fn bloom_params(n: usize, fp: f64) -> Result<(usize, usize)> {
//!     let m = optimal_bit_count(n, fp)?;
//!     let k = optimal_hash_count(m, n)?;
//!     Ok((m, k))
//! }
//! # assert!(bloom_params(1000, 0.01).is_ok());
//! # assert!(matches!(bloom_params(0, 0.01), Err(SbtError::InvalidItemCount { .. })));
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias for sbtree operations.
pub type Result<T> = std::result::Result<T, SbtError>;

/// Errors that can occur while configuring filters and trees.
///
/// Every variant carries the offending value so callers can report it
/// without re-deriving context.
#[derive(Debug, Clone, PartialEq)]
pub enum SbtError {
    /// Generic parameter violation not covered by a dedicated variant.
    InvalidParameters {
        /// What was wrong with the parameters.
        message: String,
    },

    /// False positive probability outside the open interval (0, 1).
    FalsePositiveRateOutOfBounds {
        /// The invalid probability that was provided.
        fp_rate: f64,
    },

    /// Expected item count of zero.
    InvalidItemCount {
        /// Count as given.
        count: usize,
    },

    /// Fingerprint width outside `1..=64` bits.
    InvalidFingerprintSize {
        /// The invalid width in bits.
        bits: u32,
    },

    /// Zero buckets or zero slots per bucket.
    InvalidBucketLayout {
        /// Requested bucket count.
        num_buckets: usize,
        /// Requested slots per bucket.
        bucket_size: usize,
    },

    /// Bloom bit array size that cannot be allocated.
    InvalidFilterSize {
        /// Requested size in bits.
        size: usize,
    },

    /// A k-mer length of zero.
    InvalidKmerLength {
        /// The invalid length.
        k: usize,
    },

    /// Query threshold outside `[0, 1]`.
    ThetaOutOfBounds {
        /// The invalid threshold.
        theta: f64,
    },

    /// Automatic and manual sizing were both requested for one cuckoo filter.
    ConflictingSizing {
        /// The manual options that were set alongside `auto`.
        manual: String,
    },

    /// Two filters cannot be compared or merged.
    IncompatibleFilters {
        /// Which layout property differs.
        reason: String,
    },

    /// Access past the end of a bit vector.
    IndexOutOfBounds {
        /// Offending bit index.
        index: usize,
        /// Length in bits.
        length: usize,
    },

    /// A structural invariant failed; indicates a bug.
    ///
    /// Indicates a bug in sbtree, or a tree whose structure was corrupted.
    InternalError {
        /// Broken invariant.
        message: String,
    },
}

impl fmt::Display for SbtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid filter parameters: {}.", message)
            }
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive probability {} must lie strictly between 0 and 1.",
                    fp_rate
                )
            }
            Self::InvalidItemCount { count } => {
                write!(
                    f,
                    "Expected item count {} is invalid: sizing needs at least one item.",
                    count
                )
            }
            Self::InvalidFingerprintSize { bits } => {
                write!(
                    f,
                    "Invalid fingerprint size: {} bits. Must be in range [1, 64].",
                    bits
                )
            }
            Self::InvalidBucketLayout {
                num_buckets,
                bucket_size,
            } => {
                write!(
                    f,
                    "Invalid bucket layout: {} buckets of {} slots. Both must be greater than 0.",
                    num_buckets, bucket_size
                )
            }
            Self::InvalidFilterSize { size } => {
                write!(
                    f,
                    "Filter of {} bits cannot be allocated.",
                    size
                )
            }
            Self::InvalidKmerLength { k } => {
                write!(f, "Invalid k-mer length: {}. Must be greater than 0.", k)
            }
            Self::ThetaOutOfBounds { theta } => {
                write!(
                    f,
                    "Query threshold {} is out of bounds. Must be in range [0, 1].",
                    theta
                )
            }
            Self::ConflictingSizing { manual } => {
                write!(
                    f,
                    "Automatic sizing cannot be combined with manual options ({}).",
                    manual
                )
            }
            Self::IncompatibleFilters { reason } => {
                write!(
                    f,
                    "Filters have different layouts: {}.",
                    reason
                )
            }
            Self::IndexOutOfBounds { index, length } => {
                write!(
                    f,
                    "Bit index {} past the end of a {}-bit vector",
                    index, length
                )
            }
            Self::InternalError { message } => {
                write!(f, "Internal error (this is a bug in sbtree): {}.", message)
            }
        }
    }
}

impl std::error::Error for SbtError {}

impl SbtError {
    /// Generic parameter error.
    ///
    /// # Examples
    /// ```
    /// use sbtree::SbtError;
    ///
    /// let err = SbtError::invalid_parameters(format!("max_iter={} is too small", 0));
    /// assert!(err.to_string().contains("max_iter=0"));
    /// ```
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Probability outside (0, 1).
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Zero expected items.
    #[must_use]
    pub fn invalid_item_count(count: usize) -> Self {
        Self::InvalidItemCount { count }
    }

    /// Create an `InvalidFingerprintSize` error.
    #[must_use]
    pub fn invalid_fingerprint_size(bits: u32) -> Self {
        Self::InvalidFingerprintSize { bits }
    }

    /// Create an `InvalidBucketLayout` error.
    #[must_use]
    pub fn invalid_bucket_layout(num_buckets: usize, bucket_size: usize) -> Self {
        Self::InvalidBucketLayout {
            num_buckets,
            bucket_size,
        }
    }

    /// Unallocatable Bloom size.
    #[must_use]
    pub fn invalid_filter_size(size: usize) -> Self {
        Self::InvalidFilterSize { size }
    }

    /// Create an `InvalidKmerLength` error.
    #[must_use]
    pub fn invalid_kmer_length(k: usize) -> Self {
        Self::InvalidKmerLength { k }
    }

    /// Create a `ThetaOutOfBounds` error.
    #[must_use]
    pub fn theta_out_of_bounds(theta: f64) -> Self {
        Self::ThetaOutOfBounds { theta }
    }

    /// Create a `ConflictingSizing` error.
    #[must_use]
    pub fn conflicting_sizing(manual: impl Into<String>) -> Self {
        Self::ConflictingSizing {
            manual: manual.into(),
        }
    }

    /// Two filters cannot be compared or merged.
    #[must_use]
    pub fn incompatible_filters(reason: impl Into<String>) -> Self {
        Self::IncompatibleFilters {
            reason: reason.into(),
        }
    }

    /// Bit index past the end.
    #[must_use]
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }

    /// Broken internal invariant.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SbtError::fp_rate_out_of_bounds(1.5);
        assert!(err.to_string().contains("1.5"));

        let err = SbtError::invalid_fingerprint_size(65);
        assert!(err.to_string().contains("65 bits"));

        let err = SbtError::theta_out_of_bounds(-0.1);
        assert!(err.to_string().contains("[0, 1]"));

        let err = SbtError::conflicting_sizing("num_buckets");
        assert!(err.to_string().contains("num_buckets"));
    }

    #[test]
    fn test_bucket_layout_message() {
        let err = SbtError::invalid_bucket_layout(0, 4);
        let msg = err.to_string();
        assert!(msg.contains("0 buckets"));
        assert!(msg.contains("4 slots"));
    }

    #[test]
    fn test_error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&SbtError::internal_error("broken link"));
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            SbtError::invalid_kmer_length(0),
            SbtError::InvalidKmerLength { k: 0 }
        );
        assert_ne!(
            SbtError::invalid_item_count(0),
            SbtError::invalid_kmer_length(0)
        );
    }

    #[test]
    fn test_result_propagation() {
        fn inner() -> Result<()> {
            Err(SbtError::invalid_parameters("nope"))
        }
        fn outer() -> Result<u8> {
            inner()?;
            Ok(1)
        }
        assert!(outer().is_err());
    }
}
