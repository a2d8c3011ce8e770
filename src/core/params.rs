//! Parameter calculation for Bloom and Cuckoo filters.
//!
//! # Bloom filters
//!
//! Given `n` expected elements and a target false positive rate `ε`:
//!
//! - `m = ⌈-n × ln(ε) / (ln 2)²⌉` bits
//! - `k = ⌊(m/n) × ln 2⌋` hash rounds, at least one
//!
//! # Cuckoo filters
//!
//! Auto-sizing from `(n, ε)` picks the slots per bucket first, then the
//! fingerprint width, then the bucket count:
//!
//! - `b = 4` when `ε > 0.002`, otherwise `b = 8`
//! - `f = ⌈log2(1/ε) + log2(2b)⌉`
//! - `buckets = ⌈⌈n / α(b)⌉ / b⌉` where `α(b)` is the load factor a table
//!   with `b` slots per bucket reaches before insertions start failing
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Fan, Andersen, Kaminsky, Mitzenmacher (2014). "Cuckoo Filter: Practically Better Than Bloom"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{Result, SbtError};
use std::f64::consts::LN_2;

/// (ln 2)² ≈ 0.4804530139182014
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Widest fingerprint a slot can hold.
pub const MAX_FINGERPRINT_BITS: u32 = 64;

/// False positive rate above which auto-sizing picks 4 slots per bucket.
pub const SMALL_BUCKET_FP_THRESHOLD: f64 = 0.002;

/// Calculate the number of bits for a Bloom filter.
///
/// Implements `m = ⌈-n × ln(ε) / (ln 2)²⌉`.
///
/// # Errors
///
/// - [`SbtError::InvalidItemCount`] if `n == 0`
/// - [`SbtError::FalsePositiveRateOutOfBounds`] if `fp_rate` not in (0, 1)
/// - [`SbtError::InvalidParameters`] if the result exceeds system limits
///
/// # Examples
///
/// ```
/// use sbtree::core::params::optimal_bit_count;
///
/// assert_eq!(optimal_bit_count(1000, 0.01).unwrap(), 9586);
/// assert_eq!(optimal_bit_count(100_000, 0.03).unwrap(), 729_845);
/// ```
pub fn optimal_bit_count(n: usize, fp_rate: f64) -> Result<usize> {
    if n == 0 {
        return Err(SbtError::invalid_item_count(n));
    }
    validate_fp_rate(fp_rate)?;

    let m = (-(n as f64) * fp_rate.ln() / LN2_SQUARED).ceil();
    if m > (usize::MAX / 2) as f64 {
        return Err(SbtError::invalid_parameters(format!(
            "calculated filter size {:.0} exceeds reasonable bounds",
            m
        )));
    }

    Ok((m as usize).max(1))
}

/// Calculate the number of hash rounds for a Bloom filter.
///
/// Implements `k = ⌊(m/n) × ln 2⌋`, never less than one.
///
/// # Errors
///
/// - [`SbtError::InvalidFilterSize`] if `m == 0`
/// - [`SbtError::InvalidItemCount`] if `n == 0`
///
/// # Examples
///
/// ```
/// use sbtree::core::params::optimal_hash_count;
///
/// assert_eq!(optimal_hash_count(9586, 1000).unwrap(), 6);
/// assert_eq!(optimal_hash_count(10, 1000).unwrap(), 1);
/// ```
pub fn optimal_hash_count(m: usize, n: usize) -> Result<usize> {
    if m == 0 {
        return Err(SbtError::invalid_filter_size(m));
    }
    if n == 0 {
        return Err(SbtError::invalid_item_count(n));
    }

    let k = ((m as f64 / n as f64) * LN_2).floor() as usize;
    Ok(k.max(1))
}

/// Expected Bloom false positive rate after `n` insertions.
///
/// Implements `p = (1 - e^(-kn/m))^k`.
///
/// # Errors
///
/// [`SbtError::InvalidFilterSize`] if `m == 0`.
pub fn expected_fp_rate(m: usize, n: usize, k: usize) -> Result<f64> {
    if m == 0 {
        return Err(SbtError::invalid_filter_size(m));
    }
    if n == 0 {
        return Ok(0.0);
    }

    let k_f64 = k as f64;
    let prob_bit_one = 1.0 - (-(k_f64 * n as f64) / m as f64).exp();
    Ok(prob_bit_one.powf(k_f64).clamp(0.0, 1.0))
}

/// Resolved cuckoo table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CuckooParams {
    /// Number of buckets in the table.
    pub num_buckets: usize,
    /// Fingerprint width in bits.
    pub fp_size: u32,
    /// Fingerprint slots per bucket.
    pub bucket_size: usize,
}

impl CuckooParams {
    /// Validate a manually chosen layout.
    ///
    /// # Errors
    ///
    /// - [`SbtError::InvalidBucketLayout`] if either dimension is zero
    /// - [`SbtError::InvalidFingerprintSize`] if `fp_size` is not in `1..=64`
    pub fn new(num_buckets: usize, fp_size: u32, bucket_size: usize) -> Result<Self> {
        if num_buckets == 0 || bucket_size == 0 {
            return Err(SbtError::invalid_bucket_layout(num_buckets, bucket_size));
        }
        validate_fingerprint_size(fp_size)?;
        Ok(Self {
            num_buckets,
            fp_size,
            bucket_size,
        })
    }

    /// Derive a layout from an expected item count and false positive rate.
    ///
    /// # Examples
    ///
    /// ```
    /// use sbtree::core::params::CuckooParams;
    ///
    /// let params = CuckooParams::auto(10_000, 0.01).unwrap();
    /// assert_eq!(params.bucket_size, 4);
    /// assert_eq!(params.fp_size, 10);
    /// assert_eq!(params.num_buckets, 2618);
    /// ```
    ///
    /// # Errors
    ///
    /// - [`SbtError::InvalidItemCount`] if `expected_num == 0`
    /// - [`SbtError::FalsePositiveRateOutOfBounds`] if `fp_prob` not in (0, 1)
    /// - [`SbtError::InvalidFingerprintSize`] if `fp_prob` is so small that
    ///   fingerprints would exceed 64 bits
    pub fn auto(expected_num: usize, fp_prob: f64) -> Result<Self> {
        if expected_num == 0 {
            return Err(SbtError::invalid_item_count(expected_num));
        }
        validate_fp_rate(fp_prob)?;

        let bucket_size = cuckoo_bucket_size(fp_prob);
        let fp_size = cuckoo_fingerprint_size(fp_prob, bucket_size)?;
        let num_buckets = cuckoo_bucket_count(expected_num, bucket_size);
        Self::new(num_buckets, fp_size, bucket_size)
    }

    /// Total fingerprint slots.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.num_buckets * self.bucket_size
    }
}

/// Slots per bucket chosen by auto-sizing.
#[must_use]
pub fn cuckoo_bucket_size(fp_prob: f64) -> usize {
    if fp_prob > SMALL_BUCKET_FP_THRESHOLD {
        4
    } else {
        8
    }
}

/// Achievable load factor for a table with `bucket_size` slots per bucket.
///
/// Values follow the measurements in Fan et al. (2014).
#[must_use]
pub fn cuckoo_load_factor(bucket_size: usize) -> f64 {
    match bucket_size {
        0 | 1 => 0.5,
        2 | 3 => 0.84,
        4..=7 => 0.955,
        _ => 0.98,
    }
}

/// Fingerprint width `⌈log2(1/ε) + log2(2b)⌉`.
///
/// # Errors
///
/// [`SbtError::InvalidFingerprintSize`] if the width falls outside `1..=64`.
pub fn cuckoo_fingerprint_size(fp_prob: f64, bucket_size: usize) -> Result<u32> {
    let bits = ((1.0 / fp_prob).log2() + (2.0 * bucket_size as f64).log2()).ceil();
    if !(1.0..=f64::from(MAX_FINGERPRINT_BITS)).contains(&bits) {
        return Err(SbtError::invalid_fingerprint_size(bits.max(0.0).min(f64::from(u32::MAX)) as u32));
    }
    Ok(bits as u32)
}

/// Bucket count `⌈⌈n / α(b)⌉ / b⌉`.
#[must_use]
pub fn cuckoo_bucket_count(expected_num: usize, bucket_size: usize) -> usize {
    let slots = (expected_num as f64 / cuckoo_load_factor(bucket_size)).ceil();
    ((slots / bucket_size.max(1) as f64).ceil() as usize).max(1)
}

/// Upper bound on the cuckoo false positive rate: `1 - (1 - 2^-f)^(2b)`.
#[must_use]
pub fn cuckoo_fp_rate(fp_size: u32, bucket_size: usize) -> f64 {
    let miss = 1.0 - 0.5_f64.powi(fp_size.min(MAX_FINGERPRINT_BITS) as i32);
    1.0 - miss.powi((2 * bucket_size) as i32)
}

fn validate_fp_rate(fp_rate: f64) -> Result<()> {
    if fp_rate.is_nan() || fp_rate <= 0.0 || fp_rate >= 1.0 {
        return Err(SbtError::fp_rate_out_of_bounds(fp_rate));
    }
    Ok(())
}

pub(crate) fn validate_fingerprint_size(fp_size: u32) -> Result<()> {
    if fp_size == 0 || fp_size > MAX_FINGERPRINT_BITS {
        return Err(SbtError::invalid_fingerprint_size(fp_size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_bit_count() {
        assert_eq!(optimal_bit_count(1000, 0.01).unwrap(), 9586);
        assert_eq!(optimal_bit_count(100_000, 0.03).unwrap(), 729_845);
    }

    #[test]
    fn test_optimal_bit_count_errors() {
        assert!(matches!(
            optimal_bit_count(0, 0.01),
            Err(SbtError::InvalidItemCount { count: 0 })
        ));
        assert!(optimal_bit_count(100, 0.0).is_err());
        assert!(optimal_bit_count(100, 1.0).is_err());
        assert!(optimal_bit_count(100, f64::NAN).is_err());
    }

    #[test]
    fn test_optimal_hash_count_floors() {
        assert_eq!(optimal_hash_count(9586, 1000).unwrap(), 6);
        assert_eq!(optimal_hash_count(729_845, 100_000).unwrap(), 5);
    }

    #[test]
    fn test_optimal_hash_count_minimum_one() {
        assert_eq!(optimal_hash_count(1, 1000).unwrap(), 1);
        assert!(optimal_hash_count(0, 10).is_err());
        assert!(optimal_hash_count(10, 0).is_err());
    }

    #[test]
    fn test_expected_fp_rate() {
        let fp = expected_fp_rate(9586, 1000, 6).unwrap();
        assert!((fp - 0.01).abs() < 0.002);
        assert_eq!(expected_fp_rate(100, 0, 3).unwrap(), 0.0);
    }

    #[test]
    fn test_cuckoo_auto_small_buckets() {
        let params = CuckooParams::auto(10_000, 0.01).unwrap();
        assert_eq!(params.bucket_size, 4);
        assert_eq!(params.fp_size, 10);
        assert_eq!(params.num_buckets, 2618);
        assert_eq!(params.slots(), 10_472);
    }

    #[test]
    fn test_cuckoo_auto_large_buckets() {
        let params = CuckooParams::auto(1000, 0.001).unwrap();
        assert_eq!(params.bucket_size, 8);
        // log2(1000) + log2(16) = 9.97 + 4
        assert_eq!(params.fp_size, 14);
        // ceil(1000 / 0.98) = 1021, ceil(1021 / 8) = 128
        assert_eq!(params.num_buckets, 128);
    }

    #[test]
    fn test_cuckoo_auto_rejects_bad_input() {
        assert!(CuckooParams::auto(0, 0.01).is_err());
        assert!(CuckooParams::auto(10, 0.0).is_err());
        assert!(CuckooParams::auto(10, 1.5).is_err());
        assert!(matches!(
            CuckooParams::auto(10, 1e-30),
            Err(SbtError::InvalidFingerprintSize { .. })
        ));
    }

    #[test]
    fn test_cuckoo_manual_validation() {
        assert!(CuckooParams::new(10, 8, 1).is_ok());
        assert!(CuckooParams::new(0, 8, 1).is_err());
        assert!(CuckooParams::new(10, 8, 0).is_err());
        assert!(CuckooParams::new(10, 0, 4).is_err());
        assert!(CuckooParams::new(10, 65, 4).is_err());
        assert!(CuckooParams::new(10, 64, 4).is_ok());
    }

    #[test]
    fn test_load_factor_table() {
        assert_eq!(cuckoo_load_factor(4), 0.955);
        assert_eq!(cuckoo_load_factor(8), 0.98);
        assert!(cuckoo_load_factor(1) < cuckoo_load_factor(2));
    }

    #[test]
    fn test_cuckoo_fp_rate_bound() {
        let rate = cuckoo_fp_rate(10, 4);
        assert!(rate > 0.0 && rate < 0.01);
        assert!(cuckoo_fp_rate(16, 4) < rate);
    }
}
