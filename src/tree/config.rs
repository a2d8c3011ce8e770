//! Tree configuration.

use crate::builder::FilterConfig;
use crate::error::{Result, SbtError};

/// Query threshold, k-mer length and the configuration every node filter is
/// built from.
///
/// # Examples
///
/// ```
/// use sbtree::builder::FilterConfig;
/// use sbtree::tree::TreeConfig;
///
/// let config = TreeConfig::new(0.5, 3, FilterConfig::bloom(100, 0.01)).unwrap();
/// assert_eq!(config.k, 3);
/// assert!(TreeConfig::new(1.5, 3, FilterConfig::bloom(100, 0.01)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfig {
    /// Fraction of query k-mers a node must contain for descent, in `[0, 1]`.
    pub theta: f64,
    /// K-mer length, at least 1.
    pub k: usize,
    /// Node filter configuration.
    pub filter: FilterConfig,
}

impl TreeConfig {
    /// Create and validate a configuration.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn new(theta: f64, k: usize, filter: FilterConfig) -> Result<Self> {
        let config = Self { theta, k, filter };
        config.validate()?;
        Ok(config)
    }

    /// Check `theta` and `k`. The filter configuration is checked when the
    /// first node filter is built.
    ///
    /// # Errors
    ///
    /// - [`SbtError::ThetaOutOfBounds`] if `theta` is NaN or outside `[0, 1]`
    /// - [`SbtError::InvalidKmerLength`] if `k == 0`
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.theta) {
            return Err(SbtError::theta_out_of_bounds(self.theta));
        }
        if self.k == 0 {
            return Err(SbtError::invalid_kmer_length(self.k));
        }
        Ok(())
    }
}
