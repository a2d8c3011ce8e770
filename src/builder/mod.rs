//! Builders and configuration for filter construction.
//!
//! ```text
//! builder/
//! ├── bloom.rs   - type-state BloomFilterBuilder
//! ├── config.rs  - FilterConfig, shared sizing options
//! └── cuckoo.rs  - CuckooFilterBuilder over FilterConfig
//! ```
//!
//! # Error Handling
//!
//! - **Compile-time errors**: missing required Bloom parameters
//! - **Runtime errors**: out-of-range values and conflicting sizing modes,
//!   reported by `build()`
//!
//! # Builder Comparison
//!
//! | Builder | Required Parameters | Key Optional Parameters |
//! |---------|---------------------|-------------------------|
//! | Bloom | items, fp_rate | hasher |
//! | Cuckoo | none | auto sizing, layout, max_iter, stash, seed |

#![allow(clippy::module_name_repetitions)]

pub mod bloom;
pub mod config;
pub mod cuckoo;

pub use bloom::BloomFilterBuilder;
pub use config::FilterConfig;
pub use cuckoo::CuckooFilterBuilder;
