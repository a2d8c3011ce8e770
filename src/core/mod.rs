//! Core types, traits, and utilities shared by every filter.
//!
//! - **Traits**: [`MembershipFilter`], [`DeletableFilter`]
//! - **Data Structures**: [`BitVec`]
//! - **Utilities**: Bloom and Cuckoo parameter calculation
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── filter.rs    - Trait definitions
//! ├── bitvec.rs    - Bit vector with field access
//! ├── params.rs    - Parameter calculations
//! └── mod.rs       - This file (public API)
//! ```

pub mod bitvec;
pub mod filter;
pub mod params;

pub use bitvec::BitVec;
pub use filter::{DeletableFilter, MembershipFilter};
pub use params::CuckooParams;
