//! Fixed-size bit vector backing Bloom filters and packed bucket arrays.
//!
//! # Overview
//!
//! `BitVec` is a bit array backed by `Box<[u64]>`. Besides single-bit access
//! it supports reading and writing fields of up to 64 bits at arbitrary bit
//! offsets, which is what the packed cuckoo storage is built on.
//!
//! All mutation requires `&mut self`. Filters and trees in this crate are
//! single-writer structures, so no atomics are involved.
//!
//! # Memory Layout
//!
//! Bits are packed into 64-bit words in little-endian bit order:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```
//!
//! A field that starts near the end of a word continues in the low bits of
//! the next word.
//!
//! # Examples
//!
//! ```
//! use sbtree::core::bitvec::BitVec;
//!
//! let mut bv = BitVec::new(100).unwrap();
//! bv.set(42);
//! assert!(bv.get(42));
//! assert_eq!(bv.count_ones(), 1);
//!
//! // 12-bit field straddling the first word boundary
//! bv.set_bits(58, 12, 0xABC);
//! assert_eq!(bv.get_bits(58, 12), 0xABC);
//! ```

use crate::error::{Result, SbtError};

/// Fixed-size bit array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    blocks: Box<[u64]>,
    len: usize,
}

#[inline]
const fn low_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

impl BitVec {
    /// Create a bit vector of `num_bits` zero bits.
    ///
    /// # Errors
    ///
    /// [`SbtError::InvalidFilterSize`] if `num_bits == 0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sbtree::core::bitvec::BitVec;
    ///
    /// let bv = BitVec::new(100).unwrap();
    /// assert_eq!(bv.len(), 100);
    /// assert!(BitVec::new(0).is_err());
    /// ```
    pub fn new(num_bits: usize) -> Result<Self> {
        if num_bits == 0 {
            return Err(SbtError::invalid_filter_size(num_bits));
        }

        let num_blocks = (num_bits + 63) / 64;
        Ok(Self {
            blocks: vec![0u64; num_blocks].into_boxed_slice(),
            len: num_bits,
        })
    }

    /// Number of bits in the vector.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for a successfully constructed vector.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set a bit to 1.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`, matching slice indexing.
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.check_index(index);
        self.blocks[index / 64] |= 1u64 << (index % 64);
    }

    /// Clear a bit to 0.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn clear_bit(&mut self, index: usize) {
        self.check_index(index);
        self.blocks[index / 64] &= !(1u64 << (index % 64));
    }

    /// Read a bit.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.check_index(index);
        (self.blocks[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Read a `width`-bit field starting at bit `start`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=64` or the field extends past `len`.
    #[must_use]
    #[inline]
    pub fn get_bits(&self, start: usize, width: u32) -> u64 {
        self.check_field(start, width);

        let block = start / 64;
        let offset = start % 64;
        let mut value = self.blocks[block] >> offset;
        if offset + width as usize > 64 {
            value |= self.blocks[block + 1] << (64 - offset);
        }
        value & low_mask(width)
    }

    /// Write the low `width` bits of `value` at bit `start`.
    ///
    /// Bits of `value` above `width` are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=64` or the field extends past `len`.
    #[inline]
    pub fn set_bits(&mut self, start: usize, width: u32, value: u64) {
        self.check_field(start, width);

        let mask = low_mask(width);
        let value = value & mask;
        let block = start / 64;
        let offset = start % 64;

        self.blocks[block] = (self.blocks[block] & !(mask << offset)) | (value << offset);
        let end = offset + width as usize;
        if end > 64 {
            let spill = low_mask((end - 64) as u32);
            self.blocks[block + 1] = (self.blocks[block + 1] & !spill) | (value >> (64 - offset));
        }
    }

    /// Reset every bit to 0.
    pub fn clear(&mut self) {
        self.blocks.iter_mut().for_each(|block| *block = 0);
    }

    /// Number of bits set to 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use sbtree::core::bitvec::BitVec;
    ///
    /// let mut bv = BitVec::new(100).unwrap();
    /// bv.set(0);
    /// bv.set(50);
    /// bv.set(99);
    /// assert_eq!(bv.count_ones(), 3);
    /// ```
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| block.count_ones() as usize)
            .sum()
    }

    /// Heap plus inline bytes held by this vector.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.blocks.len() * std::mem::size_of::<u64>() + std::mem::size_of::<Self>()
    }

    /// OR `other` into `self` in place.
    ///
    /// # Errors
    ///
    /// [`SbtError::IncompatibleFilters`] if the lengths differ.
    pub fn union_with(&mut self, other: &Self) -> Result<()> {
        self.check_same_len(other)?;
        for (a, b) in self.blocks.iter_mut().zip(other.blocks.iter()) {
            *a |= *b;
        }
        Ok(())
    }

    /// Number of positions where `self` and `other` differ (popcount of XOR).
    ///
    /// # Errors
    ///
    /// [`SbtError::IncompatibleFilters`] if the lengths differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use sbtree::core::bitvec::BitVec;
    ///
    /// let mut a = BitVec::new(64).unwrap();
    /// let mut b = BitVec::new(64).unwrap();
    /// a.set(1);
    /// a.set(2);
    /// b.set(2);
    /// b.set(3);
    /// assert_eq!(a.hamming_distance(&b).unwrap(), 2);
    /// ```
    pub fn hamming_distance(&self, other: &Self) -> Result<usize> {
        self.check_same_len(other)?;
        Ok(self
            .blocks
            .iter()
            .zip(other.blocks.iter())
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum())
    }

    fn check_same_len(&self, other: &Self) -> Result<()> {
        if self.len != other.len {
            return Err(SbtError::incompatible_filters(format!(
                "BitVec size mismatch: {} vs {}",
                self.len, other.len
            )));
        }
        Ok(())
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "BitVec index out of bounds: index={} len={}",
            index,
            self.len
        );
    }

    #[inline]
    fn check_field(&self, start: usize, width: u32) {
        assert!(
            (1..=64).contains(&width),
            "BitVec field width must be in 1..=64, got {}",
            width
        );
        assert!(
            start + width as usize <= self.len,
            "BitVec field out of bounds: start={} width={} len={}",
            start,
            width,
            self.len
        );
    }
}
