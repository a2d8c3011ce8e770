//! Shared data generators for the benchmarks
//!
//! All generators are seeded so runs are comparable.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sbtree::dataset::Dataset;

/// Filter sizes exercised by size-scaling benchmarks
pub const SIZES: &[usize] = &[1_000, 10_000, 100_000];

/// K-mer length used throughout
pub const K: usize = 21;

/// Random DNA string of `len` bases
pub fn random_dna(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)] as char).collect()
}

/// `count` random k-mers of length `k`
pub fn generate_kmers(count: usize, k: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| random_dna(&mut rng, k)).collect()
}

/// `count` single-sequence datasets of `len` bases each
pub fn generate_datasets(count: usize, len: usize, seed: u64) -> Vec<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| Dataset::from_sequence(format!("dataset-{}", i), random_dna(&mut rng, len)))
        .collect()
}
