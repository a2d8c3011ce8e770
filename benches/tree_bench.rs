//! Similarity tree benchmarks
//!
//! 1. **Construction**: inserting N datasets into Bloom, cuckoo and
//!    bit-packed cuckoo trees
//! 2. **Query by theta**: how pruning strength affects query time
//! 3. **Query length**: cost growth with the number of query k-mers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sbtree::builder::FilterConfig;
use sbtree::dataset::Dataset;
use sbtree::tree::{BloomTree, CuckooBitTree, CuckooTree, NodeFilter, SimilarityTree, TreeConfig};

mod common;
use common::*;

const SEQ_LEN: usize = 200;

fn bloom_config(theta: f64) -> TreeConfig {
    TreeConfig::new(theta, K, FilterConfig::bloom(10_000, 0.01)).unwrap()
}

fn cuckoo_config(theta: f64) -> TreeConfig {
    TreeConfig::new(theta, K, FilterConfig::auto(10_000, 0.01).with_seed(7)).unwrap()
}

fn build<F: NodeFilter>(config: TreeConfig, datasets: &[Dataset]) -> SimilarityTree<F> {
    let mut tree = SimilarityTree::new(config).unwrap();
    for dataset in datasets {
        tree.insert(dataset).unwrap();
    }
    tree
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_construction");
    group.sample_size(20);

    for count in [8usize, 32, 64] {
        let datasets = generate_datasets(count, SEQ_LEN, 1);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("bloom", count), &datasets, |b, datasets| {
            b.iter(|| build::<sbtree::BloomFilter>(bloom_config(0.8), black_box(datasets)));
        });
        group.bench_with_input(BenchmarkId::new("cuckoo", count), &datasets, |b, datasets| {
            b.iter(|| build::<sbtree::CuckooFilter>(cuckoo_config(0.8), black_box(datasets)));
        });
        group.bench_with_input(BenchmarkId::new("cuckoo_bit", count), &datasets, |b, datasets| {
            b.iter(|| build::<sbtree::CuckooFilterBit>(cuckoo_config(0.8), black_box(datasets)));
        });
    }

    group.finish();
}

fn bench_query_by_theta(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_query_by_theta");
    let datasets = generate_datasets(64, SEQ_LEN, 2);
    let query = &datasets[17].reads[0].sequence[40..140];

    for theta in [0.0, 0.5, 0.9] {
        let bloom: BloomTree = build(bloom_config(theta), &datasets);
        let cuckoo: CuckooTree = build(cuckoo_config(theta), &datasets);
        let bit: CuckooBitTree = build(cuckoo_config(theta), &datasets);

        group.bench_function(BenchmarkId::new("bloom", theta), |b| {
            b.iter(|| bloom.query(black_box(query)));
        });
        group.bench_function(BenchmarkId::new("cuckoo", theta), |b| {
            b.iter(|| cuckoo.query(black_box(query)));
        });
        group.bench_function(BenchmarkId::new("cuckoo_bit", theta), |b| {
            b.iter(|| bit.query(black_box(query)));
        });
    }

    group.finish();
}

fn bench_query_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_query_length");
    let datasets = generate_datasets(32, SEQ_LEN, 3);
    let tree: BloomTree = build(bloom_config(0.7), &datasets);
    let sequence = &datasets[5].reads[0].sequence;

    for len in [25usize, 50, 100, 200] {
        let query = &sequence[..len];
        group.throughput(Throughput::Elements((len + 1 - K) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), query, |b, query| {
            b.iter(|| tree.query_with_stats(black_box(query)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_construction, bench_query_by_theta, bench_query_length);
criterion_main!(benches);
