//! Build Bloom and cuckoo similarity trees over a handful of sequences and
//! query them at several thresholds.
//!
//! Run with: cargo run --example kmer_search

use sbtree::prelude::*;

const K: usize = 5;

fn datasets() -> Vec<Dataset> {
    let reads = [
        ("sample_a.fq", "a-1", "ACGTTGCATGCAGTCAGGTACCATG"),
        ("sample_a.fq", "a-2", "TTGCATGCAGTCAGGTACGGATCCA"),
        ("sample_b.fq", "b-1", "GGGCCCAAATTTGGGCCCAAATTTG"),
        ("sample_c.fq", "c-1", "ACGTTGCATGCAGTCATTTTTTTTT"),
        ("sample_d.fq", "d-1", "CATCATCATCATGAGAGAGAGATAT"),
    ];

    let mut by_file: Vec<Vec<Read>> = Vec::new();
    for (file, id, seq) in reads {
        let read = Read::new(file, id, seq, "I".repeat(seq.len()));
        match by_file.iter_mut().find(|group| group[0].filename == file) {
            Some(group) => group.push(read),
            None => by_file.push(vec![read]),
        }
    }
    by_file.into_iter().filter_map(Dataset::from_reads).collect()
}

fn report<F: NodeFilter>(name: &str, tree: &SimilarityTree<F>, query: &str) {
    let stats = tree.stats();
    println!(
        "{}: {} nodes, depth {}, {} bytes of filters",
        name, stats.total_nodes, stats.depth, stats.memory_usage
    );
    let (hits, query_stats) = tree.query_with_stats(query);
    println!(
        "  theta {:.2}: {:?} (visited {}, pruned {})",
        tree.config().theta,
        hits,
        query_stats.visited,
        query_stats.pruned
    );
}

fn main() -> sbtree::Result<()> {
    let datasets = datasets();
    let query = "TGCATGCAGTCAGG";

    println!("Query {} ({} k-mers of length {})\n", query, query.len() + 1 - K, K);

    for theta in [0.3, 0.7, 1.0] {
        let mut bloom = BloomTree::new(TreeConfig::new(theta, K, FilterConfig::bloom(500, 0.01))?)?;
        let cuckoo_config = FilterConfig::auto(500, 0.01).with_seed(42);
        let mut cuckoo = CuckooTree::new(TreeConfig::new(theta, K, cuckoo_config.clone())?)?;
        let mut packed = CuckooBitTree::new(TreeConfig::new(theta, K, cuckoo_config)?)?;

        for dataset in &datasets {
            bloom.insert(dataset)?;
            cuckoo.insert(dataset)?;
            packed.insert(dataset)?;
        }

        report("bloom tree", &bloom, query);
        report("cuckoo tree", &cuckoo, query);
        report("packed cuckoo tree", &packed, query);
        println!();
    }

    Ok(())
}
