//! Similarity tree scenarios for every node filter kind.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sbtree::builder::FilterConfig;
use sbtree::dataset::{Dataset, Read};
use sbtree::tree::{
    BloomTree, CuckooBitTree, CuckooTree, NodeFilter, SimilarityTree, StashedCuckooTree,
    TreeConfig,
};

fn bloom_config(theta: f64, k: usize) -> TreeConfig {
    TreeConfig::new(theta, k, FilterConfig::bloom(1000, 0.01)).unwrap()
}

fn cuckoo_config(theta: f64, k: usize) -> TreeConfig {
    TreeConfig::new(theta, k, FilterConfig::manual(128, 16, 4).with_seed(21)).unwrap()
}

fn random_sequence(rng: &mut ChaCha8Rng, len: usize) -> String {
    (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)] as char).collect()
}

fn build_tree<F: NodeFilter>(config: TreeConfig, sequences: &[String]) -> SimilarityTree<F> {
    let mut tree = SimilarityTree::new(config).unwrap();
    for (i, seq) in sequences.iter().enumerate() {
        tree.insert(&Dataset::from_sequence(format!("ds{}", i), seq.as_str()))
            .unwrap();
    }
    tree
}

#[test]
fn test_single_dataset_query() {
    let mut tree = BloomTree::new(bloom_config(0.5, 3)).unwrap();
    let leaf = tree.insert(&Dataset::from_sequence("gcgt", "GCGT")).unwrap();
    assert_eq!(tree.root(), Some(leaf));
    assert_eq!(tree.query("GCGT"), ["gcgt"]);
    assert_eq!(tree.query("AAAA"), Vec::<String>::new());
    assert_eq!(tree.contains("GCGT"), tree.query("GCGT"));
}

#[test]
fn test_two_disjoint_datasets() {
    let mut tree = BloomTree::new(bloom_config(0.5, 3)).unwrap();
    tree.insert(&Dataset::from_sequence("abcd", "ABCD")).unwrap();
    tree.insert(&Dataset::from_sequence("efgh", "EFGH")).unwrap();

    let root = tree.node(tree.root().unwrap()).unwrap();
    assert_eq!(root.dataset_id(), None);
    assert_eq!(root.children().len(), 2);
    for &child in root.children() {
        let child = tree.node(child).unwrap();
        assert!(child.is_leaf());
        assert!(child.dataset_id().is_some());
    }
    assert_eq!(tree.query("ABCD"), ["abcd"]);
    assert_eq!(tree.query("EFGH"), ["efgh"]);
    tree.validate_structure().unwrap();
}

#[test]
fn test_empty_tree_query() {
    let tree = CuckooTree::new(cuckoo_config(0.5, 3)).unwrap();
    assert!(tree.query("ACGT").is_empty());
    assert!(tree.root().is_none());
}

#[test]
fn test_query_shorter_than_k_matches_everything() {
    let mut tree = CuckooBitTree::new(cuckoo_config(0.9, 5)).unwrap();
    tree.insert(&Dataset::from_sequence("a", "ACGTACGT")).unwrap();
    tree.insert(&Dataset::from_sequence("b", "TTTTTTTT")).unwrap();
    // Zero query k-mers: 0 >= theta * 0 holds everywhere
    assert_eq!(tree.query("ACG"), ["a", "b"]);
}

#[test]
fn test_structure_invariants_hold() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let sequences: Vec<String> = (0..12).map(|_| random_sequence(&mut rng, 30)).collect();

    let bloom: BloomTree = build_tree(bloom_config(0.5, 4), &sequences);
    let cuckoo: CuckooTree = build_tree(cuckoo_config(0.5, 4), &sequences);
    let bit: CuckooBitTree = build_tree(cuckoo_config(0.5, 4), &sequences);

    for (node_count, leaf_count, result) in [
        (bloom.node_count(), bloom.leaf_count(), bloom.validate_structure()),
        (cuckoo.node_count(), cuckoo.leaf_count(), cuckoo.validate_structure()),
        (bit.node_count(), bit.leaf_count(), bit.validate_structure()),
    ] {
        result.unwrap();
        assert_eq!(leaf_count, 12);
        assert_eq!(node_count, 23);
    }
}

#[test]
fn test_every_dataset_finds_itself() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let sequences: Vec<String> = (0..10).map(|_| random_sequence(&mut rng, 40)).collect();
    let bloom: BloomTree = build_tree(bloom_config(1.0, 5), &sequences);
    let cuckoo: CuckooBitTree = build_tree(cuckoo_config(1.0, 5), &sequences);

    for (i, seq) in sequences.iter().enumerate() {
        let id = format!("ds{}", i);
        assert!(bloom.query(seq).contains(&id), "bloom missed {}", id);
        assert!(cuckoo.query(seq).contains(&id), "cuckoo missed {}", id);
    }
}

#[test]
fn test_query_monotone_in_theta() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let base = random_sequence(&mut rng, 40);
    // Datasets overlapping the base by varying amounts
    let sequences: Vec<String> = (0..8)
        .map(|i| {
            let keep = 40 - i * 5;
            format!("{}{}", &base[..keep], random_sequence(&mut rng, 40 - keep))
        })
        .collect();
    let tree: CuckooTree = build_tree(cuckoo_config(0.0, 4), &sequences);

    let thetas = [0.0, 0.3, 0.6, 0.9, 1.0];
    let results: Vec<Vec<String>> = thetas
        .iter()
        .map(|&theta| {
            let mut config = tree.config().clone();
            config.theta = theta;
            let retuned: CuckooTree = build_tree(config, &sequences);
            retuned.query(&base)
        })
        .collect();

    for pair in results.windows(2) {
        for id in &pair[1] {
            assert!(pair[0].contains(id), "{} lost when lowering theta", id);
        }
    }
    assert_eq!(results[0].len(), 8);
    assert!(results[4].contains(&"ds0".to_string()));
}

#[test]
fn test_similar_datasets_share_a_subtree() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let family_a = random_sequence(&mut rng, 60);
    let family_b = random_sequence(&mut rng, 60);
    let sequences = vec![
        family_a.clone(),
        family_b.clone(),
        format!("{}{}", &family_a[..50], random_sequence(&mut rng, 10)),
    ];
    let tree: BloomTree = build_tree(bloom_config(0.5, 5), &sequences);

    // ds2 descends next to ds0, not ds1
    let (_, ds2) = tree
        .nodes()
        .find(|(_, node)| node.dataset_id() == Some("ds2"))
        .unwrap();
    let parent = tree.node(ds2.parent().unwrap()).unwrap();
    let siblings: Vec<Option<&str>> = parent
        .children()
        .iter()
        .map(|&c| tree.node(c).unwrap().dataset_id())
        .collect();
    assert_eq!(siblings, [Some("ds0"), Some("ds2")]);
}

#[test]
fn test_read_level_datasets() {
    let reads = [
        Read::new("run1.fq", "read-1", "ACGTTGCAAC", "IIIIIIIIII"),
        Read::new("run1.fq", "read-2", "GGGCCCAAAT", "IIIIIIIIII"),
    ];
    let mut tree = BloomTree::new(bloom_config(0.8, 4)).unwrap();
    for read in &reads {
        tree.insert(&Dataset::from_read(read.clone())).unwrap();
    }
    assert_eq!(tree.query("TTGCAAC"), ["read-1"]);
    assert_eq!(tree.query("GCCCAAA"), ["read-2"]);

    let grouped = Dataset::from_reads(reads.to_vec()).unwrap();
    let mut file_tree = BloomTree::new(bloom_config(0.8, 4)).unwrap();
    file_tree.insert(&grouped).unwrap();
    assert_eq!(file_tree.query("TTGCAAC"), ["run1.fq"]);
}

#[test]
fn test_stashed_tree_absorbs_overflow() {
    let filter = FilterConfig::manual(2, 16, 2).with_stash(32).with_seed(5);
    let mut tree = StashedCuckooTree::new(TreeConfig::new(1.0, 3, filter).unwrap()).unwrap();
    tree.insert(&Dataset::from_sequence("long", "ACGTTGCATGCAGTCA")).unwrap();
    tree.insert(&Dataset::from_sequence("other", "TTTTGGGGCCCCAAAA")).unwrap();

    assert_eq!(tree.stats().rejected_kmers, 0);
    assert!(tree.query("ACGTTGCATGCAGTCA").contains(&"long".to_string()));
    assert!(tree.query("TTTTGGGGCCCCAAAA").contains(&"other".to_string()));
}

#[test]
fn test_stats_and_aggregate_size() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let sequences: Vec<String> = (0..5).map(|_| random_sequence(&mut rng, 20)).collect();
    let tree: CuckooTree = build_tree(cuckoo_config(0.5, 3), &sequences);
    let stats = tree.stats();
    assert_eq!(stats.total_nodes, 9);
    assert_eq!(stats.leaf_count, 5);
    assert!(stats.depth >= 3 && stats.depth <= 5);
    assert!(stats.memory_usage > 0);
    assert!(tree.aggregate_size() >= stats.memory_usage);
    assert_eq!(stats.aggregate_size, tree.aggregate_size());
}

#[test]
fn test_invalid_tree_configs() {
    assert!(TreeConfig::new(-0.5, 3, FilterConfig::bloom(10, 0.1)).is_err());
    assert!(TreeConfig::new(0.5, 0, FilterConfig::bloom(10, 0.1)).is_err());

    let mut conflicting = FilterConfig::auto(100, 0.01);
    conflicting.fp_size = Some(8);
    let config = TreeConfig::new(0.5, 3, conflicting).unwrap();
    assert!(CuckooTree::new(config).is_err());

    // A stash only applies to stashed node filters
    let stashed = FilterConfig::manual(16, 16, 4).with_stash(8);
    let config = TreeConfig::new(0.5, 3, stashed).unwrap();
    assert!(CuckooBitTree::new(config.clone()).is_err());
    assert!(StashedCuckooTree::new(config).is_ok());
}
