use coalseq::{NodeId, RecordOrder, RecordStore, SparseTreeIterator, TreeDiffIterator, TreeFlags};
use streaming_iterator::StreamingIterator;

mod common {
    pub use coalseq::test_data::*;
}

#[test]
fn intervals_are_contiguous_and_cover_the_genome() {
    let (records, sample_size, num_loci) = common::three_samples_two_intervals();
    let store = RecordStore::new(records, sample_size, num_loci).unwrap();
    let mut it = TreeDiffIterator::new(&store);
    let mut covered = 0u32;
    let mut last_end = 0u32;
    while let Some(d) = it.next() {
        assert_eq!(d.left, last_end);
        covered += d.span;
        last_end = d.left + d.span;
    }
    assert_eq!(covered, num_loci);
    assert_eq!(last_end, num_loci);
}

#[test]
fn every_sample_reaches_root_in_every_tree() {
    let (records, sample_size, num_loci) = common::three_samples_two_intervals();
    let store = RecordStore::new(records, sample_size, num_loci).unwrap();
    let mut it = SparseTreeIterator::new(&store, TreeFlags::COUNT_LEAVES, &[]).unwrap();
    while let Some(tree) = it.next() {
        for s in 1..=sample_size {
            let mut u = NodeId(s);
            let mut steps = 0;
            while u != tree.root() {
                u = tree.parent(u).unwrap();
                steps += 1;
                assert!(steps <= sample_size, "cycle detected reaching root");
            }
        }
        assert_eq!(tree.get_num_leaves(tree.root()).unwrap(), sample_size);
    }
}

#[test]
fn leaf_count_consistency_with_and_without_incremental_counting() {
    let (records, sample_size, num_loci) = common::three_samples_two_intervals();
    let store = RecordStore::new(records, sample_size, num_loci).unwrap();

    let mut counting = SparseTreeIterator::new(&store, TreeFlags::COUNT_LEAVES, &[]).unwrap();
    let mut naive = SparseTreeIterator::new(&store, TreeFlags::empty(), &[]).unwrap();

    let mut counting_trees = 0;
    while let Some(tree) = counting.next() {
        counting_trees += 1;
        let root = tree.root();
        assert_eq!(tree.get_num_leaves(root).unwrap(), sample_size);
    }

    let mut naive_trees = 0;
    while let Some(tree) = naive.next() {
        naive_trees += 1;
        let root = tree.root();
        // Leaf counting here falls back to an O(subtree) DFS since
        // TreeFlags::COUNT_LEAVES is not set; it must still agree with the
        // incremental value the other iterator maintains.
        assert_eq!(tree.get_num_leaves(root).unwrap(), sample_size);
    }

    assert_eq!(counting_trees, naive_trees);
}

#[test]
fn tree_diff_edge_counts_match_sparse_tree_transitions() {
    let (records, sample_size, num_loci) = common::three_samples_two_intervals();
    let store = RecordStore::new(records, sample_size, num_loci).unwrap();

    let mut diff_it = TreeDiffIterator::new(&store);
    let mut sparse_it = SparseTreeIterator::new(&store, TreeFlags::COUNT_LEAVES, &[]).unwrap();

    while let (Some(diff), Some(tree)) = (diff_it.next(), sparse_it.next()) {
        assert_eq!(diff.span, tree.interval().1 .0 - tree.interval().0 .0);
        for e in &diff.edges_in {
            assert_eq!(tree.parent(e.children[0]).unwrap(), e.node);
            assert_eq!(tree.parent(e.children[1]).unwrap(), e.node);
        }
    }
}

#[test]
fn mrca_of_samples_under_shared_root() {
    let (records, sample_size, num_loci) = common::two_samples_one_record();
    let store = RecordStore::new(records, sample_size, num_loci).unwrap();
    let mut it = SparseTreeIterator::new(&store, TreeFlags::COUNT_LEAVES, &[]).unwrap();
    let tree = it.next().unwrap();
    assert_eq!(tree.parent(NodeId(1)).unwrap(), NodeId(3));
    assert_eq!(tree.parent(NodeId(2)).unwrap(), NodeId(3));
}

#[test]
fn get_record_rejects_out_of_bounds_and_bad_time() {
    let (records, sample_size, num_loci) = common::two_samples_one_record();
    let store = RecordStore::new(records, sample_size, num_loci).unwrap();
    assert!(store.get_record(5, RecordOrder::Time).is_err());
}

#[test]
fn boundary_single_record_full_span_is_one_tree() {
    let (records, sample_size, num_loci) = common::two_samples_one_record();
    let store = RecordStore::new(records, sample_size, num_loci).unwrap();
    let mut it = TreeDiffIterator::new(&store);
    let mut n = 0;
    while let Some(d) = it.next() {
        n += 1;
        assert_eq!(d.span, num_loci);
    }
    assert_eq!(n, 1);
}
