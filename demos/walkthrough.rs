//! End-to-end walkthrough: build a record store, stream its local trees,
//! scatter mutations, derive haplotypes, then round-trip the whole thing
//! through the binary container.
//!
//! Run with `cargo run --example walkthrough`.

use coalseq::{HaplotypeMatrix, RecordStore, SparseTreeIterator, TreeFlags};
use streaming_iterator::StreamingIterator;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let (records, sample_size, num_loci) = coalseq::test_data::random_single_tree(8, 10_000, 42);
    let mut store = RecordStore::new(records, sample_size, num_loci)?;
    log::info!(
        "built a record store with {} records over {} samples, {} loci",
        store.get_num_records(),
        sample_size,
        num_loci
    );

    coalseq::generate_mutations(&mut store, 0.001, 42)?;
    log::info!("placed {} mutations", store.mutations().len());

    let mut it = SparseTreeIterator::new(&store, TreeFlags::COUNT_LEAVES, &[])?;
    while let Some(tree) = it.next() {
        println!(
            "tree over [{}, {}): root = {:?}, num_leaves[root] = {}",
            tree.interval().0 .0,
            tree.interval().1 .0,
            tree.root(),
            tree.get_num_leaves(tree.root())?
        );
    }

    let haplotypes = HaplotypeMatrix::generate(&store)?;
    println!(
        "{} segregating sites across {} samples",
        haplotypes.num_mutations(),
        sample_size
    );
    for sample in 1..=sample_size.min(3) {
        println!(
            "  sample {}: {}",
            sample,
            haplotypes.get_haplotype(coalseq::NodeId(sample))?
        );
    }

    let path = std::env::temp_dir().join("coalseq-walkthrough.coalseq");
    coalseq::persistence::dump(&store, &path, true)?;
    let reloaded = coalseq::persistence::load(&path)?;
    assert_eq!(reloaded.get_num_records(), store.get_num_records());
    println!("round-tripped through {}", path.display());
    std::fs::remove_file(&path).ok();

    Ok(())
}
