//! Tree sequence data structures for the coalescent with recombination.
//!
//! A tree sequence compactly represents how a set of sampled chromosomes
//! are related along a genome, as a succession of local genealogical
//! trees separated by recombination breakpoints. This crate owns the
//! columnar [`RecordStore`](record_store::RecordStore) of coalescence
//! records, the [`TreeDiffIterator`](tree_diff::TreeDiffIterator) and
//! [`SparseTreeIterator`](sparse_tree_iter::SparseTreeIterator) that
//! stream local trees across the genome, infinite-sites
//! [mutation placement](mutgen), [haplotype](haplotype) bit-matrix
//! construction, and a self-describing [binary container](persistence).
//!
//! What this crate does *not* do: run the coalescent simulation itself,
//! parse configuration, or expose a command-line interface. Those are the
//! responsibility of callers; this crate consumes already-generated
//! coalescence records and produces iterators and byte buffers.

pub mod error;
pub mod haplotype;
pub mod ids;
pub mod mutgen;
pub mod persistence;
pub mod provenance;
pub mod record;
pub mod record_store;
pub mod sparse_tree;
pub mod sparse_tree_iter;
pub mod test_data;
pub mod tree_diff;

pub use error::{CoalseqError, Result};
pub use haplotype::HaplotypeMatrix;
pub use ids::{Locus, NodeId, Time};
pub use mutgen::{generate_and_install as generate_mutations, MutationGenerator};
pub use record::{CoalescenceRecord, Mutation, RecordOrder};
pub use record_store::RecordStore;
pub use sparse_tree::{SparseTree, TreeFlags};
pub use sparse_tree_iter::SparseTreeIterator;
pub use tree_diff::{EdgeRecord, TreeDiff, TreeDiffIterator};
