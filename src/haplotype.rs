//! Haplotype bit-matrix generation under the infinite-sites model: each
//! mutation paints a "1" bit onto every sample descended from its node.

use crate::error::{CoalseqError, Result};
use crate::ids::NodeId;
use crate::record_store::RecordStore;
use crate::sparse_tree::TreeFlags;
use crate::sparse_tree_iter::SparseTreeIterator;
use streaming_iterator::StreamingIterator;

const WORD_BITS: usize = 64;

/// A packed bit matrix of `sample_size` rows, one bit per segregating
/// site, in position order.
pub struct HaplotypeMatrix {
    sample_size: u32,
    num_mutations: usize,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl HaplotypeMatrix {
    /// Builds the full haplotype matrix by streaming the sparse tree
    /// iterator once and, for every mutation in position order, marking
    /// every leaf descendant of its node.
    pub fn generate(store: &RecordStore) -> Result<Self> {
        let sample_size = store.get_sample_size();
        let num_mutations = store.get_num_mutations();
        let words_per_row = if num_mutations == 0 {
            1
        } else {
            (num_mutations + WORD_BITS - 1) / WORD_BITS
        };
        let mut bits = vec![0u64; sample_size as usize * words_per_row];

        let mut it = SparseTreeIterator::new(store, TreeFlags::empty(), &[])?;
        let mut site = 0usize;
        let mut stack: Vec<NodeId> = Vec::with_capacity(sample_size as usize + 1);

        while let Some(tree) = it.next() {
            for m in &tree.mutations {
                stack.clear();
                stack.push(m.node);
                while let Some(n) = stack.pop() {
                    if n.0 >= 1 && n.0 <= sample_size {
                        set_bit(&mut bits, words_per_row, n.0 as usize - 1, site);
                    }
                    if let Some(c) = tree.children_of(n) {
                        for child in c {
                            if !child.is_null() {
                                stack.push(child);
                            }
                        }
                    }
                }
                site += 1;
            }
        }

        debug_assert_eq!(site, num_mutations);

        Ok(HaplotypeMatrix {
            sample_size,
            num_mutations,
            words_per_row,
            bits,
        })
    }

    pub fn num_mutations(&self) -> usize {
        self.num_mutations
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    /// Returns the `'0'`/`'1'` genotype string for `sample_id` (`1..=sample_size`).
    pub fn get_haplotype(&self, sample_id: NodeId) -> Result<String> {
        if sample_id.0 < 1 || sample_id.0 > self.sample_size {
            return Err(CoalseqError::OutOfBounds(format!(
                "sample id {} out of [1, {}]",
                sample_id.0, self.sample_size
            )));
        }
        let row = sample_id.0 as usize - 1;
        let mut s = String::with_capacity(self.num_mutations);
        for site in 0..self.num_mutations {
            let word = self.bits[row * self.words_per_row + site / WORD_BITS];
            let bit = (word >> (site % WORD_BITS)) & 1;
            s.push(if bit == 1 { '1' } else { '0' });
        }
        Ok(s)
    }
}

fn set_bit(bits: &mut [u64], words_per_row: usize, row: usize, site: usize) {
    let word_idx = row * words_per_row + site / WORD_BITS;
    bits[word_idx] |= 1u64 << (site % WORD_BITS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{Locus as L, Time as T};
    use crate::record::{CoalescenceRecord, Mutation};

    fn rec(left: u32, right: u32, node: u32, c0: u32, c1: u32, time: f64) -> CoalescenceRecord {
        CoalescenceRecord {
            left: L(left),
            right: L(right),
            node: NodeId(node),
            children: [NodeId(c0), NodeId(c1)],
            time: T(time),
        }
    }

    #[test]
    fn mutation_on_internal_edge_marks_both_samples() {
        let mut store = RecordStore::new(vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10).unwrap();
        store
            .set_mutations(vec![Mutation { position: 2.5, node: NodeId(3) }])
            .unwrap();
        let hg = HaplotypeMatrix::generate(&store).unwrap();
        assert_eq!(hg.get_haplotype(NodeId(1)).unwrap(), "1");
        assert_eq!(hg.get_haplotype(NodeId(2)).unwrap(), "1");
    }

    #[test]
    fn mutation_on_leaf_edge_marks_one_sample() {
        let mut store = RecordStore::new(vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10).unwrap();
        store
            .set_mutations(vec![Mutation { position: 7.0, node: NodeId(1) }])
            .unwrap();
        let hg = HaplotypeMatrix::generate(&store).unwrap();
        assert_eq!(hg.get_haplotype(NodeId(1)).unwrap(), "1");
        assert_eq!(hg.get_haplotype(NodeId(2)).unwrap(), "0");
    }

    #[test]
    fn zero_mutations_yields_empty_haplotypes() {
        let store = RecordStore::new(vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10).unwrap();
        let hg = HaplotypeMatrix::generate(&store).unwrap();
        assert_eq!(hg.get_haplotype(NodeId(1)).unwrap(), "");
    }

    #[test]
    fn out_of_bounds_sample_errors() {
        let store = RecordStore::new(vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10).unwrap();
        let hg = HaplotypeMatrix::generate(&store).unwrap();
        assert!(hg.get_haplotype(NodeId(3)).is_err());
    }
}
