//! The columnar coalescence record store: the owning container for a
//! tree sequence's edges and mutations, plus the two sort-order
//! permutations that make left-to-right local-tree maintenance cheap.

use crate::error::{CoalseqError, Result};
use crate::ids::{Locus, NodeId, Time};
use crate::record::{CoalescenceRecord, Mutation, RecordOrder};

/// Columnar storage for a set of coalescence records, indexed by two
/// permutations:
///
/// - `insertion_order`: records sorted by `left` ascending, then `time`
///   ascending. Walking it in order yields edges in child-before-parent
///   order at any fixed `left`.
/// - `removal_order`: records sorted by `right` ascending, then `time`
///   descending. Walking it in order yields edges in parent-before-child
///   order at any fixed `right`.
///
/// Both invariants are what let [`crate::tree_diff::TreeDiffIterator`] and
/// [`crate::sparse_tree_iter::SparseTreeIterator`] update a local tree in
/// amortized constant work per edge change.
#[derive(Debug)]
pub struct RecordStore {
    left: Vec<Locus>,
    right: Vec<Locus>,
    node: Vec<NodeId>,
    children: Vec<[NodeId; 2]>,
    time: Vec<Time>,

    insertion_order: Vec<u32>,
    removal_order: Vec<u32>,

    mutations: Vec<Mutation>,

    sample_size: u32,
    num_loci: u32,
    num_nodes: u32,

    node_time: std::collections::HashMap<u32, f64>,

    mutation_provenance: Option<(u64, f64)>,
}

impl RecordStore {
    /// Builds a record store from a caller-supplied list of coalescence
    /// records plus the simulator-owned scalars `sample_size` and
    /// `num_loci`. Validates the simulator contract (see module docs on
    /// [`crate`]) eagerly, so a store that exists is known-consistent.
    pub fn new(
        records: Vec<CoalescenceRecord>,
        sample_size: u32,
        num_loci: u32,
    ) -> Result<Self> {
        if sample_size < 2 {
            return Err(CoalseqError::BadParamValue(format!(
                "sample_size must be >= 2, got {sample_size}"
            )));
        }
        if num_loci < 1 {
            return Err(CoalseqError::BadParamValue(format!(
                "num_loci must be >= 1, got {num_loci}"
            )));
        }

        let num_records = records.len();
        let mut left = Vec::with_capacity(num_records);
        let mut right = Vec::with_capacity(num_records);
        let mut node = Vec::with_capacity(num_records);
        let mut children = Vec::with_capacity(num_records);
        let mut time = Vec::with_capacity(num_records);

        // Tracks, for every node id seen so far as a parent, the
        // coalescence time it was assigned. Used to validate that a record's
        // time is not less than the times already recorded for its
        // children (each child's own coalescence, if it is itself an
        // internal node).
        let mut node_time: std::collections::HashMap<u32, f64> = std::collections::HashMap::new();
        for i in 1..=sample_size {
            node_time.insert(i, 0.0);
        }

        let mut num_nodes = sample_size;
        let mut prev_node = 0u32;

        for r in &records {
            if r.children[0] == r.children[1] {
                return Err(CoalseqError::BadParamValue(
                    "record children must be distinct".into(),
                ));
            }
            if r.node.0 <= sample_size {
                return Err(CoalseqError::BadParamValue(format!(
                    "record node {} must exceed sample_size {}",
                    r.node.0, sample_size
                )));
            }
            if r.left.0 >= r.right.0 {
                return Err(CoalseqError::BadParamValue(format!(
                    "record left {} must be < right {}",
                    r.left.0, r.right.0
                )));
            }
            if r.right.0 > num_loci {
                return Err(CoalseqError::BadParamValue(format!(
                    "record right {} exceeds num_loci {}",
                    r.right.0, num_loci
                )));
            }
            if r.node.0 < prev_node {
                return Err(CoalseqError::BadOrdering(format!(
                    "record node {} precedes previously seen node {} in time order",
                    r.node.0, prev_node
                )));
            }
            prev_node = r.node.0;
            for c in r.children {
                if c.0 >= r.node.0 {
                    return Err(CoalseqError::BadParamValue(format!(
                        "record child {} must be strictly less than node {}",
                        c.0, r.node.0
                    )));
                }
                if let Some(&ct) = node_time.get(&c.0) {
                    if r.time.0 < ct {
                        return Err(CoalseqError::BadParamValue(format!(
                            "record time {} precedes child {} time {}",
                            r.time.0, c.0, ct
                        )));
                    }
                }
            }
            node_time.insert(r.node.0, r.time.0);
            if r.node.0 > num_nodes {
                num_nodes = r.node.0;
            }

            left.push(r.left);
            right.push(r.right);
            node.push(r.node);
            children.push(r.children);
            time.push(r.time);
        }

        let mut insertion_order: Vec<u32> = (0..num_records as u32).collect();
        insertion_order.sort_unstable_by(|&a, &b| {
            let a = a as usize;
            let b = b as usize;
            left[a]
                .0
                .cmp(&left[b].0)
                .then_with(|| time[a].0.partial_cmp(&time[b].0).unwrap())
        });

        let mut removal_order: Vec<u32> = (0..num_records as u32).collect();
        removal_order.sort_unstable_by(|&a, &b| {
            let a = a as usize;
            let b = b as usize;
            right[a]
                .0
                .cmp(&right[b].0)
                .then_with(|| time[b].0.partial_cmp(&time[a].0).unwrap())
        });

        Ok(RecordStore {
            left,
            right,
            node,
            children,
            time,
            insertion_order,
            removal_order,
            mutations: Vec::new(),
            sample_size,
            num_loci,
            num_nodes,
            node_time,
            mutation_provenance: None,
        })
    }

    /// The coalescence time of `node`. Samples (`1..=sample_size`) are
    /// always `0.0`; internal nodes return the time recorded on their
    /// defining record(s).
    pub(crate) fn time_of_node(&self, node: u32) -> f64 {
        if node <= self.sample_size {
            0.0
        } else {
            *self.node_time.get(&node).unwrap_or(&0.0)
        }
    }

    pub fn get_num_records(&self) -> usize {
        self.left.len()
    }

    pub fn get_sample_size(&self) -> u32 {
        self.sample_size
    }

    pub fn get_num_loci(&self) -> u32 {
        self.num_loci
    }

    pub fn get_num_nodes(&self) -> u32 {
        self.num_nodes
    }

    pub fn get_num_mutations(&self) -> usize {
        self.mutations.len()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Reads record `i` under the requested ordering. `i` indexes into the
    /// permutation for [`RecordOrder::Left`]/[`RecordOrder::Right`], or
    /// directly into storage order for [`RecordOrder::Time`].
    pub fn get_record(&self, i: usize, order: RecordOrder) -> Result<CoalescenceRecord> {
        let idx = match order {
            RecordOrder::Time => {
                if i >= self.get_num_records() {
                    return Err(CoalseqError::OutOfBounds(format!(
                        "record index {i} out of bounds"
                    )));
                }
                i
            }
            RecordOrder::Left => *self.insertion_order.get(i).ok_or_else(|| {
                CoalseqError::OutOfBounds(format!("record index {i} out of bounds"))
            })? as usize,
            RecordOrder::Right => *self.removal_order.get(i).ok_or_else(|| {
                CoalseqError::OutOfBounds(format!("record index {i} out of bounds"))
            })? as usize,
        };
        Ok(CoalescenceRecord {
            left: self.left[idx],
            right: self.right[idx],
            node: self.node[idx],
            children: self.children[idx],
            time: self.time[idx],
        })
    }

    pub(crate) fn insertion_order(&self) -> &[u32] {
        &self.insertion_order
    }

    pub(crate) fn removal_order(&self) -> &[u32] {
        &self.removal_order
    }

    pub(crate) fn left_at(&self, idx: u32) -> Locus {
        self.left[idx as usize]
    }

    pub(crate) fn right_at(&self, idx: u32) -> Locus {
        self.right[idx as usize]
    }

    pub(crate) fn node_at(&self, idx: u32) -> NodeId {
        self.node[idx as usize]
    }

    pub(crate) fn children_at(&self, idx: u32) -> [NodeId; 2] {
        self.children[idx as usize]
    }

    pub(crate) fn time_at(&self, idx: u32) -> Time {
        self.time[idx as usize]
    }

    /// Replaces the mutation table after validating every mutation's
    /// `position` and `node` against this store's bounds, then sorts by
    /// position.
    pub fn set_mutations(&mut self, mutations: Vec<Mutation>) -> Result<()> {
        for m in &mutations {
            if m.position < 0.0 || m.position > self.num_loci as f64 {
                return Err(CoalseqError::BadMutation(format!(
                    "mutation position {} out of [0, {}]",
                    m.position, self.num_loci
                )));
            }
            if m.node.0 < 1 || m.node.0 > self.num_nodes {
                return Err(CoalseqError::BadMutation(format!(
                    "mutation node {} out of [1, {}]",
                    m.node.0, self.num_nodes
                )));
            }
        }
        let mut mutations = mutations;
        mutations.sort_unstable_by(|a, b| a.position.partial_cmp(&b.position).unwrap());
        self.mutations = mutations;
        self.mutation_provenance = None;
        Ok(())
    }

    /// Records the `(seed, rate)` a mutation generator used to produce the
    /// current mutation table, so persistence can recover them for
    /// provenance. Cleared implicitly whenever a caller replaces the
    /// mutation table directly via [`set_mutations`](Self::set_mutations)
    /// without going through a generator.
    pub(crate) fn set_mutation_provenance(&mut self, seed: u64, rate: f64) {
        self.mutation_provenance = Some((seed, rate));
    }

    pub(crate) fn mutation_provenance(&self) -> Option<(u64, f64)> {
        self.mutation_provenance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(left: u32, right: u32, node: u32, c0: u32, c1: u32, time: f64) -> CoalescenceRecord {
        CoalescenceRecord {
            left: Locus(left),
            right: Locus(right),
            node: NodeId(node),
            children: [NodeId(c0), NodeId(c1)],
            time: Time(time),
        }
    }

    #[test]
    fn single_record_orders() {
        let store = RecordStore::new(vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10).unwrap();
        assert_eq!(store.get_num_records(), 1);
        assert_eq!(store.get_num_nodes(), 3);
        let r = store.get_record(0, RecordOrder::Left).unwrap();
        assert_eq!(r.node, NodeId(3));
    }

    #[test]
    fn two_record_insertion_removal_orders() {
        let records = vec![rec(0, 4, 3, 1, 2, 0.3), rec(4, 10, 4, 1, 2, 0.7)];
        let store = RecordStore::new(records, 2, 10).unwrap();
        let first_inserted = store.get_record(0, RecordOrder::Left).unwrap();
        assert_eq!(first_inserted.node, NodeId(3));
        let first_removed = store.get_record(0, RecordOrder::Right).unwrap();
        assert_eq!(first_removed.node, NodeId(3));
    }

    #[test]
    fn rejects_duplicate_children() {
        let err = RecordStore::new(vec![rec(0, 10, 3, 1, 1, 0.5)], 2, 10).unwrap_err();
        assert!(matches!(err, CoalseqError::BadParamValue(_)));
    }

    #[test]
    fn rejects_child_not_strictly_less_than_node() {
        // node 3 naming itself as its own child is a self-loop.
        let err = RecordStore::new(vec![rec(0, 10, 3, 1, 3, 0.5)], 2, 10).unwrap_err();
        assert!(matches!(err, CoalseqError::BadParamValue(_)));
    }

    #[test]
    fn rejects_child_greater_than_node() {
        // node 4's record appears before node 5 is even defined here, but
        // naming 5 as a child of 4 would require a parent edge younger
        // than its own child, which can never resolve into a tree.
        let records = vec![rec(0, 10, 4, 1, 5, 0.5), rec(0, 10, 5, 2, 3, 0.3)];
        let err = RecordStore::new(records, 3, 10).unwrap_err();
        assert!(matches!(err, CoalseqError::BadParamValue(_)));
    }

    #[test]
    fn rejects_node_decreasing_across_records() {
        let records = vec![rec(0, 10, 5, 1, 2, 0.5), rec(0, 10, 4, 1, 2, 0.3)];
        let err = RecordStore::new(records, 2, 10).unwrap_err();
        assert!(matches!(err, CoalseqError::BadOrdering(_)));
    }

    #[test]
    fn rejects_bad_interval() {
        let err = RecordStore::new(vec![rec(5, 5, 3, 1, 2, 0.5)], 2, 10).unwrap_err();
        assert!(matches!(err, CoalseqError::BadParamValue(_)));
    }

    #[test]
    fn set_mutations_sorts_by_position() {
        let mut store = RecordStore::new(vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10).unwrap();
        store
            .set_mutations(vec![
                Mutation { position: 7.0, node: NodeId(1) },
                Mutation { position: 2.5, node: NodeId(3) },
            ])
            .unwrap();
        let positions: Vec<f64> = store.mutations().iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![2.5, 7.0]);
    }

    #[test]
    fn set_mutations_rejects_bad_node() {
        let mut store = RecordStore::new(vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10).unwrap();
        let err = store
            .set_mutations(vec![Mutation { position: 1.0, node: NodeId(9) }])
            .unwrap_err();
        assert!(matches!(err, CoalseqError::BadMutation(_)));
    }
}
