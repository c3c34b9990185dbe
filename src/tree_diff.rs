//! The tree diff iterator: walks a [`RecordStore`] left to right, emitting
//! the edges removed and inserted at each breakpoint.
//!
//! The two sort orders on the record store are exactly what make this
//! correct: records leaving at the current boundary are drained from
//! `removal_order` (right-ascending, time-descending — parent before
//! child), and records entering are drained from `insertion_order`
//! (left-ascending, time-ascending — child before parent).

use crate::ids::{Locus, NodeId, Time};
use crate::record_store::RecordStore;
use streaming_iterator::StreamingIterator;

/// One edge as it appears in a diff: either being removed from, or added
/// to, the current local tree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeRecord {
    pub node: NodeId,
    pub children: [NodeId; 2],
    pub time: Time,
}

/// The view yielded by [`TreeDiffIterator`] at each step: the span of the
/// new local tree and the edges that changed to produce it.
#[derive(Debug, Default)]
pub struct TreeDiff {
    pub left: u32,
    pub span: u32,
    pub edges_out: Vec<EdgeRecord>,
    pub edges_in: Vec<EdgeRecord>,
}

/// Streams successive `(span, edges_out, edges_in)` triples over a record
/// store. The two edge buffers are an arena reused every step: capacity is
/// retained across calls to `advance`, so after the first few trees no
/// further allocation occurs on the hot path.
pub struct TreeDiffIterator<'a> {
    store: &'a RecordStore,
    insertion_cursor: usize,
    removal_cursor: usize,
    tree_left: u32,
    done: bool,
    current: Option<TreeDiff>,
}

impl<'a> TreeDiffIterator<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        TreeDiffIterator {
            store,
            insertion_cursor: 0,
            removal_cursor: 0,
            tree_left: 0,
            done: store.get_num_records() == 0,
            current: None,
        }
    }

    fn edge_at(&self, idx: u32) -> EdgeRecord {
        EdgeRecord {
            node: self.store.node_at(idx),
            children: self.store.children_at(idx),
            time: self.store.time_at(idx),
        }
    }
}

impl<'a> StreamingIterator for TreeDiffIterator<'a> {
    type Item = TreeDiff;

    fn advance(&mut self) {
        if self.done {
            self.current = None;
            return;
        }

        let num_records = self.store.get_num_records();
        let insertion_order = self.store.insertion_order();
        let removal_order = self.store.removal_order();

        let mut diff = self.current.take().unwrap_or_default();
        diff.edges_out.clear();
        diff.edges_in.clear();
        diff.left = self.tree_left;

        while self.removal_cursor < num_records {
            let idx = removal_order[self.removal_cursor];
            if Locus::from(self.store.right_at(idx)).0 != self.tree_left {
                break;
            }
            diff.edges_out.push(self.edge_at(idx));
            self.removal_cursor += 1;
        }

        while self.insertion_cursor < num_records {
            let idx = insertion_order[self.insertion_cursor];
            if self.store.left_at(idx).0 != self.tree_left {
                break;
            }
            diff.edges_in.push(self.edge_at(idx));
            self.insertion_cursor += 1;
        }

        let next_left = if self.removal_cursor < num_records {
            self.store.right_at(removal_order[self.removal_cursor]).0
        } else {
            self.store.get_num_loci()
        };
        diff.span = next_left - self.tree_left;
        self.tree_left = next_left;

        if self.insertion_cursor >= num_records {
            self.done = true;
        }

        self.current = Some(diff);
    }

    fn get(&self) -> Option<&TreeDiff> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{Locus as L, Time as T};
    use crate::record::CoalescenceRecord;

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
    fn single_tree_single_step() {
        let store = RecordStore::new(vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10).unwrap();
        let mut it = TreeDiffIterator::new(&store);
        let mut spans = vec![];
        while let Some(d) = it.next() {
            spans.push(d.span);
            assert!(d.edges_out.is_empty());
            assert_eq!(d.edges_in.len(), 1);
        }
        assert_eq!(spans, vec![10]);
    }

    #[test]
    fn two_trees_across_breakpoint() {
        let records = vec![rec(0, 4, 3, 1, 2, 0.3), rec(4, 10, 4, 1, 2, 0.7)];
        let store = RecordStore::new(records, 2, 10).unwrap();
        let mut it = TreeDiffIterator::new(&store);
        let mut spans = vec![];
        let mut out_counts = vec![];
        let mut in_counts = vec![];
        while let Some(d) = it.next() {
            spans.push(d.span);
            out_counts.push(d.edges_out.len());
            in_counts.push(d.edges_in.len());
        }
        assert_eq!(spans, vec![4, 6]);
        assert_eq!(out_counts, vec![0, 1]);
        assert_eq!(in_counts, vec![1, 1]);
    }

    #[test]
    fn three_sample_two_intervals() {
        let records = vec![
            rec(0, 3, 4, 1, 2, 0.2),
            rec(0, 3, 5, 4, 3, 0.6),
            rec(3, 8, 6, 1, 3, 0.3),
            rec(3, 8, 7, 6, 2, 0.7),
        ];
        let store = RecordStore::new(records, 3, 8).unwrap();
        let mut it = TreeDiffIterator::new(&store);
        let mut spans = vec![];
        while let Some(d) = it.next() {
            spans.push(d.span);
        }
        assert_eq!(spans, vec![3, 5]);
    }
}
