//! The sparse tree iterator: advances a [`SparseTree`] across successive
//! genomic intervals by applying edge diffs in place, maintaining leaf
//! counts incrementally and sliding the mutation window.

use crate::error::{CoalseqError, Result};
use crate::ids::{Locus, NodeId};
use crate::record_store::RecordStore;
use crate::sparse_tree::{SparseTree, TreeFlags};
use streaming_iterator::StreamingIterator;

/// Streams successive [`SparseTree`] states over a record store. Each call
/// to `advance` mutates the tree in place; the view returned by `get` is
/// valid only until the next call to `advance`.
pub struct SparseTreeIterator<'a> {
    store: &'a RecordStore,
    insertion_cursor: usize,
    removal_cursor: usize,
    mutation_cursor: usize,
    tree: SparseTree,
    finished: bool,
    have_tree: bool,
}

impl<'a> SparseTreeIterator<'a> {
    pub fn new(
        store: &'a RecordStore,
        flags: TreeFlags,
        tracked_samples: &[NodeId],
    ) -> Result<Self> {
        for &s in tracked_samples {
            if s.0 < 1 || s.0 > store.get_sample_size() {
                return Err(CoalseqError::BadParamValue(format!(
                    "tracked sample {} out of [1, {}]",
                    s.0,
                    store.get_sample_size()
                )));
            }
        }
        let tree = SparseTree::new(
            store.get_sample_size(),
            store.get_num_nodes(),
            flags,
            tracked_samples,
        );
        Ok(SparseTreeIterator {
            store,
            insertion_cursor: 0,
            removal_cursor: 0,
            mutation_cursor: 0,
            tree,
            finished: store.get_num_records() == 0,
            have_tree: false,
        })
    }

    fn counting(&self) -> bool {
        self.tree.flags().contains(TreeFlags::COUNT_LEAVES)
    }

    fn remove_edge(&mut self, idx: u32) {
        let u = self.store.node_at(idx);
        let c = self.store.children_at(idx);
        let counting = self.counting();

        let (da, dt) = if counting {
            (
                self.tree.num_leaves[u.0 as usize],
                self.tree.num_tracked_leaves[u.0 as usize],
            )
        } else {
            (0, 0)
        };

        for child in c {
            self.tree.parent[child.0 as usize] = NodeId::NULL;
        }
        self.tree.children[u.0 as usize] = [NodeId::NULL; 2];
        self.tree.time[u.0 as usize] = crate::ids::Time(0.0);

        if u == self.tree.root {
            self.tree.root = NodeId(c[0].0.max(c[1].0));
        }

        if counting {
            let mut v = self.tree.parent[u.0 as usize];
            while v.0 != 0 {
                self.tree.num_leaves[v.0 as usize] -= da;
                self.tree.num_tracked_leaves[v.0 as usize] -= dt;
                v = self.tree.parent[v.0 as usize];
            }
            self.tree.num_leaves[u.0 as usize] = 0;
            self.tree.num_tracked_leaves[u.0 as usize] = 0;
        }
    }

    fn insert_edge(&mut self, idx: u32) {
        let u = self.store.node_at(idx);
        let c = self.store.children_at(idx);
        let t = self.store.time_at(idx);
        let counting = self.counting();

        for child in c {
            self.tree.parent[child.0 as usize] = u;
        }
        self.tree.children[u.0 as usize] = c;
        self.tree.time[u.0 as usize] = t;

        if counting {
            let da = self.tree.num_leaves[c[0].0 as usize] + self.tree.num_leaves[c[1].0 as usize];
            let dt = self.tree.num_tracked_leaves[c[0].0 as usize]
                + self.tree.num_tracked_leaves[c[1].0 as usize];
            self.tree.num_leaves[u.0 as usize] = da;
            self.tree.num_tracked_leaves[u.0 as usize] = dt;

            let mut v = self.tree.parent[u.0 as usize];
            while v.0 != 0 {
                self.tree.num_leaves[v.0 as usize] += da;
                self.tree.num_tracked_leaves[v.0 as usize] += dt;
                v = self.tree.parent[v.0 as usize];
            }
        }

        if u.0 > self.tree.root.0 {
            self.tree.root = u;
        }
    }
}

impl<'a> StreamingIterator for SparseTreeIterator<'a> {
    type Item = SparseTree;

    fn advance(&mut self) {
        if self.finished {
            self.have_tree = false;
            return;
        }

        let store = self.store;
        let num_records = store.get_num_records();
        let removal_order = store.removal_order();
        let insertion_order = store.insertion_order();

        while self.removal_cursor < num_records {
            let idx = removal_order[self.removal_cursor];
            if store.right_at(idx).0 != self.tree.right.0 {
                break;
            }
            self.remove_edge(idx);
            self.removal_cursor += 1;
        }

        self.tree.left = self.tree.right;
        let next_right = if self.removal_cursor < num_records {
            store.right_at(removal_order[self.removal_cursor]).0
        } else {
            store.get_num_loci()
        };
        self.tree.right = Locus(next_right);

        while self.insertion_cursor < num_records {
            let idx = insertion_order[self.insertion_cursor];
            if store.left_at(idx).0 != self.tree.left.0 {
                break;
            }
            self.insert_edge(idx);
            self.insertion_cursor += 1;
        }

        while self.tree.parent[self.tree.root.0 as usize].0 != 0 {
            self.tree.root = self.tree.parent[self.tree.root.0 as usize];
        }

        self.tree.mutations.clear();
        let mutations = self.store.mutations();
        while self.mutation_cursor < mutations.len()
            && mutations[self.mutation_cursor].position < self.tree.right.0 as f64
        {
            self.tree.mutations.push(mutations[self.mutation_cursor]);
            self.mutation_cursor += 1;
        }

        if self.insertion_cursor >= num_records {
            self.finished = true;
        }
        self.have_tree = true;
    }

    fn get(&self) -> Option<&SparseTree> {
        if self.have_tree {
            Some(&self.tree)
        } else {
            None
        }
    }
}
