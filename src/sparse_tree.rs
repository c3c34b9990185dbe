//! The materialised local tree: parent/time/children arrays indexed by
//! node id, with node `0` reserved as the "no such node" sentinel.

use crate::error::{CoalseqError, Result};
use crate::ids::{Locus, NodeId, Time};
use crate::record::Mutation;
use bitflags::bitflags;

bitflags! {
    /// Options controlling what a [`SparseTree`] maintains as it is
    /// advanced by a [`crate::sparse_tree_iter::SparseTreeIterator`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct TreeFlags: u32 {
        /// Maintain `num_leaves` and `num_tracked_leaves` incrementally as
        /// edges are inserted and removed, giving O(1) queries. Without
        /// this flag, `get_num_leaves` falls back to an O(subtree) DFS and
        /// `get_num_tracked_leaves` is unavailable.
        const COUNT_LEAVES = 1 << 0;
    }
}

/// The current local tree over some genomic interval `[left, right)`.
///
/// Owned by the caller and bound to a record store for as long as a
/// [`crate::sparse_tree_iter::SparseTreeIterator`] borrows it mutably.
pub struct SparseTree {
    pub(crate) sample_size: u32,
    pub(crate) num_nodes: u32,
    pub(crate) parent: Vec<NodeId>,
    pub(crate) time: Vec<Time>,
    pub(crate) children: Vec<[NodeId; 2]>,
    pub(crate) num_leaves: Vec<u32>,
    pub(crate) num_tracked_leaves: Vec<u32>,
    pub(crate) root: NodeId,
    pub left: Locus,
    pub right: Locus,
    pub mutations: Vec<Mutation>,
    flags: TreeFlags,
}

impl SparseTree {
    pub(crate) fn new(
        sample_size: u32,
        num_nodes: u32,
        flags: TreeFlags,
        tracked_samples: &[NodeId],
    ) -> Self {
        let n = num_nodes as usize + 1;
        let mut num_leaves = vec![0u32; n];
        let mut num_tracked_leaves = vec![0u32; n];
        if flags.contains(TreeFlags::COUNT_LEAVES) {
            for i in 1..=sample_size as usize {
                num_leaves[i] = 1;
            }
            for &s in tracked_samples {
                num_tracked_leaves[s.0 as usize] = 1;
            }
        }
        SparseTree {
            sample_size,
            num_nodes,
            parent: vec![NodeId::NULL; n],
            time: vec![Time(0.0); n],
            children: vec![[NodeId::NULL; 2]; n],
            num_leaves,
            num_tracked_leaves,
            root: NodeId::NULL,
            left: Locus(0),
            right: Locus(0),
            mutations: Vec::new(),
            flags,
        }
    }

    pub fn flags(&self) -> TreeFlags {
        self.flags
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn interval(&self) -> (Locus, Locus) {
        (self.left, self.right)
    }

    pub fn parent(&self, u: NodeId) -> Option<NodeId> {
        self.parent.get(u.0 as usize).copied()
    }

    pub fn children_of(&self, u: NodeId) -> Option<[NodeId; 2]> {
        self.children.get(u.0 as usize).copied()
    }

    pub fn time_of(&self, u: NodeId) -> Option<Time> {
        self.time.get(u.0 as usize).copied()
    }

    /// Zeroes all per-node state and resets the interval to empty.
    pub fn clear(&mut self) {
        self.parent.iter_mut().for_each(|p| *p = NodeId::NULL);
        self.time.iter_mut().for_each(|t| *t = Time(0.0));
        self.children.iter_mut().for_each(|c| *c = [NodeId::NULL; 2]);
        self.num_leaves.iter_mut().for_each(|c| *c = 0);
        self.num_tracked_leaves.iter_mut().for_each(|c| *c = 0);
        self.root = NodeId::NULL;
        self.left = Locus(0);
        self.right = Locus(0);
        self.mutations.clear();
    }

    fn check_node(&self, u: NodeId) -> Result<()> {
        if u.0 == 0 || u.0 > self.num_nodes {
            return Err(CoalseqError::BadParamValue(format!(
                "node {} out of range [1, {}]",
                u.0, self.num_nodes
            )));
        }
        Ok(())
    }

    /// Returns the most recent common ancestor of `u` and `v` in the
    /// current tree, or [`NodeId::NULL`] if they lie in different trees.
    pub fn get_mrca(&self, u: NodeId, v: NodeId) -> Result<NodeId> {
        self.check_node(u)?;
        self.check_node(v)?;

        let mut path_u = Vec::with_capacity(self.sample_size as usize + 1);
        let mut a = u;
        loop {
            path_u.push(a);
            if a.0 == 0 {
                break;
            }
            a = self.parent[a.0 as usize];
        }
        let mut path_v = Vec::with_capacity(self.sample_size as usize + 1);
        let mut b = v;
        loop {
            path_v.push(b);
            if b.0 == 0 {
                break;
            }
            b = self.parent[b.0 as usize];
        }

        if *path_u.last().unwrap() != *path_v.last().unwrap() {
            return Ok(NodeId::NULL);
        }

        let mut last_common = NodeId::NULL;
        let mut iu = path_u.len();
        let mut iv = path_v.len();
        while iu > 0 && iv > 0 {
            iu -= 1;
            iv -= 1;
            if path_u[iu] != path_v[iv] {
                break;
            }
            last_common = path_u[iu];
        }
        Ok(last_common)
    }

    fn is_leaf(&self, u: NodeId) -> bool {
        u.0 >= 1 && u.0 <= self.sample_size
    }

    /// Number of samples in the subtree rooted at `u`. O(1) if
    /// [`TreeFlags::COUNT_LEAVES`] is set, otherwise an O(subtree) DFS.
    pub fn get_num_leaves(&self, u: NodeId) -> Result<u32> {
        self.check_node(u)?;
        if self.flags.contains(TreeFlags::COUNT_LEAVES) {
            return Ok(self.num_leaves[u.0 as usize]);
        }
        let mut count = 0u32;
        let mut stack = vec![u];
        while let Some(n) = stack.pop() {
            if self.is_leaf(n) {
                count += 1;
            }
            let c = self.children[n.0 as usize];
            for child in c {
                if !child.is_null() {
                    stack.push(child);
                }
            }
        }
        Ok(count)
    }

    /// Number of tracked samples in the subtree rooted at `u`. Requires
    /// [`TreeFlags::COUNT_LEAVES`].
    pub fn get_num_tracked_leaves(&self, u: NodeId) -> Result<u32> {
        self.check_node(u)?;
        if !self.flags.contains(TreeFlags::COUNT_LEAVES) {
            return Err(CoalseqError::UnsupportedOperation(
                "tracked leaf counts require TreeFlags::COUNT_LEAVES".into(),
            ));
        }
        Ok(self.num_tracked_leaves[u.0 as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_everything() {
        let mut t = SparseTree::new(2, 3, TreeFlags::COUNT_LEAVES, &[]);
        t.parent[1] = NodeId(3);
        t.root = NodeId(3);
        t.clear();
        assert_eq!(t.root, NodeId::NULL);
        assert_eq!(t.parent[1], NodeId::NULL);
    }

    #[test]
    fn mrca_null_when_disjoint() {
        let mut t = SparseTree::new(2, 3, TreeFlags::COUNT_LEAVES, &[]);
        // No edges inserted: both are their own (isolated) roots.
        let m = t.get_mrca(NodeId(1), NodeId(2)).unwrap();
        assert_eq!(m, NodeId::NULL);
    }

    #[test]
    fn get_num_leaves_without_counting_is_unsupported_for_tracked() {
        let t = SparseTree::new(2, 3, TreeFlags::empty(), &[]);
        let err = t.get_num_tracked_leaves(NodeId(1)).unwrap_err();
        assert!(matches!(err, CoalseqError::UnsupportedOperation(_)));
    }
}
