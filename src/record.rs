//! The coalescence record and mutation value types.

use crate::ids::{Locus, NodeId, Time};

/// A single coalescence record: over `[left, right)`, `node` is the parent
/// of `children[0]` and `children[1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoalescenceRecord {
    pub left: Locus,
    pub right: Locus,
    pub node: NodeId,
    pub children: [NodeId; 2],
    pub time: Time,
}

/// Selects which of the three orderings `RecordStore::get_record` reads
/// from: the order records were supplied in (time-ascending, by simulator
/// contract), the left-sorted insertion order, or the right-sorted removal
/// order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecordOrder {
    Time,
    Left,
    Right,
}

/// A mutation: a derived allele arising on the branch above `node`, at
/// `position` on the genome.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mutation {
    pub position: f64,
    pub node: NodeId,
}
