//! Newtype wrappers around the raw integer/float domains used by the record
//! store, so that a node id cannot be passed where a locus or a count is
//! expected without an explicit conversion.

use serde::{Deserialize, Serialize};

/// A node identifier. Samples occupy `1..=sample_size`; node `0` is the
/// sentinel meaning "no such node".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NULL: NodeId = NodeId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        NodeId(v)
    }
}

impl From<NodeId> for u32 {
    fn from(v: NodeId) -> Self {
        v.0
    }
}

impl From<NodeId> for usize {
    fn from(v: NodeId) -> Self {
        v.0 as usize
    }
}

/// A genomic coordinate on `[0, num_loci]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Locus(pub u32);

impl From<u32> for Locus {
    fn from(v: u32) -> Self {
        Locus(v)
    }
}

impl From<Locus> for u32 {
    fn from(v: Locus) -> Self {
        v.0
    }
}

/// A coalescence time. Samples have `Time(0.0)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Time(pub f64);

impl From<f64> for Time {
    fn from(v: f64) -> Self {
        Time(v)
    }
}

impl From<Time> for f64 {
    fn from(v: Time) -> Self {
        v.0
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
