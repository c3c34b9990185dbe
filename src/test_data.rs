//! Deterministic small coalescent histories for use in tests and the
//! demo under `demos/`. Not part of the simulator this crate consumes —
//! these are canned/generated inputs for exercising the record store and
//! iterators without depending on an external simulator crate.

use crate::ids::{Locus, NodeId, Time};
use crate::record::CoalescenceRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn rec(left: u32, right: u32, node: u32, c0: u32, c1: u32, time: f64) -> CoalescenceRecord {
    CoalescenceRecord {
        left: Locus(left),
        right: Locus(right),
        node: NodeId(node),
        children: [NodeId(c0), NodeId(c1)],
        time: Time(time),
    }
}

/// Scenario 1 from the testable-properties list: two samples coalescing
/// once over the whole sequence.
pub fn two_samples_one_record() -> (Vec<CoalescenceRecord>, u32, u32) {
    (vec![rec(0, 10, 3, 1, 2, 0.5)], 2, 10)
}

/// Scenario 2: a single recombination breakpoint splits the history of
/// two samples into two trees.
pub fn recombination_split() -> (Vec<CoalescenceRecord>, u32, u32) {
    (
        vec![rec(0, 4, 3, 1, 2, 0.3), rec(4, 10, 4, 1, 2, 0.7)],
        2,
        10,
    )
}

/// Scenario 3: three samples, two genomic intervals, with a fully
/// independent topology on either side of the breakpoint at position 3:
/// `(1,2)->4, (4,3)->5` on `[0,3)`, `(1,3)->6, (6,2)->7` on `[3,8)`.
pub fn three_samples_two_intervals() -> (Vec<CoalescenceRecord>, u32, u32) {
    (
        vec![
            rec(0, 3, 4, 1, 2, 0.2),
            rec(0, 3, 5, 4, 3, 0.6),
            rec(3, 8, 6, 1, 3, 0.3),
            rec(3, 8, 7, 6, 2, 0.7),
        ],
        3,
        8,
    )
}

/// Builds a Kingman-coalescent-shaped history for `sample_size` samples
/// over a single genomic interval `[0, num_loci)`: at each of
/// `sample_size - 1` steps, two of the currently-uncoalesced lineages are
/// chosen uniformly at random and merged into a new node, with a strictly
/// increasing coalescence time. The genome is not recombined; every
/// record spans the full interval. Deterministic for a fixed `seed`.
pub fn random_single_tree(
    sample_size: u32,
    num_loci: u32,
    seed: u64,
) -> (Vec<CoalescenceRecord>, u32, u32) {
    assert!(sample_size >= 2);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lineages: Vec<u32> = (1..=sample_size).collect();
    let mut next_node = sample_size + 1;
    let mut time = 0.0f64;
    let mut records = Vec::with_capacity(sample_size as usize - 1);

    while lineages.len() > 1 {
        let i = rng.gen_range(0..lineages.len());
        let a = lineages.swap_remove(i);
        let j = rng.gen_range(0..lineages.len());
        let b = lineages.swap_remove(j);
        time += rng.gen_range(0.05..1.0);
        records.push(rec(0, num_loci, next_node, a, b, time));
        lineages.push(next_node);
        next_node += 1;
    }

    (records, sample_size, num_loci)
}
