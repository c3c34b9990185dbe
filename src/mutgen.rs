//! Infinite-sites mutation placement: draws a Poisson-distributed count of
//! mutations per branch, proportional to branch length and genomic span,
//! and positions each uniformly on the branch's interval.

use crate::error::{CoalseqError, Result};
use crate::record::{Mutation, RecordOrder};
use crate::record_store::RecordStore;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Poisson;

/// Places mutations on a record store's branches under the infinite-sites
/// model, seeded for reproducibility.
///
/// Reproducibility is an implementation property of the pinned `rand`/
/// `rand_distr` versions and this sampling order, not a guarantee that
/// survives crate upgrades.
pub struct MutationGenerator {
    rng: StdRng,
    rate: f64,
}

impl MutationGenerator {
    pub fn new(seed: u64, rate: f64) -> Result<Self> {
        if rate < 0.0 {
            return Err(CoalseqError::BadParamValue(format!(
                "mutation rate must be >= 0, got {rate}"
            )));
        }
        Ok(MutationGenerator {
            rng: StdRng::seed_from_u64(seed),
            rate,
        })
    }

    /// Draws mutations for every branch of every record in the store,
    /// sorted by position. Does not install them; see
    /// [`generate_and_install`] for the common case.
    pub fn generate(&mut self, store: &RecordStore) -> Result<Vec<Mutation>> {
        let mut mutations = Vec::new();
        for i in 0..store.get_num_records() {
            let r = store.get_record(i, RecordOrder::Time)?;
            let span = (r.right.0 - r.left.0) as f64;
            for child in r.children {
                let child_time = store.time_of_node(child.0);
                let branch_length = r.time.0 - child_time;
                if branch_length <= 0.0 {
                    continue;
                }
                let lambda = branch_length * span * self.rate;
                if lambda <= 0.0 {
                    continue;
                }
                let count = Poisson::new(lambda)
                    .map_err(|e| CoalseqError::Generic(format!("bad poisson rate: {e}")))?
                    .sample(&mut self.rng) as u64;
                if count == 0 {
                    continue;
                }
                let uniform = Uniform::new(r.left.0 as f64, r.right.0 as f64);
                for _ in 0..count {
                    mutations.push(Mutation {
                        position: uniform.sample(&mut self.rng),
                        node: child,
                    });
                }
            }
        }
        mutations.sort_unstable_by(|a, b| a.position.partial_cmp(&b.position).unwrap());
        Ok(mutations)
    }
}

/// Generates mutations at `rate` with `seed` and installs them on `store`.
pub fn generate_and_install(store: &mut RecordStore, rate: f64, seed: u64) -> Result<()> {
    let mut generator = MutationGenerator::new(seed, rate)?;
    let mutations = generator.generate(store)?;
    log::debug!(
        "generated {} mutations (rate={}, seed={})",
        mutations.len(),
        rate,
        seed
    );
    store.set_mutations(mutations)?;
    store.set_mutation_provenance(seed, rate);
    Ok(())
}
