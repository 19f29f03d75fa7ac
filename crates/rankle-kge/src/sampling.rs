//! Negative sampling contract for training collaborators.
//!
//! Training loops for learned models corrupt positive triples into
//! negatives; the non-parametric baselines never touch this. The trait
//! pins down the narrow interface a training loop consumes, and the
//! uniform sampler is the standard concrete choice.

use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use rankle_core::{Triple, TriplesFactory};

/// Produces corrupted (presumed-false) triples from positive batches.
pub trait NegativeSampler {
    /// Entity vocabulary being sampled from.
    fn num_entities(&self) -> usize;

    /// Generate one negative per positive by corrupting an endpoint.
    fn sample(&mut self, positive_batch: &[Triple]) -> Vec<Triple>;
}

/// Uniform corruption: replace head or tail (fair coin) with an entity
/// drawn uniformly from the vocabulary.
///
/// Seeded, so sampling sequences are reproducible per seed. May produce
/// false negatives (corruptions that happen to be true triples); filtering
/// them is the training loop's concern, not the sampler's.
pub struct UniformNegativeSampler {
    num_entities: usize,
    rng: XorShiftRng,
}

impl UniformNegativeSampler {
    /// Create a sampler over a factory's entity vocabulary.
    pub fn new(factory: &TriplesFactory, seed: u64) -> Self {
        Self {
            num_entities: factory.num_entities(),
            rng: XorShiftRng::seed_from_u64(seed),
        }
    }
}

impl NegativeSampler for UniformNegativeSampler {
    fn num_entities(&self) -> usize {
        self.num_entities
    }

    fn sample(&mut self, positive_batch: &[Triple]) -> Vec<Triple> {
        positive_batch
            .iter()
            .map(|positive| {
                let entity = self.rng.gen_range(0..self.num_entities);
                if self.rng.gen_bool(0.5) {
                    Triple::new(entity, positive.relation, positive.tail)
                } else {
                    Triple::new(positive.head, positive.relation, entity)
                }
            })
            .collect()
    }
}
