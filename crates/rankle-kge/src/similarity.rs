//! Jaccard similarity between relations over their entity-pair sets.
//!
//! Two relations are similar when they connect the same (head, tail)
//! pairs. The inverse variant reverses the second relation's pairs first,
//! so `sim_inv[r1, r2]` is high when `r2` behaves like the inverse of
//! `r1` (e.g. `part_of` vs `has_part`). Soft-inverse-triple scoring
//! propagates evidence along both matrices.

use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;
use rankle_core::TriplesFactory;

/// Build a sparse relation-by-relation Jaccard similarity matrix.
///
/// Each triple's (head, tail) pair is encoded as `head * num_entities +
/// tail` (reversed when `to_inverse`); per relation, the *set* of encoded
/// pairs is collected, multiplicities collapsed. Similarity is
/// `|A ∩ B| / |A ∪ B|` with `0/0 = 0`. Entries strictly below
/// `threshold` are dropped from storage.
///
/// Fails with [`Error::IndexOverflow`] before any construction if
/// `num_entities^2` does not fit the platform's address space.
///
/// Deterministic, pure function of the input triples. The non-inverse
/// matrix is symmetric with unit diagonal for every observed relation.
pub fn relation_similarity(
    factory: &TriplesFactory,
    to_inverse: bool,
    threshold: Option<f64>,
) -> Result<CsrMatrix> {
    let num_entities = factory.num_entities();
    num_entities
        .checked_mul(num_entities)
        .ok_or(Error::IndexOverflow { num_entities })?;

    let pairs = relation_pair_sets(factory, false);
    // Cardinalities are invariant under pair reversal, so the direct
    // counts serve both axes.
    let cardinality: Vec<usize> = pairs.iter().map(Vec::len).collect();
    let pairs_rhs = if to_inverse {
        relation_pair_sets(factory, true)
    } else {
        pairs.clone()
    };

    let num_relations = factory.num_relations();
    let mut entries = Vec::new();
    for r1 in 0..num_relations {
        for r2 in 0..num_relations {
            let intersection = sorted_intersection_count(&pairs[r1], &pairs_rhs[r2]);
            if intersection == 0 {
                continue;
            }
            let union = cardinality[r1] + cardinality[r2] - intersection;
            entries.push((r1, r2, intersection as f64 / union as f64));
        }
    }

    let mut sim = CsrMatrix::from_coo(num_relations, num_relations, entries);
    if let Some(threshold) = threshold {
        sim.prune_below(threshold);
    }
    Ok(sim)
}

/// Per-relation sorted sets of encoded (head, tail) pairs.
///
/// Presence only: a pair observed many times under one relation still
/// contributes a single element.
fn relation_pair_sets(factory: &TriplesFactory, swapped: bool) -> Vec<Vec<usize>> {
    let num_entities = factory.num_entities();
    let mut sets = vec![Vec::new(); factory.num_relations()];
    for t in factory.triples() {
        let code = if swapped {
            t.tail * num_entities + t.head
        } else {
            t.head * num_entities + t.tail
        };
        sets[t.relation].push(code);
    }
    for set in &mut sets {
        set.sort_unstable();
        set.dedup();
    }
    sets
}

/// Size of the intersection of two sorted, deduplicated lists.
fn sorted_intersection_count(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}
