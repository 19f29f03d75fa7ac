//! Property-based tests for the baseline scoring structures.
//!
//! These verify invariants that must hold for any triple set:
//! - Co-occurrence counts are conserved
//! - Normalized rows are distributions
//! - Relation similarity is a bounded, symmetric Jaccard
//! - Candidate-set sizes and expected metrics respect their bounds

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rankle_core::{Triple, TriplesFactory};
use rankle_kge::cooccurrence::{cooccurrence_matrix, TripleRole};
use rankle_kge::expectation::{
    candidate_set_sizes, expected_hits_at_k, expected_mean_rank,
};
use rankle_kge::similarity::relation_similarity;

const MAX_ENTITIES: usize = 12;
const MAX_RELATIONS: usize = 5;

fn arb_triple() -> impl Strategy<Value = Triple> {
    (0..MAX_ENTITIES, 0..MAX_RELATIONS, 0..MAX_ENTITIES)
        .prop_map(|(h, r, t)| Triple::new(h, r, t))
}

fn arb_factory() -> impl Strategy<Value = TriplesFactory> {
    prop::collection::vec(arb_triple(), 0..60).prop_map(|triples| {
        TriplesFactory::new(triples, MAX_ENTITIES, MAX_RELATIONS).unwrap()
    })
}

mod cooccurrence_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn counts_are_conserved(factory in arb_factory()) {
            for (row, col) in [
                (TripleRole::Relation, TripleRole::Head),
                (TripleRole::Relation, TripleRole::Tail),
                (TripleRole::Head, TripleRole::Tail),
                (TripleRole::Tail, TripleRole::Head),
            ] {
                let m = cooccurrence_matrix(&factory, row, col, false).unwrap();
                prop_assert!(
                    (m.sum() - factory.num_triples() as f64).abs() < 1e-9,
                    "counts lost or duplicated for {row:?}x{col:?}"
                );
            }
        }

        #[test]
        fn normalized_rows_are_distributions(factory in arb_factory()) {
            let m = cooccurrence_matrix(
                &factory,
                TripleRole::Relation,
                TripleRole::Tail,
                true,
            )
            .unwrap();
            for total in m.row_sums() {
                prop_assert!(
                    total == 0.0 || (total - 1.0).abs() < 1e-9,
                    "row sum {total} is neither 0 nor 1"
                );
            }
        }
    }
}

mod similarity_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn similarity_is_symmetric_and_bounded(factory in arb_factory()) {
            let sim = relation_similarity(&factory, false, None).unwrap();
            for r1 in 0..MAX_RELATIONS {
                for r2 in 0..MAX_RELATIONS {
                    let v = sim.get(r1, r2);
                    prop_assert!((0.0..=1.0).contains(&v));
                    prop_assert_eq!(v, sim.get(r2, r1));
                }
            }
        }

        #[test]
        fn observed_relations_have_unit_self_similarity(factory in arb_factory()) {
            let sim = relation_similarity(&factory, false, None).unwrap();
            for r in 0..MAX_RELATIONS {
                let observed = factory.triples().iter().any(|t| t.relation == r);
                if observed {
                    prop_assert!((sim.get(r, r) - 1.0).abs() < 1e-12);
                } else {
                    prop_assert_eq!(sim.get(r, r), 0.0);
                }
            }
        }

        #[test]
        fn threshold_matches_post_hoc_pruning(
            factory in arb_factory(),
            threshold in 0.0f64..=1.0,
        ) {
            let direct = relation_similarity(&factory, false, Some(threshold)).unwrap();
            let mut post_hoc = relation_similarity(&factory, false, None).unwrap();
            post_hoc.prune_below(threshold);
            prop_assert_eq!(direct, post_hoc);
        }

        #[test]
        fn inverse_similarity_is_bounded(factory in arb_factory()) {
            let sim = relation_similarity(&factory, true, None).unwrap();
            for (_, _, v) in sim.iter() {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}

mod expectation_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn candidate_sizes_are_bounded(
            queries in prop::collection::vec(arb_triple(), 1..30),
            filters in prop::collection::vec(arb_triple(), 0..60),
        ) {
            let sizes = candidate_set_sizes(&queries, &[&filters], MAX_ENTITIES);
            prop_assert_eq!(sizes.head.len(), queries.len());
            prop_assert_eq!(sizes.tail.len(), queries.len());
            for &n in sizes.head.iter().chain(&sizes.tail) {
                prop_assert!((1..=MAX_ENTITIES).contains(&n));
            }
        }

        #[test]
        fn empty_filters_leave_all_candidates(
            queries in prop::collection::vec(arb_triple(), 1..20),
        ) {
            let sizes = candidate_set_sizes(&queries, &[], MAX_ENTITIES);
            prop_assert!(sizes.head.iter().all(|&n| n == MAX_ENTITIES));
            prop_assert!(sizes.tail.iter().all(|&n| n == MAX_ENTITIES));
        }

        #[test]
        fn expected_hits_monotone_and_saturating(
            sizes in prop::collection::vec(1usize..200, 1..40),
        ) {
            let max_n = sizes.iter().copied().max().unwrap();
            let mut last = 0.0;
            for k in 1..=max_n {
                let hits = expected_hits_at_k(&sizes, k);
                prop_assert!(hits >= last - 1e-12);
                last = hits;
            }
            prop_assert!((expected_hits_at_k(&sizes, max_n) - 1.0).abs() < 1e-9);
        }

        #[test]
        fn expected_mean_rank_within_range(
            sizes in prop::collection::vec(1usize..200, 1..40),
        ) {
            let expected = expected_mean_rank(&sizes);
            let min = *sizes.iter().min().unwrap() as f64;
            let max = *sizes.iter().max().unwrap() as f64;
            prop_assert!(expected >= (min + 1.0) / 2.0 - 1e-12);
            prop_assert!(expected <= (max + 1.0) / 2.0 + 1e-12);
        }
    }
}
