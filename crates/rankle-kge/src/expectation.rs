//! Closed-form expected metrics under filtered evaluation.
//!
//! A scorer that ranks candidates uniformly at random places the true
//! answer at each rank `1..=n` with equal probability, where `n` is the
//! query's candidate-set size after filtering. The expectations of the
//! standard rank metrics under that null model have closed forms, so the
//! "how good is random?" reference line costs one pass over the
//! candidate-set sizes instead of a Monte-Carlo simulation:
//!
//! - `E[rank] = (n + 1) / 2`
//! - `E[hits@k] = min(k, n) / n`
//!
//! Trained and baseline scorers are compared against these exact bounds;
//! the adjusted metrics (`aamr`, `aamri`) in
//! [`crate::evaluation::RankMetrics`] are built on them.

use crate::error::Result;
use rankle_core::{Dataset, Triple};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Cutoffs reported by [`ExpectedMetricReport`].
pub const REPORT_KS: [usize; 4] = [1, 3, 5, 10];

/// Per-side candidate-set sizes for a batch of queries.
///
/// Entry i of each side corresponds to query i; sizes are always >= 1
/// because the true answer is never filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSetSizes {
    /// Sizes for head-prediction queries (?, r, t).
    pub head: Vec<usize>,
    /// Sizes for tail-prediction queries (h, r, ?).
    pub tail: Vec<usize>,
}

impl CandidateSetSizes {
    /// Both sides pooled, head sizes first.
    pub fn both(&self) -> Vec<usize> {
        self.head.iter().chain(&self.tail).copied().collect()
    }
}

/// Count remaining ranking candidates per query under the filtered
/// protocol.
///
/// For each query triple and side, the filtered-out set is every entity
/// appearing as the masked side in any filter triple that shares the
/// query's other two coordinates, minus the query's own true answer.
/// The candidate-set size is `num_entities` minus that set's
/// cardinality; with no other true triple sharing the pattern it equals
/// `num_entities` exactly.
///
/// Recomputed per call; nothing is cached across filter sets.
pub fn candidate_set_sizes(
    queries: &[Triple],
    filters: &[&[Triple]],
    num_entities: usize,
) -> CandidateSetSizes {
    let mut tails_by_hr: HashMap<(usize, usize), HashSet<usize>> = HashMap::new();
    let mut heads_by_rt: HashMap<(usize, usize), HashSet<usize>> = HashMap::new();
    for set in filters {
        for t in *set {
            tails_by_hr.entry((t.head, t.relation)).or_default().insert(t.tail);
            heads_by_rt.entry((t.relation, t.tail)).or_default().insert(t.head);
        }
    }

    let excluded = |known: Option<&HashSet<usize>>, answer: usize| -> usize {
        known.map_or(0, |set| set.len() - usize::from(set.contains(&answer)))
    };

    let mut sizes = CandidateSetSizes {
        head: Vec::with_capacity(queries.len()),
        tail: Vec::with_capacity(queries.len()),
    };
    for q in queries {
        let known_tails = tails_by_hr.get(&(q.head, q.relation));
        sizes.tail.push(num_entities - excluded(known_tails, q.tail));

        let known_heads = heads_by_rt.get(&(q.relation, q.tail));
        sizes.head.push(num_entities - excluded(known_heads, q.head));
    }
    sizes
}

/// Expected mean rank of a uniformly random scorer: mean of `(n+1)/2`.
pub fn expected_mean_rank(sizes: &[usize]) -> f64 {
    if sizes.is_empty() {
        return 0.0;
    }
    sizes.iter().map(|&n| (n as f64 + 1.0) / 2.0).sum::<f64>() / sizes.len() as f64
}

/// Expected hits@k of a uniformly random scorer: mean of `min(k, n)/n`.
pub fn expected_hits_at_k(sizes: &[usize], k: usize) -> f64 {
    if sizes.is_empty() {
        return 0.0;
    }
    sizes
        .iter()
        .map(|&n| k.min(n) as f64 / n as f64)
        .sum::<f64>()
        / sizes.len() as f64
}

/// Expected metrics of a whole dataset, keyed identically across runs.
///
/// For every split and side, the map holds `mean_rank` and
/// `hits_at_{1,3,5,10}` of a uniformly random scorer under filtering by
/// *all* known triples (training + validation + testing). Serialized as
/// `split -> side -> metric -> value` so reports from different runs
/// diff cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedMetricReport {
    /// Dataset name the report describes.
    pub dataset: String,
    /// `split -> side -> metric name -> expected value`.
    pub splits: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
}

impl ExpectedMetricReport {
    /// Compute the report for all three splits of a dataset.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let filters = [
            dataset.training.triples(),
            dataset.validation.triples(),
            dataset.testing.triples(),
        ];
        let num_entities = dataset.num_entities();

        let mut splits = BTreeMap::new();
        for (split, factory) in [
            ("training", &dataset.training),
            ("validation", &dataset.validation),
            ("testing", &dataset.testing),
        ] {
            let sizes = candidate_set_sizes(factory.triples(), &filters, num_entities);
            let mut sides = BTreeMap::new();
            sides.insert("head".to_string(), side_metrics(&sizes.head));
            sides.insert("tail".to_string(), side_metrics(&sizes.tail));
            sides.insert("both".to_string(), side_metrics(&sizes.both()));
            splits.insert(split.to_string(), sides);
        }

        Self { dataset: dataset.name.clone(), splits }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Persist as JSON at the given path.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.to_json()?.as_bytes())?;
        Ok(())
    }
}

fn side_metrics(sizes: &[usize]) -> BTreeMap<String, f64> {
    let mut metrics = BTreeMap::new();
    metrics.insert("mean_rank".to_string(), expected_mean_rank(sizes));
    for k in REPORT_KS {
        metrics.insert(format!("hits_at_{k}"), expected_hits_at_k(sizes, k));
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankle_core::{SplitRatios, TriplesFactory};

    #[test]
    fn test_sizes_without_sharing_equal_num_entities() {
        let queries = [Triple::new(0, 0, 1)];
        let filters: &[Triple] = &[Triple::new(2, 1, 3)];
        let sizes = candidate_set_sizes(&queries, &[filters], 10);
        assert_eq!(sizes.tail, vec![10]);
        assert_eq!(sizes.head, vec![10]);
    }

    #[test]
    fn test_own_answer_never_excluded() {
        let queries = [Triple::new(0, 0, 1)];
        // The query itself is in the filter set, as under the standard
        // protocol; it must not shrink its own candidate set.
        let sizes = candidate_set_sizes(&queries, &[&queries], 4);
        assert_eq!(sizes.tail, vec![4]);
        assert_eq!(sizes.head, vec![4]);
    }

    #[test]
    fn test_other_true_answers_excluded() {
        let queries = [Triple::new(0, 0, 1)];
        let filters: &[Triple] = &[
            Triple::new(0, 0, 1),
            Triple::new(0, 0, 2),
            Triple::new(0, 0, 3),
            Triple::new(0, 0, 2), // duplicate, counted once
            Triple::new(4, 0, 1),
        ];
        let sizes = candidate_set_sizes(&queries, &[filters], 8);
        // Tails 2 and 3 are excluded; head 4 is excluded.
        assert_eq!(sizes.tail, vec![6]);
        assert_eq!(sizes.head, vec![7]);
    }

    #[test]
    fn test_sizes_at_least_one() {
        // Every entity is a known tail for the pattern; only the true
        // answer survives.
        let queries = [Triple::new(0, 0, 0)];
        let filters: Vec<Triple> = (0..4).map(|t| Triple::new(0, 0, t)).collect();
        let sizes = candidate_set_sizes(&queries, &[&filters], 4);
        assert_eq!(sizes.tail, vec![1]);
    }

    #[test]
    fn test_expected_mean_rank_uniform_ten() {
        let sizes = vec![10; 25];
        assert!((expected_mean_rank(&sizes) - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_expected_mean_rank_mixed() {
        // (2+1)/2 = 1.5 and (4+1)/2 = 2.5 average to 2.
        assert!((expected_mean_rank(&[2, 4]) - 2.0).abs() < 1e-12);
        assert_eq!(expected_mean_rank(&[]), 0.0);
    }

    #[test]
    fn test_expected_hits_monotone_in_k() {
        let sizes = vec![3, 7, 10, 50];
        let mut last = 0.0;
        for k in 1..=60 {
            let hits = expected_hits_at_k(&sizes, k);
            assert!(hits >= last, "hits@{k} decreased");
            last = hits;
        }
    }

    #[test]
    fn test_expected_hits_saturates() {
        let sizes = vec![5, 5];
        assert!((expected_hits_at_k(&sizes, 5) - 1.0).abs() < 1e-12);
        assert!((expected_hits_at_k(&sizes, 100) - 1.0).abs() < 1e-12);
        assert!((expected_hits_at_k(&sizes, 1) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_report_keys() {
        let factory = TriplesFactory::from_triples(
            (0..40)
                .map(|i| Triple::new(i % 8, i % 2, (i * 3 + 1) % 8))
                .collect(),
        );
        let dataset =
            Dataset::split("toy", factory, SplitRatios::default(), 0).unwrap();
        let report = ExpectedMetricReport::for_dataset(&dataset);

        assert_eq!(report.dataset, "toy");
        for split in ["training", "validation", "testing"] {
            let sides = &report.splits[split];
            for side in ["head", "tail", "both"] {
                let metrics = &sides[side];
                assert!(metrics.contains_key("mean_rank"));
                for k in REPORT_KS {
                    assert!(metrics.contains_key(&format!("hits_at_{k}")));
                }
            }
        }
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let factory = TriplesFactory::from_triples(
            (0..30).map(|i| Triple::new(i % 6, 0, (i + 1) % 6)).collect(),
        );
        let dataset =
            Dataset::split("toy", factory, SplitRatios::default(), 1).unwrap();
        let report = ExpectedMetricReport::for_dataset(&dataset);

        let json = report.to_json().unwrap();
        let parsed: ExpectedMetricReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
