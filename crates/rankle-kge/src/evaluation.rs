//! Filtered rank-based evaluation for link prediction.
//!
//! The standard protocol: for each test triple (h, r, t), score all
//! candidate tails for (h, r, ?) and all candidate heads for (?, r, t),
//! then rank the true answer. Candidates that form *other* known-true
//! triples are filtered out of the comparison, so a model is not
//! penalized for ranking a genuinely true completion above the one under
//! evaluation. The true answer itself is never filtered.
//!
//! Ranks are *realistic*: the mean of the optimistic (lowest among ties)
//! and pessimistic (highest among ties) ranks. A constant scorer thereby
//! lands exactly on the random-scorer expectation `(n + 1) / 2` instead
//! of gaming either extreme.

use crate::baseline::ScoreModel;
use crate::error::Result;
use crate::expectation::{expected_mean_rank, CandidateSetSizes};
use ndarray::{Array2, ArrayView1};
use rankle_core::Triple;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Hits@k cutoffs reported by the benchmark.
pub const DEFAULT_KS: [usize; 5] = [1, 5, 10, 50, 100];

/// Aggregated rank metrics for one evaluation side (or both).
///
/// All means are taken over queries; `aamr`/`aamri` additionally consult
/// the closed-form random-scorer expectation computed from the same
/// queries' candidate-set sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankMetrics {
    /// Arithmetic mean rank: E\[rank\].
    pub mean_rank: f64,
    /// Mean reciprocal rank (inverse harmonic mean rank): E\[1/rank\].
    pub mrr: f64,
    /// Inverse arithmetic mean rank: 1 / E\[rank\].
    pub iamr: f64,
    /// Inverse geometric mean rank.
    pub igmr: f64,
    /// Fraction of queries with rank <= k, per cutoff.
    pub hits_at: BTreeMap<usize, f64>,
    /// Adjusted arithmetic mean rank: E\[rank\] / E_random\[rank\].
    pub aamr: f64,
    /// Adjusted arithmetic mean rank index, in \[-1, 1\]; 0 = random,
    /// 1 = perfect.
    pub aamri: f64,
    /// Number of ranked queries.
    pub num_ranks: usize,
}

impl RankMetrics {
    /// Compute metrics from realistic ranks and candidate-set sizes.
    ///
    /// `ranks` and `sizes` are parallel: entry i describes the same
    /// query. Empty input yields all-zero metrics.
    pub fn from_ranks(ranks: &[f64], sizes: &[usize], ks: &[usize]) -> Self {
        debug_assert_eq!(ranks.len(), sizes.len());
        if ranks.is_empty() {
            return Self {
                mean_rank: 0.0,
                mrr: 0.0,
                iamr: 0.0,
                igmr: 0.0,
                hits_at: ks.iter().map(|&k| (k, 0.0)).collect(),
                aamr: 0.0,
                aamri: 0.0,
                num_ranks: 0,
            };
        }

        let n = ranks.len() as f64;
        let mean_rank = ranks.iter().sum::<f64>() / n;
        let mrr = ranks.iter().map(|r| 1.0 / r).sum::<f64>() / n;
        let igmr = (-ranks.iter().map(|r| r.ln()).sum::<f64>() / n).exp();
        let hits_at = ks
            .iter()
            .map(|&k| {
                let hits = ranks.iter().filter(|&&r| r <= k as f64).count();
                (k, hits as f64 / n)
            })
            .collect();

        let expected = expected_mean_rank(sizes);
        let aamr = if expected > 0.0 { mean_rank / expected } else { 0.0 };
        // Degenerate when every candidate set is a singleton: both the
        // observed and expected mean rank are exactly 1.
        let aamri = if expected > 1.0 {
            1.0 - (mean_rank - 1.0) / (expected - 1.0)
        } else {
            0.0
        };

        Self {
            mean_rank,
            mrr,
            iamr: 1.0 / mean_rank,
            igmr,
            hits_at,
            aamr,
            aamri,
            num_ranks: ranks.len(),
        }
    }

    /// Look up a metric by its benchmark column name.
    ///
    /// Recognized: `mean_rank`, `mrr`, `iamr`, `igmr`, `aamr`, `aamri`,
    /// and `hits@k` for any reported cutoff.
    pub fn get_metric(&self, name: &str) -> Option<f64> {
        match name {
            "mean_rank" => Some(self.mean_rank),
            "mrr" => Some(self.mrr),
            "iamr" => Some(self.iamr),
            "igmr" => Some(self.igmr),
            "aamr" => Some(self.aamr),
            "aamri" => Some(self.aamri),
            _ => {
                let k: usize = name.strip_prefix("hits@")?.parse().ok()?;
                self.hits_at.get(&k).copied()
            }
        }
    }

    /// Format as a one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "MR: {:.1} | MRR: {:.4} | H@10: {:.3} | AAMRI: {:.3} (n={})",
            self.mean_rank,
            self.mrr,
            self.hits_at.get(&10).copied().unwrap_or(0.0),
            self.aamri,
            self.num_ranks,
        )
    }
}

/// Metrics per evaluation side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Head-prediction queries only.
    pub head: RankMetrics,
    /// Tail-prediction queries only.
    pub tail: RankMetrics,
    /// Both sides pooled; the benchmark's reporting side.
    pub both: RankMetrics,
}

/// Filtered rank-based evaluator.
///
/// Drives any [`ScoreModel`] over a test split in batches, filtering
/// candidates by the supplied known-triple sets.
///
/// # Example
///
/// ```rust,ignore
/// let evaluator = RankBasedEvaluator::default();
/// let result = evaluator.evaluate(
///     model.as_ref(),
///     dataset.testing.triples(),
///     &[dataset.training.triples(), dataset.validation.triples(), dataset.testing.triples()],
/// )?;
/// println!("{}", result.both.summary());
/// ```
#[derive(Debug, Clone)]
pub struct RankBasedEvaluator {
    /// Hits@k cutoffs to report.
    pub ks: Vec<usize>,
    /// Number of queries scored per model call.
    pub batch_size: usize,
}

impl Default for RankBasedEvaluator {
    fn default() -> Self {
        Self { ks: DEFAULT_KS.to_vec(), batch_size: 2048 }
    }
}

impl RankBasedEvaluator {
    /// Create an evaluator with explicit cutoffs and batch size.
    pub fn new(ks: Vec<usize>, batch_size: usize) -> Self {
        Self { ks, batch_size: batch_size.max(1) }
    }

    /// Evaluate a model on test triples under the filtered protocol.
    ///
    /// `filters` are the known-true triple sets (conventionally training,
    /// validation, and the test split itself). Scores both prediction
    /// sides for every test triple.
    pub fn evaluate(
        &self,
        model: &dyn ScoreModel,
        test: &[Triple],
        filters: &[&[Triple]],
    ) -> Result<EvaluationResult> {
        let index = FilterIndex::build(filters);
        let num_entities = model.num_entities();

        let mut head_ranks = Vec::with_capacity(test.len());
        let mut tail_ranks = Vec::with_capacity(test.len());
        let mut head_sizes = Vec::with_capacity(test.len());
        let mut tail_sizes = Vec::with_capacity(test.len());

        for chunk in test.chunks(self.batch_size) {
            let hr = Array2::from_shape_fn((chunk.len(), 2), |(i, j)| {
                if j == 0 { chunk[i].head } else { chunk[i].relation }
            });
            let scores = model.score_tail(hr.view())?;
            for (i, triple) in chunk.iter().enumerate() {
                let known = index.tails(triple.head, triple.relation);
                let (rank, size) =
                    filtered_rank(scores.row(i), known, triple.tail, num_entities);
                tail_ranks.push(rank);
                tail_sizes.push(size);
            }

            let rt = Array2::from_shape_fn((chunk.len(), 2), |(i, j)| {
                if j == 0 { chunk[i].relation } else { chunk[i].tail }
            });
            let scores = model.score_head(rt.view())?;
            for (i, triple) in chunk.iter().enumerate() {
                let known = index.heads(triple.relation, triple.tail);
                let (rank, size) =
                    filtered_rank(scores.row(i), known, triple.head, num_entities);
                head_ranks.push(rank);
                head_sizes.push(size);
            }
        }

        let both_ranks: Vec<f64> = head_ranks.iter().chain(&tail_ranks).copied().collect();
        let both_sizes: Vec<usize> = head_sizes.iter().chain(&tail_sizes).copied().collect();

        Ok(EvaluationResult {
            head: RankMetrics::from_ranks(&head_ranks, &head_sizes, &self.ks),
            tail: RankMetrics::from_ranks(&tail_ranks, &tail_sizes, &self.ks),
            both: RankMetrics::from_ranks(&both_ranks, &both_sizes, &self.ks),
        })
    }

    /// Candidate-set sizes this evaluation would see, without scoring.
    pub fn candidate_set_sizes(
        &self,
        test: &[Triple],
        filters: &[&[Triple]],
        num_entities: usize,
    ) -> CandidateSetSizes {
        crate::expectation::candidate_set_sizes(test, filters, num_entities)
    }
}

/// Known-triple lookup keyed by the two fixed query coordinates.
struct FilterIndex {
    tails_by_hr: HashMap<(usize, usize), Vec<usize>>,
    heads_by_rt: HashMap<(usize, usize), Vec<usize>>,
}

impl FilterIndex {
    fn build(filters: &[&[Triple]]) -> Self {
        let mut tails_by_hr: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        let mut heads_by_rt: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for set in filters {
            for t in *set {
                tails_by_hr.entry((t.head, t.relation)).or_default().push(t.tail);
                heads_by_rt.entry((t.relation, t.tail)).or_default().push(t.head);
            }
        }
        Self { tails_by_hr, heads_by_rt }
    }

    fn tails(&self, head: usize, relation: usize) -> &[usize] {
        self.tails_by_hr
            .get(&(head, relation))
            .map_or(&[], Vec::as_slice)
    }

    fn heads(&self, relation: usize, tail: usize) -> &[usize] {
        self.heads_by_rt
            .get(&(relation, tail))
            .map_or(&[], Vec::as_slice)
    }
}

/// Realistic rank of the true answer among unfiltered candidates, plus
/// the candidate-set size.
///
/// Filtered entities (other known-true answers) are excluded from both
/// the comparison and the candidate count; the true answer always stays.
fn filtered_rank(
    scores: ArrayView1<f64>,
    known: &[usize],
    true_idx: usize,
    num_entities: usize,
) -> (f64, usize) {
    let mut filtered = vec![false; num_entities];
    let mut excluded = 0usize;
    for &e in known {
        if e != true_idx && !filtered[e] {
            filtered[e] = true;
            excluded += 1;
        }
    }

    let true_score = scores[true_idx];
    let mut better = 0usize;
    let mut tied = 0usize;
    for (e, &score) in scores.iter().enumerate() {
        if e == true_idx || filtered[e] {
            continue;
        }
        if score > true_score {
            better += 1;
        } else if score == true_score {
            tied += 1;
        }
    }

    let rank = better as f64 + tied as f64 / 2.0 + 1.0;
    (rank, num_entities - excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::PseudoTypeBaseline;
    use ndarray::array;
    use rankle_core::TriplesFactory;

    #[test]
    fn test_filtered_rank_unique_best() {
        let scores = array![0.1, 0.9, 0.5, 0.2];
        let (rank, size) = filtered_rank(scores.view(), &[], 1, 4);
        assert_eq!(rank, 1.0);
        assert_eq!(size, 4);
    }

    #[test]
    fn test_filtered_rank_ties_split_evenly() {
        let scores = array![0.5, 0.5, 0.5, 0.1];
        // Two other candidates tie with the true answer: realistic rank
        // is the middle of ranks {1, 2, 3}.
        let (rank, _) = filtered_rank(scores.view(), &[], 0, 4);
        assert_eq!(rank, 2.0);
    }

    #[test]
    fn test_filtered_rank_removes_known_competitors() {
        let scores = array![0.1, 0.9, 0.5, 0.2];
        // Entity 1 outranks the true answer 2, but is a known true
        // completion and must not count against it.
        let (rank, size) = filtered_rank(scores.view(), &[1], 2, 4);
        assert_eq!(rank, 1.0);
        assert_eq!(size, 3);
    }

    #[test]
    fn test_filtered_rank_never_filters_true_answer() {
        let scores = array![0.9, 0.1];
        let (rank, size) = filtered_rank(scores.view(), &[0, 0, 1], 0, 2);
        assert_eq!(rank, 1.0);
        // Only entity 1 is excluded; duplicates and the true answer are not.
        assert_eq!(size, 1);
    }

    #[test]
    fn test_rank_metrics_values() {
        let ranks = [1.0, 2.0, 4.0];
        let sizes = [10, 10, 10];
        let m = RankMetrics::from_ranks(&ranks, &sizes, &[1, 3, 10]);

        assert!((m.mean_rank - 7.0 / 3.0).abs() < 1e-12);
        assert!((m.mrr - (1.0 + 0.5 + 0.25) / 3.0).abs() < 1e-12);
        assert!((m.iamr - 3.0 / 7.0).abs() < 1e-12);
        assert!((m.igmr - 0.5).abs() < 1e-12); // geometric mean of 1,2,4 is 2
        assert_eq!(m.hits_at[&1], 1.0 / 3.0);
        assert_eq!(m.hits_at[&3], 2.0 / 3.0);
        assert_eq!(m.hits_at[&10], 1.0);
        // Expected mean rank for n=10 is 5.5.
        assert!((m.aamr - (7.0 / 3.0) / 5.5).abs() < 1e-12);
        assert!((m.aamri - (1.0 - (7.0 / 3.0 - 1.0) / 4.5)).abs() < 1e-12);
    }

    #[test]
    fn test_rank_metrics_empty() {
        let m = RankMetrics::from_ranks(&[], &[], &[1, 10]);
        assert_eq!(m.num_ranks, 0);
        assert_eq!(m.mean_rank, 0.0);
        assert_eq!(m.hits_at[&10], 0.0);
    }

    #[test]
    fn test_get_metric_names() {
        let m = RankMetrics::from_ranks(&[2.0], &[5], &[1, 10]);
        assert_eq!(m.get_metric("mean_rank"), Some(2.0));
        assert_eq!(m.get_metric("mrr"), Some(0.5));
        assert_eq!(m.get_metric("hits@10"), Some(1.0));
        assert_eq!(m.get_metric("hits@7"), None);
        assert_eq!(m.get_metric("nonsense"), None);
    }

    #[test]
    fn test_evaluate_toy_graph() {
        let factory = TriplesFactory::new(
            vec![
                Triple::new(0, 0, 1),
                Triple::new(0, 0, 2),
                Triple::new(1, 1, 2),
            ],
            4,
            2,
        )
        .unwrap();
        let model = PseudoTypeBaseline::new(&factory, true).unwrap();

        let test = [Triple::new(0, 0, 1)];
        let train = factory.triples();
        let result = RankBasedEvaluator::new(vec![1, 10], 64)
            .evaluate(&model, &test, &[train, &test])
            .unwrap();

        // Tail side: candidates after filtering out the other known tail
        // (entity 2) are {0, 1, 3}; the true tail 1 scores highest.
        assert_eq!(result.tail.mean_rank, 1.0);
        assert_eq!(result.tail.num_ranks, 1);
        assert_eq!(result.both.num_ranks, 2);
        assert!(result.both.mrr > 0.0);
    }

    #[test]
    fn test_constant_scorer_matches_random_expectation() {
        // A relation never seen in training scores every candidate 0, so
        // its realistic rank must equal the random expectation (n+1)/2.
        let factory = TriplesFactory::new(vec![Triple::new(0, 0, 1)], 5, 2).unwrap();
        let model = PseudoTypeBaseline::new(&factory, false).unwrap();

        let test = [Triple::new(2, 1, 3)];
        let result = RankBasedEvaluator::default()
            .evaluate(&model, &test, &[&test])
            .unwrap();

        // 5 candidates, all tied: realistic rank 3 = (5+1)/2.
        assert_eq!(result.tail.mean_rank, 3.0);
        assert!((result.tail.aamri - 0.0).abs() < 1e-12);
        assert!((result.tail.aamr - 1.0).abs() < 1e-12);
    }
}
