//! Non-parametric link-prediction baselines.
//!
//! Three evaluation-only models that score candidates straight from
//! co-occurrence statistics of the training triples, with no trainable
//! parameters:
//!
//! | Baseline | Tail score for (h, r, ?) depends on |
//! |----------|-------------------------------------|
//! | Pseudo-type | the relation's observed tail distribution (ignores h) |
//! | Entity co-occurrence | which tails co-occur with h anywhere (ignores r) |
//! | Soft inverse triple | relations similar to r, and to r's inverse |
//!
//! All three plug into the same [`ScoreModel`] interface as trained
//! models, so the filtered rank evaluation pipeline treats them
//! identically. Despite their simplicity they are strong reference
//! points; any learned model failing to beat them on a benchmark has
//! learned very little.

use crate::cooccurrence::{cooccurrence_matrix, TripleRole};
use crate::error::{Error, Result};
use crate::similarity::relation_similarity;
use crate::sparse::CsrMatrix;
use ndarray::{Array1, Array2, ArrayView2};
use rankle_core::TriplesFactory;
use serde::{Deserialize, Serialize};

/// Scoring interface shared by baselines and trained models.
///
/// Query batches are integer arrays of shape `(batch, 2)`: `(head,
/// relation)` rows for tail scoring, `(relation, tail)` rows for head
/// scoring. Scores come back dense, one row per query over all candidate
/// entities; higher means more plausible.
///
/// Full-triple and relation scoring have default implementations that
/// fail with [`Error::UnsupportedScoringMode`]; trained models override
/// them, evaluation-only baselines never do.
pub trait ScoreModel: Send + Sync {
    /// Entity vocabulary size (the width of every score matrix).
    fn num_entities(&self) -> usize;

    /// Model name for benchmark records.
    fn name(&self) -> &'static str;

    /// Score all candidate tails for each `(head, relation)` query row.
    fn score_tail(&self, hr_batch: ArrayView2<usize>) -> Result<Array2<f64>>;

    /// Score all candidate heads for each `(relation, tail)` query row.
    fn score_head(&self, rt_batch: ArrayView2<usize>) -> Result<Array2<f64>>;

    /// Score fully-specified `(head, relation, tail)` rows.
    fn score_hrt(&self, _hrt_batch: ArrayView2<usize>) -> Result<Array1<f64>> {
        Err(Error::UnsupportedScoringMode { mode: "hrt" })
    }

    /// Score all candidate relations for each `(head, tail)` query row.
    fn score_relation(&self, _ht_batch: ArrayView2<usize>) -> Result<Array2<f64>> {
        Err(Error::UnsupportedScoringMode { mode: "relation" })
    }
}

/// Reject empty batches and batches without exactly two columns.
fn check_batch(batch: &ArrayView2<usize>) -> Result<()> {
    if batch.nrows() == 0 || batch.ncols() != 2 {
        return Err(Error::InvalidBatchShape {
            rows: batch.nrows(),
            cols: batch.ncols(),
        });
    }
    Ok(())
}

/// Broadcast one stored row per query into a dense score matrix.
fn gather_rows(
    matrix: &CsrMatrix,
    batch: ArrayView2<usize>,
    key_column: usize,
) -> Array2<f64> {
    let mut scores = Array2::zeros((batch.nrows(), matrix.cols()));
    for (i, query) in batch.rows().into_iter().enumerate() {
        matrix.scatter_row(query[key_column], 1.0, scores.row_mut(i));
    }
    scores
}

/// Score based on relation-entity co-occurrence.
///
/// `score_tail(h, r)` is row `r` of the relation-to-tail count matrix,
/// identical for every head: the baseline models only which entity
/// "types" a relation connects.
#[derive(Debug, Clone)]
pub struct PseudoTypeBaseline {
    head_per_relation: CsrMatrix,
    tail_per_relation: CsrMatrix,
    num_entities: usize,
}

impl PseudoTypeBaseline {
    /// Build from a training factory; row-normalizes when `normalize`.
    pub fn new(factory: &TriplesFactory, normalize: bool) -> Result<Self> {
        Ok(Self {
            head_per_relation: cooccurrence_matrix(
                factory,
                TripleRole::Relation,
                TripleRole::Head,
                normalize,
            )?,
            tail_per_relation: cooccurrence_matrix(
                factory,
                TripleRole::Relation,
                TripleRole::Tail,
                normalize,
            )?,
            num_entities: factory.num_entities(),
        })
    }
}

impl ScoreModel for PseudoTypeBaseline {
    fn num_entities(&self) -> usize {
        self.num_entities
    }

    fn name(&self) -> &'static str {
        "PseudoType"
    }

    fn score_tail(&self, hr_batch: ArrayView2<usize>) -> Result<Array2<f64>> {
        check_batch(&hr_batch)?;
        Ok(gather_rows(&self.tail_per_relation, hr_batch, 1))
    }

    fn score_head(&self, rt_batch: ArrayView2<usize>) -> Result<Array2<f64>> {
        check_batch(&rt_batch)?;
        Ok(gather_rows(&self.head_per_relation, rt_batch, 0))
    }
}

/// Score based on entity-entity co-occurrence.
///
/// `score_tail(h, r)` is row `h` of the head-to-tail count matrix: a
/// candidate tail scores by how often it appears with the given head
/// anywhere in the graph, regardless of relation.
#[derive(Debug, Clone)]
pub struct EntityCoOccurrenceBaseline {
    head_per_tail: CsrMatrix,
    tail_per_head: CsrMatrix,
    num_entities: usize,
}

impl EntityCoOccurrenceBaseline {
    /// Build from a training factory; row-normalizes when `normalize`.
    pub fn new(factory: &TriplesFactory, normalize: bool) -> Result<Self> {
        Ok(Self {
            head_per_tail: cooccurrence_matrix(
                factory,
                TripleRole::Tail,
                TripleRole::Head,
                normalize,
            )?,
            tail_per_head: cooccurrence_matrix(
                factory,
                TripleRole::Head,
                TripleRole::Tail,
                normalize,
            )?,
            num_entities: factory.num_entities(),
        })
    }
}

impl ScoreModel for EntityCoOccurrenceBaseline {
    fn num_entities(&self) -> usize {
        self.num_entities
    }

    fn name(&self) -> &'static str {
        "EntityCoOccurrence"
    }

    fn score_tail(&self, hr_batch: ArrayView2<usize>) -> Result<Array2<f64>> {
        check_batch(&hr_batch)?;
        Ok(gather_rows(&self.tail_per_head, hr_batch, 0))
    }

    fn score_head(&self, rt_batch: ArrayView2<usize>) -> Result<Array2<f64>> {
        check_batch(&rt_batch)?;
        Ok(gather_rows(&self.head_per_tail, rt_batch, 1))
    }
}

/// Score based on relation similarity.
///
/// Aggregates tail evidence from relations similar to the query relation,
/// plus head evidence (read as tail evidence) from relations similar to
/// the query relation's inverse:
///
/// ```text
/// score_tail(h, r) = sim[r] · rel_to_tail + sim_inv[r] · rel_to_head
/// ```
///
/// The only baseline whose scores carry relation semantics beyond raw
/// co-occurrence.
#[derive(Debug, Clone)]
pub struct SoftInverseTripleBaseline {
    sim: CsrMatrix,
    sim_inv: CsrMatrix,
    rel_to_head: CsrMatrix,
    rel_to_tail: CsrMatrix,
    num_entities: usize,
}

impl SoftInverseTripleBaseline {
    /// Build from a training factory, pruning similarities below
    /// `threshold`.
    pub fn new(factory: &TriplesFactory, threshold: Option<f64>) -> Result<Self> {
        Ok(Self {
            sim: relation_similarity(factory, false, threshold)?,
            sim_inv: relation_similarity(factory, true, threshold)?,
            rel_to_head: cooccurrence_matrix(
                factory,
                TripleRole::Relation,
                TripleRole::Head,
                false,
            )?,
            rel_to_tail: cooccurrence_matrix(
                factory,
                TripleRole::Relation,
                TripleRole::Tail,
                false,
            )?,
            num_entities: factory.num_entities(),
        })
    }

    /// Accumulate `sim[r] · counts` into one dense score row.
    fn propagate(
        similarity: &CsrMatrix,
        counts: &CsrMatrix,
        relation: usize,
        out: &mut ndarray::ArrayViewMut1<f64>,
    ) {
        let (relations, weights) = similarity.row(relation);
        for (&other, &weight) in relations.iter().zip(weights) {
            counts.scatter_row(other, weight, out.view_mut());
        }
    }
}

impl ScoreModel for SoftInverseTripleBaseline {
    fn num_entities(&self) -> usize {
        self.num_entities
    }

    fn name(&self) -> &'static str {
        "SoftInverseTriple"
    }

    fn score_tail(&self, hr_batch: ArrayView2<usize>) -> Result<Array2<f64>> {
        check_batch(&hr_batch)?;
        let mut scores = Array2::zeros((hr_batch.nrows(), self.num_entities));
        for (i, query) in hr_batch.rows().into_iter().enumerate() {
            let r = query[1];
            let mut row = scores.row_mut(i);
            Self::propagate(&self.sim, &self.rel_to_tail, r, &mut row);
            Self::propagate(&self.sim_inv, &self.rel_to_head, r, &mut row);
        }
        Ok(scores)
    }

    fn score_head(&self, rt_batch: ArrayView2<usize>) -> Result<Array2<f64>> {
        check_batch(&rt_batch)?;
        let mut scores = Array2::zeros((rt_batch.nrows(), self.num_entities));
        for (i, query) in rt_batch.rows().into_iter().enumerate() {
            let r = query[0];
            let mut row = scores.row_mut(i);
            Self::propagate(&self.sim, &self.rel_to_head, r, &mut row);
            Self::propagate(&self.sim_inv, &self.rel_to_tail, r, &mut row);
        }
        Ok(scores)
    }
}

/// A baseline variant plus its construction parameters.
///
/// The benchmark harness iterates these, building a fresh model per
/// trial; the accessors surface the configuration-key columns of the
/// results table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BaselineConfig {
    PseudoType { normalize: bool },
    EntityCoOccurrence { normalize: bool },
    SoftInverseTriple { threshold: Option<f64> },
}

impl BaselineConfig {
    /// The benchmark's standard trio of configurations.
    pub fn standard_suite() -> Vec<Self> {
        vec![
            Self::PseudoType { normalize: true },
            Self::EntityCoOccurrence { normalize: true },
            Self::SoftInverseTriple { threshold: Some(0.97) },
        ]
    }

    /// Instantiate the configured baseline on a training factory.
    pub fn build(&self, factory: &TriplesFactory) -> Result<Box<dyn ScoreModel>> {
        Ok(match *self {
            Self::PseudoType { normalize } => {
                Box::new(PseudoTypeBaseline::new(factory, normalize)?)
            }
            Self::EntityCoOccurrence { normalize } => {
                Box::new(EntityCoOccurrenceBaseline::new(factory, normalize)?)
            }
            Self::SoftInverseTriple { threshold } => {
                Box::new(SoftInverseTripleBaseline::new(factory, threshold)?)
            }
        })
    }

    /// Model name column.
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::PseudoType { .. } => "PseudoType",
            Self::EntityCoOccurrence { .. } => "EntityCoOccurrence",
            Self::SoftInverseTriple { .. } => "SoftInverseTriple",
        }
    }

    /// `normalize` configuration column, where applicable.
    pub fn normalize(&self) -> Option<bool> {
        match *self {
            Self::PseudoType { normalize } | Self::EntityCoOccurrence { normalize } => {
                Some(normalize)
            }
            Self::SoftInverseTriple { .. } => None,
        }
    }

    /// `threshold` configuration column, where applicable.
    pub fn threshold(&self) -> Option<f64> {
        match *self {
            Self::SoftInverseTriple { threshold } => threshold,
            _ => None,
        }
    }
}
