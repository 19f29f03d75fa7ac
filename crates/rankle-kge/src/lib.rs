//! Non-parametric baselines and rank analytics for knowledge graph
//! link prediction.
//!
//! Given integer-encoded (head, relation, tail) triples, this crate
//! scores candidate completions with statistics read straight off the
//! training split — no gradients, no embeddings — and evaluates any
//! scorer under the standard filtered ranking protocol.
//!
//! # The Link Prediction Task
//!
//! For a test triple (h, r, t) we ask two questions: which tail fits
//! (h, r, ?), and which head fits (?, r, t)? A scorer answers with a
//! dense score per candidate entity; evaluation ranks the true answer
//! among candidates, filtering out other known-true completions.
//!
//! # What's Here
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`sparse`] | CSR matrices built by coordinate accumulation |
//! | [`cooccurrence`] | relation/entity co-occurrence counts |
//! | [`similarity`] | Jaccard relation similarity, direct and inverse |
//! | [`baseline`] | [`ScoreModel`] trait + three evaluation-only baselines |
//! | [`evaluation`] | filtered rank evaluation, mrr/hits@k/aamr/aamri |
//! | [`expectation`] | candidate-set sizes and closed-form expected metrics |
//! | [`sampling`] | negative-sampling contract for training collaborators |
//! | [`benchmark`] | dataset x configuration x trial harness |
//!
//! # Why Baselines
//!
//! The expected-metric machinery answers "how good is random?" exactly;
//! the baselines answer "how good is counting?". Together they bracket
//! the interesting region: a trained model that cannot clear both has
//! learned nothing the training-split statistics didn't already know
//! (Berrendorf et al. 2020 make the same point with the adjusted mean
//! rank index).
//!
//! # Example
//!
//! ```rust
//! use ndarray::array;
//! use rankle_core::{Triple, TriplesFactory};
//! use rankle_kge::baseline::{PseudoTypeBaseline, ScoreModel};
//!
//! let factory = TriplesFactory::from_triples(vec![
//!     Triple::new(0, 0, 1),
//!     Triple::new(0, 0, 2),
//!     Triple::new(1, 1, 2),
//! ]);
//!
//! let model = PseudoTypeBaseline::new(&factory, true).unwrap();
//! let scores = model.score_tail(array![[0, 0]].view()).unwrap();
//! assert!(scores[[0, 1]] > scores[[0, 0]]);
//! ```

pub mod baseline;
pub mod benchmark;
pub mod cooccurrence;
mod error;
pub mod evaluation;
pub mod expectation;
pub mod sampling;
pub mod similarity;
pub mod sparse;

pub use baseline::{
    BaselineConfig, EntityCoOccurrenceBaseline, PseudoTypeBaseline, ScoreModel,
    SoftInverseTripleBaseline,
};
pub use benchmark::{
    run_benchmark, write_tsv, BenchmarkConfig, BenchmarkRecord, DatasetSource,
};
pub use cooccurrence::{cooccurrence_matrix, TripleRole};
pub use error::{Error, Result};
pub use evaluation::{EvaluationResult, RankBasedEvaluator, RankMetrics};
pub use expectation::{
    candidate_set_sizes, expected_hits_at_k, expected_mean_rank, CandidateSetSizes,
    ExpectedMetricReport,
};
pub use sampling::{NegativeSampler, UniformNegativeSampler};
pub use similarity::relation_similarity;
pub use sparse::CsrMatrix;
