//! Benchmark harness for baseline configurations across datasets.
//!
//! Drives every (dataset, configuration) pair through repeated
//! randomized-resplit trials, timing each evaluation and tabulating the
//! standard rank metrics. Units are embarrassingly parallel: each worker
//! owns its matrices and returns its rows, so there is no shared mutable
//! state. A unit that fails is logged with its identity and skipped;
//! sibling units proceed.

use crate::baseline::BaselineConfig;
use crate::error::Result;
use crate::evaluation::{RankBasedEvaluator, DEFAULT_KS};
use rankle_core::Dataset;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Metric column names of the benchmark table, in column order.
pub fn metric_names() -> Vec<String> {
    let mut names = vec!["mrr".to_string(), "iamr".to_string(), "igmr".to_string()];
    names.extend(DEFAULT_KS.iter().map(|k| format!("hits@{k}")));
    names.push("aamr".to_string());
    names.push("aamri".to_string());
    names
}

/// Harness parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Trials per (dataset, configuration) unit; trial `i` remixes with
    /// seed `i`, so runs are reproducible.
    pub trials: usize,
    /// Evaluation batch size.
    pub batch_size: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self { trials: 10, batch_size: 2048 }
    }
}

/// A dataset input to the harness: already in memory, or loaded inside
/// the worker unit from TSV files.
///
/// Per-unit loading means a dataset that fails to load poisons only its
/// own (dataset, configuration) pairs; sibling units still run.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// Use an in-memory dataset directly.
    Loaded(Dataset),
    /// Load three TSV files of integer triples when the unit runs.
    TsvFiles {
        name: String,
        training: PathBuf,
        validation: PathBuf,
        testing: PathBuf,
    },
}

impl DatasetSource {
    /// Dataset identity for logging, available without loading.
    pub fn name(&self) -> &str {
        match self {
            Self::Loaded(dataset) => &dataset.name,
            Self::TsvFiles { name, .. } => name,
        }
    }

    fn load(&self) -> Result<Cow<'_, Dataset>> {
        match self {
            Self::Loaded(dataset) => Ok(Cow::Borrowed(dataset)),
            Self::TsvFiles { name, training, validation, testing } => Ok(Cow::Owned(
                Dataset::from_tsv_files(name.clone(), training, validation, testing)?,
            )),
        }
    }
}

impl From<Dataset> for DatasetSource {
    fn from(dataset: Dataset) -> Self {
        Self::Loaded(dataset)
    }
}

/// One row of the benchmark table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub dataset: String,
    pub entities: usize,
    pub relations: usize,
    pub triples: usize,
    pub trial: usize,
    pub model: String,
    /// `normalize` configuration key; absent for similarity baselines.
    pub normalize: Option<bool>,
    /// `threshold` configuration key; absent for co-occurrence baselines.
    pub threshold: Option<f64>,
    /// Evaluation wall-clock seconds.
    pub time: f64,
    /// Metric values keyed as in [`metric_names`].
    pub metrics: Vec<(String, f64)>,
}

/// Run the full benchmark grid.
///
/// Every (dataset, configuration) pair is an independent unit with no
/// shared mutable state; units run in parallel and a failed unit is
/// logged and skipped without affecting its siblings. Returns the
/// concatenated trial rows of every unit that succeeded, ordered by
/// (dataset, configuration) position and trial index.
pub fn run_benchmark(
    datasets: &[DatasetSource],
    configs: &[BaselineConfig],
    bench: &BenchmarkConfig,
) -> Vec<BenchmarkRecord> {
    let units: Vec<(&DatasetSource, &BaselineConfig)> = datasets
        .iter()
        .flat_map(|d| configs.iter().map(move |c| (d, c)))
        .collect();

    units
        .into_par_iter()
        .filter_map(|(source, config)| {
            match run_unit(source, config, bench) {
                Ok(records) => Some(records),
                Err(e) => {
                    warn!(
                        dataset = source.name(),
                        model = config.model_name(),
                        error = %e,
                        "benchmark unit failed; skipping"
                    );
                    None
                }
            }
        })
        .flatten()
        .collect()
}

/// Run all trials of one (dataset, configuration) unit.
fn run_unit(
    source: &DatasetSource,
    config: &BaselineConfig,
    bench: &BenchmarkConfig,
) -> Result<Vec<BenchmarkRecord>> {
    let dataset = source.load()?;
    let summary = dataset.summary();
    debug!(
        dataset = %summary.name,
        model = config.model_name(),
        trials = bench.trials,
        "starting benchmark unit"
    );

    let evaluator = RankBasedEvaluator::new(DEFAULT_KS.to_vec(), bench.batch_size);
    let mut records = Vec::with_capacity(bench.trials);

    for trial in 0..bench.trials {
        let trial_dataset = dataset.remix(trial as u64);
        let model = config.build(&trial_dataset.training)?;

        let start = Instant::now();
        let result = evaluator.evaluate(
            model.as_ref(),
            trial_dataset.testing.triples(),
            &[
                trial_dataset.training.triples(),
                trial_dataset.validation.triples(),
                trial_dataset.testing.triples(),
            ],
        )?;
        let elapsed = start.elapsed().as_secs_f64();

        let metrics = metric_names()
            .into_iter()
            .map(|name| {
                let value = result.both.get_metric(&name).unwrap_or(f64::NAN);
                (name, value)
            })
            .collect();

        records.push(BenchmarkRecord {
            dataset: summary.name.clone(),
            entities: summary.num_entities,
            relations: summary.num_relations,
            triples: summary.num_triples,
            trial,
            model: config.model_name().to_string(),
            normalize: config.normalize(),
            threshold: config.threshold(),
            time: elapsed,
            metrics,
        });
    }

    Ok(records)
}

/// Write records as a TSV table with a header row.
///
/// Optional configuration keys render as empty cells, so the column set
/// is identical for every model.
pub fn write_tsv(records: &[BenchmarkRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    let mut header = vec![
        "dataset".to_string(),
        "entities".to_string(),
        "relations".to_string(),
        "triples".to_string(),
        "trial".to_string(),
        "model".to_string(),
        "normalize".to_string(),
        "threshold".to_string(),
        "time".to_string(),
    ];
    header.extend(metric_names());
    writeln!(out, "{}", header.join("\t"))?;

    for r in records {
        let mut fields = vec![
            r.dataset.clone(),
            r.entities.to_string(),
            r.relations.to_string(),
            r.triples.to_string(),
            r.trial.to_string(),
            r.model.clone(),
            r.normalize.map(|b| b.to_string()).unwrap_or_default(),
            r.threshold.map(|t| t.to_string()).unwrap_or_default(),
            r.time.to_string(),
        ];
        fields.extend(r.metrics.iter().map(|(_, v)| v.to_string()));
        writeln!(out, "{}", fields.join("\t"))?;
    }

    Ok(())
}
