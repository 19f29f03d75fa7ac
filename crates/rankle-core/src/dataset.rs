use crate::error::{DatasetError, Result};
use crate::split::{resplit_sized, split_triples, SplitRatios};
use crate::triples::{Triple, TriplesFactory};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named dataset: train/validation/test factories over one vocabulary.
///
/// All three splits share the same entity and relation counts, so ids are
/// interchangeable across them. The standard evaluation protocol scores a
/// model built from `training` against `testing`, filtering by all three.
///
/// # Example
///
/// ```rust
/// use rankle_core::{Dataset, SplitRatios, Triple, TriplesFactory};
///
/// let factory = TriplesFactory::from_triples(
///     (0..50).map(|i| Triple::new(i % 10, i % 3, (i + 1) % 10)).collect(),
/// );
/// let dataset = Dataset::split("toy", factory, SplitRatios::default(), 0).unwrap();
///
/// // A remix reassigns triples to splits but keeps sizes and vocabulary.
/// let remixed = dataset.remix(1);
/// assert_eq!(remixed.training.num_triples(), dataset.training.num_triples());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset name, used as the identity in benchmark records.
    pub name: String,
    pub training: TriplesFactory,
    pub validation: TriplesFactory,
    pub testing: TriplesFactory,
}

/// Per-dataset statistics reported in benchmark records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub name: String,
    pub num_entities: usize,
    pub num_relations: usize,
    /// Training triple count (the benchmark's size column).
    pub num_triples: usize,
}

impl Dataset {
    /// Assemble a dataset from three pre-built factories.
    ///
    /// Fails unless all parts declare the same vocabulary sizes.
    pub fn new(
        name: impl Into<String>,
        training: TriplesFactory,
        validation: TriplesFactory,
        testing: TriplesFactory,
    ) -> Result<Self> {
        let (e, r) = (training.num_entities(), training.num_relations());
        for (part, factory) in [("validation", &validation), ("testing", &testing)] {
            if factory.num_entities() != e || factory.num_relations() != r {
                return Err(DatasetError::VocabularyMismatch(format!(
                    "{part} declares {}x{}, training declares {e}x{r}",
                    factory.num_entities(),
                    factory.num_relations(),
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            training,
            validation,
            testing,
        })
    }

    /// Split a single factory into a dataset with a seeded shuffle.
    pub fn split(
        name: impl Into<String>,
        factory: TriplesFactory,
        ratios: SplitRatios,
        seed: u64,
    ) -> Result<Self> {
        let (e, r) = (factory.num_entities(), factory.num_relations());
        let (train, valid, test) = split_triples(factory.triples(), ratios, seed)?;
        Self::new(
            name,
            TriplesFactory::new(train, e, r)?,
            TriplesFactory::new(valid, e, r)?,
            TriplesFactory::new(test, e, r)?,
        )
    }

    /// Load a dataset from three TSV files of integer triples.
    ///
    /// The vocabulary is the union over all three files, so ids unseen in
    /// training but present in validation/testing still fit.
    pub fn from_tsv_files(
        name: impl Into<String>,
        training: impl AsRef<Path>,
        validation: impl AsRef<Path>,
        testing: impl AsRef<Path>,
    ) -> Result<Self> {
        let training = TriplesFactory::from_tsv_file(training)?;
        let validation = TriplesFactory::from_tsv_file(validation)?;
        let testing = TriplesFactory::from_tsv_file(testing)?;

        let e = training
            .num_entities()
            .max(validation.num_entities())
            .max(testing.num_entities());
        let r = training
            .num_relations()
            .max(validation.num_relations())
            .max(testing.num_relations());

        Self::new(
            name,
            training.with_vocabulary(e, r)?,
            validation.with_vocabulary(e, r)?,
            testing.with_vocabulary(e, r)?,
        )
    }

    /// Re-derive a randomized split of the pooled triples ("remix").
    ///
    /// Split sizes and vocabulary are preserved exactly; only the
    /// assignment of triples to splits changes. Deterministic per seed,
    /// so trial `i` of a benchmark always sees the same resplit.
    pub fn remix(&self, seed: u64) -> Self {
        let pooled: Vec<Triple> = self
            .training
            .triples()
            .iter()
            .chain(self.validation.triples())
            .chain(self.testing.triples())
            .copied()
            .collect();
        let sizes = (
            self.training.num_triples(),
            self.validation.num_triples(),
            self.testing.num_triples(),
        );
        let (train, valid, test) = resplit_sized(&pooled, sizes, seed);

        let (e, r) = (self.num_entities(), self.num_relations());
        // Ids were valid before pooling, so re-validation cannot fail.
        Self {
            name: self.name.clone(),
            training: TriplesFactory::new(train, e, r).unwrap_or_else(|_| unreachable!()),
            validation: TriplesFactory::new(valid, e, r).unwrap_or_else(|_| unreachable!()),
            testing: TriplesFactory::new(test, e, r).unwrap_or_else(|_| unreachable!()),
        }
    }

    /// Entity vocabulary size shared by all splits.
    pub fn num_entities(&self) -> usize {
        self.training.num_entities()
    }

    /// Relation vocabulary size shared by all splits.
    pub fn num_relations(&self) -> usize {
        self.training.num_relations()
    }

    /// Statistics for benchmark records.
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            name: self.name.clone(),
            num_entities: self.num_entities(),
            num_relations: self.num_relations(),
            num_triples: self.training.num_triples(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_dataset() -> Dataset {
        let factory = TriplesFactory::from_triples(
            (0..60)
                .map(|i| Triple::new(i % 12, i % 4, (i * 7 + 1) % 12))
                .collect(),
        );
        Dataset::split("toy", factory, SplitRatios::default(), 0).unwrap()
    }

    #[test]
    fn test_split_dataset_sizes() {
        let ds = toy_dataset();
        assert_eq!(ds.training.num_triples(), 48);
        assert_eq!(ds.validation.num_triples(), 6);
        assert_eq!(ds.testing.num_triples(), 6);
        assert_eq!(ds.num_entities(), 12);
        assert_eq!(ds.num_relations(), 4);
    }

    #[test]
    fn test_vocabulary_mismatch_rejected() {
        let a = TriplesFactory::new(vec![Triple::new(0, 0, 1)], 4, 2).unwrap();
        let b = TriplesFactory::new(vec![Triple::new(0, 0, 1)], 5, 2).unwrap();
        let err = Dataset::new("bad", a.clone(), b, a).unwrap_err();
        assert!(matches!(err, DatasetError::VocabularyMismatch(_)));
    }

    #[test]
    fn test_remix_deterministic() {
        let ds = toy_dataset();
        assert_eq!(ds.remix(3), ds.remix(3));
        assert_ne!(ds.remix(3).training, ds.remix(4).training);
    }

    #[test]
    fn test_remix_preserves_sizes_and_multiset() {
        let ds = toy_dataset();
        let remixed = ds.remix(5);

        assert_eq!(remixed.training.num_triples(), ds.training.num_triples());
        assert_eq!(remixed.validation.num_triples(), ds.validation.num_triples());
        assert_eq!(remixed.testing.num_triples(), ds.testing.num_triples());

        let collect = |d: &Dataset| {
            let mut all: Vec<_> = d
                .training
                .triples()
                .iter()
                .chain(d.validation.triples())
                .chain(d.testing.triples())
                .copied()
                .collect();
            all.sort_unstable_by_key(|t| (t.head, t.relation, t.tail));
            all
        };
        assert_eq!(collect(&ds), collect(&remixed));
    }

    #[test]
    fn test_summary() {
        let ds = toy_dataset();
        let summary = ds.summary();
        assert_eq!(summary.name, "toy");
        assert_eq!(summary.num_triples, 48);
    }
}
