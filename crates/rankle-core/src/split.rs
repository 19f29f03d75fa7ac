use crate::error::{DatasetError, Result};
use crate::triples::Triple;
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

/// Fractions of triples assigned to train/validation/test.
///
/// Must sum to 1 (within floating tolerance). The default is the
/// conventional 80/10/10 split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub validation: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self { train: 0.8, validation: 0.1, test: 0.1 }
    }
}

impl SplitRatios {
    /// Validate that the ratios describe a partition.
    pub fn validate(&self) -> Result<()> {
        if self.train < 0.0 || self.validation < 0.0 || self.test < 0.0 {
            return Err(DatasetError::InvalidRatios(format!(
                "ratios must be non-negative, got {self:?}"
            )));
        }
        let total = self.train + self.validation + self.test;
        if (total - 1.0).abs() > 1e-9 {
            return Err(DatasetError::InvalidRatios(format!(
                "ratios must sum to 1, got {total}"
            )));
        }
        Ok(())
    }
}

/// Partition triples into train/validation/test with a seeded shuffle.
///
/// Deterministic: the same seed always yields the same partition. The
/// three parts together hold exactly the input multiset.
pub fn split_triples(
    triples: &[Triple],
    ratios: SplitRatios,
    seed: u64,
) -> Result<(Vec<Triple>, Vec<Triple>, Vec<Triple>)> {
    ratios.validate()?;

    let mut shuffled = triples.to_vec();
    let mut rng = XorShiftRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let n = shuffled.len();
    let n_train = (n as f64 * ratios.train).round() as usize;
    let n_valid = (n as f64 * ratios.validation).round() as usize;
    let n_train = n_train.min(n);
    let n_valid = n_valid.min(n - n_train);

    let test = shuffled.split_off(n_train + n_valid);
    let validation = shuffled.split_off(n_train);
    Ok((shuffled, validation, test))
}

/// Reshuffle triples into parts of the given sizes.
///
/// Used by remixing, where the original split sizes must be preserved
/// exactly so trial records stay comparable.
pub(crate) fn resplit_sized(
    triples: &[Triple],
    sizes: (usize, usize, usize),
    seed: u64,
) -> (Vec<Triple>, Vec<Triple>, Vec<Triple>) {
    debug_assert_eq!(sizes.0 + sizes.1 + sizes.2, triples.len());

    let mut shuffled = triples.to_vec();
    let mut rng = XorShiftRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let test = shuffled.split_off(sizes.0 + sizes.1);
    let validation = shuffled.split_off(sizes.0);
    (shuffled, validation, test)
}
