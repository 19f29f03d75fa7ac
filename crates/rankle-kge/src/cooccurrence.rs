//! Co-occurrence count matrices over triple columns.
//!
//! A co-occurrence matrix links one triple column (head, relation, or
//! tail) to another, counting how often each pair of values appears
//! together across a triple set. Pseudo-type scoring reads the
//! relation-to-entity matrices; entity co-occurrence scoring reads the
//! entity-to-entity ones.

use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;
use rankle_core::{Triple, TriplesFactory};
use serde::{Deserialize, Serialize};

/// A triple column usable as a matrix axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripleRole {
    /// The head entity column.
    Head,
    /// The relation column.
    Relation,
    /// The tail entity column.
    Tail,
}

impl TripleRole {
    /// Extract this column's id from a triple.
    pub fn of(&self, triple: &Triple) -> usize {
        match self {
            Self::Head => triple.head,
            Self::Relation => triple.relation,
            Self::Tail => triple.tail,
        }
    }

    /// Size of this column's vocabulary.
    pub fn cardinality(&self, factory: &TriplesFactory) -> usize {
        match self {
            Self::Relation => factory.num_relations(),
            Self::Head | Self::Tail => factory.num_entities(),
        }
    }
}

/// Build a sparse co-occurrence count matrix from triples.
///
/// Entry `(r, c)` counts the triples whose `row_role` column equals `r`
/// and whose `col_role` column equals `c`; duplicates accumulate. With
/// `normalize`, each row is divided by its L1 sum so it reads as the
/// empirical distribution of `col_role` values given the row; rows with
/// no observations stay all-zero.
///
/// Pure function of the input triples; fails only if the two roles
/// coincide.
pub fn cooccurrence_matrix(
    factory: &TriplesFactory,
    row_role: TripleRole,
    col_role: TripleRole,
    normalize: bool,
) -> Result<CsrMatrix> {
    if row_role == col_role {
        return Err(Error::InvalidRole { role: row_role });
    }

    let entries = factory
        .triples()
        .iter()
        .map(|t| (row_role.of(t), col_role.of(t), 1.0))
        .collect();
    let mut matrix = CsrMatrix::from_coo(
        row_role.cardinality(factory),
        col_role.cardinality(factory),
        entries,
    );
    if normalize {
        matrix.normalize_rows_l1();
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_factory() -> TriplesFactory {
        TriplesFactory::new(
            vec![
                Triple::new(0, 0, 1),
                Triple::new(0, 0, 2),
                Triple::new(1, 1, 2),
                Triple::new(0, 0, 1), // duplicate
            ],
            4,
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_counts_sum_to_num_triples() {
        let factory = toy_factory();
        let m = cooccurrence_matrix(&factory, TripleRole::Relation, TripleRole::Tail, false)
            .unwrap();
        assert_eq!(m.sum(), factory.num_triples() as f64);
    }

    #[test]
    fn test_duplicates_accumulate() {
        let m = cooccurrence_matrix(&toy_factory(), TripleRole::Relation, TripleRole::Tail, false)
            .unwrap();
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(0, 2), 1.0);
        assert_eq!(m.get(1, 2), 1.0);
    }

    #[test]
    fn test_shape_follows_roles() {
        let factory = toy_factory();
        let m = cooccurrence_matrix(&factory, TripleRole::Tail, TripleRole::Head, false)
            .unwrap();
        assert_eq!((m.rows(), m.cols()), (4, 4));

        let m = cooccurrence_matrix(&factory, TripleRole::Relation, TripleRole::Head, false)
            .unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 4));
    }

    #[test]
    fn test_normalized_rows_sum_to_one_or_zero() {
        let m = cooccurrence_matrix(&toy_factory(), TripleRole::Head, TripleRole::Tail, true)
            .unwrap();
        for total in m.row_sums() {
            assert!(
                total == 0.0 || (total - 1.0).abs() < 1e-12,
                "row sum {total} is neither 0 nor 1"
            );
        }
        // Entities 2 and 3 never occur as heads: zero rows.
        assert_eq!(m.row(2).0.len(), 0);
        assert_eq!(m.row(3).0.len(), 0);
    }

    #[test]
    fn test_identical_roles_rejected() {
        let err = cooccurrence_matrix(&toy_factory(), TripleRole::Head, TripleRole::Head, false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRole { role: TripleRole::Head }));
    }
}
