use crate::error::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dense entity index in `[0, num_entities)`.
pub type EntityId = usize;

/// Dense relation index in `[0, num_relations)`.
pub type RelationId = usize;

/// An integer-encoded (head, relation, tail) statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Head entity (subject).
    pub head: EntityId,
    /// Relation (predicate).
    pub relation: RelationId,
    /// Tail entity (object).
    pub tail: EntityId,
}

impl Triple {
    /// Create a new triple.
    pub fn new(head: EntityId, relation: RelationId, tail: EntityId) -> Self {
        Self { head, relation, tail }
    }
}

/// A fixed entity/relation vocabulary plus an ordered triple sequence.
///
/// Duplicate triples are allowed and preserved; iteration order follows
/// insertion order so downstream consumers are reproducible.
///
/// # Example
///
/// ```rust
/// use rankle_core::{Triple, TriplesFactory};
///
/// let factory = TriplesFactory::new(
///     vec![Triple::new(0, 0, 1), Triple::new(1, 0, 2)],
///     4, // num_entities
///     2, // num_relations
/// ).unwrap();
///
/// assert_eq!(factory.num_triples(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplesFactory {
    triples: Vec<Triple>,
    num_entities: usize,
    num_relations: usize,
}

impl TriplesFactory {
    /// Create a factory with an explicit vocabulary size.
    ///
    /// Fails if any triple references an id outside the declared ranges.
    pub fn new(triples: Vec<Triple>, num_entities: usize, num_relations: usize) -> Result<Self> {
        for t in &triples {
            if t.head >= num_entities {
                return Err(DatasetError::EntityOutOfRange { id: t.head, num_entities });
            }
            if t.tail >= num_entities {
                return Err(DatasetError::EntityOutOfRange { id: t.tail, num_entities });
            }
            if t.relation >= num_relations {
                return Err(DatasetError::RelationOutOfRange {
                    id: t.relation,
                    num_relations,
                });
            }
        }
        Ok(Self { triples, num_entities, num_relations })
    }

    /// Create a factory inferring vocabulary sizes as `max id + 1`.
    pub fn from_triples(triples: Vec<Triple>) -> Self {
        let num_entities = triples
            .iter()
            .map(|t| t.head.max(t.tail) + 1)
            .max()
            .unwrap_or(0);
        let num_relations = triples.iter().map(|t| t.relation + 1).max().unwrap_or(0);
        Self { triples, num_entities, num_relations }
    }

    /// Load whitespace-separated integer triples from a TSV file.
    ///
    /// Blank lines and lines starting with `#` are skipped. Vocabulary
    /// sizes are inferred from the data.
    pub fn from_tsv_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut triples = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let mut next = |name: &str| -> Result<usize> {
                fields
                    .next()
                    .ok_or_else(|| DatasetError::Parse {
                        line: idx + 1,
                        reason: format!("missing {name} column"),
                    })?
                    .parse()
                    .map_err(|e| DatasetError::Parse {
                        line: idx + 1,
                        reason: format!("{name}: {e}"),
                    })
            };
            let head = next("head")?;
            let relation = next("relation")?;
            let tail = next("tail")?;
            triples.push(Triple::new(head, relation, tail));
        }

        Ok(Self::from_triples(triples))
    }

    /// Re-declare the vocabulary sizes, e.g. to widen a split to the
    /// whole dataset's vocabulary.
    pub fn with_vocabulary(self, num_entities: usize, num_relations: usize) -> Result<Self> {
        Self::new(self.triples, num_entities, num_relations)
    }

    /// The ordered triple sequence.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Number of triples (duplicates counted).
    pub fn num_triples(&self) -> usize {
        self.triples.len()
    }

    /// Entity vocabulary size.
    pub fn num_entities(&self) -> usize {
        self.num_entities
    }

    /// Relation vocabulary size.
    pub fn num_relations(&self) -> usize {
        self.num_relations
    }
}
