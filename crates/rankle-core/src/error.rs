use thiserror::Error;

/// Errors from loading or partitioning triple data.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// IO error while reading a triple file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A line could not be parsed as three integer ids.
    #[error("malformed triple at line {line}: {reason}")]
    Parse {
        /// 1-based line number in the source file.
        line: usize,
        /// What went wrong.
        reason: String,
    },
    /// An entity id exceeds the declared vocabulary size.
    #[error("entity id {id} out of range (num_entities = {num_entities})")]
    EntityOutOfRange { id: usize, num_entities: usize },
    /// A relation id exceeds the declared vocabulary size.
    #[error("relation id {id} out of range (num_relations = {num_relations})")]
    RelationOutOfRange { id: usize, num_relations: usize },
    /// Split ratios do not describe a valid partition.
    #[error("invalid split ratios: {0}")]
    InvalidRatios(String),
    /// Dataset parts disagree on vocabulary sizes.
    #[error("vocabulary mismatch between dataset splits: {0}")]
    VocabularyMismatch(String),
}

/// Result type alias for rankle-core.
pub type Result<T> = std::result::Result<T, DatasetError>;
