use crate::cooccurrence::TripleRole;
use thiserror::Error;

/// Errors that can occur in rankle-kge.
#[derive(Error, Debug)]
pub enum Error {
    /// Co-occurrence builder given identical row and column roles.
    #[error("row role and column role must differ, got {role:?} for both")]
    InvalidRole {
        /// The duplicated role.
        role: TripleRole,
    },
    /// The entity-pair index space would exceed the addressable range.
    #[error("entity-pair index space {num_entities}^2 exceeds the addressable integer range")]
    IndexOverflow { num_entities: usize },
    /// Scoring called with a malformed query batch.
    #[error("query batch must be non-empty with 2 columns, got {rows}x{cols}")]
    InvalidBatchShape { rows: usize, cols: usize },
    /// Scoring mode unsupported by evaluation-only models.
    #[error("scoring mode `{mode}` is not supported by evaluation-only models")]
    UnsupportedScoringMode { mode: &'static str },
    /// Dataset error from the data layer.
    #[error(transparent)]
    Dataset(#[from] rankle_core::DatasetError),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for rankle-kge.
pub type Result<T> = std::result::Result<T, Error>;
