use clinchart_persistence::PersistenceError;
use thiserror::Error;

use crate::temporal::TemporalError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A timestamp in the backing file failed to parse; the load is
    /// aborted and the store keeps its prior contents.
    #[error("row {row}: {source}")]
    RowTimestamp {
        /// 1-based data row number (header excluded).
        row: usize,
        #[source]
        source: TemporalError,
    },

    /// File header does not match the expected schema.
    #[error("unexpected file schema: expected columns [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },

    #[error("row {row} does not exist (store has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("unknown record type: {0}")]
    UnknownKind(String),

    #[error("no file is bound to the session")]
    NoFileBound,
}

pub type Result<T> = std::result::Result<T, CoreError>;
