//! Error types for the ledger engine and its record stores.

use crate::record::{RecordId, RecordKind};
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Result type alias for record store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during engine operation.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Rejected user input. Nothing was changed.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The id of a mutation target does not match any record
    #[error("No {kind} with id {id}")]
    NotFound { kind: RecordKind, id: RecordId },

    /// Durable write or load failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An operation needed a signed-in session
    #[error("Not signed in. Run `ledger login` first")]
    NoSession,

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}

/// Errors raised by a [`RecordStore`](crate::store::RecordStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed ledger document: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend holds no record with this id for the user
    #[error("no stored {kind} with id {id}")]
    MissingRecord { kind: RecordKind, id: RecordId },
}
