use crate::policy::Mutation;
use crate::traits::RowId;

/// Errors from table operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// An UPDATE or DELETE was issued against an append-only table.
    #[error("immutability violation: {operation} on append-only table '{table}' (row {row})")]
    ImmutabilityViolation {
        table: String,
        operation: Mutation,
        row: RowId,
    },

    /// An insert collided with an existing unique key.
    #[error("unique constraint '{constraint}' violated on table '{table}' for key '{key}'")]
    UniqueViolation {
        table: String,
        constraint: String,
        key: String,
    },

    /// The requested row does not exist.
    #[error("row {row} not found in table '{table}'")]
    RowNotFound { table: String, row: RowId },

    /// A lock guarding the table was poisoned by a panicking writer.
    #[error("table '{table}' lock poisoned")]
    LockPoisoned { table: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns `true` for attempted mutation of append-only data.
    pub fn is_immutability_violation(&self) -> bool {
        matches!(self, Self::ImmutabilityViolation { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
