use menu_store::StoreError;
use menu_types::TypeError;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("ledger index lock poisoned")]
    LockPoisoned,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns `true` for attempted mutation of recorded price facts.
    pub fn is_immutability_violation(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_immutability_violation())
    }
}

impl From<TypeError> for LedgerError {
    fn from(e: TypeError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}
