use menu_crypto::CanonicalError;
use menu_ledger::LedgerError;
use menu_store::StoreError;
use menu_types::OrganizationId;

use crate::reference::ReferenceError;

/// Errors produced by snapshot building, storage, and verification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("version {version} for organization {organization} is already taken or out of sequence")]
    VersionConflict {
        organization: OrganizationId,
        version: u64,
    },

    #[error("canonicalization failed: {0}")]
    Canonical(#[from] CanonicalError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ReferenceError> for SnapshotError {
    fn from(e: ReferenceError) -> Self {
        Self::BuildFailed(e.to_string())
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
