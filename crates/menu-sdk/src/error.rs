use thiserror::Error;

use menu_ledger::LedgerError;
use menu_snapshot::{ReferenceError, SnapshotError};
use menu_store::StoreError;
use menu_types::{OrganizationId, TypeError};

/// Errors surfaced to callers of the menu ledger service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MenuError {
    /// Malformed input. Never retried automatically.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Attempted mutation of append-only data.
    #[error("immutability violation: {0}")]
    ImmutabilityViolation(String),

    /// Every attempt to claim the next version lost a race.
    #[error("concurrent publish for {organization}: no free version after {attempts} attempts")]
    ConcurrentVersionConflict {
        organization: OrganizationId,
        attempts: u32,
    },

    /// Reference data or prices could not be read.
    #[error("snapshot build failed: {0}")]
    BuildFailed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MenuError {
    /// Reference failure outside a snapshot build, such as resolving the
    /// organization that owns an item.
    pub fn from_lookup(e: ReferenceError) -> Self {
        match e {
            ReferenceError::Unavailable(msg) => Self::Storage(msg),
            ReferenceError::UnknownOrganization(_) | ReferenceError::UnknownCategory(_) => {
                Self::NotFound(e.to_string())
            }
        }
    }

    /// Whether retrying the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentVersionConflict { .. } | Self::BuildFailed(_)
        )
    }
}

impl From<StoreError> for MenuError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ImmutabilityViolation { .. } => Self::ImmutabilityViolation(e.to_string()),
            StoreError::RowNotFound { .. } => Self::NotFound(e.to_string()),
            StoreError::Serialization(msg) => Self::Internal(msg),
            StoreError::UniqueViolation { .. } | StoreError::LockPoisoned { .. } => {
                Self::Storage(e.to_string())
            }
        }
    }
}

impl From<LedgerError> for MenuError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            LedgerError::LockPoisoned => Self::Storage(e.to_string()),
            LedgerError::Store(inner) => inner.into(),
        }
    }
}

impl From<SnapshotError> for MenuError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            SnapshotError::NotFound(msg) => Self::NotFound(msg),
            SnapshotError::BuildFailed(msg) => Self::BuildFailed(msg),
            SnapshotError::VersionConflict { organization, .. } => {
                Self::ConcurrentVersionConflict {
                    organization,
                    attempts: 1,
                }
            }
            SnapshotError::Canonical(inner) => Self::Internal(inner.to_string()),
            SnapshotError::Ledger(inner) => inner.into(),
            SnapshotError::Store(inner) => inner.into(),
        }
    }
}

impl From<ReferenceError> for MenuError {
    fn from(e: ReferenceError) -> Self {
        Self::BuildFailed(e.to_string())
    }
}

impl From<TypeError> for MenuError {
    fn from(e: TypeError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

pub type MenuResult<T> = Result<T, MenuError>;
