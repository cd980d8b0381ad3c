use serde::{Deserialize, Serialize};

use menu_types::{OrganizationId, SnapshotId};

use crate::error::SnapshotError;
use crate::snapshot::MenuSnapshot;

/// One page of an organization's snapshot history, newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub items: Vec<MenuSnapshot>,
    pub total_count: u64,
    /// Effective limit after clamping.
    pub limit: usize,
    pub offset: usize,
}

/// Read boundary for persisted snapshots.
pub trait SnapshotReader: Send + Sync {
    fn latest(&self, org: &OrganizationId) -> Result<Option<MenuSnapshot>, SnapshotError>;

    fn by_id(&self, id: &SnapshotId) -> Result<Option<MenuSnapshot>, SnapshotError>;

    /// Snapshot with the given version. `version < 1` is `InvalidArgument`.
    fn by_version(
        &self,
        org: &OrganizationId,
        version: i64,
    ) -> Result<Option<MenuSnapshot>, SnapshotError>;

    /// Newest-first page. `limit` is clamped to the store's maximum, a zero
    /// limit yields an empty page, and `offset < 0` is `InvalidArgument`.
    fn history(
        &self,
        org: &OrganizationId,
        limit: usize,
        offset: i64,
    ) -> Result<HistoryPage, SnapshotError>;

    /// Every snapshot of an organization, oldest first.
    fn chain(&self, org: &OrganizationId) -> Result<Vec<MenuSnapshot>, SnapshotError>;

    /// Most recently created snapshots across all organizations.
    fn recent(&self, limit: usize) -> Result<Vec<MenuSnapshot>, SnapshotError>;

    fn last_version(&self, org: &OrganizationId) -> Result<u64, SnapshotError> {
        Ok(self.latest(org)?.map_or(0, |s| s.version))
    }
}

/// Write boundary for snapshots. Write-once: there is no update or delete.
pub trait SnapshotWriter: Send + Sync {
    /// Persist a snapshot.
    ///
    /// Rejects with `VersionConflict` unless `version` is exactly the
    /// organization's last version plus one, and with `InvalidArgument` when
    /// the hash or `prev_hash` do not match the content and chain.
    fn save(&self, snapshot: MenuSnapshot) -> Result<MenuSnapshot, SnapshotError>;
}

/// A store that can both read and write snapshots.
pub trait SnapshotStore: SnapshotReader + SnapshotWriter {
    /// View as a read-only handle, e.g. for the integrity verifier.
    fn as_reader(&self) -> &dyn SnapshotReader;
}

impl<T: SnapshotReader + SnapshotWriter> SnapshotStore for T {
    fn as_reader(&self) -> &dyn SnapshotReader {
        self
    }
}
