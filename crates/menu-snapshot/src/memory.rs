use menu_crypto::ContentHasher;
use menu_store::{InMemoryTable, RowStore, StoreError};
use menu_types::{OrganizationId, SnapshotId};

use crate::error::SnapshotError;
use crate::snapshot::MenuSnapshot;
use crate::store::{HistoryPage, SnapshotReader, SnapshotWriter};

/// Default clamp for history page sizes.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

const ORG_VERSION: &str = "org_version";
const SNAPSHOT_ID: &str = "snapshot_id";

fn version_key(org: &OrganizationId, version: u64) -> String {
    format!("{org}#{version}")
}

/// In-memory snapshot store over an append-only table.
///
/// A unique constraint on `(organization_id, version)` is the final arbiter
/// for concurrent saves: of two writers racing for the same version, exactly
/// one insert succeeds and the other gets `VersionConflict`.
pub struct InMemorySnapshotStore {
    table: InMemoryTable<MenuSnapshot>,
    history_limit: usize,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        let table = InMemoryTable::append_only("menu_snapshots")
            .with_unique(ORG_VERSION, |s: &MenuSnapshot| {
                version_key(&s.organization_id, s.version)
            })
            .with_unique(SNAPSHOT_ID, |s: &MenuSnapshot| s.id.to_string());
        Self {
            table,
            history_limit: history_limit.max(1),
        }
    }

    /// Direct access to the underlying table. Update and delete through this
    /// handle are rejected like any other mutation.
    pub fn raw_table(&self) -> &dyn RowStore<MenuSnapshot> {
        &self.table
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    fn for_org(&self, org: &OrganizationId) -> Result<Vec<MenuSnapshot>, SnapshotError> {
        let mut rows: Vec<MenuSnapshot> = self
            .table
            .find(|s| &s.organization_id == org)?
            .into_iter()
            .map(|(_, s)| s)
            .collect();
        rows.sort_by_key(|s| s.version);
        Ok(rows)
    }

    fn check_link(
        snapshot: &MenuSnapshot,
        previous: Option<&MenuSnapshot>,
    ) -> Result<(), SnapshotError> {
        let expected_version = previous.map_or(1, |p| p.version + 1);
        if snapshot.version != expected_version {
            return Err(SnapshotError::VersionConflict {
                organization: snapshot.organization_id.clone(),
                version: snapshot.version,
            });
        }
        if snapshot.prev_hash != previous.map(|p| p.hash) {
            return Err(SnapshotError::InvalidArgument(format!(
                "snapshot version {} does not link to the previous hash",
                snapshot.version
            )));
        }
        Ok(())
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotWriter for InMemorySnapshotStore {
    fn save(&self, snapshot: MenuSnapshot) -> Result<MenuSnapshot, SnapshotError> {
        if snapshot.version < 1 {
            return Err(SnapshotError::InvalidArgument(
                "snapshot version must be at least 1".into(),
            ));
        }
        let computed = ContentHasher::hash_canonical(&snapshot.content_payload)?;
        if computed != snapshot.hash {
            return Err(SnapshotError::InvalidArgument(format!(
                "snapshot hash {} does not match its content ({})",
                snapshot.hash.short_hex(),
                computed.short_hex()
            )));
        }

        let previous = self.latest(&snapshot.organization_id)?;
        Self::check_link(&snapshot, previous.as_ref())?;

        let organization = snapshot.organization_id.clone();
        let version = snapshot.version;
        match self.table.insert_with(|_| snapshot) {
            Ok((_, saved)) => Ok(saved),
            Err(StoreError::UniqueViolation { constraint, .. }) if constraint == ORG_VERSION => {
                Err(SnapshotError::VersionConflict {
                    organization,
                    version,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl SnapshotReader for InMemorySnapshotStore {
    fn latest(&self, org: &OrganizationId) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(self
            .table
            .find(|s| &s.organization_id == org)?
            .into_iter()
            .map(|(_, s)| s)
            .max_by_key(|s| s.version))
    }

    fn by_id(&self, id: &SnapshotId) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(self
            .table
            .find_unique(SNAPSHOT_ID, &id.to_string())?
            .map(|(_, s)| s))
    }

    fn by_version(
        &self,
        org: &OrganizationId,
        version: i64,
    ) -> Result<Option<MenuSnapshot>, SnapshotError> {
        let version = u64::try_from(version)
            .ok()
            .filter(|v| *v >= 1)
            .ok_or_else(|| {
                SnapshotError::InvalidArgument(format!("version must be >= 1, got {version}"))
            })?;
        Ok(self
            .table
            .find_unique(ORG_VERSION, &version_key(org, version))?
            .map(|(_, s)| s))
    }

    fn history(
        &self,
        org: &OrganizationId,
        limit: usize,
        offset: i64,
    ) -> Result<HistoryPage, SnapshotError> {
        let offset = usize::try_from(offset).map_err(|_| {
            SnapshotError::InvalidArgument(format!("offset must be >= 0, got {offset}"))
        })?;
        let limit = limit.min(self.history_limit);

        let mut all = self.for_org(org)?;
        all.reverse();
        let total_count = all.len() as u64;
        let items = all.into_iter().skip(offset).take(limit).collect();
        Ok(HistoryPage {
            items,
            total_count,
            limit,
            offset,
        })
    }

    fn chain(&self, org: &OrganizationId) -> Result<Vec<MenuSnapshot>, SnapshotError> {
        self.for_org(org)
    }

    fn recent(&self, limit: usize) -> Result<Vec<MenuSnapshot>, SnapshotError> {
        // Row ids follow insertion order, so the tail of the scan is newest.
        let rows = self.table.scan()?;
        Ok(rows
            .into_iter()
            .rev()
            .take(limit)
            .map(|(_, s)| s)
            .collect())
    }
}

impl std::fmt::Debug for InMemorySnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySnapshotStore")
            .field("table", &self.table)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
