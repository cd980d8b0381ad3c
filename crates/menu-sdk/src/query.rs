use serde::Serialize;

use menu_crypto::ContentDigest;
use menu_snapshot::{ExportDocument, HistoryPage, MenuSnapshot, VerificationReport};
use menu_types::{OrganizationId, SnapshotId, Timestamp};

/// Summary returned by a successful publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub snapshot_id: SnapshotId,
    pub organization_id: OrganizationId,
    pub version: u64,
    pub hash: ContentDigest,
    pub published_at: Timestamp,
    /// Save attempts used, including the successful one.
    pub attempts: u32,
}

/// What a snapshot query is addressed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotTarget {
    Organization(OrganizationId),
    Snapshot(SnapshotId),
}

/// Read-side query over snapshots.
///
/// Built with the constructors below. History takes precedence over the
/// other options; `export` implies verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotQuery {
    pub target: SnapshotTarget,
    pub version: Option<i64>,
    pub history: Option<HistoryRequest>,
    pub verify: bool,
    pub export: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryRequest {
    pub limit: usize,
    pub offset: i64,
}

impl SnapshotQuery {
    fn new(target: SnapshotTarget) -> Self {
        Self {
            target,
            version: None,
            history: None,
            verify: false,
            export: false,
        }
    }

    /// Latest snapshot of an organization.
    pub fn latest(org: OrganizationId) -> Self {
        Self::new(SnapshotTarget::Organization(org))
    }

    pub fn by_id(id: SnapshotId) -> Self {
        Self::new(SnapshotTarget::Snapshot(id))
    }

    pub fn version(org: OrganizationId, version: i64) -> Self {
        Self {
            version: Some(version),
            ..Self::latest(org)
        }
    }

    pub fn history(org: OrganizationId, limit: usize, offset: i64) -> Self {
        Self {
            history: Some(HistoryRequest { limit, offset }),
            ..Self::latest(org)
        }
    }

    pub fn verified(mut self) -> Self {
        self.verify = true;
        self
    }

    pub fn exported(mut self) -> Self {
        self.export = true;
        self
    }
}

/// Result of a [`SnapshotQuery`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotView {
    Snapshot {
        snapshot: MenuSnapshot,
    },
    Verified {
        snapshot: MenuSnapshot,
        report: VerificationReport,
    },
    Export {
        document: ExportDocument,
    },
    History {
        page: HistoryPage,
    },
}
