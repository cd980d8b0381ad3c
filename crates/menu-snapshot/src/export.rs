use serde::{Deserialize, Serialize};
use serde_json::Value;

use menu_crypto::{ContentDigest, ContentHasher};
use menu_types::{ActorId, Clock, OrganizationId, SnapshotId, Timestamp};

use crate::error::SnapshotError;
use crate::store::SnapshotReader;
use crate::verify::{IntegrityVerifier, VerificationReport};

/// Audit-ready rendering of a snapshot.
///
/// Produced even when verification fails; in that case `integrity_failure`
/// is set and both hashes are present in `verification`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub snapshot_id: SnapshotId,
    pub organization_id: OrganizationId,
    pub version: u64,
    pub hash: ContentDigest,
    pub prev_hash: Option<ContentDigest>,
    pub created_at: Timestamp,
    pub published_by: Option<ActorId>,
    pub content: Value,
    pub verification: VerificationReport,
    pub integrity_failure: bool,
    pub exported_at: Timestamp,
}

impl ExportDocument {
    /// Recompute the content hash from the exported document itself.
    ///
    /// Lets an auditor holding only the export confirm that `content` still
    /// hashes to `hash`.
    pub fn recheck(&self) -> Result<bool, SnapshotError> {
        let computed = ContentHasher::hash_canonical(&self.content)?;
        Ok(computed == self.hash)
    }
}

/// Formats verified snapshots for compliance export.
pub struct ComplianceExporter<'a> {
    snapshots: &'a dyn SnapshotReader,
    clock: &'a dyn Clock,
}

impl<'a> ComplianceExporter<'a> {
    pub fn new(snapshots: &'a dyn SnapshotReader, clock: &'a dyn Clock) -> Self {
        Self { snapshots, clock }
    }

    pub fn export_for_compliance(&self, id: &SnapshotId) -> Result<ExportDocument, SnapshotError> {
        let snapshot = self
            .snapshots
            .by_id(id)?
            .ok_or_else(|| SnapshotError::NotFound(format!("snapshot {id}")))?;

        // Verify the exact copy being exported.
        let verification = IntegrityVerifier::verify_snapshot(&snapshot);
        let integrity_failure = !verification.is_valid;
        if integrity_failure {
            tracing::warn!(
                target: "integrity",
                snapshot = %snapshot.id,
                "exporting snapshot that failed verification"
            );
        }

        Ok(ExportDocument {
            snapshot_id: snapshot.id,
            organization_id: snapshot.organization_id,
            version: snapshot.version,
            hash: snapshot.hash,
            prev_hash: snapshot.prev_hash,
            created_at: snapshot.created_at,
            published_by: snapshot.published_by,
            content: snapshot.content_payload,
            verification,
            integrity_failure,
            exported_at: self.clock.now(),
        })
    }
}
