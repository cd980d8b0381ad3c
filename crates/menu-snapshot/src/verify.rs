use serde::{Deserialize, Serialize};

use menu_crypto::{ContentDigest, ContentHasher, VersionChainVerifier};
use menu_types::{OrganizationId, SnapshotId};

use crate::error::SnapshotError;
use crate::snapshot::MenuSnapshot;
use crate::store::SnapshotReader;

/// Outcome of re-hashing a stored snapshot.
///
/// A mismatch is a reported result, never an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub snapshot_id: SnapshotId,
    pub organization_id: OrganizationId,
    pub version: u64,
    pub is_valid: bool,
    pub stored_hash: ContentDigest,
    /// `None` only when the stored payload can no longer be canonicalized.
    pub computed_hash: Option<ContentDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Outcome of checking an organization's version chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub organization_id: OrganizationId,
    pub length: usize,
    pub is_valid: bool,
    pub violations: Vec<String>,
}

/// Recomputes snapshot hashes from stored content.
///
/// Holds only a [`SnapshotReader`]: the verifier reports anomalies and has
/// no way to repair them.
pub struct IntegrityVerifier<'a> {
    snapshots: &'a dyn SnapshotReader,
}

impl<'a> IntegrityVerifier<'a> {
    pub fn new(snapshots: &'a dyn SnapshotReader) -> Self {
        Self { snapshots }
    }

    /// Verify a stored snapshot by id.
    pub fn verify(&self, id: &SnapshotId) -> Result<VerificationReport, SnapshotError> {
        let snapshot = self
            .snapshots
            .by_id(id)?
            .ok_or_else(|| SnapshotError::NotFound(format!("snapshot {id}")))?;
        Ok(Self::verify_snapshot(&snapshot))
    }

    /// Verify an already loaded snapshot. Does not consult live data.
    pub fn verify_snapshot(snapshot: &MenuSnapshot) -> VerificationReport {
        let (computed_hash, failure) = match ContentHasher::hash_canonical(&snapshot.content_payload)
        {
            Ok(digest) => (Some(digest), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let is_valid = computed_hash == Some(snapshot.hash);

        if !is_valid {
            tracing::error!(
                target: "integrity",
                snapshot = %snapshot.id,
                organization = %snapshot.organization_id,
                version = snapshot.version,
                stored = %snapshot.hash,
                computed = ?computed_hash.map(|h| h.to_hex()),
                "snapshot hash mismatch"
            );
        }

        VerificationReport {
            snapshot_id: snapshot.id,
            organization_id: snapshot.organization_id.clone(),
            version: snapshot.version,
            is_valid,
            stored_hash: snapshot.hash,
            computed_hash,
            failure,
        }
    }

    /// Check that an organization's versions run 1..=n without gaps and that
    /// every `prev_hash` matches the preceding snapshot's hash.
    pub fn verify_chain(&self, org: &OrganizationId) -> Result<ChainReport, SnapshotError> {
        let chain = self.snapshots.chain(org)?;
        let violations: Vec<String> = VersionChainVerifier::violations(&chain)
            .into_iter()
            .map(|v| v.to_string())
            .collect();

        if !violations.is_empty() {
            tracing::error!(
                target: "integrity",
                organization = %org,
                violations = violations.len(),
                "snapshot chain broken"
            );
        }

        Ok(ChainReport {
            organization_id: org.clone(),
            length: chain.len(),
            is_valid: violations.is_empty(),
            violations,
        })
    }
}
