use serde::{Deserialize, Serialize};
use serde_json::Value;

use menu_crypto::{ChainLink, ContentDigest, ContentHasher};
use menu_types::{ActorId, OrganizationId, SnapshotId, Timestamp};

use crate::error::SnapshotError;
use crate::payload::SnapshotPayload;

/// A persisted, versioned capture of an organization's published menu.
///
/// `hash` covers `content_payload` only. `prev_hash` links to the previous
/// version's hash and sits outside the hashed content, so rebuilding an
/// unchanged menu reproduces the same `hash`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSnapshot {
    pub id: SnapshotId,
    pub organization_id: OrganizationId,
    pub version: u64,
    pub content_payload: Value,
    pub hash: ContentDigest,
    pub prev_hash: Option<ContentDigest>,
    pub created_at: Timestamp,
    pub published_by: Option<ActorId>,
}

impl MenuSnapshot {
    /// Typed view of the stored payload.
    pub fn payload(&self) -> Result<SnapshotPayload, SnapshotError> {
        serde_json::from_value(self.content_payload.clone())
            .map_err(|e| SnapshotError::InvalidArgument(format!("malformed payload: {e}")))
    }
}

impl ChainLink for MenuSnapshot {
    fn version(&self) -> u64 {
        self.version
    }

    fn content_hash(&self) -> ContentDigest {
        self.hash
    }

    fn prev_hash(&self) -> Option<ContentDigest> {
        self.prev_hash
    }
}

/// Built, hashed content that has not been assigned a version yet.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotDraft {
    pub organization_id: OrganizationId,
    pub content_payload: Value,
    pub hash: ContentDigest,
}

impl SnapshotDraft {
    /// Hash a typed payload into a draft.
    pub fn from_payload(
        organization_id: OrganizationId,
        payload: &SnapshotPayload,
    ) -> Result<Self, SnapshotError> {
        let content_payload = serde_json::to_value(payload)
            .map_err(|e| SnapshotError::BuildFailed(format!("payload serialization: {e}")))?;
        let hash = ContentHasher::hash_canonical(&content_payload)?;
        Ok(Self {
            organization_id,
            content_payload,
            hash,
        })
    }

    /// Stamp the draft as a specific version following `previous`.
    pub fn into_snapshot(
        self,
        previous: Option<&MenuSnapshot>,
        created_at: Timestamp,
        published_by: Option<ActorId>,
    ) -> MenuSnapshot {
        MenuSnapshot {
            id: SnapshotId::new(),
            organization_id: self.organization_id,
            version: previous.map_or(1, |p| p.version + 1),
            content_payload: self.content_payload,
            hash: self.hash,
            prev_hash: previous.map(|p| p.hash),
            created_at,
            published_by,
        }
    }
}
