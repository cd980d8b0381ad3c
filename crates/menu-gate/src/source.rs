use serde::{Deserialize, Serialize};

use menu_types::{OrganizationId, Timestamp};

use crate::error::GateError;
use crate::feature::{FeatureKey, FeatureValue};

// ---------------------------------------------------------------------------
// DecisionSource
// ---------------------------------------------------------------------------

/// Which layer of the gate produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// An active organization-specific override.
    Override,
    /// The organization's subscription plan.
    Plan,
    /// Nothing applied; the gate failed closed.
    Default,
}

impl std::fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Override => "override",
            Self::Plan => "plan",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// FeatureSource trait
// ---------------------------------------------------------------------------

/// One layer of feature resolution.
///
/// Sources are consulted in order. The first one that returns a value
/// decides; `Ok(None)` passes to the next layer.
pub trait FeatureSource: Send + Sync {
    fn kind(&self) -> DecisionSource;

    fn resolve(
        &self,
        org: &OrganizationId,
        feature: &FeatureKey,
        now: Timestamp,
    ) -> Result<Option<FeatureValue>, GateError>;
}
