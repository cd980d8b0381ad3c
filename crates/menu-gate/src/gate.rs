use std::sync::Arc;

use serde::{Deserialize, Serialize};

use menu_types::{Clock, OrganizationId, SystemClock};

use crate::error::GateError;
use crate::feature::{FeatureKey, FeatureValue, Limit};
use crate::source::{DecisionSource, FeatureSource};
use crate::sources::{OverrideLayer, OverrideStore, PlanCatalog, PlanLayer};

// ---------------------------------------------------------------------------
// GateDecision
// ---------------------------------------------------------------------------

/// The outcome of evaluating one feature for one organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub organization_id: OrganizationId,
    pub feature: FeatureKey,
    pub allowed: bool,
    /// The value that decided, absent when the gate fell through to default.
    pub value: Option<FeatureValue>,
    pub source: DecisionSource,
}

// ---------------------------------------------------------------------------
// FeatureGate
// ---------------------------------------------------------------------------

/// Answers "may this organization use this feature?".
///
/// Layers are consulted in order and the first one with a value decides.
/// The standard layering is overrides, then plan. If no layer has a value
/// the answer is `false`.
pub struct FeatureGate {
    layers: Vec<Box<dyn FeatureSource>>,
    clock: Arc<dyn Clock>,
}

impl FeatureGate {
    /// A gate with no layers: every feature is denied.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            layers: Vec::new(),
            clock,
        }
    }

    /// Overrides first, then plan defaults.
    pub fn standard(overrides: Arc<dyn OverrideStore>, plans: Arc<dyn PlanCatalog>) -> Self {
        Self::standard_with_clock(overrides, plans, Arc::new(SystemClock))
    }

    pub fn standard_with_clock(
        overrides: Arc<dyn OverrideStore>,
        plans: Arc<dyn PlanCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut gate = Self::new(clock);
        gate.add_layer(Box::new(OverrideLayer::new(overrides)));
        gate.add_layer(Box::new(PlanLayer::new(plans)));
        gate
    }

    /// Append a layer at the lowest precedence.
    pub fn add_layer(&mut self, layer: Box<dyn FeatureSource>) {
        self.layers.push(layer);
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Evaluate with provenance. Source failures are returned as errors.
    pub fn evaluate(
        &self,
        org: &OrganizationId,
        feature: &FeatureKey,
    ) -> Result<GateDecision, GateError> {
        let now = self.clock.now();
        for layer in &self.layers {
            if let Some(value) = layer.resolve(org, feature, now)? {
                let decision = GateDecision {
                    organization_id: org.clone(),
                    feature: feature.clone(),
                    allowed: value.grants(),
                    value: Some(value),
                    source: layer.kind(),
                };
                tracing::debug!(
                    organization = %org,
                    feature = %feature,
                    allowed = decision.allowed,
                    source = %decision.source,
                    "feature evaluated"
                );
                return Ok(decision);
            }
        }

        tracing::debug!(organization = %org, feature = %feature, "feature not configured, denying");
        Ok(GateDecision {
            organization_id: org.clone(),
            feature: feature.clone(),
            allowed: false,
            value: None,
            source: DecisionSource::Default,
        })
    }

    /// Boolean answer. Any failure to evaluate denies.
    pub fn is_allowed(&self, org: &OrganizationId, feature: &FeatureKey) -> bool {
        match self.evaluate(org, feature) {
            Ok(decision) => decision.allowed,
            Err(e) => {
                tracing::warn!(organization = %org, feature = %feature, error = %e, "feature gate failed closed");
                false
            }
        }
    }

    /// Quota for a limit-style feature. `None` when the feature is not
    /// configured or is a plain flag.
    pub fn limit_of(
        &self,
        org: &OrganizationId,
        feature: &FeatureKey,
    ) -> Result<Option<Limit>, GateError> {
        Ok(self.evaluate(org, feature)?.value.and_then(|v| v.limit()))
    }
}

impl std::fmt::Debug for FeatureGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let layers: Vec<DecisionSource> = self.layers.iter().map(|l| l.kind()).collect();
        f.debug_struct("FeatureGate").field("layers", &layers).finish()
    }
}
