use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use menu_types::{OrganizationId, Timestamp};

use crate::error::GateError;
use crate::feature::{FeatureKey, FeatureValue};
use crate::source::{DecisionSource, FeatureSource};

/// An organization-specific exception to its plan's feature table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureOverride {
    pub organization_id: OrganizationId,
    pub feature: FeatureKey,
    pub value: FeatureValue,
    /// Overrides stop applying at this instant. `None` never expires.
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl FeatureOverride {
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.expires_at.map_or(true, |expiry| expiry > now)
    }
}

/// Lookup of per-organization overrides.
pub trait OverrideStore: Send + Sync {
    /// All overrides ever granted for the pair, oldest first.
    fn overrides_for(
        &self,
        org: &OrganizationId,
        feature: &FeatureKey,
    ) -> Result<Vec<FeatureOverride>, GateError>;
}

/// In-memory override table.
#[derive(Debug, Default)]
pub struct InMemoryOverrides {
    rows: RwLock<Vec<FeatureOverride>>,
}

impl InMemoryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, row: FeatureOverride) -> Result<(), GateError> {
        self.rows
            .write()
            .map_err(|_| GateError::unavailable("override", "lock poisoned"))?
            .push(row);
        Ok(())
    }
}

impl OverrideStore for InMemoryOverrides {
    fn overrides_for(
        &self,
        org: &OrganizationId,
        feature: &FeatureKey,
    ) -> Result<Vec<FeatureOverride>, GateError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| GateError::unavailable("override", "lock poisoned"))?;
        Ok(rows
            .iter()
            .filter(|o| &o.organization_id == org && &o.feature == feature)
            .cloned()
            .collect())
    }
}

/// Resolves features from active overrides. The most recently granted
/// active override wins; expired ones are treated as absent.
pub struct OverrideLayer {
    store: Arc<dyn OverrideStore>,
}

impl OverrideLayer {
    pub fn new(store: Arc<dyn OverrideStore>) -> Self {
        Self { store }
    }
}

impl FeatureSource for OverrideLayer {
    fn kind(&self) -> DecisionSource {
        DecisionSource::Override
    }

    fn resolve(
        &self,
        org: &OrganizationId,
        feature: &FeatureKey,
        now: Timestamp,
    ) -> Result<Option<FeatureValue>, GateError> {
        Ok(self
            .store
            .overrides_for(org, feature)?
            .into_iter()
            .rev()
            .find(|o| o.is_active(now))
            .map(|o| o.value))
    }
}
