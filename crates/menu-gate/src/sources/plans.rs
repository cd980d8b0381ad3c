use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use menu_types::{OrganizationId, Timestamp};

use crate::config::PlanDefinitions;
use crate::error::GateError;
use crate::feature::{FeatureKey, FeatureValue, PlanId};
use crate::source::{DecisionSource, FeatureSource};

/// Subscription plans and their feature tables.
pub trait PlanCatalog: Send + Sync {
    /// Plan the organization is subscribed to, if any.
    fn plan_of(&self, org: &OrganizationId) -> Result<Option<PlanId>, GateError>;

    fn feature_of(
        &self,
        plan: &PlanId,
        feature: &FeatureKey,
    ) -> Result<Option<FeatureValue>, GateError>;
}

/// Plan catalog backed by [`PlanDefinitions`] with mutable subscriptions.
#[derive(Debug)]
pub struct InMemoryPlanCatalog {
    definitions: PlanDefinitions,
    subscriptions: RwLock<HashMap<OrganizationId, PlanId>>,
}

impl InMemoryPlanCatalog {
    pub fn new(definitions: PlanDefinitions) -> Self {
        let subscriptions = definitions
            .subscriptions
            .iter()
            .map(|(org, plan)| (org.clone(), plan.clone()))
            .collect();
        Self {
            definitions,
            subscriptions: RwLock::new(subscriptions),
        }
    }

    /// Subscribe an organization to a defined plan, replacing any previous one.
    pub fn subscribe(&self, org: OrganizationId, plan: PlanId) -> Result<(), GateError> {
        if !self.definitions.has_plan(&plan) {
            return Err(GateError::Config(format!("undefined plan {plan}")));
        }
        self.subscriptions
            .write()
            .map_err(|_| GateError::unavailable("plan", "lock poisoned"))?
            .insert(org, plan);
        Ok(())
    }
}

impl PlanCatalog for InMemoryPlanCatalog {
    fn plan_of(&self, org: &OrganizationId) -> Result<Option<PlanId>, GateError> {
        let subscriptions = self
            .subscriptions
            .read()
            .map_err(|_| GateError::unavailable("plan", "lock poisoned"))?;
        Ok(subscriptions.get(org).cloned())
    }

    fn feature_of(
        &self,
        plan: &PlanId,
        feature: &FeatureKey,
    ) -> Result<Option<FeatureValue>, GateError> {
        Ok(self.definitions.feature(plan, feature))
    }
}

/// Resolves features from the organization's plan table.
pub struct PlanLayer {
    catalog: Arc<dyn PlanCatalog>,
}

impl PlanLayer {
    pub fn new(catalog: Arc<dyn PlanCatalog>) -> Self {
        Self { catalog }
    }
}

impl FeatureSource for PlanLayer {
    fn kind(&self) -> DecisionSource {
        DecisionSource::Plan
    }

    fn resolve(
        &self,
        org: &OrganizationId,
        feature: &FeatureKey,
        _now: Timestamp,
    ) -> Result<Option<FeatureValue>, GateError> {
        let Some(plan) = self.catalog.plan_of(org)? else {
            return Ok(None);
        };
        self.catalog.feature_of(&plan, feature)
    }
}
