use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use menu_types::OrganizationId;

use crate::error::GateError;
use crate::feature::{FeatureKey, FeatureValue, PlanId};

/// Plan feature tables and initial subscriptions, loaded from TOML.
///
/// ```toml
/// [plans.free]
/// menu_publish = false
/// max_items = 30
///
/// [plans.pro]
/// menu_publish = true
/// max_items = "unlimited"
///
/// [subscriptions]
/// cafe-moda = "pro"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDefinitions {
    #[serde(default)]
    pub plans: BTreeMap<PlanId, BTreeMap<FeatureKey, FeatureValue>>,
    #[serde(default)]
    pub subscriptions: BTreeMap<OrganizationId, PlanId>,
}

impl PlanDefinitions {
    pub fn from_toml_str(text: &str) -> Result<Self, GateError> {
        let defs: Self = toml::from_str(text).map_err(|e| GateError::Config(e.to_string()))?;
        defs.validate()?;
        Ok(defs)
    }

    pub fn from_file(path: &Path) -> Result<Self, GateError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| GateError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn feature(&self, plan: &PlanId, feature: &FeatureKey) -> Option<FeatureValue> {
        self.plans.get(plan).and_then(|f| f.get(feature)).copied()
    }

    pub fn has_plan(&self, plan: &PlanId) -> bool {
        self.plans.contains_key(plan)
    }

    /// Every subscription must name a defined plan.
    fn validate(&self) -> Result<(), GateError> {
        for (org, plan) in &self.subscriptions {
            if !self.has_plan(plan) {
                return Err(GateError::Config(format!(
                    "organization {org} subscribes to undefined plan {plan}"
                )));
            }
        }
        Ok(())
    }
}
