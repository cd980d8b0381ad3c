//! Demo fixture file format.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;

use menu_gate::{FeatureKey, FeatureValue, PlanDefinitions, PlanId};
use menu_sdk::{InMemoryDeployment, Role};
use menu_types::{ActorId, ItemId, MenuTree, Organization};

#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub organization: Organization,
    #[serde(default)]
    pub menu: MenuTree,
    #[serde(default)]
    pub prices: Vec<FixturePrice>,
    pub members: Vec<FixtureMember>,
    /// Actor that records prices and publishes.
    pub publisher: ActorId,
}

#[derive(Debug, Deserialize)]
pub struct FixturePrice {
    pub item: ItemId,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureMember {
    pub actor: ActorId,
    pub role: Role,
}

impl Fixture {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("invalid fixture")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Plans granting `feature` to this fixture's organization only.
    pub fn default_plans(&self, feature: &str) -> anyhow::Result<PlanDefinitions> {
        let plan = PlanId::new("demo")?;
        let features = BTreeMap::from([(FeatureKey::new(feature)?, FeatureValue::Flag(true))]);
        Ok(PlanDefinitions {
            plans: BTreeMap::from([(plan.clone(), features)]),
            subscriptions: BTreeMap::from([(self.organization.id.clone(), plan)]),
        })
    }

    /// Load reference data and memberships. Prices are recorded through the
    /// service so they pass the same checks as live edits.
    pub fn seed(&self, deployment: &InMemoryDeployment) -> anyhow::Result<()> {
        deployment
            .reference
            .load(self.organization.clone(), self.menu.clone())?;
        for member in &self.members {
            deployment.actors.add_member(
                member.actor.clone(),
                self.organization.id.clone(),
                member.role,
            )?;
        }
        Ok(())
    }
}
