use std::sync::Arc;

use menu_gate::{FeatureGate, InMemoryOverrides, InMemoryPlanCatalog, PlanDefinitions};
use menu_ledger::InMemoryPriceLedger;
use menu_snapshot::{InMemoryReferenceData, InMemorySnapshotStore};
use menu_types::{Clock, SystemClock};

use crate::actors::InMemoryActorDirectory;
use crate::config::LedgerConfig;
use crate::error::MenuResult;
use crate::service::{Collaborators, MenuLedger};
use crate::sweep::{IntegrityAlertSink, Sweeper};

/// A complete in-memory wiring of the service, with typed handles to each
/// store so callers can seed reference data, memberships, and plans.
pub struct InMemoryDeployment {
    pub prices: Arc<InMemoryPriceLedger>,
    pub snapshots: Arc<InMemorySnapshotStore>,
    pub reference: Arc<InMemoryReferenceData>,
    pub actors: Arc<InMemoryActorDirectory>,
    pub overrides: Arc<InMemoryOverrides>,
    pub plans: Arc<InMemoryPlanCatalog>,
    pub gate: Arc<FeatureGate>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDeployment {
    pub fn new(config: &LedgerConfig, plans: PlanDefinitions) -> Self {
        Self::with_clock(config, plans, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &LedgerConfig, plans: PlanDefinitions, clock: Arc<dyn Clock>) -> Self {
        let overrides = Arc::new(InMemoryOverrides::new());
        let plans = Arc::new(InMemoryPlanCatalog::new(plans));
        let gate = Arc::new(FeatureGate::standard_with_clock(
            overrides.clone(),
            plans.clone(),
            clock.clone(),
        ));
        Self {
            prices: Arc::new(InMemoryPriceLedger::with_source(clock.clone())),
            snapshots: Arc::new(InMemorySnapshotStore::with_history_limit(
                config.history_max_limit,
            )),
            reference: Arc::new(InMemoryReferenceData::new()),
            actors: Arc::new(InMemoryActorDirectory::new()),
            overrides,
            plans,
            gate,
            clock,
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn ledger(&self, config: LedgerConfig) -> MenuResult<MenuLedger> {
        MenuLedger::new(
            config,
            Collaborators {
                prices: self.prices.clone(),
                snapshots: self.snapshots.clone(),
                reference: self.reference.clone(),
                actors: self.actors.clone(),
                gate: self.gate.clone(),
                clock: self.clock.clone(),
            },
        )
    }

    pub fn sweeper(&self, sink: Arc<dyn IntegrityAlertSink>, batch_size: usize) -> Sweeper {
        Sweeper::new(self.snapshots.clone(), sink, self.clock.clone(), batch_size)
    }
}

impl std::fmt::Debug for InMemoryDeployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDeployment")
            .field("prices", &self.prices)
            .field("snapshots", &self.snapshots)
            .field("reference", &self.reference)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
