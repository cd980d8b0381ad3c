use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::broadcast;

use menu_gate::{FeatureGate, FeatureKey};
use menu_ledger::{CurrentPrice, CurrentPriceProjector, PriceEntry, PriceFact, PriceLedger};
use menu_snapshot::{
    ChainReport, ComplianceExporter, IntegrityVerifier, MenuSnapshot, ReferenceDataReader,
    SnapshotBuilder, SnapshotError, SnapshotStore,
};
use menu_types::{ActorId, Clock, Currency, ItemId, Money, OrganizationId};

use crate::actors::{ActorDirectory, Role};
use crate::config::LedgerConfig;
use crate::error::{MenuError, MenuResult};
use crate::notify::{Notifier, PriceChangeNotice};
use crate::query::{PublishReceipt, SnapshotQuery, SnapshotTarget, SnapshotView};

/// Everything the service reads from or writes to.
pub struct Collaborators {
    pub prices: Arc<dyn PriceLedger>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub reference: Arc<dyn ReferenceDataReader>,
    pub actors: Arc<dyn ActorDirectory>,
    pub gate: Arc<FeatureGate>,
    pub clock: Arc<dyn Clock>,
}

/// The menu ledger service: the only entry point the surrounding
/// application uses to record prices, publish snapshots, and read them back.
pub struct MenuLedger {
    config: LedgerConfig,
    publish_feature: FeatureKey,
    prices: Arc<dyn PriceLedger>,
    snapshots: Arc<dyn SnapshotStore>,
    reference: Arc<dyn ReferenceDataReader>,
    actors: Arc<dyn ActorDirectory>,
    gate: Arc<FeatureGate>,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
}

impl MenuLedger {
    pub fn new(config: LedgerConfig, parts: Collaborators) -> MenuResult<Self> {
        config.validate()?;
        let publish_feature = config.publish_feature_key()?;
        let notifier = Notifier::new(config.notifications.capacity);
        Ok(Self {
            config,
            publish_feature,
            prices: parts.prices,
            snapshots: parts.snapshots,
            reference: parts.reference,
            actors: parts.actors,
            gate: parts.gate,
            clock: parts.clock,
            notifier,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn subscribe_price_changes(&self) -> broadcast::Receiver<PriceChangeNotice> {
        self.notifier.subscribe()
    }

    // ---- Prices ----

    /// Record a new price for an item on behalf of `actor`.
    pub fn record_price_change(
        &self,
        item: &ItemId,
        amount: Decimal,
        currency: &str,
        reason: Option<&str>,
        actor: &ActorId,
    ) -> MenuResult<PriceFact> {
        let price = Money::new(amount, Currency::new(currency)?)?;
        let org = self
            .reference
            .organization_of_item(item)
            .map_err(MenuError::from_lookup)?
            .ok_or_else(|| MenuError::NotFound(format!("item {item}")))?;
        let role = self.require_role(actor, &org)?;
        if !role.can_record_prices() {
            return Err(MenuError::Forbidden(format!(
                "{actor} cannot change prices in {org}"
            )));
        }

        let mut entry = PriceEntry::new(item.clone(), price).recorded_by(actor.clone());
        entry.reason = reason.map(str::to_string);
        let fact = self.prices.append(&entry)?;

        tracing::info!(
            organization = %org,
            item = %item,
            fact_id = %fact.id,
            price = %entry.price,
            actor = %actor,
            "price change recorded"
        );
        self.notifier.notify(PriceChangeNotice::new(org, &fact));
        Ok(fact)
    }

    pub fn current_price_of(&self, item: &ItemId) -> MenuResult<Option<CurrentPrice>> {
        Ok(CurrentPriceProjector::current_price_of(
            self.prices.as_reader(),
            item,
        )?)
    }

    pub fn price_history(&self, item: &ItemId) -> MenuResult<Vec<PriceFact>> {
        Ok(CurrentPriceProjector::history_of(self.prices.as_reader(), item)?)
    }

    // ---- Publishing ----

    /// Gate, build, and persist a new snapshot of `org`'s menu.
    ///
    /// The content is built once. Losing a version race re-reads the latest
    /// version and retries the save with the same content, up to
    /// `publish_max_retries` times.
    pub fn publish(&self, org: &OrganizationId, actor: &ActorId) -> MenuResult<PublishReceipt> {
        if self.reference.organization(org)?.is_none() {
            return Err(MenuError::NotFound(format!("organization {org}")));
        }
        let role = self.require_role(actor, org)?;
        if !role.can_publish() {
            return Err(MenuError::Forbidden(format!(
                "role {role:?} cannot publish menus"
            )));
        }
        let decision = self.gate.evaluate(org, &self.publish_feature).map_err(|e| {
            MenuError::Forbidden(format!("permission check unavailable: {e}"))
        })?;
        if !decision.allowed {
            return Err(MenuError::Forbidden(format!(
                "feature '{}' is not enabled for {org} ({} decision)",
                self.publish_feature, decision.source
            )));
        }

        let draft = SnapshotBuilder::new(self.reference.as_ref(), self.prices.as_reader())
            .build_draft(org)?;

        let max_attempts = self.config.publish_max_retries.saturating_add(1);
        for attempt in 1..=max_attempts {
            let previous = self.snapshots.latest(org)?;
            let snapshot =
                draft
                    .clone()
                    .into_snapshot(previous.as_ref(), self.clock.now(), Some(actor.clone()));
            match self.snapshots.save(snapshot) {
                Ok(saved) => {
                    tracing::info!(
                        organization = %org,
                        version = saved.version,
                        hash = %saved.hash.short_hex(),
                        actor = %actor,
                        attempt,
                        "menu snapshot published"
                    );
                    return Ok(PublishReceipt {
                        snapshot_id: saved.id,
                        organization_id: saved.organization_id,
                        version: saved.version,
                        hash: saved.hash,
                        published_at: saved.created_at,
                        attempts: attempt,
                    });
                }
                Err(SnapshotError::VersionConflict { version, .. }) => {
                    tracing::warn!(
                        organization = %org,
                        version,
                        attempt,
                        "snapshot version taken by a concurrent publish, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(MenuError::ConcurrentVersionConflict {
            organization: org.clone(),
            attempts: max_attempts,
        })
    }

    // ---- Reading ----

    pub fn get_snapshot(&self, query: SnapshotQuery) -> MenuResult<SnapshotView> {
        if let Some(history) = query.history {
            let SnapshotTarget::Organization(org) = &query.target else {
                return Err(MenuError::InvalidArgument(
                    "history is addressed by organization, not snapshot id".into(),
                ));
            };
            let limit = history.limit.min(self.config.history_max_limit);
            let page = self.snapshots.history(org, limit, history.offset)?;
            return Ok(SnapshotView::History { page });
        }

        let snapshot = self.resolve(&query)?;

        if query.export {
            let document = ComplianceExporter::new(self.snapshots.as_reader(), self.clock.as_ref())
                .export_for_compliance(&snapshot.id)?;
            return Ok(SnapshotView::Export { document });
        }
        if query.verify {
            let report = IntegrityVerifier::verify_snapshot(&snapshot);
            return Ok(SnapshotView::Verified { snapshot, report });
        }
        Ok(SnapshotView::Snapshot { snapshot })
    }

    pub fn verify_chain(&self, org: &OrganizationId) -> MenuResult<ChainReport> {
        Ok(IntegrityVerifier::new(self.snapshots.as_reader()).verify_chain(org)?)
    }

    fn resolve(&self, query: &SnapshotQuery) -> MenuResult<MenuSnapshot> {
        let found = match (&query.target, query.version) {
            (SnapshotTarget::Snapshot(id), None) => self.snapshots.by_id(id)?,
            (SnapshotTarget::Snapshot(_), Some(_)) => {
                return Err(MenuError::InvalidArgument(
                    "version is addressed by organization, not snapshot id".into(),
                ))
            }
            (SnapshotTarget::Organization(org), Some(version)) => {
                self.snapshots.by_version(org, version)?
            }
            (SnapshotTarget::Organization(org), None) => self.snapshots.latest(org)?,
        };
        found.ok_or_else(|| match &query.target {
            SnapshotTarget::Snapshot(id) => MenuError::NotFound(format!("snapshot {id}")),
            SnapshotTarget::Organization(org) => match query.version {
                Some(v) => MenuError::NotFound(format!("version {v} of {org}")),
                None => MenuError::NotFound(format!("no snapshot published for {org}")),
            },
        })
    }

    fn require_role(&self, actor: &ActorId, org: &OrganizationId) -> MenuResult<Role> {
        self.actors
            .role_of(actor, org)?
            .ok_or_else(|| MenuError::Forbidden(format!("{actor} is not a member of {org}")))
    }
}

impl std::fmt::Debug for MenuLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuLedger")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
