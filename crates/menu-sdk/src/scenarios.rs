//! End-to-end behavior of the service over the in-memory deployment.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use menu_gate::{FeatureKey, FeatureOverride, FeatureValue, PlanDefinitions};
use menu_snapshot::{
    HistoryPage, MenuSnapshot, ReferenceDataReader, ReferenceError, SnapshotError, SnapshotReader,
    SnapshotWriter,
};
use menu_store::RowStore;
use menu_types::{
    ActorId, Category, CategoryId, Currency, ItemId, ManualClock, MenuItem, MenuTree,
    Organization, OrganizationId, SnapshotId, Timestamp,
};

use crate::{
    spawn_sweep, Collaborators, InMemoryDeployment, IntegrityAlert, IntegrityAlertSink,
    LedgerConfig, MenuError, MenuLedger, Role, SnapshotQuery, SnapshotView,
};

const PLANS: &str = r#"
    [plans.free]
    menu_publish = false

    [plans.pro]
    menu_publish = true

    [subscriptions]
    cafe-moda = "pro"
    kebapci = "free"
"#;

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap()
}

fn org() -> OrganizationId {
    OrganizationId::new("cafe-moda").unwrap()
}

fn free_org() -> OrganizationId {
    OrganizationId::new("kebapci").unwrap()
}

fn item_x() -> ItemId {
    ItemId::new("tea").unwrap()
}

fn owner() -> ActorId {
    ActorId::new("ayse").unwrap()
}

fn viewer() -> ActorId {
    ActorId::new("mert").unwrap()
}

fn try_(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

// ---------------------------------------------------------------------------
// Snapshot store that can have its stored payloads corrupted underneath
// ---------------------------------------------------------------------------

struct TamperableStore {
    inner: Arc<menu_snapshot::InMemorySnapshotStore>,
    corrupted: Mutex<HashSet<SnapshotId>>,
}

impl TamperableStore {
    fn corrupt(&self, id: SnapshotId) {
        self.corrupted.lock().unwrap().insert(id);
    }

    fn apply(&self, mut s: MenuSnapshot) -> MenuSnapshot {
        if self.corrupted.lock().unwrap().contains(&s.id) {
            s.content_payload["organization"]["name"] = json!("Cafe Moda (edited)");
        }
        s
    }
}

impl SnapshotReader for TamperableStore {
    fn latest(&self, org: &OrganizationId) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(self.inner.latest(org)?.map(|s| self.apply(s)))
    }

    fn by_id(&self, id: &SnapshotId) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(self.inner.by_id(id)?.map(|s| self.apply(s)))
    }

    fn by_version(
        &self,
        org: &OrganizationId,
        version: i64,
    ) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(self.inner.by_version(org, version)?.map(|s| self.apply(s)))
    }

    fn history(
        &self,
        org: &OrganizationId,
        limit: usize,
        offset: i64,
    ) -> Result<HistoryPage, SnapshotError> {
        self.inner.history(org, limit, offset)
    }

    fn chain(&self, org: &OrganizationId) -> Result<Vec<MenuSnapshot>, SnapshotError> {
        Ok(self.inner.chain(org)?.into_iter().map(|s| self.apply(s)).collect())
    }

    fn recent(&self, limit: usize) -> Result<Vec<MenuSnapshot>, SnapshotError> {
        Ok(self.inner.recent(limit)?.into_iter().map(|s| self.apply(s)).collect())
    }
}

impl SnapshotWriter for TamperableStore {
    fn save(&self, snapshot: MenuSnapshot) -> Result<MenuSnapshot, SnapshotError> {
        self.inner.save(snapshot)
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

struct World {
    deploy: InMemoryDeployment,
    store: Arc<TamperableStore>,
    clock: Arc<ManualClock>,
    ledger: MenuLedger,
}

fn seed(deploy: &InMemoryDeployment) {
    for (id, name) in [(org(), "Cafe Moda"), (free_org(), "Kebapci")] {
        let organization = Organization {
            id: id.clone(),
            name: name.into(),
            slug: id.to_string(),
            currency: Currency::new("TRY").unwrap(),
        };
        let tree = MenuTree {
            categories: vec![Category {
                id: CategoryId::new("drinks").unwrap(),
                name: "Drinks".into(),
                description: None,
                position: 0,
                visible: true,
            }],
            items: Vec::new(),
        };
        deploy.reference.load(organization, tree).unwrap();
        deploy.actors.add_member(owner(), id.clone(), Role::Owner).unwrap();
        deploy.actors.add_member(viewer(), id, Role::Viewer).unwrap();
    }
    deploy
        .reference
        .put_item(
            &org(),
            MenuItem {
                id: item_x(),
                category_id: CategoryId::new("drinks").unwrap(),
                name: "Tea".into(),
                description: None,
                position: 0,
                visible: true,
            },
        )
        .unwrap();
}

fn world_with(config: LedgerConfig) -> World {
    let clock = Arc::new(ManualClock::new(t0()));
    let plans = PlanDefinitions::from_toml_str(PLANS).unwrap();
    let deploy = InMemoryDeployment::with_clock(&config, plans, clock.clone());
    seed(&deploy);

    let store = Arc::new(TamperableStore {
        inner: deploy.snapshots.clone(),
        corrupted: Mutex::new(HashSet::new()),
    });
    let ledger = MenuLedger::new(
        config,
        Collaborators {
            prices: deploy.prices.clone(),
            snapshots: store.clone(),
            reference: deploy.reference.clone(),
            actors: deploy.actors.clone(),
            gate: deploy.gate.clone(),
            clock: clock.clone(),
        },
    )
    .unwrap();
    World {
        deploy,
        store,
        clock,
        ledger,
    }
}

fn world() -> World {
    world_with(LedgerConfig::default())
}

fn snapshot_of(view: SnapshotView) -> MenuSnapshot {
    match view {
        SnapshotView::Snapshot { snapshot } => snapshot,
        other => panic!("expected a snapshot, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Current price
// ---------------------------------------------------------------------------
#[test]
fn later_price_becomes_current() {
    let w = world();
    w.ledger
        .record_price_change(&item_x(), try_(100), "TRY", None, &owner())
        .unwrap();
    w.clock.advance(Duration::seconds(1));
    w.ledger
        .record_price_change(&item_x(), try_(120), "TRY", Some("supplier increase"), &owner())
        .unwrap();

    let current = w.ledger.current_price_of(&item_x()).unwrap().unwrap();
    assert_eq!(current.price, try_(120));
    assert_eq!(current.currency.code(), "TRY");

    let history = w.ledger.price_history(&item_x()).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].reason.as_deref(), Some("supplier increase"));
    assert_eq!(history[0].recorded_by, Some(owner()));
}

// ---------------------------------------------------------------------------
// Publishing and rebuilding
// ---------------------------------------------------------------------------
#[test]
fn publish_rebuild_hide_and_verify() {
    let w = world();
    w.ledger
        .record_price_change(&item_x(), try_(120), "TRY", None, &owner())
        .unwrap();

    let first = w.ledger.publish(&org(), &owner()).unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(first.attempts, 1);

    let second = w.ledger.publish(&org(), &owner()).unwrap();
    assert_eq!(second.version, 2);
    assert_eq!(second.hash, first.hash);

    let v2 = snapshot_of(w.ledger.get_snapshot(SnapshotQuery::version(org(), 2)).unwrap());
    assert_eq!(v2.prev_hash, Some(first.hash));
    assert_eq!(v2.published_by, Some(owner()));

    w.deploy.reference.set_item_visible(&item_x(), false).unwrap();
    let third = w.ledger.publish(&org(), &owner()).unwrap();
    assert_eq!(third.version, 3);
    assert_ne!(third.hash, first.hash);

    match w
        .ledger
        .get_snapshot(SnapshotQuery::by_id(first.snapshot_id).verified())
        .unwrap()
    {
        SnapshotView::Verified { snapshot, report } => {
            assert_eq!(snapshot.version, 1);
            assert!(report.is_valid);
        }
        other => panic!("unexpected view {other:?}"),
    }

    assert!(w.ledger.verify_chain(&org()).unwrap().is_valid);
}

#[test]
fn unpriced_item_is_published_with_null_price() {
    let w = world();
    let receipt = w.ledger.publish(&org(), &owner()).unwrap();
    let snapshot = snapshot_of(
        w.ledger
            .get_snapshot(SnapshotQuery::by_id(receipt.snapshot_id))
            .unwrap(),
    );
    let item = &snapshot.content_payload["categories"][0]["items"][0];
    assert_eq!(item["id"], "tea");
    assert!(item["price"].is_null());
}

// ---------------------------------------------------------------------------
// Tamper detection and export
// ---------------------------------------------------------------------------
#[test]
fn corrupted_snapshot_fails_verification() {
    let w = world();
    w.ledger
        .record_price_change(&item_x(), try_(120), "TRY", None, &owner())
        .unwrap();
    let first = w.ledger.publish(&org(), &owner()).unwrap();
    w.store.corrupt(first.snapshot_id);

    let query = SnapshotQuery::version(org(), 1).verified();
    let SnapshotView::Verified { report, .. } = w.ledger.get_snapshot(query).unwrap() else {
        panic!("expected verification");
    };
    assert!(!report.is_valid);
    assert_eq!(report.stored_hash, first.hash);
    assert!(report.computed_hash.is_some());
    assert_ne!(report.computed_hash, Some(first.hash));

    let export = SnapshotQuery::by_id(first.snapshot_id).exported();
    let SnapshotView::Export { document } = w.ledger.get_snapshot(export).unwrap() else {
        panic!("expected export");
    };
    assert!(document.integrity_failure);
    assert_eq!(document.verification.stored_hash, first.hash);
    assert_eq!(document.exported_at, t0());
}

#[test]
fn clean_export_passes() {
    let w = world();
    let first = w.ledger.publish(&org(), &owner()).unwrap();
    let SnapshotView::Export { document } = w
        .ledger
        .get_snapshot(SnapshotQuery::latest(org()).exported())
        .unwrap()
    else {
        panic!("expected export");
    };
    assert!(!document.integrity_failure);
    assert_eq!(document.version, 1);
    assert_eq!(document.hash, first.hash);
    assert!(document.recheck().unwrap());
}

// ---------------------------------------------------------------------------
// Concurrent publishes
// ---------------------------------------------------------------------------
#[test]
fn two_concurrent_publishes_take_versions_four_and_five() {
    let w = world();
    for _ in 0..3 {
        w.ledger.publish(&org(), &owner()).unwrap();
    }

    let versions: Vec<u64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| s.spawn(|| w.ledger.publish(&org(), &owner()).unwrap().version))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let got: BTreeSet<u64> = versions.into_iter().collect();
    assert_eq!(got, BTreeSet::from([4, 5]));
    assert!(w.ledger.verify_chain(&org()).unwrap().is_valid);
}

#[test]
fn many_concurrent_publishes_stay_contiguous() {
    let config = LedgerConfig {
        publish_max_retries: 16,
        ..LedgerConfig::default()
    };
    let w = world_with(config);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| w.ledger.publish(&org(), &owner()).unwrap());
        }
    });

    let page = match w
        .ledger
        .get_snapshot(SnapshotQuery::history(org(), 100, 0))
        .unwrap()
    {
        SnapshotView::History { page } => page,
        other => panic!("unexpected view {other:?}"),
    };
    assert_eq!(page.total_count, 8);
    let versions: Vec<u64> = page.items.iter().map(|s| s.version).collect();
    assert_eq!(versions, (1..=8).rev().collect::<Vec<u64>>());
    assert!(w.ledger.verify_chain(&org()).unwrap().is_valid);
}

struct AlwaysConflicting;

impl SnapshotReader for AlwaysConflicting {
    fn latest(&self, _: &OrganizationId) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(None)
    }

    fn by_id(&self, _: &SnapshotId) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(None)
    }

    fn by_version(&self, _: &OrganizationId, _: i64) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(None)
    }

    fn history(&self, org: &OrganizationId, _: usize, _: i64) -> Result<HistoryPage, SnapshotError> {
        Err(SnapshotError::NotFound(org.to_string()))
    }

    fn chain(&self, _: &OrganizationId) -> Result<Vec<MenuSnapshot>, SnapshotError> {
        Ok(Vec::new())
    }

    fn recent(&self, _: usize) -> Result<Vec<MenuSnapshot>, SnapshotError> {
        Ok(Vec::new())
    }
}

impl SnapshotWriter for AlwaysConflicting {
    fn save(&self, snapshot: MenuSnapshot) -> Result<MenuSnapshot, SnapshotError> {
        Err(SnapshotError::VersionConflict {
            organization: snapshot.organization_id,
            version: snapshot.version,
        })
    }
}

#[test]
fn exhausted_retries_surface_conflict() {
    let config = LedgerConfig {
        publish_max_retries: 2,
        ..LedgerConfig::default()
    };
    let w = world_with(config.clone());
    let ledger = MenuLedger::new(
        config,
        Collaborators {
            prices: w.deploy.prices.clone(),
            snapshots: Arc::new(AlwaysConflicting),
            reference: w.deploy.reference.clone(),
            actors: w.deploy.actors.clone(),
            gate: w.deploy.gate.clone(),
            clock: w.clock.clone(),
        },
    )
    .unwrap();

    let err = ledger.publish(&org(), &owner()).unwrap_err();
    assert_eq!(
        err,
        MenuError::ConcurrentVersionConflict {
            organization: org(),
            attempts: 3
        }
    );
    assert!(err.is_retryable());
}

// ---------------------------------------------------------------------------
// Gate and roles
// ---------------------------------------------------------------------------
#[test]
fn plan_without_publish_is_forbidden_until_override() {
    let w = world();
    let err = w.ledger.publish(&free_org(), &owner()).unwrap_err();
    assert!(matches!(err, MenuError::Forbidden(_)));

    w.deploy
        .overrides
        .grant(FeatureOverride {
            organization_id: free_org(),
            feature: FeatureKey::new("menu_publish").unwrap(),
            value: FeatureValue::Flag(true),
            expires_at: Some(t0() + Duration::days(14)),
            reason: Some("trial".into()),
        })
        .unwrap();
    assert_eq!(w.ledger.publish(&free_org(), &owner()).unwrap().version, 1);

    w.clock.advance(Duration::days(15));
    assert!(matches!(
        w.ledger.publish(&free_org(), &owner()),
        Err(MenuError::Forbidden(_))
    ));
}

#[test]
fn viewer_cannot_publish_or_reprice() {
    let w = world();
    assert!(matches!(
        w.ledger.publish(&org(), &viewer()),
        Err(MenuError::Forbidden(_))
    ));
    assert!(matches!(
        w.ledger
            .record_price_change(&item_x(), try_(10), "TRY", None, &viewer()),
        Err(MenuError::Forbidden(_))
    ));
    let stranger = ActorId::new("stranger").unwrap();
    assert!(matches!(
        w.ledger.publish(&org(), &stranger),
        Err(MenuError::Forbidden(_))
    ));
    assert_eq!(w.ledger.current_price_of(&item_x()).unwrap(), None);
}

#[test]
fn unknown_organization_and_item_are_not_found() {
    let w = world();
    let ghost = OrganizationId::new("ghost").unwrap();
    assert!(matches!(
        w.ledger.publish(&ghost, &owner()),
        Err(MenuError::NotFound(_))
    ));
    assert!(matches!(
        w.ledger.record_price_change(
            &ItemId::new("ghost-item").unwrap(),
            try_(10),
            "TRY",
            None,
            &owner()
        ),
        Err(MenuError::NotFound(_))
    ));
    assert!(matches!(
        w.ledger.get_snapshot(SnapshotQuery::latest(org())),
        Err(MenuError::NotFound(_))
    ));
}

#[test]
fn item_removed_from_menu_no_longer_takes_prices() {
    let w = world();
    w.ledger
        .record_price_change(&item_x(), try_(100), "TRY", None, &owner())
        .unwrap();

    let (organization, mut tree) = w.deploy.reference.read_menu(&org()).unwrap().unwrap();
    tree.items.retain(|i| i.id != item_x());
    w.deploy.reference.load(organization, tree).unwrap();

    assert!(matches!(
        w.ledger
            .record_price_change(&item_x(), try_(120), "TRY", None, &owner()),
        Err(MenuError::NotFound(_))
    ));
    assert_eq!(w.ledger.price_history(&item_x()).unwrap().len(), 1);
}

struct UnreachableReference;

impl ReferenceDataReader for UnreachableReference {
    fn organization(&self, _: &OrganizationId) -> Result<Option<Organization>, ReferenceError> {
        Err(ReferenceError::Unavailable("connection refused".into()))
    }

    fn menu_tree(&self, _: &OrganizationId) -> Result<MenuTree, ReferenceError> {
        Err(ReferenceError::Unavailable("connection refused".into()))
    }

    fn organization_of_item(&self, _: &ItemId) -> Result<Option<OrganizationId>, ReferenceError> {
        Err(ReferenceError::Unavailable("connection refused".into()))
    }
}

#[test]
fn unreachable_reference_data_is_a_storage_error_when_pricing() {
    let w = world();
    let ledger = MenuLedger::new(
        LedgerConfig::default(),
        Collaborators {
            prices: w.deploy.prices.clone(),
            snapshots: w.store.clone(),
            reference: Arc::new(UnreachableReference),
            actors: w.deploy.actors.clone(),
            gate: w.deploy.gate.clone(),
            clock: w.clock.clone(),
        },
    )
    .unwrap();

    let err = ledger
        .record_price_change(&item_x(), try_(10), "TRY", None, &owner())
        .unwrap_err();
    assert!(matches!(err, MenuError::Storage(_)), "{err:?}");
    assert!(matches!(
        ledger.publish(&org(), &owner()),
        Err(MenuError::BuildFailed(_))
    ));
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------
#[test]
fn invalid_prices_are_rejected() {
    let w = world();
    for (amount, currency) in [
        (Decimal::ZERO, "TRY"),
        (Decimal::new(-5, 0), "TRY"),
        (Decimal::new(12345, 3), "TRY"),
        (try_(10), "lira"),
    ] {
        let result = w
            .ledger
            .record_price_change(&item_x(), amount, currency, None, &owner());
        assert!(
            matches!(result, Err(MenuError::InvalidArgument(_))),
            "accepted {amount} {currency}"
        );
    }
}

#[test]
fn invalid_snapshot_queries_are_rejected() {
    let w = world();
    w.ledger.publish(&org(), &owner()).unwrap();
    assert!(matches!(
        w.ledger.get_snapshot(SnapshotQuery::version(org(), 0)),
        Err(MenuError::InvalidArgument(_))
    ));
    assert!(matches!(
        w.ledger.get_snapshot(SnapshotQuery::history(org(), 10, -1)),
        Err(MenuError::InvalidArgument(_))
    ));
    let mut by_id_history = SnapshotQuery::by_id(SnapshotId::new());
    by_id_history.history = Some(crate::HistoryRequest {
        limit: 10,
        offset: 0,
    });
    assert!(matches!(
        w.ledger.get_snapshot(by_id_history),
        Err(MenuError::InvalidArgument(_))
    ));
}

#[test]
fn history_limit_is_clamped_by_config() {
    let config = LedgerConfig {
        history_max_limit: 2,
        ..LedgerConfig::default()
    };
    let w = world_with(config);
    for _ in 0..4 {
        w.ledger.publish(&org(), &owner()).unwrap();
    }
    let SnapshotView::History { page } = w
        .ledger
        .get_snapshot(SnapshotQuery::history(org(), 50, 1))
        .unwrap()
    else {
        panic!("expected history");
    };
    assert_eq!(page.total_count, 4);
    assert_eq!(page.limit, 2);
    let versions: Vec<u64> = page.items.iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![3, 2]);
}

// ---------------------------------------------------------------------------
// Immutability at the storage boundary
// ---------------------------------------------------------------------------
#[test]
fn direct_mutation_of_facts_and_snapshots_is_rejected() {
    let w = world();
    let fact = w
        .ledger
        .record_price_change(&item_x(), try_(120), "TRY", None, &owner())
        .unwrap();
    w.ledger.publish(&org(), &owner()).unwrap();

    let mut forged = fact.clone();
    forged.price = try_(1);
    let err: MenuError = w
        .deploy
        .prices
        .raw_table()
        .update(fact.id.get(), forged)
        .unwrap_err()
        .into();
    assert!(matches!(err, MenuError::ImmutabilityViolation(_)));

    let (row, _) = w.deploy.snapshots.raw_table().scan().unwrap().remove(0);
    let err: MenuError = w
        .deploy
        .snapshots
        .raw_table()
        .delete(row)
        .unwrap_err()
        .into();
    assert!(matches!(err, MenuError::ImmutabilityViolation(_)));

    assert_eq!(
        w.ledger.current_price_of(&item_x()).unwrap().unwrap().price,
        try_(120)
    );
}

// ---------------------------------------------------------------------------
// Notifications and sweeps
// ---------------------------------------------------------------------------
#[tokio::test]
async fn price_change_is_broadcast() {
    let w = world();
    let mut rx = w.ledger.subscribe_price_changes();
    let fact = w
        .ledger
        .record_price_change(&item_x(), try_(45), "TRY", None, &owner())
        .unwrap();

    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.organization_id, org());
    assert_eq!(notice.item_id, item_x());
    assert_eq!(notice.fact_id, fact.id);
    assert_eq!(notice.currency, "TRY");
    assert_eq!(notice.price, "45.00");
}

#[test]
fn recording_without_subscribers_still_succeeds() {
    let w = world();
    assert!(w
        .ledger
        .record_price_change(&item_x(), try_(45), "TRY", None, &owner())
        .is_ok());
}

#[derive(Default)]
struct CollectingSink {
    alerts: Mutex<Vec<IntegrityAlert>>,
}

#[async_trait]
impl IntegrityAlertSink for CollectingSink {
    async fn alert(&self, alert: IntegrityAlert) {
        self.alerts.lock().unwrap().push(alert);
    }
}

#[tokio::test]
async fn sweep_reports_only_tampered_snapshots() {
    let w = world();
    w.ledger
        .record_price_change(&item_x(), try_(120), "TRY", None, &owner())
        .unwrap();
    let first = w.ledger.publish(&org(), &owner()).unwrap();
    w.ledger.publish(&org(), &owner()).unwrap();
    w.store.corrupt(first.snapshot_id);

    let sink = Arc::new(CollectingSink::default());
    let sweeper = crate::Sweeper::new(w.store.clone(), sink.clone(), w.clock.clone(), 10);
    let summary = sweeper.run_once().await.unwrap();

    assert_eq!(summary.checked, 2);
    assert_eq!(summary.failed, 1);
    let alerts = sink.alerts.lock().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].report.snapshot_id, first.snapshot_id);
}

struct ChannelSink(tokio::sync::mpsc::UnboundedSender<IntegrityAlert>);

#[async_trait]
impl IntegrityAlertSink for ChannelSink {
    async fn alert(&self, alert: IntegrityAlert) {
        let _ = self.0.send(alert);
    }
}

#[tokio::test]
async fn spawned_sweep_runs_periodically() {
    let w = world();
    let first = w.ledger.publish(&org(), &owner()).unwrap();
    w.store.corrupt(first.snapshot_id);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let sweeper = Arc::new(crate::Sweeper::new(
        w.store.clone(),
        Arc::new(ChannelSink(tx)),
        w.clock.clone(),
        5,
    ));
    let handle = spawn_sweep(sweeper, StdDuration::from_millis(10));

    let alert = tokio::time::timeout(StdDuration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alert.report.version, 1);
    handle.abort();
}
