//! Shared fixtures for this crate's unit tests.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use menu_ledger::{InMemoryPriceLedger, PriceEntry, PriceLedgerWriter};
use menu_types::{
    Category, CategoryId, Currency, ItemId, ManualClock, MenuItem, MenuTree, Money, Organization,
    OrganizationId, SnapshotId, Timestamp,
};
use serde_json::json;

use crate::builder::SnapshotBuilder;
use crate::error::SnapshotError;
use crate::memory::InMemorySnapshotStore;
use crate::reference::{InMemoryReferenceData, ReferenceDataReader};
use crate::snapshot::MenuSnapshot;
use crate::store::{HistoryPage, SnapshotReader};

pub fn org_id() -> OrganizationId {
    OrganizationId::new("cafe-moda").unwrap()
}

pub fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap()
}

fn category(id: &str, position: u32, visible: bool) -> Category {
    Category {
        id: CategoryId::new(id).unwrap(),
        name: id.to_uppercase(),
        description: None,
        position,
        visible,
    }
}

fn item(id: &str, category: &str, position: u32) -> MenuItem {
    MenuItem {
        id: ItemId::new(id).unwrap(),
        category_id: CategoryId::new(category).unwrap(),
        name: id.to_string(),
        description: None,
        position,
        visible: true,
    }
}

/// Reference data with two visible categories and one hidden one, plus a
/// price ledger on a frozen clock.
pub struct Fixture {
    pub reference: InMemoryReferenceData,
    pub ledger: InMemoryPriceLedger,
}

impl Fixture {
    pub fn new() -> Self {
        let reference = InMemoryReferenceData::new();
        let org = Organization {
            id: org_id(),
            name: "Cafe Moda".into(),
            slug: "cafe-moda".into(),
            currency: Currency::new("TRY").unwrap(),
        };
        let tree = MenuTree {
            categories: vec![
                category("mains", 1, true),
                category("drinks", 0, true),
                category("secret", 2, false),
            ],
            items: vec![
                item("coffee", "drinks", 1),
                item("tea", "drinks", 0),
                item("soup", "mains", 0),
                item("special", "secret", 0),
            ],
        };
        reference.load(org, tree).unwrap();

        let ledger = InMemoryPriceLedger::with_source(Arc::new(ManualClock::new(now())));
        Self { reference, ledger }
    }

    pub fn builder(&self) -> SnapshotBuilder<'_> {
        SnapshotBuilder::new(&self.reference, &self.ledger)
    }

    pub fn set_price(&self, item: &str, amount: &str) {
        let money = Money::parse(amount, Currency::new("TRY").unwrap()).unwrap();
        self.ledger
            .append(&PriceEntry::new(ItemId::new(item).unwrap(), money))
            .unwrap();
    }

    pub fn hide(&self, item: &str) {
        assert!(self
            .reference
            .set_item_visible(&ItemId::new(item).unwrap(), false)
            .unwrap());
    }

    pub fn rename(&self, item: &str, name: &str) {
        let tree = self.reference.menu_tree(&org_id()).unwrap();
        let mut existing = tree
            .items
            .into_iter()
            .find(|i| i.id.as_str() == item)
            .unwrap();
        existing.name = name.to_string();
        self.reference.put_item(&org_id(), existing).unwrap();
    }
}

/// Serves one snapshot with a rewritten payload, as if the stored bytes
/// had been altered underneath the application.
pub struct CorruptedReader<'a> {
    pub inner: &'a InMemorySnapshotStore,
    pub target: SnapshotId,
}

impl CorruptedReader<'_> {
    fn corrupt(&self, s: MenuSnapshot) -> MenuSnapshot {
        if s.id != self.target {
            return s;
        }
        let mut s = s;
        s.content_payload["organization"]["name"] = json!("Tampered");
        s
    }
}

impl SnapshotReader for CorruptedReader<'_> {
    fn latest(&self, org: &OrganizationId) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(self.inner.latest(org)?.map(|s| self.corrupt(s)))
    }

    fn by_id(&self, id: &SnapshotId) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(self.inner.by_id(id)?.map(|s| self.corrupt(s)))
    }

    fn by_version(
        &self,
        org: &OrganizationId,
        version: i64,
    ) -> Result<Option<MenuSnapshot>, SnapshotError> {
        Ok(self.inner.by_version(org, version)?.map(|s| self.corrupt(s)))
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
        self.inner.chain(org)
    }

    fn recent(&self, limit: usize) -> Result<Vec<MenuSnapshot>, SnapshotError> {
        self.inner.recent(limit)
    }
}
