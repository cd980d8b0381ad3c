use std::collections::BTreeSet;

use menu_ledger::{CurrentPriceProjector, PriceLedgerReader};
use menu_types::{ActorId, ItemId, OrganizationId, Timestamp};

use crate::error::SnapshotError;
use crate::payload::{CategoryEntry, ItemEntry, OrganizationEntry, PublishedPrice, SnapshotPayload};
use crate::reference::ReferenceDataReader;
use crate::snapshot::{MenuSnapshot, SnapshotDraft};
use crate::store::SnapshotReader;

/// Assembles snapshot content from reference data and the price ledger.
///
/// Building never writes anything. Persisting the result is a separate,
/// single `save` call, so an abandoned build leaves no trace.
pub struct SnapshotBuilder<'a> {
    reference: &'a dyn ReferenceDataReader,
    prices: &'a dyn PriceLedgerReader,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(reference: &'a dyn ReferenceDataReader, prices: &'a dyn PriceLedgerReader) -> Self {
        Self { reference, prices }
    }

    /// Assemble the typed payload for an organization's visible menu.
    ///
    /// Every visible item in a visible category is included. Items with no
    /// recorded price carry an explicit `null` price.
    pub fn assemble(&self, org_id: &OrganizationId) -> Result<SnapshotPayload, SnapshotError> {
        let (org, tree) = self
            .reference
            .read_menu(org_id)?
            .ok_or_else(|| SnapshotError::NotFound(format!("organization {org_id}")))?;

        let sections = tree.visible_sections();
        let wanted: BTreeSet<ItemId> = sections
            .iter()
            .flat_map(|s| s.items.iter().map(|i| i.id.clone()))
            .collect();
        let prices = CurrentPriceProjector::current_prices_of(self.prices, &wanted)
            .map_err(|e| SnapshotError::BuildFailed(format!("price lookup: {e}")))?;

        let mut categories = Vec::with_capacity(sections.len());
        for section in &sections {
            let mut items = Vec::with_capacity(section.items.len());
            for item in &section.items {
                let price = prices
                    .get(&item.id)
                    .map(PublishedPrice::from_current)
                    .transpose()?;
                items.push(ItemEntry::from_item(item, price));
            }
            categories.push(CategoryEntry::from_category(section.category, items));
        }

        let payload = SnapshotPayload::new(OrganizationEntry::from_organization(&org), categories);
        tracing::debug!(
            organization = %org_id,
            categories = payload.categories.len(),
            items = payload.item_count(),
            unpriced = payload.unpriced_count(),
            "snapshot content assembled"
        );
        Ok(payload)
    }

    /// Assemble and hash, without assigning a version.
    pub fn build_draft(&self, org_id: &OrganizationId) -> Result<SnapshotDraft, SnapshotError> {
        let payload = self.assemble(org_id)?;
        SnapshotDraft::from_payload(org_id.clone(), &payload)
    }

    /// Build a snapshot numbered after the latest one in `snapshots`.
    ///
    /// The version is only provisional: `SnapshotWriter::save` is what
    /// guarantees uniqueness under concurrent publishes.
    pub fn build(
        &self,
        org_id: &OrganizationId,
        snapshots: &dyn SnapshotReader,
        created_at: Timestamp,
        published_by: Option<ActorId>,
    ) -> Result<MenuSnapshot, SnapshotError> {
        let draft = self.build_draft(org_id)?;
        let previous = snapshots.latest(org_id)?;
        Ok(draft.into_snapshot(previous.as_ref(), created_at, published_by))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySnapshotStore;
    use crate::reference::ReferenceError;
    use crate::store::SnapshotWriter;
    use crate::testing::{self, Fixture};
    use menu_types::{MenuTree, Organization};

    #[test]
    fn unknown_organization_is_not_found() {
        let fx = Fixture::new();
        let builder = fx.builder();
        let err = builder
            .build_draft(&OrganizationId::new("nope").unwrap())
            .unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound(_)));
    }

    #[test]
    fn unpriced_visible_item_is_kept_with_null_price() {
        let fx = Fixture::new();
        fx.set_price("tea", "100");
        let payload = fx.builder().assemble(&testing::org_id()).unwrap();

        let drinks = &payload.categories[0];
        assert_eq!(drinks.items.len(), 2);
        let tea = drinks.items.iter().find(|i| i.id == "tea").unwrap();
        let coffee = drinks.items.iter().find(|i| i.id == "coffee").unwrap();
        assert_eq!(tea.price.as_ref().unwrap().amount, "100.00");
        assert!(coffee.price.is_none());
    }

    #[test]
    fn hidden_entries_are_excluded_and_order_is_by_position() {
        let fx = Fixture::new();
        fx.hide("coffee");
        let payload = fx.builder().assemble(&testing::org_id()).unwrap();
        let ids: Vec<&str> = payload
            .categories
            .iter()
            .flat_map(|c| c.items.iter().map(|i| i.id.as_str()))
            .collect();
        assert_eq!(ids, vec!["tea", "soup"]);
        let categories: Vec<&str> = payload.categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(categories, vec!["drinks", "mains"]);
    }

    #[test]
    fn identical_data_hashes_identically() {
        let fx = Fixture::new();
        fx.set_price("tea", "120");
        let a = fx.builder().build_draft(&testing::org_id()).unwrap();
        let b = fx.builder().build_draft(&testing::org_id()).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.content_payload, b.content_payload);
    }

    #[test]
    fn price_name_and_visibility_changes_alter_hash() {
        let fx = Fixture::new();
        fx.set_price("tea", "120");
        let base = fx.builder().build_draft(&testing::org_id()).unwrap().hash;

        fx.set_price("tea", "125");
        let repriced = fx.builder().build_draft(&testing::org_id()).unwrap().hash;
        assert_ne!(base, repriced);

        fx.rename("tea", "Black Tea");
        let renamed = fx.builder().build_draft(&testing::org_id()).unwrap().hash;
        assert_ne!(repriced, renamed);

        fx.hide("tea");
        let hidden = fx.builder().build_draft(&testing::org_id()).unwrap().hash;
        assert_ne!(renamed, hidden);
    }

    #[test]
    fn build_numbers_after_latest_and_links_hash() {
        let fx = Fixture::new();
        let store = InMemorySnapshotStore::new();
        let builder = fx.builder();

        let first = builder
            .build(&testing::org_id(), &store, testing::now(), None)
            .unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.prev_hash, None);
        let first = store.save(first).unwrap();

        let second = builder
            .build(&testing::org_id(), &store, testing::now(), None)
            .unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.prev_hash, Some(first.hash));
    }

    struct BrokenReference;

    impl ReferenceDataReader for BrokenReference {
        fn organization(&self, _: &OrganizationId) -> Result<Option<Organization>, ReferenceError> {
            Err(ReferenceError::Unavailable("connection reset".into()))
        }

        fn menu_tree(&self, _: &OrganizationId) -> Result<MenuTree, ReferenceError> {
            Err(ReferenceError::Unavailable("connection reset".into()))
        }

        fn organization_of_item(&self, _: &ItemId) -> Result<Option<OrganizationId>, ReferenceError> {
            Err(ReferenceError::Unavailable("connection reset".into()))
        }
    }

    #[test]
    fn reference_failure_is_build_failed() {
        let fx = Fixture::new();
        let broken = BrokenReference;
        let builder = SnapshotBuilder::new(&broken, &fx.ledger);
        let err = builder.build_draft(&testing::org_id()).unwrap_err();
        assert!(matches!(err, SnapshotError::BuildFailed(_)));
    }
}
