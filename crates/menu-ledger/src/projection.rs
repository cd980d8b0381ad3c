use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use menu_types::{Currency, ItemId, Money, PriceFactId, Timestamp};

use crate::error::LedgerError;
use crate::records::PriceFact;
use crate::traits::PriceLedgerReader;

/// The effective price of an item: its most recent price fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPrice {
    pub item_id: ItemId,
    pub price: Decimal,
    pub currency: Currency,
    pub recorded_at: Timestamp,
    pub fact_id: PriceFactId,
}

impl CurrentPrice {
    pub fn money(&self) -> Result<Money, LedgerError> {
        Ok(Money::new(self.price, self.currency.clone())?)
    }
}

impl From<&PriceFact> for CurrentPrice {
    fn from(fact: &PriceFact) -> Self {
        Self {
            item_id: fact.item_id.clone(),
            price: fact.price,
            currency: fact.currency.clone(),
            recorded_at: fact.recorded_at,
            fact_id: fact.id,
        }
    }
}

/// Derives current prices from the ledger. Pure read, no side effects.
///
/// The current price of an item is the fact with the greatest
/// `(recorded_at, id)`. Backdated imports therefore do not displace a
/// newer price even though they carry a higher id.
pub struct CurrentPriceProjector;

impl CurrentPriceProjector {
    /// Latest fact in a slice by `(recorded_at, id)`.
    pub fn latest(facts: &[PriceFact]) -> Option<&PriceFact> {
        facts.iter().max_by_key(|f| f.recency_key())
    }

    /// Current price of one item. `Ok(None)` when no price was ever
    /// recorded, which is not an error.
    pub fn current_price_of<R: PriceLedgerReader + ?Sized>(
        reader: &R,
        item: &ItemId,
    ) -> Result<Option<CurrentPrice>, LedgerError> {
        let facts = reader.facts_for(item)?;
        Ok(Self::latest(&facts).map(CurrentPrice::from))
    }

    /// Current prices for a set of items. Items without any fact are absent
    /// from the result; an empty set yields an empty map.
    pub fn current_prices_of<R: PriceLedgerReader + ?Sized>(
        reader: &R,
        items: &BTreeSet<ItemId>,
    ) -> Result<BTreeMap<ItemId, CurrentPrice>, LedgerError> {
        if items.is_empty() {
            return Ok(BTreeMap::new());
        }
        let ids: Vec<ItemId> = items.iter().cloned().collect();
        let grouped = reader.facts_for_items(&ids)?;
        Ok(grouped
            .into_iter()
            .filter_map(|(item, facts)| {
                Self::latest(&facts).map(|f| (item, CurrentPrice::from(f)))
            })
            .collect())
    }

    /// Full price history of an item, newest first by `(recorded_at, id)`.
    pub fn history_of<R: PriceLedgerReader + ?Sized>(
        reader: &R,
        item: &ItemId,
    ) -> Result<Vec<PriceFact>, LedgerError> {
        let mut facts = reader.facts_for(item)?;
        facts.sort_by_key(|f| std::cmp::Reverse(f.recency_key()));
        Ok(facts)
    }
}
