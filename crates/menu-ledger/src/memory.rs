use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::SubsecRound;
use menu_store::{InMemoryTable, RowStore};
use menu_types::{Clock, ItemId, MonotonicClock, PriceFactId, Timestamp};

use crate::error::LedgerError;
use crate::records::{PriceEntry, PriceFact};
use crate::traits::{PriceLedgerReader, PriceLedgerWriter};

/// In-memory price ledger backed by an append-only table.
///
/// Facts are stamped by a [`MonotonicClock`] inside the table's insert lock,
/// so id order and `recorded_at` order agree for everything written through
/// [`PriceLedgerWriter::append`].
pub struct InMemoryPriceLedger {
    table: InMemoryTable<PriceFact>,
    by_item: RwLock<HashMap<ItemId, Vec<PriceFactId>>>,
    clock: MonotonicClock,
}

impl InMemoryPriceLedger {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::system())
    }

    pub fn with_clock(clock: MonotonicClock) -> Self {
        Self {
            table: InMemoryTable::append_only("price_facts"),
            by_item: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Ledger whose timestamps come from `source`, made strictly monotonic.
    pub fn with_source(source: Arc<dyn Clock>) -> Self {
        Self::with_clock(MonotonicClock::new(source))
    }

    /// Direct access to the underlying table, as a database session would
    /// have. Update and delete through this handle are still rejected.
    pub fn raw_table(&self) -> &dyn RowStore<PriceFact> {
        &self.table
    }

    fn insert(
        &self,
        entry: &PriceEntry,
        recorded_at: Option<Timestamp>,
    ) -> Result<PriceFact, LedgerError> {
        let reason = entry.normalized_reason()?;

        // Index lock is held across the insert so a returned fact is
        // always reachable through `facts_for`.
        let mut index = self.by_item.write().map_err(|_| LedgerError::LockPoisoned)?;
        let (_, fact) = self.table.insert_with(|row_id| PriceFact {
            id: PriceFactId::new(row_id),
            item_id: entry.item_id.clone(),
            price: entry.price.amount(),
            currency: entry.price.currency().clone(),
            reason,
            recorded_by: entry.actor.clone(),
            recorded_at: recorded_at.unwrap_or_else(|| self.clock.tick()),
        })?;
        index
            .entry(fact.item_id.clone())
            .or_default()
            .push(fact.id);

        tracing::debug!(
            fact_id = %fact.id,
            item_id = %fact.item_id,
            price = %entry.price,
            "price fact recorded"
        );
        Ok(fact)
    }
}

impl Default for InMemoryPriceLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceLedgerWriter for InMemoryPriceLedger {
    fn append(&self, entry: &PriceEntry) -> Result<PriceFact, LedgerError> {
        self.insert(entry, None)
    }

    /// Rejects timestamps ahead of the ledger clock: a future-dated fact
    /// would stay current over every later append.
    fn import(&self, entry: &PriceEntry, recorded_at: Timestamp) -> Result<PriceFact, LedgerError> {
        let recorded_at = recorded_at.trunc_subsecs(6);
        if recorded_at > self.clock.wall() {
            return Err(LedgerError::InvalidArgument(format!(
                "recorded_at {recorded_at} is in the future"
            )));
        }
        self.insert(entry, Some(recorded_at))
    }
}

impl PriceLedgerReader for InMemoryPriceLedger {
    fn get(&self, id: PriceFactId) -> Result<Option<PriceFact>, LedgerError> {
        Ok(self.table.get(id.get())?)
    }

    fn facts_for(&self, item: &ItemId) -> Result<Vec<PriceFact>, LedgerError> {
        let index = self.by_item.read().map_err(|_| LedgerError::LockPoisoned)?;
        let Some(ids) = index.get(item) else {
            return Ok(Vec::new());
        };
        let row_ids: Vec<u64> = ids.iter().map(|id| id.get()).collect();
        let mut facts: Vec<PriceFact> = self
            .table
            .get_batch(&row_ids)?
            .into_iter()
            .flatten()
            .collect();
        facts.sort_by_key(|f| f.id);
        Ok(facts)
    }

    fn fact_count(&self) -> Result<u64, LedgerError> {
        Ok(self.table.count()?)
    }
}

impl std::fmt::Debug for InMemoryPriceLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPriceLedger")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
