use std::collections::HashMap;

use menu_types::{ItemId, PriceFactId, Timestamp};

use crate::error::LedgerError;
use crate::records::{PriceEntry, PriceFact};

/// Write boundary for price ledger appends.
///
/// No update or delete: price facts are insert-only, and the storage layer
/// rejects in-place mutation as well.
pub trait PriceLedgerWriter: Send + Sync {
    /// Append a price fact stamped with server time.
    ///
    /// `recorded_at` is strictly monotonic per store instance, and the new
    /// fact is visible to every subsequent read.
    fn append(&self, entry: &PriceEntry) -> Result<PriceFact, LedgerError>;

    /// Append a fact with a caller-supplied `recorded_at` (batch imports,
    /// migrations). The id is still server-assigned in insertion order.
    /// Timestamps later than the store's clock are rejected with
    /// `InvalidArgument`.
    fn import(&self, entry: &PriceEntry, recorded_at: Timestamp) -> Result<PriceFact, LedgerError>;
}

/// Read boundary for price ledger queries.
pub trait PriceLedgerReader: Send + Sync {
    fn get(&self, id: PriceFactId) -> Result<Option<PriceFact>, LedgerError>;

    /// All facts recorded for an item, in insertion (id) order.
    fn facts_for(&self, item: &ItemId) -> Result<Vec<PriceFact>, LedgerError>;

    /// Facts for several items. Items without facts are absent from the map.
    fn facts_for_items(
        &self,
        items: &[ItemId],
    ) -> Result<HashMap<ItemId, Vec<PriceFact>>, LedgerError> {
        let mut out = HashMap::with_capacity(items.len());
        for item in items {
            let facts = self.facts_for(item)?;
            if !facts.is_empty() {
                out.insert(item.clone(), facts);
            }
        }
        Ok(out)
    }

    fn fact_count(&self) -> Result<u64, LedgerError>;
}

/// A ledger that can both append and be read.
pub trait PriceLedger: PriceLedgerReader + PriceLedgerWriter {
    /// View as a read-only handle.
    fn as_reader(&self) -> &dyn PriceLedgerReader;
}

impl<T: PriceLedgerReader + PriceLedgerWriter> PriceLedger for T {
    fn as_reader(&self) -> &dyn PriceLedgerReader {
        self
    }
}
