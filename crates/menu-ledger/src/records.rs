use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use menu_types::{ActorId, Currency, ItemId, Money, PriceFactId, Timestamp};

use crate::error::LedgerError;

/// Longest accepted free-text reason, in characters.
pub const MAX_REASON_LEN: usize = 500;

/// One immutable record of a price having been set for an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFact {
    pub id: PriceFactId,
    pub item_id: ItemId,
    pub price: Decimal,
    pub currency: Currency,
    pub reason: Option<String>,
    pub recorded_by: Option<ActorId>,
    pub recorded_at: Timestamp,
}

impl PriceFact {
    /// Ordering key for "most recent": `recorded_at` first, id as tiebreak.
    pub fn recency_key(&self) -> (Timestamp, PriceFactId) {
        (self.recorded_at, self.id)
    }

    /// The price as validated money.
    pub fn money(&self) -> Result<Money, LedgerError> {
        Ok(Money::new(self.price, self.currency.clone())?)
    }
}

/// A price change to be appended to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub item_id: ItemId,
    pub price: Money,
    pub reason: Option<String>,
    pub actor: Option<ActorId>,
}

impl PriceEntry {
    pub fn new(item_id: ItemId, price: Money) -> Self {
        Self {
            item_id,
            price,
            reason: None,
            actor: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn recorded_by(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Trimmed reason; blank reasons collapse to `None`.
    pub(crate) fn normalized_reason(&self) -> Result<Option<String>, LedgerError> {
        let Some(reason) = self.reason.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if reason.is_empty() {
            return Ok(None);
        }
        if reason.chars().count() > MAX_REASON_LEN {
            return Err(LedgerError::InvalidArgument(format!(
                "reason exceeds {MAX_REASON_LEN} characters"
            )));
        }
        Ok(Some(reason.to_string()))
    }
}
