use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use menu_ledger::PriceFact;
use menu_types::{format_timestamp, ItemId, Money, OrganizationId, PriceFactId};

/// Sent after a price fact is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChangeNotice {
    pub organization_id: OrganizationId,
    pub item_id: ItemId,
    pub fact_id: PriceFactId,
    pub price: String,
    pub currency: String,
    pub recorded_at: String,
}

impl PriceChangeNotice {
    /// `price` is written at the currency's minor units, as in snapshots.
    pub fn new(organization_id: OrganizationId, fact: &PriceFact) -> Self {
        let price = Money::new(fact.price, fact.currency.clone())
            .map(|m| m.canonical_amount())
            .unwrap_or_else(|_| fact.price.to_string());
        Self {
            organization_id,
            item_id: fact.item_id.clone(),
            fact_id: fact.id,
            price,
            currency: fact.currency.code().to_string(),
            recorded_at: format_timestamp(&fact.recorded_at),
        }
    }
}

/// Fire-and-forget fan-out of price changes.
///
/// Delivery is best effort: with no subscribers the notice is dropped, and
/// a lagging subscriber skips old notices. Sending never fails an append.
#[derive(Clone, Debug)]
pub struct Notifier {
    sender: broadcast::Sender<PriceChangeNotice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PriceChangeNotice> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers the notice reached.
    pub fn notify(&self, notice: PriceChangeNotice) -> usize {
        match self.sender.send(notice) {
            Ok(n) => n,
            Err(_) => {
                tracing::trace!("price change notice dropped, no subscribers");
                0
            }
        }
    }
}
