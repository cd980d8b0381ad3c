//! Append-only price ledger for the menu ledger.
//!
//! This crate is the source of truth for prices. It provides:
//! - `PriceFact` records that are never updated or deleted
//! - `PriceLedgerWriter` / `PriceLedgerReader` trait boundaries
//! - `InMemoryPriceLedger` implementation over an append-only table
//! - The current-price projection (latest fact per item by `(recorded_at, id)`)

pub mod error;
pub mod memory;
pub mod projection;
pub mod records;
pub mod traits;

pub use error::LedgerError;
pub use memory::InMemoryPriceLedger;
pub use projection::{CurrentPrice, CurrentPriceProjector};
pub use records::{PriceEntry, PriceFact, MAX_REASON_LEN};
pub use traits::{PriceLedger, PriceLedgerReader, PriceLedgerWriter};
