//! Menu ledger service.
//!
//! Ties the price ledger, snapshot store, and feature gate together behind
//! the three operations the surrounding application uses:
//! - [`MenuLedger::record_price_change`]
//! - [`MenuLedger::publish`]
//! - [`MenuLedger::get_snapshot`]
//!
//! plus configuration, a periodic integrity sweep, and price-change
//! notifications.

pub mod actors;
pub mod config;
pub mod error;
pub mod memory;
pub mod notify;
pub mod query;
pub mod service;
pub mod sweep;

pub use actors::{ActorDirectory, InMemoryActorDirectory, Role};
pub use config::{LedgerConfig, NotificationConfig, SweepConfig};
pub use error::{MenuError, MenuResult};
pub use memory::InMemoryDeployment;
pub use notify::{Notifier, PriceChangeNotice};
pub use query::{HistoryRequest, PublishReceipt, SnapshotQuery, SnapshotTarget, SnapshotView};
pub use service::{Collaborators, MenuLedger};
pub use sweep::{spawn_sweep, IntegrityAlert, IntegrityAlertSink, LogAlertSink, SweepSummary, Sweeper};

#[cfg(test)]
mod scenarios;
