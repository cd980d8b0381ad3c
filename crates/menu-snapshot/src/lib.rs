//! Menu snapshots for the menu ledger.
//!
//! A snapshot is an immutable, versioned, hashed capture of everything an
//! organization's QR menu showed at publish time. This crate provides:
//! - `SnapshotBuilder`: reference data + current prices -> canonical payload
//! - `SnapshotReader` / `SnapshotWriter` and `InMemorySnapshotStore`
//! - `IntegrityVerifier`: recomputes hashes and checks the version chain
//! - `ComplianceExporter`: audit-ready export documents

pub mod builder;
pub mod error;
pub mod export;
pub mod memory;
pub mod payload;
pub mod reference;
pub mod snapshot;
pub mod store;
pub mod verify;

#[cfg(test)]
mod testing;

pub use builder::SnapshotBuilder;
pub use error::{SnapshotError, SnapshotResult};
pub use export::{ComplianceExporter, ExportDocument};
pub use memory::{InMemorySnapshotStore, DEFAULT_HISTORY_LIMIT};
pub use payload::{CategoryEntry, ItemEntry, OrganizationEntry, PublishedPrice, SnapshotPayload, SCHEMA};
pub use reference::{InMemoryReferenceData, ReferenceDataReader, ReferenceError};
pub use snapshot::{MenuSnapshot, SnapshotDraft};
pub use store::{HistoryPage, SnapshotReader, SnapshotStore, SnapshotWriter};
pub use verify::{ChainReport, IntegrityVerifier, VerificationReport};
