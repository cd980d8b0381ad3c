//! Storage boundary for the menu ledger.
//!
//! This crate models the durable store the ledger sits on: named tables of
//! rows with server-assigned ids. A table carries a [`TablePolicy`]; tables
//! declared [`TablePolicy::AppendOnly`] reject every UPDATE and DELETE at the
//! storage layer itself, the way a database trigger would, regardless of
//! which caller issues the statement.
//!
//! # Storage Backends
//!
//! All backends implement the [`RowStore`] trait:
//!
//! - [`InMemoryTable`] -- `BTreeMap`-based table for tests and embedding
//!
//! # Design Rules
//!
//! 1. Append-only tables are insert-only. UPDATE and DELETE fail with
//!    [`StoreError::ImmutabilityViolation`] and are logged on the
//!    `security` target.
//! 2. Row ids are allocated in insertion order and never reused.
//! 3. Unique constraints are checked atomically with the insert.
//! 4. An insert is visible to every subsequent read (no eventual consistency).
//! 5. All errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod policy;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryTable;
pub use policy::{Mutation, TablePolicy};
pub use traits::{RowId, RowStore};
