//! Foundation types for the menu ledger.
//!
//! This crate provides the identifiers, monetary values, reference menu data
//! and clocks shared by every other ledger crate.
//!
//! # Key Types
//!
//! - [`OrganizationId`], [`ItemId`], [`CategoryId`], [`ActorId`]: validated,
//!   non-empty string identifiers owned by the surrounding application
//! - [`PriceFactId`]: server-assigned, insertion-ordered price fact id
//! - [`SnapshotId`]: UUID v7 snapshot identifier
//! - [`Money`] / [`Currency`]: positive decimal prices with currency precision
//! - [`MenuTree`]: point-in-time copy of an organization's categories and items
//! - [`Clock`] / [`MonotonicClock`]: time sources for record stamping

pub mod error;
pub mod identity;
pub mod menu;
pub mod money;
pub mod temporal;

pub use error::TypeError;
pub use identity::{ActorId, CategoryId, ItemId, OrganizationId, PriceFactId, SnapshotId};
pub use menu::{Category, MenuItem, MenuSection, MenuTree, Organization};
pub use money::{Currency, Money};
pub use temporal::{format_timestamp, Clock, ManualClock, MonotonicClock, SystemClock, Timestamp};
