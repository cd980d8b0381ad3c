//! Feature and permission gate for the menu ledger.
//!
//! Decides whether an organization may use a feature such as publishing a
//! menu snapshot. Organization-specific overrides take precedence over the
//! subscription plan's feature table, expired overrides are ignored, and
//! anything not configured is denied.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use menu_gate::{FeatureGate, FeatureKey, InMemoryOverrides, InMemoryPlanCatalog, PlanDefinitions};
//! use menu_types::OrganizationId;
//!
//! let plans = PlanDefinitions::from_toml_str(r#"
//!     [plans.pro]
//!     menu_publish = true
//!
//!     [subscriptions]
//!     cafe-moda = "pro"
//! "#).unwrap();
//! let gate = FeatureGate::standard(
//!     Arc::new(InMemoryOverrides::new()),
//!     Arc::new(InMemoryPlanCatalog::new(plans)),
//! );
//! let org = OrganizationId::new("cafe-moda").unwrap();
//! assert!(gate.is_allowed(&org, &FeatureKey::new("menu_publish").unwrap()));
//! ```

pub mod config;
pub mod error;
pub mod feature;
pub mod gate;
pub mod source;
pub mod sources;

// Re-exports for convenience.
pub use config::PlanDefinitions;
pub use error::GateError;
pub use feature::{FeatureKey, FeatureValue, Limit, PlanId};
pub use gate::{FeatureGate, GateDecision};
pub use source::{DecisionSource, FeatureSource};
pub use sources::{
    FeatureOverride, InMemoryOverrides, InMemoryPlanCatalog, OverrideLayer, OverrideStore,
    PlanCatalog, PlanLayer,
};
