pub mod overrides;
pub mod plans;

pub use overrides::{FeatureOverride, InMemoryOverrides, OverrideLayer, OverrideStore};
pub use plans::{InMemoryPlanCatalog, PlanCatalog, PlanLayer};
