use std::fmt;

use serde::{Deserialize, Serialize};

/// Mutation policy of a table, enforced by the storage layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TablePolicy {
    /// Rows may be inserted, updated and deleted.
    Mutable,
    /// Rows may only be inserted. UPDATE and DELETE are always rejected.
    AppendOnly,
}

impl TablePolicy {
    /// Whether the policy permits the given in-place mutation.
    pub fn permits(&self, _mutation: Mutation) -> bool {
        match self {
            Self::Mutable => true,
            Self::AppendOnly => false,
        }
    }
}

/// An in-place mutation statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    Update,
    Delete,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}
