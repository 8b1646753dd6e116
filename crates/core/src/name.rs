//! Composite names
//!
//! Entities are indexed by a (scope, local name) pair in addition to their
//! id. The scope holds the *id* of the owning workspace or namespace, not
//! its name, so renaming the scope never requires reindexing its children.
//! Kinds without a workspace or namespace notion use the global scope.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Composite (scope, local) name, unique per kind within its scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopedName {
    /// Owning workspace or namespace id, `None` for the global scope
    pub scope: Option<EntityId>,
    /// Name local to the scope
    pub local: String,
}

impl ScopedName {
    /// A name in the global scope
    pub fn global(local: impl Into<String>) -> Self {
        Self {
            scope: None,
            local: local.into(),
        }
    }

    /// A name scoped to the given owner id
    pub fn scoped(scope: EntityId, local: impl Into<String>) -> Self {
        Self {
            scope: Some(scope),
            local: local.into(),
        }
    }

    /// Whether this name lives in the global scope
    pub fn is_global(&self) -> bool {
        self.scope.is_none()
    }
}

// Ordering: global scope first, then by scope id, then by local name.
// Deterministic listings depend on this.
impl Ord for ScopedName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scope
            .cmp(&other.scope)
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for ScopedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ScopedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}:{}", scope, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}
