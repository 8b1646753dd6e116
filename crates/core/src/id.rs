//! Entity identifiers
//!
//! Ids are opaque strings, globally unique within their kind. Callers may
//! pre-set an id before adding an entity; missing ids are assigned by the
//! repository at add time using a kind-prefixed random suffix.

use crate::kind::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque entity identifier
///
/// Wraps the raw string so ids are not confused with names or other string
/// payloads. Generated ids look like `ws-1c9f...`; caller-provided ids are
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an existing id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id for an entity of the given kind
    ///
    /// The kind prefix keeps generated ids readable in logs; uniqueness
    /// comes from the UUID v4 suffix.
    pub fn generate(kind: EntityKind) -> Self {
        Self(format!("{}-{}", kind.id_prefix(), Uuid::new_v4()))
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
