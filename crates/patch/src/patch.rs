//! Patches
//!
//! A patch is an ordered list of (property, target value) assignments —
//! intentionally simpler than a diff, because applying an update only
//! needs the target state. Patches serialize, so a storage backend can
//! ship them as-is.

use carta_core::property::{PropertyAccess, PropertyValue};
use carta_core::Result;
use serde::{Deserialize, Serialize};

/// Target-state assignment list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    assignments: Vec<(String, PropertyValue)>,
}

impl Patch {
    /// An empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style single assignment
    pub fn with(property: impl Into<String>, value: PropertyValue) -> Self {
        let mut patch = Self::new();
        patch.set(property, value);
        patch
    }

    /// Append an assignment
    ///
    /// Assignments apply in insertion order; a later assignment to the
    /// same property wins.
    pub fn set(&mut self, property: impl Into<String>, value: PropertyValue) -> &mut Self {
        self.assignments.push((property.into(), value));
        self
    }

    /// The assignments, in order
    pub fn assignments(&self) -> &[(String, PropertyValue)] {
        &self.assignments
    }

    /// The assigned property names, in order
    pub fn properties(&self) -> Vec<&str> {
        self.assignments.iter().map(|(p, _)| p.as_str()).collect()
    }

    /// Whether the patch assigns nothing
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Apply every assignment to the target, in order
    ///
    /// Scalar properties assign directly. Collection properties clear
    /// and extend the existing collection in place (a null target value
    /// clears it); maps clear-then-extend likewise. Those rules live in
    /// each entity's `set_property`, which this drives.
    ///
    /// # Errors
    ///
    /// `InvalidProperty` when an assignment names a property with no
    /// resolvable accessor on the target, `ImmutableCollection` when it
    /// names a read-only collection. Assignments preceding the failure
    /// remain applied.
    pub fn apply_to(&self, target: &mut dyn PropertyAccess) -> Result<()> {
        for (property, value) in &self.assignments {
            target.set_property(property, value.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carta_core::{CatalogError, EntityId, ResourceInfo, ResourceKind, WorkspaceInfo};

    #[test]
    fn test_apply_scalar_assignments_in_order() {
        let mut ws = WorkspaceInfo::new("geo");
        let mut patch = Patch::new();
        patch
            .set("name", PropertyValue::String("topo".to_string()))
            .set("isolated", PropertyValue::Bool(true))
            .set("name", PropertyValue::String("final".to_string()));
        patch.apply_to(&mut ws).unwrap();
        assert_eq!(ws.name, "final");
        assert!(ws.isolated);
    }

    #[test]
    fn test_apply_unknown_property_fails() {
        let mut ws = WorkspaceInfo::new("geo");
        let patch = Patch::with("bogus", PropertyValue::Int(1));
        let err = patch.apply_to(&mut ws).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidProperty(_)));
    }

    #[test]
    fn test_apply_collection_clears_then_extends() {
        let mut res = ResourceInfo::new(
            ResourceKind::FeatureType,
            "roads",
            EntityId::new("ns1"),
            EntityId::new("ds1"),
        );
        res.keywords = vec!["stale".to_string()];
        let patch = Patch::with(
            "keywords",
            PropertyValue::List(vec![PropertyValue::String("fresh".to_string())]),
        );
        patch.apply_to(&mut res).unwrap();
        assert_eq!(res.keywords, vec!["fresh".to_string()]);
    }

    #[test]
    fn test_apply_null_clears_collection() {
        let mut res = ResourceInfo::new(
            ResourceKind::FeatureType,
            "roads",
            EntityId::new("ns1"),
            EntityId::new("ds1"),
        );
        res.keywords = vec!["stale".to_string()];
        res.metadata.insert("k".to_string(), "v".to_string());
        Patch::with("keywords", PropertyValue::Null)
            .apply_to(&mut res)
            .unwrap();
        Patch::with("metadata", PropertyValue::Null)
            .apply_to(&mut res)
            .unwrap();
        assert!(res.keywords.is_empty());
        assert!(res.metadata.is_empty());
    }

    #[test]
    fn test_patch_serde_round_trip() {
        let patch = Patch::with("enabled", PropertyValue::Bool(false));
        let json = serde_json::to_string(&patch).unwrap();
        let back: Patch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, patch);
    }
}
