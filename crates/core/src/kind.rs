//! Entity kind tags and the narrowing relation
//!
//! The catalog stores a fixed, closed set of entity kinds. Kinds form a
//! shallow hierarchy: `Store` widens over `DataStore`/`CoverageStore`,
//! `Resource` over `FeatureType`/`Coverage`, and `Published` is the
//! query-only union of `Layer` and `LayerGroup`. Repositories bucket
//! entities by their *concrete* kind; lookups against a wider kind scan
//! every assignable bucket.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag for catalog entities
///
/// The set is closed: no kind outside this enum can be stored or queried.
/// `Store`, `Resource` and `Published` are widening tags only — stored
/// entities always carry one of the concrete kinds listed in
/// [`EntityKind::CONCRETE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Workspace (top-level grouping, isolation boundary)
    Workspace,
    /// Namespace (URI-qualified prefix, paired with a workspace by convention)
    Namespace,
    /// Any store (widens over `DataStore` and `CoverageStore`)
    Store,
    /// Vector data store
    DataStore,
    /// Raster data store
    CoverageStore,
    /// Any resource (widens over `FeatureType` and `Coverage`)
    Resource,
    /// Vector resource published from a data store
    FeatureType,
    /// Raster resource published from a coverage store
    Coverage,
    /// Layer (publishes exactly one resource)
    Layer,
    /// Ordered group of layers and nested groups
    LayerGroup,
    /// Style document
    Style,
    /// Map (ordered layer list)
    Map,
    /// Query-only union of `Layer` and `LayerGroup` — never stored
    Published,
}

impl EntityKind {
    /// Every kind that can actually be stored, in dependency order.
    pub const CONCRETE: [EntityKind; 10] = [
        EntityKind::Workspace,
        EntityKind::Namespace,
        EntityKind::DataStore,
        EntityKind::CoverageStore,
        EntityKind::FeatureType,
        EntityKind::Coverage,
        EntityKind::Layer,
        EntityKind::LayerGroup,
        EntityKind::Style,
        EntityKind::Map,
    ];

    /// Direct narrowings of this kind (empty for leaf kinds)
    pub fn narrower(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Store => &[EntityKind::DataStore, EntityKind::CoverageStore],
            EntityKind::Resource => &[EntityKind::FeatureType, EntityKind::Coverage],
            EntityKind::Published => &[EntityKind::Layer, EntityKind::LayerGroup],
            _ => &[],
        }
    }

    /// Whether a value of this kind can serve a request for `wider`
    ///
    /// Reflexive, and true when `self` is reachable through `wider`'s
    /// narrowing table.
    pub fn is_assignable_to(&self, wider: EntityKind) -> bool {
        *self == wider
            || wider
                .narrower()
                .iter()
                .any(|k| self.is_assignable_to(*k))
    }

    /// Whether entities of exactly this kind are stored
    pub fn is_concrete(&self) -> bool {
        !matches!(
            self,
            EntityKind::Store | EntityKind::Resource | EntityKind::Published
        )
    }

    /// Prefix used when generating an id for an entity of this kind
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Workspace => "ws",
            EntityKind::Namespace => "ns",
            EntityKind::Store => "store",
            EntityKind::DataStore => "ds",
            EntityKind::CoverageStore => "cs",
            EntityKind::Resource => "res",
            EntityKind::FeatureType => "ft",
            EntityKind::Coverage => "cov",
            EntityKind::Layer => "layer",
            EntityKind::LayerGroup => "lg",
            EntityKind::Style => "style",
            EntityKind::Map => "map",
            EntityKind::Published => "pub",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Workspace => "Workspace",
            EntityKind::Namespace => "Namespace",
            EntityKind::Store => "Store",
            EntityKind::DataStore => "DataStore",
            EntityKind::CoverageStore => "CoverageStore",
            EntityKind::Resource => "Resource",
            EntityKind::FeatureType => "FeatureType",
            EntityKind::Coverage => "Coverage",
            EntityKind::Layer => "Layer",
            EntityKind::LayerGroup => "LayerGroup",
            EntityKind::Style => "Style",
            EntityKind::Map => "Map",
            EntityKind::Published => "Published",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignability_is_reflexive() {
        for kind in EntityKind::CONCRETE {
            assert!(kind.is_assignable_to(kind));
        }
    }

    #[test]
    fn test_store_widens_over_both_store_kinds() {
        assert!(EntityKind::DataStore.is_assignable_to(EntityKind::Store));
        assert!(EntityKind::CoverageStore.is_assignable_to(EntityKind::Store));
        assert!(!EntityKind::Store.is_assignable_to(EntityKind::DataStore));
    }

    #[test]
    fn test_published_widens_over_layers_and_groups() {
        assert!(EntityKind::Layer.is_assignable_to(EntityKind::Published));
        assert!(EntityKind::LayerGroup.is_assignable_to(EntityKind::Published));
        assert!(!EntityKind::Style.is_assignable_to(EntityKind::Published));
    }

    #[test]
    fn test_unrelated_kinds_are_not_assignable() {
        assert!(!EntityKind::Workspace.is_assignable_to(EntityKind::Namespace));
        assert!(!EntityKind::DataStore.is_assignable_to(EntityKind::Resource));
    }

    #[test]
    fn test_concrete_kinds_have_no_narrowings() {
        for kind in EntityKind::CONCRETE {
            assert!(kind.narrower().is_empty());
            assert!(kind.is_concrete());
        }
    }

    #[test]
    fn test_widening_kinds_are_not_concrete() {
        assert!(!EntityKind::Store.is_concrete());
        assert!(!EntityKind::Resource.is_concrete());
        assert!(!EntityKind::Published.is_concrete());
    }
}
