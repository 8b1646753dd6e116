//! Per-entity visibility rule
//!
//! A workspace can be marked isolated; its contents are then visible
//! only to requests whose current scope addresses that workspace. The
//! rule is evaluated per entity by walking to the owning workspace:
//! stores carry it directly, resources go through their store, layers
//! through their resource's store; styles and layer groups carry an
//! optional workspace of their own. Workspaces and namespaces check
//! their own isolated flag.

use crate::scope::{is_sentinel, LocalScope};
use carta_core::entity::Entity;
use carta_core::property::{PropertyAccess, PropertyValue};
use carta_core::{EntityId, EntityKind};
use carta_engine::Catalog;

/// Whether the entity is visible to the given scope
///
/// - No active scope: always visible (batch/administrative bypass)
/// - Sentinel workspace markers: always visible
/// - Null-scoped or non-isolated-workspace entities: always visible
/// - Otherwise: visible only when the scope's workspace matches the
///   owning workspace
pub fn is_visible(catalog: &Catalog, scope: Option<&LocalScope>, entity: &dyn Entity) -> bool {
    let scope = match scope {
        Some(scope) => scope,
        None => return true,
    };
    match entity.kind() {
        EntityKind::Workspace => {
            !flag(entity, "isolated") || scope.workspace.as_deref_eq(entity.id())
        }
        EntityKind::Namespace => {
            !flag(entity, "isolated") || scope.namespace.as_deref_eq(entity.id())
        }
        EntityKind::DataStore | EntityKind::CoverageStore => {
            match ref_property(entity, "workspace") {
                Some(workspace) => workspace_visible(catalog, scope, &workspace),
                None => true,
            }
        }
        EntityKind::FeatureType | EntityKind::Coverage => {
            owner_via_store(catalog, entity.get_property("store"))
                .map_or(true, |workspace| workspace_visible(catalog, scope, &workspace))
        }
        EntityKind::Layer => {
            let store = ref_property(entity, "resource")
                .and_then(|resource| catalog.resource(&resource))
                .map(|resource| resource.store.clone());
            match store {
                Some(store) => owner_via_store(catalog, Some(PropertyValue::Ref(store)))
                    .map_or(true, |workspace| workspace_visible(catalog, scope, &workspace)),
                None => true,
            }
        }
        EntityKind::Style | EntityKind::LayerGroup => match ref_property(entity, "workspace") {
            // Null-scoped entities are visible to everyone.
            None => true,
            Some(workspace) => workspace_visible(catalog, scope, &workspace),
        },
        _ => true,
    }
}

fn flag(entity: &dyn Entity, property: &str) -> bool {
    entity
        .get_property(property)
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}

fn ref_property(entity: &dyn Entity, property: &str) -> Option<EntityId> {
    match entity.get_property(property) {
        Some(PropertyValue::Ref(id)) => Some(id),
        _ => None,
    }
}

fn owner_via_store(catalog: &Catalog, store: Option<PropertyValue>) -> Option<EntityId> {
    match store {
        Some(PropertyValue::Ref(store_id)) => {
            catalog.store(&store_id).map(|store| store.workspace.clone())
        }
        _ => None,
    }
}

fn workspace_visible(catalog: &Catalog, scope: &LocalScope, workspace: &EntityId) -> bool {
    if is_sentinel(workspace) {
        return true;
    }
    match catalog.workspace(workspace) {
        // Dangling owner: nothing to enforce against.
        None => true,
        Some(ws) => !ws.isolated || scope.workspace.as_ref() == Some(workspace),
    }
}

// Small comparison helper so Option<EntityId> matches Option<&EntityId>
// without cloning.
trait OptionIdExt {
    fn as_deref_eq(&self, other: Option<&EntityId>) -> bool;
}

impl OptionIdExt for Option<EntityId> {
    fn as_deref_eq(&self, other: Option<&EntityId>) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
