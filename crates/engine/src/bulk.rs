//! Bulk load, export, and reference resolution
//!
//! A catalog exports to (and imports from) a plain serde document.
//! Imported entities may carry placeholder references — a raw id that
//! is not indexed yet, or a `name:<local>` token — so the import ends
//! with a resolve pass: once per relationship field, the resolver maps
//! the placeholder to a live id. Unresolved references are tolerated:
//! the placeholder stays in place and the pass reports it.

use crate::catalog::Catalog;
use carta_core::property::{
    properties, property_type, PropertyAccess, PropertyType, PropertyValue,
};
use carta_core::{
    CatalogError, EntityId, EntityKind, LayerGroupInfo, LayerInfo, MapInfo, NamespaceInfo,
    ResourceInfo, Result, StoreInfo, StyleInfo, WorkspaceInfo,
};
use carta_patch::Patch;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Full catalog content, in dependency order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogContents {
    /// Workspaces
    pub workspaces: Vec<WorkspaceInfo>,
    /// Namespaces
    pub namespaces: Vec<NamespaceInfo>,
    /// Styles
    pub styles: Vec<StyleInfo>,
    /// Stores
    pub stores: Vec<StoreInfo>,
    /// Resources
    pub resources: Vec<ResourceInfo>,
    /// Layers
    pub layers: Vec<LayerInfo>,
    /// Layer groups
    pub layer_groups: Vec<LayerGroupInfo>,
    /// Maps
    pub maps: Vec<MapInfo>,
}

/// A reference the resolve pass could not map to a live entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRef {
    /// Kind of the referencing entity
    pub kind: EntityKind,
    /// Id of the referencing entity
    pub entity: EntityId,
    /// Relationship property holding the placeholder
    pub property: String,
    /// The placeholder left in place
    pub token: EntityId,
}

/// Maps placeholder references to live entity ids
pub trait ReferenceResolver {
    /// Resolve one relationship field's placeholder
    ///
    /// Returns the live id, or `None` when the placeholder cannot be
    /// resolved (it is then left in place).
    fn resolve(&self, kind: EntityKind, property: &str, token: &EntityId) -> Option<EntityId>;
}

/// Default resolver: id passthrough, then `name:<local>` lookup
pub struct CatalogResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> CatalogResolver<'a> {
    /// A resolver over the given catalog
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }
}

impl ReferenceResolver for CatalogResolver<'_> {
    fn resolve(&self, kind: EntityKind, property: &str, token: &EntityId) -> Option<EntityId> {
        let target = match property_type(kind, property) {
            Some(PropertyType::Ref(target)) => target,
            _ => return None,
        };
        let handler = self.catalog.registry().get(target).ok()?;
        if handler.contains_id(token, target) {
            return Some(token.clone());
        }
        let local = token.as_str().strip_prefix("name:")?;
        self.catalog.find_id_by_local_name(target, local)
    }
}

impl Catalog {
    /// Snapshot the full catalog content
    pub fn export(&self) -> CatalogContents {
        CatalogContents {
            workspaces: self.workspaces.all().iter().map(|e| (**e).clone()).collect(),
            namespaces: self
                .namespaces
                .inner()
                .all()
                .iter()
                .map(|e| (**e).clone())
                .collect(),
            styles: self.styles.all().iter().map(|e| (**e).clone()).collect(),
            stores: self.stores.all().iter().map(|e| (**e).clone()).collect(),
            resources: self.resources.all().iter().map(|e| (**e).clone()).collect(),
            layers: self
                .layers
                .inner()
                .all()
                .iter()
                .map(|e| (**e).clone())
                .collect(),
            layer_groups: self
                .layer_groups
                .all()
                .iter()
                .map(|e| (**e).clone())
                .collect(),
            maps: self.maps.all().iter().map(|e| (**e).clone()).collect(),
        }
    }

    /// Serialize the full catalog content to JSON
    ///
    /// # Errors
    ///
    /// `Serialization` on encoding failure.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.export())
            .map_err(|e| CatalogError::Serialization(e.to_string()))
    }

    /// Load exported content, then resolve references
    ///
    /// Entities add in dependency order; the resolve pass runs with the
    /// default resolver and returns whatever stayed dangling.
    ///
    /// # Errors
    ///
    /// Propagates add errors; resolution itself never fails the import.
    pub fn import(&self, contents: CatalogContents) -> Result<Vec<DanglingRef>> {
        let CatalogContents {
            workspaces,
            namespaces,
            styles,
            stores,
            resources,
            layers,
            layer_groups,
            maps,
        } = contents;
        for workspace in workspaces {
            self.add_workspace(workspace)?;
        }
        for namespace in namespaces {
            self.add_namespace(namespace)?;
        }
        for style in styles {
            self.add_style(style)?;
        }
        for store in stores {
            self.add_store(store)?;
        }
        for resource in resources {
            self.add_resource(resource)?;
        }
        for layer in layers {
            self.add_layer(layer)?;
        }
        for group in layer_groups {
            self.add_layer_group(group)?;
        }
        for map in maps {
            self.add_map(map)?;
        }
        let resolver = CatalogResolver::new(self);
        self.resolve_references(&resolver)
    }

    /// Deserialize and load exported JSON content
    ///
    /// # Errors
    ///
    /// `Serialization` on decoding failure; add errors propagate.
    pub fn import_json(&self, json: &str) -> Result<Vec<DanglingRef>> {
        let contents: CatalogContents = serde_json::from_str(json)
            .map_err(|e| CatalogError::Serialization(e.to_string()))?;
        self.import(contents)
    }

    /// Run the resolve pass over every relationship field
    ///
    /// Each `Ref`-typed property of each stored entity goes through the
    /// resolver exactly once. A resolved placeholder is rewritten via
    /// the normal update path; an unresolved one is left in place and
    /// reported.
    ///
    /// # Errors
    ///
    /// Propagates update errors when rewriting a resolved placeholder.
    pub fn resolve_references(
        &self,
        resolver: &dyn ReferenceResolver,
    ) -> Result<Vec<DanglingRef>> {
        let mut dangling = Vec::new();
        for kind in EntityKind::CONCRETE {
            let ref_props: Vec<(&str, EntityKind)> = properties(kind)
                .iter()
                .filter_map(|descriptor| match descriptor.ty {
                    PropertyType::Ref(target) => Some((descriptor.name, target)),
                    _ => None,
                })
                .collect();
            if ref_props.is_empty() {
                continue;
            }
            let handler = self.registry().get(kind)?.clone();
            for id in handler.ids(kind) {
                let entity = match handler.get_erased(&id, kind) {
                    Some(entity) => entity,
                    None => continue,
                };
                for (property, target) in &ref_props {
                    let token = match entity.get_property(property) {
                        Some(PropertyValue::Ref(token)) => token,
                        _ => continue,
                    };
                    match resolver.resolve(kind, property, &token) {
                        Some(resolved) if resolved != token => {
                            self.update(
                                kind,
                                &id,
                                &Patch::with(*property, PropertyValue::Ref(resolved)),
                            )?;
                        }
                        Some(_) => {}
                        None => {
                            if !self
                                .registry()
                                .get(*target)
                                .map(|h| h.contains_id(&token, *target))
                                .unwrap_or(false)
                            {
                                warn!(
                                    %kind, entity = %id, property = %property, %token,
                                    "unresolved reference left in place"
                                );
                                dangling.push(DanglingRef {
                                    kind,
                                    entity: id.clone(),
                                    property: (*property).to_string(),
                                    token,
                                });
                            }
                        }
                    }
                }
            }
        }
        info!(dangling = dangling.len(), "reference resolve pass complete");
        Ok(dangling)
    }
}
