//! Catalog facade
//!
//! The composition root: one repository per concrete kind wired behind
//! a uniform CRUD + query surface, with a kind registry for the erased
//! dispatch paths (counts, sync, bulk operations). Updates route
//! through the diff/patch engine; queries over the `Published` union
//! route through the merge engine.
//!
//! The facade itself performs no visibility filtering — the isolation
//! wrapper composes over it.

use crate::config::CatalogConfig;
use crate::defaults::DefaultPointers;
use carta_core::entity::Entity;
use carta_core::property::{PropertyAccess, PropertyValue};
use carta_core::{
    CatalogError, EntityId, EntityKind, LayerGroupInfo, LayerInfo, MapInfo, NamespaceInfo,
    PublishedInfo, ResourceInfo, Result, ScopedName, StoreInfo, StyleInfo, WorkspaceInfo,
};
use carta_patch::{ChangeRecorder, Patch, PropertyDiff};
use carta_query::{query_union, EntityStream, Filter, MergeSide, Query, SortBy};
use carta_store::{
    EntityRepository, ErasedRepository, KindRegistry, LayerRepository, NamespaceRepository,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// In-memory metadata catalog
///
/// Thread-safe: shared behind an `Arc`, all operations take `&self`.
pub struct Catalog {
    pub(crate) config: CatalogConfig,
    pub(crate) workspaces: Arc<EntityRepository<WorkspaceInfo>>,
    pub(crate) namespaces: Arc<NamespaceRepository>,
    pub(crate) stores: Arc<EntityRepository<StoreInfo>>,
    pub(crate) resources: Arc<EntityRepository<ResourceInfo>>,
    pub(crate) layers: Arc<LayerRepository>,
    pub(crate) layer_groups: Arc<EntityRepository<LayerGroupInfo>>,
    pub(crate) styles: Arc<EntityRepository<StyleInfo>>,
    pub(crate) maps: Arc<EntityRepository<MapInfo>>,
    registry: KindRegistry<Arc<dyn ErasedRepository>>,
    pub(crate) defaults: DefaultPointers,
}

impl Catalog {
    /// A catalog with the default configuration
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    /// A catalog with the given configuration
    pub fn with_config(config: CatalogConfig) -> Self {
        let workspaces = Arc::new(EntityRepository::new(
            EntityKind::Workspace,
            |ws: &WorkspaceInfo| ScopedName::global(ws.name.clone()),
        ));
        let namespaces = Arc::new(NamespaceRepository::new());
        let stores = Arc::new(EntityRepository::new(EntityKind::Store, |s: &StoreInfo| {
            ScopedName::scoped(s.workspace.clone(), s.name.clone())
        }));
        let resources = Arc::new(EntityRepository::new(
            EntityKind::Resource,
            |r: &ResourceInfo| ScopedName::scoped(r.namespace.clone(), r.name.clone()),
        ));
        let layers = Arc::new(LayerRepository::new());
        let layer_groups = Arc::new(EntityRepository::new(
            EntityKind::LayerGroup,
            |g: &LayerGroupInfo| ScopedName {
                scope: g.workspace.clone(),
                local: g.name.clone(),
            },
        ));
        let styles = Arc::new(EntityRepository::new(EntityKind::Style, |s: &StyleInfo| {
            ScopedName {
                scope: s.workspace.clone(),
                local: s.name.clone(),
            }
        }));
        let maps = Arc::new(EntityRepository::new(EntityKind::Map, |m: &MapInfo| {
            ScopedName::global(m.name.clone())
        }));

        let mut registry: KindRegistry<Arc<dyn ErasedRepository>> = KindRegistry::new();
        registry.register(EntityKind::Workspace, workspaces.clone());
        registry.register(EntityKind::Namespace, namespaces.clone());
        registry.register_recursive(EntityKind::Store, stores.clone());
        registry.register_recursive(EntityKind::Resource, resources.clone());
        registry.register(EntityKind::Layer, layers.clone());
        registry.register(EntityKind::LayerGroup, layer_groups.clone());
        registry.register(EntityKind::Style, styles.clone());
        registry.register(EntityKind::Map, maps.clone());

        Self {
            config,
            workspaces,
            namespaces,
            stores,
            resources,
            layers,
            layer_groups,
            styles,
            maps,
            registry,
            defaults: DefaultPointers::new(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// The kind → repository dispatch table
    pub fn registry(&self) -> &KindRegistry<Arc<dyn ErasedRepository>> {
        &self.registry
    }

    fn stamp_created(&self, entity: &mut dyn Entity) -> Result<()> {
        if !self.config.stamp_modification_times {
            return Ok(());
        }
        if matches!(
            entity.get_property("date_created"),
            Some(PropertyValue::Null)
        ) {
            entity.set_property("date_created", PropertyValue::Timestamp(Utc::now()))?;
        }
        Ok(())
    }

    // A cleaned, empty diff means the save is a content no-op: skip the
    // repository update entirely so no index relocation runs.
    fn cleaned_patch(&self, diff: PropertyDiff) -> Option<Patch> {
        let diff = diff.clean();
        if diff.is_empty() {
            return None;
        }
        let mut patch = diff.to_patch();
        if self.config.stamp_modification_times {
            patch.set(
                "date_modified",
                PropertyValue::Timestamp(Utc::now()),
            );
        }
        Some(patch)
    }

    fn require_id(entity: &dyn Entity) -> Result<EntityId> {
        entity
            .id()
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("{} without id", entity.kind())))
    }

    // -----------------------------------------------------------------
    // Workspaces
    // -----------------------------------------------------------------

    /// Add a workspace
    ///
    /// # Errors
    ///
    /// Propagates repository add errors.
    pub fn add_workspace(&self, mut workspace: WorkspaceInfo) -> Result<Arc<WorkspaceInfo>> {
        self.stamp_created(&mut workspace)?;
        self.workspaces.add(workspace)
    }

    /// Workspace by id
    pub fn workspace(&self, id: &EntityId) -> Option<Arc<WorkspaceInfo>> {
        self.workspaces.find_by_id(id, EntityKind::Workspace)
    }

    /// Workspace by name
    pub fn workspace_by_name(&self, name: &str) -> Option<Arc<WorkspaceInfo>> {
        self.workspaces
            .find_by_name(&ScopedName::global(name), EntityKind::Workspace)
    }

    /// Remove a workspace, clearing default pointers that referenced it
    ///
    /// Dependent stores are NOT cascaded: they stay orphaned but
    /// id-findable.
    ///
    /// # Errors
    ///
    /// Propagates repository remove errors.
    pub fn remove_workspace(&self, workspace: &WorkspaceInfo) -> Result<bool> {
        let removed = self.workspaces.remove(workspace)?;
        if removed {
            if let Some(id) = &workspace.id {
                self.defaults.clear_workspace(id);
            }
        }
        Ok(removed)
    }

    /// Persist recorded changes to a workspace
    ///
    /// # Errors
    ///
    /// `NotFound` when the workspace is not stored; patch errors
    /// propagate.
    pub fn save_workspace(
        &self,
        recorder: &ChangeRecorder<WorkspaceInfo>,
    ) -> Result<Arc<WorkspaceInfo>> {
        let id = Self::require_id(recorder.current())?;
        match self.cleaned_patch(recorder.diff()) {
            None => self
                .workspace(&id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string())),
            Some(patch) => Ok(self
                .workspaces
                .update(&id, EntityKind::Workspace, &patch)?
                .after),
        }
    }

    /// Query workspaces
    ///
    /// # Errors
    ///
    /// Propagates query errors (e.g. `UnsupportedSort`).
    pub fn query_workspaces(&self, query: &Query) -> Result<EntityStream<Arc<WorkspaceInfo>>> {
        self.workspaces.query(query)
    }

    // -----------------------------------------------------------------
    // Namespaces
    // -----------------------------------------------------------------

    /// Add a namespace
    ///
    /// # Errors
    ///
    /// Propagates repository add errors.
    pub fn add_namespace(&self, mut namespace: NamespaceInfo) -> Result<Arc<NamespaceInfo>> {
        self.stamp_created(&mut namespace)?;
        self.namespaces.add(namespace)
    }

    /// Namespace by id
    pub fn namespace(&self, id: &EntityId) -> Option<Arc<NamespaceInfo>> {
        self.namespaces.inner().find_by_id(id, EntityKind::Namespace)
    }

    /// Namespace by prefix
    pub fn namespace_by_prefix(&self, prefix: &str) -> Option<Arc<NamespaceInfo>> {
        self.namespaces
            .inner()
            .find_by_name(&ScopedName::global(prefix), EntityKind::Namespace)
    }

    /// Every namespace registered under the URI
    pub fn namespaces_by_uri(&self, uri: &str) -> Vec<Arc<NamespaceInfo>> {
        self.namespaces.find_by_uri(uri)
    }

    /// Remove a namespace, clearing the default pointer if it referenced
    /// it
    ///
    /// # Errors
    ///
    /// Propagates repository remove errors.
    pub fn remove_namespace(&self, namespace: &NamespaceInfo) -> Result<bool> {
        let removed = self.namespaces.remove(namespace)?;
        if removed {
            if let Some(id) = &namespace.id {
                self.defaults.clear_namespace(id);
            }
        }
        Ok(removed)
    }

    /// Persist recorded changes to a namespace, re-bucketing the URI
    /// index on change
    ///
    /// # Errors
    ///
    /// `NotFound` when the namespace is not stored; patch errors
    /// propagate.
    pub fn save_namespace(
        &self,
        recorder: &ChangeRecorder<NamespaceInfo>,
    ) -> Result<Arc<NamespaceInfo>> {
        let id = Self::require_id(recorder.current())?;
        match self.cleaned_patch(recorder.diff()) {
            None => self
                .namespace(&id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string())),
            Some(patch) => Ok(self.namespaces.update(&id, &patch)?.after),
        }
    }

    /// Query namespaces
    ///
    /// # Errors
    ///
    /// Propagates query errors.
    pub fn query_namespaces(&self, query: &Query) -> Result<EntityStream<Arc<NamespaceInfo>>> {
        self.namespaces.inner().query(query)
    }

    // -----------------------------------------------------------------
    // Stores
    // -----------------------------------------------------------------

    /// Add a store
    ///
    /// # Errors
    ///
    /// Propagates repository add errors.
    pub fn add_store(&self, mut store: StoreInfo) -> Result<Arc<StoreInfo>> {
        self.stamp_created(&mut store)?;
        self.stores.add(store)
    }

    /// Store by id (any store flavor)
    pub fn store(&self, id: &EntityId) -> Option<Arc<StoreInfo>> {
        self.stores.find_by_id(id, EntityKind::Store)
    }

    /// Store by name within a workspace
    pub fn store_by_name(&self, workspace: &EntityId, name: &str) -> Option<Arc<StoreInfo>> {
        self.stores.find_by_name(
            &ScopedName::scoped(workspace.clone(), name),
            EntityKind::Store,
        )
    }

    /// Every store owned by the workspace
    pub fn stores_by_workspace(&self, workspace: &EntityId) -> Vec<Arc<StoreInfo>> {
        self.stores
            .list(EntityKind::Store, &Filter::All)
            .into_iter()
            .filter(|s| s.workspace == *workspace)
            .collect()
    }

    /// Remove a store, clearing the per-workspace default pointer if it
    /// referenced it
    ///
    /// # Errors
    ///
    /// Propagates repository remove errors.
    pub fn remove_store(&self, store: &StoreInfo) -> Result<bool> {
        let removed = self.stores.remove(store)?;
        if removed {
            if let Some(id) = &store.id {
                self.defaults.clear_store(id);
            }
        }
        Ok(removed)
    }

    /// Persist recorded changes to a store
    ///
    /// # Errors
    ///
    /// `NotFound` when the store is not stored; patch errors propagate.
    pub fn save_store(&self, recorder: &ChangeRecorder<StoreInfo>) -> Result<Arc<StoreInfo>> {
        let id = Self::require_id(recorder.current())?;
        match self.cleaned_patch(recorder.diff()) {
            None => self
                .store(&id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string())),
            Some(patch) => Ok(self.stores.update(&id, EntityKind::Store, &patch)?.after),
        }
    }

    /// Query stores (use a widening or concrete store kind)
    ///
    /// # Errors
    ///
    /// Propagates query errors.
    pub fn query_stores(&self, query: &Query) -> Result<EntityStream<Arc<StoreInfo>>> {
        self.stores.query(query)
    }

    // -----------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------

    /// Add a resource
    ///
    /// # Errors
    ///
    /// Propagates repository add errors.
    pub fn add_resource(&self, mut resource: ResourceInfo) -> Result<Arc<ResourceInfo>> {
        self.stamp_created(&mut resource)?;
        self.resources.add(resource)
    }

    /// Resource by id (any resource flavor)
    pub fn resource(&self, id: &EntityId) -> Option<Arc<ResourceInfo>> {
        self.resources.find_by_id(id, EntityKind::Resource)
    }

    /// Resource by composite name
    pub fn resource_by_name(&self, name: &ScopedName) -> Option<Arc<ResourceInfo>> {
        self.resources.find_by_name(name, EntityKind::Resource)
    }

    /// Every resource published from the store
    pub fn resources_by_store(&self, store: &EntityId) -> Vec<Arc<ResourceInfo>> {
        self.resources
            .list(EntityKind::Resource, &Filter::All)
            .into_iter()
            .filter(|r| r.store == *store)
            .collect()
    }

    /// Every resource in the namespace
    pub fn resources_by_namespace(&self, namespace: &EntityId) -> Vec<Arc<ResourceInfo>> {
        self.resources
            .list(EntityKind::Resource, &Filter::All)
            .into_iter()
            .filter(|r| r.namespace == *namespace)
            .collect()
    }

    /// Remove a resource
    ///
    /// # Errors
    ///
    /// Propagates repository remove errors.
    pub fn remove_resource(&self, resource: &ResourceInfo) -> Result<bool> {
        self.resources.remove(resource)
    }

    /// Persist recorded changes to a resource
    ///
    /// A rename atomically relocates the dependent layer's name entry.
    ///
    /// # Errors
    ///
    /// `NotFound` when the resource is not stored; patch errors
    /// propagate.
    pub fn save_resource(
        &self,
        recorder: &ChangeRecorder<ResourceInfo>,
    ) -> Result<Arc<ResourceInfo>> {
        let id = Self::require_id(recorder.current())?;
        match self.cleaned_patch(recorder.diff()) {
            None => self
                .resource(&id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string())),
            Some(patch) => {
                let applied = self.resources.update(&id, EntityKind::Resource, &patch)?;
                self.layers.relocate_for_resource(&applied.after)?;
                Ok(applied.after)
            }
        }
    }

    /// Query resources (use a widening or concrete resource kind)
    ///
    /// # Errors
    ///
    /// Propagates query errors.
    pub fn query_resources(&self, query: &Query) -> Result<EntityStream<Arc<ResourceInfo>>> {
        self.resources.query(query)
    }

    // -----------------------------------------------------------------
    // Layers
    // -----------------------------------------------------------------

    /// Add a layer
    ///
    /// The layer's composite name is recomputed from its resource when
    /// the resource is already stored, keeping the derived-name
    /// invariant even for hand-built layers.
    ///
    /// # Errors
    ///
    /// Propagates repository add errors.
    pub fn add_layer(&self, mut layer: LayerInfo) -> Result<Arc<LayerInfo>> {
        if let Some(resource) = self.resource(&layer.resource) {
            layer.name = ScopedName::scoped(resource.namespace.clone(), resource.name.clone());
        }
        self.stamp_created(&mut layer)?;
        self.layers.add(layer)
    }

    /// Layer by id
    pub fn layer(&self, id: &EntityId) -> Option<Arc<LayerInfo>> {
        self.layers.inner().find_by_id(id, EntityKind::Layer)
    }

    /// Layer by composite name
    pub fn layer_by_name(&self, name: &ScopedName) -> Option<Arc<LayerInfo>> {
        self.layers.inner().find_by_name(name, EntityKind::Layer)
    }

    /// Every layer publishing the resource
    pub fn layers_by_resource(&self, resource: &EntityId) -> Vec<Arc<LayerInfo>> {
        self.layers
            .inner()
            .list(EntityKind::Layer, &Filter::All)
            .into_iter()
            .filter(|l| l.resource == *resource)
            .collect()
    }

    /// Every layer referencing the style (default or additional)
    pub fn layers_by_style(&self, style: &EntityId) -> Vec<Arc<LayerInfo>> {
        self.layers
            .inner()
            .list(EntityKind::Layer, &Filter::All)
            .into_iter()
            .filter(|l| l.default_style.as_ref() == Some(style) || l.styles.contains(style))
            .collect()
    }

    /// Remove a layer (name-based identity)
    ///
    /// # Errors
    ///
    /// Propagates repository remove errors.
    pub fn remove_layer(&self, layer: &LayerInfo) -> Result<bool> {
        self.layers.remove(layer)
    }

    /// Persist recorded changes to a layer
    ///
    /// # Errors
    ///
    /// `NotFound` when the layer is not stored; patch errors propagate.
    pub fn save_layer(&self, recorder: &ChangeRecorder<LayerInfo>) -> Result<Arc<LayerInfo>> {
        let id = Self::require_id(recorder.current())?;
        match self.cleaned_patch(recorder.diff()) {
            None => self
                .layer(&id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string())),
            Some(patch) => Ok(self
                .layers
                .inner()
                .update(&id, EntityKind::Layer, &patch)?
                .after),
        }
    }

    /// Query layers
    ///
    /// # Errors
    ///
    /// Propagates query errors.
    pub fn query_layers(&self, query: &Query) -> Result<EntityStream<Arc<LayerInfo>>> {
        self.layers.inner().query(query)
    }

    // -----------------------------------------------------------------
    // Layer groups
    // -----------------------------------------------------------------

    /// Add a layer group
    ///
    /// # Errors
    ///
    /// Propagates repository add errors.
    pub fn add_layer_group(&self, mut group: LayerGroupInfo) -> Result<Arc<LayerGroupInfo>> {
        self.stamp_created(&mut group)?;
        self.layer_groups.add(group)
    }

    /// Layer group by id
    pub fn layer_group(&self, id: &EntityId) -> Option<Arc<LayerGroupInfo>> {
        self.layer_groups.find_by_id(id, EntityKind::LayerGroup)
    }

    /// Layer group by scope and name
    pub fn layer_group_by_name(
        &self,
        workspace: Option<&EntityId>,
        name: &str,
    ) -> Option<Arc<LayerGroupInfo>> {
        let scoped = ScopedName {
            scope: workspace.cloned(),
            local: name.to_string(),
        };
        self.layer_groups.find_by_name(&scoped, EntityKind::LayerGroup)
    }

    /// Every layer group scoped to the workspace
    pub fn layer_groups_by_workspace(&self, workspace: &EntityId) -> Vec<Arc<LayerGroupInfo>> {
        self.layer_groups
            .list(EntityKind::LayerGroup, &Filter::All)
            .into_iter()
            .filter(|g| g.workspace.as_ref() == Some(workspace))
            .collect()
    }

    /// Remove a layer group
    ///
    /// # Errors
    ///
    /// Propagates repository remove errors.
    pub fn remove_layer_group(&self, group: &LayerGroupInfo) -> Result<bool> {
        self.layer_groups.remove(group)
    }

    /// Persist recorded changes to a layer group
    ///
    /// # Errors
    ///
    /// `NotFound` when the group is not stored; patch errors propagate.
    pub fn save_layer_group(
        &self,
        recorder: &ChangeRecorder<LayerGroupInfo>,
    ) -> Result<Arc<LayerGroupInfo>> {
        let id = Self::require_id(recorder.current())?;
        match self.cleaned_patch(recorder.diff()) {
            None => self
                .layer_group(&id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string())),
            Some(patch) => Ok(self
                .layer_groups
                .update(&id, EntityKind::LayerGroup, &patch)?
                .after),
        }
    }

    /// Query layer groups
    ///
    /// # Errors
    ///
    /// Propagates query errors.
    pub fn query_layer_groups(
        &self,
        query: &Query,
    ) -> Result<EntityStream<Arc<LayerGroupInfo>>> {
        self.layer_groups.query(query)
    }

    // -----------------------------------------------------------------
    // Styles
    // -----------------------------------------------------------------

    /// Add a style
    ///
    /// # Errors
    ///
    /// Propagates repository add errors.
    pub fn add_style(&self, mut style: StyleInfo) -> Result<Arc<StyleInfo>> {
        self.stamp_created(&mut style)?;
        self.styles.add(style)
    }

    /// Style by id
    pub fn style(&self, id: &EntityId) -> Option<Arc<StyleInfo>> {
        self.styles.find_by_id(id, EntityKind::Style)
    }

    /// Style by scope and name
    pub fn style_by_name(
        &self,
        workspace: Option<&EntityId>,
        name: &str,
    ) -> Option<Arc<StyleInfo>> {
        let scoped = ScopedName {
            scope: workspace.cloned(),
            local: name.to_string(),
        };
        self.styles.find_by_name(&scoped, EntityKind::Style)
    }

    /// Every style scoped to the workspace
    pub fn styles_by_workspace(&self, workspace: &EntityId) -> Vec<Arc<StyleInfo>> {
        self.styles
            .list(EntityKind::Style, &Filter::All)
            .into_iter()
            .filter(|s| s.workspace.as_ref() == Some(workspace))
            .collect()
    }

    /// Remove a style
    ///
    /// # Errors
    ///
    /// Propagates repository remove errors.
    pub fn remove_style(&self, style: &StyleInfo) -> Result<bool> {
        self.styles.remove(style)
    }

    /// Persist recorded changes to a style
    ///
    /// # Errors
    ///
    /// `NotFound` when the style is not stored; patch errors propagate.
    pub fn save_style(&self, recorder: &ChangeRecorder<StyleInfo>) -> Result<Arc<StyleInfo>> {
        let id = Self::require_id(recorder.current())?;
        match self.cleaned_patch(recorder.diff()) {
            None => self
                .style(&id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string())),
            Some(patch) => Ok(self.styles.update(&id, EntityKind::Style, &patch)?.after),
        }
    }

    /// Query styles
    ///
    /// # Errors
    ///
    /// Propagates query errors.
    pub fn query_styles(&self, query: &Query) -> Result<EntityStream<Arc<StyleInfo>>> {
        self.styles.query(query)
    }

    // -----------------------------------------------------------------
    // Maps
    // -----------------------------------------------------------------

    /// Add a map
    ///
    /// # Errors
    ///
    /// Propagates repository add errors.
    pub fn add_map(&self, mut map: MapInfo) -> Result<Arc<MapInfo>> {
        self.stamp_created(&mut map)?;
        self.maps.add(map)
    }

    /// Map by id
    pub fn map(&self, id: &EntityId) -> Option<Arc<MapInfo>> {
        self.maps.find_by_id(id, EntityKind::Map)
    }

    /// Map by name
    pub fn map_by_name(&self, name: &str) -> Option<Arc<MapInfo>> {
        self.maps
            .find_by_name(&ScopedName::global(name), EntityKind::Map)
    }

    /// Remove a map
    ///
    /// # Errors
    ///
    /// Propagates repository remove errors.
    pub fn remove_map(&self, map: &MapInfo) -> Result<bool> {
        self.maps.remove(map)
    }

    /// Persist recorded changes to a map
    ///
    /// # Errors
    ///
    /// `NotFound` when the map is not stored; patch errors propagate.
    pub fn save_map(&self, recorder: &ChangeRecorder<MapInfo>) -> Result<Arc<MapInfo>> {
        let id = Self::require_id(recorder.current())?;
        match self.cleaned_patch(recorder.diff()) {
            None => self
                .map(&id)
                .ok_or_else(|| CatalogError::NotFound(id.to_string())),
            Some(patch) => Ok(self.maps.update(&id, EntityKind::Map, &patch)?.after),
        }
    }

    /// Query maps
    ///
    /// # Errors
    ///
    /// Propagates query errors.
    pub fn query_maps(&self, query: &Query) -> Result<EntityStream<Arc<MapInfo>>> {
        self.maps.query(query)
    }

    // -----------------------------------------------------------------
    // Cross-kind surface
    // -----------------------------------------------------------------

    /// Apply a patch to the stored entity of the given kind and id
    ///
    /// Kind-specific index maintenance runs as part of the update:
    /// resource renames relocate the dependent layer's name entry,
    /// namespace URI changes re-bucket the URI index.
    ///
    /// # Errors
    ///
    /// `NotFound` for an absent id, `UnknownKind` for the `Published`
    /// union (it is not a stored kind); patch errors propagate.
    pub fn update(&self, kind: EntityKind, id: &EntityId, patch: &Patch) -> Result<()> {
        let effective = if self.config.stamp_modification_times && !patch.is_empty() {
            let mut stamped = patch.clone();
            stamped.set(
                "date_modified",
                PropertyValue::Timestamp(Utc::now()),
            );
            stamped
        } else {
            patch.clone()
        };
        match kind {
            EntityKind::Workspace => {
                self.workspaces.update(id, kind, &effective)?;
            }
            EntityKind::Namespace => {
                self.namespaces.update(id, &effective)?;
            }
            EntityKind::Store | EntityKind::DataStore | EntityKind::CoverageStore => {
                self.stores.update(id, kind, &effective)?;
            }
            EntityKind::Resource | EntityKind::FeatureType | EntityKind::Coverage => {
                let applied = self.resources.update(id, kind, &effective)?;
                self.layers.relocate_for_resource(&applied.after)?;
            }
            EntityKind::Layer => {
                self.layers.inner().update(id, kind, &effective)?;
            }
            EntityKind::LayerGroup => {
                self.layer_groups.update(id, kind, &effective)?;
            }
            EntityKind::Style => {
                self.styles.update(id, kind, &effective)?;
            }
            EntityKind::Map => {
                self.maps.update(id, kind, &effective)?;
            }
            EntityKind::Published => {
                return Err(CatalogError::UnknownKind(EntityKind::Published));
            }
        }
        Ok(())
    }

    /// Count entities of a kind matching the filter
    ///
    /// # Errors
    ///
    /// `UnknownKind` for kinds without a registered repository.
    pub fn count(&self, kind: EntityKind, filter: &Filter) -> Result<usize> {
        if kind == EntityKind::Published {
            // Kind-membership arms select their own side; anything else
            // applies to both members unchanged.
            return Ok(self.layers.inner().count(EntityKind::Layer, filter)
                + self.layer_groups.count(EntityKind::LayerGroup, filter));
        }
        Ok(self.registry.get(kind)?.count(kind, filter))
    }

    /// Whether queries against `kind` may sort by the property path
    pub fn can_sort_by(&self, kind: EntityKind, path: &str) -> bool {
        carta_core::can_sort_by(kind, path)
    }

    // Lookup used by the default reference resolver for `name:<local>`
    // placeholder tokens.
    pub(crate) fn find_id_by_local_name(
        &self,
        kind: EntityKind,
        local: &str,
    ) -> Option<EntityId> {
        match kind {
            EntityKind::Workspace => self.workspace_by_name(local).and_then(|w| w.id.clone()),
            EntityKind::Namespace => {
                self.namespace_by_prefix(local).and_then(|n| n.id.clone())
            }
            EntityKind::Store | EntityKind::DataStore | EntityKind::CoverageStore => self
                .stores
                .find_first(kind, |s| s.name == local)
                .and_then(|s| s.id.clone()),
            EntityKind::Resource | EntityKind::FeatureType | EntityKind::Coverage => self
                .resources
                .find_first(kind, |r| r.name == local)
                .and_then(|r| r.id.clone()),
            EntityKind::Layer => self
                .layers
                .inner()
                .find_first(EntityKind::Layer, |l| l.name.local == local)
                .and_then(|l| l.id.clone()),
            EntityKind::LayerGroup => self
                .layer_groups
                .find_first(EntityKind::LayerGroup, |g| g.name == local)
                .and_then(|g| g.id.clone()),
            EntityKind::Style => self
                .styles
                .find_first(EntityKind::Style, |s| s.name == local)
                .and_then(|s| s.id.clone()),
            EntityKind::Map => self.map_by_name(local).and_then(|m| m.id.clone()),
            EntityKind::Published => None,
        }
    }

    /// Query the `Published` union of layers and layer groups
    ///
    /// # Errors
    ///
    /// Propagates sub-query errors.
    pub fn query_published(&self, query: &Query) -> Result<EntityStream<PublishedInfo>> {
        let layer_side = LayerSide {
            repo: self.layers.inner(),
        };
        let group_side = GroupSide {
            repo: &self.layer_groups,
        };
        query_union(&layer_side, &group_side, query)
    }

    /// Copy the entire catalog content into another catalog
    ///
    /// Typed repositories bulk-copy their indices; default pointers are
    /// carried over.
    pub fn sync_to(&self, other: &Catalog) {
        self.workspaces.sync_to(&other.workspaces);
        self.namespaces.sync_to(&other.namespaces);
        self.stores.sync_to(&other.stores);
        self.resources.sync_to(&other.resources);
        self.layers.inner().sync_to(other.layers.inner());
        self.layer_groups.sync_to(&other.layer_groups);
        self.styles.sync_to(&other.styles);
        self.maps.sync_to(&other.maps);
        self.defaults.copy_into(&other.defaults);
        info!("synced catalog contents into destination catalog");
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

// Merge-side adapters over the two Published member repositories.

struct LayerSide<'a> {
    repo: &'a EntityRepository<LayerInfo>,
}

impl MergeSide<PublishedInfo> for LayerSide<'_> {
    fn member_kind(&self) -> EntityKind {
        EntityKind::Layer
    }

    fn count(&self, filter: &Filter) -> usize {
        self.repo.count(EntityKind::Layer, filter)
    }

    fn query(
        &self,
        filter: &Filter,
        sort: &[SortBy],
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Result<EntityStream<PublishedInfo>> {
        let query = Query {
            kind: EntityKind::Layer,
            filter: filter.clone(),
            sort: sort.to_vec(),
            offset,
            limit,
        };
        Ok(self
            .repo
            .query(&query)?
            .map_items(|layer| PublishedInfo::Layer((*layer).clone())))
    }
}

struct GroupSide<'a> {
    repo: &'a EntityRepository<LayerGroupInfo>,
}

impl MergeSide<PublishedInfo> for GroupSide<'_> {
    fn member_kind(&self) -> EntityKind {
        EntityKind::LayerGroup
    }

    fn count(&self, filter: &Filter) -> usize {
        self.repo.count(EntityKind::LayerGroup, filter)
    }

    fn query(
        &self,
        filter: &Filter,
        sort: &[SortBy],
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Result<EntityStream<PublishedInfo>> {
        let query = Query {
            kind: EntityKind::LayerGroup,
            filter: filter.clone(),
            sort: sort.to_vec(),
            offset,
            limit,
        };
        Ok(self
            .repo
            .query(&query)?
            .map_items(|group| PublishedInfo::Group((*group).clone())))
    }
}
