//! Isolation wrapper over the catalog facade
//!
//! Composition, not subclassing: the wrapper holds the wrapped catalog
//! and a scope provider, and applies the visibility predicate at every
//! read entry point. Point lookups return `None` for hidden entities —
//! never an error — and streams silently omit them. Writes are not
//! filtered; they go to the wrapped catalog unchanged.

use crate::scope::{LocalScope, ScopeProvider};
use crate::visibility::is_visible;
use carta_core::entity::Entity;
use carta_core::{
    EntityId, EntityKind, LayerGroupInfo, LayerInfo, MapInfo, NamespaceInfo, PublishedInfo,
    ResourceInfo, Result, ScopedName, StoreInfo, StyleInfo, WorkspaceInfo,
};
use carta_engine::Catalog;
use carta_query::{EntityStream, Filter, Query};
use std::sync::Arc;

/// Visibility-filtered view of a [`Catalog`]
pub struct IsolatedCatalog {
    inner: Arc<Catalog>,
    scope: Arc<dyn ScopeProvider>,
}

impl IsolatedCatalog {
    /// Wrap a catalog with the given scope provider
    pub fn new(inner: Arc<Catalog>, scope: Arc<dyn ScopeProvider>) -> Self {
        Self { inner, scope }
    }

    /// The wrapped catalog
    ///
    /// Writes and administrative reads go here; nothing on the wrapped
    /// surface is filtered.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.inner
    }

    // Isolation can be switched off wholesale in the configuration;
    // the wrapper then behaves as a pass-through.
    fn active_scope(&self) -> Option<LocalScope> {
        if !self.inner.config().workspace_isolation {
            return None;
        }
        self.scope.current()
    }

    fn visible<T: Entity>(&self, entity: Arc<T>) -> Option<Arc<T>> {
        let scope = self.active_scope();
        if is_visible(&self.inner, scope.as_ref(), &*entity) {
            Some(entity)
        } else {
            None
        }
    }

    fn filter_arc_stream<T: Entity>(&self, stream: EntityStream<Arc<T>>) -> EntityStream<Arc<T>> {
        let scope = self.active_scope();
        let catalog = self.inner.clone();
        stream.filter_items(move |item| is_visible(&catalog, scope.as_ref(), &**item))
    }

    fn visibility_filter(&self, filter: &Filter) -> Filter {
        let scope = self.active_scope();
        let catalog = self.inner.clone();
        Filter::AllOf(vec![
            filter.clone(),
            Filter::predicate(move |entity| is_visible(&catalog, scope.as_ref(), entity)),
        ])
    }

    // -----------------------------------------------------------------
    // Point lookups
    // -----------------------------------------------------------------

    /// Workspace by id, if visible
    pub fn workspace(&self, id: &EntityId) -> Option<Arc<WorkspaceInfo>> {
        self.inner.workspace(id).and_then(|ws| self.visible(ws))
    }

    /// Workspace by name, if visible
    pub fn workspace_by_name(&self, name: &str) -> Option<Arc<WorkspaceInfo>> {
        self.inner
            .workspace_by_name(name)
            .and_then(|ws| self.visible(ws))
    }

    /// Namespace by id, if visible
    pub fn namespace(&self, id: &EntityId) -> Option<Arc<NamespaceInfo>> {
        self.inner.namespace(id).and_then(|ns| self.visible(ns))
    }

    /// Namespace by prefix, if visible
    pub fn namespace_by_prefix(&self, prefix: &str) -> Option<Arc<NamespaceInfo>> {
        self.inner
            .namespace_by_prefix(prefix)
            .and_then(|ns| self.visible(ns))
    }

    /// First visible namespace registered under the URI
    ///
    /// The current scope's own namespace wins over the global scan when
    /// its URI matches exactly.
    pub fn namespace_by_uri(&self, uri: &str) -> Option<Arc<NamespaceInfo>> {
        if let Some(scope) = self.active_scope() {
            if let Some(own) = scope.namespace.as_ref().and_then(|id| self.inner.namespace(id))
            {
                if own.uri == uri {
                    return Some(own);
                }
            }
        }
        let scope = self.active_scope();
        self.inner
            .namespaces_by_uri(uri)
            .into_iter()
            .find(|ns| is_visible(&self.inner, scope.as_ref(), &**ns))
    }

    /// Every visible namespace registered under the URI
    pub fn namespaces_by_uri(&self, uri: &str) -> Vec<Arc<NamespaceInfo>> {
        let scope = self.active_scope();
        self.inner
            .namespaces_by_uri(uri)
            .into_iter()
            .filter(|ns| is_visible(&self.inner, scope.as_ref(), &**ns))
            .collect()
    }

    /// Store by id, if visible
    pub fn store(&self, id: &EntityId) -> Option<Arc<StoreInfo>> {
        self.inner.store(id).and_then(|s| self.visible(s))
    }

    /// Store by workspace-scoped name, if visible
    pub fn store_by_name(&self, workspace: &EntityId, name: &str) -> Option<Arc<StoreInfo>> {
        self.inner
            .store_by_name(workspace, name)
            .and_then(|s| self.visible(s))
    }

    /// Resource by id, if visible
    pub fn resource(&self, id: &EntityId) -> Option<Arc<ResourceInfo>> {
        self.inner.resource(id).and_then(|r| self.visible(r))
    }

    /// Resource by composite name, if visible
    pub fn resource_by_name(&self, name: &ScopedName) -> Option<Arc<ResourceInfo>> {
        self.inner
            .resource_by_name(name)
            .and_then(|r| self.visible(r))
    }

    /// Layer by id, if visible
    pub fn layer(&self, id: &EntityId) -> Option<Arc<LayerInfo>> {
        self.inner.layer(id).and_then(|l| self.visible(l))
    }

    /// Layer by composite name, if visible
    pub fn layer_by_name(&self, name: &ScopedName) -> Option<Arc<LayerInfo>> {
        self.inner.layer_by_name(name).and_then(|l| self.visible(l))
    }

    /// Layer group by id, if visible
    pub fn layer_group(&self, id: &EntityId) -> Option<Arc<LayerGroupInfo>> {
        self.inner.layer_group(id).and_then(|g| self.visible(g))
    }

    /// Layer group by scope and name, if visible
    pub fn layer_group_by_name(
        &self,
        workspace: Option<&EntityId>,
        name: &str,
    ) -> Option<Arc<LayerGroupInfo>> {
        self.inner
            .layer_group_by_name(workspace, name)
            .and_then(|g| self.visible(g))
    }

    /// Style by id, if visible
    pub fn style(&self, id: &EntityId) -> Option<Arc<StyleInfo>> {
        self.inner.style(id).and_then(|s| self.visible(s))
    }

    /// Style by scope and name, if visible
    pub fn style_by_name(
        &self,
        workspace: Option<&EntityId>,
        name: &str,
    ) -> Option<Arc<StyleInfo>> {
        self.inner
            .style_by_name(workspace, name)
            .and_then(|s| self.visible(s))
    }

    /// Map by id, if visible
    pub fn map(&self, id: &EntityId) -> Option<Arc<MapInfo>> {
        self.inner.map(id).and_then(|m| self.visible(m))
    }

    // -----------------------------------------------------------------
    // Streams and counts
    // -----------------------------------------------------------------

    /// Query workspaces; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_workspaces(&self, query: &Query) -> Result<EntityStream<Arc<WorkspaceInfo>>> {
        Ok(self.filter_arc_stream(self.inner.query_workspaces(query)?))
    }

    /// Query namespaces; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_namespaces(&self, query: &Query) -> Result<EntityStream<Arc<NamespaceInfo>>> {
        Ok(self.filter_arc_stream(self.inner.query_namespaces(query)?))
    }

    /// Query stores; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_stores(&self, query: &Query) -> Result<EntityStream<Arc<StoreInfo>>> {
        Ok(self.filter_arc_stream(self.inner.query_stores(query)?))
    }

    /// Query resources; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_resources(&self, query: &Query) -> Result<EntityStream<Arc<ResourceInfo>>> {
        Ok(self.filter_arc_stream(self.inner.query_resources(query)?))
    }

    /// Query layers; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_layers(&self, query: &Query) -> Result<EntityStream<Arc<LayerInfo>>> {
        Ok(self.filter_arc_stream(self.inner.query_layers(query)?))
    }

    /// Query layer groups; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_layer_groups(
        &self,
        query: &Query,
    ) -> Result<EntityStream<Arc<LayerGroupInfo>>> {
        Ok(self.filter_arc_stream(self.inner.query_layer_groups(query)?))
    }

    /// Query styles; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_styles(&self, query: &Query) -> Result<EntityStream<Arc<StyleInfo>>> {
        Ok(self.filter_arc_stream(self.inner.query_styles(query)?))
    }

    /// Query maps; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_maps(&self, query: &Query) -> Result<EntityStream<Arc<MapInfo>>> {
        Ok(self.filter_arc_stream(self.inner.query_maps(query)?))
    }

    /// Query the `Published` union; hidden entities are silently omitted
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's query errors.
    pub fn query_published(&self, query: &Query) -> Result<EntityStream<PublishedInfo>> {
        let scope = self.active_scope();
        let catalog = self.inner.clone();
        Ok(self
            .inner
            .query_published(query)?
            .filter_items(move |published| is_visible(&catalog, scope.as_ref(), published)))
    }

    /// Count visible entities of a kind matching the filter
    ///
    /// # Errors
    ///
    /// Propagates the wrapped catalog's count errors.
    pub fn count(&self, kind: EntityKind, filter: &Filter) -> Result<usize> {
        self.inner.count(kind, &self.visibility_filter(filter))
    }
}
