//! Kind-specific repositories
//!
//! Composition wrappers over [`EntityRepository`] that add the extra
//! index maintenance a kind needs: namespaces keep a URI secondary
//! index (one-to-many), layers are removed by name and follow their
//! resource's composite name.

use crate::repository::{Applied, EntityRepository, ErasedRepository};
use carta_core::entity::Entity;
use carta_core::{
    CatalogError, EntityId, EntityKind, LayerInfo, NamespaceInfo, ResourceInfo, Result,
    ScopedName,
};
use carta_patch::Patch;
use carta_query::Filter;
use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// Namespace repository with a URI secondary index
///
/// Several namespaces may share a URI, so the index is one-to-many.
pub struct NamespaceRepository {
    inner: EntityRepository<NamespaceInfo>,
    by_uri: DashMap<String, Vec<EntityId>>,
}

impl NamespaceRepository {
    /// An empty namespace repository
    pub fn new() -> Self {
        Self {
            inner: EntityRepository::new(EntityKind::Namespace, |ns: &NamespaceInfo| {
                ScopedName::global(ns.prefix.clone())
            }),
            by_uri: DashMap::new(),
        }
    }

    /// The wrapped generic repository
    pub fn inner(&self) -> &EntityRepository<NamespaceInfo> {
        &self.inner
    }

    /// Add a namespace and index its URI
    ///
    /// # Errors
    ///
    /// Propagates [`EntityRepository::add`] errors.
    pub fn add(&self, namespace: NamespaceInfo) -> Result<Arc<NamespaceInfo>> {
        let stored = self.inner.add(namespace)?;
        if let Some(id) = stored.id.clone() {
            self.index_uri(&stored.uri, id);
        }
        Ok(stored)
    }

    /// Remove a namespace and its URI entry
    ///
    /// # Errors
    ///
    /// Propagates [`EntityRepository::remove`] errors.
    pub fn remove(&self, namespace: &NamespaceInfo) -> Result<bool> {
        let removed = self.inner.remove(namespace)?;
        if removed {
            if let Some(id) = namespace.id.clone() {
                self.unindex_uri(&namespace.uri, &id);
            }
        }
        Ok(removed)
    }

    /// Patch a stored namespace, re-bucketing the URI index on change
    ///
    /// # Errors
    ///
    /// Propagates [`EntityRepository::update`] errors.
    pub fn update(&self, id: &EntityId, patch: &Patch) -> Result<Applied<NamespaceInfo>> {
        let applied = self.inner.update(id, EntityKind::Namespace, patch)?;
        if applied.before.uri != applied.after.uri {
            self.unindex_uri(&applied.before.uri, id);
            self.index_uri(&applied.after.uri, id.clone());
            debug!(
                old = %applied.before.uri,
                new = %applied.after.uri,
                "re-bucketed namespace under its new URI"
            );
        }
        Ok(applied)
    }

    /// Every namespace registered under the URI
    pub fn find_by_uri(&self, uri: &str) -> Vec<Arc<NamespaceInfo>> {
        let ids = match self.by_uri.get(uri) {
            Some(ids) => ids.clone(),
            None => return Vec::new(),
        };
        ids.iter()
            .filter_map(|id| self.inner.find_by_id(id, EntityKind::Namespace))
            .collect()
    }

    fn index_uri(&self, uri: &str, id: EntityId) {
        let mut ids = self.by_uri.entry(uri.to_string()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    fn unindex_uri(&self, uri: &str, id: &EntityId) {
        let mut emptied = false;
        if let Some(mut ids) = self.by_uri.get_mut(uri) {
            ids.retain(|x| x != id);
            emptied = ids.is_empty();
        }
        // Drop empty buckets so the index does not accumulate them.
        if emptied {
            self.by_uri.remove_if(uri, |_, ids| ids.is_empty());
        }
    }
}

impl Default for NamespaceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceRepository {
    /// Bulk-copy contents and the URI index into a same-typed
    /// destination
    pub fn sync_to(&self, dest: &NamespaceRepository) {
        if std::ptr::eq(self, dest) {
            return;
        }
        self.inner.sync_to(&dest.inner);
        for entry in self.by_uri.iter() {
            let mut bucket = dest.by_uri.entry(entry.key().clone()).or_default();
            for id in entry.value() {
                if !bucket.contains(id) {
                    bucket.push(id.clone());
                }
            }
        }
    }
}

impl ErasedRepository for NamespaceRepository {
    fn served_kind(&self) -> EntityKind {
        EntityKind::Namespace
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn count(&self, kind: EntityKind, filter: &Filter) -> usize {
        self.inner.count(kind, filter)
    }

    fn contains_id(&self, id: &EntityId, kind: EntityKind) -> bool {
        self.inner.find_by_id(id, kind).is_some()
    }

    fn ids(&self, kind: EntityKind) -> Vec<EntityId> {
        ErasedRepository::ids(&self.inner, kind)
    }

    fn get_erased(&self, id: &EntityId, kind: EntityKind) -> Option<Box<dyn Entity>> {
        self.inner
            .find_by_id(id, kind)
            .map(|stored| stored.clone_erased())
    }

    fn update_erased(&self, id: &EntityId, _kind: EntityKind, patch: &Patch) -> Result<()> {
        self.update(id, patch)?;
        Ok(())
    }

    fn add_erased(&self, entity: Box<dyn Entity>) -> Result<()> {
        if entity.is_change_recorder() {
            return Err(CatalogError::WrappedValueRejected);
        }
        let kind = entity.kind();
        let concrete = entity
            .as_any()
            .downcast_ref::<NamespaceInfo>()
            .cloned()
            .ok_or(CatalogError::UnknownKind(kind))?;
        self.add(concrete)?;
        Ok(())
    }

    fn remove_by_id(&self, id: &EntityId) -> Result<bool> {
        match self.inner.find_by_id(id, EntityKind::Namespace) {
            Some(stored) => self.remove(&stored),
            None => Ok(false),
        }
    }

    fn sync_into(&self, dest: &dyn ErasedRepository) -> Result<()> {
        if let Some(same) = dest.as_any().downcast_ref::<NamespaceRepository>() {
            self.sync_to(same);
            return Ok(());
        }
        for stored in self.inner.all() {
            dest.add_erased(stored.clone_erased())?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Layer repository
///
/// Layers are indexed under their resource's composite name; removal
/// identity is name-based, because a layer's own id may lag behind a
/// resource rename.
pub struct LayerRepository {
    inner: EntityRepository<LayerInfo>,
}

impl LayerRepository {
    /// An empty layer repository
    pub fn new() -> Self {
        Self {
            inner: EntityRepository::new(EntityKind::Layer, |layer: &LayerInfo| {
                layer.name.clone()
            }),
        }
    }

    /// The wrapped generic repository
    pub fn inner(&self) -> &EntityRepository<LayerInfo> {
        &self.inner
    }

    /// Add a layer
    ///
    /// # Errors
    ///
    /// Propagates [`EntityRepository::add`] errors.
    pub fn add(&self, layer: LayerInfo) -> Result<Arc<LayerInfo>> {
        self.inner.add(layer)
    }

    /// Remove a layer, name entry first
    ///
    /// # Errors
    ///
    /// `WrappedValueRejected` for change recorders.
    pub fn remove(&self, layer: &LayerInfo) -> Result<bool> {
        self.inner.remove_named(EntityKind::Layer, &layer.name)
    }

    /// Follow a resource rename: rewrite the dependent layer's mirrored
    /// name and relocate its name entry
    ///
    /// Returns the relocated layer, or `None` when the resource has no
    /// dependent layer.
    ///
    /// # Errors
    ///
    /// Propagates [`EntityRepository::update_with`] errors.
    pub fn relocate_for_resource(
        &self,
        resource: &ResourceInfo,
    ) -> Result<Option<Arc<LayerInfo>>> {
        let resource_id = match &resource.id {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        let layer = match self
            .inner
            .find_first(EntityKind::Layer, |l| l.resource == resource_id)
        {
            Some(layer) => layer,
            None => return Ok(None),
        };
        let new_name = ScopedName::scoped(resource.namespace.clone(), resource.name.clone());
        if layer.name == new_name {
            return Ok(Some(layer));
        }
        let layer_id = match &layer.id {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        let applied = self.inner.update_with(&layer_id, EntityKind::Layer, |l| {
            l.name = new_name;
            Ok(())
        })?;
        debug!(layer = %layer_id, "relocated layer name entry after resource rename");
        Ok(Some(applied.after))
    }
}

impl Default for LayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ErasedRepository for LayerRepository {
    fn served_kind(&self) -> EntityKind {
        EntityKind::Layer
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn count(&self, kind: EntityKind, filter: &Filter) -> usize {
        self.inner.count(kind, filter)
    }

    fn contains_id(&self, id: &EntityId, kind: EntityKind) -> bool {
        self.inner.find_by_id(id, kind).is_some()
    }

    fn ids(&self, kind: EntityKind) -> Vec<EntityId> {
        ErasedRepository::ids(&self.inner, kind)
    }

    fn get_erased(&self, id: &EntityId, kind: EntityKind) -> Option<Box<dyn Entity>> {
        self.inner
            .find_by_id(id, kind)
            .map(|stored| stored.clone_erased())
    }

    fn update_erased(&self, id: &EntityId, kind: EntityKind, patch: &Patch) -> Result<()> {
        self.inner.update(id, kind, patch)?;
        Ok(())
    }

    fn add_erased(&self, entity: Box<dyn Entity>) -> Result<()> {
        if entity.is_change_recorder() {
            return Err(CatalogError::WrappedValueRejected);
        }
        let kind = entity.kind();
        let concrete = entity
            .as_any()
            .downcast_ref::<LayerInfo>()
            .cloned()
            .ok_or(CatalogError::UnknownKind(kind))?;
        self.add(concrete)?;
        Ok(())
    }

    fn remove_by_id(&self, id: &EntityId) -> Result<bool> {
        // Layer removal identity is name-based even on the erased path.
        match self.inner.find_by_id(id, EntityKind::Layer) {
            Some(stored) => self.remove(&stored),
            None => Ok(false),
        }
    }

    fn sync_into(&self, dest: &dyn ErasedRepository) -> Result<()> {
        if let Some(same) = dest.as_any().downcast_ref::<LayerRepository>() {
            self.inner.sync_to(&same.inner);
            return Ok(());
        }
        for stored in self.inner.all() {
            dest.add_erased(stored.clone_erased())?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
