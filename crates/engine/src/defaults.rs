//! Default pointers
//!
//! At most one default workspace, one default namespace, and one
//! default store per workspace. Pointers are explicit optional-returning
//! accessors backed by the catalog's own storage — no ambient statics —
//! and are validated against existence at set time.

use crate::catalog::Catalog;
use carta_core::{CatalogError, EntityId, Result, StoreInfo, WorkspaceInfo, NamespaceInfo};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Storage for the default pointers
pub(crate) struct DefaultPointers {
    workspace: RwLock<Option<EntityId>>,
    namespace: RwLock<Option<EntityId>>,
    store_by_workspace: DashMap<EntityId, EntityId>,
}

impl DefaultPointers {
    pub(crate) fn new() -> Self {
        Self {
            workspace: RwLock::new(None),
            namespace: RwLock::new(None),
            store_by_workspace: DashMap::new(),
        }
    }

    pub(crate) fn clear_workspace(&self, id: &EntityId) {
        let mut current = self.workspace.write();
        if current.as_ref() == Some(id) {
            *current = None;
        }
        self.store_by_workspace.remove(id);
    }

    pub(crate) fn clear_namespace(&self, id: &EntityId) {
        let mut current = self.namespace.write();
        if current.as_ref() == Some(id) {
            *current = None;
        }
    }

    pub(crate) fn clear_store(&self, id: &EntityId) {
        self.store_by_workspace.retain(|_, store| store != id);
    }

    pub(crate) fn copy_into(&self, other: &DefaultPointers) {
        *other.workspace.write() = self.workspace.read().clone();
        *other.namespace.write() = self.namespace.read().clone();
        for entry in self.store_by_workspace.iter() {
            other
                .store_by_workspace
                .insert(entry.key().clone(), entry.value().clone());
        }
    }
}

impl Catalog {
    /// Set (or clear) the default workspace
    ///
    /// # Errors
    ///
    /// `NotFound` when the workspace is not stored.
    pub fn set_default_workspace(&self, workspace: Option<&WorkspaceInfo>) -> Result<()> {
        match workspace {
            None => {
                *self.defaults.workspace.write() = None;
                Ok(())
            }
            Some(ws) => {
                let id = ws
                    .id
                    .clone()
                    .ok_or_else(|| CatalogError::NotFound("workspace without id".to_string()))?;
                if self.workspace(&id).is_none() {
                    return Err(CatalogError::NotFound(id.to_string()));
                }
                *self.defaults.workspace.write() = Some(id);
                Ok(())
            }
        }
    }

    /// The default workspace, if one is set and still stored
    pub fn default_workspace(&self) -> Option<Arc<WorkspaceInfo>> {
        let id = self.defaults.workspace.read().clone()?;
        self.workspace(&id)
    }

    /// Set (or clear) the default namespace
    ///
    /// # Errors
    ///
    /// `NotFound` when the namespace is not stored.
    pub fn set_default_namespace(&self, namespace: Option<&NamespaceInfo>) -> Result<()> {
        match namespace {
            None => {
                *self.defaults.namespace.write() = None;
                Ok(())
            }
            Some(ns) => {
                let id = ns
                    .id
                    .clone()
                    .ok_or_else(|| CatalogError::NotFound("namespace without id".to_string()))?;
                if self.namespace(&id).is_none() {
                    return Err(CatalogError::NotFound(id.to_string()));
                }
                *self.defaults.namespace.write() = Some(id);
                Ok(())
            }
        }
    }

    /// The default namespace, if one is set and still stored
    pub fn default_namespace(&self) -> Option<Arc<NamespaceInfo>> {
        let id = self.defaults.namespace.read().clone()?;
        self.namespace(&id)
    }

    /// Set (or clear) the default store for a workspace
    ///
    /// # Errors
    ///
    /// `NotFound` when the store is not stored or belongs to another
    /// workspace.
    pub fn set_default_store(
        &self,
        workspace: &EntityId,
        store: Option<&StoreInfo>,
    ) -> Result<()> {
        match store {
            None => {
                self.defaults.store_by_workspace.remove(workspace);
                Ok(())
            }
            Some(s) => {
                let id = s
                    .id
                    .clone()
                    .ok_or_else(|| CatalogError::NotFound("store without id".to_string()))?;
                let stored = self
                    .store(&id)
                    .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
                if stored.workspace != *workspace {
                    return Err(CatalogError::NotFound(format!(
                        "store {} is not owned by workspace {}",
                        id, workspace
                    )));
                }
                self.defaults
                    .store_by_workspace
                    .insert(workspace.clone(), id);
                Ok(())
            }
        }
    }

    /// The default store for a workspace, if set and still stored
    pub fn default_store(&self, workspace: &EntityId) -> Option<Arc<StoreInfo>> {
        let id = self
            .defaults
            .store_by_workspace
            .get(workspace)
            .map(|entry| entry.value().clone())?;
        self.store(&id)
    }
}
