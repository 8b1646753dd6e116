//! Cross-kind relocation sequences
//!
//! Moving a store to another workspace cascades to every dependent
//! resource's namespace. There are no cross-kind transactions: the
//! sequence runs as independent per-kind updates, and a failure part
//! way through is compensated by reapplying the prior values in
//! reverse order. The compensation is best-effort — a crash mid-
//! sequence leaves partial effect.

use crate::catalog::Catalog;
use carta_core::property::PropertyValue;
use carta_core::{CatalogError, EntityId, EntityKind, Result};
use carta_patch::Patch;
use tracing::warn;

impl Catalog {
    /// Move a store to another workspace, re-homing every dependent
    /// resource under the target namespace
    ///
    /// # Errors
    ///
    /// `NotFound` when the store, target workspace, or target
    /// namespace is absent. A failure during the cascade is returned
    /// after compensation has reapplied the prior values (best-effort).
    pub fn relocate_store(
        &self,
        store_id: &EntityId,
        target_workspace: &EntityId,
        target_namespace: &EntityId,
    ) -> Result<()> {
        let store = self
            .store(store_id)
            .ok_or_else(|| CatalogError::NotFound(store_id.to_string()))?;
        if self.workspace(target_workspace).is_none() {
            return Err(CatalogError::NotFound(target_workspace.to_string()));
        }
        if self.namespace(target_namespace).is_none() {
            return Err(CatalogError::NotFound(target_namespace.to_string()));
        }

        let prior_workspace = store.workspace.clone();
        self.update(
            EntityKind::Store,
            store_id,
            &Patch::with("workspace", PropertyValue::Ref(target_workspace.clone())),
        )?;

        // Cascade: one independent update per resource, remembering the
        // prior namespace of every step already applied.
        let mut applied: Vec<(EntityId, EntityId)> = Vec::new();
        for resource in self.resources_by_store(store_id) {
            let resource_id = match &resource.id {
                Some(id) => id.clone(),
                None => continue,
            };
            let prior_namespace = resource.namespace.clone();
            let result = self.update(
                EntityKind::Resource,
                &resource_id,
                &Patch::with("namespace", PropertyValue::Ref(target_namespace.clone())),
            );
            match result {
                Ok(()) => applied.push((resource_id, prior_namespace)),
                Err(err) => {
                    self.compensate(store_id, &prior_workspace, &applied);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    // Reapply prior values in reverse order. Compensation failures are
    // logged, not raised: the original error is what the caller sees.
    fn compensate(
        &self,
        store_id: &EntityId,
        prior_workspace: &EntityId,
        applied: &[(EntityId, EntityId)],
    ) {
        for (resource_id, prior_namespace) in applied.iter().rev() {
            let rollback = self.update(
                EntityKind::Resource,
                resource_id,
                &Patch::with("namespace", PropertyValue::Ref(prior_namespace.clone())),
            );
            if let Err(err) = rollback {
                warn!(resource = %resource_id, %err, "compensation failed for resource");
            }
        }
        let rollback = self.update(
            EntityKind::Store,
            store_id,
            &Patch::with("workspace", PropertyValue::Ref(prior_workspace.clone())),
        );
        if let Err(err) = rollback {
            warn!(store = %store_id, %err, "compensation failed for store");
        }
    }
}
