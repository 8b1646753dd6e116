//! Indexed per-kind repository
//!
//! Each repository owns two kind-bucketed indices — id → entity and
//! composite name → entity — kept in agreement at all times. Buckets
//! are keyed by the *concrete* kind, so a lookup against a widening
//! kind scans every assignable bucket.
//!
//! # Concurrency
//!
//! Structural mutation (add, remove, update with its name relocation)
//! is serialized by a single lock scoped to the id index. This is
//! coarse-grained; sharding the lock is a known improvement
//! opportunity, not required behavior. Read paths iterate the
//! underlying concurrent maps without taking the mutation lock:
//! iteration is weakly consistent — it may or may not observe an
//! in-flight mutation, but never throws or corrupts.
//!
//! Updates are copy-on-write: the stored value is cloned, patched, and
//! the new `Arc` swapped into both indices, so concurrent readers keep
//! whatever snapshot they already hold.

use carta_core::entity::Entity;
use carta_core::{CatalogError, EntityId, EntityKind, Result, ScopedName};
use carta_patch::Patch;
use carta_query::{validate_sort, EntityStream, Filter, Query, SortComparator};
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Before/after pair returned by an update
#[derive(Debug, Clone)]
pub struct Applied<T> {
    /// Stored value before the update
    pub before: Arc<T>,
    /// Stored value after the update
    pub after: Arc<T>,
}

/// Per-kind entity repository with dual id/name indices
pub struct EntityRepository<T> {
    served: EntityKind,
    name_of: fn(&T) -> ScopedName,
    id_index: DashMap<EntityKind, FxHashMap<EntityId, Arc<T>>>,
    name_index: DashMap<EntityKind, FxHashMap<ScopedName, Arc<T>>>,
    // Serializes structural mutation; scoped to the id index.
    mutation: Mutex<()>,
}

impl<T: Entity + Clone> EntityRepository<T> {
    /// A repository serving the given kind, with the kind-specific
    /// composite-name mapping
    pub fn new(served: EntityKind, name_of: fn(&T) -> ScopedName) -> Self {
        Self {
            served,
            name_of,
            id_index: DashMap::new(),
            name_index: DashMap::new(),
            mutation: Mutex::new(()),
        }
    }

    /// The widest kind this repository serves
    pub fn served_kind(&self) -> EntityKind {
        self.served
    }

    /// The composite name the repository indexes the entity under
    pub fn name_of(&self, entity: &T) -> ScopedName {
        (self.name_of)(entity)
    }

    /// Add an entity, assigning a missing id
    ///
    /// An id collision logs a warning and leaves the existing id entry
    /// in place; the name entry is still inserted. This mirrors
    /// long-standing behavior and is deliberately not an error.
    ///
    /// # Errors
    ///
    /// `WrappedValueRejected` if handed a change recorder.
    pub fn add(&self, mut entity: T) -> Result<Arc<T>> {
        if entity.is_change_recorder() {
            return Err(CatalogError::WrappedValueRejected);
        }
        let kind = entity.kind();
        let id = match entity.id() {
            Some(id) => id.clone(),
            None => {
                let generated = EntityId::generate(kind);
                entity.assign_id(generated.clone());
                generated
            }
        };
        let name = (self.name_of)(&entity);
        let stored = Arc::new(entity);

        let _guard = self.mutation.lock();
        {
            let mut ids = self.id_index.entry(kind).or_default();
            if ids.contains_key(&id) {
                warn!(%id, %kind, "add() with an id already in use; keeping the existing id entry");
            } else {
                ids.insert(id.clone(), stored.clone());
            }
        }
        self.name_index
            .entry(kind)
            .or_default()
            .insert(name, stored.clone());
        Ok(stored)
    }

    /// Remove an entity by id, dropping both index entries
    ///
    /// Returns whether anything was removed. The name entry is computed
    /// from the *stored* instance, so a caller holding a renamed copy
    /// still removes the right entry.
    ///
    /// # Errors
    ///
    /// `WrappedValueRejected` if handed a change recorder.
    pub fn remove(&self, entity: &T) -> Result<bool> {
        if entity.is_change_recorder() {
            return Err(CatalogError::WrappedValueRejected);
        }
        let kind = entity.kind();
        let id = match entity.id() {
            Some(id) => id.clone(),
            None => return Ok(false),
        };

        let _guard = self.mutation.lock();
        let removed = match self.id_index.get_mut(&kind) {
            Some(mut bucket) => bucket.remove(&id),
            None => None,
        };
        match removed {
            Some(stored) => {
                let name = (self.name_of)(&stored);
                if let Some(mut bucket) = self.name_index.get_mut(&kind) {
                    bucket.remove(&name);
                }
                debug!(%id, %kind, "removed entity");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove by composite name, name entry first
    ///
    /// Used for kinds whose removal identity is name-based (layers: the
    /// layer's own id may lag behind a resource rename).
    pub fn remove_named(&self, kind: EntityKind, name: &ScopedName) -> Result<bool> {
        let _guard = self.mutation.lock();
        let removed = match self.name_index.get_mut(&kind) {
            Some(mut bucket) => bucket.remove(name),
            None => None,
        };
        match removed {
            Some(stored) => {
                if let Some(id) = stored.id() {
                    if let Some(mut bucket) = self.id_index.get_mut(&kind) {
                        bucket.remove(id);
                    }
                }
                debug!(%name, %kind, "removed entity by name");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply a patch to the stored instance with the given id
    ///
    /// The caller's copy is never trusted: the patch applies to a clone
    /// of the stored value, under the mutation lock. If the composite
    /// name changes, the name entry relocates atomically with the swap.
    ///
    /// # Errors
    ///
    /// `NotFound` if no stored entity has the id; patch application
    /// errors propagate unchanged.
    pub fn update(&self, id: &EntityId, kind: EntityKind, patch: &Patch) -> Result<Applied<T>> {
        self.update_with(id, kind, |working| patch.apply_to(working))
    }

    /// Mutate the stored instance under the lock, relocating the name
    /// entry when the mutation changes the composite name
    ///
    /// # Errors
    ///
    /// `NotFound` if no stored entity has the id; the mutation
    /// closure's error aborts the update with the indices untouched.
    pub fn update_with(
        &self,
        id: &EntityId,
        kind: EntityKind,
        mutate: impl FnOnce(&mut T) -> Result<()>,
    ) -> Result<Applied<T>> {
        let _guard = self.mutation.lock();

        let mut found: Option<(EntityKind, Arc<T>)> = None;
        for entry in self.id_index.iter() {
            if !entry.key().is_assignable_to(kind) {
                continue;
            }
            if let Some(stored) = entry.value().get(id) {
                found = Some((*entry.key(), stored.clone()));
                break;
            }
        }
        let (bucket_kind, stored) =
            found.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        let mut working = (*stored).clone();
        mutate(&mut working)?;

        let old_name = (self.name_of)(&stored);
        let new_name = (self.name_of)(&working);
        let updated = Arc::new(working);

        if let Some(mut bucket) = self.id_index.get_mut(&bucket_kind) {
            bucket.insert(id.clone(), updated.clone());
        }
        {
            let mut names = self.name_index.entry(bucket_kind).or_default();
            if old_name != new_name {
                names.remove(&old_name);
                debug!(%old_name, %new_name, %bucket_kind, "relocated name index entry");
            }
            // Refresh the entry even on an unchanged name: it must point
            // at the updated value.
            names.insert(new_name, updated.clone());
        }

        Ok(Applied {
            before: stored,
            after: updated,
        })
    }

    /// Point lookup by id, across every bucket assignable to `kind`
    pub fn find_by_id(&self, id: &EntityId, kind: EntityKind) -> Option<Arc<T>> {
        for entry in self.id_index.iter() {
            if !entry.key().is_assignable_to(kind) {
                continue;
            }
            if let Some(stored) = entry.value().get(id) {
                return Some(stored.clone());
            }
        }
        None
    }

    /// Point lookup by composite name
    pub fn find_by_name(&self, name: &ScopedName, kind: EntityKind) -> Option<Arc<T>> {
        for entry in self.name_index.iter() {
            if !entry.key().is_assignable_to(kind) {
                continue;
            }
            if let Some(stored) = entry.value().get(name) {
                return Some(stored.clone());
            }
        }
        None
    }

    /// First entity matching the predicate, in bucket order
    ///
    /// Manual loop over the kind buckets of the name index. At catalog
    /// sizes of 10^4-10^5 entities the loop beats an iterator pipeline
    /// on lookup latency, so no intermediate collection is built.
    pub fn find_first(
        &self,
        kind: EntityKind,
        predicate: impl Fn(&T) -> bool,
    ) -> Option<Arc<T>> {
        for entry in self.name_index.iter() {
            if !entry.key().is_assignable_to(kind) {
                continue;
            }
            for stored in entry.value().values() {
                if predicate(stored) {
                    return Some(stored.clone());
                }
            }
        }
        None
    }

    /// All entities of the kind matching the filter (weakly consistent
    /// snapshot)
    pub fn list(&self, kind: EntityKind, filter: &Filter) -> Vec<Arc<T>> {
        let mut matched = Vec::new();
        for entry in self.name_index.iter() {
            if !entry.key().is_assignable_to(kind) {
                continue;
            }
            for stored in entry.value().values() {
                if filter.matches(&**stored) {
                    matched.push(stored.clone());
                }
            }
        }
        matched
    }

    /// Execute a query: filter, sort, window
    ///
    /// No sort directives means provided order — the sort step is
    /// skipped entirely, not run with a trivial comparator.
    ///
    /// # Errors
    ///
    /// `UnsupportedSort` when a directive fails the sortability check.
    pub fn query(&self, query: &Query) -> Result<EntityStream<Arc<T>>> {
        validate_sort(query.kind, &query.sort)?;
        let mut matched = self.list(query.kind, &query.filter);
        let comparator = SortComparator::new(query.sort.clone());
        if !comparator.is_provided_order() {
            matched.sort_by(|a, b| comparator.compare(&**a, &**b));
        }
        let windowed: Vec<Arc<T>> = matched
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(EntityStream::from_vec(windowed))
    }

    /// Count matches
    ///
    /// The match-everything filter sums bucket sizes directly instead
    /// of scanning.
    pub fn count(&self, kind: EntityKind, filter: &Filter) -> usize {
        if filter.is_all() {
            return self
                .name_index
                .iter()
                .filter(|entry| entry.key().is_assignable_to(kind))
                .map(|entry| entry.value().len())
                .sum();
        }
        let mut count = 0;
        for entry in self.name_index.iter() {
            if !entry.key().is_assignable_to(kind) {
                continue;
            }
            for stored in entry.value().values() {
                if filter.matches(&**stored) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Whether sorting by the property path is supported for `kind`
    pub fn can_sort_by(&self, kind: EntityKind, path: &str) -> bool {
        carta_core::can_sort_by(kind, path)
    }

    /// Every stored entity
    pub fn all(&self) -> Vec<Arc<T>> {
        self.list(self.served, &Filter::All)
    }

    /// Total stored entity count
    pub fn len(&self) -> usize {
        self.id_index.iter().map(|entry| entry.value().len()).sum()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bulk-copy every index entry into a same-typed destination
    ///
    /// Used for snapshot/import. Runs under the destination's mutation
    /// lock; sources of a different implementation go through the
    /// erased per-entity fallback instead.
    pub fn sync_to(&self, dest: &EntityRepository<T>) {
        if std::ptr::eq(self, dest) {
            return;
        }
        let _guard = dest.mutation.lock();
        let mut copied = 0usize;
        for entry in self.id_index.iter() {
            let mut bucket = dest.id_index.entry(*entry.key()).or_default();
            for (id, stored) in entry.value() {
                bucket.insert(id.clone(), stored.clone());
                copied += 1;
            }
        }
        for entry in self.name_index.iter() {
            let mut bucket = dest.name_index.entry(*entry.key()).or_default();
            for (name, stored) in entry.value() {
                bucket.insert(name.clone(), stored.clone());
            }
        }
        info!(count = copied, kind = %self.served, "bulk-copied repository contents");
    }
}

/// Object-safe repository surface for registry dispatch and erased sync
pub trait ErasedRepository: Send + Sync + 'static {
    /// The widest kind the repository serves
    fn served_kind(&self) -> EntityKind;

    /// Total stored entity count
    fn len(&self) -> usize;

    /// Count matches for a kind and filter
    fn count(&self, kind: EntityKind, filter: &Filter) -> usize;

    /// Whether an entity with the id is stored
    fn contains_id(&self, id: &EntityId, kind: EntityKind) -> bool;

    /// Ids stored in the given kind's bucket
    fn ids(&self, kind: EntityKind) -> Vec<EntityId>;

    /// Erased point lookup
    fn get_erased(&self, id: &EntityId, kind: EntityKind) -> Option<Box<dyn Entity>>;

    /// Erased patch application
    ///
    /// # Errors
    ///
    /// `NotFound` for an absent id; patch errors propagate.
    fn update_erased(&self, id: &EntityId, kind: EntityKind, patch: &Patch) -> Result<()>;

    /// Add an erased entity
    ///
    /// # Errors
    ///
    /// `WrappedValueRejected` for change recorders, `UnknownKind` when
    /// the value's concrete type does not belong to this repository.
    fn add_erased(&self, entity: Box<dyn Entity>) -> Result<()>;

    /// Remove by id
    ///
    /// # Errors
    ///
    /// None currently; the `Result` keeps the surface uniform.
    fn remove_by_id(&self, id: &EntityId) -> Result<bool>;

    /// Copy contents into a destination repository
    ///
    /// Same-typed destinations get the bulk index copy; anything else
    /// falls back to per-entity adds.
    ///
    /// # Errors
    ///
    /// Propagates the fallback path's add errors.
    fn sync_into(&self, dest: &dyn ErasedRepository) -> Result<()>;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;
}

impl<T: Entity + Clone> ErasedRepository for EntityRepository<T> {
    fn served_kind(&self) -> EntityKind {
        self.served
    }

    fn len(&self) -> usize {
        EntityRepository::len(self)
    }

    fn count(&self, kind: EntityKind, filter: &Filter) -> usize {
        EntityRepository::count(self, kind, filter)
    }

    fn contains_id(&self, id: &EntityId, kind: EntityKind) -> bool {
        self.find_by_id(id, kind).is_some()
    }

    fn ids(&self, kind: EntityKind) -> Vec<EntityId> {
        let mut ids = Vec::new();
        for entry in self.id_index.iter() {
            if !entry.key().is_assignable_to(kind) {
                continue;
            }
            ids.extend(entry.value().keys().cloned());
        }
        ids
    }

    fn get_erased(&self, id: &EntityId, kind: EntityKind) -> Option<Box<dyn Entity>> {
        self.find_by_id(id, kind).map(|stored| stored.clone_erased())
    }

    fn update_erased(&self, id: &EntityId, kind: EntityKind, patch: &Patch) -> Result<()> {
        self.update(id, kind, patch)?;
        Ok(())
    }

    fn add_erased(&self, entity: Box<dyn Entity>) -> Result<()> {
        if entity.is_change_recorder() {
            return Err(CatalogError::WrappedValueRejected);
        }
        let kind = entity.kind();
        let concrete = entity
            .as_any()
            .downcast_ref::<T>()
            .cloned()
            .ok_or(CatalogError::UnknownKind(kind))?;
        self.add(concrete)?;
        Ok(())
    }

    fn remove_by_id(&self, id: &EntityId) -> Result<bool> {
        match self.find_by_id(id, self.served) {
            Some(stored) => self.remove(&stored),
            None => Ok(false),
        }
    }

    fn sync_into(&self, dest: &dyn ErasedRepository) -> Result<()> {
        if let Some(same) = dest.as_any().downcast_ref::<EntityRepository<T>>() {
            self.sync_to(same);
            return Ok(());
        }
        for stored in self.all() {
            dest.add_erased(stored.clone_erased())?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
