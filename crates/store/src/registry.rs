//! Kind registry for per-kind handler dispatch
//!
//! The registry maps an entity kind to a handler — typically an erased
//! repository — with an explicit recursive registration helper: a
//! handler registered recursively against a widening kind also serves
//! every narrower kind (registering under `Store` covers `DataStore`
//! and `CoverageStore`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut registry: KindRegistry<Arc<dyn ErasedRepository>> = KindRegistry::new();
//!
//! registry.register(EntityKind::Workspace, workspaces.clone());
//! registry.register_recursive(EntityKind::Store, stores.clone());
//!
//! let handler = registry.get(EntityKind::DataStore)?; // → stores
//! ```

use carta_core::{CatalogError, EntityKind, Result};
use std::collections::HashMap;

/// Dispatch table: entity kind → handler
pub struct KindRegistry<H> {
    handlers: HashMap<EntityKind, H>,
}

impl<H: Clone> KindRegistry<H> {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for exactly one kind
    ///
    /// A later registration for the same kind wins.
    pub fn register(&mut self, kind: EntityKind, handler: H) {
        self.handlers.insert(kind, handler);
    }

    /// Register a handler for a kind and, recursively, for every
    /// narrower kind
    pub fn register_recursive(&mut self, kind: EntityKind, handler: H) {
        self.register(kind, handler.clone());
        for narrower in kind.narrower() {
            self.register_recursive(*narrower, handler.clone());
        }
    }

    /// The handler for a kind
    ///
    /// # Errors
    ///
    /// `UnknownKind` when no handler is registered for the kind.
    pub fn get(&self, kind: EntityKind) -> Result<&H> {
        self.handlers
            .get(&kind)
            .ok_or(CatalogError::UnknownKind(kind))
    }

    /// The handler for a kind, if any
    pub fn get_opt(&self, kind: EntityKind) -> Option<&H> {
        self.handlers.get(&kind)
    }

    /// Whether a handler is registered for the kind
    pub fn is_registered(&self, kind: EntityKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// All registered kinds, sorted
    pub fn kinds(&self) -> Vec<EntityKind> {
        let mut kinds: Vec<EntityKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H: Clone> Default for KindRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for KindRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&EntityKind> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("KindRegistry")
            .field("handler_count", &self.handlers.len())
            .field("kinds", &kinds)
            .finish()
    }
}
