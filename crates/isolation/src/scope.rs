//! Ambient request scope
//!
//! The visibility filter reads a per-operation "current scope" set by
//! the surrounding request-handling layer. The core never sets or
//! clears it; [`ThreadLocalScope`] is the stock provider for
//! composition roots and tests.

use carta_core::EntityId;
use std::cell::RefCell;

/// Sentinel workspace marker: matches any workspace
///
/// Entities carrying a sentinel workspace reference are always
/// visible.
pub const ANY_WORKSPACE: &str = "@any";

/// Sentinel workspace marker: explicitly no workspace
pub const NO_WORKSPACE: &str = "@none";

/// Whether an id is one of the sentinel workspace markers
pub fn is_sentinel(id: &EntityId) -> bool {
    id.as_str() == ANY_WORKSPACE || id.as_str() == NO_WORKSPACE
}

/// The requester's current scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalScope {
    /// Workspace the request is addressed to
    pub workspace: Option<EntityId>,
    /// Namespace paired with that workspace
    pub namespace: Option<EntityId>,
}

impl LocalScope {
    /// A scope addressing the given workspace
    pub fn workspace(id: EntityId) -> Self {
        Self {
            workspace: Some(id),
            namespace: None,
        }
    }

    /// A scope addressing a workspace and its namespace
    pub fn new(workspace: EntityId, namespace: EntityId) -> Self {
        Self {
            workspace: Some(workspace),
            namespace: Some(namespace),
        }
    }
}

/// Source of the ambient current scope
///
/// `None` means no request context is active; isolation is bypassed
/// entirely on that path (batch and administrative code).
pub trait ScopeProvider: Send + Sync {
    /// The scope of the operation in flight, if any
    fn current(&self) -> Option<LocalScope>;
}

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<LocalScope>> = const { RefCell::new(None) };
}

/// Thread-local scope provider
///
/// The request-handling layer sets the scope on entry and clears it on
/// exit; `with` scopes it around a closure and restores the previous
/// value afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalScope;

impl ThreadLocalScope {
    /// Set the current thread's scope
    pub fn set(scope: LocalScope) {
        CURRENT_SCOPE.with(|current| *current.borrow_mut() = Some(scope));
    }

    /// Clear the current thread's scope
    pub fn clear() {
        CURRENT_SCOPE.with(|current| *current.borrow_mut() = None);
    }

    /// The current thread's scope, if set
    pub fn get() -> Option<LocalScope> {
        CURRENT_SCOPE.with(|current| current.borrow().clone())
    }

    /// Run a closure with the given scope, restoring the previous one
    /// afterwards
    pub fn with<R>(scope: LocalScope, f: impl FnOnce() -> R) -> R {
        let previous = CURRENT_SCOPE.with(|current| current.borrow_mut().replace(scope));
        let result = f();
        CURRENT_SCOPE.with(|current| *current.borrow_mut() = previous);
        result
    }
}

impl ScopeProvider for ThreadLocalScope {
    fn current(&self) -> Option<LocalScope> {
        Self::get()
    }
}
