//! Workspace isolation for the catalog
//!
//! A workspace marked isolated hides its contents from requests whose
//! current scope addresses a different workspace. This crate provides
//! the ambient scope seam (`ScopeProvider`, `ThreadLocalScope`), the
//! per-entity visibility rule, and `IsolatedCatalog` — the composition
//! wrapper that applies the rule at every read entry point.

#![warn(clippy::all)]

pub mod facade;
pub mod scope;
pub mod visibility;

pub use facade::IsolatedCatalog;
pub use scope::{
    is_sentinel, LocalScope, ScopeProvider, ThreadLocalScope, ANY_WORKSPACE, NO_WORKSPACE,
};
pub use visibility::is_visible;
