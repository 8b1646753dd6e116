//! Indexed per-kind repositories for the catalog
//!
//! - `EntityRepository<T>`: dual id/name indices, coarse per-kind
//!   mutation lock, weakly consistent lock-free reads
//! - `NamespaceRepository` / `LayerRepository`: kind-specific index
//!   maintenance by composition
//! - `KindRegistry<H>`: kind → handler dispatch with recursive
//!   registration over narrower kinds
//! - `ErasedRepository`: object-safe surface for registry dispatch

#![warn(clippy::all)]

pub mod kinds;
pub mod registry;
pub mod repository;

pub use kinds::{LayerRepository, NamespaceRepository};
pub use registry::KindRegistry;
pub use repository::{Applied, EntityRepository, ErasedRepository};
