//! carta — in-memory geospatial metadata catalog
//!
//! A multi-kind entity store with indexed lookup, patch-based partial
//! updates, workspace-isolation visibility filtering, and merge-sorted
//! union queries.
//!
//! ## Crates
//!
//! - `carta-core`: entity model, kinds, names, property values, errors
//! - `carta-patch`: diff/patch engine and the change recorder
//! - `carta-store`: per-kind repositories and the kind registry
//! - `carta-query`: filters, sort comparators, streams, merge engine
//! - `carta-isolation`: scope context and the visibility wrapper
//! - `carta-engine`: the catalog facade, defaults, and bulk load
//!
//! ## Example
//!
//! ```
//! use carta::{Catalog, WorkspaceInfo, StoreInfo, StoreKind};
//!
//! let catalog = Catalog::new();
//! let ws = catalog.add_workspace(WorkspaceInfo::new("geo")).unwrap();
//! let ws_id = ws.id.clone().unwrap();
//! let store = catalog
//!     .add_store(StoreInfo::new(StoreKind::Data, "pg", ws_id.clone()))
//!     .unwrap();
//! assert!(store.id.is_some());
//! assert!(catalog.store_by_name(&ws_id, "pg").is_some());
//! ```

pub use carta_core::{
    can_sort_by, properties, property_type, CatalogError, Entity, EntityId, EntityKind,
    GroupStyle, LayerGroupInfo, LayerInfo, MapInfo, NamespaceInfo, PropertyAccess,
    PropertyDescriptor, PropertyType, PropertyValue, PublishedInfo, PublishedRef, ResourceInfo,
    ResourceKind, Result, ScopedName, SrsIdent, StoreInfo, StoreKind, StyleInfo, TextValue,
    WorkspaceInfo,
};
pub use carta_engine::{
    Catalog, CatalogConfig, CatalogContents, CatalogResolver, DanglingRef, ReferenceResolver,
};
pub use carta_isolation::{
    is_sentinel, is_visible, IsolatedCatalog, LocalScope, ScopeProvider, ThreadLocalScope,
    ANY_WORKSPACE, NO_WORKSPACE,
};
pub use carta_patch::{ChangeRecorder, DiffEntry, Patch, PropertyDiff};
pub use carta_query::{
    query_union, EntityStream, Filter, MergeSide, Query, SortBy, SortComparator,
};
pub use carta_store::{
    Applied, EntityRepository, ErasedRepository, KindRegistry, LayerRepository,
    NamespaceRepository,
};
