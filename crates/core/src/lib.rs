//! Core types for the carta catalog
//!
//! This crate defines the foundational types used throughout the system:
//! - EntityKind: closed kind set with the narrowing relation
//! - EntityId / ScopedName: identity and composite naming
//! - The entity structs (workspaces, namespaces, stores, resources,
//!   layers, layer groups, styles, maps) and the `Published` union
//! - PropertyValue and the per-kind property schema
//! - Entity / PropertyAccess: the object-safe traits behind erased
//!   dispatch and the diff/patch engine
//! - CatalogError: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod error;
pub mod id;
pub mod kind;
pub mod name;
pub mod property;

// Re-export commonly used types
pub use entity::{
    Entity, GroupStyle, LayerGroupInfo, LayerInfo, MapInfo, NamespaceInfo, PublishedInfo,
    PublishedRef, ResourceInfo, ResourceKind, StoreInfo, StoreKind, StyleInfo, WorkspaceInfo,
};
pub use error::{CatalogError, Result};
pub use id::EntityId;
pub use kind::EntityKind;
pub use name::ScopedName;
pub use property::{
    can_sort_by, properties, property_type, PropertyAccess, PropertyDescriptor, PropertyType,
    PropertyValue, SrsIdent, TextValue,
};
