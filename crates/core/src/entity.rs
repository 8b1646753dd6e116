//! Catalog entity types
//!
//! One plain struct per stored kind, all serde-derived so the catalog can
//! be exported and re-imported as JSON. Entities are dumb values: no
//! back-pointers, no live references — relationships are ids, which is
//! what lets the repositories swap instances copy-on-write.
//!
//! Every entity implements [`PropertyAccess`], which is the only surface
//! the diff/patch engine and the sort comparators use, and [`Entity`],
//! the object-safe trait behind the erased repository dispatch.

use crate::error::{CatalogError, Result};
use crate::id::EntityId;
use crate::kind::EntityKind;
use crate::name::ScopedName;
use crate::property::{
    apply_list, apply_string_map, bad_type, expect_bool, expect_opt_ref, expect_opt_srs,
    expect_opt_string, expect_opt_text, expect_opt_timestamp, expect_ref, expect_string,
    unknown_property, PropertyAccess, PropertyValue, SrsIdent, TextValue,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;

/// Object-safe entity surface
///
/// Implemented by every stored struct, by [`PublishedInfo`], and by the
/// patch engine's change recorder (which reports
/// `is_change_recorder() == true` so store entry points can reject it).
pub trait Entity: PropertyAccess + Send + Sync + 'static {
    /// The entity's id, absent until assigned
    fn id(&self) -> Option<&EntityId>;

    /// Assign the id (used by repositories for entities added without one)
    fn assign_id(&mut self, id: EntityId);

    /// The entity's concrete kind
    fn kind(&self) -> EntityKind;

    /// Whether this value is a change-tracking wrapper rather than a
    /// plain entity
    fn is_change_recorder(&self) -> bool {
        false
    }

    /// Erased clone, for the dynamic repository paths
    fn clone_erased(&self) -> Box<dyn Entity>;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

fn timestamp_value(ts: &Option<DateTime<Utc>>) -> PropertyValue {
    match ts {
        Some(t) => PropertyValue::Timestamp(*t),
        None => PropertyValue::Null,
    }
}

fn opt_ref_value(id: &Option<EntityId>) -> PropertyValue {
    match id {
        Some(id) => PropertyValue::Ref(id.clone()),
        None => PropertyValue::Null,
    }
}

fn opt_string_value(s: &Option<String>) -> PropertyValue {
    match s {
        Some(s) => PropertyValue::String(s.clone()),
        None => PropertyValue::Null,
    }
}

fn string_map_value(map: &BTreeMap<String, String>) -> PropertyValue {
    PropertyValue::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), PropertyValue::String(v.clone())))
            .collect(),
    )
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl Entity for $ty {
            fn id(&self) -> Option<&EntityId> {
                self.id.as_ref()
            }

            fn assign_id(&mut self, id: EntityId) {
                self.id = Some(id);
            }

            fn kind(&self) -> EntityKind {
                $kind
            }

            fn clone_erased(&self) -> Box<dyn Entity> {
                Box::new(self.clone())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// Workspace: top-level grouping and the isolation boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    /// Id, assigned at add time if absent
    pub id: Option<EntityId>,
    /// Workspace name, globally unique
    pub name: String,
    /// Whether contents are hidden outside a matching request scope
    pub isolated: bool,
    /// Creation stamp
    pub date_created: Option<DateTime<Utc>>,
    /// Last-modification stamp
    pub date_modified: Option<DateTime<Utc>>,
}

impl WorkspaceInfo {
    /// A workspace with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            isolated: false,
            date_created: None,
            date_modified: None,
        }
    }
}

impl PropertyAccess for WorkspaceInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(opt_string_value(
                &self.id.as_ref().map(|i| i.as_str().to_string()),
            )),
            "name" => Some(PropertyValue::String(self.name.clone())),
            "isolated" => Some(PropertyValue::Bool(self.isolated)),
            "date_created" => Some(timestamp_value(&self.date_created)),
            "date_modified" => Some(timestamp_value(&self.date_modified)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match name {
            "id" => Err(CatalogError::InvalidProperty(
                "id is assigned by the catalog".to_string(),
            )),
            "name" => {
                self.name = expect_string(name, value)?;
                Ok(())
            }
            "isolated" => {
                self.isolated = expect_bool(name, value)?;
                Ok(())
            }
            "date_created" => {
                self.date_created = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            "date_modified" => {
                self.date_modified = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(EntityKind::Workspace, name)),
        }
    }
}

impl_entity!(WorkspaceInfo, EntityKind::Workspace);

// ---------------------------------------------------------------------------
// Namespace
// ---------------------------------------------------------------------------

/// Namespace: URI-qualified prefix, paired with a workspace by convention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    /// Id, assigned at add time if absent
    pub id: Option<EntityId>,
    /// Namespace prefix, globally unique
    pub prefix: String,
    /// Namespace URI; several namespaces may share one
    pub uri: String,
    /// Whether contents are hidden outside a matching request scope
    pub isolated: bool,
    /// Creation stamp
    pub date_created: Option<DateTime<Utc>>,
    /// Last-modification stamp
    pub date_modified: Option<DateTime<Utc>>,
}

impl NamespaceInfo {
    /// A namespace with the given prefix and URI
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: None,
            prefix: prefix.into(),
            uri: uri.into(),
            isolated: false,
            date_created: None,
            date_modified: None,
        }
    }
}

impl PropertyAccess for NamespaceInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(opt_string_value(
                &self.id.as_ref().map(|i| i.as_str().to_string()),
            )),
            "prefix" => Some(PropertyValue::String(self.prefix.clone())),
            "uri" => Some(PropertyValue::String(self.uri.clone())),
            "isolated" => Some(PropertyValue::Bool(self.isolated)),
            "date_created" => Some(timestamp_value(&self.date_created)),
            "date_modified" => Some(timestamp_value(&self.date_modified)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match name {
            "id" => Err(CatalogError::InvalidProperty(
                "id is assigned by the catalog".to_string(),
            )),
            "prefix" => {
                self.prefix = expect_string(name, value)?;
                Ok(())
            }
            "uri" => {
                self.uri = expect_string(name, value)?;
                Ok(())
            }
            "isolated" => {
                self.isolated = expect_bool(name, value)?;
                Ok(())
            }
            "date_created" => {
                self.date_created = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            "date_modified" => {
                self.date_modified = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(EntityKind::Namespace, name)),
        }
    }
}

impl_entity!(NamespaceInfo, EntityKind::Namespace);

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Concrete store flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreKind {
    /// Vector data store
    Data,
    /// Raster coverage store
    Coverage,
}

impl StoreKind {
    /// The entity kind this flavor buckets under
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            StoreKind::Data => EntityKind::DataStore,
            StoreKind::Coverage => EntityKind::CoverageStore,
        }
    }
}

/// Store: a connection to vector or raster data, owned by a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Id, assigned at add time if absent
    pub id: Option<EntityId>,
    /// Store name, unique within its workspace
    pub name: String,
    /// Concrete flavor
    pub store_kind: StoreKind,
    /// Owning workspace (required)
    pub workspace: EntityId,
    /// Whether the store is enabled
    pub enabled: bool,
    /// Optional description
    pub description: Option<String>,
    /// Connection parameters
    pub connection_params: BTreeMap<String, String>,
    /// Creation stamp
    pub date_created: Option<DateTime<Utc>>,
    /// Last-modification stamp
    pub date_modified: Option<DateTime<Utc>>,
}

impl StoreInfo {
    /// A store of the given flavor in the given workspace
    pub fn new(store_kind: StoreKind, name: impl Into<String>, workspace: EntityId) -> Self {
        Self {
            id: None,
            name: name.into(),
            store_kind,
            workspace,
            enabled: true,
            description: None,
            connection_params: BTreeMap::new(),
            date_created: None,
            date_modified: None,
        }
    }
}

impl PropertyAccess for StoreInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(opt_string_value(
                &self.id.as_ref().map(|i| i.as_str().to_string()),
            )),
            "name" => Some(PropertyValue::String(self.name.clone())),
            "workspace" => Some(PropertyValue::Ref(self.workspace.clone())),
            "enabled" => Some(PropertyValue::Bool(self.enabled)),
            "description" => Some(opt_string_value(&self.description)),
            "connection_params" => Some(string_map_value(&self.connection_params)),
            "date_created" => Some(timestamp_value(&self.date_created)),
            "date_modified" => Some(timestamp_value(&self.date_modified)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match name {
            "id" => Err(CatalogError::InvalidProperty(
                "id is assigned by the catalog".to_string(),
            )),
            "name" => {
                self.name = expect_string(name, value)?;
                Ok(())
            }
            "workspace" => {
                self.workspace = expect_ref(name, value)?;
                Ok(())
            }
            "enabled" => {
                self.enabled = expect_bool(name, value)?;
                Ok(())
            }
            "description" => {
                self.description = expect_opt_string(name, value)?;
                Ok(())
            }
            "connection_params" => apply_string_map(name, &mut self.connection_params, value),
            "date_created" => {
                self.date_created = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            "date_modified" => {
                self.date_modified = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(self.store_kind.entity_kind(), name)),
        }
    }
}

impl Entity for StoreInfo {
    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn kind(&self) -> EntityKind {
        self.store_kind.entity_kind()
    }

    fn clone_erased(&self) -> Box<dyn Entity> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// Concrete resource flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Vector resource
    FeatureType,
    /// Raster resource
    Coverage,
}

impl ResourceKind {
    /// The entity kind this flavor buckets under
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            ResourceKind::FeatureType => EntityKind::FeatureType,
            ResourceKind::Coverage => EntityKind::Coverage,
        }
    }
}

/// Resource: publishable data unit, owned by a store and a namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Id, assigned at add time if absent
    pub id: Option<EntityId>,
    /// Resource name, unique within its namespace
    pub name: String,
    /// Concrete flavor
    pub resource_kind: ResourceKind,
    /// Owning namespace (required)
    pub namespace: EntityId,
    /// Owning store (required)
    pub store: EntityId,
    /// Human-readable title
    pub title: Option<TextValue>,
    /// Human-readable abstract
    pub abstract_text: Option<TextValue>,
    /// Native spatial reference
    pub native_srs: Option<SrsIdent>,
    /// Whether the resource is enabled
    pub enabled: bool,
    /// Whether the resource is advertised in listings
    pub advertised: bool,
    /// Keyword list
    pub keywords: Vec<String>,
    /// Free-form metadata entries
    pub metadata: BTreeMap<String, String>,
    /// Creation stamp
    pub date_created: Option<DateTime<Utc>>,
    /// Last-modification stamp
    pub date_modified: Option<DateTime<Utc>>,
}

impl ResourceInfo {
    /// A resource of the given flavor under the given namespace and store
    pub fn new(
        resource_kind: ResourceKind,
        name: impl Into<String>,
        namespace: EntityId,
        store: EntityId,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            resource_kind,
            namespace,
            store,
            title: None,
            abstract_text: None,
            native_srs: None,
            enabled: true,
            advertised: true,
            keywords: Vec::new(),
            metadata: BTreeMap::new(),
            date_created: None,
            date_modified: None,
        }
    }
}

impl PropertyAccess for ResourceInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(opt_string_value(
                &self.id.as_ref().map(|i| i.as_str().to_string()),
            )),
            "name" => Some(PropertyValue::String(self.name.clone())),
            "namespace" => Some(PropertyValue::Ref(self.namespace.clone())),
            "store" => Some(PropertyValue::Ref(self.store.clone())),
            "title" => Some(match &self.title {
                Some(t) => PropertyValue::Text(t.clone()),
                None => PropertyValue::Null,
            }),
            "abstract" => Some(match &self.abstract_text {
                Some(t) => PropertyValue::Text(t.clone()),
                None => PropertyValue::Null,
            }),
            "native_srs" => Some(match &self.native_srs {
                Some(s) => PropertyValue::Srs(s.clone()),
                None => PropertyValue::Null,
            }),
            "enabled" => Some(PropertyValue::Bool(self.enabled)),
            "advertised" => Some(PropertyValue::Bool(self.advertised)),
            "keywords" => Some(PropertyValue::List(
                self.keywords
                    .iter()
                    .map(|k| PropertyValue::String(k.clone()))
                    .collect(),
            )),
            "metadata" => Some(string_map_value(&self.metadata)),
            "date_created" => Some(timestamp_value(&self.date_created)),
            "date_modified" => Some(timestamp_value(&self.date_modified)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match name {
            "id" => Err(CatalogError::InvalidProperty(
                "id is assigned by the catalog".to_string(),
            )),
            "name" => {
                self.name = expect_string(name, value)?;
                Ok(())
            }
            "namespace" => {
                self.namespace = expect_ref(name, value)?;
                Ok(())
            }
            "store" => {
                self.store = expect_ref(name, value)?;
                Ok(())
            }
            "title" => {
                self.title = expect_opt_text(name, value)?;
                Ok(())
            }
            "abstract" => {
                self.abstract_text = expect_opt_text(name, value)?;
                Ok(())
            }
            "native_srs" => {
                self.native_srs = expect_opt_srs(name, value)?;
                Ok(())
            }
            "enabled" => {
                self.enabled = expect_bool(name, value)?;
                Ok(())
            }
            "advertised" => {
                self.advertised = expect_bool(name, value)?;
                Ok(())
            }
            "keywords" => apply_list(name, &mut self.keywords, value, |p, v| expect_string(p, v)),
            "metadata" => apply_string_map(name, &mut self.metadata, value),
            "date_created" => {
                self.date_created = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            "date_modified" => {
                self.date_modified = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(self.resource_kind.entity_kind(), name)),
        }
    }
}

impl Entity for ResourceInfo {
    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn kind(&self) -> EntityKind {
        self.resource_kind.entity_kind()
    }

    fn clone_erased(&self) -> Box<dyn Entity> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

/// Layer: publishes exactly one resource
///
/// A layer's composite name mirrors its resource's composite name; the
/// store keeps the mirror in step when the resource is renamed. The name
/// is therefore not directly patchable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Id, assigned at add time if absent
    pub id: Option<EntityId>,
    /// Composite name, always equal to the resource's composite name
    pub name: ScopedName,
    /// Published resource (required)
    pub resource: EntityId,
    /// Default style
    pub default_style: Option<EntityId>,
    /// Additional styles
    pub styles: Vec<EntityId>,
    /// Whether the layer is enabled
    pub enabled: bool,
    /// Whether the layer is advertised in listings
    pub advertised: bool,
    /// Creation stamp
    pub date_created: Option<DateTime<Utc>>,
    /// Last-modification stamp
    pub date_modified: Option<DateTime<Utc>>,
}

impl LayerInfo {
    /// A layer publishing the given resource under the given name
    pub fn new(resource: EntityId, name: ScopedName) -> Self {
        Self {
            id: None,
            name,
            resource,
            default_style: None,
            styles: Vec::new(),
            enabled: true,
            advertised: true,
            date_created: None,
            date_modified: None,
        }
    }

    /// A layer for an already-added resource
    ///
    /// Returns `None` if the resource has no id yet.
    pub fn for_resource(resource: &ResourceInfo) -> Option<Self> {
        let id = resource.id.clone()?;
        let name = ScopedName::scoped(resource.namespace.clone(), resource.name.clone());
        Some(Self::new(id, name))
    }
}

impl PropertyAccess for LayerInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(opt_string_value(
                &self.id.as_ref().map(|i| i.as_str().to_string()),
            )),
            "name" => Some(PropertyValue::String(self.name.local.clone())),
            "resource" => Some(PropertyValue::Ref(self.resource.clone())),
            "default_style" => Some(opt_ref_value(&self.default_style)),
            "styles" => Some(PropertyValue::List(
                self.styles
                    .iter()
                    .map(|s| PropertyValue::Ref(s.clone()))
                    .collect(),
            )),
            "enabled" => Some(PropertyValue::Bool(self.enabled)),
            "advertised" => Some(PropertyValue::Bool(self.advertised)),
            "date_created" => Some(timestamp_value(&self.date_created)),
            "date_modified" => Some(timestamp_value(&self.date_modified)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match name {
            "id" => Err(CatalogError::InvalidProperty(
                "id is assigned by the catalog".to_string(),
            )),
            "name" => Err(CatalogError::InvalidProperty(
                "layer name is derived from its resource".to_string(),
            )),
            "resource" => {
                self.resource = expect_ref(name, value)?;
                Ok(())
            }
            "default_style" => {
                self.default_style = expect_opt_ref(name, value)?;
                Ok(())
            }
            "styles" => apply_list(name, &mut self.styles, value, |p, v| expect_ref(p, v)),
            "enabled" => {
                self.enabled = expect_bool(name, value)?;
                Ok(())
            }
            "advertised" => {
                self.advertised = expect_bool(name, value)?;
                Ok(())
            }
            "date_created" => {
                self.date_created = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            "date_modified" => {
                self.date_modified = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(EntityKind::Layer, name)),
        }
    }
}

impl_entity!(LayerInfo, EntityKind::Layer);

// ---------------------------------------------------------------------------
// LayerGroup
// ---------------------------------------------------------------------------

/// Reference to a published child: a layer or a nested group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishedRef {
    /// Child layer
    Layer(EntityId),
    /// Nested child group
    Group(EntityId),
}

impl PublishedRef {
    /// The referenced id
    pub fn id(&self) -> &EntityId {
        match self {
            PublishedRef::Layer(id) | PublishedRef::Group(id) => id,
        }
    }

    fn encode(&self) -> PropertyValue {
        match self {
            PublishedRef::Layer(id) => PropertyValue::String(format!("layer:{}", id)),
            PublishedRef::Group(id) => PropertyValue::String(format!("group:{}", id)),
        }
    }

    fn decode(property: &str, value: PropertyValue) -> Result<Self> {
        let encoded = expect_string(property, value)?;
        if let Some(id) = encoded.strip_prefix("layer:") {
            Ok(PublishedRef::Layer(EntityId::new(id)))
        } else if let Some(id) = encoded.strip_prefix("group:") {
            Ok(PublishedRef::Group(EntityId::new(id)))
        } else {
            Err(CatalogError::InvalidProperty(format!(
                "property `{}` expects `layer:<id>` or `group:<id>`, got `{}`",
                property, encoded
            )))
        }
    }
}

/// Named alternate presentation of a layer group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStyle {
    /// Presentation name
    pub name: String,
    /// Child list for this presentation
    pub layers: Vec<PublishedRef>,
    /// Style per child, `None` for the child's default
    pub styles: Vec<Option<EntityId>>,
}

impl GroupStyle {
    fn encode(&self) -> PropertyValue {
        let mut map = BTreeMap::new();
        map.insert(
            "name".to_string(),
            PropertyValue::String(self.name.clone()),
        );
        map.insert(
            "layers".to_string(),
            PropertyValue::List(self.layers.iter().map(PublishedRef::encode).collect()),
        );
        map.insert(
            "styles".to_string(),
            PropertyValue::List(self.styles.iter().map(opt_ref_value).collect()),
        );
        PropertyValue::Map(map)
    }

    fn decode(property: &str, value: PropertyValue) -> Result<Self> {
        let mut map = match value {
            PropertyValue::Map(m) => m,
            other => return Err(bad_type(property, "Map", &other)),
        };
        let name = expect_string(
            property,
            map.remove("name").unwrap_or(PropertyValue::Null),
        )?;
        let layers = match map.remove("layers").unwrap_or(PropertyValue::Null) {
            PropertyValue::Null => Vec::new(),
            PropertyValue::List(items) => items
                .into_iter()
                .map(|v| PublishedRef::decode(property, v))
                .collect::<Result<Vec<_>>>()?,
            other => return Err(bad_type(property, "List", &other)),
        };
        let styles = match map.remove("styles").unwrap_or(PropertyValue::Null) {
            PropertyValue::Null => Vec::new(),
            PropertyValue::List(items) => items
                .into_iter()
                .map(|v| expect_opt_ref(property, v))
                .collect::<Result<Vec<_>>>()?,
            other => return Err(bad_type(property, "List", &other)),
        };
        Ok(GroupStyle {
            name,
            layers,
            styles,
        })
    }
}

/// Layer group: ordered children, optionally scoped to a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerGroupInfo {
    /// Id, assigned at add time if absent
    pub id: Option<EntityId>,
    /// Group name, unique within its scope
    pub name: String,
    /// Owning workspace, `None` for the global scope
    pub workspace: Option<EntityId>,
    /// Ordered children
    pub layers: Vec<PublishedRef>,
    /// Style per child, parallel to `layers`
    pub styles: Vec<Option<EntityId>>,
    /// Named alternate presentations
    pub group_styles: Vec<GroupStyle>,
    /// Whether the group is enabled
    pub enabled: bool,
    /// Whether the group is advertised in listings
    pub advertised: bool,
    /// Creation stamp
    pub date_created: Option<DateTime<Utc>>,
    /// Last-modification stamp
    pub date_modified: Option<DateTime<Utc>>,
}

impl LayerGroupInfo {
    /// A group with the given name in the global scope
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            workspace: None,
            layers: Vec::new(),
            styles: Vec::new(),
            group_styles: Vec::new(),
            enabled: true,
            advertised: true,
            date_created: None,
            date_modified: None,
        }
    }
}

impl PropertyAccess for LayerGroupInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(opt_string_value(
                &self.id.as_ref().map(|i| i.as_str().to_string()),
            )),
            "name" => Some(PropertyValue::String(self.name.clone())),
            "workspace" => Some(opt_ref_value(&self.workspace)),
            "layers" => Some(PropertyValue::List(
                self.layers.iter().map(PublishedRef::encode).collect(),
            )),
            "styles" => Some(PropertyValue::List(
                self.styles.iter().map(opt_ref_value).collect(),
            )),
            "group_styles" => Some(PropertyValue::List(
                self.group_styles.iter().map(GroupStyle::encode).collect(),
            )),
            "enabled" => Some(PropertyValue::Bool(self.enabled)),
            "advertised" => Some(PropertyValue::Bool(self.advertised)),
            "date_created" => Some(timestamp_value(&self.date_created)),
            "date_modified" => Some(timestamp_value(&self.date_modified)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match name {
            "id" => Err(CatalogError::InvalidProperty(
                "id is assigned by the catalog".to_string(),
            )),
            "name" => {
                self.name = expect_string(name, value)?;
                Ok(())
            }
            "workspace" => {
                self.workspace = expect_opt_ref(name, value)?;
                Ok(())
            }
            "layers" => apply_list(name, &mut self.layers, value, PublishedRef::decode),
            "styles" => apply_list(name, &mut self.styles, value, |p, v| expect_opt_ref(p, v)),
            "group_styles" => apply_list(name, &mut self.group_styles, value, GroupStyle::decode),
            "enabled" => {
                self.enabled = expect_bool(name, value)?;
                Ok(())
            }
            "advertised" => {
                self.advertised = expect_bool(name, value)?;
                Ok(())
            }
            "date_created" => {
                self.date_created = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            "date_modified" => {
                self.date_modified = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(EntityKind::LayerGroup, name)),
        }
    }
}

impl_entity!(LayerGroupInfo, EntityKind::LayerGroup);

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Style document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleInfo {
    /// Id, assigned at add time if absent
    pub id: Option<EntityId>,
    /// Style name, unique within its scope
    pub name: String,
    /// Owning workspace, `None` for the global scope
    pub workspace: Option<EntityId>,
    /// Style format tag
    pub format: String,
    /// Backing file name
    pub filename: Option<String>,
    /// Creation stamp
    pub date_created: Option<DateTime<Utc>>,
    /// Last-modification stamp
    pub date_modified: Option<DateTime<Utc>>,
}

impl StyleInfo {
    /// A style with the given name in the global scope
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            workspace: None,
            format: "sld".to_string(),
            filename: None,
            date_created: None,
            date_modified: None,
        }
    }
}

impl PropertyAccess for StyleInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(opt_string_value(
                &self.id.as_ref().map(|i| i.as_str().to_string()),
            )),
            "name" => Some(PropertyValue::String(self.name.clone())),
            "workspace" => Some(opt_ref_value(&self.workspace)),
            "format" => Some(PropertyValue::String(self.format.clone())),
            "filename" => Some(opt_string_value(&self.filename)),
            "date_created" => Some(timestamp_value(&self.date_created)),
            "date_modified" => Some(timestamp_value(&self.date_modified)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match name {
            "id" => Err(CatalogError::InvalidProperty(
                "id is assigned by the catalog".to_string(),
            )),
            "name" => {
                self.name = expect_string(name, value)?;
                Ok(())
            }
            "workspace" => {
                self.workspace = expect_opt_ref(name, value)?;
                Ok(())
            }
            "format" => {
                self.format = expect_string(name, value)?;
                Ok(())
            }
            "filename" => {
                self.filename = expect_opt_string(name, value)?;
                Ok(())
            }
            "date_created" => {
                self.date_created = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            "date_modified" => {
                self.date_modified = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(EntityKind::Style, name)),
        }
    }
}

impl_entity!(StyleInfo, EntityKind::Style);

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// Map: an ordered list of layers
///
/// The layer list is exposed read-only; children are appended through
/// [`MapInfo::add_layer`]. A patch that names `layers` raises
/// [`CatalogError::ImmutableCollection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Id, assigned at add time if absent
    pub id: Option<EntityId>,
    /// Map name, globally unique
    pub name: String,
    /// Whether the map is enabled
    pub enabled: bool,
    layers: Vec<EntityId>,
    /// Creation stamp
    pub date_created: Option<DateTime<Utc>>,
    /// Last-modification stamp
    pub date_modified: Option<DateTime<Utc>>,
}

impl MapInfo {
    /// A map with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            enabled: true,
            layers: Vec::new(),
            date_created: None,
            date_modified: None,
        }
    }

    /// The ordered layer list
    pub fn layers(&self) -> &[EntityId] {
        &self.layers
    }

    /// Append a layer
    pub fn add_layer(&mut self, layer: EntityId) {
        self.layers.push(layer);
    }
}

impl PropertyAccess for MapInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "id" => Some(opt_string_value(
                &self.id.as_ref().map(|i| i.as_str().to_string()),
            )),
            "name" => Some(PropertyValue::String(self.name.clone())),
            "enabled" => Some(PropertyValue::Bool(self.enabled)),
            "layers" => Some(PropertyValue::List(
                self.layers
                    .iter()
                    .map(|l| PropertyValue::Ref(l.clone()))
                    .collect(),
            )),
            "date_created" => Some(timestamp_value(&self.date_created)),
            "date_modified" => Some(timestamp_value(&self.date_modified)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match name {
            "id" => Err(CatalogError::InvalidProperty(
                "id is assigned by the catalog".to_string(),
            )),
            "name" => {
                self.name = expect_string(name, value)?;
                Ok(())
            }
            "enabled" => {
                self.enabled = expect_bool(name, value)?;
                Ok(())
            }
            "layers" => Err(CatalogError::ImmutableCollection("layers".to_string())),
            "date_created" => {
                self.date_created = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            "date_modified" => {
                self.date_modified = expect_opt_timestamp(name, value)?;
                Ok(())
            }
            _ => Err(unknown_property(EntityKind::Map, name)),
        }
    }
}

impl_entity!(MapInfo, EntityKind::Map);

// ---------------------------------------------------------------------------
// Published union
// ---------------------------------------------------------------------------

/// Query-time union of layers and layer groups
///
/// Never stored: exists only as the element type of merged queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PublishedInfo {
    /// A layer
    Layer(LayerInfo),
    /// A layer group
    Group(LayerGroupInfo),
}

impl PublishedInfo {
    /// The wrapped entity as a trait object
    pub fn as_entity(&self) -> &dyn Entity {
        match self {
            PublishedInfo::Layer(l) => l,
            PublishedInfo::Group(g) => g,
        }
    }

    /// The local display name
    pub fn local_name(&self) -> &str {
        match self {
            PublishedInfo::Layer(l) => &l.name.local,
            PublishedInfo::Group(g) => &g.name,
        }
    }
}

impl PropertyAccess for PublishedInfo {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        self.as_entity().get_property(name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match self {
            PublishedInfo::Layer(l) => l.set_property(name, value),
            PublishedInfo::Group(g) => g.set_property(name, value),
        }
    }
}

impl Entity for PublishedInfo {
    fn id(&self) -> Option<&EntityId> {
        self.as_entity().id()
    }

    fn assign_id(&mut self, id: EntityId) {
        match self {
            PublishedInfo::Layer(l) => l.assign_id(id),
            PublishedInfo::Group(g) => g.assign_id(id),
        }
    }

    fn kind(&self) -> EntityKind {
        self.as_entity().kind()
    }

    fn clone_erased(&self) -> Box<dyn Entity> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
