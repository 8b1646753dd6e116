//! Property model for catalog entities
//!
//! This module defines:
//! - `PropertyValue`: unified value enum for entity properties
//! - `TextValue`: human-readable text with per-language translations
//! - `SrsIdent`: spatial reference identifier with canonical-code resolution
//! - `PropertyAccess`: named get/set access implemented by every entity
//! - The static per-kind property schema used for sortability checks
//!
//! ## Type rules
//!
//! - No implicit coercions: `Int(1)` never equals `Float(1.0)`.
//! - Float equality follows IEEE-754 (`NaN != NaN`, `-0.0 == 0.0`);
//!   float *ordering* uses `total_cmp` so sorting is total.
//! - Values are owned. Building a diff or patch from live values clones
//!   them, so later mutation of the source never leaks into the change-set.

use crate::error::{CatalogError, Result};
use crate::id::EntityId;
use crate::kind::EntityKind;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Human-readable text with optional per-language translations
///
/// Empty text and absent text are treated as equivalent by the diff
/// engine's no-op detection, but nowhere else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue {
    /// Default rendering
    pub value: String,
    /// Language tag → translated rendering
    pub translations: BTreeMap<String, String>,
}

impl TextValue {
    /// Plain text with no translations
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            translations: BTreeMap::new(),
        }
    }

    /// Whether the text carries no content at all
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty() && self.translations.is_empty()
    }
}

/// Spatial reference system identifier
///
/// Holds the authority code (`EPSG:4326`) plus an optional definition
/// text. Codes canonicalize: URN forms (`urn:ogc:def:crs:EPSG::4326`)
/// and lowercase authorities fold into `AUTH:CODE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrsIdent {
    /// Authority code as provided by the caller
    pub code: String,
    /// Optional definition text (WKT or similar)
    pub definition: Option<String>,
}

impl SrsIdent {
    /// Identifier from a bare authority code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            definition: None,
        }
    }

    /// Canonical `AUTH:CODE` form of the code
    pub fn canonical(&self) -> String {
        let code = self.code.trim();
        // urn:ogc:def:crs:EPSG::4326 → EPSG:4326
        if let Some(rest) = code
            .strip_prefix("urn:ogc:def:crs:")
            .or_else(|| code.strip_prefix("URN:OGC:DEF:CRS:"))
        {
            let mut parts = rest.split(':').filter(|p| !p.is_empty());
            if let (Some(auth), Some(num)) = (parts.next(), parts.next()) {
                return format!("{}:{}", auth.to_ascii_uppercase(), num);
            }
        }
        match code.split_once(':') {
            Some((auth, num)) => format!("{}:{}", auth.to_ascii_uppercase(), num),
            None => code.to_ascii_uppercase(),
        }
    }

    /// Whether two identifiers resolve to the same reference system
    ///
    /// True when the canonical codes match and the definitions are
    /// metadata-equivalent (equal, or at least one absent).
    pub fn same_reference(&self, other: &SrsIdent) -> bool {
        self.canonical() == other.canonical()
            && match (&self.definition, &other.definition) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

/// Unified value type for entity properties
///
/// Every property an entity exposes reads and writes through this enum;
/// the diff/patch engine and the sort comparators never see raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Absent / unset
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Human-readable text with translations
    Text(TextValue),
    /// Spatial reference identifier
    Srs(SrsIdent),
    /// Reference to another entity by id
    Ref(EntityId),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// Ordered list of values
    List(Vec<PropertyValue>),
    /// String-keyed map of values
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// The variant name, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "Null",
            PropertyValue::Bool(_) => "Bool",
            PropertyValue::Int(_) => "Int",
            PropertyValue::Float(_) => "Float",
            PropertyValue::String(_) => "String",
            PropertyValue::Text(_) => "Text",
            PropertyValue::Srs(_) => "Srs",
            PropertyValue::Ref(_) => "Ref",
            PropertyValue::Timestamp(_) => "Timestamp",
            PropertyValue::List(_) => "List",
            PropertyValue::Map(_) => "Map",
        }
    }

    /// Whether this is the absent value
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Same-variant ordering; `None` when the variants differ or the
    /// variant has no natural order (lists, maps)
    pub fn compare(&self, other: &PropertyValue) -> Option<Ordering> {
        match (self, other) {
            (PropertyValue::Null, PropertyValue::Null) => Some(Ordering::Equal),
            (PropertyValue::Bool(a), PropertyValue::Bool(b)) => Some(a.cmp(b)),
            (PropertyValue::Int(a), PropertyValue::Int(b)) => Some(a.cmp(b)),
            (PropertyValue::Float(a), PropertyValue::Float(b)) => Some(a.total_cmp(b)),
            (PropertyValue::String(a), PropertyValue::String(b)) => Some(a.cmp(b)),
            (PropertyValue::Text(a), PropertyValue::Text(b)) => Some(a.value.cmp(&b.value)),
            (PropertyValue::Srs(a), PropertyValue::Srs(b)) => {
                Some(a.canonical().cmp(&b.canonical()))
            }
            (PropertyValue::Ref(a), PropertyValue::Ref(b)) => Some(a.cmp(b)),
            (PropertyValue::Timestamp(a), PropertyValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the referenced id if this is a Ref value
    pub fn as_ref_id(&self) -> Option<&EntityId> {
        match self {
            PropertyValue::Ref(id) => Some(id),
            _ => None,
        }
    }

    /// Get as list slice if this is a List value
    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Get as map if this is a Map value
    pub fn as_map(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Declared type of a property, used for sortability checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// String
    String,
    /// Human-readable text
    Text,
    /// Spatial reference identifier
    Srs,
    /// Timestamp
    Timestamp,
    /// Reference to an entity of the given kind
    Ref(EntityKind),
    /// Ordered collection
    List,
    /// String-keyed map
    Map,
}

impl PropertyType {
    /// Whether values of this type carry a natural total order
    pub fn is_sortable(&self) -> bool {
        matches!(
            self,
            PropertyType::Bool
                | PropertyType::Int
                | PropertyType::Float
                | PropertyType::String
                | PropertyType::Text
                | PropertyType::Srs
                | PropertyType::Timestamp
        )
    }
}

/// Descriptor for one declared property
#[derive(Debug, Clone, Copy)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: &'static str,
    /// Declared type
    pub ty: PropertyType,
}

const fn prop(name: &'static str, ty: PropertyType) -> PropertyDescriptor {
    PropertyDescriptor { name, ty }
}

const WORKSPACE_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("name", PropertyType::String),
    prop("isolated", PropertyType::Bool),
    prop("date_created", PropertyType::Timestamp),
    prop("date_modified", PropertyType::Timestamp),
];

const NAMESPACE_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("prefix", PropertyType::String),
    prop("uri", PropertyType::String),
    prop("isolated", PropertyType::Bool),
    prop("date_created", PropertyType::Timestamp),
    prop("date_modified", PropertyType::Timestamp),
];

const STORE_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("name", PropertyType::String),
    prop("workspace", PropertyType::Ref(EntityKind::Workspace)),
    prop("enabled", PropertyType::Bool),
    prop("description", PropertyType::String),
    prop("connection_params", PropertyType::Map),
    prop("date_created", PropertyType::Timestamp),
    prop("date_modified", PropertyType::Timestamp),
];

const RESOURCE_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("name", PropertyType::String),
    prop("namespace", PropertyType::Ref(EntityKind::Namespace)),
    prop("store", PropertyType::Ref(EntityKind::Store)),
    prop("title", PropertyType::Text),
    prop("abstract", PropertyType::Text),
    prop("native_srs", PropertyType::Srs),
    prop("enabled", PropertyType::Bool),
    prop("advertised", PropertyType::Bool),
    prop("keywords", PropertyType::List),
    prop("metadata", PropertyType::Map),
    prop("date_created", PropertyType::Timestamp),
    prop("date_modified", PropertyType::Timestamp),
];

const LAYER_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("name", PropertyType::String),
    prop("resource", PropertyType::Ref(EntityKind::Resource)),
    prop("default_style", PropertyType::Ref(EntityKind::Style)),
    prop("styles", PropertyType::List),
    prop("enabled", PropertyType::Bool),
    prop("advertised", PropertyType::Bool),
    prop("date_created", PropertyType::Timestamp),
    prop("date_modified", PropertyType::Timestamp),
];

const LAYER_GROUP_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("name", PropertyType::String),
    prop("workspace", PropertyType::Ref(EntityKind::Workspace)),
    prop("layers", PropertyType::List),
    prop("styles", PropertyType::List),
    prop("group_styles", PropertyType::List),
    prop("enabled", PropertyType::Bool),
    prop("advertised", PropertyType::Bool),
    prop("date_created", PropertyType::Timestamp),
    prop("date_modified", PropertyType::Timestamp),
];

const STYLE_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("name", PropertyType::String),
    prop("workspace", PropertyType::Ref(EntityKind::Workspace)),
    prop("format", PropertyType::String),
    prop("filename", PropertyType::String),
    prop("date_created", PropertyType::Timestamp),
    prop("date_modified", PropertyType::Timestamp),
];

const MAP_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("name", PropertyType::String),
    prop("enabled", PropertyType::Bool),
    prop("layers", PropertyType::List),
    prop("date_created", PropertyType::Timestamp),
    prop("date_modified", PropertyType::Timestamp),
];

// Shared surface of the Published union: what Layer and LayerGroup both expose.
const PUBLISHED_PROPS: &[PropertyDescriptor] = &[
    prop("id", PropertyType::String),
    prop("name", PropertyType::String),
    prop("enabled", PropertyType::Bool),
    prop("advertised", PropertyType::Bool),
];

/// Declared properties of the given kind
///
/// Widening kinds return the surface shared by their narrowings.
pub fn properties(kind: EntityKind) -> &'static [PropertyDescriptor] {
    match kind {
        EntityKind::Workspace => WORKSPACE_PROPS,
        EntityKind::Namespace => NAMESPACE_PROPS,
        EntityKind::Store | EntityKind::DataStore | EntityKind::CoverageStore => STORE_PROPS,
        EntityKind::Resource | EntityKind::FeatureType | EntityKind::Coverage => RESOURCE_PROPS,
        EntityKind::Layer => LAYER_PROPS,
        EntityKind::LayerGroup => LAYER_GROUP_PROPS,
        EntityKind::Style => STYLE_PROPS,
        EntityKind::Map => MAP_PROPS,
        EntityKind::Published => PUBLISHED_PROPS,
    }
}

// Flat (kind, property) → type index for O(1) path walking.
static PROPERTY_INDEX: Lazy<HashMap<(EntityKind, &'static str), PropertyType>> =
    Lazy::new(|| {
        let mut index = HashMap::new();
        let kinds = [
            EntityKind::Workspace,
            EntityKind::Namespace,
            EntityKind::Store,
            EntityKind::DataStore,
            EntityKind::CoverageStore,
            EntityKind::Resource,
            EntityKind::FeatureType,
            EntityKind::Coverage,
            EntityKind::Layer,
            EntityKind::LayerGroup,
            EntityKind::Style,
            EntityKind::Map,
            EntityKind::Published,
        ];
        for kind in kinds {
            for descriptor in properties(kind) {
                index.insert((kind, descriptor.name), descriptor.ty);
            }
        }
        index
    });

/// Declared type at the end of a dot-separated property path
///
/// Intermediate segments must be entity references; the walk descends
/// through the referenced kind's schema. Returns `None` for unknown
/// segments or paths that dead-end in a non-reference.
pub fn property_type(kind: EntityKind, path: &str) -> Option<PropertyType> {
    let mut current = kind;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let ty = *PROPERTY_INDEX.get(&(current, segment))?;
        if segments.peek().is_none() {
            return Some(ty);
        }
        match ty {
            PropertyType::Ref(next) => current = next,
            _ => return None,
        }
    }
    None
}

/// Whether a query against `kind` may sort by the given property path
///
/// A path is sortable if, after walking reference types along the path,
/// the final type is primitive or naturally ordered.
pub fn can_sort_by(kind: EntityKind, path: &str) -> bool {
    property_type(kind, path).map_or(false, |ty| ty.is_sortable())
}

/// Named property access, implemented by every entity
///
/// `get_property` returns `None` for a property the type does not declare
/// and `Some(Null)` for a declared-but-unset property. `set_property`
/// enforces the patch application rules: scalars assign, collections
/// clear-then-extend in place, read-only collections raise
/// [`CatalogError::ImmutableCollection`], unknown names raise
/// [`CatalogError::InvalidProperty`].
pub trait PropertyAccess {
    /// Read a property by name
    fn get_property(&self, name: &str) -> Option<PropertyValue>;

    /// Write a property by name
    ///
    /// # Errors
    ///
    /// `InvalidProperty` for unknown names or unassignable values,
    /// `ImmutableCollection` for read-only collection properties.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Conversion helpers shared by the entity property implementations
// ---------------------------------------------------------------------------

pub(crate) fn expect_string(property: &str, value: PropertyValue) -> Result<String> {
    match value {
        PropertyValue::String(s) => Ok(s),
        other => Err(bad_type(property, "String", &other)),
    }
}

pub(crate) fn expect_opt_string(property: &str, value: PropertyValue) -> Result<Option<String>> {
    match value {
        PropertyValue::Null => Ok(None),
        PropertyValue::String(s) => Ok(Some(s)),
        other => Err(bad_type(property, "String", &other)),
    }
}

pub(crate) fn expect_bool(property: &str, value: PropertyValue) -> Result<bool> {
    match value {
        PropertyValue::Bool(b) => Ok(b),
        other => Err(bad_type(property, "Bool", &other)),
    }
}

pub(crate) fn expect_ref(property: &str, value: PropertyValue) -> Result<EntityId> {
    match value {
        PropertyValue::Ref(id) => Ok(id),
        other => Err(bad_type(property, "Ref", &other)),
    }
}

pub(crate) fn expect_opt_ref(property: &str, value: PropertyValue) -> Result<Option<EntityId>> {
    match value {
        PropertyValue::Null => Ok(None),
        PropertyValue::Ref(id) => Ok(Some(id)),
        other => Err(bad_type(property, "Ref", &other)),
    }
}

pub(crate) fn expect_opt_text(property: &str, value: PropertyValue) -> Result<Option<TextValue>> {
    match value {
        PropertyValue::Null => Ok(None),
        PropertyValue::Text(t) => Ok(Some(t)),
        other => Err(bad_type(property, "Text", &other)),
    }
}

pub(crate) fn expect_opt_srs(property: &str, value: PropertyValue) -> Result<Option<SrsIdent>> {
    match value {
        PropertyValue::Null => Ok(None),
        PropertyValue::Srs(s) => Ok(Some(s)),
        other => Err(bad_type(property, "Srs", &other)),
    }
}

pub(crate) fn expect_opt_timestamp(
    property: &str,
    value: PropertyValue,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        PropertyValue::Null => Ok(None),
        PropertyValue::Timestamp(t) => Ok(Some(t)),
        other => Err(bad_type(property, "Timestamp", &other)),
    }
}

/// Apply the collection patch rule to a `Vec` field: null clears in
/// place, a list clears then extends the existing collection.
pub(crate) fn apply_list<T>(
    property: &str,
    target: &mut Vec<T>,
    value: PropertyValue,
    mut convert: impl FnMut(&str, PropertyValue) -> Result<T>,
) -> Result<()> {
    match value {
        PropertyValue::Null => {
            target.clear();
            Ok(())
        }
        PropertyValue::List(items) => {
            let converted: Result<Vec<T>> =
                items.into_iter().map(|v| convert(property, v)).collect();
            let converted = converted?;
            target.clear();
            target.extend(converted);
            Ok(())
        }
        other => Err(bad_type(property, "List", &other)),
    }
}

/// Apply the map patch rule to a string map field: clear then put all.
pub(crate) fn apply_string_map(
    property: &str,
    target: &mut BTreeMap<String, String>,
    value: PropertyValue,
) -> Result<()> {
    match value {
        PropertyValue::Null => {
            target.clear();
            Ok(())
        }
        PropertyValue::Map(entries) => {
            let mut converted = BTreeMap::new();
            for (k, v) in entries {
                converted.insert(k, expect_string(property, v)?);
            }
            target.clear();
            target.append(&mut converted);
            Ok(())
        }
        other => Err(bad_type(property, "Map", &other)),
    }
}

pub(crate) fn bad_type(property: &str, expected: &str, got: &PropertyValue) -> CatalogError {
    CatalogError::InvalidProperty(format!(
        "property `{}` expects {}, got {}",
        property,
        expected,
        got.type_name()
    ))
}

pub(crate) fn unknown_property(kind: EntityKind, property: &str) -> CatalogError {
    CatalogError::InvalidProperty(format!("no property `{}` on {}", property, kind))
}
