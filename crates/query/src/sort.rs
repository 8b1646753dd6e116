//! Sort directives and comparator building
//!
//! A query carries an ordered list of (property path, direction)
//! directives. No directives means "provided order": the engine detects
//! the empty list and skips sorting entirely. Multiple directives chain
//! via stable composition; a property whose value is absent ranks
//! before any present value; remaining ties are left as found.

use carta_core::entity::Entity;
use carta_core::property::{PropertyAccess, PropertyValue};
use carta_core::{can_sort_by, CatalogError, EntityId, EntityKind, Result};
use std::cmp::Ordering;
use std::sync::Arc;

/// One (property path, direction) sort directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    /// Dot-separated property path
    pub path: String,
    /// Ascending when true
    pub ascending: bool,
}

impl SortBy {
    /// Ascending directive
    pub fn asc(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ascending: true,
        }
    }

    /// Descending directive
    pub fn desc(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ascending: false,
        }
    }
}

/// Reject unsupported sort requests before executing a query
///
/// # Errors
///
/// `UnsupportedSort` for any directive whose path fails the kind's
/// sortability check.
pub fn validate_sort(kind: EntityKind, directives: &[SortBy]) -> Result<()> {
    for directive in directives {
        if !can_sort_by(kind, &directive.path) {
            return Err(CatalogError::UnsupportedSort {
                kind,
                property: directive.path.clone(),
            });
        }
    }
    Ok(())
}

/// Resolves an entity reference encountered mid-path
///
/// Sort-key extraction across references needs a catalog lookup, which
/// is the caller's business; without a resolver, paths stop at the
/// first reference and the key counts as absent.
pub type RefResolver = Arc<dyn Fn(&EntityId) -> Option<Box<dyn Entity>> + Send + Sync>;

/// Comparator built from an ordered directive list
#[derive(Clone)]
pub struct SortComparator {
    directives: Vec<SortBy>,
    resolver: Option<RefResolver>,
}

impl SortComparator {
    /// Comparator over the given directives
    pub fn new(directives: Vec<SortBy>) -> Self {
        Self {
            directives,
            resolver: None,
        }
    }

    /// Attach a reference resolver for dotted paths crossing entities
    pub fn with_resolver(mut self, resolver: RefResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Whether no sort was requested (provided order)
    pub fn is_provided_order(&self) -> bool {
        self.directives.is_empty()
    }

    /// Compare two entities
    ///
    /// Directives chain: the first non-equal directive decides. With no
    /// directives everything compares equal, which the engine treats as
    /// "skip sorting".
    pub fn compare(&self, a: &dyn Entity, b: &dyn Entity) -> Ordering {
        for directive in &self.directives {
            let va = self.extract(a, &directive.path);
            let vb = self.extract(b, &directive.path);
            let ordering = compare_keys(va, vb);
            let ordering = if directive.ascending {
                ordering
            } else {
                ordering.reverse()
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn extract(&self, entity: &dyn Entity, path: &str) -> Option<PropertyValue> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut resolved: Option<Box<dyn Entity>> = None;
        let mut index = 0;
        loop {
            let current: &dyn Entity = match &resolved {
                Some(boxed) => boxed.as_ref(),
                None => entity,
            };
            let value = current.get_property(segments[index])?;
            index += 1;
            if index == segments.len() {
                return Some(value);
            }
            match value {
                PropertyValue::Ref(id) => {
                    let resolver = self.resolver.as_ref()?;
                    resolved = Some(resolver(&id)?);
                }
                PropertyValue::Map(map) => {
                    let mut nested = map.get(segments[index])?.clone();
                    index += 1;
                    while index < segments.len() {
                        nested = match nested {
                            PropertyValue::Map(inner) => inner.get(segments[index])?.clone(),
                            _ => return None,
                        };
                        index += 1;
                    }
                    return Some(nested);
                }
                _ => return None,
            }
        }
    }
}

// Absent (missing or null) ranks before any present value.
fn compare_keys(a: Option<PropertyValue>, b: Option<PropertyValue>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
    }
}
