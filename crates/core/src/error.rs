//! Error types for the catalog
//!
//! This module defines all error types raised by catalog operations.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Duplicate ids on `add()` are deliberately NOT an error: the repository
//! logs a warning and proceeds without overwriting the id entry. Isolation-
//! hidden results are not errors either; they surface as `None` lookups or
//! absent stream elements.

use crate::kind::EntityKind;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Error types raised synchronously by catalog operations
///
/// None of these are retried internally; retry, if any, is the caller's
/// responsibility.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// `update()` targeted an id absent from the repository
    #[error("entity not found: {0}")]
    NotFound(String),

    /// A patch assignment or accessor named a property with no resolvable
    /// accessor on the target type
    #[error("invalid property: {0}")]
    InvalidProperty(String),

    /// A patch attempted to mutate a collection-typed property that the
    /// target exposes read-only
    #[error("collection property is not modifiable: {0}")]
    ImmutableCollection(String),

    /// A lookup or registration referenced a kind with no registered handler
    #[error("no handler registered for entity kind: {0}")]
    UnknownKind(EntityKind),

    /// `add`/`remove`/`update` was handed a change-tracking wrapper instead
    /// of a plain value
    #[error("change-tracking wrappers cannot be stored directly")]
    WrappedValueRejected,

    /// A query requested sorting by a property that is not sortable
    #[error("cannot sort {kind} by property: {property}")]
    UnsupportedSort {
        /// Kind the query targeted
        kind: EntityKind,
        /// Offending property path
        property: String,
    },

    /// Serialization/deserialization error (bulk import/export)
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = CatalogError::NotFound("layer:roads".to_string());
        assert!(err.to_string().contains("entity not found"));
        assert!(err.to_string().contains("layer:roads"));
    }

    #[test]
    fn test_error_display_invalid_property() {
        let err = CatalogError::InvalidProperty("no such property `bogus`".to_string());
        assert!(err.to_string().contains("invalid property"));
    }

    #[test]
    fn test_error_display_unsupported_sort() {
        let err = CatalogError::UnsupportedSort {
            kind: EntityKind::Layer,
            property: "styles".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Layer"));
        assert!(msg.contains("styles"));
    }

    #[test]
    fn test_error_display_wrapped_value() {
        let err = CatalogError::WrappedValueRejected;
        assert!(err.to_string().contains("change-tracking"));
    }

    #[test]
    fn test_result_type_alias() {
        fn ok() -> Result<u32> {
            Ok(7)
        }
        fn fails() -> Result<u32> {
            Err(CatalogError::WrappedValueRejected)
        }
        assert_eq!(ok().unwrap(), 7);
        assert!(fails().is_err());
    }
}
