//! Explicit change recording
//!
//! The recorder replaces dynamic mutation-intercepting proxies with a
//! plain wrapper: it keeps a pristine snapshot next to a working copy
//! and records which properties were touched. `diff()` then yields the
//! matched (property, old, new) lists.
//!
//! A recorder is itself an [`Entity`] so it can flow through generic
//! code, but it reports `is_change_recorder() == true` and every store
//! entry point rejects it — recorders describe changes, they are never
//! stored.

use crate::diff::PropertyDiff;
use carta_core::entity::Entity;
use carta_core::property::{PropertyAccess, PropertyValue};
use carta_core::{EntityId, EntityKind, Result};
use std::any::Any;

/// Mutation-recording wrapper around an entity
#[derive(Debug, Clone)]
pub struct ChangeRecorder<T: Entity + Clone> {
    pristine: T,
    working: T,
    touched: Vec<String>,
}

impl<T: Entity + Clone> ChangeRecorder<T> {
    /// Start recording changes against the given entity
    pub fn new(entity: T) -> Self {
        Self {
            pristine: entity.clone(),
            working: entity,
            touched: Vec::new(),
        }
    }

    /// The working copy, with all recorded mutations applied
    pub fn current(&self) -> &T {
        &self.working
    }

    /// The untouched snapshot
    pub fn pristine(&self) -> &T {
        &self.pristine
    }

    /// Record a mutation
    ///
    /// # Errors
    ///
    /// Propagates the working copy's `set_property` errors; a failed
    /// set records nothing.
    pub fn set(&mut self, property: &str, value: PropertyValue) -> Result<()> {
        self.working.set_property(property, value)?;
        if !self.touched.iter().any(|p| p == property) {
            self.touched.push(property.to_string());
        }
        Ok(())
    }

    /// Names of the touched properties, in first-touch order
    pub fn property_names(&self) -> &[String] {
        &self.touched
    }

    /// Pre-mutation values of the touched properties
    pub fn old_values(&self) -> Vec<PropertyValue> {
        self.touched
            .iter()
            .map(|p| {
                self.pristine
                    .get_property(p)
                    .unwrap_or(PropertyValue::Null)
            })
            .collect()
    }

    /// Post-mutation values of the touched properties
    pub fn new_values(&self) -> Vec<PropertyValue> {
        self.touched
            .iter()
            .map(|p| self.working.get_property(p).unwrap_or(PropertyValue::Null))
            .collect()
    }

    /// The recorded change-set
    pub fn diff(&self) -> PropertyDiff {
        PropertyDiff::new(
            self.touched.clone(),
            self.old_values(),
            self.new_values(),
        )
    }

    /// Unwrap the working copy
    pub fn into_inner(self) -> T {
        self.working
    }
}

impl<T: Entity + Clone> PropertyAccess for ChangeRecorder<T> {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        self.working.get_property(name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        self.set(name, value)
    }
}

impl<T: Entity + Clone> Entity for ChangeRecorder<T> {
    fn id(&self) -> Option<&EntityId> {
        self.working.id()
    }

    fn assign_id(&mut self, id: EntityId) {
        self.working.assign_id(id);
    }

    fn kind(&self) -> EntityKind {
        self.working.kind()
    }

    fn is_change_recorder(&self) -> bool {
        true
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

#[cfg(test)]
mod tests {
    use super::*;
    use carta_core::WorkspaceInfo;

    #[test]
    fn test_recorder_tracks_old_and_new_values() {
        let mut rec = ChangeRecorder::new(WorkspaceInfo::new("geo"));
        rec.set("name", PropertyValue::String("topo".to_string()))
            .unwrap();
        rec.set("isolated", PropertyValue::Bool(true)).unwrap();

        let touched: Vec<&str> = rec.property_names().iter().map(String::as_str).collect();
        assert_eq!(touched, ["name", "isolated"]);
        assert_eq!(
            rec.old_values(),
            vec![
                PropertyValue::String("geo".to_string()),
                PropertyValue::Bool(false)
            ]
        );
        assert_eq!(
            rec.new_values(),
            vec![
                PropertyValue::String("topo".to_string()),
                PropertyValue::Bool(true)
            ]
        );
    }

    #[test]
    fn test_recorder_dedupes_touches_keeps_latest_value() {
        let mut rec = ChangeRecorder::new(WorkspaceInfo::new("geo"));
        rec.set("name", PropertyValue::String("a".to_string()))
            .unwrap();
        rec.set("name", PropertyValue::String("b".to_string()))
            .unwrap();
        assert_eq!(rec.property_names().len(), 1);
        assert_eq!(rec.property_names()[0], "name");
        assert_eq!(
            rec.new_values(),
            vec![PropertyValue::String("b".to_string())]
        );
        // Old value is the pristine one, not the intermediate.
        assert_eq!(
            rec.old_values(),
            vec![PropertyValue::String("geo".to_string())]
        );
    }

    #[test]
    fn test_revert_to_pristine_cleans_to_empty_diff() {
        let mut rec = ChangeRecorder::new(WorkspaceInfo::new("geo"));
        rec.set("name", PropertyValue::String("topo".to_string()))
            .unwrap();
        rec.set("name", PropertyValue::String("geo".to_string()))
            .unwrap();
        assert!(rec.diff().clean().is_empty());
    }

    #[test]
    fn test_failed_set_records_nothing() {
        let mut rec = ChangeRecorder::new(WorkspaceInfo::new("geo"));
        assert!(rec.set("bogus", PropertyValue::Bool(true)).is_err());
        assert!(rec.property_names().is_empty());
    }

    #[test]
    fn test_recorder_identifies_itself() {
        let rec = ChangeRecorder::new(WorkspaceInfo::new("geo"));
        assert!(rec.is_change_recorder());
        assert_eq!(Entity::kind(&rec), EntityKind::Workspace);
    }
}
