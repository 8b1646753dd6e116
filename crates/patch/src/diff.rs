//! Property diffs
//!
//! A diff is an ordered list of (property, old, new) triples with
//! kind-aware no-op detection. Diffs are built either from the matched
//! change lists of a [`crate::ChangeRecorder`] or by comparing two
//! instances over the kind's declared schema.
//!
//! Values entering a diff are owned copies, so later mutation of the
//! live object never changes an already-built diff.

use crate::patch::Patch;
use carta_core::property::{properties, PropertyAccess, PropertyValue};
use carta_core::EntityKind;

/// One (property, old, new) change triple
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    /// Property name
    pub property: String,
    /// Value before the change
    pub old: PropertyValue,
    /// Value after the change
    pub new: PropertyValue,
}

impl DiffEntry {
    /// Whether this triple changes nothing
    ///
    /// A triple is a no-op when the values are equal; when both sides
    /// are collections or maps and both are empty-or-absent; when both
    /// sides are human-readable text and both are empty-or-absent; or
    /// when both sides are spatial reference idents resolving to the
    /// same canonical code with metadata-equivalent definitions.
    pub fn is_noop(&self) -> bool {
        if self.old == self.new {
            return true;
        }
        if collection_blank(&self.old) && collection_blank(&self.new) {
            return true;
        }
        if text_blank(&self.old) && text_blank(&self.new) {
            return true;
        }
        if let (PropertyValue::Srs(a), PropertyValue::Srs(b)) = (&self.old, &self.new) {
            return a.same_reference(b);
        }
        false
    }
}

// Empty and absent are equivalent for collection-typed values, and only
// for them.
fn collection_blank(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Null => true,
        PropertyValue::List(items) => items.is_empty(),
        PropertyValue::Map(entries) => entries.is_empty(),
        _ => false,
    }
}

fn text_blank(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Null => true,
        PropertyValue::Text(t) => t.is_blank(),
        _ => false,
    }
}

/// An ordered old/new change-set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDiff {
    entries: Vec<DiffEntry>,
}

impl PropertyDiff {
    /// An empty diff
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a diff from matched change lists
    ///
    /// The three lists must be parallel: entry `i` of each describes the
    /// same mutation. Mismatched lengths are a programming error.
    pub fn new(
        names: Vec<String>,
        old_values: Vec<PropertyValue>,
        new_values: Vec<PropertyValue>,
    ) -> Self {
        assert_eq!(names.len(), old_values.len(), "change lists must be parallel");
        assert_eq!(names.len(), new_values.len(), "change lists must be parallel");
        let entries = names
            .into_iter()
            .zip(old_values)
            .zip(new_values)
            .map(|((property, old), new)| DiffEntry { property, old, new })
            .collect();
        Self { entries }
    }

    /// Build a diff by comparing two instances over the kind's schema
    ///
    /// Only declared, readable properties participate; `id` is skipped
    /// (it is not patchable).
    pub fn between(
        kind: EntityKind,
        before: &dyn PropertyAccess,
        after: &dyn PropertyAccess,
    ) -> Self {
        let mut entries = Vec::new();
        for descriptor in properties(kind) {
            if descriptor.name == "id" {
                continue;
            }
            let old = before
                .get_property(descriptor.name)
                .unwrap_or(PropertyValue::Null);
            let new = after
                .get_property(descriptor.name)
                .unwrap_or(PropertyValue::Null);
            if old != new {
                entries.push(DiffEntry {
                    property: descriptor.name.to_string(),
                    old,
                    new,
                });
            }
        }
        Self { entries }
    }

    /// Drop all no-op triples
    pub fn clean(mut self) -> Self {
        self.entries.retain(|e| !e.is_noop());
        self
    }

    /// Whether the diff carries no triples
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The triples, in order
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    /// Project to a patch by discarding the old values
    ///
    /// A patch only describes the target state, which is all a storage
    /// backend needs to apply the update.
    pub fn to_patch(&self) -> Patch {
        let mut patch = Patch::new();
        for entry in &self.entries {
            patch.set(entry.property.clone(), entry.new.clone());
        }
        patch
    }
}
