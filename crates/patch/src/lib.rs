//! Diff/patch engine for catalog entities
//!
//! Two cooperating value types and a recorder:
//! - `PropertyDiff`: old/new change-set with kind-aware no-op detection
//! - `Patch`: target-state assignment list, projected from a diff
//! - `ChangeRecorder`: explicit mutation recording (no dynamic proxying)
//!
//! The repository's update path consumes patches; callers produce them
//! by recording mutations and cleaning the resulting diff.

#![warn(clippy::all)]

pub mod diff;
pub mod patch;
pub mod recorder;

pub use diff::{DiffEntry, PropertyDiff};
pub use patch::Patch;
pub use recorder::ChangeRecorder;
