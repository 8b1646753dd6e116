//! Query building blocks for the catalog
//!
//! - `Filter`: match-everything, kind-membership, and/or composition,
//!   plus an opaque caller-supplied predicate
//! - `SortBy` / `SortComparator`: ordered sort directives and stable
//!   chained comparison with absent-before-present ranking
//! - `Query`: criteria (kind, filter, sort, offset/limit)
//! - `EntityStream`: must-close result stream
//! - `query_union`: lazy merge-sorted union of two member repositories

#![warn(clippy::all)]

pub mod criteria;
pub mod filter;
pub mod merge;
pub mod sort;
pub mod stream;

pub use criteria::Query;
pub use filter::Filter;
pub use merge::{query_union, MergeSide};
pub use sort::{validate_sort, RefResolver, SortBy, SortComparator};
pub use stream::EntityStream;
