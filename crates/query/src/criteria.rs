//! Query criteria
//!
//! A query names the kind it ranges over, a filter, an ordered list of
//! sort directives (empty means provided order), and an offset/limit
//! window applied after filtering and sorting.

use crate::filter::Filter;
use crate::sort::SortBy;
use carta_core::EntityKind;

/// Criteria for a repository or union query
#[derive(Debug, Clone)]
pub struct Query {
    /// Kind the query ranges over (may be a widening kind)
    pub kind: EntityKind,
    /// Filter to apply
    pub filter: Filter,
    /// Sort directives; empty means provided order
    pub sort: Vec<SortBy>,
    /// Number of leading results to skip
    pub offset: Option<usize>,
    /// Maximum number of results to return
    pub limit: Option<usize>,
}

impl Query {
    /// Match-everything query over the given kind
    pub fn of(kind: EntityKind) -> Self {
        Self {
            kind,
            filter: Filter::All,
            sort: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    /// Replace the filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Append a sort directive
    pub fn sort_by(mut self, directive: SortBy) -> Self {
        self.sort.push(directive);
        self
    }

    /// Skip the first `n` results
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Return at most `n` results
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}
