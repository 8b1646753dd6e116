//! Merge-sorted union queries
//!
//! A query over the `Published` union ranges over two repositories that
//! store different kinds. Each side is queried independently and the
//! two sorted sub-streams are merged lazily — one comparator call per
//! step. Offset and limit are deferred until after the merge whenever
//! both sides contribute: clipping one side's window before merging
//! could wrongly drop items at the result boundary.

use crate::criteria::Query;
use crate::filter::Filter;
use crate::sort::{SortBy, SortComparator};
use crate::stream::EntityStream;
use carta_core::entity::Entity;
use carta_core::{EntityKind, Result};
use tracing::debug;

/// One member of a union query
///
/// Implemented by the facade over each member repository. `query` must
/// return results already sorted by the given directives.
pub trait MergeSide<U> {
    /// The member kind this side stores
    fn member_kind(&self) -> EntityKind;

    /// Count matches without materializing them
    fn count(&self, filter: &Filter) -> usize;

    /// Query this side, sorted by `sort`, windowed by `offset`/`limit`
    ///
    /// # Errors
    ///
    /// Propagates the underlying repository's query errors
    /// (e.g. `UnsupportedSort`).
    fn query(
        &self,
        filter: &Filter,
        sort: &[SortBy],
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Result<EntityStream<U>>;
}

/// Execute a union query over two member sides
///
/// The filter is split per member when it matches the "is one of these
/// kinds" disjunction shape; otherwise both sides see it unmodified. A
/// missing sort directive is replaced by ascending-by-id, since the
/// merge needs a well-defined total order. An empty side short-circuits:
/// the window is pushed down to the other side's query and no merge
/// runs.
///
/// # Errors
///
/// Propagates sub-query errors.
pub fn query_union<U, L, R>(left: &L, right: &R, query: &Query) -> Result<EntityStream<U>>
where
    U: Entity,
    L: MergeSide<U> + ?Sized,
    R: MergeSide<U> + ?Sized,
{
    let members = [left.member_kind(), right.member_kind()];
    let (left_filter, right_filter) = match query.filter.split_kind_disjunction(&members) {
        Some(split) => {
            let pick = |kind: EntityKind| {
                split
                    .iter()
                    .find(|(k, _)| *k == kind)
                    .map(|(_, f)| f.clone())
            };
            (pick(members[0]), pick(members[1]))
        }
        None => (Some(query.filter.clone()), Some(query.filter.clone())),
    };

    // The merge step needs a total order.
    let sort = if query.sort.is_empty() {
        vec![SortBy::asc("id")]
    } else {
        query.sort.clone()
    };

    let left_count = left_filter.as_ref().map_or(0, |f| left.count(f));
    let right_count = right_filter.as_ref().map_or(0, |f| right.count(f));
    debug!(
        left = left_count,
        right = right_count,
        "union query sub-result counts"
    );

    match (left_count, right_count) {
        (0, 0) => Ok(EntityStream::empty()),
        (0, _) => {
            let filter = right_filter.unwrap_or(Filter::All);
            right.query(&filter, &sort, query.offset, query.limit)
        }
        (_, 0) => {
            let filter = left_filter.unwrap_or(Filter::All);
            left.query(&filter, &sort, query.offset, query.limit)
        }
        _ => {
            // Both sides contribute: defer the window until after the
            // merge.
            let left_stream = left.query(
                &left_filter.unwrap_or(Filter::All),
                &sort,
                None,
                None,
            )?;
            let right_stream = right.query(
                &right_filter.unwrap_or(Filter::All),
                &sort,
                None,
                None,
            )?;
            let merged = MergedStream::new(
                left_stream,
                right_stream,
                SortComparator::new(sort),
                query.offset.unwrap_or(0),
                query.limit,
            );
            Ok(EntityStream::new(merged))
        }
    }
}

/// Lazy two-way merge of sorted sub-streams
///
/// Dropping the merged stream drops (and thereby closes) both
/// sub-streams; that is the only trigger that releases them.
struct MergedStream<U: Entity> {
    left: EntityStream<U>,
    right: EntityStream<U>,
    left_head: Option<U>,
    right_head: Option<U>,
    comparator: SortComparator,
    to_skip: usize,
    remaining: Option<usize>,
}

impl<U: Entity> MergedStream<U> {
    fn new(
        left: EntityStream<U>,
        right: EntityStream<U>,
        comparator: SortComparator,
        to_skip: usize,
        remaining: Option<usize>,
    ) -> Self {
        Self {
            left,
            right,
            left_head: None,
            right_head: None,
            comparator,
            to_skip,
            remaining,
        }
    }

    fn pull(&mut self) -> Option<U> {
        if self.left_head.is_none() {
            self.left_head = self.left.next();
        }
        if self.right_head.is_none() {
            self.right_head = self.right.next();
        }
        match (&self.left_head, &self.right_head) {
            (None, None) => None,
            (Some(_), None) => self.left_head.take(),
            (None, Some(_)) => self.right_head.take(),
            (Some(l), Some(r)) => {
                // One comparator call per step; ties go left, so equal
                // elements keep their side order.
                if self.comparator.compare(l, r) == std::cmp::Ordering::Greater {
                    self.right_head.take()
                } else {
                    self.left_head.take()
                }
            }
        }
    }
}

impl<U: Entity> Iterator for MergedStream<U> {
    type Item = U;

    fn next(&mut self) -> Option<U> {
        if self.remaining == Some(0) {
            return None;
        }
        loop {
            let item = self.pull()?;
            if self.to_skip > 0 {
                self.to_skip -= 1;
                continue;
            }
            if let Some(n) = self.remaining.as_mut() {
                *n -= 1;
            }
            return Some(item);
        }
    }
}

impl<U: Entity> Drop for MergedStream<U> {
    fn drop(&mut self) {
        self.left.close();
        self.right.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carta_core::{
        EntityId, LayerGroupInfo, LayerInfo, PublishedInfo, ScopedName,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn layer(id: &str, name: &str) -> PublishedInfo {
        let mut l = LayerInfo::new(
            EntityId::new(format!("ft-{}", id)),
            ScopedName::scoped(EntityId::new("ns1"), name),
        );
        l.id = Some(EntityId::new(id));
        PublishedInfo::Layer(l)
    }

    fn group(id: &str, name: &str) -> PublishedInfo {
        let mut g = LayerGroupInfo::new(name);
        g.id = Some(EntityId::new(id));
        PublishedInfo::Group(g)
    }

    /// Test side backed by a vector, pre-sorted on demand.
    struct VecSide {
        kind: EntityKind,
        items: Vec<PublishedInfo>,
        closes: Arc<AtomicUsize>,
    }

    impl VecSide {
        fn new(kind: EntityKind, items: Vec<PublishedInfo>) -> Self {
            Self {
                kind,
                items,
                closes: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl MergeSide<PublishedInfo> for VecSide {
        fn member_kind(&self) -> EntityKind {
            self.kind
        }

        fn count(&self, filter: &Filter) -> usize {
            self.items.iter().filter(|i| filter.matches(*i as &dyn Entity)).count()
        }

        fn query(
            &self,
            filter: &Filter,
            sort: &[SortBy],
            offset: Option<usize>,
            limit: Option<usize>,
        ) -> Result<EntityStream<PublishedInfo>> {
            let mut matched: Vec<PublishedInfo> = self
                .items
                .iter()
                .filter(|i| filter.matches(*i as &dyn Entity))
                .cloned()
                .collect();
            let comparator = SortComparator::new(sort.to_vec());
            matched.sort_by(|a, b| comparator.compare(a, b));
            let matched: Vec<PublishedInfo> = matched
                .into_iter()
                .skip(offset.unwrap_or(0))
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            let closes = self.closes.clone();
            Ok(EntityStream::from_vec(matched).on_close(move || {
                closes.fetch_add(1, Ordering::SeqCst);
            }))
        }
    }

    #[test]
    fn test_merge_is_globally_sorted_and_complete() {
        let layers = VecSide::new(
            EntityKind::Layer,
            vec![layer("2", "b"), layer("4", "d"), layer("6", "f")],
        );
        let groups = VecSide::new(
            EntityKind::LayerGroup,
            vec![group("1", "a"), group("3", "c"), group("5", "e")],
        );
        let query = Query::of(EntityKind::Published).sort_by(SortBy::asc("name"));
        let merged: Vec<String> = query_union(&layers, &groups, &query)
            .unwrap()
            .map(|p| p.local_name().to_string())
            .collect();
        assert_eq!(merged, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_missing_sort_falls_back_to_id() {
        let layers = VecSide::new(EntityKind::Layer, vec![layer("4", "x"), layer("2", "y")]);
        let groups = VecSide::new(EntityKind::LayerGroup, vec![group("3", "z"), group("1", "w")]);
        let query = Query::of(EntityKind::Published);
        let ids: Vec<String> = query_union(&layers, &groups, &query)
            .unwrap()
            .map(|p| p.id().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_window_is_deferred_past_the_merge() {
        let layers = VecSide::new(
            EntityKind::Layer,
            vec![layer("1", "a"), layer("3", "c")],
        );
        let groups = VecSide::new(
            EntityKind::LayerGroup,
            vec![group("2", "b"), group("4", "d")],
        );
        // offset 1, limit 2 over the merged order a,b,c,d → b,c. A
        // pre-merge clip of either side would lose b or c.
        let query = Query::of(EntityKind::Published)
            .sort_by(SortBy::asc("name"))
            .offset(1)
            .limit(2);
        let merged: Vec<String> = query_union(&layers, &groups, &query)
            .unwrap()
            .map(|p| p.local_name().to_string())
            .collect();
        assert_eq!(merged, vec!["b", "c"]);
    }

    #[test]
    fn test_empty_side_short_circuits_with_pushdown() {
        let layers = VecSide::new(EntityKind::Layer, vec![]);
        let groups = VecSide::new(
            EntityKind::LayerGroup,
            vec![group("1", "a"), group("2", "b"), group("3", "c")],
        );
        let query = Query::of(EntityKind::Published)
            .sort_by(SortBy::asc("name"))
            .offset(1)
            .limit(1);
        let merged: Vec<String> = query_union(&layers, &groups, &query)
            .unwrap()
            .map(|p| p.local_name().to_string())
            .collect();
        assert_eq!(merged, vec!["b"]);
    }

    #[test]
    fn test_kind_disjunction_splits_per_side() {
        let layers = VecSide::new(EntityKind::Layer, vec![layer("1", "a")]);
        let groups = VecSide::new(EntityKind::LayerGroup, vec![group("2", "b")]);
        let query = Query::of(EntityKind::Published)
            .with_filter(Filter::KindIs(EntityKind::LayerGroup));
        let merged: Vec<String> = query_union(&layers, &groups, &query)
            .unwrap()
            .map(|p| p.local_name().to_string())
            .collect();
        assert_eq!(merged, vec!["b"]);
    }

    #[test]
    fn test_closing_merged_stream_closes_both_sides() {
        let layers = VecSide::new(EntityKind::Layer, vec![layer("1", "a")]);
        let groups = VecSide::new(EntityKind::LayerGroup, vec![group("2", "b")]);
        let left_closes = layers.closes.clone();
        let right_closes = groups.closes.clone();

        let query = Query::of(EntityKind::Published).sort_by(SortBy::asc("name"));
        let mut merged = query_union(&layers, &groups, &query).unwrap();
        assert!(merged.next().is_some());
        merged.close();
        assert_eq!(left_closes.load(Ordering::SeqCst), 1);
        assert_eq!(right_closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_merged_count_matches_sum_of_sides() {
        let layers = VecSide::new(
            EntityKind::Layer,
            vec![layer("1", "a"), layer("2", "b")],
        );
        let groups = VecSide::new(
            EntityKind::LayerGroup,
            vec![group("3", "c"), group("4", "d"), group("5", "e")],
        );
        let query = Query::of(EntityKind::Published).sort_by(SortBy::asc("name"));
        let total = query_union(&layers, &groups, &query).unwrap().count();
        assert_eq!(total, 5);
    }
}
