//! Query filters
//!
//! The core treats predicate evaluation as a black box: an opaque
//! boolean function of the entity. The only shape it inspects is the
//! "is one of these kinds" disjunction, which the merge engine splits
//! into one filter per union member.

use carta_core::entity::Entity;
use carta_core::EntityKind;
use std::fmt;
use std::sync::Arc;

/// Filter over entities
#[derive(Clone)]
pub enum Filter {
    /// Matches everything
    All,
    /// Matches entities of a kind (or any of its narrowings)
    KindIs(EntityKind),
    /// Conjunction
    AllOf(Vec<Filter>),
    /// Disjunction
    AnyOf(Vec<Filter>),
    /// Opaque predicate supplied by the caller
    Predicate(Arc<dyn Fn(&dyn Entity) -> bool + Send + Sync>),
}

impl Filter {
    /// Wrap an opaque predicate
    pub fn predicate(f: impl Fn(&dyn Entity) -> bool + Send + Sync + 'static) -> Self {
        Filter::Predicate(Arc::new(f))
    }

    /// Whether this is the match-everything filter
    ///
    /// Used by the count cheap path: an all-filter count sums bucket
    /// sizes instead of scanning.
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// Evaluate against an entity
    pub fn matches(&self, entity: &dyn Entity) -> bool {
        match self {
            Filter::All => true,
            Filter::KindIs(kind) => entity.kind().is_assignable_to(*kind),
            Filter::AllOf(parts) => parts.iter().all(|f| f.matches(entity)),
            Filter::AnyOf(parts) => parts.iter().any(|f| f.matches(entity)),
            Filter::Predicate(f) => f(entity),
        }
    }

    /// Recognize an "is one of these kinds" disjunction over the given
    /// member kinds and split it into one filter per member
    ///
    /// Recognized shapes:
    /// - `KindIs(m)` for a single member
    /// - `AnyOf(arms)` where every arm is either `KindIs(m)` or an
    ///   `AllOf` containing exactly one `KindIs(m)` (the remaining
    ///   conjuncts become that member's residual filter)
    ///
    /// Returns `None` when the shape is not recognized (the caller then
    /// applies the whole filter to every member unmodified), or when a
    /// member appears in more than one arm.
    pub fn split_kind_disjunction(
        &self,
        members: &[EntityKind],
    ) -> Option<Vec<(EntityKind, Filter)>> {
        let arms: Vec<&Filter> = match self {
            Filter::KindIs(_) => vec![self],
            Filter::AnyOf(arms) => arms.iter().collect(),
            _ => return None,
        };
        let mut split = Vec::with_capacity(arms.len());
        for arm in arms {
            let (kind, residual) = split_arm(arm, members)?;
            if split.iter().any(|(k, _)| *k == kind) {
                return None;
            }
            split.push((kind, residual));
        }
        Some(split)
    }
}

fn split_arm(arm: &Filter, members: &[EntityKind]) -> Option<(EntityKind, Filter)> {
    match arm {
        Filter::KindIs(kind) if members.contains(kind) => Some((*kind, Filter::All)),
        Filter::AllOf(parts) => {
            let mut kind = None;
            let mut rest = Vec::new();
            for part in parts {
                match part {
                    Filter::KindIs(k) if members.contains(k) && kind.is_none() => {
                        kind = Some(*k);
                    }
                    _ => rest.push(part.clone()),
                }
            }
            let kind = kind?;
            let residual = match rest.len() {
                0 => Filter::All,
                1 => rest.into_iter().next().unwrap_or(Filter::All),
                _ => Filter::AllOf(rest),
            };
            Some((kind, residual))
        }
        _ => None,
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "All"),
            Filter::KindIs(kind) => write!(f, "KindIs({})", kind),
            Filter::AllOf(parts) => f.debug_tuple("AllOf").field(parts).finish(),
            Filter::AnyOf(parts) => f.debug_tuple("AnyOf").field(parts).finish(),
            Filter::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carta_core::property::PropertyAccess;
    use carta_core::{EntityId, LayerGroupInfo, LayerInfo, ScopedName, WorkspaceInfo};

    fn layer() -> LayerInfo {
        LayerInfo::new(
            EntityId::new("ft1"),
            ScopedName::scoped(EntityId::new("ns1"), "roads"),
        )
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(Filter::All.matches(&layer()));
        assert!(Filter::All.matches(&WorkspaceInfo::new("geo")));
    }

    #[test]
    fn test_kind_filter_respects_widening() {
        let published = Filter::KindIs(EntityKind::Published);
        assert!(published.matches(&layer()));
        assert!(published.matches(&LayerGroupInfo::new("basemap")));
        assert!(!published.matches(&WorkspaceInfo::new("geo")));
    }

    #[test]
    fn test_predicate_is_opaque_but_evaluated() {
        let enabled = Filter::predicate(|e| {
            e.get_property("enabled").and_then(|v| v.as_bool()) == Some(true)
        });
        let mut l = layer();
        assert!(enabled.matches(&l));
        l.enabled = false;
        assert!(!enabled.matches(&l));
    }

    #[test]
    fn test_split_plain_kind_disjunction() {
        let members = [EntityKind::Layer, EntityKind::LayerGroup];
        let filter = Filter::AnyOf(vec![
            Filter::KindIs(EntityKind::Layer),
            Filter::KindIs(EntityKind::LayerGroup),
        ]);
        let split = filter.split_kind_disjunction(&members).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].0, EntityKind::Layer);
        assert!(split[0].1.is_all());
    }

    #[test]
    fn test_split_keeps_residual_conjuncts() {
        let members = [EntityKind::Layer, EntityKind::LayerGroup];
        let filter = Filter::AnyOf(vec![
            Filter::AllOf(vec![
                Filter::KindIs(EntityKind::Layer),
                Filter::predicate(|_| true),
            ]),
            Filter::KindIs(EntityKind::LayerGroup),
        ]);
        let split = filter.split_kind_disjunction(&members).unwrap();
        assert!(matches!(split[0].1, Filter::Predicate(_)));
        assert!(split[1].1.is_all());
    }

    #[test]
    fn test_split_single_kind() {
        let members = [EntityKind::Layer, EntityKind::LayerGroup];
        let split = Filter::KindIs(EntityKind::Layer)
            .split_kind_disjunction(&members)
            .unwrap();
        assert_eq!(split.len(), 1);
        assert_eq!(split[0].0, EntityKind::Layer);
    }

    #[test]
    fn test_split_rejects_unrecognized_shapes() {
        let members = [EntityKind::Layer, EntityKind::LayerGroup];
        assert!(Filter::All.split_kind_disjunction(&members).is_none());
        assert!(Filter::predicate(|_| true)
            .split_kind_disjunction(&members)
            .is_none());
        // Same member twice: ambiguous, not recognized.
        let dup = Filter::AnyOf(vec![
            Filter::KindIs(EntityKind::Layer),
            Filter::KindIs(EntityKind::Layer),
        ]);
        assert!(dup.split_kind_disjunction(&members).is_none());
        // Arm over a kind outside the union.
        let foreign = Filter::AnyOf(vec![
            Filter::KindIs(EntityKind::Layer),
            Filter::KindIs(EntityKind::Style),
        ]);
        assert!(foreign.split_kind_disjunction(&members).is_none());
    }
}
