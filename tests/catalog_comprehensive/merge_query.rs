//! Merged Published queries through the facade

use crate::common::{init_tracing, seeded};
use carta::{
    Catalog, Entity, EntityKind, Filter, LayerGroupInfo, LayerInfo, NamespaceInfo,
    PropertyAccess, PublishedInfo, Query, ResourceInfo, ResourceKind, SortBy, StoreInfo,
    StoreKind, WorkspaceInfo,
};
use std::sync::Arc;

/// Catalog with interleaving layer and group names for merge checks.
fn merged_fixture() -> Arc<Catalog> {
    init_tracing();
    let catalog = Arc::new(Catalog::new());
    let ws = catalog
        .add_workspace(WorkspaceInfo::new("geo"))
        .unwrap()
        .id
        .clone()
        .unwrap();
    let ns = catalog
        .add_namespace(NamespaceInfo::new("geo", "http://geo"))
        .unwrap()
        .id
        .clone()
        .unwrap();
    let store = catalog
        .add_store(StoreInfo::new(StoreKind::Data, "pg", ws))
        .unwrap()
        .id
        .clone()
        .unwrap();
    for name in ["alpha", "charlie", "echo"] {
        let resource = catalog
            .add_resource(ResourceInfo::new(
                ResourceKind::FeatureType,
                name,
                ns.clone(),
                store.clone(),
            ))
            .unwrap();
        catalog
            .add_layer(LayerInfo::for_resource(&resource).unwrap())
            .unwrap();
    }
    for name in ["bravo", "delta", "foxtrot"] {
        catalog.add_layer_group(LayerGroupInfo::new(name)).unwrap();
    }
    catalog
}

fn names(stream: impl Iterator<Item = PublishedInfo>) -> Vec<String> {
    stream.map(|p| p.local_name().to_string()).collect()
}

#[test]
fn merged_stream_is_globally_sorted() {
    let catalog = merged_fixture();
    let query = Query::of(EntityKind::Published).sort_by(SortBy::asc("name"));
    let merged = names(catalog.query_published(&query).unwrap());
    assert_eq!(
        merged,
        vec!["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"]
    );
}

#[test]
fn merged_count_is_sum_of_members() {
    let catalog = merged_fixture();
    assert_eq!(
        catalog.count(EntityKind::Published, &Filter::All).unwrap(),
        6
    );
    let query = Query::of(EntityKind::Published).sort_by(SortBy::asc("name"));
    assert_eq!(catalog.query_published(&query).unwrap().count(), 6);
}

#[test]
fn window_applies_after_the_merge() {
    let catalog = merged_fixture();
    let query = Query::of(EntityKind::Published)
        .sort_by(SortBy::asc("name"))
        .offset(1)
        .limit(3);
    let merged = names(catalog.query_published(&query).unwrap());
    // A pre-merge clip of either member would drop one of these.
    assert_eq!(merged, vec!["bravo", "charlie", "delta"]);
}

#[test]
fn descending_sort_reverses_the_merge() {
    let catalog = merged_fixture();
    let query = Query::of(EntityKind::Published).sort_by(SortBy::desc("name"));
    let merged = names(catalog.query_published(&query).unwrap());
    assert_eq!(
        merged,
        vec!["foxtrot", "echo", "delta", "charlie", "bravo", "alpha"]
    );
}

#[test]
fn no_sort_directive_falls_back_to_id_order() {
    let catalog = merged_fixture();
    let ids: Vec<String> = catalog
        .query_published(&Query::of(EntityKind::Published))
        .unwrap()
        .map(|p| p.id().unwrap().to_string())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 6);
}

#[test]
fn kind_membership_filter_selects_one_side() {
    let catalog = merged_fixture();
    let query = Query::of(EntityKind::Published)
        .with_filter(Filter::KindIs(EntityKind::LayerGroup))
        .sort_by(SortBy::asc("name"));
    let merged = names(catalog.query_published(&query).unwrap());
    assert_eq!(merged, vec!["bravo", "delta", "foxtrot"]);
}

#[test]
fn kind_disjunction_splits_with_residuals() {
    let catalog = merged_fixture();
    // Layers named < "d", plus every group: the disjunction splits per
    // member and the residual predicate stays on the layer side.
    let filter = Filter::AnyOf(vec![
        Filter::AllOf(vec![
            Filter::KindIs(EntityKind::Layer),
            Filter::predicate(|e| {
                e.get_property("name")
                    .and_then(|v| v.as_str().map(|s| s < "d"))
                    .unwrap_or(false)
            }),
        ]),
        Filter::KindIs(EntityKind::LayerGroup),
    ]);
    let query = Query::of(EntityKind::Published)
        .with_filter(filter)
        .sort_by(SortBy::asc("name"));
    let merged = names(catalog.query_published(&query).unwrap());
    assert_eq!(merged, vec!["alpha", "bravo", "charlie", "delta", "foxtrot"]);
}

#[test]
fn opaque_filter_applies_to_both_sides() {
    let catalog = merged_fixture();
    let filter = Filter::predicate(|e| {
        e.get_property("name")
            .and_then(|v| v.as_str().map(|s| s.contains('o')))
            .unwrap_or(false)
    });
    let query = Query::of(EntityKind::Published)
        .with_filter(filter)
        .sort_by(SortBy::asc("name"));
    let merged = names(catalog.query_published(&query).unwrap());
    assert_eq!(merged, vec!["bravo", "echo", "foxtrot"]);
}

#[test]
fn unsupported_sort_is_rejected_before_execution() {
    let catalog = merged_fixture();
    let query = Query::of(EntityKind::Published).sort_by(SortBy::asc("styles"));
    assert!(catalog.query_published(&query).is_err());
}

#[test]
fn empty_union_yields_empty_stream() {
    let s = seeded();
    let none = Filter::predicate(|_| false);
    let query = Query::of(EntityKind::Published).with_filter(none);
    assert_eq!(s.catalog.query_published(&query).unwrap().count(), 0);
}

#[test]
fn closing_the_merged_stream_is_safe_mid_iteration() {
    let catalog = merged_fixture();
    let query = Query::of(EntityKind::Published).sort_by(SortBy::asc("name"));
    let mut stream = catalog.query_published(&query).unwrap();
    assert!(stream.next().is_some());
    stream.close();
    assert!(stream.next().is_none());
}
