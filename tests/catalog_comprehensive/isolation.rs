//! Workspace isolation through the wrapper, driven by the thread-local
//! scope provider

use crate::common::init_tracing;
use carta::{
    Catalog, ChangeRecorder, EntityId, EntityKind, IsolatedCatalog, LayerInfo, LocalScope,
    NamespaceInfo, PropertyValue, Query, ResourceInfo, ResourceKind, StoreInfo, StoreKind,
    ThreadLocalScope, WorkspaceInfo,
};
use std::sync::Arc;

struct Fixture {
    view: IsolatedCatalog,
    isolated_ws: EntityId,
    other_ws: EntityId,
    layer: EntityId,
    store: EntityId,
}

fn fixture() -> Fixture {
    init_tracing();
    let catalog = Arc::new(Catalog::new());

    let mut secret = WorkspaceInfo::new("secret");
    secret.isolated = true;
    let isolated_ws = catalog.add_workspace(secret).unwrap().id.clone().unwrap();
    let other_ws = catalog
        .add_workspace(WorkspaceInfo::new("public"))
        .unwrap()
        .id
        .clone()
        .unwrap();

    let ns = catalog
        .add_namespace(NamespaceInfo::new("secret", "http://secret"))
        .unwrap()
        .id
        .clone()
        .unwrap();
    let store = catalog
        .add_store(StoreInfo::new(StoreKind::Data, "pg", isolated_ws.clone()))
        .unwrap()
        .id
        .clone()
        .unwrap();
    let resource = catalog
        .add_resource(ResourceInfo::new(
            ResourceKind::FeatureType,
            "roads",
            ns,
            store.clone(),
        ))
        .unwrap();
    let layer = catalog
        .add_layer(LayerInfo::for_resource(&resource).unwrap())
        .unwrap()
        .id
        .clone()
        .unwrap();

    let view = IsolatedCatalog::new(catalog, Arc::new(ThreadLocalScope));
    Fixture {
        view,
        isolated_ws,
        other_ws,
        layer,
        store,
    }
}

#[test]
fn isolation_truth_table_for_point_lookups() {
    let f = fixture();

    // Outside any request context the layer is reachable.
    ThreadLocalScope::clear();
    assert!(f.view.layer(&f.layer).is_some());

    // A foreign scope hides it; the result is absence, not an error.
    ThreadLocalScope::with(LocalScope::workspace(f.other_ws.clone()), || {
        assert!(f.view.layer(&f.layer).is_none());
        assert!(f.view.store(&f.store).is_none());
    });

    // The matching scope sees it again.
    ThreadLocalScope::with(LocalScope::workspace(f.isolated_ws.clone()), || {
        assert!(f.view.layer(&f.layer).is_some());
        assert!(f.view.store(&f.store).is_some());
    });
}

#[test]
fn isolation_walks_to_the_owning_workspace() {
    // The layer has no workspace field of its own: visibility walks
    // layer → resource → store → workspace.
    let f = fixture();
    ThreadLocalScope::with(LocalScope::workspace(f.other_ws.clone()), || {
        assert!(f.view.layer(&f.layer).is_none());
    });
    ThreadLocalScope::clear();
}

#[test]
fn streams_omit_hidden_entities_silently() {
    let f = fixture();

    ThreadLocalScope::with(LocalScope::workspace(f.other_ws.clone()), || {
        let layers: Vec<_> = f
            .view
            .query_layers(&Query::of(EntityKind::Layer))
            .unwrap()
            .collect();
        assert!(layers.is_empty());

        let published = f
            .view
            .query_published(&Query::of(EntityKind::Published))
            .unwrap()
            .count();
        assert_eq!(published, 0);
    });

    ThreadLocalScope::clear();
    let layers = f
        .view
        .query_layers(&Query::of(EntityKind::Layer))
        .unwrap()
        .count();
    assert_eq!(layers, 1);
}

#[test]
fn marking_a_workspace_isolated_takes_immediate_effect() {
    let f = fixture();
    let catalog = f.view.catalog();

    // The public workspace's content starts visible from elsewhere.
    let store = catalog
        .add_store(StoreInfo::new(StoreKind::Data, "pub-pg", f.other_ws.clone()))
        .unwrap();
    ThreadLocalScope::with(LocalScope::workspace(f.isolated_ws.clone()), || {
        assert!(f.view.store(store.id.as_ref().unwrap()).is_some());
    });

    // Flip the flag through the normal save path.
    let ws = catalog.workspace(&f.other_ws).unwrap();
    let mut rec = ChangeRecorder::new((*ws).clone());
    rec.set("isolated", PropertyValue::Bool(true)).unwrap();
    catalog.save_workspace(&rec).unwrap();

    ThreadLocalScope::with(LocalScope::workspace(f.isolated_ws.clone()), || {
        assert!(f.view.store(store.id.as_ref().unwrap()).is_none());
    });
    ThreadLocalScope::clear();
}

#[test]
fn writes_pass_through_the_wrapper_unfiltered() {
    let f = fixture();
    // Even under a foreign scope, writes against the wrapped catalog
    // land: only reads are filtered.
    ThreadLocalScope::with(LocalScope::workspace(f.other_ws.clone()), || {
        let catalog = f.view.catalog();
        let ws = catalog
            .add_workspace(WorkspaceInfo::new("brand-new"))
            .unwrap();
        assert!(catalog.workspace(ws.id.as_ref().unwrap()).is_some());
    });
    ThreadLocalScope::clear();
}
