//! Shared test fixtures for the integration suite

#![allow(dead_code)]

use carta::{
    Catalog, EntityId, LayerGroupInfo, LayerInfo, NamespaceInfo, PublishedRef, ResourceInfo,
    ResourceKind, StoreInfo, StoreKind, StyleInfo, WorkspaceInfo,
};
use std::sync::{Arc, Once};

static INIT_TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A small but fully-linked catalog: one workspace, one namespace, a
/// data store with two resources and layers, a layer group, a style.
pub struct Seeded {
    pub catalog: Arc<Catalog>,
    pub ws: EntityId,
    pub ns: EntityId,
    pub store: EntityId,
    pub roads: EntityId,
    pub rivers: EntityId,
    pub roads_layer: EntityId,
    pub rivers_layer: EntityId,
    pub group: EntityId,
    pub style: EntityId,
}

pub fn seeded() -> Seeded {
    init_tracing();
    let catalog = Arc::new(Catalog::new());

    let ws = catalog
        .add_workspace(WorkspaceInfo::new("geo"))
        .unwrap()
        .id
        .clone()
        .unwrap();
    let ns = catalog
        .add_namespace(NamespaceInfo::new("geo", "http://example.com/geo"))
        .unwrap()
        .id
        .clone()
        .unwrap();
    let store = catalog
        .add_store(StoreInfo::new(StoreKind::Data, "pg", ws.clone()))
        .unwrap()
        .id
        .clone()
        .unwrap();

    let mut ids = Vec::new();
    for name in ["roads", "rivers"] {
        let resource = catalog
            .add_resource(ResourceInfo::new(
                ResourceKind::FeatureType,
                name,
                ns.clone(),
                store.clone(),
            ))
            .unwrap();
        let layer = catalog
            .add_layer(LayerInfo::for_resource(&resource).unwrap())
            .unwrap();
        ids.push((resource.id.clone().unwrap(), layer.id.clone().unwrap()));
    }

    let style = catalog
        .add_style(StyleInfo::new("simple"))
        .unwrap()
        .id
        .clone()
        .unwrap();

    let mut group = LayerGroupInfo::new("basemap");
    group.layers.push(PublishedRef::Layer(ids[0].1.clone()));
    group.styles.push(None);
    let group = catalog
        .add_layer_group(group)
        .unwrap()
        .id
        .clone()
        .unwrap();

    let (roads, roads_layer) = ids[0].clone();
    let (rivers, rivers_layer) = ids[1].clone();
    Seeded {
        catalog,
        ws,
        ns,
        store,
        roads,
        rivers,
        roads_layer,
        rivers_layer,
        group,
        style,
    }
}
