//! Registry dispatch, default pointers, relocation, sync, bulk load

use crate::common::{init_tracing, seeded};
use carta::{
    Catalog, CatalogError, EntityId, EntityKind, ErasedRepository, Filter, NamespaceInfo,
    StoreInfo, StoreKind, WorkspaceInfo,
};

#[test]
fn registry_serves_narrower_kinds_recursively() {
    let s = seeded();
    let registry = s.catalog.registry();
    assert!(registry.is_registered(EntityKind::Store));
    assert!(registry.is_registered(EntityKind::DataStore));
    assert!(registry.is_registered(EntityKind::CoverageStore));

    // The same handler answers for the widening kind and both
    // narrowings.
    let wide = registry.get(EntityKind::Store).unwrap();
    assert_eq!(wide.count(EntityKind::DataStore, &Filter::All), 1);
    assert_eq!(wide.count(EntityKind::Store, &Filter::All), 1);
}

#[test]
fn published_is_not_a_registered_kind() {
    let s = seeded();
    assert!(!s.catalog.registry().is_registered(EntityKind::Published));
    let err = s
        .catalog
        .update(
            EntityKind::Published,
            &EntityId::new("x"),
            &carta::Patch::new(),
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::UnknownKind(_)));
}

#[test]
fn defaults_are_validated_and_survive_lookup() {
    let s = seeded();
    let ws = s.catalog.workspace(&s.ws).unwrap();
    let store = s.catalog.store(&s.store).unwrap();

    s.catalog.set_default_workspace(Some(&ws)).unwrap();
    s.catalog.set_default_store(&s.ws, Some(&store)).unwrap();
    assert_eq!(s.catalog.default_workspace().unwrap().id, Some(s.ws.clone()));
    assert_eq!(
        s.catalog.default_store(&s.ws).unwrap().id,
        Some(s.store.clone())
    );

    // A never-added workspace cannot become the default.
    let mut ghost = WorkspaceInfo::new("ghost");
    ghost.id = Some(EntityId::new("ghost"));
    assert!(matches!(
        s.catalog.set_default_workspace(Some(&ghost)),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn namespace_uri_secondary_index_tracks_updates() {
    let s = seeded();
    assert_eq!(
        s.catalog.namespaces_by_uri("http://example.com/geo").len(),
        1
    );

    let ns = s.catalog.namespace(&s.ns).unwrap();
    let mut rec = carta::ChangeRecorder::new((*ns).clone());
    rec.set(
        "uri",
        carta::PropertyValue::String("http://example.com/terra".to_string()),
    )
    .unwrap();
    s.catalog.save_namespace(&rec).unwrap();

    assert!(s.catalog.namespaces_by_uri("http://example.com/geo").is_empty());
    assert_eq!(
        s.catalog
            .namespaces_by_uri("http://example.com/terra")
            .len(),
        1
    );
}

#[test]
fn relocate_store_cascades_and_reindexes() {
    let s = seeded();
    let target_ws = s
        .catalog
        .add_workspace(WorkspaceInfo::new("terra"))
        .unwrap()
        .id
        .clone()
        .unwrap();
    let target_ns = s
        .catalog
        .add_namespace(NamespaceInfo::new("terra", "http://terra"))
        .unwrap()
        .id
        .clone()
        .unwrap();

    s.catalog
        .relocate_store(&s.store, &target_ws, &target_ns)
        .unwrap();

    assert!(s.catalog.store_by_name(&target_ws, "pg").is_some());
    assert!(s.catalog.store_by_name(&s.ws, "pg").is_none());
    for resource in s.catalog.resources_by_store(&s.store) {
        assert_eq!(resource.namespace, target_ns);
    }
    // Dependent layers moved with their resources' new scope.
    let layers = s.catalog.layers_by_resource(&s.roads);
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].name.scope, Some(target_ns.clone()));
}

#[test]
fn sync_to_copies_content_and_defaults() {
    let s = seeded();
    let ws = s.catalog.workspace(&s.ws).unwrap();
    s.catalog.set_default_workspace(Some(&ws)).unwrap();

    let dest = Catalog::new();
    s.catalog.sync_to(&dest);

    assert!(dest.workspace(&s.ws).is_some());
    assert!(dest.store(&s.store).is_some());
    assert!(dest.layer(&s.roads_layer).is_some());
    assert_eq!(
        dest.namespaces_by_uri("http://example.com/geo").len(),
        1
    );
    assert_eq!(dest.default_workspace().unwrap().id, Some(s.ws.clone()));
    assert_eq!(
        dest.count(EntityKind::Published, &Filter::All).unwrap(),
        s.catalog.count(EntityKind::Published, &Filter::All).unwrap()
    );
}

#[test]
fn export_import_round_trips_full_content() {
    let s = seeded();
    let json = s.catalog.export_json().unwrap();

    // The export is a plain document with one section per kind.
    let document: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(document["workspaces"].as_array().unwrap().len(), 1);
    assert_eq!(document["layers"].as_array().unwrap().len(), 2);

    init_tracing();
    let dest = Catalog::new();
    let dangling = dest.import_json(&json).unwrap();
    assert!(dangling.is_empty());
    assert_eq!(dest.export(), s.catalog.export());
}

#[test]
fn import_tolerates_dangling_references() {
    init_tracing();
    let catalog = Catalog::new();
    let store = StoreInfo::new(StoreKind::Data, "orphan", EntityId::new("ws-missing"));
    let stored = catalog.add_store(store).unwrap();

    let resolver = carta::CatalogResolver::new(&catalog);
    let dangling = catalog.resolve_references(&resolver).unwrap();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].kind, EntityKind::DataStore);

    // The placeholder is left in place; the store stays usable by id.
    let after = catalog.store(stored.id.as_ref().unwrap()).unwrap();
    assert_eq!(after.workspace, EntityId::new("ws-missing"));
}
