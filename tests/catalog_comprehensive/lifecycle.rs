//! Entity lifecycle: add, index agreement, rename, remove, orphans

use crate::common::{seeded, init_tracing};
use carta::{
    Catalog, ChangeRecorder, EntityId, EntityKind, PropertyValue, ScopedName, StoreInfo,
    StoreKind, WorkspaceInfo,
};

#[test]
fn added_entities_are_id_findable_with_equal_content() {
    let s = seeded();
    let stored = s.catalog.store(&s.store).unwrap();
    assert_eq!(stored.name, "pg");
    assert_eq!(stored.workspace, s.ws);

    let resource = s.catalog.resource(&s.roads).unwrap();
    assert_eq!(resource.name, "roads");
    assert_eq!(resource.store, s.store);
}

#[test]
fn missing_ids_are_generated_with_kind_prefix() {
    init_tracing();
    let catalog = Catalog::new();
    let ws = catalog.add_workspace(WorkspaceInfo::new("geo")).unwrap();
    let ws_id = ws.id.clone().unwrap();
    assert!(ws_id.as_str().starts_with("ws-"));

    // Store with no pre-set id gets one, and lands in the name index
    // under its workspace scope.
    let store = catalog
        .add_store(StoreInfo::new(StoreKind::Data, "pg", ws_id.clone()))
        .unwrap();
    assert!(store.id.clone().unwrap().as_str().starts_with("ds-"));
    assert!(catalog.store_by_name(&ws_id, "pg").is_some());
}

#[test]
fn rename_moves_name_entry_and_leaves_id_entry() {
    let s = seeded();
    let ws = s.catalog.workspace(&s.ws).unwrap();
    let mut rec = ChangeRecorder::new((*ws).clone());
    rec.set("name", PropertyValue::String("terra".to_string()))
        .unwrap();
    s.catalog.save_workspace(&rec).unwrap();

    assert!(s.catalog.workspace_by_name("geo").is_none());
    let renamed = s.catalog.workspace_by_name("terra").unwrap();
    assert_eq!(renamed.id, Some(s.ws.clone()));
    assert!(s.catalog.workspace(&s.ws).is_some());
}

#[test]
fn resource_rename_relocates_dependent_layer() {
    let s = seeded();
    let resource = s.catalog.resource(&s.roads).unwrap();
    let mut rec = ChangeRecorder::new((*resource).clone());
    rec.set("name", PropertyValue::String("streets".to_string()))
        .unwrap();
    s.catalog.save_resource(&rec).unwrap();

    let old_name = ScopedName::scoped(s.ns.clone(), "roads");
    let new_name = ScopedName::scoped(s.ns.clone(), "streets");
    assert!(s.catalog.layer_by_name(&old_name).is_none());
    let layer = s.catalog.layer_by_name(&new_name).unwrap();
    assert_eq!(layer.id, Some(s.roads_layer.clone()));
    // The layer's mirrored name stayed equal to the resource's.
    assert_eq!(layer.name.local, "streets");
}

#[test]
fn scope_rename_does_not_reindex_children() {
    // Names scope by owner id, so renaming the workspace leaves every
    // store name entry where it is.
    let s = seeded();
    let ws = s.catalog.workspace(&s.ws).unwrap();
    let mut rec = ChangeRecorder::new((*ws).clone());
    rec.set("name", PropertyValue::String("terra".to_string()))
        .unwrap();
    s.catalog.save_workspace(&rec).unwrap();

    assert!(s.catalog.store_by_name(&s.ws, "pg").is_some());
}

#[test]
fn removing_scope_leaves_children_orphaned_but_findable() {
    // No cascading delete: removing the workspace leaves its store
    // orphaned but still independently id-findable.
    let s = seeded();
    let ws = s.catalog.workspace(&s.ws).unwrap();
    assert!(s.catalog.remove_workspace(&ws).unwrap());

    assert!(s.catalog.workspace(&s.ws).is_none());
    let orphan = s.catalog.store(&s.store).unwrap();
    assert_eq!(orphan.workspace, s.ws);
}

#[test]
fn duplicate_id_add_keeps_first_id_entry() {
    // Accepted quirk: a second add under an existing id warns and
    // proceeds; the id index keeps the first arrival, the name index
    // gets the newcomer.
    init_tracing();
    let catalog = Catalog::new();
    let mut first = WorkspaceInfo::new("first");
    first.id = Some(EntityId::new("ws-dup"));
    catalog.add_workspace(first).unwrap();

    let mut second = WorkspaceInfo::new("second");
    second.id = Some(EntityId::new("ws-dup"));
    catalog.add_workspace(second).unwrap();

    assert_eq!(catalog.workspace(&EntityId::new("ws-dup")).unwrap().name, "first");
    assert!(catalog.workspace_by_name("second").is_some());
}

#[test]
fn layer_removal_by_name_survives_stale_layer_copy() {
    let s = seeded();
    let layer = s.catalog.layer(&s.roads_layer).unwrap();

    // Rename the resource after taking the layer copy; removal still
    // works because it goes through the (refreshed) stored name.
    let resource = s.catalog.resource(&s.roads).unwrap();
    let mut rec = ChangeRecorder::new((*resource).clone());
    rec.set("name", PropertyValue::String("streets".to_string()))
        .unwrap();
    s.catalog.save_resource(&rec).unwrap();

    let refreshed = s.catalog.layer(&s.roads_layer).unwrap();
    assert!(s.catalog.remove_layer(&refreshed).unwrap());
    assert!(s.catalog.layer(&s.roads_layer).is_none());
    // The stale pre-rename copy no longer matches anything.
    assert!(!s.catalog.remove_layer(&layer).unwrap());
}

#[test]
fn wider_kind_lookups_reach_narrower_buckets() {
    let s = seeded();
    let count_all_stores = s
        .catalog
        .count(EntityKind::Store, &carta::Filter::All)
        .unwrap();
    assert_eq!(count_all_stores, 1);
    let count_data = s
        .catalog
        .count(EntityKind::DataStore, &carta::Filter::All)
        .unwrap();
    assert_eq!(count_data, 1);
    let count_coverage = s
        .catalog
        .count(EntityKind::CoverageStore, &carta::Filter::All)
        .unwrap();
    assert_eq!(count_coverage, 0);
}
