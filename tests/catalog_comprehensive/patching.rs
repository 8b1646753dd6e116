//! Diff/patch behavior through the facade

use crate::common::seeded;
use carta::{
    CatalogError, ChangeRecorder, EntityKind, Patch, PropertyDiff, PropertyValue, SrsIdent,
    TextValue,
};

#[test]
fn cleaned_empty_diff_is_a_content_noop() {
    let s = seeded();
    let before = s.catalog.resource(&s.roads).unwrap();

    // Touch a property and put it back: the cleaned diff is empty and
    // the save leaves the stored entity untouched.
    let mut rec = ChangeRecorder::new((*before).clone());
    rec.set("enabled", PropertyValue::Bool(false)).unwrap();
    rec.set("enabled", PropertyValue::Bool(true)).unwrap();
    assert!(rec.diff().clean().is_empty());

    let after = s.catalog.save_resource(&rec).unwrap();
    assert_eq!(*after, *before);
}

#[test]
fn identical_second_update_is_a_noop_diff() {
    let s = seeded();
    let layer = s.catalog.layer(&s.roads_layer).unwrap();

    let mut rec = ChangeRecorder::new((*layer).clone());
    rec.set("enabled", PropertyValue::Bool(false)).unwrap();
    s.catalog.save_layer(&rec).unwrap();

    // Recording the same mutation against the updated instance yields
    // nothing to apply.
    let updated = s.catalog.layer(&s.roads_layer).unwrap();
    let mut rec = ChangeRecorder::new((*updated).clone());
    rec.set("enabled", PropertyValue::Bool(false)).unwrap();
    assert!(rec.diff().clean().is_empty());
}

#[test]
fn diff_to_patch_replays_before_to_after() {
    let s = seeded();
    let before = (*s.catalog.resource(&s.roads).unwrap()).clone();

    let mut rec = ChangeRecorder::new(before.clone());
    rec.set("title", PropertyValue::Text(TextValue::new("Roads")))
        .unwrap();
    rec.set(
        "keywords",
        PropertyValue::List(vec![PropertyValue::String("transport".to_string())]),
    )
    .unwrap();
    rec.set(
        "native_srs",
        PropertyValue::Srs(SrsIdent::new("EPSG:4326")),
    )
    .unwrap();

    let diff = rec.diff().clean();
    let mut replayed = before;
    diff.to_patch().apply_to(&mut replayed).unwrap();
    assert_eq!(&replayed, rec.current());
}

#[test]
fn noop_detection_is_kind_aware() {
    let s = seeded();
    let resource = (*s.catalog.resource(&s.roads).unwrap()).clone();

    // Empty text, empty collection, and equivalent SRS spellings all
    // clean away.
    let mut with_srs = resource.clone();
    with_srs.native_srs = Some(SrsIdent::new("EPSG:4326"));
    let mut respelled = with_srs.clone();
    respelled.native_srs = Some(SrsIdent::new("urn:ogc:def:crs:EPSG::4326"));
    respelled.title = Some(TextValue::new(""));
    respelled.keywords = Vec::new();

    let diff = PropertyDiff::between(EntityKind::FeatureType, &with_srs, &respelled).clean();
    assert!(diff.is_empty());
}

#[test]
fn unknown_property_in_patch_is_rejected() {
    let s = seeded();
    let err = s
        .catalog
        .update(
            EntityKind::Workspace,
            &s.ws,
            &Patch::with("bogus", PropertyValue::Bool(true)),
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidProperty(_)));
}

#[test]
fn readonly_collection_patch_is_rejected() {
    let s = seeded();
    let map = s.catalog.add_map(carta::MapInfo::new("world")).unwrap();
    let err = s
        .catalog
        .update(
            EntityKind::Map,
            map.id.as_ref().unwrap(),
            &Patch::with("layers", PropertyValue::List(vec![])),
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::ImmutableCollection(_)));
}

#[test]
fn update_of_absent_id_is_not_found() {
    let s = seeded();
    let err = s
        .catalog
        .update(
            EntityKind::Workspace,
            &carta::EntityId::new("missing"),
            &Patch::with("name", PropertyValue::String("x".to_string())),
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[test]
fn collection_patch_clears_then_extends_in_place() {
    let s = seeded();
    s.catalog
        .update(
            EntityKind::Resource,
            &s.roads,
            &Patch::with(
                "keywords",
                PropertyValue::List(vec![
                    PropertyValue::String("roads".to_string()),
                    PropertyValue::String("osm".to_string()),
                ]),
            ),
        )
        .unwrap();
    let stored = s.catalog.resource(&s.roads).unwrap();
    assert_eq!(stored.keywords, vec!["roads".to_string(), "osm".to_string()]);

    // Null clears the collection without replacing it.
    s.catalog
        .update(
            EntityKind::Resource,
            &s.roads,
            &Patch::with("keywords", PropertyValue::Null),
        )
        .unwrap();
    assert!(s.catalog.resource(&s.roads).unwrap().keywords.is_empty());
}

#[test]
fn saves_stamp_modification_time() {
    let s = seeded();
    let ws = s.catalog.workspace(&s.ws).unwrap();
    assert!(ws.date_created.is_some());
    assert!(ws.date_modified.is_none());

    let mut rec = ChangeRecorder::new((*ws).clone());
    rec.set("isolated", PropertyValue::Bool(true)).unwrap();
    let saved = s.catalog.save_workspace(&rec).unwrap();
    assert!(saved.date_modified.is_some());
}
