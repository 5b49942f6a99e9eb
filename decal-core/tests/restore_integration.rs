//! Integration tests for restore, share links, file import/export and
//! product resizing.

use decal_core::{
    content_hash, decode_payload, encode_payload, BackgroundType, DesignConfig, DesignDocument,
    DesignError, DesignSession, Element, ElementId, MemoryStorage, ProductDescriptor,
};
use serde_json::json;

fn product(width: u32, height: u32) -> ProductDescriptor {
    ProductDescriptor::new("bandit", "custom", width, height)
}

/// A document with two elements, a solid background and lock/hide sets.
fn sample_document() -> DesignDocument {
    let mut document = DesignDocument::empty(product(1024, 768));
    let mut back = Element::image("https://cdn.example.com/back.png").with_position(10.0, 10.0);
    back.id = ElementId::from("image-back");
    let mut front = Element::text("Front", 500.0, 400.0);
    front.id = ElementId::from("text-front");
    document.elements = vec![back, front];
    document.selected_element_id = Some(ElementId::from("text-front"));
    document.locked_elements.insert(ElementId::from("image-back"));
    document.hidden_elements.insert(ElementId::from("text-front"));
    document.background = Some(
        serde_json::from_value(json!({"type": "solid", "solidColor": "#abcdef", "opacity": 0.25}))
            .expect("background"),
    );
    document
}

// ===========================================================================
// Restore
// ===========================================================================

#[test]
fn test_restore_applies_product_first_and_everything_else() {
    let mut session = DesignSession::in_memory();
    let document = sample_document();

    session.try_restore(&document).expect("restore");

    assert_eq!(session.product().width, 1024);
    assert_eq!(session.product().height, 768);

    let ids: Vec<&str> = session
        .elements()
        .elements()
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, ["image-back", "text-front"]);
    assert_eq!(
        session.elements().selected_id(),
        Some(&ElementId::from("text-front"))
    );
    assert!(session.elements().is_locked(&"image-back".into()));
    assert!(session.elements().is_hidden(&"text-front".into()));

    let background = session.background().current();
    assert_eq!(background.background_type, BackgroundType::Solid);
    assert!((background.opacity - 0.25).abs() < f64::EPSILON);

    let mut restored = session.capture();
    restored.timestamp = document.timestamp;
    assert_eq!(restored, document);
    assert!(!session.has_changed());
    assert!(!session.has_unsaved_changes());
}

#[test]
fn test_failed_restore_leaves_state_untouched() {
    let mut session = DesignSession::in_memory().with_product(product(400, 300));
    session
        .elements_mut()
        .add(Element::emoji("🌵"))
        .expect("add");
    session.background_mut().set_image("https://cdn.example.com/bg.jpg");
    let before = session.capture();

    let mut invalid = sample_document();
    invalid.version = String::new();
    invalid.product.width = 0;

    assert!(!session.restore(&invalid));
    let mut after = session.capture();
    after.timestamp = before.timestamp;
    assert_eq!(after, before);
}

#[test]
fn test_restore_from_raw_json_rejects_missing_width() {
    let mut value = serde_json::to_value(sample_document()).expect("value");
    value["product"].as_object_mut().expect("object").remove("width");

    assert!(matches!(
        DesignDocument::from_value(value),
        Err(DesignError::Validation(_))
    ));
}

#[test]
fn test_lock_blocks_delete_after_restore() {
    let mut session = DesignSession::in_memory();
    session.try_restore(&sample_document()).expect("restore");

    let result = session.elements_mut().remove(&"image-back".into());
    assert!(matches!(result, Err(DesignError::ElementLocked(_))));
    assert_eq!(session.elements().len(), 2);
}

#[test]
fn test_unknown_fields_survive_restore() {
    let mut value = serde_json::to_value(sample_document()).expect("value");
    value["elements"][1]["shadow"] = json!({"blur": 4, "color": "#000"});
    value["background"]["gradientStops"] = json!([0, 1]);

    let parsed = DesignDocument::from_value(value).expect("parse");
    let mut session = DesignSession::in_memory();
    session.try_restore(&parsed.document).expect("restore");

    let captured = serde_json::to_value(session.capture()).expect("value");
    assert_eq!(captured["elements"][1]["shadow"]["blur"], json!(4));
    assert_eq!(captured["background"]["gradientStops"], json!([0, 1]));
}

// ===========================================================================
// Share links
// ===========================================================================

#[test]
fn test_share_link_round_trip() {
    let mut source = DesignSession::in_memory();
    source.try_restore(&sample_document()).expect("restore");

    let link = source
        .share_link("https://shop.example.com/customize?product=bandit")
        .expect("link");
    assert!(link.starts_with("https://shop.example.com/customize?product=bandit&design="));

    let mut target = DesignSession::in_memory();
    assert!(target.open_link(&link));
    assert_eq!(target.product(), source.product());
    assert_eq!(target.elements().elements(), source.elements().elements());
    // The opened design is the new baseline, so autosave leaves storage alone.
    assert!(!target.has_changed());
    assert!(!target.has_unsaved_changes());
    assert!(!target.try_save().expect("save"));
}

#[test]
fn test_opened_link_can_be_persisted_explicitly() {
    let storage = MemoryStorage::new();
    let mut source = DesignSession::in_memory();
    source.try_restore(&sample_document()).expect("restore");
    let link = source.share_link("https://decal.local/editor").expect("link");

    let mut target = DesignSession::new(storage.clone(), DesignConfig::default());
    target.try_open_link(&link).expect("open");
    assert_eq!(storage.write_count(), 0);

    assert!(target.try_persist().expect("persist"));
    assert_eq!(storage.write_count(), 1);
    assert!(!target.has_unsaved_changes());
}

#[test]
fn test_payload_round_trip_preserves_timestamp_and_hash() {
    let document = sample_document();
    let payload = encode_payload(&document).expect("encode");
    let decoded = decode_payload(&payload).expect("decode");

    assert_eq!(decoded.timestamp, document.timestamp);
    assert_eq!(
        content_hash(&decoded).expect("hash"),
        content_hash(&document).expect("hash")
    );
}

#[test]
fn test_bad_links_are_rejected() {
    let mut session = DesignSession::in_memory();
    assert!(!session.open_link("https://shop.example.com/customize"));
    assert!(!session.open_link("https://shop.example.com/customize?design=%%%"));
    assert!(!session.open_link("not a link"));
    assert!(session.elements().is_empty());
}

// ===========================================================================
// Files
// ===========================================================================

#[test]
fn test_export_then_import_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut source = DesignSession::in_memory();
    source.try_restore(&sample_document()).expect("restore");

    let path = source.export_to_dir(dir.path()).expect("export");
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .expect("file name");
    assert!(name.starts_with("decal-design-"));
    assert!(name.ends_with(".json"));

    let mut target = DesignSession::in_memory();
    let loaded = target.try_import_file(&path).expect("import");
    assert!(!loaded.version_mismatch);
    assert_eq!(target.elements().elements(), source.elements().elements());
    assert!(!target.has_unsaved_changes());
}

#[test]
fn test_import_rejects_invalid_json() {
    let mut session = DesignSession::in_memory();
    assert!(!session.import_json("{\"version\": \"2.0\"}"));
    assert!(!session.import_json("[]"));
    assert!(!session.import_file(std::path::Path::new("/definitely/not/here.json")));
}

#[test]
fn test_export_json_is_pretty() {
    let mut session = DesignSession::in_memory();
    session.try_restore(&sample_document()).expect("restore");
    let json = session.export_json().expect("export");
    assert!(json.contains('\n'));
    assert!(session.import_json(&json));
}

// ===========================================================================
// Product resize
// ===========================================================================

#[test]
fn test_switch_product_rescales_design() {
    let mut session = DesignSession::in_memory().with_product(product(400, 300));
    let id = session
        .elements_mut()
        .add(Element::text("Resize me", 100.0, 100.0))
        .expect("add");

    let factors = session.switch_product(product(800, 300)).expect("switch");
    assert!((factors.sx - 2.0).abs() < f64::EPSILON);
    assert!((factors.sy - 1.0).abs() < f64::EPSILON);

    let element = session.elements().get(&id).expect("element");
    assert!((element.position.x - 200.0).abs() < f64::EPSILON);
    assert!((element.position.y - 100.0).abs() < f64::EPSILON);
    assert!((element.scale - 1.5).abs() < f64::EPSILON);
    let style = element.text_style().expect("text style");
    assert!((style.font_size - 24.0).abs() < f64::EPSILON);
    assert_eq!(session.product().width, 800);
}
