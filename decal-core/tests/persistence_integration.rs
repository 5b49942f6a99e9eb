//! Integration tests for saving, loading and recovering designs.
//!
//! Covers file and memory storage, idempotent saves, the empty-design
//! guard and recovery from corrupt blobs.

use decal_core::storage::DEFAULT_STORAGE_KEY;
use decal_core::{
    content_hash, BackgroundType, DesignConfig, DesignSession, DesignStorage, Element, FileStorage,
    MemoryStorage, MonogramLetters, ProductDescriptor,
};
use serde_json::json;

/// Build a session with a few elements of every kind.
fn populated_session(storage: impl DesignStorage + 'static) -> DesignSession {
    let mut session = DesignSession::new(storage, DesignConfig::default())
        .with_product(ProductDescriptor::new("walrus", "24oz", 640, 480));
    {
        let elements = session.elements_mut();
        elements
            .add(Element::text("Happy Birthday", 40.0, 60.0))
            .expect("text");
        let image = elements.add(Element::image("https://cdn.example.com/dog.png")).expect("image");
        elements.add(Element::emoji("🎂")).expect("emoji");
        elements
            .add(Element::monogram(MonogramLetters::new("j", "q", "p"), "traditional"))
            .expect("monogram");
        elements.lock(&image);
    }
    session.background_mut().set_pattern(json!({"name": "stripes", "angle": 45}));
    session.background_mut().set_opacity(0.5);
    session
}

// ===========================================================================
// Round trip
// ===========================================================================

#[test]
fn test_file_storage_round_trip_across_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");

    let saved = {
        let storage = FileStorage::new(dir.path()).expect("storage");
        let mut session = populated_session(storage);
        assert!(session.try_save().expect("save"));
        session.capture()
    };

    // Fresh session over the same directory
    let storage = FileStorage::new(dir.path()).expect("storage");
    let mut session = DesignSession::new(storage, DesignConfig::default());
    let loaded = session.try_load().expect("load").expect("design present");

    assert!(!loaded.version_mismatch);
    assert!(!loaded.migrated);
    assert_eq!(session.product(), &saved.product);
    assert_eq!(session.elements().elements(), saved.elements.as_slice());
    assert_eq!(session.elements().locked(), &saved.locked_elements);
    assert_eq!(
        session.background().current().background_type,
        BackgroundType::Pattern
    );
    assert!((session.background().current().opacity - 0.5).abs() < f64::EPSILON);
    assert_eq!(
        content_hash(&session.capture()).expect("hash"),
        content_hash(&saved).expect("hash")
    );
    assert!(!session.has_changed());
    assert!(session.last_save_time().is_some());
}

#[test]
fn test_inactive_background_fields_survive_round_trip() {
    let storage = MemoryStorage::new();
    let mut session = populated_session(storage.clone());
    // Switching to an image leaves the previous pattern on the descriptor.
    session.background_mut().set_image("https://cdn.example.com/wood.png");
    assert!(session.save());
    let saved = session.capture();
    assert!(saved.background.as_ref().and_then(|b| b.pattern.as_ref()).is_some());

    let mut reopened = DesignSession::new(storage, DesignConfig::default());
    assert!(reopened.load().is_some());
    assert_eq!(reopened.background().current(), saved.background.as_ref().expect("bg"));
    assert_eq!(
        content_hash(&reopened.capture()).expect("hash"),
        content_hash(&saved).expect("hash")
    );
    assert!(!reopened.has_changed());
}

// ===========================================================================
// Idempotent save and empty guard
// ===========================================================================

#[test]
fn test_second_save_without_changes_does_not_write() {
    let storage = MemoryStorage::new();
    let mut session = populated_session(storage.clone());

    assert!(session.save());
    assert!(session.save());
    assert_eq!(storage.write_count(), 1);

    // Moving the back element further back changes nothing.
    let back = session.elements().elements()[0].id.clone();
    session.elements_mut().move_down(&back).expect("reorder");
    assert!(session.save());
    assert_eq!(storage.write_count(), 1);

    session.elements_mut().bring_to_front(&back).expect("reorder");
    assert!(session.save());
    assert_eq!(storage.write_count(), 2);
}

#[test]
fn test_empty_design_never_overwrites() {
    let storage = MemoryStorage::new();
    let mut session = populated_session(storage.clone());
    assert!(session.save());

    let ids: Vec<_> = session.elements().elements().iter().map(|e| e.id.clone()).collect();
    for id in &ids {
        session.elements_mut().unlock(id);
        session.elements_mut().remove(id).expect("remove");
    }
    assert!(!session.has_changed());
    assert!(session.save());
    assert_eq!(storage.write_count(), 1);

    let stored = storage.get(DEFAULT_STORAGE_KEY).expect("get").expect("blob kept");
    assert!(stored.contains("Happy Birthday"));
}

#[test]
fn test_non_finite_size_is_repaired_before_save() {
    let storage = MemoryStorage::new();
    let mut session = populated_session(storage.clone());
    assert!(session.save());

    let id = session.elements().elements()[0].id.clone();
    session
        .elements_mut()
        .update(&id, |e| e.width = f64::NAN)
        .expect("update");
    assert!(session.save());

    let stored = storage.get(DEFAULT_STORAGE_KEY).expect("get").expect("blob");
    let stored: serde_json::Value = serde_json::from_str(&stored).expect("json");
    assert!(stored["elements"][0]["width"].is_number());

    let mut reopened = DesignSession::new(storage.clone(), DesignConfig::default());
    assert!(reopened.load().is_some());
    assert!(storage.contains(DEFAULT_STORAGE_KEY));
    assert_eq!(
        reopened.elements().elements(),
        session.elements().elements()
    );
}

// ===========================================================================
// Corrupt storage
// ===========================================================================

#[test]
fn test_garbage_blob_is_erased() {
    let storage = MemoryStorage::new();
    storage.set(DEFAULT_STORAGE_KEY, "{not json at all").expect("seed");

    let mut session = DesignSession::new(storage.clone(), DesignConfig::default());
    assert!(session.load().is_none());
    assert!(!storage.contains(DEFAULT_STORAGE_KEY));
    assert!(session.elements().is_empty());
}

#[test]
fn test_invalid_document_is_erased_and_state_kept() {
    let storage = MemoryStorage::new();
    let mut session = populated_session(storage.clone());
    let before = session.capture();

    let mut bad = serde_json::to_value(&before).expect("value");
    bad["product"].as_object_mut().expect("object").remove("width");
    storage
        .set(DEFAULT_STORAGE_KEY, &bad.to_string())
        .expect("seed");

    assert!(session.try_load().is_err());
    assert!(!storage.contains(DEFAULT_STORAGE_KEY));
    assert_eq!(session.elements().elements(), before.elements.as_slice());
}

#[test]
fn test_missing_blob_loads_nothing() {
    let mut session = DesignSession::in_memory();
    assert!(session.try_load().expect("load").is_none());
}

// ===========================================================================
// Versions
// ===========================================================================

#[test]
fn test_legacy_blob_migrates_on_load() {
    let storage = MemoryStorage::new();
    let legacy = json!({
        "version": "1.0",
        "timestamp": 1_650_000_000_000_u64,
        "product": {"type": "bandit", "size": "23oz", "width": 800, "height": 600},
        "elements": [
            {"id": "text-old", "type": "text", "position": {"x": 10, "y": 20}, "scale": 1, "rotation": 0,
             "content": "Legacy", "fontSize": 18}
        ],
        "background": {"type": "solid", "solidColor": "#00ff00", "opacity": 1},
        "layerStack": [{"id": "text-old", "locked": true, "visible": true}]
    });
    storage
        .set(DEFAULT_STORAGE_KEY, &legacy.to_string())
        .expect("seed");

    let mut session = DesignSession::new(storage, DesignConfig::default());
    let loaded = session.load().expect("loaded");

    assert!(loaded.version_mismatch);
    assert!(loaded.migrated);
    assert_eq!(loaded.source_version, "1.0");
    assert!(session.elements().is_locked(&"text-old".into()));
    assert_eq!(
        session.background().current().solid_color.as_deref(),
        Some("#00ff00")
    );
}

#[test]
fn test_clear_storage_forgets_baseline() {
    let storage = MemoryStorage::new();
    let mut session = populated_session(storage.clone());
    assert!(session.save());

    session.clear_storage().expect("clear");
    assert!(!storage.contains(DEFAULT_STORAGE_KEY));
    assert!(session.has_changed());

    assert!(session.save());
    assert_eq!(storage.write_count(), 2);
}

#[test]
fn test_custom_storage_key() {
    let storage = MemoryStorage::new();
    let config = DesignConfig::default().with_storage_key("shop_42");
    let mut session = DesignSession::new(storage.clone(), config);
    session
        .elements_mut()
        .add(Element::text("x", 0.0, 0.0))
        .expect("add");

    assert!(session.save());
    assert!(storage.contains("shop_42"));
    assert!(!storage.contains(DEFAULT_STORAGE_KEY));
}
