//! Property Store Integration Tests
//!
//! Tests for the property holder lifecycle:
//! - Reading with and without inheritance
//! - Update, remove and clear semantics
//! - Empty property maps represented by file absence
//! - Key validation

mod common;

use common::{TestFixture, read_file};
use propstore::{Error, PropertyMap};
use serde_json::json;

// =============================================================================
// Reads
// =============================================================================

#[test]
fn test_read_while_no_file_exists() {
    let fixture = TestFixture::new();

    assert_eq!(fixture.parent.get("someKey").unwrap(), None);
    assert_eq!(
        fixture.parent.get_or("someKey", "default").unwrap(),
        json!("default")
    );
    assert!(!fixture.parent.path().exists());
}

#[test]
fn test_read_write() {
    let fixture = TestFixture::new();

    fixture.parent.update("someKey", 1).unwrap();

    assert_eq!(fixture.parent.get("someKey").unwrap(), Some(json!(1)));
    assert_eq!(
        fixture.parent.get_without_inheritance("someKey").unwrap(),
        Some(json!(1))
    );
}

#[test]
fn test_read_inheritance() {
    let fixture = TestFixture::new();

    fixture.parent.update("someKey", 1).unwrap();

    assert_eq!(fixture.child.get("someKey").unwrap(), Some(json!(1)));
    assert_eq!(
        fixture.child.get_without_inheritance("someKey").unwrap(),
        None
    );
    assert_eq!(
        fixture.child.get_without_inheritance_or("someKey", 0).unwrap(),
        json!(0)
    );
}

#[test]
fn test_own_keys_shadow_inherited_keys() {
    let fixture = TestFixture::new();

    fixture.parent.update("a", 1).unwrap();
    assert!(fixture.child.get_dict_without_inheritance().unwrap().is_empty());

    fixture.child.update("a", 2).unwrap();
    fixture.child.update("b", 3).unwrap();

    let mut expected = PropertyMap::new();
    expected.insert("a".into(), json!(2));
    expected.insert("b".into(), json!(3));
    assert_eq!(fixture.child.get_dict().unwrap(), expected);
    assert_eq!(fixture.parent.get("a").unwrap(), Some(json!(1)));
}

#[test]
fn test_three_level_chain() {
    let fixture = TestFixture::new();
    let grandchild = propstore::PropertyStore::builder(fixture.properties_dir().join("grandchild"))
        .parent(std::sync::Arc::new(
            propstore::PropertyStore::builder(fixture.child.path().to_path_buf())
                .parent(std::sync::Arc::clone(&fixture.parent))
                .cache(std::sync::Arc::clone(&fixture.cache))
                .build(),
        ))
        .cache(std::sync::Arc::clone(&fixture.cache))
        .build();

    fixture.parent.update_dict(obj(json!({"a": 1, "b": 1, "c": 1}))).unwrap();
    fixture.child.update_dict(obj(json!({"b": 2, "c": 2}))).unwrap();
    grandchild.update("c", 3).unwrap();

    assert_eq!(
        serde_json::Value::Object(grandchild.get_dict().unwrap()),
        json!({"a": 1, "b": 2, "c": 3})
    );
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_update_dict() {
    let fixture = TestFixture::new();

    fixture.parent.update("someKey", 1).unwrap();
    let own = fixture
        .parent
        .update_dict(obj(json!({"someKey": 2, "someOtherKey": 3})))
        .unwrap();

    assert_eq!(serde_json::Value::Object(own), json!({"someKey": 2, "someOtherKey": 3}));
    assert_eq!(fixture.child.get("someKey").unwrap(), Some(json!(2)));
    assert_eq!(fixture.child.get("someOtherKey").unwrap(), Some(json!(3)));
}

#[test]
fn test_update_returns_own_map_not_inherited() {
    let fixture = TestFixture::new();

    fixture.parent.update("inherited", 1).unwrap();
    let own = fixture.child.update("own", 2).unwrap();

    assert_eq!(serde_json::Value::Object(own), json!({"own": 2}));
}

#[test]
fn test_round_trip_all_value_kinds() {
    let fixture = TestFixture::new();
    let values = obj(json!({
        "null": null,
        "flag": true,
        "int": -7,
        "float": 23.976,
        "text": "shot_010",
        "list": [1, "two", [3]],
        "nested": {"camera": {"lens": 35}}
    }));

    fixture.parent.update_dict(values.clone()).unwrap();
    fixture.cache.clear();

    assert_eq!(fixture.parent.get_dict_without_inheritance().unwrap(), values);
    assert_eq!(
        read_file(fixture.parent.path()).unwrap(),
        serde_json::Value::Object(values)
    );
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn test_remove() {
    let fixture = TestFixture::new();

    fixture.parent.update("someKey", 1).unwrap();
    fixture.parent.remove("someKey").unwrap();

    assert_eq!(fixture.child.get("someKey").unwrap(), None);
}

#[test]
fn test_remove_while_no_file_exists() {
    let fixture = TestFixture::new();

    let own = fixture.parent.remove("someKey").unwrap();

    assert!(own.is_empty());
    assert!(!fixture.parent.path().exists());
    assert!(!fixture.parent.is_locked());
}

#[test]
fn test_remove_absent_key_is_noop() {
    let fixture = TestFixture::new();

    fixture.parent.update("someKey", 1).unwrap();
    assert_eq!(fixture.parent.get("differentKey").unwrap(), None);

    fixture.parent.remove("someKey").unwrap();
    assert_eq!(fixture.parent.get("someKey").unwrap(), None);
    fixture.parent.remove("someKey").unwrap();
    assert_eq!(fixture.parent.get("someKey").unwrap(), None);
}

#[test]
fn test_empty_map_means_no_file() {
    let fixture = TestFixture::new();

    fixture.parent.update("k", 1).unwrap();
    assert!(fixture.parent.path().exists());

    fixture.parent.remove("k").unwrap();

    assert!(!fixture.parent.path().exists());
    assert!(!fixture.parent.is_locked());
}

#[test]
fn test_remove_reveals_inherited_value() {
    let fixture = TestFixture::new();

    fixture.parent.update("k", "parent").unwrap();
    fixture.child.update("k", "child").unwrap();
    assert_eq!(fixture.child.get("k").unwrap(), Some(json!("child")));

    fixture.child.remove("k").unwrap();
    assert_eq!(fixture.child.get("k").unwrap(), Some(json!("parent")));
}

// =============================================================================
// Clear
// =============================================================================

#[test]
fn test_clear() {
    let fixture = TestFixture::new();

    fixture.parent.update("someKey", 1).unwrap();
    fixture.parent.clear().unwrap();

    assert_eq!(fixture.child.get("someKey").unwrap(), None);
    assert!(!fixture.parent.path().exists());
    assert!(!fixture.parent.is_locked());
}

#[test]
fn test_clear_keeps_parent_data() {
    let fixture = TestFixture::new();

    fixture.parent.update("k", 0).unwrap();
    fixture.child.update("k", 1).unwrap();
    fixture.child.clear().unwrap();

    assert_eq!(fixture.child.get("k").unwrap(), Some(json!(0)));
    assert!(fixture.parent.path().exists());
}

// =============================================================================
// Key Validation
// =============================================================================

#[test]
fn test_invalid_key_read_fails() {
    let fixture = TestFixture::new();
    let err = fixture.parent.get("").unwrap_err();
    assert!(matches!(err, Error::InvalidKey { .. }));
}

#[test]
fn test_invalid_key_write_fails_without_mutation() {
    let fixture = TestFixture::new();

    assert!(fixture.parent.update("", 1).unwrap_err().is_key_error());
    assert!(fixture.parent.update("プロパティ", 1).unwrap_err().is_key_error());
    assert!(!fixture.parent.path().exists());
}

#[test]
fn test_invalid_key_remove_fails_without_mutation() {
    let fixture = TestFixture::new();
    fixture.parent.update("k", 1).unwrap();

    assert!(fixture.parent.remove("").unwrap_err().is_key_error());
    assert_eq!(read_file(fixture.parent.path()).unwrap(), json!({"k": 1}));
}

// =============================================================================
// Helpers
// =============================================================================

fn obj(value: serde_json::Value) -> PropertyMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
