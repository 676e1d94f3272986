#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;

fn rect_at(x: f64, y: f64) -> DrawableObject {
    DrawableObject::new(
        Header { x, y, fill: Some("#ffffff".into()), ..Header::default() },
        Shape::Rectangle { width: 100.0, height: 80.0 },
    )
}

fn circle() -> DrawableObject {
    DrawableObject::new(Header::default(), Shape::Circle { radius: 50.0 })
}

fn ids(scene: &Scene) -> Vec<ObjectId> {
    scene.objects().iter().map(|o| o.id).collect()
}

// =============================================================
// Shape serde
// =============================================================

#[test]
fn shape_tags_are_camel_case() {
    let cases = [
        (Shape::Rectangle { width: 1.0, height: 1.0 }, "rectangle"),
        (Shape::Circle { radius: 1.0 }, "circle"),
        (Shape::Triangle { width: 1.0, height: 1.0 }, "triangle"),
        (Shape::Line { dx: 1.0, dy: 0.0 }, "line"),
        (Shape::FreehandPath { points: vec![Point::new(0.0, 0.0)] }, "freehandPath"),
        (Shape::Text { text: "a".into(), font_size: 20.0, font_family: "Arial".into() }, "text"),
        (Shape::Image { src: "data:".into(), width: 1.0, height: 1.0 }, "image"),
    ];
    for (shape, tag) in cases {
        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["type"], tag);
        assert_eq!(shape.type_name(), tag);
    }
}

#[test]
fn text_fields_are_camel_case() {
    let shape = Shape::Text { text: "hi".into(), font_size: 20.0, font_family: "Arial".into() };
    let value = serde_json::to_value(&shape).unwrap();
    assert_eq!(value["fontSize"], 20.0);
    assert_eq!(value["fontFamily"], "Arial");
}

#[test]
fn unknown_type_rejects() {
    let result = serde_json::from_value::<DrawableObject>(json!({"id": Uuid::nil(), "type": "hexagon"}));
    assert!(result.is_err());
}

// =============================================================
// DrawableObject record format
// =============================================================

#[test]
fn record_is_flat_with_header_and_geometry() {
    let obj = rect_at(10.0, 20.0);
    let value = serde_json::to_value(&obj).unwrap();
    assert_eq!(value["id"], obj.id.to_string());
    assert_eq!(value["type"], "rectangle");
    assert_eq!(value["x"], 10.0);
    assert_eq!(value["y"], 20.0);
    assert_eq!(value["scaleX"], 1.0);
    assert_eq!(value["strokeWidth"], 1.0);
    assert_eq!(value["width"], 100.0);
    assert_eq!(value["fill"], "#ffffff");
}

#[test]
fn record_roundtrip_preserves_object() {
    let obj = rect_at(3.0, 4.0);
    let back: DrawableObject = serde_json::from_value(serde_json::to_value(&obj).unwrap()).unwrap();
    assert_eq!(back, obj);
}

#[test]
fn record_missing_header_fields_use_defaults() {
    let obj: DrawableObject =
        serde_json::from_value(json!({"id": Uuid::nil(), "type": "circle", "radius": 5.0})).unwrap();
    assert_eq!(obj.header, Header::default());
    assert_eq!(obj.shape, Shape::Circle { radius: 5.0 });
}

#[test]
fn record_without_id_gets_fresh_id() {
    let obj: DrawableObject = serde_json::from_value(json!({"type": "circle", "radius": 5.0})).unwrap();
    assert_ne!(obj.id, Uuid::nil());
}

#[test]
fn unknown_fields_are_preserved() {
    let value = json!({
        "id": Uuid::nil(),
        "type": "line",
        "dx": 10.0,
        "dy": 0.0,
        "shadow": {"blur": 4},
        "locked": true,
    });
    let obj: DrawableObject = serde_json::from_value(value).unwrap();
    assert_eq!(obj.extra().len(), 2);
    assert_eq!(obj.extra()["locked"], true);

    let out = serde_json::to_value(&obj).unwrap();
    assert_eq!(out["shadow"], json!({"blur": 4}));
    assert_eq!(out["locked"], true);
}

#[test]
fn known_fields_are_not_duplicated_into_extra() {
    let obj = rect_at(0.0, 0.0);
    let back: DrawableObject = serde_json::from_value(serde_json::to_value(&obj).unwrap()).unwrap();
    assert!(back.extra().is_empty());
}

#[test]
fn patch_drops_unknown_fields() {
    let mut obj: DrawableObject = serde_json::from_value(json!({
        "id": Uuid::nil(), "type": "circle", "radius": 5.0, "locked": true
    }))
    .unwrap();
    assert!(obj.apply_patch(&ObjectPatch::position(1.0, 1.0)));
    assert!(obj.extra().is_empty());
}

// =============================================================
// Patches
// =============================================================

#[test]
fn patch_applies_present_fields_only() {
    let mut obj = rect_at(0.0, 0.0);
    let patch = ObjectPatch { x: Some(5.0), stroke: Some("#ff0000".into()), ..Default::default() };
    assert!(obj.apply_patch(&patch));
    assert_eq!(obj.header.x, 5.0);
    assert_eq!(obj.header.y, 0.0);
    assert_eq!(obj.header.stroke, "#ff0000");
}

#[test]
fn patch_ignores_out_of_range_values() {
    let mut obj = rect_at(0.0, 0.0);
    let before = obj.clone();
    let patch = ObjectPatch {
        x: Some(f64::NAN),
        scale_x: Some(0.0),
        scale_y: Some(-2.0),
        stroke_width: Some(-1.0),
        stroke: Some("   ".into()),
        font_size: Some(12.0),
        ..Default::default()
    };
    assert!(!obj.apply_patch(&patch));
    assert_eq!(obj, before);
}

#[test]
fn patch_normalizes_rotation() {
    let mut obj = rect_at(0.0, 0.0);
    obj.apply_patch(&ObjectPatch { rotation: Some(-90.0), ..Default::default() });
    assert_eq!(obj.header.rotation, 270.0);
}

#[test]
fn patch_clears_fill() {
    let mut obj = rect_at(0.0, 0.0);
    assert!(obj.apply_patch(&ObjectPatch { fill: Some(None), ..Default::default() }));
    assert!(obj.header.fill.is_none());
}

#[test]
fn patch_edits_text_content() {
    let mut obj = DrawableObject::new(
        Header::default(),
        Shape::Text { text: "old".into(), font_size: 20.0, font_family: "Arial".into() },
    );
    assert!(obj.apply_patch(&ObjectPatch { text: Some("new".into()), font_size: Some(32.0), ..Default::default() }));
    assert_eq!(obj.shape, Shape::Text { text: "new".into(), font_size: 32.0, font_family: "Arial".into() });
}

#[test]
fn identical_patch_reports_no_change() {
    let mut obj = rect_at(7.0, 8.0);
    assert!(!obj.apply_patch(&ObjectPatch::position(7.0, 8.0)));
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn local_bounds_per_variant() {
    assert_eq!(Shape::Circle { radius: 10.0 }.local_bounds(), Rect::from_xywh(0.0, 0.0, 20.0, 20.0));
    assert_eq!(
        Shape::Line { dx: -30.0, dy: 10.0 }.local_bounds(),
        Rect::from_corners(Point::new(-30.0, 0.0), Point::new(0.0, 10.0))
    );
    let text = Shape::Text { text: "ab\nabcd".into(), font_size: 10.0, font_family: "Arial".into() };
    let b = text.local_bounds();
    assert!((b.width() - 4.0 * 10.0 * TEXT_CHAR_WIDTH_RATIO).abs() < 1e-9);
    assert!((b.height() - 2.0 * 10.0 * TEXT_LINE_HEIGHT).abs() < 1e-9);
}

#[test]
fn freehand_normalizes_to_bounds_origin() {
    let points = [Point::new(10.0, 20.0), Point::new(15.0, 25.0), Point::new(12.0, 30.0)];
    let obj = DrawableObject::freehand(&points, Header::default()).unwrap();
    assert_eq!(obj.header.x, 10.0);
    assert_eq!(obj.header.y, 20.0);
    let Shape::FreehandPath { points } = &obj.shape else {
        panic!("expected a freehand path");
    };
    assert_eq!(points[0], Point::new(0.0, 0.0));
    assert_eq!(points[2], Point::new(2.0, 10.0));
}

#[test]
fn freehand_single_point_becomes_dot() {
    let obj = DrawableObject::freehand(&[Point::new(1.0, 1.0)], Header::default()).unwrap();
    let Shape::FreehandPath { points } = &obj.shape else {
        panic!("expected a freehand path");
    };
    assert_eq!(points.len(), 2);
}

#[test]
fn freehand_without_points_is_none() {
    assert!(DrawableObject::freehand(&[], Header::default()).is_none());
}

// =============================================================
// Scene mutators
// =============================================================

#[test]
fn new_scene_is_empty_and_clean() {
    let scene = Scene::new();
    assert!(scene.is_empty());
    assert_eq!(scene.background(), DEFAULT_BACKGROUND);
    assert!(!scene.has_pending_commit());
}

#[test]
fn add_appends_in_paint_order() {
    let mut scene = Scene::new();
    let a = scene.add_object(rect_at(0.0, 0.0));
    let b = scene.add_object(circle());
    assert_eq!(ids(&scene), vec![a, b]);
    assert!(scene.has_pending_commit());
}

#[test]
fn add_duplicate_id_gets_fresh_id() {
    let mut scene = Scene::new();
    let obj = rect_at(0.0, 0.0);
    let first = scene.add_object(obj.clone());
    let second = scene.add_object(obj);
    assert_ne!(first, second);
    assert_eq!(scene.len(), 2);
}

#[test]
fn remove_missing_id_is_noop() {
    let mut scene = Scene::new();
    scene.add_object(rect_at(0.0, 0.0));
    scene.take_commit_point();

    let removed = scene.remove_objects(&[Uuid::new_v4()]);
    assert!(removed.is_empty());
    assert_eq!(scene.len(), 1);
    assert!(!scene.has_pending_commit());
}

#[test]
fn remove_keeps_sibling_order() {
    let mut scene = Scene::new();
    let a = scene.add_object(rect_at(0.0, 0.0));
    let b = scene.add_object(circle());
    let c = scene.add_object(rect_at(5.0, 5.0));
    let removed = scene.remove_objects(&[b, Uuid::new_v4()]);
    assert_eq!(removed.len(), 1);
    assert_eq!(ids(&scene), vec![a, c]);
}

#[test]
fn update_does_not_reorder() {
    let mut scene = Scene::new();
    let a = scene.add_object(rect_at(0.0, 0.0));
    let b = scene.add_object(circle());
    scene.update_object(&a, &ObjectPatch::position(500.0, 500.0));
    assert_eq!(ids(&scene), vec![a, b]);
    assert_eq!(scene.get(&a).unwrap().header.x, 500.0);
}

#[test]
fn update_missing_or_invalid_raises_no_commit() {
    let mut scene = Scene::new();
    let a = scene.add_object(rect_at(0.0, 0.0));
    scene.take_commit_point();

    assert!(!scene.update_object(&Uuid::new_v4(), &ObjectPatch::position(1.0, 1.0)));
    assert!(!scene.update_object(&a, &ObjectPatch { scale_x: Some(0.0), ..Default::default() }));
    assert!(!scene.has_pending_commit());
}

#[test]
fn clear_resets_background() {
    let mut scene = Scene::new();
    scene.add_object(circle());
    scene.set_background("#222222");
    assert!(scene.clear());
    assert!(scene.is_empty());
    assert_eq!(scene.background(), DEFAULT_BACKGROUND);
}

#[test]
fn clear_blank_scene_is_noop() {
    let mut scene = Scene::new();
    assert!(!scene.clear());
    assert!(!scene.has_pending_commit());
}

#[test]
fn revert_object_does_not_raise_commit() {
    let mut scene = Scene::new();
    let a = scene.add_object(rect_at(0.0, 0.0));
    scene.take_commit_point();
    let original = scene.get(&a).unwrap().clone();

    scene.update_object(&a, &ObjectPatch::position(9.0, 9.0));
    scene.discard_commit_point();
    assert!(scene.revert_object(original.clone()));
    assert_eq!(scene.get(&a), Some(&original));
    assert!(!scene.has_pending_commit());
}

#[test]
fn take_commit_point_consumes() {
    let mut scene = Scene::new();
    scene.add_object(circle());
    assert!(scene.take_commit_point());
    assert!(!scene.take_commit_point());
}

// =============================================================
// Serialize / restore
// =============================================================

#[test]
fn serialize_restore_roundtrip() {
    let mut scene = Scene::new();
    scene.add_object(rect_at(1.0, 2.0));
    scene.add_object(circle());
    scene.set_background("#fafafa");
    let doc = scene.serialize();

    let restored = Scene::from_doc(&doc);
    assert_eq!(restored.serialize(), doc);
    assert!(!restored.has_pending_commit());
}

#[test]
fn document_value_roundtrip_is_exact() {
    let value = json!({
        "background": "#ffffff",
        "objects": [
            {
                "id": Uuid::new_v4(), "type": "text", "x": 1.5, "y": 2.5, "rotation": 0.0,
                "scaleX": 1.0, "scaleY": 1.0, "stroke": "#000000", "strokeWidth": 1.0,
                "fill": "#000000", "text": "hello", "fontSize": 20.0, "fontFamily": "Arial",
                "charSpacing": 0
            },
            {
                "id": Uuid::new_v4(), "type": "freehandPath", "x": 0.0, "y": 0.0, "rotation": 45.0,
                "scaleX": 2.0, "scaleY": 2.0, "stroke": "#123456", "strokeWidth": 5.0, "fill": null,
                "points": [{"x": 0.0, "y": 0.0}, {"x": 3.0, "y": 4.0}]
            }
        ]
    });
    let doc = SceneDoc::from_value(value.clone()).unwrap();
    let scene = Scene::from_doc(&doc);
    assert_eq!(scene.serialize().to_value().unwrap(), value);
}

#[test]
fn missing_document_fields_default() {
    let doc = SceneDoc::from_json("{}").unwrap();
    assert_eq!(doc, SceneDoc::default());
}

#[test]
fn invalid_json_is_parse_error() {
    let err = SceneDoc::from_json("{not json").unwrap_err();
    assert!(matches!(err, DocError::Parse(_)));
    assert_eq!(err.error_code(), "E_DOC_PARSE");
}

#[test]
fn duplicate_ids_fail_validation() {
    let id = Uuid::new_v4();
    let value = json!({"objects": [
        {"id": id, "type": "circle", "radius": 1.0},
        {"id": id, "type": "circle", "radius": 2.0},
    ]});
    let err = SceneDoc::from_value(value).unwrap_err();
    assert!(matches!(err, DocError::DuplicateId(dup) if dup == id));
}

#[test]
fn negative_geometry_fails_validation() {
    let value = json!({"objects": [{"id": Uuid::new_v4(), "type": "circle", "radius": -1.0}]});
    let err = SceneDoc::from_value(value).unwrap_err();
    assert_eq!(err.error_code(), "E_DOC_INVALID_GEOMETRY");
}

#[test]
fn zero_scale_fails_validation() {
    let value = json!({"objects": [{"id": Uuid::new_v4(), "type": "circle", "radius": 1.0, "scaleX": 0.0}]});
    assert!(SceneDoc::from_value(value).is_err());
}
