#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::Header;

const EPSILON: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn object(x: f64, y: f64, shape: Shape) -> DrawableObject {
    DrawableObject::new(Header { x, y, stroke_width: 2.0, ..Header::default() }, shape)
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> DrawableObject {
    object(x, y, Shape::Rectangle { width: w, height: h })
}

fn scene_of(objects: Vec<DrawableObject>) -> Scene {
    let mut scene = Scene::new();
    for obj in objects {
        scene.add_object(obj);
    }
    scene
}

// =============================================================
// Transforms
// =============================================================

#[test]
fn unrotated_bounds_follow_header() {
    let obj = rect(10.0, 20.0, 100.0, 50.0);
    assert_eq!(scene_bounds(&obj), Rect::from_xywh(10.0, 20.0, 100.0, 50.0));
}

#[test]
fn scaled_bounds_grow_from_origin() {
    let mut obj = rect(10.0, 20.0, 100.0, 50.0);
    obj.header.scale_x = 2.0;
    obj.header.scale_y = 0.5;
    assert_eq!(scene_bounds(&obj), Rect::from_xywh(10.0, 20.0, 200.0, 25.0));
}

#[test]
fn quarter_turn_swaps_extent_about_center() {
    let mut obj = rect(0.0, 0.0, 100.0, 50.0);
    obj.header.rotation = 90.0;
    let b = scene_bounds(&obj);
    assert!(approx(b.width(), 50.0));
    assert!(approx(b.height(), 100.0));
    assert!(approx(b.center().x, 50.0));
    assert!(approx(b.center().y, 25.0));
}

#[test]
fn local_scene_roundtrip() {
    let mut obj = rect(30.0, -10.0, 80.0, 40.0);
    obj.header.rotation = 33.0;
    obj.header.scale_x = 1.5;
    let p = Point::new(12.0, 7.0);
    let back = scene_to_local(&obj, local_to_scene(&obj, p));
    assert!(approx(back.x, p.x) && approx(back.y, p.y));
}

#[test]
fn paint_bounds_include_stroke() {
    let obj = rect(0.0, 0.0, 10.0, 10.0);
    assert_eq!(paint_bounds(&obj), Rect::from_xywh(-1.0, -1.0, 12.0, 12.0));
}

#[test]
fn scene_extent_unions_objects() {
    let scene = scene_of(vec![rect(0.0, 0.0, 10.0, 10.0), rect(50.0, 50.0, 10.0, 10.0)]);
    assert_eq!(scene_extent(&scene), Some(Rect::from_xywh(-1.0, -1.0, 62.0, 62.0)));
    assert_eq!(scene_extent(&Scene::new()), None);
}

// =============================================================
// Per-variant hits
// =============================================================

#[test]
fn rectangle_hits_inside_and_misses_outside() {
    let obj = rect(0.0, 0.0, 100.0, 100.0);
    assert!(hits_object(&obj, Point::new(50.0, 50.0), 0.0));
    assert!(!hits_object(&obj, Point::new(150.0, 50.0), 0.0));
}

#[test]
fn circle_misses_bounding_box_corner() {
    let obj = object(0.0, 0.0, Shape::Circle { radius: 50.0 });
    assert!(hits_object(&obj, Point::new(50.0, 50.0), 0.0));
    assert!(!hits_object(&obj, Point::new(3.0, 3.0), 0.0));
}

#[test]
fn triangle_misses_top_corners() {
    let obj = object(0.0, 0.0, Shape::Triangle { width: 100.0, height: 100.0 });
    assert!(hits_object(&obj, Point::new(50.0, 80.0), 0.0));
    assert!(!hits_object(&obj, Point::new(5.0, 5.0), 0.0));
}

#[test]
fn line_hits_within_slop() {
    let obj = object(0.0, 0.0, Shape::Line { dx: 100.0, dy: 0.0 });
    assert!(hits_object(&obj, Point::new(50.0, 4.0), 4.0));
    assert!(!hits_object(&obj, Point::new(50.0, 20.0), 4.0));
}

#[test]
fn freehand_hits_along_polyline() {
    let points = vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(50.0, 50.0)];
    let obj = object(0.0, 0.0, Shape::FreehandPath { points });
    assert!(hits_object(&obj, Point::new(50.0, 25.0), 1.0));
    assert!(!hits_object(&obj, Point::new(10.0, 40.0), 1.0));
}

#[test]
fn rotated_rectangle_uses_local_space() {
    let mut obj = rect(0.0, 0.0, 100.0, 10.0);
    obj.header.rotation = 90.0;
    // Rotated about (50, 5): now spans x 45..55, y -45..55.
    assert!(hits_object(&obj, Point::new(50.0, -40.0), 0.0));
    assert!(!hits_object(&obj, Point::new(90.0, 5.0), 0.0));
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn hit_test_prefers_topmost() {
    let bottom = rect(0.0, 0.0, 100.0, 100.0);
    let top = rect(50.0, 50.0, 100.0, 100.0);
    let top_id = top.id;
    let scene = scene_of(vec![bottom, top]);
    let hit = hit_test(Point::new(75.0, 75.0), &scene, &Camera::default(), &[]).unwrap();
    assert_eq!(hit, Hit { object_id: top_id, part: HitPart::Body });
}

#[test]
fn hit_test_empty_space_is_none() {
    let scene = scene_of(vec![rect(0.0, 0.0, 10.0, 10.0)]);
    assert!(hit_test(Point::new(500.0, 500.0), &scene, &Camera::default(), &[]).is_none());
}

#[test]
fn hit_test_finds_handle_of_single_selection() {
    let obj = rect(0.0, 0.0, 100.0, 100.0);
    let id = obj.id;
    let scene = scene_of(vec![obj]);
    let hit = hit_test(Point::new(101.0, 99.0), &scene, &Camera::default(), &[id]).unwrap();
    assert_eq!(hit.part, HitPart::ResizeHandle(ResizeAnchor::Se));
}

#[test]
fn hit_test_ignores_handles_for_multi_selection() {
    let a = rect(0.0, 0.0, 100.0, 100.0);
    let b = rect(300.0, 0.0, 10.0, 10.0);
    let ids = [a.id, b.id];
    let scene = scene_of(vec![a, b]);
    let hit = hit_test(Point::new(100.0, 100.0), &scene, &Camera::default(), &ids).unwrap();
    assert_eq!(hit.part, HitPart::Body);
}

#[test]
fn slop_shrinks_when_zoomed_in() {
    let obj = object(0.0, 0.0, Shape::Line { dx: 100.0, dy: 0.0 });
    let scene = scene_of(vec![obj]);
    let near = Point::new(50.0, 5.0);
    assert!(hit_test(near, &scene, &Camera::default(), &[]).is_some());
    let zoomed = Camera { zoom: 4.0, ..Camera::default() };
    assert!(hit_test(near, &scene, &zoomed, &[]).is_none());
}

#[test]
fn objects_in_rect_keeps_paint_order() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = rect(100.0, 100.0, 10.0, 10.0);
    let c = rect(5.0, 5.0, 10.0, 10.0);
    let (ida, idc) = (a.id, c.id);
    let scene = scene_of(vec![a, b, c]);
    let found = objects_in_rect(&scene, &Rect::from_xywh(-5.0, -5.0, 30.0, 30.0));
    assert_eq!(found, vec![ida, idc]);
}

// =============================================================
// Resize
// =============================================================

#[test]
fn handle_positions_on_bounds() {
    let b = Rect::from_xywh(0.0, 0.0, 100.0, 50.0);
    assert_eq!(ResizeAnchor::Nw.position(&b), Point::new(0.0, 0.0));
    assert_eq!(ResizeAnchor::E.position(&b), Point::new(100.0, 25.0));
    assert_eq!(ResizeAnchor::S.position(&b), Point::new(50.0, 50.0));
}

#[test]
fn resize_se_grows_keeping_origin() {
    let obj = rect(10.0, 10.0, 100.0, 50.0);
    let patch = resize_patch(&obj, ResizeAnchor::Se, Point::new(100.0, 50.0));
    assert!(approx(patch.scale_x.unwrap(), 2.0));
    assert!(approx(patch.scale_y.unwrap(), 2.0));
    assert!(approx(patch.x.unwrap(), 10.0));
    assert!(approx(patch.y.unwrap(), 10.0));
}

#[test]
fn resize_nw_keeps_opposite_corner() {
    let mut obj = rect(10.0, 10.0, 100.0, 50.0);
    let patch = resize_patch(&obj, ResizeAnchor::Nw, Point::new(50.0, 25.0));
    obj.apply_patch(&patch);
    let b = scene_bounds(&obj);
    assert!(approx(b.max.x, 110.0));
    assert!(approx(b.max.y, 60.0));
    assert!(approx(b.width(), 50.0));
    assert!(approx(b.height(), 25.0));
}

#[test]
fn resize_edge_handle_touches_one_axis() {
    let obj = rect(0.0, 0.0, 100.0, 50.0);
    let patch = resize_patch(&obj, ResizeAnchor::E, Point::new(50.0, 999.0));
    assert!(approx(patch.scale_x.unwrap(), 1.5));
    assert!(approx(patch.scale_y.unwrap(), 1.0));
}

#[test]
fn resize_never_collapses() {
    let obj = rect(0.0, 0.0, 100.0, 50.0);
    let patch = resize_patch(&obj, ResizeAnchor::E, Point::new(-500.0, 0.0));
    let scale_x = patch.scale_x.unwrap();
    assert!(scale_x > 0.0);
    assert!(approx(100.0 * scale_x, MIN_RESIZE_EXTENT));
}

#[test]
fn resize_horizontal_line_keeps_y_scale() {
    let obj = object(0.0, 0.0, Shape::Line { dx: 100.0, dy: 0.0 });
    let patch = resize_patch(&obj, ResizeAnchor::Se, Point::new(100.0, 100.0));
    assert!(approx(patch.scale_x.unwrap(), 2.0));
    assert!(approx(patch.scale_y.unwrap(), 1.0));
}

// =============================================================
// Primitives
// =============================================================

#[test]
fn segment_distance_endpoints_and_interior() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 0.0);
    assert!(approx(segment_distance(Point::new(5.0, 3.0), a, b), 3.0));
    assert!(approx(segment_distance(Point::new(-4.0, 3.0), a, b), 5.0));
    assert!(approx(segment_distance(Point::new(1.0, 1.0), a, a), 2f64.sqrt()));
}
