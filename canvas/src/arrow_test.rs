#![allow(clippy::float_cmp)]

use std::f64::consts::PI;

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn style() -> ArrowStyle {
    ArrowStyle { head_length: 15.0, head_angle: PI / 6.0 }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// ArrowLine
// =============================================================

#[test]
fn line_endpoints() {
    let line = ArrowLine::new(pt(1.0, 2.0), pt(3.0, 4.0));
    assert_eq!(line.endpoint(ArrowEnd::Start), pt(1.0, 2.0));
    assert_eq!(line.endpoint(ArrowEnd::End), pt(3.0, 4.0));
}

#[test]
fn line_with_endpoint_replaces_only_one_end() {
    let line = ArrowLine::new(pt(1.0, 2.0), pt(3.0, 4.0));
    let moved = line.with_endpoint(ArrowEnd::End, pt(9.0, 9.0));
    assert_eq!(moved.start(), pt(1.0, 2.0));
    assert_eq!(moved.end(), pt(9.0, 9.0));
}

#[test]
fn line_angle_points_from_start_to_end() {
    let line = ArrowLine::new(pt(0.0, 0.0), pt(0.0, 10.0));
    assert!(approx_eq(line.angle(), PI / 2.0));
}

// =============================================================
// arrow_path
// =============================================================

#[test]
fn path_has_shaft_and_two_heads() {
    let segs = arrow_path(ArrowLine::new(pt(0.0, 0.0), pt(100.0, 0.0)), style());
    assert_eq!(segs.len(), 3);
    assert_eq!(segs[0], Segment { from: pt(0.0, 0.0), to: pt(100.0, 0.0) });
    for head in &segs[1..] {
        assert_eq!(head.to, pt(100.0, 0.0));
        assert!(approx_eq(head.from.distance(head.to), 15.0));
    }
}

#[test]
fn path_heads_are_symmetric_about_shaft() {
    let segs = arrow_path(ArrowLine::new(pt(0.0, 0.0), pt(100.0, 0.0)), style());
    let a = segs[1].from;
    let b = segs[2].from;
    assert!(approx_eq(a.x, b.x));
    assert!(approx_eq(a.y, -b.y));
    // 15 * cos(30°)
    assert!(approx_eq(a.x, 100.0 - 15.0 * (PI / 6.0).cos()));
}

#[test]
fn path_zero_length_is_finite() {
    let segs = arrow_path(ArrowLine::new(pt(5.0, 5.0), pt(5.0, 5.0)), style());
    for s in segs {
        assert!(s.from.is_finite() && s.to.is_finite());
    }
}

// =============================================================
// normalize / new_arrow
// =============================================================

#[test]
fn normalize_moves_origin_to_min_corner() {
    let (origin, line) = normalize(pt(0.0, 0.0), pt(100.0, -50.0));
    assert_eq!(origin, pt(0.0, -50.0));
    assert_eq!(line.start(), pt(0.0, 50.0));
    assert_eq!(line.end(), pt(100.0, 0.0));
}

#[test]
fn new_arrow_has_min_corner_origin_and_three_segments() {
    let obj = new_arrow(pt(0.0, 0.0), pt(100.0, -50.0), style());
    assert_eq!(obj.kind, ObjectKind::Arrow);
    assert_eq!(obj.left, 0.0);
    assert_eq!(obj.top, -50.0);
    assert_eq!(obj.width, 100.0);
    assert_eq!(obj.height, 50.0);
    assert_eq!(obj.path.len(), 3);
    assert!(obj.lock_rotation && obj.lock_scaling);
}

#[test]
fn new_arrow_local_coords_non_negative() {
    let obj = new_arrow(pt(30.0, 80.0), pt(-20.0, 10.0), style());
    let line = obj.arrow.unwrap();
    for v in [line.x1, line.y1, line.x2, line.y2] {
        assert!(v >= 0.0);
    }
}

#[test]
fn scene_endpoints_round_trip() {
    let obj = new_arrow(pt(30.0, 80.0), pt(-20.0, 10.0), style());
    let (a, b) = scene_endpoints(&obj).unwrap();
    assert!(point_approx_eq(a, pt(30.0, 80.0)));
    assert!(point_approx_eq(b, pt(-20.0, 10.0)));
}

#[test]
fn scene_endpoints_none_for_non_arrow() {
    let obj = SceneObject::new(ObjectKind::Rect, 0.0, 0.0, 10.0, 10.0);
    assert!(scene_endpoints(&obj).is_none());
}

// =============================================================
// Handles
// =============================================================

#[test]
fn handle_positions_follow_viewport() {
    let obj = new_arrow(pt(10.0, 10.0), pt(50.0, 30.0), style());
    let vp = Viewport { scale_x: 2.0, scale_y: 2.0, translate_x: 5.0, translate_y: -5.0, ..Viewport::default() };
    let [(e0, p0), (e1, p1)] = handle_positions(&obj, &vp).unwrap();
    assert_eq!(e0, ArrowEnd::Start);
    assert_eq!(e1, ArrowEnd::End);
    assert!(point_approx_eq(p0, pt(25.0, 15.0)));
    assert!(point_approx_eq(p1, pt(105.0, 55.0)));
}

#[test]
fn drag_end_handle_keeps_start_fixed() {
    let mut obj = new_arrow(pt(0.0, 0.0), pt(100.0, -50.0), style());
    let vp = Viewport::default();
    assert!(drag_handle(&mut obj, ArrowEnd::End, pt(-40.0, 70.0), &vp, style()));
    let (a, b) = scene_endpoints(&obj).unwrap();
    assert!(point_approx_eq(a, pt(0.0, 0.0)));
    assert!(point_approx_eq(b, pt(-40.0, 70.0)));
    assert_eq!(obj.left, -40.0);
    assert_eq!(obj.top, 0.0);
}

#[test]
fn drag_start_handle_keeps_end_fixed_under_zoom() {
    let mut obj = new_arrow(pt(10.0, 10.0), pt(60.0, 40.0), style());
    let vp = Viewport { scale_x: 0.5, scale_y: 0.5, translate_x: 100.0, translate_y: 20.0, ..Viewport::default() };
    // screen (150, 70) -> scene (100, 100)
    assert!(drag_handle(&mut obj, ArrowEnd::Start, pt(150.0, 70.0), &vp, style()));
    let (a, b) = scene_endpoints(&obj).unwrap();
    assert!(point_approx_eq(a, pt(100.0, 100.0)));
    assert!(point_approx_eq(b, pt(60.0, 40.0)));
    assert_eq!(obj.left, 60.0);
    assert_eq!(obj.top, 40.0);
}

#[test]
fn drag_handle_regenerates_path() {
    let mut obj = new_arrow(pt(0.0, 0.0), pt(100.0, 0.0), style());
    drag_handle(&mut obj, ArrowEnd::End, pt(0.0, 100.0), &Viewport::default(), style());
    let line = obj.arrow.unwrap();
    assert_eq!(obj.path.len(), 3);
    assert_eq!(obj.path.to_vec(), arrow_path(line, style()).to_vec());
}

#[test]
fn drag_handle_rejects_non_arrow() {
    let mut obj = SceneObject::new(ObjectKind::Rect, 0.0, 0.0, 10.0, 10.0);
    assert!(!drag_handle(&mut obj, ArrowEnd::End, pt(5.0, 5.0), &Viewport::default(), style()));
}

#[test]
fn drag_handle_rejects_non_finite_target() {
    let mut obj = new_arrow(pt(0.0, 0.0), pt(10.0, 10.0), style());
    let before = obj.clone();
    assert!(!drag_handle(&mut obj, ArrowEnd::End, pt(f64::NAN, 0.0), &Viewport::default(), style()));
    assert_eq!(obj, before);
}
