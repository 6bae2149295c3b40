#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn vp(scale: f64, tx: f64, ty: f64) -> Viewport {
    Viewport { scale_x: scale, scale_y: scale, translate_x: tx, translate_y: ty, ..Viewport::default() }
}

// --- Point ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn point_distance() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

#[test]
fn point_midpoint() {
    let m = Point::new(-10.0, 4.0).midpoint(Point::new(10.0, 8.0));
    assert!(point_approx_eq(m, Point::new(0.0, 6.0)));
}

#[test]
fn point_is_finite_rejects_nan() {
    assert!(Point::new(1.0, 2.0).is_finite());
    assert!(!Point::new(f64::NAN, 2.0).is_finite());
    assert!(!Point::new(1.0, f64::INFINITY).is_finite());
}

// --- Viewport defaults ---

#[test]
fn viewport_default_is_identity() {
    let v = Viewport::default();
    assert_eq!(v.scale(), 1.0);
    assert_eq!(v.translate_x, 0.0);
    assert_eq!(v.translate_y, 0.0);
}

#[test]
fn viewport_default_limits() {
    let v = Viewport::default();
    assert_eq!(v.min_scale, crate::consts::MIN_SCALE);
    assert_eq!(v.max_scale, crate::consts::MAX_SCALE);
}

// --- screen_to_scene / scene_to_screen ---

#[test]
fn screen_to_scene_identity() {
    let v = Viewport::default();
    assert!(point_approx_eq(v.screen_to_scene(Point::new(50.0, 75.0)), Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_scene_with_zoom() {
    let v = vp(4.0, 0.0, 0.0);
    let scene = v.screen_to_scene(Point::new(40.0, 80.0));
    assert!(point_approx_eq(scene, Point::new(10.0, 20.0)));
}

#[test]
fn screen_to_scene_with_pan_and_zoom() {
    let v = vp(2.0, 50.0, 30.0);
    let scene = v.screen_to_scene(Point::new(0.0, 0.0));
    assert!(point_approx_eq(scene, Point::new(-25.0, -15.0)));
}

#[test]
fn scene_to_screen_with_pan_and_zoom() {
    let v = vp(3.0, 20.0, 10.0);
    // 5*3 + 20 = 35, 5*3 + 10 = 25
    let screen = v.scene_to_screen(Point::new(5.0, 5.0));
    assert!(point_approx_eq(screen, Point::new(35.0, 25.0)));
}

#[test]
fn round_trip_scene_first() {
    let v = vp(0.75, 13.7, -42.3);
    let scene = Point::new(333.3, -999.9);
    assert!(point_approx_eq(v.screen_to_scene(v.scene_to_screen(scene)), scene));
}

#[test]
fn round_trip_screen_first() {
    let v = vp(1.5, 10.0, 20.0);
    let screen = Point::new(400.0, 300.0);
    assert!(point_approx_eq(v.scene_to_screen(v.screen_to_scene(screen)), screen));
}

#[test]
fn round_trip_grid_of_points() {
    let v = vp(2.37, -120.5, 88.25);
    for x in [-500.0, -1.0, 0.0, 0.5, 640.0] {
        for y in [-300.0, 0.0, 12.25, 1e4] {
            let p = Point::new(x, y);
            assert!(point_approx_eq(v.scene_to_screen(v.screen_to_scene(p)), p));
            assert!(point_approx_eq(v.screen_to_scene(v.scene_to_screen(p)), p));
        }
    }
}

#[test]
fn screen_dist_to_scene_ignores_pan() {
    let v = vp(4.0, 999.0, -999.0);
    assert!(approx_eq(v.screen_dist_to_scene(8.0), 2.0));
}

// --- zoom_at ---

#[test]
fn zoom_at_changes_scale_uniformly() {
    let mut v = Viewport::default();
    assert!(v.zoom_at(Point::new(0.0, 0.0), 2.0));
    assert_eq!(v.scale_x, 2.0);
    assert_eq!(v.scale_y, 2.0);
}

#[test]
fn zoom_at_keeps_point_under_cursor_fixed() {
    let mut v = vp(1.3, 25.0, -40.0);
    for (p, f) in [
        (Point::new(400.0, 300.0), 1.2),
        (Point::new(-20.0, 900.0), 0.5),
        (Point::new(0.0, 0.0), 3.7),
        (Point::new(123.4, 56.7), 0.91),
    ] {
        let before = v.screen_to_scene(p);
        v.zoom_at(p, f);
        let after = v.screen_to_scene(p);
        assert!(point_approx_eq(before, after), "drifted at {p:?} factor {f}");
    }
}

#[test]
fn zoom_at_clamps_to_max() {
    let mut v = Viewport::default();
    assert!(v.zoom_at(Point::new(10.0, 10.0), 1e9));
    assert_eq!(v.scale(), v.max_scale);
}

#[test]
fn zoom_at_clamps_to_min() {
    let mut v = Viewport::default();
    assert!(v.zoom_at(Point::new(10.0, 10.0), 1e-9));
    assert_eq!(v.scale(), v.min_scale);
}

#[test]
fn zoom_at_scale_stays_within_limits_for_many_factors() {
    let mut v = Viewport::default();
    for f in [0.0001, 1.5, 80.0, 0.3, 1.0, 7.0, 1e6, 0.02] {
        v.zoom_at(Point::new(200.0, 150.0), f);
        assert!(v.scale() >= v.min_scale && v.scale() <= v.max_scale);
    }
}

#[test]
fn zoom_at_at_limit_is_noop() {
    let mut v = Viewport::default();
    v.zoom_at(Point::new(0.0, 0.0), 1e9);
    let snapshot = v;
    assert!(!v.zoom_at(Point::new(300.0, 300.0), 2.0));
    assert_eq!(v, snapshot);
}

#[test]
fn zoom_at_rejects_bad_factors() {
    let mut v = Viewport::default();
    assert!(!v.zoom_at(Point::new(0.0, 0.0), -2.0));
    assert!(!v.zoom_at(Point::new(0.0, 0.0), f64::NAN));
    assert!(!v.zoom_at(Point::new(f64::INFINITY, 0.0), 2.0));
    assert_eq!(v, Viewport::default());
}

#[test]
fn zoom_at_extreme_factors_clamp_to_limits() {
    let mut v = Viewport::default();
    let p = Point::new(400.0, 300.0);
    let anchor = v.screen_to_scene(p);
    assert!(v.zoom_at(p, f64::INFINITY));
    assert_eq!(v.scale(), v.max_scale);
    assert!(point_approx_eq(v.screen_to_scene(p), anchor));
    assert!(v.zoom_at(p, 0.0));
    assert_eq!(v.scale(), v.min_scale);
    assert!(point_approx_eq(v.screen_to_scene(p), anchor));
}

#[test]
fn zoom_in_twice_then_out_twice_restores_view() {
    let mut v = Viewport::default();
    let p = Point::new(400.0, 300.0);
    v.zoom_at(p, 1.2);
    v.zoom_at(p, 1.2);
    v.zoom_at(p, 1.0 / 1.2);
    v.zoom_at(p, 1.0 / 1.2);
    assert!(approx_eq(v.scale(), 1.0));
    assert!(approx_eq(v.translate_x, 0.0));
    assert!(approx_eq(v.translate_y, 0.0));
}

// --- pan_by ---

#[test]
fn pan_by_adds_translation() {
    let mut v = vp(2.0, 10.0, 10.0);
    assert!(v.pan_by(5.0, -15.0));
    assert_eq!(v.translate_x, 15.0);
    assert_eq!(v.translate_y, -5.0);
    assert_eq!(v.scale(), 2.0);
}

#[test]
fn pan_by_zero_is_noop() {
    let mut v = Viewport::default();
    assert!(!v.pan_by(0.0, 0.0));
}

#[test]
fn pan_by_rejects_non_finite() {
    let mut v = Viewport::default();
    assert!(!v.pan_by(f64::NAN, 1.0));
    assert_eq!(v, Viewport::default());
}

#[test]
fn viewport_serde_roundtrip() {
    let v = vp(1.5, 3.0, -4.0);
    let json = serde_json::to_string(&v).unwrap();
    let back: Viewport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, v);
}
