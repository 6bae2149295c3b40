//! Hit-testing: which object, or which arrow handle, lies under a point.
//!
//! Resolution order under the select tool:
//! 1. Endpoint handles of the selected arrow (screen-space radius).
//! 2. Native test, topmost first: stroke-precise for arrows, rotated bounding
//!    box for everything else.
//! 3. Thin-stroke fallback: perpendicular distance from an arrow's shaft,
//!    within a zoom-adjusted tolerance. A thin diagonal arrow's bounding box is
//!    mostly empty space, so the native test alone leaves the stroke nearly
//!    impossible to grab.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::arrow::{self, ArrowEnd};
use crate::config::CanvasConfig;
use crate::doc::{DocStore, ObjectId, ObjectKind, Props, SceneObject};
use crate::viewport::{Point, Viewport};

/// Which part of an object was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ArrowHandle(ArrowEnd),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub object_id: ObjectId,
    pub part: HitPart,
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

fn native_contains(obj: &SceneObject, scene_pt: Point) -> bool {
    match obj.kind {
        ObjectKind::Arrow => {
            let half_stroke = Props::new(&obj.props).stroke_width() * 0.5;
            obj.path.iter().any(|s| {
                let a = obj.local_to_scene(s.from);
                let b = obj.local_to_scene(s.to);
                point_segment_distance(scene_pt, a, b) <= half_stroke
            })
        }
        _ => obj.contains_point(scene_pt),
    }
}

/// Native hit test: the topmost evented object under `scene_pt`.
#[must_use]
pub fn hit_object(doc: &DocStore, scene_pt: Point) -> Option<ObjectId> {
    doc.topmost_first()
        .into_iter()
        .filter(|o| o.evented)
        .find(|o| native_contains(o, scene_pt))
        .map(|o| o.id)
}

/// Thin-stroke fallback: the topmost evented arrow whose shaft lies within `tolerance` of `scene_pt`.
///
/// Overlapping candidates resolve by z-order.
#[must_use]
pub fn fallback_hit(doc: &DocStore, scene_pt: Point, tolerance: f64) -> Option<ObjectId> {
    doc.topmost_first()
        .into_iter()
        .filter(|o| o.evented && o.kind == ObjectKind::Arrow)
        .find(|o| {
            arrow::scene_endpoints(o)
                .is_some_and(|(a, b)| point_segment_distance(scene_pt, a, b) <= tolerance)
        })
        .map(|o| o.id)
}

/// Which endpoint handle of `obj`, if any, lies within `radius_px` of `screen_pt`.
#[must_use]
pub fn hit_arrow_handle(obj: &SceneObject, screen_pt: Point, viewport: &Viewport, radius_px: f64) -> Option<ArrowEnd> {
    let handles = arrow::handle_positions(obj, viewport)?;
    handles
        .into_iter()
        .filter(|(_, p)| p.distance(screen_pt) <= radius_px)
        .min_by(|(_, a), (_, b)| a.distance(screen_pt).total_cmp(&b.distance(screen_pt)))
        .map(|(end, _)| end)
}

/// Full select-tool hit test at a screen-space point.
///
/// Checks the selected arrow's handles first, then the native test, then the
/// thin-stroke fallback.
#[must_use]
pub fn hit_test(
    doc: &DocStore,
    viewport: &Viewport,
    screen_pt: Point,
    selected_id: Option<ObjectId>,
    config: &CanvasConfig,
) -> Option<Hit> {
    if let Some(selected) = selected_id.and_then(|id| doc.get(&id)) {
        if let Some(end) = hit_arrow_handle(selected, screen_pt, viewport, config.handle_radius_px) {
            return Some(Hit { object_id: selected.id, part: HitPart::ArrowHandle(end) });
        }
    }

    let scene_pt = viewport.screen_to_scene(screen_pt);
    if !scene_pt.is_finite() {
        return None;
    }
    let tolerance = viewport.screen_dist_to_scene(config.hit_tolerance_px);
    hit_object(doc, scene_pt)
        .or_else(|| fallback_hit(doc, scene_pt, tolerance))
        .map(|object_id| Hit { object_id, part: HitPart::Body })
}
