//! Drag-to-create shapes and freehand strokes.
//!
//! A drag gesture inserts a preview object into the scene on pointer-down,
//! resizes it on every pointer-move, and on pointer-up either commits it
//! (making it selectable and hit-testable) or, when interrupted, removes it.
//! Previews are `selectable = false, evented = false` so they never capture
//! hits while the gesture is live.
//!
//! Text is not a drag gesture: [`create_text`] builds a finished text box in
//! one step.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use serde_json::json;

use crate::arrow::{self, ArrowStyle};
use crate::config::CanvasConfig;
use crate::consts::DEFAULT_TEXT_WIDTH;
use crate::doc::{DocStore, ObjectId, ObjectKind, Rect, SceneObject};
use crate::input::Tool;
use crate::viewport::Point;

/// Line height multiplier applied to the font size for a new text box.
const TEXT_LINE_HEIGHT: f64 = 1.25;

/// An in-progress shape-creation gesture. Never outlives one pointer-down/up pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Drag-capable tool that started the gesture.
    pub tool: Tool,
    /// Scene-space pointer-down position.
    pub start: Point,
    /// The preview object living in the scene.
    pub preview_id: ObjectId,
}

/// An in-progress freehand stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct FreehandSession {
    pub id: ObjectId,
    /// Stroke points in scene space, in input order.
    pub points: Vec<Point>,
}

fn preview_style(obj: &mut SceneObject, z_index: i64, config: &CanvasConfig) {
    obj.selectable = false;
    obj.evented = false;
    obj.z_index = z_index;
    obj.props = json!({
        "stroke": "#1F1A17",
        "stroke_width": config.default_stroke_width,
    });
}

/// Insert a zero-size preview for `tool` at `start`.
///
/// Returns `None` for tools that are not drag gestures (including text).
pub fn begin(doc: &mut DocStore, tool: Tool, start: Point, config: &CanvasConfig) -> Option<DragSession> {
    if !start.is_finite() {
        return None;
    }
    let mut obj = match tool {
        Tool::Rectangle => SceneObject::new(ObjectKind::Rect, start.x, start.y, 0.0, 0.0),
        Tool::Circle => SceneObject::new(ObjectKind::Ellipse, start.x, start.y, 0.0, 0.0),
        Tool::Arrow => arrow::new_arrow(start, start, ArrowStyle::from_config(config)),
        _ => return None,
    };
    preview_style(&mut obj, doc.next_z_index(), config);
    let session = DragSession { tool, start, preview_id: obj.id };
    doc.insert(obj);
    Some(session)
}

/// Resize the preview so it spans from the session start to `point`.
///
/// Returns `false` if the preview is gone or `point` is not finite.
pub fn update(doc: &mut DocStore, session: &DragSession, point: Point, config: &CanvasConfig) -> bool {
    if !point.is_finite() {
        return false;
    }
    let Some(obj) = doc.get_mut(&session.preview_id) else {
        return false;
    };
    let start = session.start;
    match session.tool {
        Tool::Rectangle => {
            obj.left = start.x.min(point.x);
            obj.top = start.y.min(point.y);
            obj.width = (point.x - start.x).abs();
            obj.height = (point.y - start.y).abs();
        }
        Tool::Circle => {
            // Start and pointer are diametrically opposite points on the circle.
            let center = start.midpoint(point);
            let radius = start.distance(point) * 0.5;
            obj.left = center.x - radius;
            obj.top = center.y - radius;
            obj.width = radius * 2.0;
            obj.height = radius * 2.0;
        }
        Tool::Arrow => arrow::set_scene_endpoints(obj, start, point, ArrowStyle::from_config(config)),
        _ => return false,
    }
    true
}

/// Finalize the preview into a selectable, hit-testable object.
///
/// Zero-size results are valid. Returns the committed object, or `None` if the
/// preview no longer exists.
pub fn commit(doc: &mut DocStore, session: DragSession, config: &CanvasConfig) -> Option<SceneObject> {
    let obj = doc.get_mut(&session.preview_id)?;
    if session.tool == Tool::Arrow {
        if let Some((start, end)) = arrow::scene_endpoints(obj) {
            arrow::set_scene_endpoints(obj, start, end, ArrowStyle::from_config(config));
        }
    }
    obj.selectable = true;
    obj.evented = true;
    Some(obj.clone())
}

/// Remove the preview of an interrupted gesture. Returns whether anything was removed.
pub fn cancel(doc: &mut DocStore, session: DragSession) -> bool {
    doc.remove(&session.preview_id).is_some()
}

// =============================================================
// Freehand strokes
// =============================================================

fn set_stroke_points(obj: &mut SceneObject, scene_points: &[Point]) {
    let Some(bounds) = Rect::from_points(scene_points.iter().copied()) else {
        return;
    };
    obj.left = bounds.left;
    obj.top = bounds.top;
    obj.width = bounds.width;
    obj.height = bounds.height;
    obj.points = scene_points
        .iter()
        .map(|p| Point::new(p.x - bounds.left, p.y - bounds.top))
        .collect();
}

/// Insert a one-point preview path at `start`.
pub fn begin_stroke(doc: &mut DocStore, start: Point, config: &CanvasConfig) -> Option<FreehandSession> {
    if !start.is_finite() {
        return None;
    }
    let mut obj = SceneObject::new(ObjectKind::Path, start.x, start.y, 0.0, 0.0);
    preview_style(&mut obj, doc.next_z_index(), config);
    let session = FreehandSession { id: obj.id, points: vec![start] };
    set_stroke_points(&mut obj, &session.points);
    doc.insert(obj);
    Some(session)
}

/// Append `point` to the stroke and refit the preview's bounds.
///
/// A point equal to the last one recorded is skipped.
pub fn extend_stroke(doc: &mut DocStore, session: &mut FreehandSession, point: Point) -> bool {
    if !point.is_finite() || session.points.last() == Some(&point) {
        return false;
    }
    let Some(obj) = doc.get_mut(&session.id) else {
        return false;
    };
    session.points.push(point);
    set_stroke_points(obj, &session.points);
    true
}

/// Finalize the stroke. A single-point stroke commits as a dot.
pub fn commit_stroke(doc: &mut DocStore, session: FreehandSession) -> Option<SceneObject> {
    let obj = doc.get_mut(&session.id)?;
    set_stroke_points(obj, &session.points);
    obj.selectable = true;
    obj.evented = true;
    Some(obj.clone())
}

/// Remove the preview of an interrupted stroke.
pub fn cancel_stroke(doc: &mut DocStore, session: FreehandSession) -> bool {
    doc.remove(&session.id).is_some()
}

// =============================================================
// Text
// =============================================================

/// A new, empty text box anchored at `at`, ready for editing.
#[must_use]
pub fn create_text(doc: &DocStore, at: Point, config: &CanvasConfig) -> SceneObject {
    let mut obj = SceneObject::new(
        ObjectKind::Text,
        at.x,
        at.y,
        DEFAULT_TEXT_WIDTH,
        config.default_font_size * TEXT_LINE_HEIGHT,
    );
    obj.z_index = doc.next_z_index();
    obj.props = json!({
        "text": "",
        "font_size": config.default_font_size,
        "fill": "#1F1A17",
    });
    obj
}
