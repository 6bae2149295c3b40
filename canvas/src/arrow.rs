//! Arrow geometry and endpoint handles.
//!
//! An arrow stores its logical endpoints (`ArrowLine`) in local space, relative
//! to the object's `left/top`. The endpoints are authoritative: the bounding
//! box and the three rendered segments (shaft plus two head strokes) are always
//! re-derived from them. `left/top` is kept at the min corner of the endpoint
//! pair so local coordinates never go negative.
//!
//! Arrows are edited only through their two endpoint handles. They carry
//! `lock_rotation` and `lock_scaling`, and every geometry rewrite resets
//! rotation to zero.

#[cfg(test)]
#[path = "arrow_test.rs"]
mod arrow_test;

use serde::{Deserialize, Serialize};

use crate::config::CanvasConfig;
use crate::doc::{ObjectKind, SceneObject};
use crate::viewport::{Point, Viewport};

/// Logical arrow endpoints in the owning object's local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrowLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl ArrowLine {
    #[must_use]
    pub fn new(start: Point, end: Point) -> Self {
        Self { x1: start.x, y1: start.y, x2: end.x, y2: end.y }
    }

    /// The tail of the arrow.
    #[must_use]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// The tip of the arrow, where the head is drawn.
    #[must_use]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    #[must_use]
    pub fn endpoint(&self, end: ArrowEnd) -> Point {
        match end {
            ArrowEnd::Start => self.start(),
            ArrowEnd::End => self.end(),
        }
    }

    /// Copy of this line with one endpoint replaced.
    #[must_use]
    pub fn with_endpoint(self, end: ArrowEnd, p: Point) -> Self {
        match end {
            ArrowEnd::Start => Self { x1: p.x, y1: p.y, ..self },
            ArrowEnd::End => Self { x2: p.x, y2: p.y, ..self },
        }
    }

    /// Direction of the shaft in radians, from start to end.
    #[must_use]
    pub fn angle(&self) -> f64 {
        (self.y2 - self.y1).atan2(self.x2 - self.x1)
    }
}

/// Which end of an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowEnd {
    Start,
    End,
}

/// One straight stroke of a rendered path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Arrowhead shape parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowStyle {
    /// Length of each head stroke.
    pub head_length: f64,
    /// Half-angle between the shaft and each head stroke, in radians.
    pub head_angle: f64,
}

impl ArrowStyle {
    #[must_use]
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self { head_length: config.arrow_head_length, head_angle: config.arrow_head_angle }
    }
}

/// Derive the rendered geometry: `[shaft, head_left, head_right]`.
///
/// A zero-length line yields a degenerate shaft and heads pointing along +x.
#[must_use]
pub fn arrow_path(line: ArrowLine, style: ArrowStyle) -> [Segment; 3] {
    let tip = line.end();
    let angle = line.angle();
    let head = |offset: f64| Point {
        x: tip.x - style.head_length * (angle - offset).cos(),
        y: tip.y - style.head_length * (angle - offset).sin(),
    };
    [
        Segment { from: line.start(), to: tip },
        Segment { from: head(style.head_angle), to: tip },
        Segment { from: head(-style.head_angle), to: tip },
    ]
}

/// Split a pair of scene endpoints into a min-corner origin and a local line.
#[must_use]
pub fn normalize(a: Point, b: Point) -> (Point, ArrowLine) {
    let origin = Point::new(a.x.min(b.x), a.y.min(b.y));
    let local = ArrowLine::new(
        Point::new(a.x - origin.x, a.y - origin.y),
        Point::new(b.x - origin.x, b.y - origin.y),
    );
    (origin, local)
}

/// Rewrite an arrow's position, size, logical line and path from scene endpoints.
pub fn set_scene_endpoints(obj: &mut SceneObject, start: Point, end: Point, style: ArrowStyle) {
    let (origin, line) = normalize(start, end);
    obj.rotation = 0.0;
    obj.left = origin.x;
    obj.top = origin.y;
    obj.width = (end.x - start.x).abs();
    obj.height = (end.y - start.y).abs();
    obj.arrow = Some(line);
    obj.path = arrow_path(line, style).to_vec();
}

/// A new arrow object from `start` to `end` in scene space.
#[must_use]
pub fn new_arrow(start: Point, end: Point, style: ArrowStyle) -> SceneObject {
    let mut obj = SceneObject::new(ObjectKind::Arrow, start.x, start.y, 0.0, 0.0);
    obj.lock_rotation = true;
    obj.lock_scaling = true;
    set_scene_endpoints(&mut obj, start, end, style);
    obj
}

/// Scene-space `(start, end)` of an arrow object.
#[must_use]
pub fn scene_endpoints(obj: &SceneObject) -> Option<(Point, Point)> {
    let line = obj.arrow?;
    Some((obj.local_to_scene(line.start()), obj.local_to_scene(line.end())))
}

/// Screen-space positions of both endpoint handles.
#[must_use]
pub fn handle_positions(obj: &SceneObject, viewport: &Viewport) -> Option<[(ArrowEnd, Point); 2]> {
    let (start, end) = scene_endpoints(obj)?;
    Some([
        (ArrowEnd::Start, viewport.scene_to_screen(start)),
        (ArrowEnd::End, viewport.scene_to_screen(end)),
    ])
}

/// Move one endpoint handle to `screen` and re-derive the arrow's geometry.
///
/// The other endpoint keeps its scene position even though its local
/// coordinates change when the min corner moves. Returns `false` when `obj` is
/// not an arrow or the target is not finite.
pub fn drag_handle(
    obj: &mut SceneObject,
    end: ArrowEnd,
    screen: Point,
    viewport: &Viewport,
    style: ArrowStyle,
) -> bool {
    let Some(line) = obj.arrow else {
        return false;
    };
    let scene = viewport.screen_to_scene(screen);
    if !scene.is_finite() {
        return false;
    }
    let updated = line.with_endpoint(end, obj.scene_to_local(scene));
    let start = obj.local_to_scene(updated.start());
    let tip = obj.local_to_scene(updated.end());
    set_scene_endpoints(obj, start, tip, style);
    true
}
