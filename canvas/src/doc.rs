//! Scene model: scene objects, their properties, and the in-memory store.
//!
//! This module defines what lives on the canvas (`SceneObject`, `ObjectKind`),
//! a sparse-update type for incremental edits (`PartialSceneObject`), a typed
//! accessor for the open-ended `props` JSON bag (`Props`), and the store that
//! exclusively owns every live object (`DocStore`).
//!
//! The serialized form of `SceneObject` is the schema scene persistence must
//! round-trip; the engine never writes it anywhere itself.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::arrow::{ArrowLine, Segment};
use crate::viewport::Point;

/// Unique identifier for a scene object.
pub type ObjectId = Uuid;

/// The kind of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Axis-aligned rectangle (before rotation).
    Rect,
    /// Ellipse inscribed in the bounding box; circles have `width == height`.
    Ellipse,
    /// Editable text box.
    Text,
    /// Bitmap placed from an AI result or an upload.
    Image,
    /// Freehand stroke through `points`.
    Path,
    /// Arrow whose geometry is driven by its logical endpoints.
    Arrow,
}

/// Encoded bitmap carried by an [`ObjectKind::Image`] object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// MIME type of `bytes`, e.g. `"image/png"`.
    pub mime: String,
    pub width_px: u32,
    pub height_px: u32,
    pub bytes: Vec<u8>,
}

/// Axis-aligned rectangle in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Smallest rectangle containing every point, or `None` for an empty iterator.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}

/// A scene object as stored in the scene and in persisted documents.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique identifier for this object.
    pub id: ObjectId,
    /// Shape type.
    pub kind: ObjectKind,
    /// Left edge of the unrotated bounding box in scene coordinates.
    pub left: f64,
    /// Top edge of the unrotated bounding box in scene coordinates.
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the bounding-box center.
    pub rotation: f64,
    /// Stacking order; lower values are drawn beneath higher values.
    pub z_index: i64,
    /// Whether the object can become the selection.
    pub selectable: bool,
    /// Whether the object takes part in hit-testing.
    pub evented: bool,
    #[serde(default)]
    pub lock_rotation: bool,
    #[serde(default)]
    pub lock_scaling: bool,
    /// Open-ended per-kind properties (fill, stroke, text, font size).
    #[serde(default)]
    pub props: serde_json::Value,
    /// Logical endpoints in local space; authoritative for arrows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow: Option<ArrowLine>,
    /// Rendered arrow geometry in local space, derived from `arrow`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Segment>,
    /// Freehand stroke points in local space.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,
}

impl SceneObject {
    /// A selectable, evented object with a fresh id and empty props.
    #[must_use]
    pub fn new(kind: ObjectKind, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            left,
            top,
            width,
            height,
            rotation: 0.0,
            z_index: 0,
            selectable: true,
            evented: true,
            lock_rotation: false,
            lock_scaling: false,
            props: serde_json::json!({}),
            arrow: None,
            path: Vec::new(),
            points: Vec::new(),
            image: None,
        }
    }

    /// Scene-space center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    /// Map a point from this object's local space (origin at `left/top`) into scene space.
    #[must_use]
    pub fn local_to_scene(&self, local: Point) -> Point {
        let p = Point::new(self.left + local.x, self.top + local.y);
        rotate_about(p, self.center(), self.rotation)
    }

    /// Inverse of [`SceneObject::local_to_scene`].
    #[must_use]
    pub fn scene_to_local(&self, scene: Point) -> Point {
        let p = rotate_about(scene, self.center(), -self.rotation);
        Point::new(p.x - self.left, p.y - self.top)
    }

    /// Whether `scene` falls inside the (rotated) bounding box.
    #[must_use]
    pub fn contains_point(&self, scene: Point) -> bool {
        let local = self.scene_to_local(scene);
        local.x >= 0.0 && local.x <= self.width && local.y >= 0.0 && local.y <= self.height
    }

    /// Axis-aligned bounds of the rotated bounding box.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(self.width, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ];
        Rect::from_points(corners.map(|c| self.local_to_scene(c)))
            .unwrap_or_else(|| Rect::new(self.left, self.top, self.width, self.height))
    }

    /// Bounds of the drawn geometry, when tighter than the bounding box is known.
    ///
    /// Arrows include their head strokes; freehand paths use their points.
    /// Other kinds return `None`.
    #[must_use]
    pub fn precise_bounds(&self) -> Option<Rect> {
        match self.kind {
            ObjectKind::Arrow => Rect::from_points(
                self.path
                    .iter()
                    .flat_map(|s| [s.from, s.to])
                    .map(|p| self.local_to_scene(p)),
            ),
            ObjectKind::Path => Rect::from_points(self.points.iter().map(|p| self.local_to_scene(*p))),
            _ => None,
        }
    }
}

fn rotate_about(p: Point, pivot: Point, degrees: f64) -> Point {
    if degrees.abs() < f64::EPSILON {
        return p;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = p.x - pivot.x;
    let dy = p.y - pivot.y;
    Point::new(pivot.x + dx * cos - dy * sin, pivot.y + dx * sin + dy * cos)
}

/// Sparse update for a scene object. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialSceneObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// Props keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow: Option<ArrowLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Segment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
}

impl PartialSceneObject {
    /// Geometry fields (position, size, arrow line and path) copied from `obj`.
    #[must_use]
    pub fn geometry_of(obj: &SceneObject) -> Self {
        Self {
            left: Some(obj.left),
            top: Some(obj.top),
            width: Some(obj.width),
            height: Some(obj.height),
            arrow: obj.arrow,
            path: (!obj.path.is_empty()).then(|| obj.path.clone()),
            points: (!obj.points.is_empty()).then(|| obj.points.clone()),
            ..Default::default()
        }
    }
}

/// Typed access to common props fields from a `SceneObject.props` JSON value.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Stroke width in scene units. Defaults to `1.0`.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        self.value
            .get("stroke_width")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(1.0)
    }

    /// Text content. Empty string when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.value
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}

/// In-memory store of scene objects. The scene exclusively owns every object.
pub struct DocStore {
    objects: HashMap<ObjectId, SceneObject>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { objects: HashMap::new() }
    }

    /// Insert or replace an object. If an object with the same `id` already
    /// exists it is overwritten.
    pub fn insert(&mut self, obj: SceneObject) {
        self.objects.insert(obj.id, obj);
    }

    /// Remove an object by id, returning it if it was present.
    pub fn remove(&mut self, id: &ObjectId) -> Option<SceneObject> {
        self.objects.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    /// Apply a partial update to an existing object. Returns false if the object doesn't exist.
    pub fn apply_partial(&mut self, id: &ObjectId, partial: &PartialSceneObject) -> bool {
        let Some(obj) = self.objects.get_mut(id) else {
            return false;
        };
        if let Some(left) = partial.left {
            obj.left = left;
        }
        if let Some(top) = partial.top {
            obj.top = top;
        }
        if let Some(w) = partial.width {
            obj.width = w;
        }
        if let Some(h) = partial.height {
            obj.height = h;
        }
        if let Some(r) = partial.rotation {
            obj.rotation = r;
        }
        if let Some(z) = partial.z_index {
            obj.z_index = z;
        }
        if let Some(line) = partial.arrow {
            obj.arrow = Some(line);
        }
        if let Some(ref path) = partial.path {
            obj.path.clone_from(path);
        }
        if let Some(ref points) = partial.points {
            obj.points.clone_from(points);
        }
        if let Some(ref props) = partial.props {
            let Some(incoming) = props.as_object() else {
                return false;
            };

            if !obj.props.is_object() {
                obj.props = serde_json::json!({});
            }

            if let Some(existing) = obj.props.as_object_mut() {
                for (k, v) in incoming {
                    if v.is_null() {
                        existing.remove(k);
                    } else {
                        existing.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        true
    }

    /// Replace all objects with a full snapshot.
    pub fn load_snapshot(&mut self, objects: Vec<SceneObject>) {
        self.objects.clear();
        for obj in objects {
            self.objects.insert(obj.id, obj);
        }
    }

    /// All objects sorted by `(z_index, id)`, bottom first (draw order).
    #[must_use]
    pub fn sorted_objects(&self) -> Vec<&SceneObject> {
        let mut objs: Vec<&SceneObject> = self.objects.values().collect();
        objs.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        objs
    }

    /// All objects topmost first (hit-test order).
    #[must_use]
    pub fn topmost_first(&self) -> Vec<&SceneObject> {
        let mut objs = self.sorted_objects();
        objs.reverse();
        objs
    }

    /// A z-index that places a new object above everything currently in the scene.
    #[must_use]
    pub fn next_z_index(&self) -> i64 {
        self.objects
            .values()
            .map(|o| o.z_index)
            .max()
            .map_or(0, |z| z.saturating_add(1))
    }

    /// Number of objects currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the store contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}
