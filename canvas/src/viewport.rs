//! Viewport transform: uniform scale plus translation between scene and screen space.
//!
//! Scene coordinates are the zoom/pan-independent space every
//! [`crate::doc::SceneObject`] is stored in. Screen coordinates are CSS pixels
//! relative to the canvas element's top-left corner. The mapping is
//! `screen = scene * scale + translate`.
//!
//! Mutating methods report whether anything changed. They never render or
//! recompute overlays themselves; the engine turns a `true` into a
//! [`crate::engine::Action::ViewportChanged`] notification.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SCALE, MIN_SCALE};

/// A point in either screen or scene space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Pan/zoom state for the infinite canvas.
///
/// `scale_x` and `scale_y` always move together; `min_scale <= scale <= max_scale`
/// holds after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Horizontal translation in CSS pixels.
    pub translate_x: f64,
    /// Vertical translation in CSS pixels.
    pub translate_y: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::with_limits(MIN_SCALE, MAX_SCALE)
    }
}

impl Viewport {
    /// Identity viewport with the given zoom limits.
    #[must_use]
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        Self { scale_x: 1.0, scale_y: 1.0, translate_x: 0.0, translate_y: 0.0, min_scale, max_scale }
    }

    /// Current uniform zoom scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale_x
    }

    /// Convert a scene-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point {
            x: scene.x * self.scale_x + self.translate_x,
            y: scene.y * self.scale_y + self.translate_y,
        }
    }

    /// Convert a screen-space point (CSS pixels) to scene coordinates.
    #[must_use]
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.translate_x) / self.scale_x,
            y: (screen.y - self.translate_y) / self.scale_y,
        }
    }

    /// Convert a screen-space distance (pixels) to scene-space distance.
    #[must_use]
    pub fn screen_dist_to_scene(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale()
    }

    /// Zoom by `factor` while keeping the scene point under `screen` fixed.
    ///
    /// The resulting scale is clamped to `[min_scale, max_scale]`, so a zero
    /// factor zooms fully out and an infinite one fully in. Returns `false`
    /// (and leaves state untouched) when the clamped scale equals the current
    /// one, the factor is NaN or negative, or `screen` is not finite.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) -> bool {
        if factor.is_nan() || factor < 0.0 || !screen.is_finite() {
            return false;
        }
        let current = self.scale();
        let next = (current * factor).clamp(self.min_scale, self.max_scale);
        if (next - current).abs() <= f64::EPSILON * current {
            return false;
        }

        let anchor = self.screen_to_scene(screen);
        self.scale_x = next;
        self.scale_y = next;
        self.translate_x = screen.x - anchor.x * next;
        self.translate_y = screen.y - anchor.y * next;
        true
    }

    /// Shift the view by a screen-space delta. Scale is unchanged.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !dx.is_finite() || !dy.is_finite() || (dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON) {
            return false;
        }
        self.translate_x += dx;
        self.translate_y += dy;
        true
    }
}
