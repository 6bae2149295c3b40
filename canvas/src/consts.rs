//! Shared numeric defaults for the canvas crate.
//!
//! These seed [`crate::config::CanvasConfig::default`]; engine code reads the
//! live values from the config rather than from here.

use std::f64::consts::PI;

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom scale.
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed zoom scale.
pub const MAX_SCALE: f64 = 10.0;

/// Wheel zoom base: each pixel of vertical wheel delta scales by this factor.
pub const WHEEL_ZOOM_BASE: f64 = 0.999;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space distance within which a thin arrow shaft still counts as hit.
pub const HIT_TOLERANCE_PX: f64 = 12.0;

/// Screen-space hit radius for arrow endpoint handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Arrows ──────────────────────────────────────────────────────

/// Length of each arrowhead stroke in scene units.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;

/// Arrowhead half-angle in radians (30°).
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

// ── Overlay ─────────────────────────────────────────────────────

/// Pixel inset that pulls the AI edit button just inside the selection corner.
pub const OVERLAY_INSET_PX: f64 = 8.0;

/// Vertical gap between the edit button anchor and the prompt dialog.
pub const DIALOG_GAP_PX: f64 = 12.0;

// ── Objects ─────────────────────────────────────────────────────

/// Stroke width applied to newly drawn shapes.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Font size for newly created text objects.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Initial width of a newly created text box.
pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;

/// Scene-space gap between a selection and the AI result placed beside it.
pub const AI_RESULT_OFFSET: f64 = 20.0;

// ── Credits ─────────────────────────────────────────────────────

/// Credits charged for one AI edit of a selection.
pub const AI_EDIT_COST: u32 = 1;

/// Credits charged for one AI image generation.
pub const AI_GENERATE_COST: u32 = 1;
