//! Input model: tools, modifier keys, mouse buttons, cursors, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `CanvasFlags` is the canvas-level configuration a tool implies
//! (selection, hit-testing, free drawing, cursor). `InputState` is the active
//! gesture being tracked between pointer-down and pointer-up, carrying all
//! context needed to compute incremental updates and emit final scene
//! mutations on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::arrow::ArrowEnd;
use crate::doc::ObjectId;
use crate::drag::{DragSession, FreehandSession};
use crate::viewport::Point;

/// Which tool is currently active. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Drag to pan the canvas.
    Pan,
    /// Freehand pen strokes.
    FreehandDraw,
    /// Drag out a rectangle.
    Rectangle,
    /// Drag out a circle.
    Circle,
    /// Click to place a text box.
    Text,
    /// Drag out an arrow.
    Arrow,
}

impl Tool {
    /// Whether this tool creates its shape by dragging (rectangle, circle, arrow).
    #[must_use]
    pub fn is_drag_shape(self) -> bool {
        matches!(self, Self::Rectangle | Self::Circle | Self::Arrow)
    }

    /// Whether the drawing-tool handler owns pointer-down for this tool.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        self.is_drag_shape() || self == Self::Text
    }

    /// Single-key shortcut for this tool.
    #[must_use]
    pub fn shortcut(self) -> char {
        match self {
            Self::Select => 'v',
            Self::Pan => 'h',
            Self::FreehandDraw => 'p',
            Self::Rectangle => 'r',
            Self::Circle => 'c',
            Self::Text => 't',
            Self::Arrow => 'a',
        }
    }

    /// Tool bound to a single-key shortcut, case-insensitive.
    #[must_use]
    pub fn from_shortcut(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let c = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        [
            Self::Select,
            Self::Pan,
            Self::FreehandDraw,
            Self::Rectangle,
            Self::Circle,
            Self::Text,
            Self::Arrow,
        ]
        .into_iter()
        .find(|t| t.shortcut() == c)
    }

    /// Canvas-level flags this tool implies.
    #[must_use]
    pub fn canvas_flags(self) -> CanvasFlags {
        match self {
            Self::Select => CanvasFlags {
                selection: true,
                hit_testing: true,
                free_drawing: false,
                cursor: Cursor::Default,
            },
            Self::Pan => CanvasFlags {
                selection: false,
                hit_testing: false,
                free_drawing: false,
                cursor: Cursor::Grab,
            },
            Self::FreehandDraw => CanvasFlags {
                selection: false,
                hit_testing: false,
                free_drawing: true,
                cursor: Cursor::Crosshair,
            },
            // Text keeps hit-testing so clicks on existing text re-open it.
            Self::Text => CanvasFlags {
                selection: false,
                hit_testing: true,
                free_drawing: false,
                cursor: Cursor::Crosshair,
            },
            Self::Rectangle | Self::Circle | Self::Arrow => CanvasFlags {
                selection: false,
                hit_testing: false,
                free_drawing: false,
                cursor: Cursor::Crosshair,
            },
        }
    }
}

/// Pointer cursor requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    #[default]
    Default,
    Grab,
    Grabbing,
    Crosshair,
    Move,
    /// Shared by both arrow endpoint handles.
    Pointer,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Crosshair => "crosshair",
            Self::Move => "move",
            Self::Pointer => "pointer",
        }
    }
}

/// Canvas-level interaction flags derived from the active tool.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasFlags {
    /// Objects can become the selection.
    pub selection: bool,
    /// Pointer-down resolves a target object.
    pub hit_testing: bool,
    /// Pointer drags record freehand strokes.
    pub free_drawing: bool,
    pub cursor: Cursor,
}

impl Default for CanvasFlags {
    fn default() -> Self {
        Tool::default().canvas_flags()
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`, `"r"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    #[serde(default)]
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool. The single authoritative cell every handler reads.
    pub tool: Tool,
    /// The id of the currently selected object, if any.
    pub selected_id: Option<ObjectId>,
    /// Text object currently open in the host's text editor.
    pub editing_text: Option<ObjectId>,
}

/// The gesture in progress between pointer-down and pointer-up.
///
/// Every non-idle variant is ephemeral: it is consumed by pointer-up, by a tool
/// change, or discarded as stale by the next pointer-down.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the canvas.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// The user is moving an existing object across the canvas.
    DraggingObject {
        id: ObjectId,
        /// Scene-space position of the pointer at the previous event.
        last_scene: Point,
        /// Object left at the start of the drag.
        orig_left: f64,
        /// Object top at the start of the drag.
        orig_top: f64,
    },
    /// The user is dragging out a new rectangle, circle or arrow.
    DrawingShape(DragSession),
    /// The user is drawing a freehand stroke.
    FreeDrawing(FreehandSession),
    /// The user is relocating one endpoint of an arrow.
    DraggingArrowHandle {
        id: ObjectId,
        end: ArrowEnd,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
