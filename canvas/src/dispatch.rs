//! Pointer-down precedence.
//!
//! Handlers are consulted in the fixed order of [`POINTER_DOWN_ORDER`]. The
//! first one that claims the event owns the whole gesture; later handlers never
//! see it. Precedence is a declared list, not an accident of which listener
//! was attached last.

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;

use crate::hit::Hit;
use crate::input::{Modifiers, Tool};

/// A pointer-down handler group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerHandler {
    /// Rectangle, circle, arrow and text creation.
    DrawingTool,
    /// Drag-to-pan, under the pan tool or with Alt held.
    CanvasPan,
    /// Selection, object moves, arrow handles and freehand strokes.
    NativeSelection,
}

/// The order handlers are asked on every pointer-down.
pub const POINTER_DOWN_ORDER: [PointerHandler; 3] = [
    PointerHandler::DrawingTool,
    PointerHandler::CanvasPan,
    PointerHandler::NativeSelection,
];

/// What a handler needs to know to decide whether to claim a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerContext {
    /// The live tool, read at event time.
    pub tool: Tool,
    pub modifiers: Modifiers,
    /// Object under the pointer, when the active tool hit-tests.
    pub target: Option<Hit>,
}

impl PointerHandler {
    /// Whether this handler takes ownership of the event.
    #[must_use]
    pub fn claims(self, ctx: &PointerContext) -> bool {
        match self {
            Self::DrawingTool => ctx.tool.is_drawing() && !ctx.modifiers.alt && ctx.target.is_none(),
            Self::CanvasPan => ctx.tool == Tool::Pan || ctx.modifiers.alt,
            Self::NativeSelection => true,
        }
    }
}

/// The first handler in [`POINTER_DOWN_ORDER`] that claims the event.
#[must_use]
pub fn route(ctx: &PointerContext) -> PointerHandler {
    POINTER_DOWN_ORDER
        .into_iter()
        .find(|h| h.claims(ctx))
        .unwrap_or(PointerHandler::NativeSelection)
}
