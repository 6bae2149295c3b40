//! Screen-space anchors for floating UI bound to the selection.
//!
//! The AI edit button sits just inside the bottom-right corner of the
//! selection; the prompt dialog hangs below the button while open. Anchors are
//! derived state: [`compute`] is a pure function of the scene, the viewport
//! and the UI state, and [`OverlaySync`] only remembers the last published
//! value so the host hears about real changes once per frame.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use serde::{Deserialize, Serialize};

use crate::config::CanvasConfig;
use crate::doc::DocStore;
use crate::input::{Tool, UiState};
use crate::viewport::{Point, Viewport};

/// Where a floating element sits in page coordinates, if shown at all.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlayAnchor {
    pub visible: bool,
    pub screen_x: f64,
    pub screen_y: f64,
}

impl OverlayAnchor {
    pub const HIDDEN: Self = Self { visible: false, screen_x: 0.0, screen_y: 0.0 };

    #[must_use]
    pub fn at(screen_x: f64, screen_y: f64) -> Self {
        Self { visible: true, screen_x, screen_y }
    }
}

/// Every overlay element the engine positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Overlay {
    /// Contextual "AI Edit" button.
    pub edit_button: OverlayAnchor,
    /// AI prompt dialog, anchored below the edit button.
    pub prompt_dialog: OverlayAnchor,
}

impl Overlay {
    pub const HIDDEN: Self = Self { edit_button: OverlayAnchor::HIDDEN, prompt_dialog: OverlayAnchor::HIDDEN };
}

/// Recompute every anchor from current state.
///
/// Hidden unless the select tool is active and the selection exists. The
/// selection's precise bounds are preferred over its bounding box.
#[must_use]
pub fn compute(
    doc: &DocStore,
    viewport: &Viewport,
    ui: &UiState,
    canvas_offset: Point,
    prompt_open: bool,
    config: &CanvasConfig,
) -> Overlay {
    if ui.tool != Tool::Select {
        return Overlay::HIDDEN;
    }
    let Some(obj) = ui.selected_id.and_then(|id| doc.get(&id)) else {
        return Overlay::HIDDEN;
    };
    let bounds = obj.precise_bounds().unwrap_or_else(|| obj.bounding_rect());
    let corner = viewport.scene_to_screen(Point::new(bounds.right(), bounds.bottom()));
    if !corner.is_finite() {
        return Overlay::HIDDEN;
    }
    let x = corner.x + canvas_offset.x - config.overlay_inset_px;
    let y = corner.y + canvas_offset.y - config.overlay_inset_px;
    let edit_button = OverlayAnchor::at(x, y);
    let prompt_dialog = if prompt_open {
        OverlayAnchor::at(x, y + config.dialog_gap_px)
    } else {
        OverlayAnchor::HIDDEN
    };
    Overlay { edit_button, prompt_dialog }
}

/// Frame-coalescing holder for the last published overlay.
///
/// Mutations call [`OverlaySync::invalidate`]; the frame callback calls
/// [`OverlaySync::flush`], which recomputes at most once and reports only
/// real changes.
#[derive(Debug, Clone, Default)]
pub struct OverlaySync {
    dirty: bool,
    current: Overlay,
    prompt_open: bool,
}

impl OverlaySync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the overlay stale; the next flush recomputes it.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn prompt_open(&self) -> bool {
        self.prompt_open
    }

    /// Open or close the prompt dialog. Returns whether the flag changed.
    pub fn set_prompt_open(&mut self, open: bool) -> bool {
        if self.prompt_open == open {
            return false;
        }
        self.prompt_open = open;
        self.dirty = true;
        true
    }

    /// Hide everything immediately and close the dialog.
    ///
    /// Returns whether the published overlay changed.
    pub fn hide(&mut self) -> bool {
        self.prompt_open = false;
        self.dirty = false;
        if self.current == Overlay::HIDDEN {
            return false;
        }
        self.current = Overlay::HIDDEN;
        true
    }

    /// Recompute if stale. Returns the new overlay only when it differs from
    /// the one last published.
    pub fn flush<F>(&mut self, recompute: F) -> Option<Overlay>
    where
        F: FnOnce(bool) -> Overlay,
    {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        let next = recompute(self.prompt_open);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}
