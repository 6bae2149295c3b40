//! Engine context: the one object every input handler runs against.
//!
//! `EngineCore` owns the scene, the viewport, the live tool and the gesture in
//! progress. Every input method reads the tool from `ui.tool` at event time and
//! returns the [`Action`]s the host must react to. `Engine<H>` wraps a core and
//! forwards those actions to a [`Host`], so one engine serves any number of
//! front-ends.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info, trace};

use crate::arrow::{self, ArrowStyle};
use crate::config::CanvasConfig;
use crate::dispatch::{self, PointerContext, PointerHandler};
use crate::doc::{DocStore, ObjectId, ObjectKind, PartialSceneObject, Props, Rect, SceneObject};
use crate::drag;
use crate::hit::{self, Hit, HitPart};
use crate::input::{Button, CanvasFlags, Cursor, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::overlay::{self, Overlay, OverlaySync};
use crate::viewport::{Point, Viewport};

/// Outbound events for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A finished object entered the scene. Never raised for drag previews.
    ObjectAdded(SceneObject),
    ObjectModified { id: ObjectId, fields: PartialSceneObject },
    ObjectRemoved { id: ObjectId },
    ToolChanged(Tool),
    SelectionChanged(Option<ObjectId>),
    /// Open the host's text editor on a text object.
    EditTextRequested { id: ObjectId, text: String },
    SetCursor(Cursor),
    CanvasFlagsChanged(CanvasFlags),
    ViewportChanged(Viewport),
    OverlayChanged(Overlay),
    RenderNeeded,
}

/// Core engine state. Holds no host handle so it can be driven directly in tests.
pub struct EngineCore {
    pub doc: DocStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub config: CanvasConfig,
    flags: CanvasFlags,
    cursor: Cursor,
    overlay: OverlaySync,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Page position of the canvas element's top-left corner.
    pub canvas_offset: Point,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(CanvasConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: CanvasConfig) -> Self {
        let flags = Tool::default().canvas_flags();
        Self {
            doc: DocStore::new(),
            viewport: Viewport::with_limits(config.min_scale, config.max_scale),
            ui: UiState::default(),
            input: InputState::default(),
            config,
            flags,
            cursor: flags.cursor,
            overlay: OverlaySync::new(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            canvas_offset: Point::default(),
        }
    }

    fn arrow_style(&self) -> ArrowStyle {
        ArrowStyle::from_config(&self.config)
    }

    fn set_cursor(&mut self, cursor: Cursor, actions: &mut Vec<Action>) {
        if self.cursor != cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }

    fn set_selection(&mut self, id: Option<ObjectId>, actions: &mut Vec<Action>) {
        if self.ui.selected_id == id {
            return;
        }
        self.ui.selected_id = id;
        if id.is_none() {
            self.overlay.set_prompt_open(false);
        }
        self.overlay.invalidate();
        actions.push(Action::SelectionChanged(id));
    }

    fn viewport_changed(&mut self, actions: &mut Vec<Action>) {
        self.overlay.invalidate();
        actions.push(Action::ViewportChanged(self.viewport));
        actions.push(Action::RenderNeeded);
    }

    /// Close a text edit the host never finished. A blank box is removed.
    fn close_text_edit(&mut self, actions: &mut Vec<Action>) {
        let Some(id) = self.ui.editing_text.take() else {
            return;
        };
        let blank = self
            .doc
            .get(&id)
            .is_some_and(|o| o.kind == ObjectKind::Text && Props::new(&o.props).text().trim().is_empty());
        if !blank {
            return;
        }
        self.doc.remove(&id);
        if self.ui.selected_id == Some(id) {
            self.set_selection(None, actions);
        }
        debug!(%id, "abandoned empty text removed");
        actions.push(Action::ObjectRemoved { id });
        actions.push(Action::RenderNeeded);
    }

    // --- Data inputs ---

    /// Replace the scene with a persisted snapshot.
    ///
    /// Any gesture in progress is dropped with the scene it referenced.
    pub fn load_snapshot(&mut self, objects: Vec<SceneObject>) -> Vec<Action> {
        let mut actions = Vec::new();
        self.doc.load_snapshot(objects);
        self.input = InputState::Idle;
        if self.ui.editing_text.is_some_and(|id| self.doc.get(&id).is_none()) {
            self.ui.editing_text = None;
        }
        if self.ui.selected_id.is_some_and(|id| self.doc.get(&id).is_none()) {
            self.set_selection(None, &mut actions);
        }
        self.overlay.invalidate();
        info!(count = self.doc.len(), "scene snapshot loaded");
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Insert an object replayed from history or persistence.
    pub fn apply_create(&mut self, object: SceneObject) -> Vec<Action> {
        self.doc.insert(object);
        self.overlay.invalidate();
        vec![Action::RenderNeeded]
    }

    /// Apply a replayed partial update.
    pub fn apply_update(&mut self, id: &ObjectId, fields: &PartialSceneObject) -> Vec<Action> {
        if !self.doc.apply_partial(id, fields) {
            return Vec::new();
        }
        self.overlay.invalidate();
        vec![Action::RenderNeeded]
    }

    /// Remove a replayed deletion. Clears the selection and any gesture that referenced it.
    pub fn apply_delete(&mut self, id: &ObjectId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.doc.remove(id).is_none() {
            return actions;
        }
        let gesture_target = match &self.input {
            InputState::DraggingObject { id: target, .. } | InputState::DraggingArrowHandle { id: target, .. } => {
                Some(*target)
            }
            InputState::DrawingShape(session) => Some(session.preview_id),
            InputState::FreeDrawing(session) => Some(session.id),
            InputState::Idle | InputState::Panning { .. } => None,
        };
        if gesture_target == Some(*id) {
            self.input = InputState::Idle;
        }
        if self.ui.editing_text == Some(*id) {
            self.ui.editing_text = None;
        }
        if self.ui.selected_id == Some(*id) {
            self.set_selection(None, &mut actions);
        }
        self.overlay.invalidate();
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Tool / selection / text ---

    /// Switch the active tool.
    ///
    /// Side effects run in a fixed order: close an open text edit, interrupt
    /// the gesture in progress, clear the selection when leaving select,
    /// reconfigure canvas flags and cursor, hide the overlay, then announce
    /// the new tool.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = Vec::new();
        let previous = self.ui.tool;
        if previous == tool {
            return actions;
        }

        self.close_text_edit(&mut actions);
        self.interrupt_gesture(&mut actions);

        if tool != Tool::Select {
            self.set_selection(None, &mut actions);
        }

        self.ui.tool = tool;
        self.flags = tool.canvas_flags();
        actions.push(Action::CanvasFlagsChanged(self.flags));
        self.set_cursor(self.flags.cursor, &mut actions);

        if self.overlay.hide() {
            actions.push(Action::OverlayChanged(Overlay::HIDDEN));
        }
        if tool == Tool::Select {
            self.overlay.invalidate();
        }

        actions.push(Action::ToolChanged(tool));
        actions.push(Action::RenderNeeded);
        info!(from = ?previous, to = ?tool, "tool changed");
        actions
    }

    /// Set or clear the selection from outside the pointer flow.
    ///
    /// Only selectable objects can be selected, and only under the select tool.
    pub fn select(&mut self, id: Option<ObjectId>) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(id) = id {
            let selectable = self.doc.get(&id).is_some_and(|o| o.selectable);
            if !selectable || self.ui.tool != Tool::Select {
                return actions;
            }
        }
        self.set_selection(id, &mut actions);
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Commit the host editor's text into a text object.
    ///
    /// A blank result removes the object.
    pub fn finish_text_edit(&mut self, id: &ObjectId, text: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.editing_text == Some(*id) {
            self.ui.editing_text = None;
        }
        let Some(obj) = self.doc.get(id) else {
            return actions;
        };
        if obj.kind != ObjectKind::Text {
            return actions;
        }

        if text.trim().is_empty() {
            self.doc.remove(id);
            if self.ui.selected_id == Some(*id) {
                self.set_selection(None, &mut actions);
            }
            debug!(%id, "empty text discarded");
            actions.push(Action::ObjectRemoved { id: *id });
            actions.push(Action::RenderNeeded);
            return actions;
        }

        if Props::new(&obj.props).text() == text {
            return actions;
        }
        let fields = PartialSceneObject { props: Some(serde_json::json!({ "text": text })), ..Default::default() };
        self.doc.apply_partial(id, &fields);
        self.overlay.invalidate();
        actions.push(Action::ObjectModified { id: *id, fields });
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    /// Record the canvas element's size and page position (window resize, layout shift).
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, canvas_offset: Point) -> Vec<Action> {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        if canvas_offset.is_finite() {
            self.canvas_offset = canvas_offset;
        }
        self.overlay.invalidate();
        vec![Action::RenderNeeded]
    }

    /// Zoom about a screen point. Out-of-range factors clamp; no-ops emit nothing.
    pub fn zoom_at(&mut self, screen_pt: Point, factor: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.viewport.zoom_at(screen_pt, factor) {
            self.viewport_changed(&mut actions);
        }
        actions
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.viewport.pan_by(dx, dy) {
            self.viewport_changed(&mut actions);
        }
        actions
    }

    // --- Input events ---

    /// Target under the pointer for the active tool, if it hit-tests at all.
    fn pointer_target(&self, screen_pt: Point) -> Option<Hit> {
        if !self.flags.hit_testing {
            return None;
        }
        if self.ui.tool == Tool::Select {
            return hit::hit_test(&self.doc, &self.viewport, screen_pt, self.ui.selected_id, &self.config);
        }
        let scene_pt = self.viewport.screen_to_scene(screen_pt);
        hit::hit_object(&self.doc, scene_pt).map(|object_id| Hit { object_id, part: HitPart::Body })
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if button != Button::Primary || !screen_pt.is_finite() {
            return actions;
        }
        if !self.input.is_idle() {
            debug!(gesture = ?self.input, "discarding stale gesture");
            self.interrupt_gesture(&mut actions);
        }

        let target = self.pointer_target(screen_pt);
        let ctx = PointerContext { tool: self.ui.tool, modifiers, target };
        let handler = dispatch::route(&ctx);
        trace!(?handler, tool = ?ctx.tool, "pointer down");
        match handler {
            PointerHandler::DrawingTool => self.drawing_pointer_down(screen_pt, &mut actions),
            PointerHandler::CanvasPan => {
                self.input = InputState::Panning { last_screen: screen_pt };
                self.set_cursor(Cursor::Grabbing, &mut actions);
            }
            PointerHandler::NativeSelection => self.native_pointer_down(screen_pt, target, &mut actions),
        }
        actions
    }

    fn drawing_pointer_down(&mut self, screen_pt: Point, actions: &mut Vec<Action>) {
        let scene_pt = self.viewport.screen_to_scene(screen_pt);
        if self.ui.tool == Tool::Text {
            self.close_text_edit(actions);
            let obj = drag::create_text(&self.doc, scene_pt, &self.config);
            let id = obj.id;
            self.doc.insert(obj.clone());
            self.ui.editing_text = Some(id);
            info!(%id, "text created");
            actions.push(Action::ObjectAdded(obj));
            actions.push(Action::EditTextRequested { id, text: String::new() });
            actions.push(Action::RenderNeeded);
            return;
        }
        if let Some(session) = drag::begin(&mut self.doc, self.ui.tool, scene_pt, &self.config) {
            debug!(tool = ?session.tool, preview = %session.preview_id, "drag started");
            self.input = InputState::DrawingShape(session);
            actions.push(Action::RenderNeeded);
        }
    }

    fn native_pointer_down(&mut self, screen_pt: Point, target: Option<Hit>, actions: &mut Vec<Action>) {
        let scene_pt = self.viewport.screen_to_scene(screen_pt);
        match (self.ui.tool, target) {
            (Tool::FreehandDraw, _) => {
                if let Some(session) = drag::begin_stroke(&mut self.doc, scene_pt, &self.config) {
                    self.input = InputState::FreeDrawing(session);
                    actions.push(Action::RenderNeeded);
                }
            }
            (Tool::Select, Some(Hit { object_id, part: HitPart::ArrowHandle(end) })) => {
                self.input = InputState::DraggingArrowHandle { id: object_id, end };
                self.set_cursor(Cursor::Pointer, actions);
            }
            (Tool::Select, Some(Hit { object_id, part: HitPart::Body })) => {
                let Some(obj) = self.doc.get(&object_id).filter(|o| o.selectable) else {
                    return;
                };
                self.input = InputState::DraggingObject {
                    id: object_id,
                    last_scene: scene_pt,
                    orig_left: obj.left,
                    orig_top: obj.top,
                };
                self.set_selection(Some(object_id), actions);
                self.set_cursor(Cursor::Move, actions);
                actions.push(Action::RenderNeeded);
            }
            (Tool::Select, None) => {
                if self.ui.selected_id.is_some() {
                    self.set_selection(None, actions);
                    actions.push(Action::RenderNeeded);
                }
            }
            (Tool::Text, Some(Hit { object_id, .. })) => {
                let Some(obj) = self.doc.get(&object_id).filter(|o| o.kind == ObjectKind::Text) else {
                    return;
                };
                let text = Props::new(&obj.props).text().to_owned();
                if self.ui.editing_text != Some(object_id) {
                    self.close_text_edit(actions);
                }
                self.ui.editing_text = Some(object_id);
                actions.push(Action::EditTextRequested { id: object_id, text });
            }
            _ => {}
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if !screen_pt.is_finite() {
            return actions;
        }
        if self.input.is_idle() {
            if self.ui.tool == Tool::Select {
                let cursor = match self.pointer_target(screen_pt) {
                    Some(Hit { part: HitPart::ArrowHandle(_), .. }) => Cursor::Pointer,
                    Some(Hit { part: HitPart::Body, .. }) => Cursor::Move,
                    None => self.flags.cursor,
                };
                self.set_cursor(cursor, &mut actions);
            }
            return actions;
        }
        let scene_pt = self.viewport.screen_to_scene(screen_pt);
        let style = self.arrow_style();

        match &mut self.input {
            InputState::Idle => {}
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                if self.viewport.pan_by(dx, dy) {
                    self.viewport_changed(&mut actions);
                }
            }
            InputState::DraggingObject { id, last_scene, .. } => {
                let (dx, dy) = (scene_pt.x - last_scene.x, scene_pt.y - last_scene.y);
                *last_scene = scene_pt;
                if let Some(obj) = self.doc.get_mut(id) {
                    obj.left += dx;
                    obj.top += dy;
                    self.overlay.invalidate();
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::DrawingShape(session) => {
                if drag::update(&mut self.doc, session, scene_pt, &self.config) {
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::FreeDrawing(session) => {
                if drag::extend_stroke(&mut self.doc, session, scene_pt) {
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::DraggingArrowHandle { id, end } => {
                if let Some(obj) = self.doc.get_mut(id) {
                    if arrow::drag_handle(obj, *end, screen_pt, &self.viewport, style) {
                        self.overlay.invalidate();
                        actions.push(Action::RenderNeeded);
                    }
                }
            }
        }
        actions
    }

    /// End the gesture in progress. Call for pointer-up anywhere in the window,
    /// not only over the canvas.
    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        if self.input.is_idle() {
            return Vec::new();
        }
        let mut actions = self.on_pointer_move(screen_pt, modifiers);

        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => {}
            InputState::DraggingObject { id, orig_left, orig_top, .. } => {
                self.finish_move(id, orig_left, orig_top, &mut actions);
            }
            InputState::DrawingShape(session) => {
                if let Some(obj) = drag::commit(&mut self.doc, session, &self.config) {
                    info!(id = %obj.id, kind = ?obj.kind, "shape committed");
                    actions.push(Action::ObjectAdded(obj));
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::FreeDrawing(session) => {
                if let Some(obj) = drag::commit_stroke(&mut self.doc, session) {
                    info!(id = %obj.id, points = obj.points.len(), "stroke committed");
                    actions.push(Action::ObjectAdded(obj));
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::DraggingArrowHandle { id, .. } => self.finish_handle_drag(id, &mut actions),
        }
        self.set_cursor(self.flags.cursor, &mut actions);
        actions
    }

    fn finish_move(&mut self, id: ObjectId, orig_left: f64, orig_top: f64, actions: &mut Vec<Action>) {
        let Some(obj) = self.doc.get(&id) else {
            return;
        };
        let moved = (obj.left - orig_left).abs() > f64::EPSILON || (obj.top - orig_top).abs() > f64::EPSILON;
        if !moved {
            return;
        }
        let fields = PartialSceneObject { left: Some(obj.left), top: Some(obj.top), ..Default::default() };
        debug!(%id, left = obj.left, top = obj.top, "object moved");
        self.overlay.invalidate();
        actions.push(Action::ObjectModified { id, fields });
        actions.push(Action::RenderNeeded);
    }

    fn finish_handle_drag(&mut self, id: ObjectId, actions: &mut Vec<Action>) {
        let Some(obj) = self.doc.get(&id) else {
            return;
        };
        let fields = PartialSceneObject { rotation: Some(obj.rotation), ..PartialSceneObject::geometry_of(obj) };
        debug!(%id, "arrow endpoints edited");
        self.overlay.invalidate();
        actions.push(Action::ObjectModified { id, fields });
        actions.push(Action::RenderNeeded);
    }

    /// Stop the gesture in progress without waiting for pointer-up.
    ///
    /// Creation previews are removed; moves and handle drags keep the geometry
    /// they reached and report it.
    fn interrupt_gesture(&mut self, actions: &mut Vec<Action>) {
        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => {}
            InputState::DrawingShape(session) => {
                let preview = session.preview_id;
                if drag::cancel(&mut self.doc, session) {
                    debug!(%preview, "drag preview removed");
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::FreeDrawing(session) => {
                if drag::cancel_stroke(&mut self.doc, session) {
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::DraggingObject { id, orig_left, orig_top, .. } => {
                self.finish_move(id, orig_left, orig_top, actions);
            }
            InputState::DraggingArrowHandle { id, .. } => self.finish_handle_drag(id, actions),
        }
    }

    /// Wheel zooms about the pointer.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        let factor = self.config.wheel_zoom_base.powf(delta.dy);
        self.zoom_at(screen_pt, factor)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.editing_text.is_some() {
            return actions;
        }
        match key.0.as_str() {
            "Delete" | "Backspace" => {
                if self.ui.tool != Tool::Select || !self.input.is_idle() {
                    return actions;
                }
                let Some(id) = self.ui.selected_id else {
                    return actions;
                };
                if self.doc.remove(&id).is_some() {
                    self.set_selection(None, &mut actions);
                    info!(%id, "object deleted");
                    actions.push(Action::ObjectRemoved { id });
                    actions.push(Action::RenderNeeded);
                }
            }
            "Escape" => {
                if self.input.is_idle() {
                    self.set_selection(None, &mut actions);
                } else {
                    self.interrupt_gesture(&mut actions);
                }
                self.set_cursor(self.flags.cursor, &mut actions);
                if !actions.is_empty() {
                    actions.push(Action::RenderNeeded);
                }
            }
            other => {
                if modifiers.ctrl || modifiers.meta {
                    return actions;
                }
                if let Some(tool) = Tool::from_shortcut(other) {
                    return self.set_tool(tool);
                }
            }
        }
        actions
    }

    /// Per-frame hook: recompute the overlay if something invalidated it.
    pub fn on_frame(&mut self) -> Vec<Action> {
        let (doc, viewport, ui, config) = (&self.doc, &self.viewport, &self.ui, &self.config);
        let offset = self.canvas_offset;
        match self.overlay.flush(|open| overlay::compute(doc, viewport, ui, offset, open, config)) {
            Some(next) => vec![Action::OverlayChanged(next)],
            None => Vec::new(),
        }
    }

    // --- AI prompt dialog ---

    /// Show the prompt dialog next to the edit button. No-op without a visible button.
    pub fn open_ai_prompt(&mut self) -> Vec<Action> {
        if !self.overlay().edit_button.visible {
            return Vec::new();
        }
        self.overlay.set_prompt_open(true);
        self.on_frame()
    }

    pub fn close_ai_prompt(&mut self) -> Vec<Action> {
        if !self.overlay.set_prompt_open(false) {
            return Vec::new();
        }
        self.on_frame()
    }

    /// Put a finished object into the scene on top of everything and select it.
    pub(crate) fn place_object(&mut self, mut obj: SceneObject) -> Vec<Action> {
        let mut actions = Vec::new();
        obj.z_index = self.doc.next_z_index();
        let id = obj.id;
        self.doc.insert(obj.clone());
        actions.push(Action::ObjectAdded(obj));
        if self.ui.tool == Tool::Select {
            self.set_selection(Some(id), &mut actions);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Queries ---

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.ui.selected_id
    }

    /// Scene-space bounds of the selection, precise when known.
    #[must_use]
    pub fn selection_bounds(&self) -> Option<Rect> {
        let obj = self.ui.selected_id.and_then(|id| self.doc.get(&id))?;
        Some(obj.precise_bounds().unwrap_or_else(|| obj.bounding_rect()))
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Scene point under the center of the canvas element.
    #[must_use]
    pub fn viewport_center(&self) -> Point {
        self.viewport
            .screen_to_scene(Point::new(self.viewport_width * 0.5, self.viewport_height * 0.5))
    }

    #[must_use]
    pub fn canvas_flags(&self) -> CanvasFlags {
        self.flags
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The overlay computed from current state, regardless of frame scheduling.
    #[must_use]
    pub fn overlay(&self) -> Overlay {
        overlay::compute(
            &self.doc,
            &self.viewport,
            &self.ui,
            self.canvas_offset,
            self.overlay.prompt_open(),
            &self.config,
        )
    }

    #[must_use]
    pub fn editing_text(&self) -> Option<ObjectId> {
        self.ui.editing_text
    }

    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.doc.get(id)
    }

    /// Every object in draw order, bottom first.
    #[must_use]
    pub fn objects(&self) -> Vec<&SceneObject> {
        self.doc.sorted_objects()
    }
}

/// Receiver for engine output. One implementation per front-end.
pub trait Host {
    fn apply(&mut self, action: Action);
}

/// Recording host: keeps every action in order.
impl Host for Vec<Action> {
    fn apply(&mut self, action: Action) {
        self.push(action);
    }
}

/// The full engine: a core plus the host its actions are delivered to.
pub struct Engine<H: Host> {
    pub core: EngineCore,
    host: H,
}

impl<H: Host> Engine<H> {
    #[must_use]
    pub fn new(host: H) -> Self {
        Self { core: EngineCore::new(), host }
    }

    #[must_use]
    pub fn with_config(config: CanvasConfig, host: H) -> Self {
        Self { core: EngineCore::with_config(config), host }
    }

    /// Deliver actions to the host in order.
    pub fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.host.apply(action);
        }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    // --- Delegated inputs ---

    pub fn load_snapshot(&mut self, objects: Vec<SceneObject>) {
        let actions = self.core.load_snapshot(objects);
        self.dispatch(actions);
    }

    pub fn apply_create(&mut self, object: SceneObject) {
        let actions = self.core.apply_create(object);
        self.dispatch(actions);
    }

    pub fn apply_update(&mut self, id: &ObjectId, fields: &PartialSceneObject) {
        let actions = self.core.apply_update(id, fields);
        self.dispatch(actions);
    }

    pub fn apply_delete(&mut self, id: &ObjectId) {
        let actions = self.core.apply_delete(id);
        self.dispatch(actions);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        let actions = self.core.set_tool(tool);
        self.dispatch(actions);
    }

    pub fn select(&mut self, id: Option<ObjectId>) {
        let actions = self.core.select(id);
        self.dispatch(actions);
    }

    pub fn finish_text_edit(&mut self, id: &ObjectId, text: &str) {
        let actions = self.core.finish_text_edit(id, text);
        self.dispatch(actions);
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, canvas_offset: Point) {
        let actions = self.core.set_viewport(width_css, height_css, canvas_offset);
        self.dispatch(actions);
    }

    pub fn zoom_at(&mut self, screen_pt: Point, factor: f64) {
        let actions = self.core.zoom_at(screen_pt, factor);
        self.dispatch(actions);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let actions = self.core.pan_by(dx, dy);
        self.dispatch(actions);
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) {
        let actions = self.core.on_pointer_down(screen_pt, button, modifiers);
        self.dispatch(actions);
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) {
        let actions = self.core.on_pointer_move(screen_pt, modifiers);
        self.dispatch(actions);
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) {
        let actions = self.core.on_pointer_up(screen_pt, button, modifiers);
        self.dispatch(actions);
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) {
        let actions = self.core.on_wheel(screen_pt, delta, modifiers);
        self.dispatch(actions);
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) {
        let actions = self.core.on_key_down(key, modifiers);
        self.dispatch(actions);
    }

    pub fn on_frame(&mut self) {
        let actions = self.core.on_frame();
        self.dispatch(actions);
    }

    pub fn open_ai_prompt(&mut self) {
        let actions = self.core.open_ai_prompt();
        self.dispatch(actions);
    }

    pub fn close_ai_prompt(&mut self) {
        let actions = self.core.close_ai_prompt();
        self.dispatch(actions);
    }
}
