//! Recorded-session replay.
//!
//! A session is a JSON array of [`ReplayEvent`]s captured from a browser host.
//! Each event is fed to an [`Engine`] whose host is a [`ReplayHost`]; every
//! outbound action is logged and tallied. Recorded AI responses stand in for
//! the image service so sessions replay offline and deterministically.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use canvas::ai::{self, AccessGate, AiImageService, RegionExporter, ServiceError};
use canvas::config::{CanvasConfig, ConfigError};
use canvas::doc::{ImageData, ObjectId, PartialSceneObject, Rect, SceneObject};
use canvas::engine::{Action, Engine, Host};
use canvas::input::{Button, Key, Modifiers, Tool, WheelDelta};
use canvas::overlay::Overlay;
use canvas::viewport::{Point, Viewport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read session {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid canvas configuration: {0}")]
    Config(#[from] ConfigError),
}

/// One recorded input. Coordinates are CSS pixels relative to the canvas element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    Viewport {
        width: f64,
        height: f64,
        #[serde(default)]
        offset: Point,
    },
    Tool {
        tool: Tool,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        x: f64,
        y: f64,
        #[serde(flatten)]
        delta: WheelDelta,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Zoom {
        x: f64,
        y: f64,
        factor: f64,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
    Frame,
    /// Commit the open text editor. `id` defaults to the object being edited.
    FinishText {
        #[serde(default)]
        id: Option<ObjectId>,
        text: String,
    },
    Select {
        id: Option<ObjectId>,
    },
    OpenPrompt,
    ClosePrompt,
    Load {
        objects: Vec<SceneObject>,
    },
    Create {
        object: SceneObject,
    },
    Update {
        id: ObjectId,
        fields: PartialSceneObject,
    },
    Delete {
        id: ObjectId,
    },
    /// An AI edit of the selection, with the response the service gave.
    AiEdit {
        prompt: String,
        #[serde(flatten)]
        response: RecordedResponse,
    },
    AiGenerate {
        prompt: String,
        #[serde(flatten)]
        response: RecordedResponse,
    },
}

/// What the image service returned when the session was recorded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordedResponse {
    Image(ImageData),
    Error(String),
}

/// Host that logs every action and counts them by kind.
#[derive(Debug, Default)]
pub struct ReplayHost {
    pub counts: BTreeMap<&'static str, usize>,
}

#[must_use]
pub fn action_name(action: &Action) -> &'static str {
    match action {
        Action::ObjectAdded(_) => "object_added",
        Action::ObjectModified { .. } => "object_modified",
        Action::ObjectRemoved { .. } => "object_removed",
        Action::ToolChanged(_) => "tool_changed",
        Action::SelectionChanged(_) => "selection_changed",
        Action::EditTextRequested { .. } => "edit_text_requested",
        Action::SetCursor(_) => "set_cursor",
        Action::CanvasFlagsChanged(_) => "canvas_flags_changed",
        Action::ViewportChanged(_) => "viewport_changed",
        Action::OverlayChanged(_) => "overlay_changed",
        Action::RenderNeeded => "render_needed",
    }
}

impl Host for ReplayHost {
    fn apply(&mut self, action: Action) {
        let name = action_name(&action);
        match &action {
            Action::ObjectAdded(obj) => info!(id = %obj.id, kind = ?obj.kind, "host: object added"),
            Action::ObjectModified { id, .. } => info!(%id, "host: object modified"),
            Action::ObjectRemoved { id } => info!(%id, "host: object removed"),
            Action::ToolChanged(tool) => info!(?tool, "host: tool changed"),
            Action::SelectionChanged(id) => info!(?id, "host: selection changed"),
            Action::SetCursor(cursor) => debug!(cursor = cursor.as_css(), "host: cursor"),
            Action::OverlayChanged(overlay) => debug!(?overlay, "host: overlay changed"),
            _ => debug!(action = name, "host: action"),
        }
        *self.counts.entry(name).or_default() += 1;
    }
}

/// Serves the recorded response for one AI event.
struct RecordedService(RecordedResponse);

impl RecordedService {
    fn respond(&self) -> Result<ImageData, ServiceError> {
        match &self.0 {
            RecordedResponse::Image(image) => Ok(image.clone()),
            RecordedResponse::Error(message) => Err(ServiceError(message.clone())),
        }
    }
}

#[async_trait::async_trait]
impl AiImageService for RecordedService {
    async fn edit_image(&self, _source: &ImageData, _prompt: &str) -> Result<ImageData, ServiceError> {
        self.respond()
    }

    async fn generate_image(&self, _prompt: &str) -> Result<ImageData, ServiceError> {
        self.respond()
    }
}

/// Recorded sessions were already authorized when they were captured.
struct RecordedGate;

impl AccessGate for RecordedGate {
    fn auth_guard(&self) -> bool {
        true
    }

    fn credit_guard(&self, _cost: u32) -> bool {
        true
    }
}

/// Stands in for the browser's region rasterizer with an empty bitmap of the right size.
struct BlankExporter;

impl RegionExporter for BlankExporter {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn export_region(&self, bounds: Rect) -> Result<ImageData, ServiceError> {
        Ok(ImageData {
            mime: "image/png".into(),
            width_px: bounds.width.ceil().max(0.0) as u32,
            height_px: bounds.height.ceil().max(0.0) as u32,
            bytes: Vec::new(),
        })
    }
}

/// Final engine state after a replay, printed as JSON.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub events: usize,
    pub actions: BTreeMap<&'static str, usize>,
    pub viewport: Viewport,
    pub tool: Tool,
    /// CSS `cursor` value the host should show.
    pub cursor: &'static str,
    pub selection: Option<ObjectId>,
    pub editing_text: Option<ObjectId>,
    pub overlay: Overlay,
    pub objects: Vec<SceneObject>,
    pub ai_failures: Vec<String>,
}

/// Read and decode a session file.
///
/// # Errors
///
/// Returns [`ReplayError::Io`] if the file cannot be read and
/// [`ReplayError::Json`] if it is not a list of events.
pub fn load_session(path: &Path) -> Result<Vec<ReplayEvent>, ReplayError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_session(&raw)
}

/// Decode a session from JSON text.
///
/// # Errors
///
/// Returns [`ReplayError::Json`] if `raw` is not a list of events.
pub fn parse_session(raw: &str) -> Result<Vec<ReplayEvent>, ReplayError> {
    Ok(serde_json::from_str(raw)?)
}

async fn apply_event(
    engine: &RefCell<Engine<ReplayHost>>,
    event: ReplayEvent,
    failures: &mut Vec<String>,
) {
    let outcome = match event {
        ReplayEvent::AiEdit { prompt, response } => {
            ai::run_ai_edit(engine, &prompt, &RecordedService(response), &RecordedGate, &BlankExporter).await
        }
        ReplayEvent::AiGenerate { prompt, response } => {
            ai::run_ai_generate(engine, &prompt, &RecordedService(response), &RecordedGate).await
        }
        other => {
            apply_input(&mut engine.borrow_mut(), other);
            return;
        }
    };
    if let Err(e) = outcome {
        warn!(error = %e, "replay: ai request failed");
        failures.push(e.to_string());
    }
}

fn apply_input(engine: &mut Engine<ReplayHost>, event: ReplayEvent) {
    match event {
        ReplayEvent::Viewport { width, height, offset } => engine.set_viewport(width, height, offset),
        ReplayEvent::Tool { tool } => engine.set_tool(tool),
        ReplayEvent::PointerDown { x, y, button, modifiers } => engine.on_pointer_down(Point::new(x, y), button, modifiers),
        ReplayEvent::PointerMove { x, y, modifiers } => engine.on_pointer_move(Point::new(x, y), modifiers),
        ReplayEvent::PointerUp { x, y, button, modifiers } => engine.on_pointer_up(Point::new(x, y), button, modifiers),
        ReplayEvent::Wheel { x, y, delta, modifiers } => engine.on_wheel(Point::new(x, y), delta, modifiers),
        ReplayEvent::Key { key, modifiers } => engine.on_key_down(&key, modifiers),
        ReplayEvent::Zoom { x, y, factor } => engine.zoom_at(Point::new(x, y), factor),
        ReplayEvent::Pan { dx, dy } => engine.pan_by(dx, dy),
        ReplayEvent::Frame => engine.on_frame(),
        ReplayEvent::FinishText { id, text } => match id.or(engine.core.editing_text()) {
            Some(id) => engine.finish_text_edit(&id, &text),
            None => warn!("replay: finish_text with no open text edit"),
        },
        ReplayEvent::Select { id } => engine.select(id),
        ReplayEvent::OpenPrompt => engine.open_ai_prompt(),
        ReplayEvent::ClosePrompt => engine.close_ai_prompt(),
        ReplayEvent::Load { objects } => engine.load_snapshot(objects),
        ReplayEvent::Create { object } => engine.apply_create(object),
        ReplayEvent::Update { id, fields } => engine.apply_update(&id, &fields),
        ReplayEvent::Delete { id } => engine.apply_delete(&id),
        ReplayEvent::AiEdit { .. } | ReplayEvent::AiGenerate { .. } => {
            warn!("replay: ai event reached the synchronous path");
        }
    }
}

/// Replay `events` on a fresh engine sized `width` x `height` and summarize the result.
///
/// A trailing frame is always flushed so the summary's overlay is current.
pub async fn run(events: Vec<ReplayEvent>, config: CanvasConfig, width: f64, height: f64) -> Summary {
    let engine = RefCell::new(Engine::with_config(config, ReplayHost::default()));
    engine.borrow_mut().set_viewport(width, height, Point::default());

    let total = events.len();
    let mut failures = Vec::new();
    for (n, event) in events.into_iter().enumerate() {
        debug!(n, ?event, "replay: event");
        apply_event(&engine, event, &mut failures).await;
    }

    let mut engine = engine.into_inner();
    engine.on_frame();
    let core = &engine.core;
    let summary = Summary {
        events: total,
        actions: BTreeMap::new(),
        viewport: core.viewport(),
        tool: core.tool(),
        cursor: core.cursor().as_css(),
        selection: core.selection(),
        editing_text: core.editing_text(),
        overlay: core.overlay(),
        objects: core.objects().into_iter().cloned().collect(),
        ai_failures: failures,
    };
    let host = engine.into_host();
    info!(events = total, objects = summary.objects.len(), "replay: done");
    Summary { actions: host.counts, ..summary }
}
