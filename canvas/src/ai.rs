//! AI edit and generate flows over external collaborators.
//!
//! The engine never talks to a network. It asks an [`AccessGate`] whether the
//! user may spend credits, hands selection bounds to a [`RegionExporter`], and
//! awaits an [`AiImageService`] for the result. Scene mutations happen only
//! after the external call resolves successfully; any failure is returned to
//! the caller with the scene untouched.
//!
//! The async runners take the engine through a `RefCell` and release every
//! borrow before awaiting, so pointer input can keep flowing while a request
//! is in flight.

#[cfg(test)]
#[path = "ai_test.rs"]
mod ai_test;

use std::cell::RefCell;

use tracing::{info, warn};

use crate::doc::{ImageData, ObjectId, ObjectKind, Rect, SceneObject};
use crate::engine::{Action, Engine, EngineCore, Host};
use crate::viewport::Point;

/// Opaque failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("sign in to use AI tools")]
    Unauthenticated,
    #[error("not enough credits: {cost} required")]
    InsufficientCredits { cost: u32 },
    #[error("nothing selected")]
    NothingSelected,
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("region export failed: {0}")]
    Export(#[source] ServiceError),
    #[error("AI service failed: {0}")]
    Service(#[source] ServiceError),
}

/// Image generation and editing backend.
#[async_trait::async_trait]
pub trait AiImageService: Send + Sync {
    /// Edit `source` according to `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the backend rejects or fails the request.
    async fn edit_image(&self, source: &ImageData, prompt: &str) -> Result<ImageData, ServiceError>;

    /// Generate a new image from `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the backend rejects or fails the request.
    async fn generate_image(&self, prompt: &str) -> Result<ImageData, ServiceError>;
}

/// Authentication and credit checks in front of every AI action.
pub trait AccessGate {
    fn auth_guard(&self) -> bool;
    fn credit_guard(&self, cost: u32) -> bool;
}

/// Rasterizes a scene region. Encoding is the exporter's business.
pub trait RegionExporter {
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the region cannot be captured.
    fn export_region(&self, bounds: Rect) -> Result<ImageData, ServiceError>;
}

/// Everything an edit request needs, captured before any await.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub source_id: ObjectId,
    /// Scene-space bounds of the selection at capture time.
    pub bounds: Rect,
    pub image: ImageData,
    pub prompt: String,
}

fn check_access(gate: &dyn AccessGate, cost: u32) -> Result<(), AiError> {
    if !gate.auth_guard() {
        return Err(AiError::Unauthenticated);
    }
    if !gate.credit_guard(cost) {
        return Err(AiError::InsufficientCredits { cost });
    }
    Ok(())
}

/// Export the selection as an image together with its bounds.
///
/// # Errors
///
/// [`AiError::NothingSelected`] without a selection, [`AiError::Export`] if the
/// exporter fails.
pub fn capture_selection(core: &EngineCore, exporter: &dyn RegionExporter) -> Result<(Rect, ImageData), AiError> {
    let bounds = core.selection_bounds().ok_or(AiError::NothingSelected)?;
    let image = exporter.export_region(bounds).map_err(AiError::Export)?;
    Ok((bounds, image))
}

/// Validate and capture an AI edit of the current selection.
///
/// # Errors
///
/// Fails on a missing selection, a blank prompt, a failed auth or credit
/// check, or a failed export, in that order.
pub fn prepare_ai_edit(
    core: &EngineCore,
    prompt: &str,
    gate: &dyn AccessGate,
    exporter: &dyn RegionExporter,
) -> Result<EditRequest, AiError> {
    let source_id = core.selection().ok_or(AiError::NothingSelected)?;
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AiError::EmptyPrompt);
    }
    check_access(gate, core.config.ai_edit_cost)?;
    let (bounds, image) = capture_selection(core, exporter)?;
    Ok(EditRequest { source_id, bounds, image, prompt: prompt.to_owned() })
}

fn image_object(image: ImageData, left: f64, top: f64, width: f64, height: f64) -> SceneObject {
    let mut obj = SceneObject::new(ObjectKind::Image, left, top, width, height);
    obj.image = Some(image);
    obj
}

/// Place an edit result beside the source bounds, at the same size.
///
/// Degenerate source bounds fall back to the image's pixel size.
pub fn place_edit_result(core: &mut EngineCore, source_bounds: Rect, image: ImageData) -> (ObjectId, Vec<Action>) {
    let (width, height) = if source_bounds.width > f64::EPSILON && source_bounds.height > f64::EPSILON {
        (source_bounds.width, source_bounds.height)
    } else {
        (f64::from(image.width_px), f64::from(image.height_px))
    };
    let left = source_bounds.right() + core.config.ai_result_offset;
    let obj = image_object(image, left, source_bounds.top, width, height);
    let id = obj.id;
    let mut actions = core.close_ai_prompt();
    actions.extend(core.place_object(obj));
    (id, actions)
}

/// Place a generated image at its pixel size, centered in the visible canvas.
pub fn place_generated_image(core: &mut EngineCore, image: ImageData) -> (ObjectId, Vec<Action>) {
    let width = f64::from(image.width_px);
    let height = f64::from(image.height_px);
    let center: Point = core.viewport_center();
    let obj = image_object(image, center.x - width * 0.5, center.y - height * 0.5, width, height);
    let id = obj.id;
    (id, core.place_object(obj))
}

/// Run an AI edit of the selection end to end.
///
/// # Errors
///
/// Any [`AiError`]; the scene is left unmodified on failure.
pub async fn run_ai_edit<H: Host>(
    engine: &RefCell<Engine<H>>,
    prompt: &str,
    service: &dyn AiImageService,
    gate: &dyn AccessGate,
    exporter: &dyn RegionExporter,
) -> Result<ObjectId, AiError> {
    let request = prepare_ai_edit(&engine.borrow().core, prompt, gate, exporter)?;
    info!(source = %request.source_id, prompt_len = request.prompt.len(), "ai: edit requested");

    let image = match service.edit_image(&request.image, &request.prompt).await {
        Ok(image) => image,
        Err(e) => {
            warn!(source = %request.source_id, error = %e, "ai: edit failed");
            return Err(AiError::Service(e));
        }
    };

    let mut engine = engine.borrow_mut();
    let (id, actions) = place_edit_result(&mut engine.core, request.bounds, image);
    engine.dispatch(actions);
    info!(%id, source = %request.source_id, "ai: edit placed");
    Ok(id)
}

/// Generate an image from a prompt and place it in view.
///
/// # Errors
///
/// Any [`AiError`]; the scene is left unmodified on failure.
pub async fn run_ai_generate<H: Host>(
    engine: &RefCell<Engine<H>>,
    prompt: &str,
    service: &dyn AiImageService,
    gate: &dyn AccessGate,
) -> Result<ObjectId, AiError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AiError::EmptyPrompt);
    }
    let cost = engine.borrow().core.config.ai_generate_cost;
    check_access(gate, cost)?;
    info!(prompt_len = prompt.len(), "ai: generate requested");

    let image = match service.generate_image(prompt).await {
        Ok(image) => image,
        Err(e) => {
            warn!(error = %e, "ai: generate failed");
            return Err(AiError::Service(e));
        }
    };

    let mut engine = engine.borrow_mut();
    let (id, actions) = place_generated_image(&mut engine.core, image);
    engine.dispatch(actions);
    info!(%id, "ai: generated image placed");
    Ok(id)
}
