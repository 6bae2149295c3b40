#![allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::sync::Mutex;

use super::*;
use crate::doc::SceneObject;
use crate::input::Tool;

// =========================================================================
// Fakes
// =========================================================================

fn png(width_px: u32, height_px: u32) -> ImageData {
    ImageData { mime: "image/png".into(), width_px, height_px, bytes: vec![0x89, b'P', b'N', b'G'] }
}

struct FakeGate {
    signed_in: bool,
    credits: u32,
}

impl FakeGate {
    fn open() -> Self {
        Self { signed_in: true, credits: 10 }
    }
}

impl AccessGate for FakeGate {
    fn auth_guard(&self) -> bool {
        self.signed_in
    }

    fn credit_guard(&self, cost: u32) -> bool {
        self.credits >= cost
    }
}

struct FakeExporter {
    fail: bool,
    seen: Mutex<Vec<Rect>>,
}

impl FakeExporter {
    fn ok() -> Self {
        Self { fail: false, seen: Mutex::new(Vec::new()) }
    }

    fn failing() -> Self {
        Self { fail: true, seen: Mutex::new(Vec::new()) }
    }
}

impl RegionExporter for FakeExporter {
    fn export_region(&self, bounds: Rect) -> Result<ImageData, ServiceError> {
        self.seen.lock().unwrap().push(bounds);
        if self.fail {
            return Err(ServiceError("canvas tainted".into()));
        }
        Ok(png(bounds.width as u32, bounds.height as u32))
    }
}

struct FakeService {
    result: Result<ImageData, ServiceError>,
    prompts: Mutex<Vec<String>>,
}

impl FakeService {
    fn returning(image: ImageData) -> Self {
        Self { result: Ok(image), prompts: Mutex::new(Vec::new()) }
    }

    fn failing(message: &str) -> Self {
        Self { result: Err(ServiceError(message.into())), prompts: Mutex::new(Vec::new()) }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl AiImageService for FakeService {
    async fn edit_image(&self, _source: &ImageData, prompt: &str) -> Result<ImageData, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        tokio::task::yield_now().await;
        self.result.clone()
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageData, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        tokio::task::yield_now().await;
        self.result.clone()
    }
}

fn core_with_selected_rect() -> (EngineCore, ObjectId) {
    let mut core = EngineCore::new();
    let rect = SceneObject::new(ObjectKind::Rect, 0.0, 0.0, 100.0, 80.0);
    let id = rect.id;
    core.load_snapshot(vec![rect]);
    core.select(Some(id));
    (core, id)
}

fn engine_with_selected_rect() -> (RefCell<Engine<Vec<Action>>>, ObjectId) {
    let (core, id) = core_with_selected_rect();
    let mut engine = Engine::new(Vec::<Action>::new());
    engine.core = core;
    (RefCell::new(engine), id)
}

// =========================================================================
// prepare_ai_edit / capture_selection
// =========================================================================

#[test]
fn prepare_requires_selection() {
    let core = EngineCore::new();
    let err = prepare_ai_edit(&core, "sky", &FakeGate::open(), &FakeExporter::ok()).unwrap_err();
    assert!(matches!(err, AiError::NothingSelected));
}

#[test]
fn prepare_rejects_blank_prompt() {
    let (core, _) = core_with_selected_rect();
    let err = prepare_ai_edit(&core, "  ", &FakeGate::open(), &FakeExporter::ok()).unwrap_err();
    assert!(matches!(err, AiError::EmptyPrompt));
}

#[test]
fn prepare_checks_auth_then_credits() {
    let (core, _) = core_with_selected_rect();
    let signed_out = FakeGate { signed_in: false, credits: 10 };
    let err = prepare_ai_edit(&core, "sky", &signed_out, &FakeExporter::ok()).unwrap_err();
    assert!(matches!(err, AiError::Unauthenticated));

    let broke = FakeGate { signed_in: true, credits: 0 };
    let exporter = FakeExporter::ok();
    let err = prepare_ai_edit(&core, "sky", &broke, &exporter).unwrap_err();
    assert!(matches!(err, AiError::InsufficientCredits { cost: 1 }));
    assert!(exporter.seen.lock().unwrap().is_empty());
}

#[test]
fn prepare_surfaces_export_failure() {
    let (core, _) = core_with_selected_rect();
    let err = prepare_ai_edit(&core, "sky", &FakeGate::open(), &FakeExporter::failing()).unwrap_err();
    assert!(matches!(err, AiError::Export(ServiceError(ref m)) if m == "canvas tainted"));
    assert_eq!(err.to_string(), "region export failed: canvas tainted");
}

#[test]
fn prepare_captures_bounds_and_trimmed_prompt() {
    let (core, id) = core_with_selected_rect();
    let exporter = FakeExporter::ok();
    let req = prepare_ai_edit(&core, "  make it blue ", &FakeGate::open(), &exporter).unwrap();
    assert_eq!(req.source_id, id);
    assert_eq!(req.bounds, Rect::new(0.0, 0.0, 100.0, 80.0));
    assert_eq!(req.prompt, "make it blue");
    assert_eq!((req.image.width_px, req.image.height_px), (100, 80));
    assert_eq!(*exporter.seen.lock().unwrap(), vec![req.bounds]);
}

#[test]
fn capture_selection_without_selection() {
    let core = EngineCore::new();
    assert!(matches!(capture_selection(&core, &FakeExporter::ok()), Err(AiError::NothingSelected)));
}

// =========================================================================
// Placement
// =========================================================================

#[test]
fn edit_result_sits_beside_source() {
    let (mut core, source) = core_with_selected_rect();
    let (id, actions) = place_edit_result(&mut core, Rect::new(0.0, 0.0, 100.0, 80.0), png(512, 512));
    let obj = core.object(&id).unwrap();
    assert_eq!(obj.kind, ObjectKind::Image);
    assert_eq!((obj.left, obj.top, obj.width, obj.height), (120.0, 0.0, 100.0, 80.0));
    assert!(obj.z_index > core.object(&source).unwrap().z_index);
    assert!(actions.iter().any(|a| matches!(a, Action::ObjectAdded(o) if o.id == id)));
    assert_eq!(core.selection(), Some(id));
}

#[test]
fn edit_result_for_degenerate_bounds_uses_pixel_size() {
    let mut core = EngineCore::new();
    let (id, _) = place_edit_result(&mut core, Rect::new(10.0, 10.0, 0.0, 0.0), png(64, 48));
    let obj = core.object(&id).unwrap();
    assert_eq!((obj.left, obj.width, obj.height), (30.0, 64.0, 48.0));
}

#[test]
fn generated_image_is_centered_in_view() {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 600.0, Point::default());
    core.pan_by(-100.0, 0.0);
    let (id, _) = place_generated_image(&mut core, png(64, 32));
    let obj = core.object(&id).unwrap();
    assert_eq!((obj.left, obj.top), (468.0, 284.0));
    assert_eq!(obj.image.as_ref().unwrap().mime, "image/png");
}

#[test]
fn placed_image_not_selected_outside_select_tool() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Pan);
    let (_, actions) = place_generated_image(&mut core, png(8, 8));
    assert!(core.selection().is_none());
    assert!(!actions.iter().any(|a| matches!(a, Action::SelectionChanged(_))));
}

// =========================================================================
// Async runners
// =========================================================================

#[tokio::test]
async fn run_ai_edit_places_result() {
    let (engine, source) = engine_with_selected_rect();
    let service = FakeService::returning(png(100, 80));
    let id = run_ai_edit(&engine, " sky ", &service, &FakeGate::open(), &FakeExporter::ok())
        .await
        .unwrap();
    let engine = engine.into_inner();
    assert_ne!(id, source);
    assert_eq!(engine.core.doc.len(), 2);
    assert_eq!(*service.prompts.lock().unwrap(), vec!["sky".to_owned()]);
    assert!(engine.host().iter().any(|a| matches!(a, Action::ObjectAdded(o) if o.id == id)));
}

#[tokio::test]
async fn run_ai_edit_failure_leaves_scene_unmodified() {
    let (engine, source) = engine_with_selected_rect();
    let service = FakeService::failing("rate limited");
    let err = run_ai_edit(&engine, "sky", &service, &FakeGate::open(), &FakeExporter::ok())
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::Service(_)));
    let engine = engine.into_inner();
    assert_eq!(engine.core.doc.len(), 1);
    assert_eq!(engine.core.selection(), Some(source));
    assert!(engine.host().is_empty());
}

#[tokio::test]
async fn run_ai_edit_gate_failure_never_calls_service() {
    let (engine, _) = engine_with_selected_rect();
    let service = FakeService::returning(png(1, 1));
    let gate = FakeGate { signed_in: false, credits: 10 };
    let err = run_ai_edit(&engine, "sky", &service, &gate, &FakeExporter::ok()).await.unwrap_err();
    assert!(matches!(err, AiError::Unauthenticated));
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn engine_is_not_borrowed_while_request_is_in_flight() {
    let (engine, _) = engine_with_selected_rect();
    let service = FakeService::returning(png(100, 80));
    let gate = FakeGate::open();
    let exporter = FakeExporter::ok();
    let (result, ()) = tokio::join!(run_ai_edit(&engine, "sky", &service, &gate, &exporter), async {
        engine.borrow_mut().pan_by(5.0, 5.0);
    });
    assert!(result.is_ok());
    assert_eq!(engine.borrow().core.viewport().translate_x, 5.0);
}

#[tokio::test]
async fn run_ai_generate_places_image() {
    let engine = RefCell::new(Engine::new(Vec::<Action>::new()));
    engine.borrow_mut().set_viewport(400.0, 400.0, Point::default());
    let service = FakeService::returning(png(100, 100));
    let id = run_ai_generate(&engine, "a cat", &service, &FakeGate::open()).await.unwrap();
    let obj = engine.borrow().core.object(&id).cloned().unwrap();
    assert_eq!((obj.left, obj.top), (150.0, 150.0));
}

#[tokio::test]
async fn run_ai_generate_rejects_blank_prompt_and_credits() {
    let engine = RefCell::new(Engine::new(Vec::<Action>::new()));
    let service = FakeService::returning(png(1, 1));
    let err = run_ai_generate(&engine, "", &service, &FakeGate::open()).await.unwrap_err();
    assert!(matches!(err, AiError::EmptyPrompt));
    let broke = FakeGate { signed_in: true, credits: 0 };
    let err = run_ai_generate(&engine, "cat", &service, &broke).await.unwrap_err();
    assert!(matches!(err, AiError::InsufficientCredits { .. }));
    assert_eq!(service.calls(), 0);
    assert!(engine.borrow().core.doc.is_empty());
}
