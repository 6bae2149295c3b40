//! Viewport and tool-interaction engine for the AI image-editing canvas.
//!
//! This crate owns everything between raw pointer input and scene mutation:
//! translating pointer events into tool gestures, maintaining the pan/zoom
//! viewport, hit-testing objects (including thin arrow strokes), building
//! shapes by dragging, editing arrow endpoints, and keeping floating overlay
//! UI anchored to the selection. The host layer only wires input events to
//! the engine and reacts to the [`engine::Action`]s it emits.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Engine context ([`engine::EngineCore`]), outbound actions, host wrapper |
//! | [`dispatch`] | Ordered pointer-down handler precedence |
//! | [`viewport`] | Scale/translate state and screen/scene conversions |
//! | [`input`] | Tools, modifiers, cursors, canvas flags and the gesture state machine |
//! | [`drag`] | Drag-to-create shapes and freehand strokes |
//! | [`arrow`] | Arrow geometry and endpoint handles |
//! | [`hit`] | Native hit test, handle hit test and the thin-stroke fallback |
//! | [`overlay`] | Screen-space anchors for the AI edit button and prompt dialog |
//! | [`doc`] | Scene objects and the in-memory scene store |
//! | [`ai`] | External AI/export collaborators and result placement |
//! | [`config`] | Typed engine configuration |
//! | [`consts`] | Shared numeric defaults |

pub mod ai;
pub mod arrow;
pub mod config;
pub mod consts;
pub mod dispatch;
pub mod doc;
pub mod drag;
pub mod engine;
pub mod hit;
pub mod input;
pub mod overlay;
pub mod viewport;
