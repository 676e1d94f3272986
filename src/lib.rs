//! Whiteboard editing engine.
//!
//! This crate owns everything between raw pointer input and the bytes that
//! land in the project store: the in-memory scene, the undo/redo history,
//! the tool-mode state machine, the view transform, and the persistence and
//! export paths. The dashboard and any UI chrome live outside and talk to the
//! engine through [`session::EditorSession`] and [`store::ProjectStore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Scene model: drawable objects, patches, the serialized document |
//! | [`camera`] | Zoom/pan view transform and coordinate conversions |
//! | [`hit`] | Bounding boxes, hit-testing, resize handles |
//! | [`history`] | Linear undo/redo snapshot stack |
//! | [`input`] | Modes, style state, and the gesture state machine types |
//! | [`engine`] | Tool/mode controller ([`engine::EngineCore`]) |
//! | [`store`] | Project store interface and bundled implementations |
//! | [`persistence`] | Load/save contract and the debounced save worker |
//! | [`render`] | Flat raster (PNG) export |
//! | [`session`] | One open editing session wiring the pieces together |
//! | [`config`] | Environment-driven configuration |
//! | [`consts`] | Shared numeric constants |
//! | [`error`] | Grepable error codes |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod hit;
pub mod history;
pub mod input;
pub mod persistence;
pub mod render;
pub mod session;
pub mod store;
