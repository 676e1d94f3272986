//! Input model: modes, style, modifier keys, and the gesture state machine.
//!
//! `Mode` captures how pointer input is interpreted. `UiState` is the
//! transient editor state the host reads back (mode, selection, marquee,
//! text focus). `InputState` is the in-flight gesture tracked between
//! pointer-down and pointer-up; it is the only state carried between events
//! and is dropped without side effects on cancel or mode switch.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Point, Rect};
use crate::consts::{BRUSH_SIZE_MAX, BRUSH_SIZE_MIN, DEFAULT_BRUSH_SIZE, DEFAULT_FILL, DEFAULT_STROKE};
use crate::doc::{DrawableObject, ObjectId, ShapeKind};
use crate::hit::ResizeAnchor;

/// Active interpretation of pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Pick, move and resize objects (default).
    #[default]
    Select,
    /// Draw freehand strokes.
    FreehandDraw,
    /// Insert a shape at the viewport center.
    ShapeInsert(ShapeKind),
    /// Insert a text object at the viewport center.
    TextInsert,
    /// Drag pans the view.
    PanZoom,
}

impl Mode {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::FreehandDraw => "freehandDraw",
            Self::ShapeInsert(_) => "shapeInsert",
            Self::TextInsert => "textInsert",
            Self::PanZoom => "panZoom",
        }
    }
}

/// Current drawing style applied to new objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    stroke: String,
    fill: String,
    brush_size: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { stroke: DEFAULT_STROKE.to_owned(), fill: DEFAULT_FILL.to_owned(), brush_size: DEFAULT_BRUSH_SIZE }
    }
}

impl Style {
    #[must_use]
    pub fn stroke(&self) -> &str {
        &self.stroke
    }

    #[must_use]
    pub fn fill(&self) -> &str {
        &self.fill
    }

    #[must_use]
    pub fn brush_size(&self) -> f64 {
        self.brush_size
    }

    /// Blank colors are ignored.
    pub fn set_stroke(&mut self, color: &str) {
        let color = color.trim();
        if !color.is_empty() {
            color.clone_into(&mut self.stroke);
        }
    }

    /// Blank colors are ignored.
    pub fn set_fill(&mut self, color: &str) {
        let color = color.trim();
        if !color.is_empty() {
            color.clone_into(&mut self.fill);
        }
    }

    /// Clamped to `[BRUSH_SIZE_MIN, BRUSH_SIZE_MAX]`; non-finite sizes are ignored.
    pub fn set_brush_size(&mut self, size: f64) {
        if size.is_finite() {
            self.brush_size = size.clamp(BRUSH_SIZE_MIN, BRUSH_SIZE_MAX);
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key, named as the host platform reports it (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    pub(crate) fn is_delete(&self) -> bool {
        self.is("Delete") || self.is("Backspace")
    }

    pub(crate) fn is_escape(&self) -> bool {
        self.is("Escape")
    }

    pub(crate) fn is_undo(&self, modifiers: Modifiers) -> bool {
        modifiers.command() && !modifiers.shift && self.is("z")
    }

    pub(crate) fn is_redo(&self, modifiers: Modifiers) -> bool {
        modifiers.command() && ((modifiers.shift && self.is("z")) || self.is("y"))
    }
}

/// Wheel / trackpad scroll delta in screen pixels.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive scrolls down.
    pub dy: f64,
}

/// Transient editor state visible to the host. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub mode: Mode,
    /// Selected object ids in selection order, without duplicates.
    pub selected: Vec<ObjectId>,
    /// Marquee rectangle in scene space while a box-select drag is active.
    pub marquee: Option<Rect>,
    /// Text object currently focused for content editing.
    pub editing_text: Option<ObjectId>,
}

/// The in-flight gesture.
///
/// Each active variant carries what is needed to compute incremental deltas,
/// emit the final mutation on pointer-up, or roll back on cancel.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging pans the view.
    Panning {
        /// Screen position of the previous event.
        last_screen: Point,
    },
    /// Moving the selected objects.
    DraggingObjects {
        /// Scene position of the pointer-down.
        start_scene: Point,
        /// Objects as they were before the drag, for deltas and rollback.
        originals: Vec<DrawableObject>,
    },
    /// Dragging one resize handle of a single selected object.
    Resizing {
        anchor: ResizeAnchor,
        start_scene: Point,
        original: DrawableObject,
    },
    /// Box-selecting from empty space.
    Marquee {
        anchor_scene: Point,
        /// Selection kept from before the drag (shift held), extended by the box.
        base: Vec<ObjectId>,
    },
    /// Accumulating a freehand stroke in scene space.
    DrawingPath {
        points: Vec<Point>,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}
