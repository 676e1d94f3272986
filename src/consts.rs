//! Shared numeric constants for the editor.

// ── View ────────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const ZOOM_MIN: f64 = 0.5;

/// Largest allowed zoom factor.
pub const ZOOM_MAX: f64 = 5.0;

/// Fixed step applied by a single zoom-in / zoom-out.
pub const ZOOM_STEP: f64 = 0.1;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for handles and thin strokes.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Minimum world-space extent a resize may shrink an object to.
pub const MIN_RESIZE_EXTENT: f64 = 4.0;

// ── Insertion defaults ──────────────────────────────────────────

/// Edge length of inserted rectangles and triangles.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// Radius of inserted circles.
pub const DEFAULT_CIRCLE_RADIUS: f64 = 50.0;

/// Length of inserted lines.
pub const DEFAULT_LINE_LENGTH: f64 = 150.0;

/// Stroke width of inserted closed shapes.
pub const SHAPE_STROKE_WIDTH: f64 = 2.0;

/// Stroke width of inserted lines.
pub const LINE_STROKE_WIDTH: f64 = 5.0;

/// Placeholder content for inserted text.
pub const DEFAULT_TEXT: &str = "Double-click to edit";

/// Font family for inserted text.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Font size for inserted text.
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// Horizontal offset of inserted text from the viewport center.
pub const TEXT_INSERT_OFFSET_X: f64 = 100.0;

/// Width inserted images are scaled to.
pub const IMAGE_INSERT_WIDTH: f64 = 200.0;

// ── Text metrics (estimated; no font is loaded for layout) ──────

/// Average glyph advance as a fraction of the font size.
pub const TEXT_CHAR_WIDTH_RATIO: f64 = 0.6;

/// Line height as a multiple of the font size.
pub const TEXT_LINE_HEIGHT: f64 = 1.16;

// ── Style ───────────────────────────────────────────────────────

/// Default stroke color.
pub const DEFAULT_STROKE: &str = "#000000";

/// Default fill color.
pub const DEFAULT_FILL: &str = "#ffffff";

/// Default scene background.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Default freehand brush size.
pub const DEFAULT_BRUSH_SIZE: f64 = 5.0;

/// Brush size bounds.
pub const BRUSH_SIZE_MIN: f64 = 1.0;
pub const BRUSH_SIZE_MAX: f64 = 50.0;
