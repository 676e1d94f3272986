//! Scene model: drawable objects, sparse patches, and the owned scene.
//!
//! This module defines what is on the board (`DrawableObject`, a shared
//! transform `Header` plus a closed `Shape` variant set), the sparse update
//! type used by the controller (`ObjectPatch`), the serialized document
//! (`SceneDoc`), and the runtime `Scene` that owns every live object.
//!
//! DESIGN
//! ======
//! Paint order is the order of `Scene::objects`; later objects draw on top.
//! Edits never reorder siblings. Every structural mutator raises a pending
//! commit point; the controller turns that into a history snapshot at the end
//! of a discrete user action via `take_commit_point`. No-op mutations (removing
//! a missing id, a patch with only invalid fields) raise nothing.
//!
//! WIRE FORMAT
//! ===========
//! Each object record is a flat JSON object tagged by `type`. Fields the
//! editor does not understand are kept verbatim in `extra` and written back
//! on save until the object is touched by an edit, at which point they are
//! dropped.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{DEFAULT_BACKGROUND, DEFAULT_STROKE, TEXT_CHAR_WIDTH_RATIO, TEXT_LINE_HEIGHT};
use crate::error::ErrorCode;

/// Unique identifier for a drawable object.
pub type ObjectId = Uuid;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("scene document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate object id: {0}")]
    DuplicateId(ObjectId),
    #[error("object {id} has invalid geometry: {reason}")]
    InvalidGeometry { id: ObjectId, reason: &'static str },
}

impl ErrorCode for DocError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_DOC_PARSE",
            Self::DuplicateId(_) => "E_DOC_DUPLICATE_ID",
            Self::InvalidGeometry { .. } => "E_DOC_INVALID_GEOMETRY",
        }
    }
}

// =============================================================================
// OBJECT TYPES
// =============================================================================

/// The insertable closed shapes and lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
}

/// Transform and style shared by every object variant.
///
/// `x`/`y` is the top-left of the unscaled local bounds in scene space.
/// Rotation (degrees, clockwise) and scale apply around the center of the
/// scaled bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Header {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Stroke color as a CSS color string.
    pub stroke: String,
    pub stroke_width: f64,
    /// Fill color; `None` leaves the interior unpainted.
    pub fill: Option<String>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            stroke: DEFAULT_STROKE.to_owned(),
            stroke_width: 1.0,
            fill: None,
        }
    }
}

/// Variant-specific geometry. All coordinates are local to the header origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Shape {
    Rectangle { width: f64, height: f64 },
    Circle { radius: f64 },
    /// Isosceles triangle with its apex at the top center of the box.
    Triangle { width: f64, height: f64 },
    /// Segment from the origin to `(dx, dy)`.
    Line { dx: f64, dy: f64 },
    FreehandPath { points: Vec<Point> },
    Text { text: String, font_size: f64, font_family: String },
    /// `src` is an opaque image reference, typically a `data:` URL.
    Image { src: String, width: f64, height: f64 },
}

impl Shape {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "rectangle",
            Self::Circle { .. } => "circle",
            Self::Triangle { .. } => "triangle",
            Self::Line { .. } => "line",
            Self::FreehandPath { .. } => "freehandPath",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
        }
    }

    /// Unscaled bounds in local coordinates.
    #[must_use]
    pub fn local_bounds(&self) -> Rect {
        match self {
            Self::Rectangle { width, height } | Self::Triangle { width, height } | Self::Image { width, height, .. } => {
                Rect::from_xywh(0.0, 0.0, *width, *height)
            }
            Self::Circle { radius } => Rect::from_xywh(0.0, 0.0, radius * 2.0, radius * 2.0),
            Self::Line { dx, dy } => Rect::from_corners(Point::new(0.0, 0.0), Point::new(*dx, *dy)),
            Self::FreehandPath { points } => {
                Rect::bounding(points.iter().copied()).unwrap_or_else(|| Rect::from_xywh(0.0, 0.0, 0.0, 0.0))
            }
            Self::Text { text, font_size, .. } => {
                let (columns, lines) = text_extent(text);
                Rect::from_xywh(
                    0.0,
                    0.0,
                    columns as f64 * font_size * TEXT_CHAR_WIDTH_RATIO,
                    lines as f64 * font_size * TEXT_LINE_HEIGHT,
                )
            }
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        let ok = match self {
            Self::Rectangle { width, height } | Self::Triangle { width, height } | Self::Image { width, height, .. } => {
                *width >= 0.0 && *height >= 0.0
            }
            Self::Circle { radius } => *radius >= 0.0,
            Self::Line { .. } => true,
            Self::FreehandPath { points } => !points.is_empty(),
            Self::Text { font_size, .. } => *font_size > 0.0,
        };
        if ok { Ok(()) } else { Err("negative or empty geometry") }
    }
}

/// Longest line in characters and line count of a text block.
pub(crate) fn text_extent(text: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut lines = 0;
    for line in text.split('\n') {
        columns = columns.max(line.chars().count());
        lines += 1;
    }
    (columns, lines.max(1))
}

/// A single object on the board.
///
/// Objects are values owned exclusively by a [`Scene`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct DrawableObject {
    pub id: ObjectId,
    pub header: Header,
    pub shape: Shape,
    /// Record fields this editor does not understand, preserved until the
    /// object is edited.
    extra: Map<String, Value>,
}

impl DrawableObject {
    /// Create an object with a fresh id.
    #[must_use]
    pub fn new(header: Header, shape: Shape) -> Self {
        Self { id: Uuid::new_v4(), header, shape, extra: Map::new() }
    }

    /// Build a freehand stroke from scene-space points. The header origin is
    /// placed at the top-left of the points' bounds. Returns `None` when no
    /// points were captured.
    #[must_use]
    pub fn freehand(points: &[Point], mut header: Header) -> Option<Self> {
        let bounds = Rect::bounding(points.iter().copied())?;
        let mut local: Vec<Point> =
            points.iter().map(|p| Point::new(p.x - bounds.min.x, p.y - bounds.min.y)).collect();
        // A click without movement still leaves a dot.
        if local.len() == 1 {
            local.push(local[0]);
        }
        header.x = bounds.min.x;
        header.y = bounds.min.y;
        Some(Self::new(header, Shape::FreehandPath { points: local }))
    }

    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Apply a patch. Invalid fields are ignored. Returns `true` if anything
    /// changed; a changed object drops its preserved unknown fields.
    pub fn apply_patch(&mut self, patch: &ObjectPatch) -> bool {
        let before = (self.header.clone(), self.shape.clone());
        let h = &mut self.header;

        if let Some(x) = patch.x.filter(|v| v.is_finite()) {
            h.x = x;
        }
        if let Some(y) = patch.y.filter(|v| v.is_finite()) {
            h.y = y;
        }
        if let Some(r) = patch.rotation.filter(|v| v.is_finite()) {
            h.rotation = r.rem_euclid(360.0);
        }
        if let Some(sx) = patch.scale_x.filter(|v| v.is_finite() && *v > 0.0) {
            h.scale_x = sx;
        }
        if let Some(sy) = patch.scale_y.filter(|v| v.is_finite() && *v > 0.0) {
            h.scale_y = sy;
        }
        if let Some(stroke) = patch.stroke.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            h.stroke = stroke.to_owned();
        }
        if let Some(w) = patch.stroke_width.filter(|v| v.is_finite() && *v >= 0.0) {
            h.stroke_width = w;
        }
        if let Some(fill) = &patch.fill {
            match fill.as_deref().map(str::trim) {
                Some("") => {}
                Some(color) => h.fill = Some(color.to_owned()),
                None => h.fill = None,
            }
        }
        if let Shape::Text { text, font_size, .. } = &mut self.shape {
            if let Some(new_text) = &patch.text {
                text.clone_from(new_text);
            }
            if let Some(fs) = patch.font_size.filter(|v| v.is_finite() && *v > 0.0) {
                *font_size = fs;
            }
        }

        let changed = before.0 != self.header || before.1 != self.shape;
        if changed {
            self.extra.clear();
        }
        changed
    }
}

impl TryFrom<Map<String, Value>> for DrawableObject {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match map.get("id") {
            Some(raw) => ObjectId::deserialize(raw)?,
            // Records written by other tools may lack ids.
            None => Uuid::new_v4(),
        };
        let record = Value::Object(map);
        let header = Header::deserialize(&record)?;
        let shape = Shape::deserialize(&record)?;

        let mut known: HashSet<String> = HashSet::from(["id".to_owned()]);
        for part in [serde_json::to_value(&header)?, serde_json::to_value(&shape)?] {
            if let Value::Object(fields) = part {
                known.extend(fields.into_iter().map(|(k, _)| k));
            }
        }

        let extra = record
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .filter(|(k, _)| !known.contains(*k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self { id, header, shape, extra })
    }
}

impl From<DrawableObject> for Map<String, Value> {
    fn from(obj: DrawableObject) -> Self {
        let mut out = obj.extra;
        out.insert("id".into(), Value::String(obj.id.to_string()));
        for part in [serde_json::to_value(&obj.header), serde_json::to_value(&obj.shape)] {
            if let Ok(Value::Object(fields)) = part {
                out.extend(fields);
            }
        }
        out
    }
}

/// Sparse update for an object. Only present fields are applied; values that
/// are out of range are ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    /// `Some(None)` clears the fill.
    pub fill: Option<Option<String>>,
    /// Text objects only.
    pub text: Option<String>,
    /// Text objects only.
    pub font_size: Option<f64>,
}

impl ObjectPatch {
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_owned()
}

/// Serialized scene: the format persisted in a project's `canvasData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDoc {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub objects: Vec<DrawableObject>,
}

impl Default for SceneDoc {
    fn default() -> Self {
        Self { background: default_background(), objects: Vec::new() }
    }
}

impl SceneDoc {
    /// Parse and validate a stored document.
    ///
    /// # Errors
    ///
    /// Returns [`DocError`] if the value does not match the document shape or
    /// fails validation.
    pub fn from_value(value: Value) -> Result<Self, DocError> {
        let doc: SceneDoc = serde_json::from_value(value)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Parse and validate a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocError`] on malformed JSON or failed validation.
    pub fn from_json(text: &str) -> Result<Self, DocError> {
        let doc: SceneDoc = serde_json::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error only if a preserved unknown field cannot be encoded.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Check id uniqueness and geometry.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), DocError> {
        let mut seen = HashSet::with_capacity(self.objects.len());
        for obj in &self.objects {
            if !seen.insert(obj.id) {
                return Err(DocError::DuplicateId(obj.id));
            }
            let h = &obj.header;
            if h.scale_x <= 0.0 || h.scale_y <= 0.0 || h.stroke_width < 0.0 {
                return Err(DocError::InvalidGeometry { id: obj.id, reason: "non-positive scale or negative stroke" });
            }
            obj.shape.validate().map_err(|reason| DocError::InvalidGeometry { id: obj.id, reason })?;
        }
        Ok(())
    }
}

// =============================================================================
// SCENE
// =============================================================================

/// The live, ordered collection of objects for one editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    objects: Vec<DrawableObject>,
    background: String,
    commit_pending: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// An empty scene on the default background.
    #[must_use]
    pub fn new() -> Self {
        Self { objects: Vec::new(), background: default_background(), commit_pending: false }
    }

    /// Hydrate a scene from a document.
    #[must_use]
    pub fn from_doc(doc: &SceneDoc) -> Self {
        let mut scene = Self::new();
        scene.restore(doc);
        scene
    }

    // --- Queries ---

    /// Objects in paint order (bottom first).
    #[must_use]
    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&DrawableObject> {
        self.objects.iter().find(|o| o.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn background(&self) -> &str {
        &self.background
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // --- Mutators ---

    /// Append an object on top of the paint order and return its id. An
    /// object whose id is already taken is given a fresh one.
    pub fn add_object(&mut self, mut obj: DrawableObject) -> ObjectId {
        if self.contains(&obj.id) {
            obj.id = Uuid::new_v4();
        }
        let id = obj.id;
        self.objects.push(obj);
        self.commit_pending = true;
        id
    }

    /// Remove every listed object that exists, returning the removed objects
    /// in paint order. Missing ids are ignored.
    pub fn remove_objects(&mut self, ids: &[ObjectId]) -> Vec<DrawableObject> {
        let doomed: HashSet<&ObjectId> = ids.iter().collect();
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.objects).into_iter().partition(|o| doomed.contains(&o.id));
        self.objects = kept;
        if !removed.is_empty() {
            self.commit_pending = true;
        }
        removed
    }

    /// Apply a sparse patch in place. Returns `false` if the object does not
    /// exist or nothing changed.
    pub fn update_object(&mut self, id: &ObjectId, patch: &ObjectPatch) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|o| o.id == *id) else {
            return false;
        };
        let changed = obj.apply_patch(patch);
        if changed {
            self.commit_pending = true;
        }
        changed
    }

    /// Put back an exact earlier copy of an object without raising a commit
    /// point. Used to roll back a cancelled gesture.
    pub(crate) fn revert_object(&mut self, original: DrawableObject) -> bool {
        let Some(slot) = self.objects.iter_mut().find(|o| o.id == original.id) else {
            return false;
        };
        *slot = original;
        true
    }

    pub fn set_background(&mut self, color: &str) -> bool {
        let color = color.trim();
        if color.is_empty() || color == self.background {
            return false;
        }
        color.clone_into(&mut self.background);
        self.commit_pending = true;
        true
    }

    /// Remove all objects and reset the background. Returns `false` if the
    /// scene was already blank.
    pub fn clear(&mut self) -> bool {
        if self.objects.is_empty() && self.background == DEFAULT_BACKGROUND {
            return false;
        }
        self.objects.clear();
        self.background = default_background();
        self.commit_pending = true;
        true
    }

    // --- Serialization ---

    #[must_use]
    pub fn serialize(&self) -> SceneDoc {
        SceneDoc { background: self.background.clone(), objects: self.objects.clone() }
    }

    /// Replace the scene contents with a document. Does not raise a commit
    /// point; restoring is how history and loads apply snapshots.
    pub fn restore(&mut self, doc: &SceneDoc) {
        self.background.clone_from(&doc.background);
        self.objects.clone_from(&doc.objects);
        self.commit_pending = false;
    }

    // --- Commit points ---

    /// Whether a structural mutation happened since the last commit point was taken.
    #[must_use]
    pub fn has_pending_commit(&self) -> bool {
        self.commit_pending
    }

    /// Consume the pending commit point, returning whether there was one.
    pub fn take_commit_point(&mut self) -> bool {
        std::mem::take(&mut self.commit_pending)
    }

    /// Drop a pending commit point without committing (gesture cancelled).
    pub(crate) fn discard_commit_point(&mut self) {
        self.commit_pending = false;
    }
}
