//! Tool/mode controller.
//!
//! `EngineCore` owns the scene, its history, the camera, and the transient
//! UI state for one editing session. Hosts feed it input through one
//! dispatch function per event type (`on_pointer_down`, `on_pointer_move`,
//! `on_pointer_up`, `on_pointer_cancel`, `on_key_down`, `on_wheel`,
//! `on_double_click`) plus explicit toolbar actions, and get back a list of
//! [`Action`]s describing what happened.
//!
//! DESIGN
//! ======
//! Scene mutations happen in place as the user works; a history snapshot is
//! taken only at the end of a discrete action (`finish_action`). A drag in
//! progress therefore never reaches the history, and cancelling a gesture
//! rolls the touched objects back to their pre-gesture copies.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{
    DEFAULT_CIRCLE_RADIUS, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_LINE_LENGTH, DEFAULT_SHAPE_SIZE,
    DEFAULT_TEXT, IMAGE_INSERT_WIDTH, LINE_STROKE_WIDTH, SHAPE_STROKE_WIDTH, TEXT_INSERT_OFFSET_X,
};
use crate::doc::{DrawableObject, Header, ObjectId, ObjectPatch, Scene, SceneDoc, Shape, ShapeKind};
use crate::hit::{self, HitPart};
use crate::history::{History, Snapshot};
use crate::input::{InputState, Key, Mode, Modifiers, Style, UiState, WheelDelta};

/// What an input handler did, for the host to react to.
#[derive(Debug, Clone)]
pub enum Action {
    /// The view or scene changed and should be repainted.
    RenderNeeded,
    SelectionChanged(Vec<ObjectId>),
    ModeChanged(Mode),
    /// A discrete edit was committed to history.
    Committed { index: usize, snapshot: Snapshot },
    /// Undo/redo moved the history cursor and the scene was replaced.
    Restored { index: usize, snapshot: Snapshot },
    /// A text object gained focus; the host should open its text editor.
    EditTextRequested { id: ObjectId, text: String },
}

impl Action {
    /// The snapshot to persist, if this action changed the committed state.
    #[must_use]
    pub fn persisted_snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Committed { snapshot, .. } | Self::Restored { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

/// Controller state for one editing session.
#[derive(Debug)]
pub struct EngineCore {
    scene: Scene,
    history: History,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub style: Style,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineCore {
    /// An engine over an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scene(Scene::new(), usize::MAX)
    }

    /// An engine over `scene`, whose current contents become history entry 0.
    #[must_use]
    pub fn with_scene(mut scene: Scene, history_limit: usize) -> Self {
        scene.discard_commit_point();
        let history = History::new(scene.serialize(), history_limit);
        Self {
            scene,
            history,
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::Idle,
            style: Style::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }

    /// Replace the scene with a loaded document and restart history from it.
    /// Transient state (gesture, selection, text focus) is dropped.
    pub fn load_scene(&mut self, doc: &SceneDoc) -> Vec<Action> {
        self.input = InputState::Idle;
        self.ui.selected.clear();
        self.ui.marquee = None;
        self.ui.editing_text = None;
        self.scene.restore(doc);
        self.history.reset(doc.clone());
        vec![Action::SelectionChanged(Vec::new()), Action::RenderNeeded]
    }

    // --- Queries ---

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.ui.mode
    }

    #[must_use]
    pub fn selection(&self) -> &[ObjectId] {
        &self.ui.selected
    }

    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&DrawableObject> {
        self.scene.get(id)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Serialized copy of the live scene.
    #[must_use]
    pub fn snapshot(&self) -> SceneDoc {
        self.scene.serialize()
    }

    // --- Viewport ---

    /// Update viewport dimensions in screen pixels. Non-finite or negative
    /// sizes are ignored.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
            self.viewport_width = width;
            self.viewport_height = height;
        }
    }

    /// Scene-space point at the center of the viewport.
    #[must_use]
    pub fn viewport_center(&self) -> Point {
        self.camera.screen_to_scene(self.viewport_center_screen())
    }

    fn viewport_center_screen(&self) -> Point {
        Point::new(self.viewport_width * 0.5, self.viewport_height * 0.5)
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        if self.camera.zoom_in(self.viewport_center_screen()) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        if self.camera.zoom_out(self.viewport_center_screen()) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Modes ---

    /// Switch modes. Any in-flight gesture is discarded and any open text
    /// edit is ended. Leaving select clears the selection. The insert modes
    /// perform their insertion immediately and settle back into select with
    /// the new object selected.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.end_text_edit());

        if mode != Mode::Select && !self.ui.selected.is_empty() {
            self.ui.selected.clear();
            actions.push(Action::SelectionChanged(Vec::new()));
        }
        debug!(from = self.ui.mode.name(), to = mode.name(), "mode switch");

        match mode {
            Mode::ShapeInsert(kind) => {
                actions.extend(self.insert_shape(kind));
                self.ui.mode = Mode::Select;
            }
            Mode::TextInsert => {
                actions.extend(self.insert_text());
                self.ui.mode = Mode::Select;
            }
            Mode::Select | Mode::FreehandDraw | Mode::PanZoom => self.ui.mode = mode,
        }
        actions.push(Action::ModeChanged(self.ui.mode));
        actions
    }

    // --- Insertion ---

    /// Insert a shape centered in the viewport using the current style,
    /// select it, and commit.
    pub fn insert_shape(&mut self, kind: ShapeKind) -> Vec<Action> {
        let c = self.viewport_center();
        let half = DEFAULT_SHAPE_SIZE * 0.5;
        let (header, shape) = match kind {
            ShapeKind::Rectangle => (
                self.shape_header(c.x - half, c.y - half, SHAPE_STROKE_WIDTH, true),
                Shape::Rectangle { width: DEFAULT_SHAPE_SIZE, height: DEFAULT_SHAPE_SIZE },
            ),
            ShapeKind::Circle => (
                self.shape_header(c.x - DEFAULT_CIRCLE_RADIUS, c.y - DEFAULT_CIRCLE_RADIUS, SHAPE_STROKE_WIDTH, true),
                Shape::Circle { radius: DEFAULT_CIRCLE_RADIUS },
            ),
            ShapeKind::Triangle => (
                self.shape_header(c.x - half, c.y - half, SHAPE_STROKE_WIDTH, true),
                Shape::Triangle { width: DEFAULT_SHAPE_SIZE, height: DEFAULT_SHAPE_SIZE },
            ),
            ShapeKind::Line => (
                self.shape_header(c.x - DEFAULT_LINE_LENGTH * 0.5, c.y, LINE_STROKE_WIDTH, false),
                Shape::Line { dx: DEFAULT_LINE_LENGTH, dy: 0.0 },
            ),
        };
        self.add_and_select(DrawableObject::new(header, shape))
    }

    /// Insert placeholder text at the viewport center, commit, and focus it
    /// for editing.
    pub fn insert_text(&mut self) -> Vec<Action> {
        let c = self.viewport_center();
        let header = Header {
            x: c.x - TEXT_INSERT_OFFSET_X,
            y: c.y,
            stroke: self.style.stroke().to_owned(),
            stroke_width: 0.0,
            fill: Some(self.style.stroke().to_owned()),
            ..Header::default()
        };
        let shape = Shape::Text {
            text: DEFAULT_TEXT.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
        };
        let mut actions = self.add_and_select(DrawableObject::new(header, shape));
        if let Some(id) = self.ui.selected.last().copied() {
            actions.extend(self.begin_text_edit(&id));
        }
        actions
    }

    /// Insert an image scaled to a fixed width and centered in the viewport.
    /// Non-positive or non-finite natural sizes are ignored.
    pub fn insert_image(&mut self, src: &str, natural_width: f64, natural_height: f64) -> Vec<Action> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(natural_width) || !valid(natural_height) || src.is_empty() {
            return Vec::new();
        }
        let scale = IMAGE_INSERT_WIDTH / natural_width;
        let c = self.viewport_center();
        let header = Header {
            x: c.x - IMAGE_INSERT_WIDTH * 0.5,
            y: c.y - natural_height * scale * 0.5,
            scale_x: scale,
            scale_y: scale,
            stroke_width: 0.0,
            ..Header::default()
        };
        let shape = Shape::Image { src: src.to_owned(), width: natural_width, height: natural_height };
        self.add_and_select(DrawableObject::new(header, shape))
    }

    fn shape_header(&self, x: f64, y: f64, stroke_width: f64, filled: bool) -> Header {
        Header {
            x,
            y,
            stroke: self.style.stroke().to_owned(),
            stroke_width,
            fill: filled.then(|| self.style.fill().to_owned()),
            ..Header::default()
        }
    }

    fn add_and_select(&mut self, obj: DrawableObject) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.end_text_edit());
        let id = self.scene.add_object(obj);
        self.ui.selected = vec![id];
        actions.push(Action::SelectionChanged(vec![id]));
        actions.push(Action::RenderNeeded);
        actions.extend(self.finish_action());
        actions
    }

    // --- Text editing ---

    /// Focus a text object for content editing. Non-text ids are ignored.
    pub fn begin_text_edit(&mut self, id: &ObjectId) -> Vec<Action> {
        let Some(Shape::Text { text, .. }) = self.scene.get(id).map(|o| &o.shape) else {
            return Vec::new();
        };
        let text = text.clone();
        let mut actions = Vec::new();
        if self.ui.editing_text.is_some_and(|current| current != *id) {
            actions.extend(self.end_text_edit());
        }
        self.ui.editing_text = Some(*id);
        actions.push(Action::EditTextRequested { id: *id, text });
        actions
    }

    /// Replace the content of the focused text object. Nothing is committed
    /// until the edit ends.
    pub fn set_text(&mut self, id: &ObjectId, text: &str) -> Vec<Action> {
        if self.ui.editing_text != Some(*id) {
            return Vec::new();
        }
        let patch = ObjectPatch { text: Some(text.to_owned()), ..ObjectPatch::default() };
        if self.scene.update_object(id, &patch) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    /// Blur the focused text object, committing if its content changed.
    pub fn end_text_edit(&mut self) -> Vec<Action> {
        if self.ui.editing_text.take().is_none() {
            return Vec::new();
        }
        self.finish_action()
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        if self.input.is_active() {
            return Vec::new();
        }
        let scene_pt = self.camera.screen_to_scene(screen_pt);

        match self.ui.mode {
            Mode::FreehandDraw => {
                self.input = InputState::DrawingPath { points: vec![scene_pt] };
                Vec::new()
            }
            Mode::PanZoom => {
                self.input = InputState::Panning { last_screen: screen_pt };
                Vec::new()
            }
            Mode::Select | Mode::ShapeInsert(_) | Mode::TextInsert => self.select_pointer_down(scene_pt, modifiers),
        }
    }

    fn select_pointer_down(&mut self, scene_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = self.end_text_edit();
        let hit = hit::hit_test(scene_pt, &self.scene, &self.camera, &self.ui.selected);

        let Some(hit) = hit else {
            if !modifiers.shift && !self.ui.selected.is_empty() {
                self.ui.selected.clear();
                actions.push(Action::SelectionChanged(Vec::new()));
            }
            let base = if modifiers.shift { self.ui.selected.clone() } else { Vec::new() };
            self.input = InputState::Marquee { anchor_scene: scene_pt, base };
            return actions;
        };

        if let HitPart::ResizeHandle(anchor) = hit.part
            && let Some(original) = self.scene.get(&hit.object_id).cloned()
        {
            self.input = InputState::Resizing { anchor, start_scene: scene_pt, original };
            return actions;
        }

        let id = hit.object_id;
        let already = self.ui.selected.contains(&id);
        if modifiers.shift {
            if already {
                self.ui.selected.retain(|s| *s != id);
            } else {
                self.ui.selected.push(id);
            }
            actions.push(Action::SelectionChanged(self.ui.selected.clone()));
        } else if !already {
            self.ui.selected = vec![id];
            actions.push(Action::SelectionChanged(self.ui.selected.clone()));
        }

        if self.ui.selected.contains(&id) {
            let originals = self.ui.selected.iter().filter_map(|s| self.scene.get(s).cloned()).collect();
            self.input = InputState::DraggingObjects { start_scene: scene_pt, originals };
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let scene_pt = self.camera.screen_to_scene(screen_pt);

        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                self.camera.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::DraggingObjects { start_scene, originals } => {
                let (dx, dy) = (scene_pt.x - start_scene.x, scene_pt.y - start_scene.y);
                for orig in originals.iter() {
                    let patch = ObjectPatch::position(orig.header.x + dx, orig.header.y + dy);
                    self.scene.update_object(&orig.id, &patch);
                }
                vec![Action::RenderNeeded]
            }
            InputState::Resizing { anchor, start_scene, original } => {
                let delta = Point::new(scene_pt.x - start_scene.x, scene_pt.y - start_scene.y);
                let patch = hit::resize_patch(original, *anchor, delta);
                self.scene.update_object(&original.id, &patch);
                vec![Action::RenderNeeded]
            }
            InputState::Marquee { anchor_scene, base } => {
                let rect = Rect::from_corners(*anchor_scene, scene_pt);
                self.ui.marquee = Some(rect);
                let mut actions = vec![Action::RenderNeeded];
                let mut selected = base.clone();
                for id in hit::objects_in_rect(&self.scene, &rect) {
                    if !selected.contains(&id) {
                        selected.push(id);
                    }
                }
                if selected != self.ui.selected {
                    self.ui.selected = selected;
                    actions.push(Action::SelectionChanged(self.ui.selected.clone()));
                }
                actions
            }
            InputState::DrawingPath { points } => {
                if points.last() == Some(&scene_pt) {
                    return Vec::new();
                }
                points.push(scene_pt);
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = self.on_pointer_move(screen_pt, modifiers);

        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => {}
            InputState::DraggingObjects { originals, .. } => actions.extend(self.finish_transform(originals)),
            InputState::Resizing { original, .. } => actions.extend(self.finish_transform(vec![original])),
            InputState::Marquee { .. } => {
                self.ui.marquee = None;
                actions.push(Action::RenderNeeded);
            }
            InputState::DrawingPath { points } => {
                let header = Header {
                    stroke: self.style.stroke().to_owned(),
                    stroke_width: self.style.brush_size(),
                    fill: None,
                    ..Header::default()
                };
                if let Some(stroke) = DrawableObject::freehand(&points, header) {
                    actions.extend(self.end_text_edit());
                    self.scene.add_object(stroke);
                    actions.push(Action::RenderNeeded);
                    actions.extend(self.finish_action());
                }
            }
        }
        actions
    }

    /// The host lost the pointer (e.g. window blur); discard the gesture.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.cancel_gesture()
    }

    /// Double-click focuses a text object for editing. Select mode only.
    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.ui.mode != Mode::Select {
            return Vec::new();
        }
        let scene_pt = self.camera.screen_to_scene(screen_pt);
        let hit = hit::hit_test(scene_pt, &self.scene, &self.camera, &[]);
        match hit {
            Some(hit) => self.begin_text_edit(&hit.object_id),
            None => Vec::new(),
        }
    }

    /// Discard the in-flight gesture, rolling back anything it changed.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let cancelled = std::mem::take(&mut self.input);
        let actions = match cancelled {
            InputState::Idle => return Vec::new(),
            InputState::Panning { .. } | InputState::DrawingPath { .. } => vec![Action::RenderNeeded],
            InputState::Marquee { .. } => {
                self.ui.marquee = None;
                vec![Action::RenderNeeded]
            }
            InputState::DraggingObjects { originals, .. } => {
                for orig in originals {
                    self.scene.revert_object(orig);
                }
                self.scene.discard_commit_point();
                vec![Action::RenderNeeded]
            }
            InputState::Resizing { original, .. } => {
                self.scene.revert_object(original);
                self.scene.discard_commit_point();
                vec![Action::RenderNeeded]
            }
        };
        debug!("gesture cancelled");
        actions
    }

    // --- Keyboard / wheel ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if self.ui.editing_text.is_some() {
            // Keystrokes belong to the host's text editor; Escape blurs.
            return if key.is_escape() { self.end_text_edit() } else { Vec::new() };
        }
        if key.is_escape() {
            return self.cancel_gesture();
        }
        if key.is_undo(modifiers) {
            return self.undo();
        }
        if key.is_redo(modifiers) {
            return self.redo();
        }
        if key.is_delete() {
            return self.delete_selected();
        }
        Vec::new()
    }

    /// Command + wheel zooms one step around the pointer; plain wheel pans.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        let changed = if modifiers.command() {
            if delta.dy < 0.0 {
                self.camera.zoom_in(screen_pt)
            } else if delta.dy > 0.0 {
                self.camera.zoom_out(screen_pt)
            } else {
                false
            }
        } else {
            self.camera.pan_by(-delta.dx, -delta.dy);
            delta.dx != 0.0 || delta.dy != 0.0
        };
        if changed { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Edits ---

    /// Remove the selected objects and commit.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let ids = std::mem::take(&mut self.ui.selected);
        if ids.is_empty() {
            return Vec::new();
        }
        let mut actions = vec![Action::SelectionChanged(Vec::new())];
        actions.extend(self.remove_objects(&ids));
        actions
    }

    /// Remove objects by id and commit. Missing ids are ignored.
    pub fn remove_objects(&mut self, ids: &[ObjectId]) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.end_text_edit());
        let removed = self.scene.remove_objects(ids);
        if removed.is_empty() {
            return actions;
        }
        self.prune_selection(&mut actions);
        actions.push(Action::RenderNeeded);
        actions.extend(self.finish_action());
        actions
    }

    /// Apply a property patch to one object and commit if anything changed.
    pub fn update_object(&mut self, id: &ObjectId, patch: &ObjectPatch) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.end_text_edit());
        if self.scene.update_object(id, patch) {
            actions.push(Action::RenderNeeded);
            actions.extend(self.finish_action());
        }
        actions
    }

    pub fn set_background(&mut self, color: &str) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.end_text_edit());
        if !self.scene.set_background(color) {
            return actions;
        }
        actions.push(Action::RenderNeeded);
        actions.extend(self.finish_action());
        actions
    }

    /// Remove everything and reset the background, as one commit.
    pub fn clear(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.end_text_edit());
        if !self.scene.clear() {
            return actions;
        }
        self.prune_selection(&mut actions);
        actions.push(Action::RenderNeeded);
        actions.extend(self.finish_action());
        actions
    }

    // --- History ---

    pub fn undo(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.end_text_edit());
        if let Some(snapshot) = self.history.undo() {
            self.apply_snapshot(snapshot, &mut actions);
        }
        actions
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        actions.extend(self.end_text_edit());
        if let Some(snapshot) = self.history.redo() {
            self.apply_snapshot(snapshot, &mut actions);
        }
        actions
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot, actions: &mut Vec<Action>) {
        self.scene.restore(&snapshot);
        self.prune_selection(actions);
        actions.push(Action::RenderNeeded);
        actions.push(Action::Restored { index: self.history.index(), snapshot });
    }

    /// Close out a discrete user action: if the scene raised a commit point,
    /// snapshot it onto the history.
    fn finish_action(&mut self) -> Vec<Action> {
        if !self.scene.take_commit_point() {
            return Vec::new();
        }
        let snapshot = self.history.commit(self.scene.serialize());
        let index = self.history.index();
        debug!(index, objects = snapshot.objects.len(), "history commit");
        vec![Action::Committed { index, snapshot }]
    }

    /// Commit a drag or resize, unless every object ended up exactly where it
    /// started. In that case the originals go back untouched, unknown record
    /// fields included.
    fn finish_transform(&mut self, originals: Vec<DrawableObject>) -> Vec<Action> {
        let unchanged = originals.iter().all(|orig| {
            self.scene.get(&orig.id).is_some_and(|live| live.header == orig.header && live.shape == orig.shape)
        });
        if !unchanged {
            return self.finish_action();
        }
        for orig in originals {
            self.scene.revert_object(orig);
        }
        self.scene.discard_commit_point();
        Vec::new()
    }

    fn prune_selection(&mut self, actions: &mut Vec<Action>) {
        let before = self.ui.selected.len();
        let scene = &self.scene;
        self.ui.selected.retain(|id| scene.contains(id));
        if self.ui.selected.len() != before {
            actions.push(Action::SelectionChanged(self.ui.selected.clone()));
        }
        if self.ui.editing_text.is_some_and(|id| !scene.contains(&id)) {
            self.ui.editing_text = None;
        }
    }
}
