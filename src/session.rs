//! One open editing session.
//!
//! `EditorSession` ties a loaded project to its engine and save worker:
//! every action that changes the committed scene (a commit, an undo, a redo)
//! is forwarded to the worker, which persists it after the debounce window.
//! Closing the session cancels any in-flight gesture, ends text editing and
//! performs the final flush.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::EditorConfig;
use crate::doc::Scene;
use crate::engine::{Action, EngineCore};
use crate::error::ErrorCode;
use crate::persistence::{self, CorruptSnapshot, PersistError, SaveHandle, SaveStatus};
use crate::render::{self, ExportError, ExportOptions};
use crate::store::{Project, ProjectStore};

#[derive(Debug)]
pub struct EditorSession {
    project: Project,
    engine: EngineCore,
    saver: SaveHandle,
    export: ExportOptions,
    diagnostic: Option<CorruptSnapshot>,
}

impl EditorSession {
    /// Load `project_id` and start editing it. A corrupt stored scene opens
    /// blank; check [`EditorSession::diagnostic`].
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::NotFound`] if the project does not exist, or
    /// [`PersistError::Store`] if the store cannot be read.
    pub async fn open(
        store: Arc<dyn ProjectStore>,
        project_id: &str,
        config: &EditorConfig,
    ) -> Result<Self, PersistError> {
        let loaded = persistence::load(store.as_ref(), project_id).await?;

        let mut engine = EngineCore::with_scene(Scene::from_doc(&loaded.doc), config.history_limit);
        engine.set_viewport(config.viewport_width, config.viewport_height);
        let saver = persistence::spawn_save_worker(store, project_id.to_owned(), config.save_debounce());

        info!(
            project_id,
            objects = loaded.doc.objects.len(),
            corrupt = loaded.diagnostic.is_some(),
            "editing session opened"
        );
        Ok(Self {
            project: loaded.project,
            engine,
            saver,
            export: ExportOptions::from_config(config),
            diagnostic: loaded.diagnostic,
        })
    }

    /// The project record as it was when the session opened. Saves go to the
    /// store and do not refresh this copy, so its `canvas_data` and
    /// `updated_at` are load-time values; re-read the store for current ones.
    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project.id
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    /// The corruption diagnostic from load, if the stored scene was unreadable.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&CorruptSnapshot> {
        self.diagnostic.as_ref()
    }

    /// Run an engine operation and forward any committed state to the save
    /// worker.
    ///
    /// ```ignore
    /// session.apply(|e| e.set_mode(Mode::ShapeInsert(ShapeKind::Rectangle)));
    /// ```
    pub fn apply<F>(&mut self, op: F) -> Vec<Action>
    where
        F: FnOnce(&mut EngineCore) -> Vec<Action>,
    {
        let actions = op(&mut self.engine);
        self.forward(&actions);
        actions
    }

    fn forward(&self, actions: &[Action]) {
        for snapshot in actions.iter().filter_map(Action::persisted_snapshot) {
            if let Err(e) = self.saver.commit(Arc::clone(snapshot)) {
                warn!(project_id = %self.project.id, error = %e, code = e.error_code(), "commit not queued for saving");
            }
        }
    }

    #[must_use]
    pub fn save_status(&self) -> SaveStatus {
        self.saver.status()
    }

    #[must_use]
    pub fn subscribe_save_status(&self) -> watch::Receiver<SaveStatus> {
        self.saver.subscribe()
    }

    /// Persist the latest commit now.
    ///
    /// # Errors
    ///
    /// Returns the write error; the snapshot stays queued for retry.
    pub async fn flush(&self) -> Result<(), PersistError> {
        self.saver.flush().await
    }

    /// Rasterize the current scene.
    ///
    /// # Errors
    ///
    /// See [`render::export_png`].
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        render::export_png(self.engine.scene(), &self.export)
    }

    #[must_use]
    pub fn export_filename(&self) -> String {
        render::export_filename(&self.project.id)
    }

    /// Tear down: discard any gesture, commit an open text edit, then flush.
    ///
    /// # Errors
    ///
    /// Returns the final write's error. The session is gone either way.
    pub async fn close(mut self) -> Result<(), PersistError> {
        let mut actions = self.engine.cancel_gesture();
        actions.extend(self.engine.end_text_edit());
        self.forward(&actions);

        let result = self.saver.close().await;
        match &result {
            Ok(()) => info!(project_id = %self.project.id, "editing session closed"),
            Err(e) => warn!(project_id = %self.project.id, error = %e, "editing session closed with unsaved changes"),
        }
        result
    }
}
