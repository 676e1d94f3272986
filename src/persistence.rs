//! Persistence adapter: scene <-> project store.
//!
//! DESIGN
//! ======
//! `load` and `save` are one-shot conversions between a [`SceneDoc`] and a
//! project's `canvasData`. The editing session does not call `save`
//! directly; it hands every committed snapshot to a [`SaveHandle`], whose
//! worker task debounces bursts into a single write and performs writes one
//! at a time. Sequencing writes on one task is what makes the last commit
//! win: a stale snapshot can never land after a newer one.
//!
//! ERROR HANDLING
//! ==============
//! A missing project is the only load failure. A stored document that does
//! not parse or validate loads as an empty scene plus a [`CorruptSnapshot`]
//! diagnostic. Failed writes keep the unsaved snapshot in the worker and
//! surface through [`SaveStatus::Failed`]; the next commit or flush retries.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::doc::{DocError, SceneDoc};
use crate::error::ErrorCode;
use crate::history::Snapshot;
use crate::store::{Project, ProjectId, ProjectStore, StoreError};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("project not found: {0}")]
    NotFound(ProjectId),
    #[error("project write failed: {0}")]
    Store(#[from] StoreError),
    #[error("save worker is not running")]
    WorkerClosed,
}

impl ErrorCode for PersistError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Store(_) => "E_WRITE_FAILURE",
            Self::WorkerClosed => "E_WORKER_CLOSED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// A stored scene that could not be read. Loading continues with an empty
/// scene; the host decides how to tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptSnapshot {
    pub project_id: ProjectId,
    pub reason: String,
}

impl CorruptSnapshot {
    /// Grepable diagnostic code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        "E_CORRUPT_STATE"
    }
}

// =============================================================================
// LOAD / SAVE
// =============================================================================

/// Result of opening a project.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub project: Project,
    pub doc: SceneDoc,
    pub diagnostic: Option<CorruptSnapshot>,
}

/// Fetch a project and decode its stored scene.
///
/// # Errors
///
/// Returns [`PersistError::NotFound`] if the store has no such project, or
/// [`PersistError::Store`] if the store cannot be read.
pub async fn load(store: &dyn ProjectStore, project_id: &str) -> Result<Loaded, PersistError> {
    let project = store.get(project_id).await?.ok_or_else(|| PersistError::NotFound(project_id.to_owned()))?;

    let (doc, diagnostic) = match project.canvas_data.as_ref().map(decode_canvas) {
        None | Some(Ok(None)) => (SceneDoc::default(), None),
        Some(Ok(Some(doc))) => (doc, None),
        Some(Err(e)) => {
            warn!(project_id, error = %e, code = e.error_code(), "stored scene is corrupt; opening blank");
            let diagnostic = CorruptSnapshot { project_id: project_id.to_owned(), reason: e.to_string() };
            (SceneDoc::default(), Some(diagnostic))
        }
    };
    Ok(Loaded { project, doc, diagnostic })
}

/// Decode `canvasData`, accepting an embedded object or a JSON string.
/// `null` and the empty string mean "never saved".
fn decode_canvas(raw: &Value) -> Result<Option<SceneDoc>, DocError> {
    match raw {
        Value::Null => Ok(None),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => SceneDoc::from_json(text).map(Some),
        other => SceneDoc::from_value(other.clone()).map(Some),
    }
}

/// Write `doc` as the project's scene and bump its modification time.
///
/// # Errors
///
/// Returns [`PersistError::NotFound`] if the project was deleted out from
/// under the session, or [`PersistError::Store`] if the write fails.
pub async fn save(store: &dyn ProjectStore, project_id: &str, doc: &SceneDoc) -> Result<(), PersistError> {
    let mut project = store.get(project_id).await?.ok_or_else(|| PersistError::NotFound(project_id.to_owned()))?;
    project.canvas_data = Some(doc.to_value().map_err(StoreError::from)?);
    project.updated_at = Some(OffsetDateTime::now_utc());
    store.put(project).await?;
    Ok(())
}

// =============================================================================
// DEBOUNCED SAVE WORKER
// =============================================================================

/// Save state observed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// Nothing committed since the session opened.
    #[default]
    Idle,
    /// A commit is waiting for the debounce window to close.
    Pending,
    /// Commit number `seq` is in the store.
    Saved { seq: u64 },
    /// Writing commit `seq` failed; it will be retried.
    Failed { seq: u64, code: &'static str, message: String },
}

impl SaveStatus {
    /// Whether the host should show an unsaved-changes warning.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

enum SaveCommand {
    Commit(Snapshot),
    Flush(oneshot::Sender<Result<(), PersistError>>),
}

/// Handle to a project's save worker.
#[derive(Debug)]
pub struct SaveHandle {
    tx: mpsc::UnboundedSender<SaveCommand>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

/// Spawn the save worker for one project. Must be called inside a tokio
/// runtime.
#[must_use]
pub fn spawn_save_worker(store: Arc<dyn ProjectStore>, project_id: ProjectId, debounce: Duration) -> SaveHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let (status_tx, status) = watch::channel(SaveStatus::Idle);
    info!(%project_id, debounce_ms = debounce.as_millis() as u64, "save worker started");

    let worker = SaveWorker { store, project_id, status: status_tx, pending: None, received: 0 };
    let task = tokio::spawn(worker.run(rx, debounce));
    SaveHandle { tx, status, task }
}

impl SaveHandle {
    /// Queue a committed snapshot. Returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::WorkerClosed`] if the worker has exited.
    pub fn commit(&self, snapshot: Snapshot) -> Result<(), PersistError> {
        self.tx.send(SaveCommand::Commit(snapshot)).map_err(|_| PersistError::WorkerClosed)
    }

    /// Write any unsaved snapshot now, bypassing the debounce.
    ///
    /// # Errors
    ///
    /// Returns the write error, or [`PersistError::WorkerClosed`] if the
    /// worker has exited.
    pub async fn flush(&self) -> Result<(), PersistError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(SaveCommand::Flush(reply_tx)).map_err(|_| PersistError::WorkerClosed)?;
        reply_rx.await.map_err(|_| PersistError::WorkerClosed)?
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Watch save status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Final flush, then stop the worker.
    ///
    /// # Errors
    ///
    /// Returns the final write's error, if any.
    pub async fn close(self) -> Result<(), PersistError> {
        let result = self.flush().await;
        let Self { tx, task, .. } = self;
        drop(tx);
        if let Err(e) = task.await {
            warn!(error = %e, "save worker did not shut down cleanly");
        }
        result
    }
}

struct SaveWorker {
    store: Arc<dyn ProjectStore>,
    project_id: ProjectId,
    status: watch::Sender<SaveStatus>,
    /// Latest snapshot not yet in the store, with its commit number.
    pending: Option<(u64, Snapshot)>,
    received: u64,
}

impl SaveWorker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SaveCommand>, debounce: Duration) {
        let mut deadline: Option<Instant> = None;

        loop {
            let quiet = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(SaveCommand::Commit(snapshot)) => {
                        self.received += 1;
                        self.pending = Some((self.received, snapshot));
                        self.status.send_replace(SaveStatus::Pending);
                        deadline = Some(Instant::now() + debounce);
                    }
                    Some(SaveCommand::Flush(reply)) => {
                        deadline = None;
                        let result = self.write_pending().await;
                        if reply.send(result).is_err() {
                            debug!(project_id = %self.project_id, "flush requester went away");
                        }
                    }
                    None => {
                        if self.write_pending().await.is_err() {
                            warn!(project_id = %self.project_id, "unsaved changes lost at shutdown");
                        }
                        break;
                    }
                },
                () = quiet => {
                    deadline = None;
                    if let Err(e) = self.write_pending().await {
                        debug!(project_id = %self.project_id, error = %e, "debounced save will retry on next commit");
                    }
                }
            }
        }
        debug!(project_id = %self.project_id, "save worker stopped");
    }

    async fn write_pending(&mut self) -> Result<(), PersistError> {
        let Some((seq, snapshot)) = self.pending.take() else {
            return Ok(());
        };

        match save(self.store.as_ref(), &self.project_id, &snapshot).await {
            Ok(()) => {
                debug!(project_id = %self.project_id, seq, objects = snapshot.objects.len(), "scene saved");
                self.status.send_replace(SaveStatus::Saved { seq });
                Ok(())
            }
            Err(e) => {
                warn!(project_id = %self.project_id, seq, error = %e, code = e.error_code(), "scene save failed");
                self.status.send_replace(SaveStatus::Failed { seq, code: e.error_code(), message: e.to_string() });
                self.pending = Some((seq, snapshot));
                Err(e)
            }
        }
    }
}
