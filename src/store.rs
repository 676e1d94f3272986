//! Project store: where boards live between sessions.
//!
//! The editor addresses projects by id only and never sees more than one at
//! a time. `ProjectStore` is the seam; `MemoryStore` backs tests and
//! embedders that persist elsewhere, `JsonFileStore` keeps every project in
//! a single JSON array file (the layout the dashboard reads).
//!
//! ERROR HANDLING
//! ==============
//! Store failures are returned, never logged here; the persistence layer
//! decides whether they are fatal (load) or a retryable warning (save).

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};

use crate::error::ErrorCode;

/// Opaque project identifier assigned by the dashboard.
pub type ProjectId = String;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("project store data is malformed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("project store rejected the write: {0}")]
    Rejected(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_STORE_IO",
            Self::Serialize(_) => "E_STORE_SERIALIZE",
            Self::Rejected(_) => "E_STORE_REJECTED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Rejected(_))
    }
}

// =============================================================================
// PROJECT RECORD
// =============================================================================

/// Where a project came from on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    #[default]
    Board,
    Import,
}

/// A stored project. Dashboard-only fields (stars, thumbnails, ...) are kept
/// in `extra` so a save from the editor never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ProjectKind,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<OffsetDateTime>,
    /// Serialized scene document. Either an embedded JSON object or a JSON
    /// string holding one; absent for a board that was never saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// A new, empty board stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: id.into(),
            name: name.into(),
            kind: ProjectKind::Board,
            created_at: Some(now),
            updated_at: Some(now),
            canvas_data: None,
            extra: Map::new(),
        }
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Key-value access to projects by id.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// Fetch a project.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing storage cannot be read. A
    /// missing project is `Ok(None)`.
    async fn get(&self, id: &str) -> Result<Option<Project>, StoreError>;

    /// Insert or replace a project by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write does not land.
    async fn put(&self, project: Project) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<ProjectId, Project>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `projects`.
    #[must_use]
    pub fn with_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let map = projects.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self { projects: RwLock::new(map) }
    }

    pub async fn len(&self) -> usize {
        self.projects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.projects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ProjectStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.read().await.get(id).cloned())
    }

    async fn put(&self, project: Project) -> Result<(), StoreError> {
        self.projects.write().await.insert(project.id.clone(), project);
        Ok(())
    }
}

// =============================================================================
// JSON FILE STORE
// =============================================================================

/// Every project in one JSON array file.
///
/// Writes are read-modify-write under a mutex and land via a temp file plus
/// rename, so a crash mid-write leaves the previous file intact. Projects
/// keep their position in the array when replaced.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every project. A missing or empty file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the file cannot be read or parsed.
    pub async fn list(&self) -> Result<Vec<Project>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn read_all(&self) -> Result<Vec<Project>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn write_all(&self, projects: &[Project]) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(projects)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectStore for JsonFileStore {
    async fn get(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_iter().find(|p| p.id == id))
    }

    async fn put(&self, project: Project) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut projects = self.read_all().await?;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = project,
            None => projects.push(project),
        }
        self.write_all(&projects).await
    }
}
