//! Linear undo/redo history over full-scene snapshots.
//!
//! DESIGN
//! ======
//! A flat stack of immutable snapshots plus a cursor. The stack always holds
//! at least the session's base snapshot, so `0 <= index < len` holds at all
//! times and the snapshot at `index` is the live scene's last committed
//! state. Committing after an undo truncates the redo branch; that is the
//! only branch-management rule. View changes and in-flight gestures never
//! land here.
//!
//! Snapshots are `Arc`-shared so the save worker can hold the same copy the
//! stack does without cloning the scene again.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::sync::Arc;

use tracing::debug;

use crate::doc::SceneDoc;

/// An immutable serialized copy of a scene taken at a commit point.
pub type Snapshot = Arc<SceneDoc>;

/// Snapshot stack with a current-position cursor.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    index: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(SceneDoc::default(), usize::MAX)
    }
}

impl History {
    /// Start a history whose only entry is `base`. `limit` caps the number of
    /// retained snapshots (minimum 1); the oldest are dropped first.
    #[must_use]
    pub fn new(base: SceneDoc, limit: usize) -> Self {
        Self { snapshots: vec![Arc::new(base)], index: 0, limit: limit.max(1) }
    }

    /// Discard everything and start over from `base`.
    pub fn reset(&mut self, base: SceneDoc) {
        self.snapshots = vec![Arc::new(base)];
        self.index = 0;
    }

    /// Record a commit. Any redo branch beyond the cursor is discarded first.
    /// Returns the shared snapshot now at the cursor.
    pub fn commit(&mut self, snapshot: SceneDoc) -> Snapshot {
        let discarded = self.snapshots.len() - 1 - self.index;
        if discarded > 0 {
            self.snapshots.truncate(self.index + 1);
            debug!(discarded, "history redo branch discarded");
        }

        let snapshot = Arc::new(snapshot);
        self.snapshots.push(Arc::clone(&snapshot));
        self.index = self.snapshots.len() - 1;

        if self.snapshots.len() > self.limit {
            let overflow = self.snapshots.len() - self.limit;
            self.snapshots.drain(..overflow);
            self.index -= overflow;
        }
        snapshot
    }

    /// Step back one commit. Returns the snapshot to apply, or `None` at the base.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(Arc::clone(&self.snapshots[self.index]))
    }

    /// Step forward one commit. Returns the snapshot to apply, or `None` at the tip.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(Arc::clone(&self.snapshots[self.index]))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of snapshots on the stack (never zero).
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot at the cursor: the last committed state.
    #[must_use]
    pub fn current(&self) -> Snapshot {
        Arc::clone(&self.snapshots[self.index])
    }
}
