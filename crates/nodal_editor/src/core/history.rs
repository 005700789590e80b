//! Undo/Redo history over scene snapshots.
//!
//! Every entry is a full scene document plus the selection at the time it
//! was stored. Undo and redo move a step pointer; the editor state restores
//! the stamp under the pointer. Storing a new entry while the pointer is
//! not at the top discards everything above it.

use nodal_graph::SceneDoc;

use super::SelectionItem;

/// One recorded editor state.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryStamp {
    pub description: String,
    pub snapshot: SceneDoc,
    pub selection: Vec<SelectionItem>,
}

/// Bounded undo/redo stack.
#[derive(Clone, Debug)]
pub struct SceneHistory {
    stack: Vec<HistoryStamp>,
    /// Index of the stamp matching the live scene
    current: Option<usize>,
    /// Maximum history size
    limit: usize,
}

impl Default for SceneHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHistory {
    /// Default maximum history size.
    pub const DEFAULT_LIMIT: usize = 32;

    pub fn new() -> Self {
        Self::with_limit(Self::DEFAULT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            stack: Vec::new(),
            current: None,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Check if there is an earlier stamp to go back to.
    pub fn can_undo(&self) -> bool {
        matches!(self.current, Some(step) if step > 0)
    }

    /// Check if there is a later stamp to go forward to.
    pub fn can_redo(&self) -> bool {
        match self.current {
            Some(step) => step + 1 < self.stack.len(),
            None => false,
        }
    }

    /// Step the live scene corresponds to.
    pub fn current_step(&self) -> Option<usize> {
        self.current
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn stamp(&self, step: usize) -> Option<&HistoryStamp> {
        self.stack.get(step)
    }

    /// Descriptions in stack order, oldest first.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> + '_ {
        self.stack.iter().map(|s| s.description.as_str())
    }

    /// Get the description of the entry undo would revert.
    pub fn undo_description(&self) -> Option<&str> {
        if self.can_undo() {
            self.current.and_then(|step| self.stamp(step)).map(|s| s.description.as_str())
        } else {
            None
        }
    }

    /// Get the description of the entry redo would reapply.
    pub fn redo_description(&self) -> Option<&str> {
        if self.can_redo() {
            self.current.and_then(|step| self.stamp(step + 1)).map(|s| s.description.as_str())
        } else {
            None
        }
    }

    /// Record a stamp on top of the current step.
    pub fn push(&mut self, stamp: HistoryStamp) {
        // Drop the redo future
        match self.current {
            Some(step) => self.stack.truncate(step + 1),
            None => self.stack.clear(),
        }

        log::debug!("History: store '{}'", stamp.description);
        self.stack.push(stamp);

        // Trim if over limit
        while self.stack.len() > self.limit {
            self.stack.remove(0);
        }
        self.current = Some(self.stack.len() - 1);
    }

    /// Step the undo target would restore.
    pub fn undo_step(&self) -> Option<usize> {
        if self.can_undo() {
            self.current.map(|step| step - 1)
        } else {
            None
        }
    }

    /// Step the redo target would restore.
    pub fn redo_step(&self) -> Option<usize> {
        if self.can_redo() {
            self.current.map(|step| step + 1)
        } else {
            None
        }
    }

    /// Move the step pointer after the stamp at `step` was restored.
    pub(crate) fn set_current_step(&mut self, step: usize) {
        if step < self.stack.len() {
            self.current = Some(step);
        } else {
            log::warn!("History: step {} out of range ({} entries)", step, self.stack.len());
        }
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.current = None;
    }
}
