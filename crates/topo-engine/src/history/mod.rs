//! Undo/redo stacks of graph snapshots.
//!
//! Only a forward edit ([`History::record`]) clears the redo stack. Undo and
//! redo move snapshots between the two stacks and never discard either one.

use crate::types::GraphSnapshot;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct History {
    past: VecDeque<GraphSnapshot>,
    future: Vec<GraphSnapshot>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History whose past stack keeps at most `limit` snapshots.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record the pre-mutation state of a forward edit and drop the redo branch.
    pub fn record(&mut self, before: GraphSnapshot) {
        self.push_past(before);
        self.future.clear();
    }

    /// Step back. `current` moves onto the redo stack.
    pub fn undo(&mut self, current: GraphSnapshot) -> Option<GraphSnapshot> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Step forward. `current` moves back onto the undo stack.
    pub fn redo(&mut self, current: GraphSnapshot) -> Option<GraphSnapshot> {
        let next = self.future.pop()?;
        self.push_past(current);
        Some(next)
    }

    fn push_past(&mut self, snapshot: GraphSnapshot) {
        self.past.push_back(snapshot);
        if let Some(limit) = self.limit {
            while self.past.len() > limit {
                self.past.pop_front();
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
