//! Layer 10: Undo/redo history
//!
//! Two stacks of `{action, before, after}` triples. Entries hold full
//! snapshots rather than inverse deltas; snapshots share untouched entity
//! payloads through `Arc`, so a session's history costs memory in
//! proportion to what changed, not to archive size.
//!
//! INVARIANT: any new push clears the redo stack - once a fresh write
//! lands, the abandoned forward timeline is unreachable.

use std::collections::VecDeque;

use super::action::Action;
use super::state::VaultState;

/// One applied action with the snapshots on either side of it. The same
/// shape the provenance collaborator observes.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub action: Action,
    pub before: VaultState,
    pub after: VaultState,
}

/// Bounded undo stack plus redo stack.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    capacity: usize,
}

impl History {
    /// `capacity` bounds the undo depth; the oldest entry is evicted once
    /// it fills. Zero retains nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Record an applied action. Unconditionally invalidates redo.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.redo.clear();
        if self.capacity == 0 {
            return;
        }
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(entry);
    }

    /// Step back: returns the snapshot to restore, `None` when empty.
    pub fn undo(&mut self) -> Option<VaultState> {
        let entry = self.undo.pop_back()?;
        let before = entry.before.clone();
        self.redo.push(entry);
        Some(before)
    }

    /// Step forward again: returns the snapshot to restore, `None` when
    /// empty.
    pub fn redo(&mut self) -> Option<VaultState> {
        let entry = self.redo.pop()?;
        let after = entry.after.clone();
        self.undo.push_back(entry);
        Some(after)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Undo entries, oldest first. For observers (audit/provenance), not
    /// for replay.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo.iter()
    }
}
