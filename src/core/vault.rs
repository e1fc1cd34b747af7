//! Layer 11: The vault session
//!
//! One `Vault` per open archive: current snapshot + history + limits,
//! passed explicitly to whoever needs it (no process-global store, so
//! independent archives and test fixtures coexist).
//!
//! Writers go through `apply`/`undo`/`redo` on a single logical thread;
//! readers may hold `state()` snapshots for as long as they like - a
//! write replaces the current snapshot, it never edits one.

use serde_json::Value;

use super::action::{dispatch, Action, SkippedChange};
use super::error::{ActionError, CoreError};
use super::history::{History, HistoryEntry};
use super::limits::Limits;
use super::normalize::{denormalize, normalize_with_limits};
use super::state::VaultState;

/// An open archive session.
#[derive(Debug, Clone)]
pub struct Vault {
    state: VaultState,
    history: History,
    limits: Limits,
}

impl Vault {
    /// A blank archive with default limits.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            state: VaultState::empty(),
            history: History::new(limits.max_history_depth),
            limits,
        }
    }

    /// Import a nested tree (default limits).
    pub fn from_tree(tree: &Value) -> Result<Self, CoreError> {
        Self::from_tree_with_limits(tree, Limits::default())
    }

    pub fn from_tree_with_limits(tree: &Value, limits: Limits) -> Result<Self, CoreError> {
        let state = normalize_with_limits(tree, &limits)?;
        Ok(Self {
            state,
            history: History::new(limits.max_history_depth),
            limits,
        })
    }

    /// The current snapshot. Cheap to clone and safe to hold across
    /// subsequent writes.
    pub fn state(&self) -> &VaultState {
        &self.state
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// History triples, for the provenance observer.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Validate, dispatch, and record an action. Returns the changes that
    /// were skipped (empty when everything landed). Validation failures
    /// leave state and history untouched.
    pub fn apply(&mut self, action: Action) -> Result<Vec<SkippedChange>, ActionError> {
        action.validate(&self.limits)?;
        let result = dispatch(&self.state, &action);
        if result.changed_anything() {
            self.history.push(HistoryEntry {
                action,
                before: self.state.clone(),
                after: result.state.clone(),
            });
            self.state = result.state;
        }
        Ok(result.skipped)
    }

    /// Step back one action. False when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Step forward one undone action. False when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Export the current snapshot as a nested tree.
    pub fn export(&self) -> Value {
        denormalize(&self.state)
    }
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}
