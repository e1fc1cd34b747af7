//! Normative safety limits.
//!
//! Values are intentionally explicit about their units.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Undo entries retained before the oldest is evicted.
    pub max_history_depth: usize,
    /// Actions allowed inside one BATCH_UPDATE.
    pub max_batch_actions: usize,
    /// Nesting depth accepted from a source tree.
    pub max_tree_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_history_depth: 100,
            max_batch_actions: 1_000,
            max_tree_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Limits;

    #[test]
    fn defaults_are_positive() {
        let limits = Limits::default();
        assert!(limits.max_history_depth > 0);
        assert!(limits.max_batch_actions > 0);
        assert!(limits.max_tree_depth > 0);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"max_history_depth": 5}"#).unwrap();
        assert_eq!(limits.max_history_depth, 5);
        assert_eq!(limits.max_batch_actions, Limits::default().max_batch_actions);
    }
}
