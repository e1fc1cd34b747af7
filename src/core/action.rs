//! Layer 9: Actions and dispatch
//!
//! `Action` is the closed set of edits the feature layer can request.
//! Validation is two-phase on purpose: `validate` checks only the action's
//! own shape (so a client can validate offline, before the target state is
//! known); whether the target ids exist is decided at dispatch time, where
//! a miss degrades to a logged skip instead of failing the whole call.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::descriptive::{LanguageMap, MetadataEntry};
use super::domain::{ResourceType, ViewingDirection};
use super::error::ActionError;
use super::identity::ResourceId;
use super::limits::Limits;
use super::mutate::{self, Mutated, MutationOutcome, SkipReason};
use super::resource::{Canvas, Resource, ResourcePatch};
use super::state::VaultState;

/// A domain edit. Wire tags are stable and SCREAMING_SNAKE_CASE.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    UpdateLabel {
        id: ResourceId,
        label: LanguageMap,
    },
    UpdateSummary {
        id: ResourceId,
        summary: LanguageMap,
    },
    UpdateMetadata {
        id: ResourceId,
        metadata: Vec<MetadataEntry>,
    },
    /// `None` clears the rights statement.
    UpdateRights {
        id: ResourceId,
        rights: Option<String>,
    },
    /// `None` clears navDate.
    UpdateNavDate {
        id: ResourceId,
        nav_date: Option<String>,
    },
    UpdateBehavior {
        id: ResourceId,
        behavior: Vec<String>,
    },
    UpdateViewingDirection {
        id: ResourceId,
        viewing_direction: ViewingDirection,
    },
    AddCanvas {
        manifest_id: ResourceId,
        canvas: Canvas,
        index: Option<usize>,
    },
    RemoveCanvas {
        canvas_id: ResourceId,
    },
    ReorderCanvases {
        manifest_id: ResourceId,
        order: Vec<ResourceId>,
    },
    MoveItem {
        id: ResourceId,
        new_parent_id: ResourceId,
        index: Option<usize>,
    },
    BatchUpdate {
        actions: Vec<Action>,
    },
}

impl Action {
    /// The wire tag, for diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::UpdateLabel { .. } => "UPDATE_LABEL",
            Self::UpdateSummary { .. } => "UPDATE_SUMMARY",
            Self::UpdateMetadata { .. } => "UPDATE_METADATA",
            Self::UpdateRights { .. } => "UPDATE_RIGHTS",
            Self::UpdateNavDate { .. } => "UPDATE_NAV_DATE",
            Self::UpdateBehavior { .. } => "UPDATE_BEHAVIOR",
            Self::UpdateViewingDirection { .. } => "UPDATE_VIEWING_DIRECTION",
            Self::AddCanvas { .. } => "ADD_CANVAS",
            Self::RemoveCanvas { .. } => "REMOVE_CANVAS",
            Self::ReorderCanvases { .. } => "REORDER_CANVASES",
            Self::MoveItem { .. } => "MOVE_ITEM",
            Self::BatchUpdate { .. } => "BATCH_UPDATE",
        }
    }

    /// Shape-only validation. Ids are already structurally valid by
    /// construction (`ResourceId` rejects malformed strings at the serde
    /// boundary); this checks everything else the action carries. Never
    /// consults a `VaultState`.
    pub fn validate(&self, limits: &Limits) -> Result<(), ActionError> {
        match self {
            Self::UpdateNavDate {
                nav_date: Some(raw),
                ..
            } => {
                if OffsetDateTime::parse(raw, &Rfc3339).is_err() {
                    return Err(ActionError::BadNavDate {
                        action: self.tag(),
                        raw: raw.clone(),
                    });
                }
                Ok(())
            }
            Self::AddCanvas { canvas, .. } => {
                if canvas.width == Some(0) {
                    return Err(ActionError::NonPositiveDimension {
                        action: self.tag(),
                        field: "width",
                    });
                }
                if canvas.height == Some(0) {
                    return Err(ActionError::NonPositiveDimension {
                        action: self.tag(),
                        field: "height",
                    });
                }
                if let Some(duration) = canvas.duration.as_ref().and_then(|d| d.as_f64()) {
                    if duration <= 0.0 {
                        return Err(ActionError::NonPositiveDimension {
                            action: self.tag(),
                            field: "duration",
                        });
                    }
                }
                Ok(())
            }
            Self::ReorderCanvases { order, .. } => {
                if order.is_empty() {
                    return Err(ActionError::EmptyOrder { action: self.tag() });
                }
                Ok(())
            }
            Self::BatchUpdate { actions } => {
                if actions.len() > limits.max_batch_actions {
                    return Err(ActionError::BatchTooLarge {
                        len: actions.len(),
                        max: limits.max_batch_actions,
                    });
                }
                for action in actions {
                    if matches!(action, Self::BatchUpdate { .. }) {
                        return Err(ActionError::NestedBatch);
                    }
                    action.validate(limits)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// One change a dispatch declined, with enough context to report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedChange {
    pub action: &'static str,
    pub reason: SkipReason,
}

/// Result of a dispatch: the next snapshot, how many primitive changes
/// landed, and every change that was skipped along the way.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub state: VaultState,
    pub applied: usize,
    pub skipped: Vec<SkippedChange>,
}

impl Dispatched {
    pub fn fully_applied(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn changed_anything(&self) -> bool {
        self.applied > 0
    }
}

/// Apply an action to a snapshot. Never fails: unknown targets and other
/// data-state problems come back in `skipped` while the rest of the action
/// (for batches, the other members) still applies.
pub fn dispatch(state: &VaultState, action: &Action) -> Dispatched {
    match action {
        Action::UpdateLabel { id, label } => single(
            action,
            mutate::update_resource(
                state,
                id,
                &ResourcePatch {
                    label: Some(label.clone()),
                    ..Default::default()
                },
            ),
        ),
        Action::UpdateSummary { id, summary } => single(
            action,
            mutate::update_resource(
                state,
                id,
                &ResourcePatch {
                    summary: Some(summary.clone()),
                    ..Default::default()
                },
            ),
        ),
        Action::UpdateMetadata { id, metadata } => single(
            action,
            mutate::update_resource(
                state,
                id,
                &ResourcePatch {
                    metadata: Some(metadata.clone()),
                    ..Default::default()
                },
            ),
        ),
        Action::UpdateRights { id, rights } => single(
            action,
            mutate::update_resource_with(state, id, |resource| {
                resource.try_set_rights(rights.clone());
            }),
        ),
        Action::UpdateNavDate { id, nav_date } => single(
            action,
            mutate::update_resource_with(state, id, |resource| {
                resource.try_set_nav_date(nav_date.clone());
            }),
        ),
        Action::UpdateBehavior { id, behavior } => single(
            action,
            mutate::update_resource(
                state,
                id,
                &ResourcePatch {
                    behavior: Some(behavior.clone()),
                    ..Default::default()
                },
            ),
        ),
        Action::UpdateViewingDirection {
            id,
            viewing_direction,
        } => single(
            action,
            mutate::update_resource(
                state,
                id,
                &ResourcePatch {
                    viewing_direction: Some(*viewing_direction),
                    ..Default::default()
                },
            ),
        ),
        Action::AddCanvas {
            manifest_id,
            canvas,
            index,
        } => single(
            action,
            mutate::add_resource(
                state,
                Resource::Canvas(canvas.clone()),
                Some(manifest_id),
                *index,
            ),
        ),
        Action::RemoveCanvas { canvas_id } => {
            let result = match state.kind_of(canvas_id) {
                Some(ResourceType::Canvas) => mutate::remove_resource(state, canvas_id),
                Some(actual) => {
                    return Dispatched {
                        state: state.clone(),
                        applied: 0,
                        skipped: vec![SkippedChange {
                            action: action.tag(),
                            reason: SkipReason::WrongKind {
                                id: canvas_id.clone(),
                                expected: ResourceType::Canvas,
                                actual,
                            },
                        }],
                    };
                }
                None => mutate::remove_resource(state, canvas_id),
            };
            single(action, result)
        }
        Action::ReorderCanvases { manifest_id, order } => {
            single(action, mutate::reorder_children(state, manifest_id, order))
        }
        Action::MoveItem {
            id,
            new_parent_id,
            index,
        } => single(action, mutate::move_item(state, id, new_parent_id, *index)),
        Action::BatchUpdate { actions } => {
            // One running state; each member folds into it. A member that
            // skips leaves the running state as it was.
            let mut running = state.clone();
            let mut applied = 0;
            let mut skipped = Vec::new();
            for member in actions {
                let result = dispatch(&running, member);
                running = result.state;
                applied += result.applied;
                skipped.extend(result.skipped);
            }
            Dispatched {
                state: running,
                applied,
                skipped,
            }
        }
    }
}

fn single(action: &Action, result: Mutated) -> Dispatched {
    match result.outcome {
        MutationOutcome::Applied => Dispatched {
            state: result.state,
            applied: 1,
            skipped: Vec::new(),
        },
        MutationOutcome::Skipped(reason) => Dispatched {
            state: result.state,
            applied: 0,
            skipped: vec![SkippedChange {
                action: action.tag(),
                reason,
            }],
        },
    }
}
