//! Layer 8: Mutation primitives
//!
//! Every primitive is a pure function `(&VaultState, ...) -> Mutated`: the
//! input snapshot is never touched, the output carries a new snapshot plus
//! an outcome. Data-shape problems (stale ids, bad orders) degrade to
//! `Skipped` with the input state returned unchanged - a batch of edits
//! survives one bad member instead of halting. Only programmer errors
//! panic, via the debug-mode integrity assertion.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use super::domain::ResourceType;
use super::identity::ResourceId;
use super::resource::{Resource, ResourcePatch};
use super::state::{TrashedResource, VaultState};

/// Why a primitive declined to apply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
    #[error("`{id}` is not in the store")]
    NotFound { id: ResourceId },

    #[error("parent `{id}` is not in the store")]
    ParentNotFound { id: ResourceId },

    #[error("`{id}` is already in the store")]
    DuplicateId { id: ResourceId },

    #[error("{parent_kind} `{parent}` cannot hold {child_kind} `{child}`")]
    CannotContain {
        parent: ResourceId,
        parent_kind: ResourceType,
        child: ResourceId,
        child_kind: ResourceType,
    },

    #[error("new order for `{parent}` is not a permutation of its children")]
    NotAPermutation { parent: ResourceId },

    #[error("moving `{id}` under `{new_parent}` would create an ownership cycle")]
    WouldCycle {
        id: ResourceId,
        new_parent: ResourceId,
    },

    #[error("`{id}` is not a collection")]
    NotACollection { id: ResourceId },

    #[error("`{member}` is already a member of `{collection}`")]
    AlreadyMember {
        collection: ResourceId,
        member: ResourceId,
    },

    #[error("`{member}` is not a member of `{collection}`")]
    NotAMember {
        collection: ResourceId,
        member: ResourceId,
    },

    #[error("`{id}` is a {actual}, expected a {expected}")]
    WrongKind {
        id: ResourceId,
        expected: ResourceType,
        actual: ResourceType,
    },
}

/// What a primitive did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Skipped(SkipReason),
}

/// Result of a primitive: the next snapshot plus what happened. On a skip
/// the snapshot is the input, unchanged.
#[derive(Debug, Clone)]
pub struct Mutated {
    pub state: VaultState,
    pub outcome: MutationOutcome,
}

impl Mutated {
    fn applied(state: VaultState) -> Self {
        debug_assert!(state.verify_integrity().is_ok());
        Self {
            state,
            outcome: MutationOutcome::Applied,
        }
    }

    fn skipped(state: &VaultState, reason: SkipReason) -> Self {
        warn!(%reason, "mutation skipped");
        Self {
            state: state.clone(),
            outcome: MutationOutcome::Skipped(reason),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, MutationOutcome::Applied)
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.outcome {
            MutationOutcome::Applied => None,
            MutationOutcome::Skipped(reason) => Some(reason),
        }
    }
}

/// Insert a resource, optionally attaching it under a parent at `index`
/// (clamped to the child count; `None` appends).
pub fn add_resource(
    state: &VaultState,
    resource: Resource,
    parent: Option<&ResourceId>,
    index: Option<usize>,
) -> Mutated {
    let id = resource.id().clone();
    let kind = resource.kind();

    if state.contains(&id) {
        return Mutated::skipped(state, SkipReason::DuplicateId { id });
    }
    if let Some(parent_id) = parent {
        let Some(parent_kind) = state.kind_of(parent_id) else {
            return Mutated::skipped(
                state,
                SkipReason::ParentNotFound {
                    id: parent_id.clone(),
                },
            );
        };
        if !parent_kind.can_contain(kind) {
            return Mutated::skipped(
                state,
                SkipReason::CannotContain {
                    parent: parent_id.clone(),
                    parent_kind,
                    child: id,
                    child_kind: kind,
                },
            );
        }
    }

    let mut next = state.clone();
    next.buckets
        .bucket_mut(kind)
        .insert(id.clone(), Arc::new(resource));
    next.type_index.insert(id.clone(), kind);
    if let Some(parent_id) = parent {
        let children = next.references.entry(parent_id.clone()).or_default();
        let at = index.unwrap_or(children.len()).min(children.len());
        children.insert(at, id.clone());
        next.reverse_refs.insert(id.clone(), parent_id.clone());
    }
    if next.root_id.is_none() && parent.is_none() {
        next.root_id = Some(id);
    }
    Mutated::applied(next)
}

/// Remove a resource and every relationship entry that names it.
///
/// Deliberately non-cascading: children stay in the store as orphans (no
/// `reverse_refs` entry). Cascade policy belongs to the caller - the trash
/// collaborator snapshots `child_ids` first and decides there.
pub fn remove_resource(state: &VaultState, id: &ResourceId) -> Mutated {
    let Some(kind) = state.kind_of(id) else {
        return Mutated::skipped(state, SkipReason::NotFound { id: id.clone() });
    };

    let mut next = state.clone();
    next.buckets.bucket_mut(kind).remove(id);
    next.type_index.remove(id);

    // Detach from the owning parent; the parent's entry survives (possibly
    // empty) because its containment property existed in the source.
    if let Some(parent) = next.reverse_refs.remove(id) {
        if let Some(children) = next.references.get_mut(&parent) {
            children.retain(|c| c != id);
        }
    }

    // Orphan the children.
    if let Some(children) = next.references.remove(id) {
        for child in children {
            next.reverse_refs.remove(&child);
        }
    }

    // Clear both sides of the membership table.
    if let Some(collections) = next.member_of_collections.remove(id) {
        for collection in collections {
            if let Some(members) = next.collection_members.get_mut(&collection) {
                members.retain(|m| m != id);
                if members.is_empty() {
                    next.collection_members.remove(&collection);
                }
            }
        }
    }
    if kind == ResourceType::Collection {
        if let Some(members) = next.collection_members.remove(id) {
            for member in members {
                if let Some(collections) = next.member_of_collections.get_mut(&member) {
                    collections.retain(|c| c != id);
                    if collections.is_empty() {
                        next.member_of_collections.remove(&member);
                    }
                }
            }
        }
    }

    if next.root_id.as_ref() == Some(id) {
        next.root_id = None;
    }
    Mutated::applied(next)
}

/// Shallow-merge `patch` into the resource's fields. Unknown id skips;
/// fields the resource's kind does not carry are ignored.
pub fn update_resource(state: &VaultState, id: &ResourceId, patch: &ResourcePatch) -> Mutated {
    update_resource_with(state, id, |resource| patch.apply_to(resource))
}

/// Field-level edit under the same contract as `update_resource`. The
/// dispatcher uses this for edits a patch cannot express (clearing an
/// optional field).
pub(crate) fn update_resource_with(
    state: &VaultState,
    id: &ResourceId,
    edit: impl FnOnce(&mut Resource),
) -> Mutated {
    let Some(current) = state.get_arc(id) else {
        return Mutated::skipped(state, SkipReason::NotFound { id: id.clone() });
    };
    let mut resource = Resource::clone(current);
    edit(&mut resource);

    let mut next = state.clone();
    next.buckets
        .bucket_mut(resource.kind())
        .insert(id.clone(), Arc::new(resource));
    Mutated::applied(next)
}

/// Add a non-owning membership reference. Touches only the membership
/// side-table, never the ownership forest.
pub fn add_to_collection(
    state: &VaultState,
    collection: &ResourceId,
    member: &ResourceId,
) -> Mutated {
    match state.kind_of(collection) {
        None => {
            return Mutated::skipped(
                state,
                SkipReason::NotFound {
                    id: collection.clone(),
                },
            );
        }
        Some(ResourceType::Collection) => {}
        Some(_) => {
            return Mutated::skipped(
                state,
                SkipReason::NotACollection {
                    id: collection.clone(),
                },
            );
        }
    }
    let Some(member_kind) = state.kind_of(member) else {
        return Mutated::skipped(
            state,
            SkipReason::NotFound {
                id: member.clone(),
            },
        );
    };
    if !matches!(
        member_kind,
        ResourceType::Manifest | ResourceType::Collection
    ) {
        return Mutated::skipped(
            state,
            SkipReason::CannotContain {
                parent: collection.clone(),
                parent_kind: ResourceType::Collection,
                child: member.clone(),
                child_kind: member_kind,
            },
        );
    }
    if state
        .collection_members
        .get(collection)
        .is_some_and(|m| m.contains(member))
    {
        return Mutated::skipped(
            state,
            SkipReason::AlreadyMember {
                collection: collection.clone(),
                member: member.clone(),
            },
        );
    }

    let mut next = state.clone();
    next.collection_members
        .entry(collection.clone())
        .or_default()
        .push(member.clone());
    next.member_of_collections
        .entry(member.clone())
        .or_default()
        .push(collection.clone());
    Mutated::applied(next)
}

/// Remove a membership reference, cleaning both sides exactly.
pub fn remove_from_collection(
    state: &VaultState,
    collection: &ResourceId,
    member: &ResourceId,
) -> Mutated {
    if !state
        .collection_members
        .get(collection)
        .is_some_and(|m| m.contains(member))
    {
        return Mutated::skipped(
            state,
            SkipReason::NotAMember {
                collection: collection.clone(),
                member: member.clone(),
            },
        );
    }

    let mut next = state.clone();
    if let Some(members) = next.collection_members.get_mut(collection) {
        members.retain(|m| m != member);
        if members.is_empty() {
            next.collection_members.remove(collection);
        }
    }
    if let Some(collections) = next.member_of_collections.get_mut(member) {
        collections.retain(|c| c != collection);
        if collections.is_empty() {
            next.member_of_collections.remove(member);
        }
    }
    Mutated::applied(next)
}

/// Replace a parent's child order with `new_order`, which must be a
/// permutation (same multiset) of the current children.
pub fn reorder_children(
    state: &VaultState,
    parent: &ResourceId,
    new_order: &[ResourceId],
) -> Mutated {
    let Some(current) = state.references.get(parent) else {
        return Mutated::skipped(
            state,
            SkipReason::NotFound {
                id: parent.clone(),
            },
        );
    };

    let mut a = current.clone();
    let mut b = new_order.to_vec();
    a.sort();
    b.sort();
    if a != b {
        return Mutated::skipped(
            state,
            SkipReason::NotAPermutation {
                parent: parent.clone(),
            },
        );
    }

    let mut next = state.clone();
    next.references.insert(parent.clone(), new_order.to_vec());
    Mutated::applied(next)
}

/// Detach `id` from its current parent (if any) and attach it under
/// `new_parent` at `index` (clamped; `None` appends).
pub fn move_item(
    state: &VaultState,
    id: &ResourceId,
    new_parent: &ResourceId,
    index: Option<usize>,
) -> Mutated {
    let Some(kind) = state.kind_of(id) else {
        return Mutated::skipped(state, SkipReason::NotFound { id: id.clone() });
    };
    let Some(parent_kind) = state.kind_of(new_parent) else {
        return Mutated::skipped(
            state,
            SkipReason::ParentNotFound {
                id: new_parent.clone(),
            },
        );
    };
    if !parent_kind.can_contain(kind) {
        return Mutated::skipped(
            state,
            SkipReason::CannotContain {
                parent: new_parent.clone(),
                parent_kind,
                child: id.clone(),
                child_kind: kind,
            },
        );
    }
    // Attaching under yourself or your own descendant would close a loop.
    if id == new_parent || is_ancestor_of(state, id, new_parent) {
        return Mutated::skipped(
            state,
            SkipReason::WouldCycle {
                id: id.clone(),
                new_parent: new_parent.clone(),
            },
        );
    }

    let mut next = state.clone();
    if let Some(old_parent) = next.reverse_refs.get(id).cloned() {
        if let Some(children) = next.references.get_mut(&old_parent) {
            children.retain(|c| c != id);
        }
    }
    let children = next.references.entry(new_parent.clone()).or_default();
    let at = index.unwrap_or(children.len()).min(children.len());
    children.insert(at, id.clone());
    next.reverse_refs.insert(id.clone(), new_parent.clone());
    Mutated::applied(next)
}

fn is_ancestor_of(state: &VaultState, candidate: &ResourceId, of: &ResourceId) -> bool {
    let mut current = of;
    while let Some(parent) = state.reverse_refs.get(current) {
        if parent == candidate {
            return true;
        }
        current = parent;
    }
    false
}

/// Snapshot a resource into the trash side-table (the resource itself
/// stays; the collaborator removes it separately). `trashed_at_ms` is
/// wall-clock milliseconds supplied by the caller to keep this pure.
pub fn record_trashed(state: &VaultState, id: &ResourceId, trashed_at_ms: u64) -> Mutated {
    let Some(resource) = state.get_arc(id) else {
        return Mutated::skipped(state, SkipReason::NotFound { id: id.clone() });
    };
    let record = TrashedResource {
        resource: Arc::clone(resource),
        trashed_at_ms,
        original_parent: state.reverse_refs.get(id).cloned(),
        member_of: state
            .member_of_collections
            .get(id)
            .cloned()
            .unwrap_or_default(),
        child_ids: state.references.get(id).cloned().unwrap_or_default(),
    };
    let mut next = state.clone();
    next.trashed.insert(id.clone(), record);
    Mutated::applied(next)
}

/// Drop a trash record (after a restore or a permanent delete).
pub fn take_trashed(state: &VaultState, id: &ResourceId) -> Mutated {
    if !state.trashed.contains_key(id) {
        return Mutated::skipped(state, SkipReason::NotFound { id: id.clone() });
    }
    let mut next = state.clone();
    next.trashed.remove(id);
    Mutated::applied(next)
}
