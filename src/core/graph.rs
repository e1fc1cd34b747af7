//! Layer 6: Graph queries
//!
//! Read-only selectors over the ownership forest and the membership
//! side-table. All functions are pure and safe to call against any
//! snapshot, including one a writer has since replaced.

use super::domain::ResourceType;
use super::identity::ResourceId;
use super::state::VaultState;

/// Ordered hierarchical children. Empty for leaves and unknown ids.
pub fn child_ids<'a>(state: &'a VaultState, id: &ResourceId) -> &'a [ResourceId] {
    state.references.get(id).map(Vec::as_slice).unwrap_or(&[])
}

/// The single hierarchical parent, if any.
pub fn parent_id<'a>(state: &'a VaultState, id: &ResourceId) -> Option<&'a ResourceId> {
    state.reverse_refs.get(id)
}

/// Ancestor chain, nearest parent first, root last.
pub fn ancestors(state: &VaultState, id: &ResourceId) -> Vec<ResourceId> {
    let mut chain = Vec::new();
    let mut current = id;
    while let Some(parent) = state.reverse_refs.get(current) {
        chain.push(parent.clone());
        current = parent;
    }
    chain
}

/// All hierarchical descendants in pre-order (children before siblings'
/// subtrees, stored child order). The starting id itself is not included.
pub fn descendants(state: &VaultState, id: &ResourceId) -> Vec<ResourceId> {
    let mut out = Vec::new();
    collect_descendants(state, id, &mut out);
    out
}

fn collect_descendants(state: &VaultState, id: &ResourceId, out: &mut Vec<ResourceId>) {
    if let Some(children) = state.references.get(id) {
        for child in children {
            out.push(child.clone());
            collect_descendants(state, child, out);
        }
    }
}

/// Collections referencing `id` through the membership side-table.
pub fn collections_containing<'a>(state: &'a VaultState, id: &ResourceId) -> &'a [ResourceId] {
    state
        .member_of_collections
        .get(id)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Ordered membership list of a collection (non-owning references only).
pub fn collection_members<'a>(state: &'a VaultState, id: &ResourceId) -> &'a [ResourceId] {
    state
        .collection_members
        .get(id)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// True iff `id` is a Manifest no collection *references*.
///
/// This checks membership, not parentage: a Manifest hierarchically owned
/// by a Collection still reports orphan until something adds it to a
/// membership list. "Has no parent" is `parent_id(..).is_none()`.
pub fn is_orphan_manifest(state: &VaultState, id: &ResourceId) -> bool {
    state.kind_of(id) == Some(ResourceType::Manifest)
        && state
            .member_of_collections
            .get(id)
            .is_none_or(|cs| cs.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(s: &str) -> ResourceId {
        ResourceId::parse(s).unwrap()
    }

    #[test]
    fn selectors_are_total_on_unknown_ids() {
        let state = VaultState::empty();
        let ghost = rid("https://example.org/ghost");
        assert!(child_ids(&state, &ghost).is_empty());
        assert!(parent_id(&state, &ghost).is_none());
        assert!(ancestors(&state, &ghost).is_empty());
        assert!(descendants(&state, &ghost).is_empty());
        assert!(collections_containing(&state, &ghost).is_empty());
        assert!(collection_members(&state, &ghost).is_empty());
        assert!(!is_orphan_manifest(&state, &ghost));
    }
}
