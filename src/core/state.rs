//! Layer 5: Normalized state
//!
//! The flat, indexed form of an archive: per-type buckets, a global
//! id -> type index, the ownership forest (`references`/`reverse_refs`),
//! the many-to-many membership side-table, and the trash side-table.
//!
//! INVARIANT: `references[p]` contains `c` iff `reverse_refs[c] == p`, and
//! membership tables mirror each other entry-for-entry. `verify_integrity`
//! checks both plus bucket/index agreement and forest acyclicity; the
//! mutation primitives run it under `debug_assert!`.
//!
//! A `VaultState` is a value. Mutation never happens in place at the API
//! surface: primitives clone, edit the clone, and return it, so any reader
//! holding an old snapshot keeps a fully consistent view. Entity payloads
//! sit behind `Arc`, so snapshots in the history stack share everything a
//! mutation did not touch.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::domain::ResourceType;
use super::error::IntegrityError;
use super::identity::ResourceId;
use super::resource::Resource;

/// Per-type entity buckets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceBuckets {
    pub(crate) collections: BTreeMap<ResourceId, Arc<Resource>>,
    pub(crate) manifests: BTreeMap<ResourceId, Arc<Resource>>,
    pub(crate) canvases: BTreeMap<ResourceId, Arc<Resource>>,
    pub(crate) ranges: BTreeMap<ResourceId, Arc<Resource>>,
    pub(crate) annotation_pages: BTreeMap<ResourceId, Arc<Resource>>,
    pub(crate) annotations: BTreeMap<ResourceId, Arc<Resource>>,
}

impl ResourceBuckets {
    pub fn bucket(&self, kind: ResourceType) -> &BTreeMap<ResourceId, Arc<Resource>> {
        match kind {
            ResourceType::Collection => &self.collections,
            ResourceType::Manifest => &self.manifests,
            ResourceType::Canvas => &self.canvases,
            ResourceType::Range => &self.ranges,
            ResourceType::AnnotationPage => &self.annotation_pages,
            ResourceType::Annotation => &self.annotations,
        }
    }

    pub(crate) fn bucket_mut(
        &mut self,
        kind: ResourceType,
    ) -> &mut BTreeMap<ResourceId, Arc<Resource>> {
        match kind {
            ResourceType::Collection => &mut self.collections,
            ResourceType::Manifest => &mut self.manifests,
            ResourceType::Canvas => &mut self.canvases,
            ResourceType::Range => &mut self.ranges,
            ResourceType::AnnotationPage => &mut self.annotation_pages,
            ResourceType::Annotation => &mut self.annotations,
        }
    }

    pub fn len(&self) -> usize {
        ResourceType::ALL.iter().map(|t| self.bucket(*t).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Snapshot taken by the soft-delete collaborator before a removal, enough
/// to reinsert the resource where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct TrashedResource {
    pub resource: Arc<Resource>,
    pub trashed_at_ms: u64,
    pub original_parent: Option<ResourceId>,
    pub member_of: Vec<ResourceId>,
    pub child_ids: Vec<ResourceId>,
}

/// The normalized archive snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VaultState {
    pub(crate) buckets: ResourceBuckets,
    pub(crate) type_index: BTreeMap<ResourceId, ResourceType>,
    /// Ownership: parent -> ordered child ids. An entry exists iff the
    /// source node carried its containment property (possibly empty).
    pub(crate) references: BTreeMap<ResourceId, Vec<ResourceId>>,
    /// Ownership inverse: child -> its single parent.
    pub(crate) reverse_refs: BTreeMap<ResourceId, ResourceId>,
    /// Membership: collection -> ordered member ids (non-owning).
    pub(crate) collection_members: BTreeMap<ResourceId, Vec<ResourceId>>,
    /// Membership inverse: member -> collections that reference it.
    pub(crate) member_of_collections: BTreeMap<ResourceId, Vec<ResourceId>>,
    pub(crate) root_id: Option<ResourceId>,
    pub(crate) trashed: BTreeMap<ResourceId, TrashedResource>,
}

impl VaultState {
    /// A blank archive.
    pub fn empty() -> Self {
        Self::default()
    }

    /// O(1) polymorphic lookup. Unknown ids are `None`, never a panic.
    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        let kind = *self.type_index.get(id)?;
        self.buckets.bucket(kind).get(id).map(Arc::as_ref)
    }

    pub(crate) fn get_arc(&self, id: &ResourceId) -> Option<&Arc<Resource>> {
        let kind = *self.type_index.get(id)?;
        self.buckets.bucket(kind).get(id)
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.type_index.contains_key(id)
    }

    pub fn kind_of(&self, id: &ResourceId) -> Option<ResourceType> {
        self.type_index.get(id).copied()
    }

    /// All resources of one kind, in id order (bucket order, NOT insertion
    /// order - callers needing presentation order should traverse the
    /// ownership graph instead).
    pub fn resources_of_type(&self, kind: ResourceType) -> impl Iterator<Item = &Resource> {
        self.buckets.bucket(kind).values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.type_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.type_index.is_empty()
    }

    pub fn root_id(&self) -> Option<&ResourceId> {
        self.root_id.as_ref()
    }

    /// The ordered children list, or `None` when the resource has no
    /// containment entry at all (its source node carried no containment
    /// property and no mutation attached a child). `graph::child_ids`
    /// flattens the two cases; this keeps them distinguishable.
    pub fn children_entry(&self, id: &ResourceId) -> Option<&[ResourceId]> {
        self.references.get(id).map(Vec::as_slice)
    }

    pub fn root(&self) -> Option<&Resource> {
        self.root_id.as_ref().and_then(|id| self.get(id))
    }

    pub fn trashed(&self, id: &ResourceId) -> Option<&TrashedResource> {
        self.trashed.get(id)
    }

    pub fn trashed_ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.trashed.keys()
    }

    /// Check the structural invariants. Cheap enough for debug assertions
    /// on archive-scale data; a failure is a bug in a primitive, not a
    /// caller error.
    pub fn verify_integrity(&self) -> Result<(), IntegrityError> {
        // 1. type_index and buckets agree in both directions.
        for (id, kind) in &self.type_index {
            match self.buckets.bucket(*kind).get(id) {
                None => {
                    return Err(IntegrityError {
                        reason: format!("`{id}` indexed as {kind} but missing from bucket"),
                    });
                }
                Some(resource) => {
                    if resource.id() != id || resource.kind() != *kind {
                        return Err(IntegrityError {
                            reason: format!("bucket entry for `{id}` disagrees with its key"),
                        });
                    }
                }
            }
        }
        if self.buckets.len() != self.type_index.len() {
            return Err(IntegrityError {
                reason: format!(
                    "buckets hold {} resources but type index holds {}",
                    self.buckets.len(),
                    self.type_index.len()
                ),
            });
        }

        // 2. references and reverse_refs mirror each other exactly.
        let mut forward_pairs = 0usize;
        for (parent, children) in &self.references {
            if !self.type_index.contains_key(parent) {
                return Err(IntegrityError {
                    reason: format!("references entry for unknown parent `{parent}`"),
                });
            }
            let mut seen = BTreeSet::new();
            for child in children {
                if !seen.insert(child) {
                    return Err(IntegrityError {
                        reason: format!("`{child}` appears twice under `{parent}`"),
                    });
                }
                if !self.type_index.contains_key(child) {
                    return Err(IntegrityError {
                        reason: format!("`{parent}` references unknown child `{child}`"),
                    });
                }
                if self.reverse_refs.get(child) != Some(parent) {
                    return Err(IntegrityError {
                        reason: format!("reverse_refs disagrees for `{child}` under `{parent}`"),
                    });
                }
                forward_pairs += 1;
            }
        }
        if forward_pairs != self.reverse_refs.len() {
            return Err(IntegrityError {
                reason: format!(
                    "{} parent/child pairs but {} reverse_refs entries",
                    forward_pairs,
                    self.reverse_refs.len()
                ),
            });
        }

        // 3. Membership tables mirror each other.
        let mut member_pairs = 0usize;
        for (collection, members) in &self.collection_members {
            let mut seen = BTreeSet::new();
            for member in members {
                if !seen.insert(member) {
                    return Err(IntegrityError {
                        reason: format!("`{member}` appears twice in members of `{collection}`"),
                    });
                }
                let reverse = self.member_of_collections.get(member);
                if !reverse.is_some_and(|cs| cs.contains(collection)) {
                    return Err(IntegrityError {
                        reason: format!(
                            "member_of_collections disagrees for `{member}` in `{collection}`"
                        ),
                    });
                }
                member_pairs += 1;
            }
        }
        let reverse_pairs: usize = self.member_of_collections.values().map(Vec::len).sum();
        if member_pairs != reverse_pairs {
            return Err(IntegrityError {
                reason: format!(
                    "{member_pairs} membership pairs forward but {reverse_pairs} backward"
                ),
            });
        }

        // 4. Ownership is a forest: walking up from any node terminates
        // without revisiting.
        for start in self.reverse_refs.keys() {
            let mut seen = BTreeSet::new();
            let mut current = start;
            while let Some(parent) = self.reverse_refs.get(current) {
                if !seen.insert(parent) {
                    return Err(IntegrityError {
                        reason: format!("ownership cycle through `{parent}`"),
                    });
                }
                current = parent;
            }
        }

        // Root, if set, must exist.
        if let Some(root) = &self.root_id {
            if !self.type_index.contains_key(root) {
                return Err(IntegrityError {
                    reason: format!("root `{root}` is not in the store"),
                });
            }
        }

        Ok(())
    }
}
