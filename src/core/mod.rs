//! Core vault types (Layers 1-11)
//!
//! Module hierarchy follows type dependency order:
//! - identity: ResourceId (Layer 1)
//! - domain: ResourceType, ViewingDirection (Layer 2)
//! - descriptive: LanguageMap, MetadataEntry (Layer 3)
//! - resource: the six typed kinds + Resource union (Layer 4)
//! - state: VaultState, buckets, relationship tables (Layer 5)
//! - graph: read-only traversals (Layer 6)
//! - normalize: tree <-> state (Layer 7)
//! - mutate: pure mutation primitives (Layer 8)
//! - action: Action union + dispatch (Layer 9)
//! - history: undo/redo stacks (Layer 10)
//! - vault: the session object (Layer 11)

pub mod action;
pub mod descriptive;
pub mod domain;
pub mod error;
pub mod graph;
pub mod history;
pub mod identity;
pub mod limits;
pub mod mutate;
pub mod normalize;
pub mod resource;
pub mod state;
pub mod vault;

pub use action::{dispatch, Action, Dispatched, SkippedChange};
pub use descriptive::{LanguageMap, MetadataEntry};
pub use domain::{ResourceType, ViewingDirection};
pub use error::{
    ActionError, CoreError, IntegrityError, InvalidId, InvalidType, NormalizeError,
};
pub use graph::{
    ancestors, child_ids, collection_members, collections_containing, descendants,
    is_orphan_manifest, parent_id,
};
pub use history::{History, HistoryEntry};
pub use identity::ResourceId;
pub use limits::Limits;
pub use mutate::{
    add_resource, add_to_collection, move_item, record_trashed, remove_from_collection,
    remove_resource, reorder_children, take_trashed, update_resource, Mutated, MutationOutcome,
    SkipReason,
};
pub use normalize::{denormalize, normalize, normalize_with_limits};
pub use resource::{
    Annotation, AnnotationPage, Canvas, Collection, Extensions, Manifest, Range, Resource,
    ResourcePatch,
};
pub use state::{ResourceBuckets, TrashedResource, VaultState};
pub use vault::Vault;
