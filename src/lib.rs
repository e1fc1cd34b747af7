#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod telemetry;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core types at crate root for convenience
pub use crate::core::{
    Action, ActionError, Annotation, AnnotationPage, Canvas, Collection, CoreError, Dispatched,
    Extensions, History, HistoryEntry, IntegrityError, InvalidId, InvalidType, LanguageMap,
    Limits, Manifest, MetadataEntry, Mutated, MutationOutcome, NormalizeError, Range, Resource,
    ResourceId, ResourcePatch, ResourceType, SkipReason, SkippedChange, TrashedResource, Vault,
    VaultState, ViewingDirection,
};
