//! Core error families (identity, normalization, actions, integrity).
//!
//! These are bounded and stable: core errors represent domain/refusal
//! states, not library implementation details. Primitives never *return*
//! errors for data-shape problems (they skip and log instead, see
//! `mutate::SkipReason`); the types here cover the paths that do refuse:
//! parsing, normalization, and action validation.

use thiserror::Error;

/// Invalid identifier.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum InvalidId {
    #[error("resource id `{raw}` is invalid: {reason}")]
    Resource { raw: String, reason: String },
}

/// Unknown type or enum tag.
#[derive(Debug, Error, Clone)]
#[error("unknown type tag `{raw}`")]
pub struct InvalidType {
    pub raw: String,
}

/// Normalization refused the source tree.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum NormalizeError {
    /// Same id embedded twice. Refusing beats silently keeping the last
    /// writer: the two nodes may disagree and the loser would vanish from
    /// the export.
    #[error("duplicate id `{id}` in source tree")]
    DuplicateId { id: String },

    #[error("node under `{parent}` has no id")]
    MissingId { parent: String },

    #[error("node `{id}` has no type")]
    MissingType { id: String },

    #[error("node `{id}`: property `{property}` is malformed: {reason}")]
    InvalidShape {
        id: String,
        property: &'static str,
        reason: String,
    },

    #[error("source tree root must be a JSON object")]
    RootNotObject,

    #[error("tree deeper than {max} levels at `{id}`")]
    TooDeep { id: String, max: usize },
}

/// An action failed shape validation.
///
/// Shape-only by design: existence of the target ids is checked at apply
/// time, so actions can be validated before the target state is known.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ActionError {
    #[error("action `{action}`: {source}")]
    BadId {
        action: &'static str,
        source: InvalidId,
    },

    #[error("action `{action}`: navDate `{raw}` is not RFC 3339")]
    BadNavDate { action: &'static str, raw: String },

    #[error("action `{action}`: canvas {field} must be positive")]
    NonPositiveDimension {
        action: &'static str,
        field: &'static str,
    },

    #[error("action `{action}`: new order must not be empty")]
    EmptyOrder { action: &'static str },

    #[error("batch actions must not nest")]
    NestedBatch,

    #[error("batch of {len} actions exceeds limit {max}")]
    BatchTooLarge { len: usize, max: usize },
}

/// A relationship table disagrees with its inverse.
///
/// Raised only by the integrity checker, which runs under `debug_assert!`
/// in the mutation primitives and directly in tests. Observing this in
/// production means a primitive has a bug, not that the caller's data is
/// bad.
#[derive(Debug, Error, Clone)]
#[error("integrity violation: {reason}")]
pub struct IntegrityError {
    pub reason: String,
}

/// Umbrella over the core error families.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    Id(#[from] InvalidId),

    #[error(transparent)]
    Type(#[from] InvalidType),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}
