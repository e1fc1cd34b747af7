//! Layer 1: Identity atoms
//!
//! ResourceId: IIIF resource identifier (URI-shaped string)

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{CoreError, InvalidId};

/// Resource identifier - non-empty string without whitespace or control
/// characters.
///
/// IIIF ids are URIs, but full URI validation belongs to the validation
/// collaborator. The vault only requires ids to be usable as map keys and
/// round-trippable through JSON.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Parse and validate a resource id string.
    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidId::Resource {
                raw: s,
                reason: "empty".into(),
            }
            .into());
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidId::Resource {
                raw: s,
                reason: "contains whitespace or control character".into(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// Mint a fresh id for a caller-created resource.
    ///
    /// Collaborators that create entities (ingestion, UI "add" flows) need
    /// ids before the resource exists anywhere; `urn:uuid:` keeps them valid
    /// URIs without assuming a hosting scheme.
    pub fn mint() -> Self {
        Self(format!("urn:uuid:{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({:?})", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        ResourceId::parse(s)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> String {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_uris() {
        let id = ResourceId::parse("https://example.org/iiif/m1").unwrap();
        assert_eq!(id.as_str(), "https://example.org/iiif/m1");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(ResourceId::parse("").is_err());
    }

    #[test]
    fn parse_rejects_whitespace() {
        assert!(ResourceId::parse("https://example.org/a b").is_err());
        assert!(ResourceId::parse("id\n").is_err());
    }

    #[test]
    fn mint_produces_distinct_urns() {
        let a = ResourceId::mint();
        let b = ResourceId::mint();
        assert!(a.as_str().starts_with("urn:uuid:"));
        assert_ne!(a, b);
    }

    #[test]
    fn serde_roundtrip() {
        let id = ResourceId::parse("https://example.org/iiif/c1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let back: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<ResourceId>("\"\"").is_err());
    }
}
