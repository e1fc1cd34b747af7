//! Layer 2: Domain enums
//!
//! ResourceType: the six IIIF Presentation resource kinds
//! ViewingDirection: page progression for Manifests

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{CoreError, InvalidType};

/// IIIF resource kind - closed set, tags as they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Collection,
    Manifest,
    Canvas,
    Range,
    AnnotationPage,
    Annotation,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        Self::Collection,
        Self::Manifest,
        Self::Canvas,
        Self::Range,
        Self::AnnotationPage,
        Self::Annotation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "Collection",
            Self::Manifest => "Manifest",
            Self::Canvas => "Canvas",
            Self::Range => "Range",
            Self::AnnotationPage => "AnnotationPage",
            Self::Annotation => "Annotation",
        }
    }

    /// Parse a wire type tag.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "Collection" => Ok(Self::Collection),
            "Manifest" => Ok(Self::Manifest),
            "Canvas" => Ok(Self::Canvas),
            "Range" => Ok(Self::Range),
            "AnnotationPage" => Ok(Self::AnnotationPage),
            "Annotation" => Ok(Self::Annotation),
            other => Err(InvalidType {
                raw: other.to_string(),
            }
            .into()),
        }
    }

    /// Hierarchical containment rule.
    ///
    /// The ownership forest admits exactly these edges; everything else is
    /// either a membership cross-reference or invalid.
    pub fn can_contain(&self, child: ResourceType) -> bool {
        matches!(
            (self, child),
            (Self::Collection, ResourceType::Collection)
                | (Self::Collection, ResourceType::Manifest)
                | (Self::Manifest, ResourceType::Canvas)
                | (Self::Manifest, ResourceType::Range)
                | (Self::Canvas, ResourceType::AnnotationPage)
                | (Self::AnnotationPage, ResourceType::Annotation)
        )
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reading/paging direction of a Manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewingDirection {
    #[serde(rename = "left-to-right")]
    LeftToRight,
    #[serde(rename = "right-to-left")]
    RightToLeft,
    #[serde(rename = "top-to-bottom")]
    TopToBottom,
    #[serde(rename = "bottom-to-top")]
    BottomToTop,
}

impl ViewingDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftToRight => "left-to-right",
            Self::RightToLeft => "right-to-left",
            Self::TopToBottom => "top-to-bottom",
            Self::BottomToTop => "bottom-to-top",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "left-to-right" => Ok(Self::LeftToRight),
            "right-to-left" => Ok(Self::RightToLeft),
            "top-to-bottom" => Ok(Self::TopToBottom),
            "bottom-to-top" => Ok(Self::BottomToTop),
            other => Err(InvalidType {
                raw: other.to_string(),
            }
            .into()),
        }
    }
}

impl Default for ViewingDirection {
    fn default() -> Self {
        Self::LeftToRight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_roundtrip() {
        for ty in ResourceType::ALL {
            assert_eq!(ResourceType::parse(ty.as_str()).unwrap(), ty);
        }
        assert!(ResourceType::parse("manifest").is_err());
        assert!(ResourceType::parse("").is_err());
    }

    #[test]
    fn containment_matches_hierarchy() {
        use ResourceType::*;
        assert!(Collection.can_contain(Manifest));
        assert!(Collection.can_contain(Collection));
        assert!(Manifest.can_contain(Canvas));
        assert!(Manifest.can_contain(Range));
        assert!(Canvas.can_contain(AnnotationPage));
        assert!(AnnotationPage.can_contain(Annotation));

        assert!(!Manifest.can_contain(Manifest));
        assert!(!Canvas.can_contain(Annotation));
        assert!(!Range.can_contain(Canvas));
        assert!(!Annotation.can_contain(Annotation));
    }

    #[test]
    fn viewing_direction_serde_uses_hyphenated_tags() {
        let json = serde_json::to_string(&ViewingDirection::RightToLeft).unwrap();
        assert_eq!(json, "\"right-to-left\"");
        let back: ViewingDirection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ViewingDirection::RightToLeft);
    }
}
