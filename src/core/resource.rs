//! Layer 4: Typed resources
//!
//! One struct per IIIF kind (fixed known fields + opaque extension bag),
//! `Resource` as the tagged union over them, and `ResourcePatch` for
//! shallow field merges.
//!
//! Extension properties are carried verbatim and never merged into the
//! typed fields; they exist purely for round-trip fidelity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::descriptive::{LanguageMap, MetadataEntry};
use super::domain::{ResourceType, ViewingDirection};
use super::identity::ResourceId;

/// Properties the schema does not know, keyed by property name.
pub type Extensions = BTreeMap<String, Value>;

/// A grouping of Manifests and/or nested Collections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: ResourceId,
    pub label: Option<LanguageMap>,
    pub summary: Option<LanguageMap>,
    pub metadata: Vec<MetadataEntry>,
    pub rights: Option<String>,
    pub nav_date: Option<String>,
    pub behavior: Vec<String>,
    pub extensions: Extensions,
}

/// A described unit of content containing ordered Canvases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: ResourceId,
    pub label: Option<LanguageMap>,
    pub summary: Option<LanguageMap>,
    pub metadata: Vec<MetadataEntry>,
    pub rights: Option<String>,
    pub nav_date: Option<String>,
    pub behavior: Vec<String>,
    pub viewing_direction: Option<ViewingDirection>,
    pub extensions: Extensions,
}

/// A single page/frame/time-slice with dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: ResourceId,
    pub label: Option<LanguageMap>,
    pub summary: Option<LanguageMap>,
    pub metadata: Vec<MetadataEntry>,
    pub rights: Option<String>,
    pub nav_date: Option<String>,
    pub behavior: Vec<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    /// Kept as a JSON number so `3` and `3.0` survive round-trips verbatim.
    pub duration: Option<serde_json::Number>,
    pub extensions: Extensions,
}

/// A named sub-sequence of Canvases within a Manifest.
///
/// `items` stays an opaque reference list: a Range points at Canvases the
/// Manifest owns (or nests further ranges), so normalizing it as owned
/// children would give those Canvases a second hierarchical parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub id: ResourceId,
    pub label: Option<LanguageMap>,
    pub summary: Option<LanguageMap>,
    pub metadata: Vec<MetadataEntry>,
    pub nav_date: Option<String>,
    pub behavior: Vec<String>,
    /// `None` when the source carried no `items` property at all.
    pub items: Option<Vec<Value>>,
    pub extensions: Extensions,
}

/// Container for Annotations attached to a Canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPage {
    pub id: ResourceId,
    pub label: Option<LanguageMap>,
    pub behavior: Vec<String>,
    pub extensions: Extensions,
}

/// Content or commentary on a Canvas region.
///
/// Body and target are opaque: their internal structure (choices, specific
/// resources, selectors) is not the vault's concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: ResourceId,
    pub label: Option<LanguageMap>,
    pub motivation: Option<String>,
    pub body: Option<Value>,
    pub target: Option<Value>,
    pub extensions: Extensions,
}

impl Collection {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            label: None,
            summary: None,
            metadata: Vec::new(),
            rights: None,
            nav_date: None,
            behavior: Vec::new(),
            extensions: Extensions::new(),
        }
    }
}

impl Manifest {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            label: None,
            summary: None,
            metadata: Vec::new(),
            rights: None,
            nav_date: None,
            behavior: Vec::new(),
            viewing_direction: None,
            extensions: Extensions::new(),
        }
    }
}

impl Canvas {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            label: None,
            summary: None,
            metadata: Vec::new(),
            rights: None,
            nav_date: None,
            behavior: Vec::new(),
            width: None,
            height: None,
            duration: None,
            extensions: Extensions::new(),
        }
    }
}

impl Range {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            label: None,
            summary: None,
            metadata: Vec::new(),
            nav_date: None,
            behavior: Vec::new(),
            items: None,
            extensions: Extensions::new(),
        }
    }
}

impl AnnotationPage {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            label: None,
            behavior: Vec::new(),
            extensions: Extensions::new(),
        }
    }
}

impl Annotation {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            label: None,
            motivation: None,
            body: None,
            target: None,
            extensions: Extensions::new(),
        }
    }
}

/// Tagged union over the six resource kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Resource {
    Collection(Collection),
    Manifest(Manifest),
    Canvas(Canvas),
    Range(Range),
    AnnotationPage(AnnotationPage),
    Annotation(Annotation),
}

impl Resource {
    pub fn id(&self) -> &ResourceId {
        match self {
            Self::Collection(r) => &r.id,
            Self::Manifest(r) => &r.id,
            Self::Canvas(r) => &r.id,
            Self::Range(r) => &r.id,
            Self::AnnotationPage(r) => &r.id,
            Self::Annotation(r) => &r.id,
        }
    }

    pub fn kind(&self) -> ResourceType {
        match self {
            Self::Collection(_) => ResourceType::Collection,
            Self::Manifest(_) => ResourceType::Manifest,
            Self::Canvas(_) => ResourceType::Canvas,
            Self::Range(_) => ResourceType::Range,
            Self::AnnotationPage(_) => ResourceType::AnnotationPage,
            Self::Annotation(_) => ResourceType::Annotation,
        }
    }

    pub fn label(&self) -> Option<&LanguageMap> {
        match self {
            Self::Collection(r) => r.label.as_ref(),
            Self::Manifest(r) => r.label.as_ref(),
            Self::Canvas(r) => r.label.as_ref(),
            Self::Range(r) => r.label.as_ref(),
            Self::AnnotationPage(r) => r.label.as_ref(),
            Self::Annotation(r) => r.label.as_ref(),
        }
    }

    pub fn summary(&self) -> Option<&LanguageMap> {
        match self {
            Self::Collection(r) => r.summary.as_ref(),
            Self::Manifest(r) => r.summary.as_ref(),
            Self::Canvas(r) => r.summary.as_ref(),
            Self::Range(r) => r.summary.as_ref(),
            Self::AnnotationPage(_) | Self::Annotation(_) => None,
        }
    }

    pub fn metadata(&self) -> &[MetadataEntry] {
        match self {
            Self::Collection(r) => &r.metadata,
            Self::Manifest(r) => &r.metadata,
            Self::Canvas(r) => &r.metadata,
            Self::Range(r) => &r.metadata,
            Self::AnnotationPage(_) | Self::Annotation(_) => &[],
        }
    }

    pub fn rights(&self) -> Option<&str> {
        match self {
            Self::Collection(r) => r.rights.as_deref(),
            Self::Manifest(r) => r.rights.as_deref(),
            Self::Canvas(r) => r.rights.as_deref(),
            _ => None,
        }
    }

    pub fn nav_date(&self) -> Option<&str> {
        match self {
            Self::Collection(r) => r.nav_date.as_deref(),
            Self::Manifest(r) => r.nav_date.as_deref(),
            Self::Canvas(r) => r.nav_date.as_deref(),
            Self::Range(r) => r.nav_date.as_deref(),
            _ => None,
        }
    }

    pub fn behavior(&self) -> &[String] {
        match self {
            Self::Collection(r) => &r.behavior,
            Self::Manifest(r) => &r.behavior,
            Self::Canvas(r) => &r.behavior,
            Self::Range(r) => &r.behavior,
            Self::AnnotationPage(r) => &r.behavior,
            Self::Annotation(_) => &[],
        }
    }

    pub fn viewing_direction(&self) -> Option<ViewingDirection> {
        match self {
            Self::Manifest(r) => r.viewing_direction,
            _ => None,
        }
    }

    pub fn extensions(&self) -> &Extensions {
        match self {
            Self::Collection(r) => &r.extensions,
            Self::Manifest(r) => &r.extensions,
            Self::Canvas(r) => &r.extensions,
            Self::Range(r) => &r.extensions,
            Self::AnnotationPage(r) => &r.extensions,
            Self::Annotation(r) => &r.extensions,
        }
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        match self {
            Self::Collection(r) => &mut r.extensions,
            Self::Manifest(r) => &mut r.extensions,
            Self::Canvas(r) => &mut r.extensions,
            Self::Range(r) => &mut r.extensions,
            Self::AnnotationPage(r) => &mut r.extensions,
            Self::Annotation(r) => &mut r.extensions,
        }
    }

    /// Set the label. Every kind carries one.
    pub fn set_label(&mut self, label: LanguageMap) {
        match self {
            Self::Collection(r) => r.label = Some(label),
            Self::Manifest(r) => r.label = Some(label),
            Self::Canvas(r) => r.label = Some(label),
            Self::Range(r) => r.label = Some(label),
            Self::AnnotationPage(r) => r.label = Some(label),
            Self::Annotation(r) => r.label = Some(label),
        }
    }

    /// Set the summary; false if this kind has no summary field.
    pub fn try_set_summary(&mut self, summary: LanguageMap) -> bool {
        match self {
            Self::Collection(r) => r.summary = Some(summary),
            Self::Manifest(r) => r.summary = Some(summary),
            Self::Canvas(r) => r.summary = Some(summary),
            Self::Range(r) => r.summary = Some(summary),
            Self::AnnotationPage(_) | Self::Annotation(_) => return false,
        }
        true
    }

    /// Replace the metadata table; false if this kind has none.
    pub fn try_set_metadata(&mut self, metadata: Vec<MetadataEntry>) -> bool {
        match self {
            Self::Collection(r) => r.metadata = metadata,
            Self::Manifest(r) => r.metadata = metadata,
            Self::Canvas(r) => r.metadata = metadata,
            Self::Range(r) => r.metadata = metadata,
            Self::AnnotationPage(_) | Self::Annotation(_) => return false,
        }
        true
    }

    /// Set or clear the rights URI; false if this kind has no rights field.
    pub fn try_set_rights(&mut self, rights: Option<String>) -> bool {
        match self {
            Self::Collection(r) => r.rights = rights,
            Self::Manifest(r) => r.rights = rights,
            Self::Canvas(r) => r.rights = rights,
            _ => return false,
        }
        true
    }

    /// Set or clear navDate; false if this kind has no navDate field.
    pub fn try_set_nav_date(&mut self, nav_date: Option<String>) -> bool {
        match self {
            Self::Collection(r) => r.nav_date = nav_date,
            Self::Manifest(r) => r.nav_date = nav_date,
            Self::Canvas(r) => r.nav_date = nav_date,
            Self::Range(r) => r.nav_date = nav_date,
            _ => return false,
        }
        true
    }

    /// Replace the behavior list; false if this kind has none.
    pub fn try_set_behavior(&mut self, behavior: Vec<String>) -> bool {
        match self {
            Self::Collection(r) => r.behavior = behavior,
            Self::Manifest(r) => r.behavior = behavior,
            Self::Canvas(r) => r.behavior = behavior,
            Self::Range(r) => r.behavior = behavior,
            Self::AnnotationPage(r) => r.behavior = behavior,
            Self::Annotation(_) => return false,
        }
        true
    }

    /// Set the viewing direction; only Manifests carry one.
    pub fn try_set_viewing_direction(&mut self, dir: ViewingDirection) -> bool {
        match self {
            Self::Manifest(r) => {
                r.viewing_direction = Some(dir);
                true
            }
            _ => false,
        }
    }
}

/// Shallow field merge for `update_resource`.
///
/// `Some` replaces the field, `None` leaves it untouched. Extension entries
/// are merged key-by-key; a `null` value deletes the key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePatch {
    pub label: Option<LanguageMap>,
    pub summary: Option<LanguageMap>,
    pub metadata: Option<Vec<MetadataEntry>>,
    pub rights: Option<String>,
    pub nav_date: Option<String>,
    pub behavior: Option<Vec<String>>,
    pub viewing_direction: Option<ViewingDirection>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub duration: Option<serde_json::Number>,
    pub extensions: Extensions,
}

impl ResourcePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the patch in place. Fields a kind does not carry are ignored,
    /// matching the shallow-merge contract (the patch may have been built
    /// for a heterogeneous batch).
    pub fn apply_to(&self, resource: &mut Resource) {
        if let Some(label) = &self.label {
            resource.set_label(label.clone());
        }
        if let Some(summary) = &self.summary {
            resource.try_set_summary(summary.clone());
        }
        if let Some(metadata) = &self.metadata {
            resource.try_set_metadata(metadata.clone());
        }
        if let Some(rights) = &self.rights {
            resource.try_set_rights(Some(rights.clone()));
        }
        if let Some(nav_date) = &self.nav_date {
            resource.try_set_nav_date(Some(nav_date.clone()));
        }
        if let Some(behavior) = &self.behavior {
            resource.try_set_behavior(behavior.clone());
        }
        if let Some(dir) = self.viewing_direction {
            resource.try_set_viewing_direction(dir);
        }
        if let Resource::Canvas(canvas) = resource {
            if let Some(width) = self.width {
                canvas.width = Some(width);
            }
            if let Some(height) = self.height {
                canvas.height = Some(height);
            }
            if let Some(duration) = &self.duration {
                canvas.duration = Some(duration.clone());
            }
        }
        for (key, value) in &self.extensions {
            if value.is_null() {
                resource.extensions_mut().remove(key);
            } else {
                resource.extensions_mut().insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(id: &str) -> Resource {
        Resource::Canvas(Canvas::new(ResourceId::parse(id).unwrap()))
    }

    #[test]
    fn kind_matches_variant() {
        let c = canvas("https://example.org/c1");
        assert_eq!(c.kind(), ResourceType::Canvas);
        assert_eq!(c.id().as_str(), "https://example.org/c1");
    }

    #[test]
    fn patch_replaces_only_named_fields() {
        let mut c = canvas("https://example.org/c1");
        c.set_label(LanguageMap::single("en", "before"));
        c.try_set_behavior(vec!["paged".into()]);

        let patch = ResourcePatch {
            label: Some(LanguageMap::single("en", "after")),
            ..Default::default()
        };
        patch.apply_to(&mut c);

        assert_eq!(c.label(), Some(&LanguageMap::single("en", "after")));
        assert_eq!(c.behavior(), ["paged".to_string()]);
    }

    #[test]
    fn patch_dimensions_only_touch_canvases() {
        let mut c = canvas("https://example.org/c1");
        let patch = ResourcePatch {
            width: Some(800),
            height: Some(600),
            ..Default::default()
        };
        patch.apply_to(&mut c);
        match &c {
            Resource::Canvas(cv) => {
                assert_eq!(cv.width, Some(800));
                assert_eq!(cv.height, Some(600));
            }
            other => panic!("unexpected kind {:?}", other.kind()),
        }

        let mut m = Resource::Manifest(Manifest::new(
            ResourceId::parse("https://example.org/m1").unwrap(),
        ));
        patch.apply_to(&mut m);
        assert_eq!(m.label(), None);
    }

    #[test]
    fn patch_extension_null_deletes() {
        let mut c = canvas("https://example.org/c1");
        c.extensions_mut()
            .insert("service".into(), serde_json::json!({"profile": "x"}));

        let mut extensions = Extensions::new();
        extensions.insert("service".into(), Value::Null);
        extensions.insert("custom".into(), serde_json::json!(7));
        let patch = ResourcePatch {
            extensions,
            ..Default::default()
        };
        patch.apply_to(&mut c);

        assert!(!c.extensions().contains_key("service"));
        assert_eq!(c.extensions().get("custom"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn inapplicable_fields_are_ignored() {
        let mut a = Resource::Annotation(Annotation::new(
            ResourceId::parse("https://example.org/a1").unwrap(),
        ));
        assert!(!a.try_set_summary(LanguageMap::single("en", "s")));
        assert!(!a.try_set_viewing_direction(ViewingDirection::RightToLeft));
        assert!(a.summary().is_none());
    }
}
