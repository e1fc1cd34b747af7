//! Layer 7: Normalization
//!
//! `normalize` flattens a nested IIIF tree into a `VaultState`;
//! `denormalize` reconstructs the tree from `root_id`. Unknown properties
//! ride along verbatim in each resource's extension bag.
//!
//! Ownership vs membership at the source level: a node embedded in full
//! under its parent's containment property is the authoring hierarchy and
//! lands in `references`/`reverse_refs`. An object carrying only `id` and
//! `type` under a Collection's `items` is a non-owning cross-reference and
//! lands in the membership side-table only (with a shell resource created
//! when the target is not embedded anywhere in the tree).
//!
//! Duplicate ids are an error, not a silent overwrite: the two embeddings
//! may disagree and the loser would vanish from the export.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::descriptive::{LanguageMap, MetadataEntry};
use super::domain::{ResourceType, ViewingDirection};
use super::error::{CoreError, NormalizeError};
use super::identity::ResourceId;
use super::limits::Limits;
use super::resource::{
    Annotation, AnnotationPage, Canvas, Collection, Extensions, Manifest, Range, Resource,
};
use super::state::VaultState;

/// Flatten a nested tree into a normalized state, default limits.
pub fn normalize(tree: &Value) -> Result<VaultState, CoreError> {
    normalize_with_limits(tree, &Limits::default())
}

/// Flatten a nested tree into a normalized state.
pub fn normalize_with_limits(tree: &Value, limits: &Limits) -> Result<VaultState, CoreError> {
    let mut normalizer = Normalizer {
        limits,
        state: VaultState::empty(),
        stubs: Vec::new(),
    };
    let root = normalizer.walk(tree, None, 0)?;
    normalizer.state.root_id = Some(root);
    normalizer.resolve_stubs()?;
    debug_assert!(normalizer.state.verify_integrity().is_ok());
    Ok(normalizer.state)
}

/// Rebuild the nested tree. `Null` for an empty store.
///
/// Tree shape comes from `references` alone; membership cross-references
/// are re-emitted as `{id, type}` stubs after a Collection's owned items.
pub fn denormalize(state: &VaultState) -> Value {
    match &state.root_id {
        Some(root) => node_value(state, root),
        None => Value::Null,
    }
}

/// A non-owning `{id, type}` reference found under a Collection.
struct StubRef {
    collection: ResourceId,
    id: ResourceId,
    kind: ResourceType,
}

struct Normalizer<'a> {
    limits: &'a Limits,
    state: VaultState,
    stubs: Vec<StubRef>,
}

impl Normalizer<'_> {
    fn walk(
        &mut self,
        node: &Value,
        parent: Option<(&ResourceId, ResourceType)>,
        depth: usize,
    ) -> Result<ResourceId, CoreError> {
        let obj = node.as_object().ok_or_else(|| match parent {
            None => CoreError::from(NormalizeError::RootNotObject),
            Some((pid, _)) => invalid(pid.as_str(), "items", "entry is not an object"),
        })?;

        let raw_id = obj
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| NormalizeError::MissingId {
                parent: parent
                    .map(|(pid, _)| pid.to_string())
                    .unwrap_or_else(|| "(root)".into()),
            })
            .map_err(CoreError::from)?;
        let id = ResourceId::parse(raw_id)?;

        let kind_tag = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| NormalizeError::MissingType {
                id: raw_id.to_string(),
            })
            .map_err(CoreError::from)?;
        let kind = ResourceType::parse(kind_tag)?;

        if depth > self.limits.max_tree_depth {
            return Err(NormalizeError::TooDeep {
                id: raw_id.to_string(),
                max: self.limits.max_tree_depth,
            }
            .into());
        }
        if self.state.type_index.contains_key(&id) {
            return Err(NormalizeError::DuplicateId {
                id: raw_id.to_string(),
            }
            .into());
        }
        if let Some((_, parent_kind)) = parent {
            if !parent_kind.can_contain(kind) {
                return Err(invalid(
                    raw_id,
                    "type",
                    format!("{parent_kind} cannot own a {kind}"),
                ));
            }
        }

        let resource = build_resource(obj, &id, kind)?;
        self.state
            .buckets
            .bucket_mut(kind)
            .insert(id.clone(), Arc::new(resource));
        self.state.type_index.insert(id.clone(), kind);

        self.walk_children(obj, &id, kind, depth)?;
        Ok(id)
    }

    fn walk_children(
        &mut self,
        obj: &Map<String, Value>,
        id: &ResourceId,
        kind: ResourceType,
        depth: usize,
    ) -> Result<(), CoreError> {
        let mut children: Vec<ResourceId> = Vec::new();
        let mut property_present = false;

        if kind == ResourceType::Collection {
            if let Some(items) = obj.get("items") {
                property_present = true;
                let entries = items
                    .as_array()
                    .ok_or_else(|| invalid(id.as_str(), "items", "must be an array"))?;
                for entry in entries {
                    if let Some(stub) = reference_stub(entry)? {
                        if !matches!(
                            stub.1,
                            ResourceType::Manifest | ResourceType::Collection
                        ) {
                            return Err(invalid(
                                id.as_str(),
                                "items",
                                format!("a collection cannot reference a {}", stub.1),
                            ));
                        }
                        self.stubs.push(StubRef {
                            collection: id.clone(),
                            id: stub.0,
                            kind: stub.1,
                        });
                        continue;
                    }
                    let child = self.walk(entry, Some((id, kind)), depth + 1)?;
                    self.state.reverse_refs.insert(child.clone(), id.clone());
                    children.push(child);
                }
            }
        } else {
            for &property in containment_properties(kind) {
                if let Some(items) = obj.get(property) {
                    property_present = true;
                    let entries = items
                        .as_array()
                        .ok_or_else(|| invalid(id.as_str(), property, "must be an array"))?;
                    for entry in entries {
                        let child = self.walk(entry, Some((id, kind)), depth + 1)?;
                        self.state.reverse_refs.insert(child.clone(), id.clone());
                        children.push(child);
                    }
                }
            }
        }

        // Entry iff the containment property appeared in the source,
        // even when it held no owned children.
        if property_present {
            self.state.references.insert(id.clone(), children);
        }
        Ok(())
    }

    /// Second pass: membership can point at ids embedded later in the
    /// walk, so stubs resolve only after the whole tree is in.
    fn resolve_stubs(&mut self) -> Result<(), CoreError> {
        for StubRef {
            collection,
            id,
            kind,
        } in std::mem::take(&mut self.stubs)
        {
            match self.state.kind_of(&id) {
                Some(existing) if existing != kind => {
                    return Err(invalid(
                        id.as_str(),
                        "type",
                        format!("reference declares {kind} but the resource is {existing}"),
                    ));
                }
                Some(_) => {}
                None => {
                    self.state
                        .buckets
                        .bucket_mut(kind)
                        .insert(id.clone(), Arc::new(shell_resource(kind, id.clone())));
                    self.state.type_index.insert(id.clone(), kind);
                }
            }

            let members = self
                .state
                .collection_members
                .entry(collection.clone())
                .or_default();
            if members.contains(&id) {
                return Err(invalid(
                    id.as_str(),
                    "items",
                    "referenced twice by the same collection",
                ));
            }
            members.push(id.clone());
            self.state
                .member_of_collections
                .entry(id)
                .or_default()
                .push(collection);
        }
        Ok(())
    }
}

/// Containment properties walked for non-Collection kinds, in the order
/// their children land in `references` (Manifest canvases before ranges).
fn containment_properties(kind: ResourceType) -> &'static [&'static str] {
    match kind {
        ResourceType::Manifest => &["items", "structures"],
        ResourceType::Canvas | ResourceType::AnnotationPage => &["items"],
        // Range items are canvas references owned by the manifest, kept
        // opaque on the Range itself; Annotations own nothing.
        ResourceType::Collection | ResourceType::Range | ResourceType::Annotation => &[],
    }
}

/// `Some((id, type))` when the entry is a bare reference: an object whose
/// only keys are `id` and `type`. Anything with more content is an
/// embedded node.
fn reference_stub(entry: &Value) -> Result<Option<(ResourceId, ResourceType)>, CoreError> {
    let Some(obj) = entry.as_object() else {
        return Ok(None);
    };
    if obj.len() != 2 || !obj.contains_key("id") || !obj.contains_key("type") {
        return Ok(None);
    }
    let raw_id = obj
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("(reference)", "id", "must be a string"))?;
    let id = ResourceId::parse(raw_id)?;
    let tag = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(raw_id, "type", "must be a string"))?;
    Ok(Some((id, ResourceType::parse(tag)?)))
}

fn shell_resource(kind: ResourceType, id: ResourceId) -> Resource {
    match kind {
        ResourceType::Collection => Resource::Collection(Collection::new(id)),
        ResourceType::Manifest => Resource::Manifest(Manifest::new(id)),
        ResourceType::Canvas => Resource::Canvas(Canvas::new(id)),
        ResourceType::Range => Resource::Range(Range::new(id)),
        ResourceType::AnnotationPage => Resource::AnnotationPage(AnnotationPage::new(id)),
        ResourceType::Annotation => Resource::Annotation(Annotation::new(id)),
    }
}

// ---------------------------------------------------------------------------
// Known-field extraction

fn invalid(id: &str, property: &'static str, reason: impl Into<String>) -> CoreError {
    NormalizeError::InvalidShape {
        id: id.to_string(),
        property,
        reason: reason.into(),
    }
    .into()
}

fn build_resource(
    obj: &Map<String, Value>,
    id: &ResourceId,
    kind: ResourceType,
) -> Result<Resource, CoreError> {
    let raw = id.as_str();
    let resource = match kind {
        ResourceType::Collection => Resource::Collection(Collection {
            id: id.clone(),
            label: opt_language_map(obj, "label", raw)?,
            summary: opt_language_map(obj, "summary", raw)?,
            metadata: opt_metadata(obj, raw)?,
            rights: opt_string(obj, "rights", raw)?,
            nav_date: opt_string(obj, "navDate", raw)?,
            behavior: opt_string_list(obj, "behavior", raw)?,
            extensions: extension_bag(obj, COLLECTION_KEYS),
        }),
        ResourceType::Manifest => Resource::Manifest(Manifest {
            id: id.clone(),
            label: opt_language_map(obj, "label", raw)?,
            summary: opt_language_map(obj, "summary", raw)?,
            metadata: opt_metadata(obj, raw)?,
            rights: opt_string(obj, "rights", raw)?,
            nav_date: opt_string(obj, "navDate", raw)?,
            behavior: opt_string_list(obj, "behavior", raw)?,
            viewing_direction: opt_viewing_direction(obj, raw)?,
            extensions: extension_bag(obj, MANIFEST_KEYS),
        }),
        ResourceType::Canvas => Resource::Canvas(Canvas {
            id: id.clone(),
            label: opt_language_map(obj, "label", raw)?,
            summary: opt_language_map(obj, "summary", raw)?,
            metadata: opt_metadata(obj, raw)?,
            rights: opt_string(obj, "rights", raw)?,
            nav_date: opt_string(obj, "navDate", raw)?,
            behavior: opt_string_list(obj, "behavior", raw)?,
            width: opt_u64(obj, "width", raw)?,
            height: opt_u64(obj, "height", raw)?,
            duration: opt_number(obj, "duration", raw)?,
            extensions: extension_bag(obj, CANVAS_KEYS),
        }),
        ResourceType::Range => Resource::Range(Range {
            id: id.clone(),
            label: opt_language_map(obj, "label", raw)?,
            summary: opt_language_map(obj, "summary", raw)?,
            metadata: opt_metadata(obj, raw)?,
            nav_date: opt_string(obj, "navDate", raw)?,
            behavior: opt_string_list(obj, "behavior", raw)?,
            items: opt_value_list(obj, "items", raw)?,
            extensions: extension_bag(obj, RANGE_KEYS),
        }),
        ResourceType::AnnotationPage => Resource::AnnotationPage(AnnotationPage {
            id: id.clone(),
            label: opt_language_map(obj, "label", raw)?,
            behavior: opt_string_list(obj, "behavior", raw)?,
            extensions: extension_bag(obj, PAGE_KEYS),
        }),
        ResourceType::Annotation => Resource::Annotation(Annotation {
            id: id.clone(),
            label: opt_language_map(obj, "label", raw)?,
            motivation: opt_string(obj, "motivation", raw)?,
            body: obj.get("body").cloned(),
            target: obj.get("target").cloned(),
            extensions: extension_bag(obj, ANNOTATION_KEYS),
        }),
    };
    Ok(resource)
}

const COLLECTION_KEYS: &[&str] = &[
    "id", "type", "label", "summary", "metadata", "rights", "navDate", "behavior", "items",
];
const MANIFEST_KEYS: &[&str] = &[
    "id",
    "type",
    "label",
    "summary",
    "metadata",
    "rights",
    "navDate",
    "behavior",
    "viewingDirection",
    "items",
    "structures",
];
const CANVAS_KEYS: &[&str] = &[
    "id", "type", "label", "summary", "metadata", "rights", "navDate", "behavior", "width",
    "height", "duration", "items",
];
const RANGE_KEYS: &[&str] = &[
    "id", "type", "label", "summary", "metadata", "navDate", "behavior", "items",
];
const PAGE_KEYS: &[&str] = &["id", "type", "label", "behavior", "items"];
const ANNOTATION_KEYS: &[&str] = &["id", "type", "label", "motivation", "body", "target"];

fn extension_bag(obj: &Map<String, Value>, known: &[&str]) -> Extensions {
    obj.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn opt_language_map(
    obj: &Map<String, Value>,
    key: &'static str,
    id: &str,
) -> Result<Option<LanguageMap>, CoreError> {
    match obj.get(key) {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| invalid(id, key, e.to_string())),
    }
}

fn opt_metadata(obj: &Map<String, Value>, id: &str) -> Result<Vec<MetadataEntry>, CoreError> {
    match obj.get("metadata") {
        None => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| invalid(id, "metadata", e.to_string())),
    }
}

fn opt_string(
    obj: &Map<String, Value>,
    key: &'static str,
    id: &str,
) -> Result<Option<String>, CoreError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(id, key, "must be a string")),
    }
}

fn opt_string_list(
    obj: &Map<String, Value>,
    key: &'static str,
    id: &str,
) -> Result<Vec<String>, CoreError> {
    match obj.get(key) {
        None => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| invalid(id, key, e.to_string())),
    }
}

fn opt_u64(
    obj: &Map<String, Value>,
    key: &'static str,
    id: &str,
) -> Result<Option<u64>, CoreError> {
    match obj.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid(id, key, "must be a non-negative integer")),
    }
}

fn opt_number(
    obj: &Map<String, Value>,
    key: &'static str,
    id: &str,
) -> Result<Option<serde_json::Number>, CoreError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(_) => Err(invalid(id, key, "must be a number")),
    }
}

fn opt_value_list(
    obj: &Map<String, Value>,
    key: &'static str,
    id: &str,
) -> Result<Option<Vec<Value>>, CoreError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.clone())),
        Some(_) => Err(invalid(id, key, "must be an array")),
    }
}

fn opt_viewing_direction(
    obj: &Map<String, Value>,
    id: &str,
) -> Result<Option<ViewingDirection>, CoreError> {
    match obj.get("viewingDirection") {
        None => Ok(None),
        Some(Value::String(s)) => ViewingDirection::parse(s)
            .map(Some)
            .map_err(|e| invalid(id, "viewingDirection", e.to_string())),
        Some(_) => Err(invalid(id, "viewingDirection", "must be a string")),
    }
}

// ---------------------------------------------------------------------------
// Denormalization

fn node_value(state: &VaultState, id: &ResourceId) -> Value {
    let Some(resource) = state.get(id) else {
        return Value::Null;
    };
    let mut obj = Map::new();
    obj.insert("id".into(), Value::String(id.as_str().to_string()));
    obj.insert(
        "type".into(),
        Value::String(resource.kind().as_str().to_string()),
    );

    match resource {
        Resource::Collection(r) => {
            push_language(&mut obj, "label", r.label.as_ref());
            push_language(&mut obj, "summary", r.summary.as_ref());
            push_metadata(&mut obj, &r.metadata);
            push_string(&mut obj, "rights", r.rights.as_deref());
            push_string(&mut obj, "navDate", r.nav_date.as_deref());
            push_string_list(&mut obj, "behavior", &r.behavior);
        }
        Resource::Manifest(r) => {
            push_language(&mut obj, "label", r.label.as_ref());
            push_language(&mut obj, "summary", r.summary.as_ref());
            push_metadata(&mut obj, &r.metadata);
            push_string(&mut obj, "rights", r.rights.as_deref());
            push_string(&mut obj, "navDate", r.nav_date.as_deref());
            push_string_list(&mut obj, "behavior", &r.behavior);
            if let Some(dir) = r.viewing_direction {
                obj.insert(
                    "viewingDirection".into(),
                    Value::String(dir.as_str().to_string()),
                );
            }
        }
        Resource::Canvas(r) => {
            push_language(&mut obj, "label", r.label.as_ref());
            push_language(&mut obj, "summary", r.summary.as_ref());
            push_metadata(&mut obj, &r.metadata);
            push_string(&mut obj, "rights", r.rights.as_deref());
            push_string(&mut obj, "navDate", r.nav_date.as_deref());
            push_string_list(&mut obj, "behavior", &r.behavior);
            if let Some(width) = r.width {
                obj.insert("width".into(), Value::Number(width.into()));
            }
            if let Some(height) = r.height {
                obj.insert("height".into(), Value::Number(height.into()));
            }
            if let Some(duration) = &r.duration {
                obj.insert("duration".into(), Value::Number(duration.clone()));
            }
        }
        Resource::Range(r) => {
            push_language(&mut obj, "label", r.label.as_ref());
            push_language(&mut obj, "summary", r.summary.as_ref());
            push_metadata(&mut obj, &r.metadata);
            push_string(&mut obj, "navDate", r.nav_date.as_deref());
            push_string_list(&mut obj, "behavior", &r.behavior);
        }
        Resource::AnnotationPage(r) => {
            push_language(&mut obj, "label", r.label.as_ref());
            push_string_list(&mut obj, "behavior", &r.behavior);
        }
        Resource::Annotation(r) => {
            push_language(&mut obj, "label", r.label.as_ref());
            push_string(&mut obj, "motivation", r.motivation.as_deref());
            if let Some(body) = &r.body {
                obj.insert("body".into(), body.clone());
            }
            if let Some(target) = &r.target {
                obj.insert("target".into(), target.clone());
            }
        }
    }

    for (key, value) in resource.extensions() {
        obj.insert(key.clone(), value.clone());
    }

    push_children(state, id, resource, &mut obj);
    Value::Object(obj)
}

fn push_children(
    state: &VaultState,
    id: &ResourceId,
    resource: &Resource,
    obj: &mut Map<String, Value>,
) {
    match resource.kind() {
        ResourceType::Collection => {
            let owned = state.references.get(id);
            let members = state.collection_members.get(id);
            if owned.is_none() && members.is_none() {
                return;
            }
            let mut items: Vec<Value> = Vec::new();
            for child in owned.into_iter().flatten() {
                items.push(node_value(state, child));
            }
            for member in members.into_iter().flatten() {
                // Members this collection also owns are already embedded.
                if state.reverse_refs.get(member) == Some(id) {
                    continue;
                }
                if let Some(kind) = state.kind_of(member) {
                    let mut stub = Map::new();
                    stub.insert("id".into(), Value::String(member.as_str().to_string()));
                    stub.insert("type".into(), Value::String(kind.as_str().to_string()));
                    items.push(Value::Object(stub));
                }
            }
            obj.insert("items".into(), Value::Array(items));
        }
        ResourceType::Manifest => {
            if let Some(children) = state.references.get(id) {
                let canvases: Vec<Value> = children
                    .iter()
                    .filter(|c| state.kind_of(c) == Some(ResourceType::Canvas))
                    .map(|c| node_value(state, c))
                    .collect();
                obj.insert("items".into(), Value::Array(canvases));
                let ranges: Vec<Value> = children
                    .iter()
                    .filter(|c| state.kind_of(c) == Some(ResourceType::Range))
                    .map(|c| node_value(state, c))
                    .collect();
                if !ranges.is_empty() {
                    obj.insert("structures".into(), Value::Array(ranges));
                }
            }
        }
        ResourceType::Canvas | ResourceType::AnnotationPage => {
            if let Some(children) = state.references.get(id) {
                let items: Vec<Value> =
                    children.iter().map(|c| node_value(state, c)).collect();
                obj.insert("items".into(), Value::Array(items));
            }
        }
        ResourceType::Range => {
            if let Resource::Range(r) = resource {
                if let Some(items) = &r.items {
                    obj.insert("items".into(), Value::Array(items.clone()));
                }
            }
        }
        ResourceType::Annotation => {}
    }
}

fn push_language(obj: &mut Map<String, Value>, key: &str, value: Option<&LanguageMap>) {
    if let Some(map) = value {
        let rendered: Map<String, Value> = map
            .iter()
            .map(|(lang, values)| {
                (
                    lang.clone(),
                    Value::Array(values.iter().map(|s| Value::String(s.clone())).collect()),
                )
            })
            .collect();
        obj.insert(key.to_string(), Value::Object(rendered));
    }
}

fn push_metadata(obj: &mut Map<String, Value>, metadata: &[MetadataEntry]) {
    if metadata.is_empty() {
        return;
    }
    let rows: Vec<Value> = metadata
        .iter()
        .map(|entry| {
            let mut row = Map::new();
            push_language(&mut row, "label", Some(&entry.label));
            push_language(&mut row, "value", Some(&entry.value));
            Value::Object(row)
        })
        .collect();
    obj.insert("metadata".into(), Value::Array(rows));
}

fn push_string(obj: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(s) = value {
        obj.insert(key.to_string(), Value::String(s.to_string()));
    }
}

fn push_string_list(obj: &mut Map<String, Value>, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    obj.insert(
        key.to_string(),
        Value::Array(values.iter().map(|s| Value::String(s.clone())).collect()),
    );
}
