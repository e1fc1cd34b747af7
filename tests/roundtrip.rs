//! Normalization round-trip and source-policy tests.

mod fixtures;

use fixtures::trees::{self, ANNO1, C1, C2, M1, M_EXTERNAL, PAGE1, R1, ROOT_COLL, SUB_COLL};
use fixtures::rid;
use iiif_vault::core::{denormalize, graph, normalize};
use iiif_vault::{NormalizeError, Resource, ResourceType};
use serde_json::json;

#[test]
fn simple_manifest_round_trips() {
    let tree = trees::simple_manifest();
    let state = normalize(&tree).unwrap();
    assert_eq!(denormalize(&state), tree);
}

#[test]
fn curated_archive_round_trips() {
    let tree = trees::curated_archive();
    let state = normalize(&tree).unwrap();
    assert_eq!(denormalize(&state), tree);
}

#[test]
fn normalization_flattens_every_node() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    assert_eq!(state.root_id(), Some(&rid(M1)));
    assert_eq!(state.len(), 6);
    for (id, kind) in [
        (M1, ResourceType::Manifest),
        (C1, ResourceType::Canvas),
        (C2, ResourceType::Canvas),
        (PAGE1, ResourceType::AnnotationPage),
        (ANNO1, ResourceType::Annotation),
        (R1, ResourceType::Range),
    ] {
        assert_eq!(state.kind_of(&rid(id)), Some(kind), "{id}");
    }
}

#[test]
fn child_order_is_preserved() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    let children: Vec<&str> = graph::child_ids(&state, &rid(M1))
        .iter()
        .map(|id| id.as_str())
        .collect();
    // Canvases from `items` first, ranges from `structures` after.
    assert_eq!(children, [C1, C2, R1]);
}

#[test]
fn unknown_properties_land_in_the_extension_bag() {
    let state = normalize(&trees::simple_manifest()).unwrap();

    let root = state.get(&rid(M1)).unwrap();
    assert!(root.extensions().contains_key("@context"));

    let canvas = state.get(&rid(C2)).unwrap();
    assert_eq!(
        canvas.extensions().get("exhibitNotes"),
        Some(&json!({"conservation": "water damage, lower left"}))
    );
    // And never into the typed fields.
    assert!(canvas.label().is_some());
}

#[test]
fn typed_fields_are_extracted() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    let manifest = state.get(&rid(M1)).unwrap();
    assert_eq!(
        manifest.nav_date(),
        Some("1856-01-01T00:00:00Z"),
        "navDate is a known field, not an extension"
    );
    assert_eq!(manifest.behavior(), ["paged".to_string()]);
    assert_eq!(manifest.metadata().len(), 1);

    match state.get(&rid(C2)).unwrap() {
        Resource::Canvas(canvas) => {
            assert_eq!(canvas.width, Some(1200));
            assert_eq!(canvas.height, Some(1600));
            assert_eq!(canvas.duration.as_ref().and_then(|d| d.as_u64()), Some(3));
        }
        other => panic!("C2 should be a canvas, got {}", other.kind()),
    }
}

#[test]
fn range_items_stay_opaque() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    // The Range's canvas references are not hierarchical children...
    assert!(graph::child_ids(&state, &rid(R1)).is_empty());
    // ...and C1 keeps the Manifest (via its canvas position) as its only
    // parent chain.
    assert_eq!(graph::parent_id(&state, &rid(C1)), Some(&rid(M1)));
    match state.get(&rid(R1)).unwrap() {
        Resource::Range(range) => {
            let items = range.items.as_ref().expect("range items present");
            assert_eq!(items.len(), 1);
            assert_eq!(items[0]["id"], C1);
        }
        other => panic!("R1 should be a range, got {}", other.kind()),
    }
}

#[test]
fn duplicate_embedded_id_fails_loudly() {
    let tree = json!({
        "id": "https://example.org/m",
        "type": "Manifest",
        "items": [
            {"id": "https://example.org/c", "type": "Canvas", "label": {"en": ["a"]}},
            {"id": "https://example.org/c", "type": "Canvas", "label": {"en": ["b"]}}
        ]
    });
    let err = normalize(&tree).unwrap_err();
    assert!(matches!(
        err,
        iiif_vault::CoreError::Normalize(NormalizeError::DuplicateId { .. })
    ));
}

#[test]
fn containment_entry_exists_iff_property_present() {
    let tree = json!({
        "id": "https://example.org/m",
        "type": "Manifest",
        "items": [
            {"id": "https://example.org/c-empty", "type": "Canvas", "items": []},
            {"id": "https://example.org/c-bare", "type": "Canvas"}
        ]
    });
    let state = normalize(&tree).unwrap();
    // Present-but-empty keeps an (empty) entry.
    assert_eq!(
        state.children_entry(&rid("https://example.org/c-empty")),
        Some(&[][..])
    );
    // Absent property means no entry at all.
    assert_eq!(state.children_entry(&rid("https://example.org/c-bare")), None);
}

#[test]
fn empty_items_survive_round_trips() {
    let tree = json!({
        "id": "https://example.org/m",
        "type": "Manifest",
        "items": []
    });
    let state = normalize(&tree).unwrap();
    assert_eq!(denormalize(&state), tree);
}

#[test]
fn membership_references_do_not_own() {
    let state = normalize(&trees::curated_archive()).unwrap();

    // The stub target got a shell resource, membered but unparented.
    assert_eq!(state.kind_of(&rid(M_EXTERNAL)), Some(ResourceType::Manifest));
    assert_eq!(graph::parent_id(&state, &rid(M_EXTERNAL)), None);
    assert_eq!(
        graph::collections_containing(&state, &rid(M_EXTERNAL)),
        [rid(ROOT_COLL)]
    );

    // M1 is owned by the root collection and referenced by the
    // sub-collection; the reference adds membership, not a second parent.
    assert_eq!(graph::parent_id(&state, &rid(M1)), Some(&rid(ROOT_COLL)));
    assert_eq!(
        graph::collections_containing(&state, &rid(M1)),
        [rid(SUB_COLL)]
    );
    assert_eq!(
        graph::collection_members(&state, &rid(SUB_COLL)),
        [rid(M1)]
    );

    state.verify_integrity().unwrap();
}

#[test]
fn mismatched_reference_type_fails() {
    let tree = json!({
        "id": "https://example.org/coll",
        "type": "Collection",
        "items": [
            {
                "id": "https://example.org/sub",
                "type": "Collection",
                "label": {"en": ["embedded"]},
                "items": []
            },
            {"id": "https://example.org/sub", "type": "Manifest"}
        ]
    });
    let err = normalize(&tree).unwrap_err();
    assert!(err.to_string().contains("reference declares"));
}
