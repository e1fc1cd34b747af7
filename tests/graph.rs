//! Traversal and membership-query semantics.

mod fixtures;

use fixtures::rid;
use fixtures::trees::{self, ANNO1, C1, C2, M1, M2, M_EXTERNAL, PAGE1, R1, ROOT_COLL, SUB_COLL};
use iiif_vault::core::{graph, normalize};
use iiif_vault::ResourceType;

#[test]
fn ancestors_run_nearest_parent_first() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    let ancestors = graph::ancestors(&state, &rid(ANNO1));
    let chain: Vec<&str> = ancestors
        .iter()
        .map(|id| id.as_str())
        .collect();
    assert_eq!(chain, [PAGE1, C1, M1]);
}

#[test]
fn descendants_are_preorder() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    let descendants = graph::descendants(&state, &rid(M1));
    let walk: Vec<&str> = descendants
        .iter()
        .map(|id| id.as_str())
        .collect();
    // C1's subtree completes before C2 starts; R1 trails as the last
    // child of the manifest.
    assert_eq!(walk, [C1, PAGE1, ANNO1, C2, R1]);
}

#[test]
fn descendants_restart_identically() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    let first = graph::descendants(&state, &rid(M1));
    let second = graph::descendants(&state, &rid(M1));
    assert_eq!(first, second);
}

#[test]
fn parent_of_root_is_none() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    assert_eq!(graph::parent_id(&state, &rid(M1)), None);
    assert!(graph::ancestors(&state, &rid(M1)).is_empty());
}

#[test]
fn resources_of_type_is_id_ordered_not_insertion_ordered() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    let ids: Vec<&str> = state
        .resources_of_type(ResourceType::Canvas)
        .map(|r| r.id().as_str())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 2);
}

#[test]
fn orphan_means_unreferenced_not_unparented() {
    let state = normalize(&trees::curated_archive()).unwrap();

    // M2 sits under the sub-collection hierarchically, yet no collection
    // *references* it - it is an orphan in the curatorial sense.
    assert_eq!(graph::parent_id(&state, &rid(M2)), Some(&rid(SUB_COLL)));
    assert!(graph::is_orphan_manifest(&state, &rid(M2)));

    // M1 has both a parent and a membership entry - not an orphan.
    assert!(!graph::is_orphan_manifest(&state, &rid(M1)));

    // The shell manifest has no parent but is referenced - not an orphan.
    assert_eq!(graph::parent_id(&state, &rid(M_EXTERNAL)), None);
    assert!(!graph::is_orphan_manifest(&state, &rid(M_EXTERNAL)));

    // Non-manifests never report orphan.
    assert!(!graph::is_orphan_manifest(&state, &rid(SUB_COLL)));
}

#[test]
fn membership_queries_mirror_each_other() {
    let state = normalize(&trees::curated_archive()).unwrap();
    for collection in [rid(ROOT_COLL), rid(SUB_COLL)] {
        for member in graph::collection_members(&state, &collection) {
            assert!(
                graph::collections_containing(&state, member).contains(&collection),
                "{member} should know it is in {collection}"
            );
        }
    }
}

#[test]
fn child_ids_of_leaf_is_empty() {
    let state = normalize(&trees::simple_manifest()).unwrap();
    assert!(graph::child_ids(&state, &rid(C2)).is_empty());
    assert!(graph::child_ids(&state, &rid(R1)).is_empty());
}
