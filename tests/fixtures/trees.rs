//! Shared source trees. Ids are stable so tests can name nodes directly.
//!
//! Well-formedness note: inside a Collection's `items`, embedded nodes
//! come before bare references - that ordering is canonical on export.

use serde_json::{json, Value};

pub const M1: &str = "https://example.org/iiif/m1";
pub const C1: &str = "https://example.org/iiif/m1/canvas/1";
pub const C2: &str = "https://example.org/iiif/m1/canvas/2";
pub const PAGE1: &str = "https://example.org/iiif/m1/canvas/1/page";
pub const ANNO1: &str = "https://example.org/iiif/m1/canvas/1/page/anno";
pub const R1: &str = "https://example.org/iiif/m1/range/1";

pub const ROOT_COLL: &str = "https://example.org/iiif/archive";
pub const SUB_COLL: &str = "https://example.org/iiif/archive/exhibits";
pub const M2: &str = "https://example.org/iiif/m2";
pub const M_EXTERNAL: &str = "https://example.org/iiif/elsewhere/m9";

/// A Manifest with two Canvases; the first carries an AnnotationPage and
/// an Annotation, the second an unknown extension property.
pub fn simple_manifest() -> Value {
    json!({
        "@context": "http://iiif.io/api/presentation/3/context.json",
        "id": M1,
        "type": "Manifest",
        "label": {"en": ["Scrapbook, volume one"]},
        "summary": {"en": ["Clippings pasted over ledger pages"]},
        "metadata": [
            {"label": {"en": ["Author"]}, "value": {"en": ["Anonymous"]}}
        ],
        "rights": "http://creativecommons.org/licenses/by/4.0/",
        "navDate": "1856-01-01T00:00:00Z",
        "behavior": ["paged"],
        "viewingDirection": "left-to-right",
        "items": [
            {
                "id": C1,
                "type": "Canvas",
                "label": {"en": ["p. 1"]},
                "width": 1200,
                "height": 1600,
                "items": [
                    {
                        "id": PAGE1,
                        "type": "AnnotationPage",
                        "items": [
                            {
                                "id": ANNO1,
                                "type": "Annotation",
                                "motivation": "painting",
                                "body": {
                                    "id": "https://example.org/images/p1.jpg",
                                    "type": "Image",
                                    "format": "image/jpeg"
                                },
                                "target": C1
                            }
                        ]
                    }
                ]
            },
            {
                "id": C2,
                "type": "Canvas",
                "label": {"en": ["p. 2"]},
                "width": 1200,
                "height": 1600,
                "duration": 3,
                "exhibitNotes": {"conservation": "water damage, lower left"}
            }
        ],
        "structures": [
            {
                "id": R1,
                "type": "Range",
                "label": {"en": ["Front matter"]},
                "items": [
                    {"id": C1, "type": "Canvas"}
                ]
            }
        ]
    })
}

/// A Collection archive exercising both relationship kinds:
/// - `M1` is owned by the root collection and *referenced* by the
///   sub-collection (dual-key: parented and membered).
/// - `M2` is owned by the sub-collection with no membership anywhere
///   (parented yet orphan).
/// - `M_EXTERNAL` is referenced only (membership shell, no parent).
pub fn curated_archive() -> Value {
    json!({
        "@context": "http://iiif.io/api/presentation/3/context.json",
        "id": ROOT_COLL,
        "type": "Collection",
        "label": {"en": ["The archive"]},
        "items": [
            {
                "id": M1,
                "type": "Manifest",
                "label": {"en": ["Scrapbook, volume one"]},
                "items": [
                    {"id": C1, "type": "Canvas", "width": 1200, "height": 1600}
                ]
            },
            {
                "id": SUB_COLL,
                "type": "Collection",
                "label": {"en": ["Exhibits"]},
                "items": [
                    {
                        "id": M2,
                        "type": "Manifest",
                        "label": {"en": ["Loose photographs"]},
                        "items": []
                    },
                    {"id": M1, "type": "Manifest"}
                ]
            },
            {"id": M_EXTERNAL, "type": "Manifest"}
        ]
    })
}
