pub mod trees;

use iiif_vault::ResourceId;

pub fn rid(s: &str) -> ResourceId {
    ResourceId::parse(s).unwrap()
}
