//! Layer 3: Descriptive value types
//!
//! LanguageMap: language tag -> list of strings (IIIF label/summary shape)
//! MetadataEntry: label/value pair of language maps

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// IIIF language map: `{"en": ["A title"], "none": ["—"]}`.
///
/// Keys are BCP 47 tags or `"none"`; values keep source order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageMap(BTreeMap<String, Vec<String>>);

impl LanguageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-language convenience constructor.
    pub fn single(lang: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(lang.into(), vec![value.into()]);
        Self(map)
    }

    pub fn get(&self, lang: &str) -> Option<&[String]> {
        self.0.get(lang).map(|v| v.as_slice())
    }

    pub fn insert(&mut self, lang: impl Into<String>, values: Vec<String>) {
        self.0.insert(lang.into(), values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for LanguageMap {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of a resource's descriptive metadata table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub label: LanguageMap,
    pub value: LanguageMap,
}

impl MetadataEntry {
    pub fn new(label: LanguageMap, value: LanguageMap) -> Self {
        Self { label, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_builds_one_entry() {
        let map = LanguageMap::single("en", "Title");
        assert_eq!(map.get("en"), Some(&["Title".to_string()][..]));
        assert_eq!(map.get("de"), None);
    }

    #[test]
    fn serde_is_transparent() {
        let map = LanguageMap::single("en", "Title");
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"en": ["Title"]}));
        let back: LanguageMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn metadata_entry_roundtrip() {
        let entry = MetadataEntry::new(
            LanguageMap::single("en", "Author"),
            LanguageMap::single("en", "Anonymous"),
        );
        let json = serde_json::to_value(&entry).unwrap();
        let back: MetadataEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn rejects_non_list_values() {
        assert!(serde_json::from_value::<LanguageMap>(serde_json::json!({"en": "Title"})).is_err());
    }
}
