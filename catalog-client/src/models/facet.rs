//! Facet Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FacetGroupId, FacetId, IdList};

/// Additional key/value metadata of a facet (e.g. a color's hex code)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOption {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Facet: one value of a facet group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    #[serde(rename = "facet_id", alias = "id")]
    pub id: FacetId,
    pub group_id: FacetGroupId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub options: Vec<FacetOption>,
}

impl Facet {
    /// Unique key of this facet across groups
    pub fn key(&self) -> FacetKey {
        FacetKey {
            id: self.id,
            group_id: self.group_id,
        }
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.iter().find(|o| o.key == key).map(|o| &o.value)
    }
}

/// (group id, facet id) pair, also used as parameter of single-facet lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacetKey {
    pub id: FacetId,
    pub group_id: FacetGroupId,
}

impl FacetKey {
    pub fn new(group_id: FacetGroupId, id: FacetId) -> Self {
        Self { id, group_id }
    }
}

impl From<FacetKey> for IdList<FacetKey> {
    fn from(key: FacetKey) -> Self {
        IdList::from(vec![key])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_facet_deserialize() {
        let facet: Facet = serde_json::from_value(json!({
            "facet_id": 570,
            "group_id": 1,
            "name": "Rot",
            "value": "red",
            "group_name": "color",
            "options": [{ "key": "hex", "value": "#ff0000" }]
        }))
        .unwrap();

        assert_eq!(facet.key(), FacetKey::new(1, 570));
        assert_eq!(facet.option("hex"), Some(&json!("#ff0000")));
        assert_eq!(facet.option("missing"), None);
    }
}
