//! Product search and autocomplete results

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::category::Category;
use super::product::Product;
use crate::types::{CategoryId, FacetGroupId, FacetId};

/// Number of hits for one term of a facet aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TermCount {
    #[serde(deserialize_with = "lenient_i64")]
    pub term: i64,
    pub count: u64,
}

/// Aggregated hits of one facet group
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacetCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub other: u64,
    #[serde(default)]
    pub missing: u64,
    #[serde(default)]
    pub terms: Vec<TermCount>,
}

impl FacetCounts {
    pub fn count_for(&self, facet_id: FacetId) -> u64 {
        self.terms
            .iter()
            .find(|t| t.term == facet_id)
            .map(|t| t.count)
            .unwrap_or(0)
    }
}

/// Hits inside one price range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

/// Hits split by sale flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaleCounts {
    pub sale: u64,
    pub not_sale: u64,
    pub total: u64,
}

/// Raw `product_search` section
#[derive(Debug, Deserialize)]
pub(crate) struct RawSearch {
    #[serde(default, rename = "pageHash")]
    pub page_hash: Option<String>,
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub products: Vec<Value>,
    #[serde(default)]
    pub facets: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawPrices {
    #[serde(default)]
    ranges: Vec<PriceRange>,
}

/// Result of a product search
#[derive(Debug, Clone, Default)]
pub struct ProductSearchResult {
    pub page_hash: Option<String>,
    pub product_count: u64,
    pub products: Vec<Product>,
    pub facet_counts: BTreeMap<FacetGroupId, FacetCounts>,
    pub category_counts: Vec<TermCount>,
    pub price_ranges: Vec<PriceRange>,
    pub sale_counts: Option<SaleCounts>,
}

impl ProductSearchResult {
    /// Splits the aggregation map into facet groups, categories, prices and sale counts
    pub(crate) fn apply_aggregations(&mut self, facets: BTreeMap<String, Value>) -> Result<(), String> {
        for (key, value) in facets {
            match key.as_str() {
                "categories" => {
                    let counts: FacetCounts = parse(&key, value)?;
                    self.category_counts = counts.terms;
                }
                "prices" => {
                    let prices: RawPrices = parse(&key, value)?;
                    self.price_ranges = prices.ranges;
                }
                "sale" => {
                    let counts: FacetCounts = parse(&key, value)?;
                    let sale = counts.count_for(1);
                    let not_sale = counts.count_for(0);
                    self.sale_counts = Some(SaleCounts {
                        sale,
                        not_sale,
                        total: counts.total.max(sale + not_sale),
                    });
                }
                group => match group.parse::<FacetGroupId>() {
                    Ok(group_id) => {
                        self.facet_counts.insert(group_id, parse(&key, value)?);
                    }
                    Err(_) => tracing::debug!(key = group, "ignoring unknown search aggregation"),
                },
            }
        }
        Ok(())
    }

    pub fn category_count(&self, id: CategoryId) -> u64 {
        self.category_counts
            .iter()
            .find(|t| t.term == id)
            .map(|t| t.count)
            .unwrap_or(0)
    }
}

fn parse<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| format!("search aggregation `{}`: {}", key, e))
}

/// Terms come as numbers, numeric strings or booleans depending on the aggregation
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().ok_or_else(|| D::Error::custom("term out of range")),
        Value::String(s) => match s.as_str() {
            "T" | "true" => Ok(1),
            "F" | "false" => Ok(0),
            other => other.parse().map_err(D::Error::custom),
        },
        Value::Bool(b) => Ok(i64::from(b)),
        other => Err(D::Error::custom(format!("unexpected term {}", other))),
    }
}

/// Raw `autocompletion` section
#[derive(Debug, Deserialize)]
pub(crate) struct RawAutocomplete {
    #[serde(default)]
    pub products: Option<Vec<Value>>,
    #[serde(default)]
    pub categories: Option<Vec<RawAutocompleteCategory>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAutocompleteCategory {
    pub id: CategoryId,
}

/// Result of an autocomplete request; a list is `None` when its type was not requested
#[derive(Debug, Clone, Default)]
pub struct Autocomplete {
    pub products: Option<Vec<Product>>,
    pub categories: Option<Vec<Arc<Category>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aggregations() {
        let mut result = ProductSearchResult::default();
        let facets: BTreeMap<String, Value> = serde_json::from_value(json!({
            "0": { "total": 12, "terms": [{ "term": "264", "count": 7 }, { "term": 301, "count": 5 }] },
            "categories": { "terms": [{ "term": "74415", "count": 3 }] },
            "prices": { "ranges": [{ "from": 0, "to": 1000, "count": 4, "min": 399, "max": 999 }] },
            "sale": { "total": 12, "terms": [{ "term": "T", "count": 2 }, { "term": "F", "count": 10 }] },
            "unknown_key": {}
        }))
        .unwrap();

        result.apply_aggregations(facets).unwrap();

        assert_eq!(result.facet_counts[&0].count_for(264), 7);
        assert_eq!(result.facet_counts[&0].count_for(301), 5);
        assert_eq!(result.category_count(74415), 3);
        assert_eq!(result.price_ranges[0].max, Some(999));
        assert_eq!(
            result.sale_counts,
            Some(SaleCounts { sale: 2, not_sale: 10, total: 12 })
        );
    }

    #[test]
    fn test_malformed_aggregation() {
        let mut result = ProductSearchResult::default();
        let facets = BTreeMap::from([("5".to_string(), json!({ "terms": "nope" }))]);
        assert!(result.apply_aggregations(facets).is_err());
    }
}
