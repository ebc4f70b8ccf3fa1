//! Product search criteria
//!
//! Serializes to the body of a `product_search` request item:
//!
//! ```json
//! {
//!   "session_id": "...",
//!   "filter": { "categories": [74415], "facets": { "0": [264] }, "searchword": "shirt" },
//!   "result": { "fields": ["brand_id"], "limit": 20, "sort": { "by": "price", "direction": "asc" } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fields::{self, ProductField};
use crate::types::{CategoryId, FacetGroupId, FacetId};

/// Key selecting every facet group in a result facet request
pub const ALL_FACET_GROUPS: &str = "_all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Relevance,
    UpdatedDate,
    CreatedDate,
    MostViewed,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub by: SortBy,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetLimit {
    pub limit: u32,
}

/// Narrowing part of a search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<BTreeMap<FacetGroupId, Vec<FacetId>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<PriceFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchword: Option<String>,
}

/// What the search delivers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ProductField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    /// Facet aggregations per group id (or [`ALL_FACET_GROUPS`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<BTreeMap<String, FacetLimit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<bool>,
}

/// Builder for a product search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSearchCriteria {
    pub session_id: String,
    #[serde(default)]
    pub filter: SearchFilter,
    #[serde(default)]
    pub result: SearchResultSpec,
}

impl ProductSearchCriteria {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            filter: SearchFilter::default(),
            result: SearchResultSpec::default(),
        }
    }

    // ========== Filter ==========

    pub fn filter_by_categories(mut self, ids: impl Into<Vec<CategoryId>>) -> Self {
        self.filter.categories = Some(ids.into());
        self
    }

    /// Restricts hits to products carrying any of `facet_ids` in `group_id`
    pub fn filter_by_facets(mut self, group_id: FacetGroupId, facet_ids: impl Into<Vec<FacetId>>) -> Self {
        self.filter
            .facets
            .get_or_insert_with(BTreeMap::new)
            .insert(group_id, facet_ids.into());
        self
    }

    pub fn filter_by_price_range(mut self, from: Option<i64>, to: Option<i64>) -> Self {
        self.filter.prices = Some(PriceFilter { from, to });
        self
    }

    pub fn filter_by_sale(mut self, sale: bool) -> Self {
        self.filter.sale = Some(sale);
        self
    }

    pub fn filter_by_searchword(mut self, searchword: impl Into<String>) -> Self {
        self.filter.searchword = Some(searchword.into());
        self
    }

    // ========== Result ==========

    pub fn select_product_fields(mut self, fields: &[ProductField]) -> Self {
        self.result.fields = fields::filter_fields(fields);
        self
    }

    pub fn set_limit(mut self, limit: u32, offset: u32) -> Self {
        self.result.limit = Some(limit);
        self.result.offset = Some(offset);
        self
    }

    pub fn sort_by(mut self, by: SortBy, direction: SortDirection) -> Self {
        self.result.sort = Some(Sort { by, direction });
        self
    }

    pub fn select_facets_by_group_id(mut self, group_id: FacetGroupId, limit: u32) -> Self {
        self.result
            .facets
            .get_or_insert_with(BTreeMap::new)
            .insert(group_id.to_string(), FacetLimit { limit });
        self
    }

    pub fn select_all_facets(mut self, limit: u32) -> Self {
        self.result.facets = Some(BTreeMap::from([(
            ALL_FACET_GROUPS.to_string(),
            FacetLimit { limit },
        )]));
        self
    }

    pub fn select_categories(mut self, enable: bool) -> Self {
        self.result.categories = Some(enable);
        self
    }

    pub fn select_price_ranges(mut self, enable: bool) -> Self {
        self.result.price = Some(enable);
        self
    }

    pub fn select_sale(mut self, enable: bool) -> Self {
        self.result.sale = Some(enable);
        self
    }

    /// Product fields or category aggregation need the category tree
    pub fn requires_categories(&self) -> bool {
        fields::requires_categories(&self.result.fields) || self.result.categories == Some(true)
    }

    /// Product fields or facet aggregations need the facets
    pub fn requires_facets(&self) -> bool {
        fields::requires_facets(&self.result.fields)
            || self.result.facets.as_ref().is_some_and(|f| !f.is_empty())
    }
}

/// Kinds of autocomplete suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutocompleteType {
    Products,
    Categories,
}

impl AutocompleteType {
    pub const ALL: [AutocompleteType; 2] = [AutocompleteType::Products, AutocompleteType::Categories];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let criteria = ProductSearchCriteria::new("session-1")
            .filter_by_categories(vec![74415])
            .filter_by_facets(0, vec![264, 301])
            .filter_by_searchword("shirt")
            .select_product_fields(&[ProductField::BrandId, ProductField::BrandId])
            .set_limit(20, 40)
            .sort_by(SortBy::Price, SortDirection::Asc)
            .select_facets_by_group_id(1, 5);

        assert_eq!(
            serde_json::to_value(&criteria).unwrap(),
            json!({
                "session_id": "session-1",
                "filter": {
                    "categories": [74415],
                    "facets": { "0": [264, 301] },
                    "searchword": "shirt"
                },
                "result": {
                    "fields": ["brand_id"],
                    "limit": 20,
                    "offset": 40,
                    "sort": { "by": "price", "direction": "asc" },
                    "facets": { "1": { "limit": 5 } }
                }
            })
        );
    }

    #[test]
    fn test_requirements() {
        let plain = ProductSearchCriteria::new("s").select_product_fields(&[ProductField::Name]);
        assert!(!plain.requires_categories());
        assert!(!plain.requires_facets());

        let categories = plain.clone().select_categories(true);
        assert!(categories.requires_categories());

        let facets = plain.select_all_facets(10);
        assert!(facets.requires_facets());
        assert_eq!(
            serde_json::to_value(&facets.result.facets).unwrap(),
            json!({ "_all": { "limit": 10 } })
        );
    }
}
