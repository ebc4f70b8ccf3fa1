//! Per-item results of an executed batch

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{
    Autocomplete, Category, Facet, ProductSearchResult, ProductsEansResult, ProductsResult,
};
use crate::types::FacetId;

/// Result of one declared request item, in declaration order
#[derive(Debug, Clone)]
pub enum QueryResult {
    Products(ProductsResult),
    ProductsEans(ProductsEansResult),
    ProductSearch(ProductSearchResult),
    Autocomplete(Autocomplete),
    Suggest(Vec<String>),
    /// Root categories of the freshly cached tree (active only)
    CategoryTree(Vec<Arc<Category>>),
    /// Cached facets of the requested groups, by facet id
    Facets(BTreeMap<FacetId, Arc<Facet>>),
    /// Facets of a single-facet lookup; not cached
    Facet(Vec<Facet>),
}

impl QueryResult {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryResult::Products(_) => "products",
            QueryResult::ProductsEans(_) => "products_eans",
            QueryResult::ProductSearch(_) => "product_search",
            QueryResult::Autocomplete(_) => "autocompletion",
            QueryResult::Suggest(_) => "suggest",
            QueryResult::CategoryTree(_) => "category_tree",
            QueryResult::Facets(_) => "facets",
            QueryResult::Facet(_) => "facet",
        }
    }

    pub fn into_products(self) -> Option<ProductsResult> {
        match self {
            QueryResult::Products(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_products_eans(self) -> Option<ProductsEansResult> {
        match self {
            QueryResult::ProductsEans(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_product_search(self) -> Option<ProductSearchResult> {
        match self {
            QueryResult::ProductSearch(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_autocomplete(self) -> Option<Autocomplete> {
        match self {
            QueryResult::Autocomplete(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_suggest(self) -> Option<Vec<String>> {
        match self {
            QueryResult::Suggest(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_category_tree(self) -> Option<Vec<Arc<Category>>> {
        match self {
            QueryResult::CategoryTree(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_facets(self) -> Option<BTreeMap<FacetId, Arc<Facet>>> {
        match self {
            QueryResult::Facets(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_facet(self) -> Option<Vec<Facet>> {
        match self {
            QueryResult::Facet(r) => Some(r),
            _ => None,
        }
    }
}
