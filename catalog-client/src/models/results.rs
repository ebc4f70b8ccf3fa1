//! Result containers for product lookups

use std::sync::Arc;

use serde_json::Value;

use super::category::Category;
use super::product::Product;
use crate::types::{CategoryId, ProductId};

/// Failure reported for a single item of a batch section
#[derive(Debug, Clone, PartialEq)]
pub struct ItemError {
    /// Product id or ean the failure belongs to
    pub reference: String,
    pub code: i64,
    pub message: String,
    pub raw: Value,
}

/// Result of a lookup by product ids
#[derive(Debug, Clone, Default)]
pub struct ProductsResult {
    /// Found products, in the order they were requested
    pub products: Vec<Product>,
    pub products_not_found: Vec<ProductId>,
    pub errors: Vec<ItemError>,
    pub page_hash: Option<String>,
}

impl ProductsResult {
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Result of a lookup by variant eans
#[derive(Debug, Clone, Default)]
pub struct ProductsEansResult {
    pub products: Vec<Product>,
    pub eans_not_found: Vec<String>,
    pub errors: Vec<ItemError>,
    pub page_hash: Option<String>,
}

impl ProductsEansResult {
    /// Products owning a variant with `ean`
    pub fn products_by_ean(&self, ean: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| !p.variants_by_ean(ean).is_empty())
            .collect()
    }
}

/// Categories looked up by id in the category manager
#[derive(Debug, Clone, Default)]
pub struct CategoriesResult {
    pub categories: Vec<Arc<Category>>,
    pub categories_not_found: Vec<CategoryId>,
}

impl CategoriesResult {
    pub fn category(&self, id: CategoryId) -> Option<&Arc<Category>> {
        self.categories.iter().find(|c| c.id() == id)
    }
}
