//! Product Model

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::category::{ACTIVE_ONLY, Category};
use super::facet::Facet;
use super::image::{Image, RawImage};
use super::variant::{RawVariant, Variant};
use crate::factory::FactoryHandle;
use crate::types::{CategoryId, FACET_BRAND, FacetGroupId, FacetIds, ProductId, VariantId};

/// Raw product fragment.
///
/// Unknown keys land in `extra`; the category paths live under an
/// app-specific key starting with `categories`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawProduct {
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub sale: Option<bool>,
    #[serde(default)]
    pub description_short: Option<String>,
    #[serde(default)]
    pub description_long: Option<String>,
    #[serde(default)]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub merchant_id: Option<i64>,
    #[serde(default)]
    pub min_price: Option<i64>,
    #[serde(default)]
    pub max_price: Option<i64>,
    #[serde(default)]
    pub max_savings: Option<i64>,
    #[serde(default)]
    pub max_savings_percentage: Option<f64>,
    #[serde(default)]
    pub default_image: Option<RawImage>,
    #[serde(default)]
    pub default_variant: Option<RawVariant>,
    #[serde(default)]
    pub variants: Option<Vec<RawVariant>>,
    #[serde(default)]
    pub inactive_variants: Option<Vec<RawVariant>>,
    #[serde(default)]
    pub styles: Option<Vec<RawProduct>>,
    #[serde(default)]
    pub attributes_merged: Option<BTreeMap<String, Vec<i64>>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Which JSON shape the product's facet ids were read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetIdSource {
    AttributesMerged,
    Variants,
    DefaultVariant,
    Brand,
}

/// Catalog product
#[derive(Debug, Clone)]
pub struct Product {
    pub(crate) id: ProductId,
    pub(crate) name: Option<String>,
    pub(crate) active: bool,
    pub(crate) sale: Option<bool>,
    pub(crate) description_short: Option<String>,
    pub(crate) description_long: Option<String>,
    pub(crate) brand_id: Option<i64>,
    pub(crate) merchant_id: Option<i64>,
    pub(crate) min_price: Option<i64>,
    pub(crate) max_price: Option<i64>,
    pub(crate) max_savings: Option<i64>,
    pub(crate) max_savings_percentage: Option<f64>,
    pub(crate) default_image: Option<Image>,
    pub(crate) default_variant: Option<Variant>,
    pub(crate) variants: Option<Vec<Variant>>,
    pub(crate) inactive_variants: Option<Vec<Variant>>,
    pub(crate) styles: Option<Vec<Product>>,
    pub(crate) category_id_paths: Option<Vec<Vec<CategoryId>>>,
    pub(crate) facet_ids: Option<FacetIds>,
    pub(crate) facet_id_source: Option<FacetIdSource>,
    pub(crate) factory: FactoryHandle,
}

impl Product {
    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_sale(&self) -> Option<bool> {
        self.sale
    }

    pub fn description_short(&self) -> Option<&str> {
        self.description_short.as_deref()
    }

    pub fn description_long(&self) -> Option<&str> {
        self.description_long.as_deref()
    }

    pub fn brand_id(&self) -> Option<i64> {
        self.brand_id
    }

    pub fn merchant_id(&self) -> Option<i64> {
        self.merchant_id
    }

    /// Lowest variant price in cents
    pub fn min_price(&self) -> Option<i64> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<i64> {
        self.max_price
    }

    pub fn max_savings(&self) -> Option<i64> {
        self.max_savings
    }

    pub fn max_savings_percentage(&self) -> Option<f64> {
        self.max_savings_percentage
    }

    pub fn default_image(&self) -> Option<&Image> {
        self.default_image.as_ref()
    }

    pub fn default_variant(&self) -> Option<&Variant> {
        self.default_variant.as_ref()
    }

    /// `None` when the response carried no variants (e.g. the field was not requested)
    pub fn variants(&self) -> Option<&[Variant]> {
        self.variants.as_deref()
    }

    pub fn inactive_variants(&self) -> Option<&[Variant]> {
        self.inactive_variants.as_deref()
    }

    /// Style siblings, full products in their own right
    pub fn styles(&self) -> Option<&[Product]> {
        self.styles.as_deref()
    }

    pub fn variant_by_id(&self, variant_id: VariantId) -> Option<&Variant> {
        self.variants
            .as_deref()
            .and_then(|variants| variants.iter().find(|v| v.id == variant_id))
    }

    pub fn variants_by_ean(&self, ean: &str) -> Vec<&Variant> {
        self.variants
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|v| v.ean.as_deref() == Some(ean))
            .collect()
    }

    // ---- facets ----

    /// Facet ids per group; `None` when no facet shape was present
    pub fn facet_ids(&self) -> Option<&FacetIds> {
        self.facet_ids.as_ref()
    }

    pub fn facet_id_source(&self) -> Option<FacetIdSource> {
        self.facet_id_source
    }

    /// Brand facet, resolved through the facet manager
    pub fn brand(&self) -> Option<Arc<Facet>> {
        let brand_id = self.brand_id?;
        self.factory
            .with_facet_manager(|fm| fm.get_facet(FACET_BRAND, brand_id))
            .flatten()
    }

    /// All facets of this product known to the facet manager
    pub fn facets(&self) -> Vec<Arc<Facet>> {
        match &self.facet_ids {
            Some(ids) => self.factory.resolve_facets(ids),
            None => Vec::new(),
        }
    }

    /// Known facets grouped by facet group
    pub fn facet_groups(&self) -> BTreeMap<FacetGroupId, Vec<Arc<Facet>>> {
        let mut groups: BTreeMap<FacetGroupId, Vec<Arc<Facet>>> = BTreeMap::new();
        for facet in self.facets() {
            groups.entry(facet.group_id).or_default().push(facet);
        }
        groups
    }

    // ---- categories ----

    pub fn category_id_paths(&self) -> Option<&[Vec<CategoryId>]> {
        self.category_id_paths.as_deref()
    }

    /// First id of every path, without duplicates
    pub fn root_category_ids(&self) -> Vec<CategoryId> {
        let mut ids: Vec<CategoryId> = Vec::new();
        for id in self.paths().iter().filter_map(|p| p.first()) {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    /// Last id of every path
    pub fn leaf_category_ids(&self) -> Vec<CategoryId> {
        self.paths().iter().filter_map(|p| p.last().copied()).collect()
    }

    /// Root categories of this product
    pub fn root_categories(&self, active_only: bool) -> Vec<Arc<Category>> {
        let ids = self.root_category_ids();
        self.factory
            .with_category_manager(|cm| cm.get_categories(&ids, active_only))
            .unwrap_or_default()
    }

    /// Root categories, active only
    pub fn categories(&self) -> Vec<Arc<Category>> {
        self.root_categories(ACTIVE_ONLY)
    }

    /// Categories without sub categories: for the paths
    /// Women > Shoes > Boots and Women > Shoes > Heels that is [Boots, Heels]
    pub fn leaf_categories(&self, active_only: bool) -> Vec<Arc<Category>> {
        let ids = self.leaf_category_ids();
        self.factory
            .with_category_manager(|cm| cm.get_categories(&ids, active_only))
            .unwrap_or_default()
    }

    /// First leaf category
    pub fn category(&self, active_only: bool) -> Option<Arc<Category>> {
        self.leaf_categories(active_only).into_iter().next()
    }

    /// Leaf of the longest path whose leaf is path-active
    pub fn category_with_longest_active_path(&self) -> Option<Arc<Category>> {
        let mut paths: Vec<&Vec<CategoryId>> = self.paths().iter().collect();
        // stable sort keeps the response order among equally long paths
        paths.sort_by(|a, b| b.len().cmp(&a.len()));

        self.factory
            .with_category_manager(|cm| {
                paths
                    .iter()
                    .filter_map(|path| path.last())
                    .filter_map(|leaf| cm.get_category(*leaf, ACTIVE_ONLY))
                    .find(|category| category.is_path_active())
            })
            .flatten()
    }

    fn paths(&self) -> &[Vec<CategoryId>] {
        self.category_id_paths.as_deref().unwrap_or_default()
    }
}
