//! Model Factory - builds domain models from response sections
//!
//! The factory owns the client's caches and image url prefix. Models keep a
//! [`FactoryHandle`] (a weak reference) so accessors like `Product::brand()`
//! can consult the caches without keeping the client alive.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Weak};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::manager::{CategoryManager, FacetManager};
use crate::models::category::RawCategory;
use crate::models::image::RawImage;
use crate::models::product::RawProduct;
use crate::models::search::{RawAutocomplete, RawSearch};
use crate::models::variant::RawVariant;
use crate::models::{
    ACTIVE_ONLY, Autocomplete, CategoryTree, Facet, FacetIdSource, Image, ImageUrlPrefix, ItemError,
    Product, ProductSearchResult, ProductsEansResult, ProductsResult, Variant, error_message_text,
};
use crate::types::{CategoryId, FACET_BRAND, FacetGroupId, FacetIds, ProductId};
use crate::{CatalogError, CatalogResult};

/// Prefix of the keys in `attributes` / `attributes_merged` maps
const ATTRIBUTE_KEY_PREFIX: &str = "attributes_";

/// Prefix of the app-specific key holding a product's category paths
const CATEGORY_KEY_PREFIX: &str = "categories";

/// Shapes a product's facet ids are read from, in priority order.
/// The first shape present wins; shapes are never combined.
const FACET_ID_SHAPES: [FacetIdSource; 4] = [
    FacetIdSource::AttributesMerged,
    FacetIdSource::Variants,
    FacetIdSource::DefaultVariant,
    FacetIdSource::Brand,
];

#[derive(Debug)]
pub(crate) struct FactoryShared {
    category_manager: CategoryManager,
    facet_manager: FacetManager,
    image_prefix: ImageUrlPrefix,
}

/// Builds products, variants, images, categories and facets.
///
/// Cloning is cheap; clones share the caches.
#[derive(Debug, Clone)]
pub struct ModelFactory {
    shared: Arc<FactoryShared>,
}

/// Non-owning reference from a model back to its factory
#[derive(Clone, Default)]
pub struct FactoryHandle(Weak<FactoryShared>);

impl std::fmt::Debug for FactoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryHandle")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

impl FactoryHandle {
    pub fn with_category_manager<R>(&self, f: impl FnOnce(&CategoryManager) -> R) -> Option<R> {
        self.0.upgrade().map(|shared| f(&shared.category_manager))
    }

    pub fn with_facet_manager<R>(&self, f: impl FnOnce(&FacetManager) -> R) -> Option<R> {
        self.0.upgrade().map(|shared| f(&shared.facet_manager))
    }

    /// Cached facets for `ids`; ids the facet manager does not know are skipped
    pub fn resolve_facets(&self, ids: &FacetIds) -> Vec<Arc<Facet>> {
        self.with_facet_manager(|fm| {
            ids.iter()
                .flat_map(|(group_id, facet_ids)| {
                    facet_ids.iter().filter_map(move |id| fm.get_facet(*group_id, *id))
                })
                .collect()
        })
        .unwrap_or_default()
    }
}

impl ModelFactory {
    pub fn new(image_prefix: ImageUrlPrefix) -> Self {
        Self {
            shared: Arc::new(FactoryShared {
                category_manager: CategoryManager::new(),
                facet_manager: FacetManager::new(),
                image_prefix,
            }),
        }
    }

    pub fn category_manager(&self) -> &CategoryManager {
        &self.shared.category_manager
    }

    pub fn facet_manager(&self) -> &FacetManager {
        &self.shared.facet_manager
    }

    pub fn image_prefix(&self) -> &ImageUrlPrefix {
        &self.shared.image_prefix
    }

    pub fn handle(&self) -> FactoryHandle {
        FactoryHandle(Arc::downgrade(&self.shared))
    }

    // ========== Single models ==========

    pub fn create_product(&self, json: &Value) -> CatalogResult<Product> {
        self.build_product(parse("product", json)?)
    }

    pub fn create_variant(&self, json: &Value) -> CatalogResult<Variant> {
        self.build_variant(parse("variant", json)?)
    }

    pub fn create_image(&self, json: &Value) -> CatalogResult<Image> {
        Ok(self.build_image(parse("image", json)?))
    }

    /// Category forest of a `category_tree` section: a list of root nodes,
    /// optionally wrapped as `{"tree": [...]}`
    pub fn create_category_tree(&self, json: &Value) -> CatalogResult<CategoryTree> {
        let raw: Vec<RawCategory> = parse("category_tree", json.get("tree").unwrap_or(json))?;
        CategoryTree::from_raw(raw).map_err(CatalogError::Parse)
    }

    /// Facets of a `facets` or `facet` section: a list, or `{"facet": [...]}`
    pub fn create_facets(&self, json: &Value) -> CatalogResult<Vec<Facet>> {
        parse("facets", json.get("facet").unwrap_or(json))
    }

    // ========== Results ==========

    /// `products` section: `{"ids": {"<id>": product | error}, "pageHash": ...}`.
    ///
    /// Products follow the order of `requested`; ids the section reports
    /// without being asked for are appended.
    pub fn create_products_result(
        &self,
        json: &Value,
        requested: &[ProductId],
    ) -> CatalogResult<ProductsResult> {
        #[derive(Deserialize)]
        struct RawProducts {
            #[serde(default)]
            ids: BTreeMap<String, Value>,
            #[serde(default, rename = "pageHash")]
            page_hash: Option<String>,
        }

        let raw: RawProducts = parse("products", json)?;
        let mut entries: Vec<(ProductId, Value)> = Vec::with_capacity(raw.ids.len());
        for (key, value) in raw.ids {
            let id = key
                .parse::<ProductId>()
                .map_err(|_| CatalogError::parse(format!("products: invalid product id `{}`", key)))?;
            entries.push((id, value));
        }
        entries.sort_by_key(|(id, _)| {
            requested
                .iter()
                .position(|r| r == id)
                .unwrap_or(requested.len())
        });

        let mut result = ProductsResult {
            page_hash: raw.page_hash,
            ..Default::default()
        };
        for (id, item) in entries {
            match item_error(id.to_string(), &item) {
                Some(error) => {
                    result.products_not_found.push(id);
                    result.errors.push(error);
                }
                None => result.products.push(self.create_product(&item)?),
            }
        }
        Ok(result)
    }

    /// `products_eans` section: `{"eans": [product | error], "pageHash": ...}`
    pub fn create_products_eans_result(&self, json: &Value) -> CatalogResult<ProductsEansResult> {
        #[derive(Deserialize)]
        struct RawEans {
            #[serde(default)]
            eans: Vec<Value>,
            #[serde(default, rename = "pageHash")]
            page_hash: Option<String>,
        }

        let raw: RawEans = parse("products_eans", json)?;
        let mut result = ProductsEansResult {
            page_hash: raw.page_hash,
            ..Default::default()
        };
        for item in raw.eans {
            // the failing ean comes as a string or as a list of strings
            let eans: Vec<String> = match item.get("ean") {
                Some(Value::Array(list)) => list.iter().map(ean_text).collect(),
                Some(ean) => vec![ean_text(ean)],
                None => Vec::new(),
            };
            match item_error(eans.join(","), &item) {
                Some(error) => {
                    result.eans_not_found.extend(eans);
                    result.errors.push(error);
                }
                None => result.products.push(self.create_product(&item)?),
            }
        }
        Ok(result)
    }

    pub fn create_product_search_result(&self, json: &Value) -> CatalogResult<ProductSearchResult> {
        let raw: RawSearch = parse("product_search", json)?;
        let mut result = ProductSearchResult {
            page_hash: raw.page_hash,
            product_count: raw.product_count,
            products: raw
                .products
                .iter()
                .map(|p| self.create_product(p))
                .collect::<CatalogResult<_>>()?,
            ..Default::default()
        };
        result
            .apply_aggregations(raw.facets)
            .map_err(CatalogError::Parse)?;
        Ok(result)
    }

    /// `autocompletion` section; categories are resolved through the category manager
    pub fn create_autocomplete(&self, json: &Value) -> CatalogResult<Autocomplete> {
        let raw: RawAutocomplete = parse("autocompletion", json)?;
        let products = raw
            .products
            .map(|list| {
                list.iter()
                    .map(|p| self.create_product(p))
                    .collect::<CatalogResult<Vec<_>>>()
            })
            .transpose()?;
        let categories = raw.categories.map(|list| {
            let ids: Vec<CategoryId> = list.iter().map(|c| c.id).collect();
            self.category_manager().get_categories(&ids, ACTIVE_ONLY)
        });
        Ok(Autocomplete {
            products,
            categories,
        })
    }

    /// `suggest` section: a plain list of search terms
    pub fn create_suggest(&self, json: &Value) -> CatalogResult<Vec<String>> {
        parse("suggest", json)
    }

    // ========== Raw conversion ==========

    fn build_image(&self, raw: RawImage) -> Image {
        Image::from_raw(raw, self.shared.image_prefix.clone())
    }

    fn build_variant(&self, raw: RawVariant) -> CatalogResult<Variant> {
        let facet_ids = match &raw.attributes {
            Some(attributes) => parse_attributes(attributes)?,
            None => FacetIds::new(),
        };
        Ok(Variant {
            id: raw.id,
            ean: raw.ean,
            price: raw.price,
            old_price: raw.old_price,
            retail_price: raw.retail_price,
            quantity: raw.quantity,
            is_default: raw.default,
            images: raw.images.into_iter().map(|i| self.build_image(i)).collect(),
            facet_ids,
            factory: self.handle(),
        })
    }

    /// Non-empty list -> owned variants, anything else -> `None`
    fn build_variants(&self, raw: Option<Vec<RawVariant>>) -> CatalogResult<Option<Vec<Variant>>> {
        match raw {
            Some(list) if !list.is_empty() => list
                .into_iter()
                .map(|v| self.build_variant(v))
                .collect::<CatalogResult<Vec<_>>>()
                .map(Some),
            _ => Ok(None),
        }
    }

    fn build_product(&self, raw: RawProduct) -> CatalogResult<Product> {
        let facets = extract_facet_ids(&raw)?;
        let category_id_paths = category_paths(&raw.extra)?;

        let styles = match raw.styles {
            Some(list) if !list.is_empty() => Some(
                list.into_iter()
                    .map(|p| self.build_product(p))
                    .collect::<CatalogResult<Vec<_>>>()?,
            ),
            _ => None,
        };

        Ok(Product {
            id: raw.id,
            name: raw.name,
            active: raw.active.unwrap_or(true),
            sale: raw.sale,
            description_short: raw.description_short,
            description_long: raw.description_long,
            brand_id: raw.brand_id,
            merchant_id: raw.merchant_id,
            min_price: raw.min_price,
            max_price: raw.max_price,
            max_savings: raw.max_savings,
            max_savings_percentage: raw.max_savings_percentage,
            default_image: raw.default_image.map(|i| self.build_image(i)),
            default_variant: raw.default_variant.map(|v| self.build_variant(v)).transpose()?,
            variants: self.build_variants(raw.variants)?,
            inactive_variants: self.build_variants(raw.inactive_variants)?,
            styles,
            category_id_paths,
            facet_id_source: facets.as_ref().map(|(source, _)| *source),
            facet_ids: facets.map(|(_, ids)| ids),
            factory: self.handle(),
        })
    }
}

fn parse<T: DeserializeOwned>(what: &str, json: &Value) -> CatalogResult<T> {
    T::deserialize(json).map_err(|e| CatalogError::parse(format!("{}: {}", what, e)))
}

/// Per-item failure marker inside a section
fn item_error(reference: String, item: &Value) -> Option<ItemError> {
    let code = item.get("error_code")?;
    Some(ItemError {
        reference,
        code: code.as_i64().unwrap_or_default(),
        message: error_message_text(item.get("error_message")),
        raw: item.clone(),
    })
}

fn ean_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `{"attributes_206": [123, 234]}` -> `{206: {123, 234}}`
fn parse_attributes(attributes: &BTreeMap<String, Vec<i64>>) -> CatalogResult<FacetIds> {
    let mut ids = FacetIds::new();
    for (key, facet_ids) in attributes {
        let group = key.strip_prefix(ATTRIBUTE_KEY_PREFIX).unwrap_or(key);
        let group_id: FacetGroupId = group
            .parse()
            .map_err(|_| CatalogError::parse(format!("invalid attribute key `{}`", key)))?;
        ids.entry(group_id).or_default().extend(facet_ids.iter().copied());
    }
    Ok(ids)
}

fn extract_facet_ids(raw: &RawProduct) -> CatalogResult<Option<(FacetIdSource, FacetIds)>> {
    for shape in FACET_ID_SHAPES {
        let ids = match shape {
            FacetIdSource::AttributesMerged => {
                raw.attributes_merged.as_ref().map(parse_attributes).transpose()?
            }
            FacetIdSource::Variants => match raw.variants.as_deref() {
                Some(variants) => {
                    let mut merged = FacetIds::new();
                    for variant in variants {
                        if let Some(attributes) = &variant.attributes {
                            for (group_id, facet_ids) in parse_attributes(attributes)? {
                                merged.entry(group_id).or_default().extend(facet_ids);
                            }
                        }
                    }
                    Some(merged)
                }
                None => None,
            },
            FacetIdSource::DefaultVariant => match &raw.default_variant {
                Some(variant) => Some(match &variant.attributes {
                    Some(attributes) => parse_attributes(attributes)?,
                    None => FacetIds::new(),
                }),
                None => None,
            },
            FacetIdSource::Brand => raw
                .brand_id
                .map(|brand_id| FacetIds::from([(FACET_BRAND, BTreeSet::from([brand_id]))])),
        };
        if let Some(ids) = ids {
            return Ok(Some((shape, ids)));
        }
    }
    Ok(None)
}

/// Paths under the first key starting with `categories`
fn category_paths(extra: &BTreeMap<String, Value>) -> CatalogResult<Option<Vec<Vec<CategoryId>>>> {
    match extra
        .iter()
        .find(|(key, _)| key.starts_with(CATEGORY_KEY_PREFIX))
    {
        Some((_, Value::Null)) | None => Ok(None),
        Some((key, value)) => parse(key, value).map(Some),
    }
}
