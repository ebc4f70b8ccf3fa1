//! Variant Model

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use super::facet::Facet;
use super::image::{Image, RawImage};
use crate::factory::FactoryHandle;
use crate::types::{FacetGroupId, FacetIds, VariantId};

/// Raw variant fragment
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawVariant {
    pub id: VariantId,
    #[serde(default)]
    pub ean: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub old_price: Option<i64>,
    #[serde(default)]
    pub retail_price: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub images: Vec<RawImage>,
    /// `{"attributes_<group id>": [facet ids]}`
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, Vec<i64>>>,
}

/// Product variant (a concrete size/color combination), owned by its product
#[derive(Debug, Clone)]
pub struct Variant {
    pub(crate) id: VariantId,
    pub(crate) ean: Option<String>,
    pub(crate) price: Option<i64>,
    pub(crate) old_price: Option<i64>,
    pub(crate) retail_price: Option<i64>,
    pub(crate) quantity: Option<i64>,
    pub(crate) is_default: bool,
    pub(crate) images: Vec<Image>,
    pub(crate) facet_ids: FacetIds,
    pub(crate) factory: FactoryHandle,
}

impl Variant {
    pub fn id(&self) -> VariantId {
        self.id
    }

    pub fn ean(&self) -> Option<&str> {
        self.ean.as_deref()
    }

    /// Price in cents
    pub fn price(&self) -> Option<i64> {
        self.price
    }

    pub fn old_price(&self) -> Option<i64> {
        self.old_price
    }

    pub fn retail_price(&self) -> Option<i64> {
        self.retail_price
    }

    pub fn quantity(&self) -> Option<i64> {
        self.quantity
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image_by_hash(&self, hash: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.hash() == hash)
    }

    /// Facet ids per group, taken from the variant's attributes
    pub fn facet_ids(&self) -> &FacetIds {
        &self.facet_ids
    }

    /// Facets of this variant known to the facet manager
    pub fn facets(&self) -> Vec<Arc<Facet>> {
        self.factory.resolve_facets(&self.facet_ids)
    }

    pub fn facets_by_group(&self, group_id: FacetGroupId) -> Vec<Arc<Facet>> {
        match self.facet_ids.get(&group_id) {
            Some(ids) => self.factory.resolve_facets(&BTreeMap::from([(group_id, ids.clone())])),
            None => Vec::new(),
        }
    }
}
