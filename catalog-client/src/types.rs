//! Identifier types and argument normalization.

use std::collections::{BTreeMap, BTreeSet};

pub type ProductId = i64;
pub type VariantId = i64;
pub type CategoryId = i64;
pub type FacetId = i64;
pub type FacetGroupId = i64;

/// Facet ids grouped by facet group: `{206: {123, 234}, 0: {264}}`
pub type FacetIds = BTreeMap<FacetGroupId, BTreeSet<FacetId>>;

/// Facet group holding brands
pub const FACET_BRAND: FacetGroupId = 0;
pub const FACET_COLOR: FacetGroupId = 1;
pub const FACET_SIZE: FacetGroupId = 2;
pub const FACET_CUPSIZE: FacetGroupId = 4;
pub const FACET_LENGTH: FacetGroupId = 5;
pub const FACET_DIMENSION3: FacetGroupId = 6;
pub const FACET_SIZE_RUN: FacetGroupId = 172;
pub const FACET_CLOTHING_UNISEX_INT: FacetGroupId = 173;
pub const FACET_CLOTHING_UNISEX_INCH: FacetGroupId = 174;
pub const FACET_CLOTHING_WOMEN_DE: FacetGroupId = 175;
pub const FACET_CLOTHING_WOMEN_INCH: FacetGroupId = 180;
pub const FACET_CLOTHING_WOMEN_BELTS_CM: FacetGroupId = 181;
pub const FACET_CLOTHING_MEN_DE: FacetGroupId = 187;
pub const FACET_CLOTHING_MEN_INCH: FacetGroupId = 189;
pub const FACET_CLOTHING_MEN_BELTS_CM: FacetGroupId = 190;
pub const FACET_SHOES_UNISEX_EUR: FacetGroupId = 194;
pub const FACET_SHOES_UNISEX_ADIDAS_EUR: FacetGroupId = 195;
pub const FACET_CLOTHING_UNISEX_ONESIZE: FacetGroupId = 204;
pub const FACET_SIZE_CODE: FacetGroupId = 206;
pub const FACET_CONDITION: FacetGroupId = 234;
pub const FACET_QUANTITY_PER_PACK: FacetGroupId = 263;
pub const FACET_SEASON_CODE: FacetGroupId = 289;

/// Known facet group names
pub fn facet_group_names() -> BTreeMap<FacetGroupId, &'static str> {
    BTreeMap::from([
        (0, "brand"),
        (1, "color"),
        (5, "length"),
        (172, "size_run"),
        (173, "clothing_unisex_int"),
        (175, "clothing_womens_de"),
        (176, "clothing_womens_it"),
        (178, "clothing_womens_uk"),
        (180, "clothing_womens_inch"),
        (181, "clothing_womens_belts_cm"),
        (183, "clothing_womens_us"),
        (185, "clothing_womens_scotchsoda_81hours"),
        (187, "clothing_mens_de"),
        (189, "clothing_mens_inch"),
        (190, "clothing_mens_belts_cm"),
        (192, "clothing_mens_acc"),
        (194, "shoes_unisex_eur"),
        (204, "clothing_unisex_onesize"),
        (206, "size_code"),
        (211, "channel"),
        (247, "care_symbol"),
    ])
}

/// One or many values, normalized to a list at the facade boundary.
///
/// ```
/// use catalog_client::IdList;
///
/// let single: IdList<i64> = 12345i64.into();
/// let many: IdList<i64> = vec![1, 2].into();
/// assert_eq!(single.into_vec(), vec![12345]);
/// assert_eq!(many.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdList<T>(Vec<T>);

impl<T> IdList<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> From<Vec<T>> for IdList<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T: Clone> From<&[T]> for IdList<T> {
    fn from(values: &[T]) -> Self {
        Self(values.to_vec())
    }
}

impl<T, const N: usize> From<[T; N]> for IdList<T> {
    fn from(values: [T; N]) -> Self {
        Self(values.into())
    }
}

impl From<i64> for IdList<i64> {
    fn from(value: i64) -> Self {
        Self(vec![value])
    }
}

impl From<String> for IdList<String> {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<&str> for IdList<String> {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<Vec<&str>> for IdList<String> {
    fn from(values: Vec<&str>) -> Self {
        Self(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for IdList<String> {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}
