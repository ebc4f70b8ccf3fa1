//! Product fields requestable from the API

use serde::{Deserialize, Serialize};

/// Optional product fields. Id and name are always delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Id,
    Name,
    IsActive,
    BrandId,
    DescriptionLong,
    DescriptionShort,
    DefaultVariant,
    Variants,
    MinPrice,
    MaxPrice,
    IsSale,
    DefaultImage,
    AttributesMerged,
    Categories,
    InactiveVariants,
    MaxSavings,
    MaxSavingsPercentage,
    MerchantId,
    Styles,
}

impl ProductField {
    pub const ALL: [ProductField; 19] = [
        ProductField::Id,
        ProductField::Name,
        ProductField::IsActive,
        ProductField::BrandId,
        ProductField::DescriptionLong,
        ProductField::DescriptionShort,
        ProductField::DefaultVariant,
        ProductField::Variants,
        ProductField::MinPrice,
        ProductField::MaxPrice,
        ProductField::IsSale,
        ProductField::DefaultImage,
        ProductField::AttributesMerged,
        ProductField::Categories,
        ProductField::InactiveVariants,
        ProductField::MaxSavings,
        ProductField::MaxSavingsPercentage,
        ProductField::MerchantId,
        ProductField::Styles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Name => "name",
            ProductField::IsActive => "is_active",
            ProductField::BrandId => "brand_id",
            ProductField::DescriptionLong => "description_long",
            ProductField::DescriptionShort => "description_short",
            ProductField::DefaultVariant => "default_variant",
            ProductField::Variants => "variants",
            ProductField::MinPrice => "min_price",
            ProductField::MaxPrice => "max_price",
            ProductField::IsSale => "is_sale",
            ProductField::DefaultImage => "default_image",
            ProductField::AttributesMerged => "attributes_merged",
            ProductField::Categories => "categories",
            ProductField::InactiveVariants => "inactive_variants",
            ProductField::MaxSavings => "max_savings",
            ProductField::MaxSavingsPercentage => "max_savings_percentage",
            ProductField::MerchantId => "merchant_id",
            ProductField::Styles => "styles",
        }
    }

    /// Resolving this field needs the category tree in the cache
    pub fn requires_categories(&self) -> bool {
        matches!(self, ProductField::Categories)
    }

    /// Resolving this field needs the facets in the cache
    pub fn requires_facets(&self) -> bool {
        matches!(
            self,
            ProductField::BrandId
                | ProductField::Variants
                | ProductField::DefaultVariant
                | ProductField::AttributesMerged
        )
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated fields in first-seen order
pub fn filter_fields(fields: &[ProductField]) -> Vec<ProductField> {
    let mut unique = Vec::with_capacity(fields.len());
    for field in fields {
        if !unique.contains(field) {
            unique.push(*field);
        }
    }
    unique
}

pub(crate) fn requires_categories(fields: &[ProductField]) -> bool {
    fields.iter().any(ProductField::requires_categories)
}

pub(crate) fn requires_facets(fields: &[ProductField]) -> bool {
    fields.iter().any(ProductField::requires_facets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for field in ProductField::ALL {
            assert_eq!(
                serde_json::to_value(field).unwrap(),
                serde_json::Value::String(field.as_str().to_string())
            );
        }
    }

    #[test]
    fn test_requirements() {
        assert!(requires_categories(&[ProductField::Name, ProductField::Categories]));
        assert!(!requires_categories(&[ProductField::BrandId]));
        assert!(requires_facets(&[ProductField::AttributesMerged]));
        assert!(requires_facets(&[ProductField::DefaultVariant]));
        assert!(!requires_facets(&[ProductField::Name, ProductField::MinPrice]));
    }

    #[test]
    fn test_filter_fields() {
        let fields = filter_fields(&[
            ProductField::Name,
            ProductField::Variants,
            ProductField::Name,
        ]);
        assert_eq!(fields, vec![ProductField::Name, ProductField::Variants]);
    }
}
