//! Domain models built by the model factory

pub mod category;
pub mod facet;
pub mod image;
pub mod product;
pub mod results;
pub mod search;
pub mod variant;

// Re-exports
pub use category::{ACTIVE_ONLY, Category, CategoryTree};
pub use facet::{Facet, FacetKey, FacetOption};
pub use image::{Image, ImageSize, ImageUrlPrefix};
pub use product::{FacetIdSource, Product};
pub use results::{CategoriesResult, ItemError, ProductsEansResult, ProductsResult};
pub use search::{Autocomplete, FacetCounts, PriceRange, ProductSearchResult, SaleCounts, TermCount};
pub use variant::Variant;

use serde_json::Value;

/// `error_message` is either a string or a list of strings
pub(crate) fn error_message_text(message: Option<&Value>) -> String {
    match message {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|p| p.as_str().map(str::to_string).unwrap_or_else(|| p.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
