//! Catalog Client - batching client for the shop catalog API
//!
//! Requests are collected into a [`Query`] and sent as one batch. Category
//! trees and facets are cached per client and resolved lazily from the
//! products, variants and search results the client builds.
//!
//! ```no_run
//! use catalog_client::{CatalogClient, ClientConfig, ProductField};
//!
//! # async fn demo() -> catalog_client::CatalogResult<()> {
//! let client = CatalogClient::new(ClientConfig::from_env()?)?;
//! let result = client
//!     .fetch_products_by_ids(vec![123, 456], &[ProductField::Categories, ProductField::BrandId])
//!     .await?;
//! for product in &result.products {
//!     println!("{:?} by {:?}", product.name(), product.brand().map(|b| b.name.clone()));
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod deferred;
pub mod error;
pub mod factory;
pub mod manager;
pub mod models;
pub mod query;
pub mod transport;
pub mod types;

pub use client::{CatalogClient, DEFAULT_AUTOCOMPLETE_LIMIT};
pub use config::{ClientConfig, Endpoint, ImageBaseUrl};
pub use deferred::{Deferred, Promise};
pub use error::{CatalogError, CatalogResult};
pub use factory::{FactoryHandle, ModelFactory};
pub use manager::{CategoryManager, FacetManager};
pub use transport::{HttpTransport, MemoryTransport, Transport};
pub use types::{CategoryId, FacetGroupId, FacetId, FacetIds, IdList, ProductId, VariantId};

// Models and query building blocks
pub use models::{
    Autocomplete, CategoriesResult, Category, CategoryTree, Facet, FacetKey, Image, ItemError,
    Product, ProductSearchResult, ProductsEansResult, ProductsResult, Variant,
};
pub use query::{
    AutocompleteType, ProductField, ProductSearchCriteria, Query, QueryItem, QueryResult,
    RequestKind, SortBy, SortDirection,
};
