//! Catalog Client - convenience facade over batch queries
//!
//! Every `fetch_*` method builds a one-item [`Query`], executes it and hands
//! back a [`Promise`]. Methods that may hit the network spawn onto the tokio
//! runtime, so they must be called from within one.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{ClientConfig, Endpoint, ImageBaseUrl};
use crate::deferred::Promise;
use crate::factory::ModelFactory;
use crate::manager::{CategoryManager, FacetManager};
use crate::models::{
    ACTIVE_ONLY, Autocomplete, CategoriesResult, Category, Facet, FacetKey, ImageUrlPrefix,
    ProductSearchResult, ProductsEansResult, ProductsResult,
};
use crate::query::{
    AutocompleteType, ProductField, ProductSearchCriteria, Query, QueryResult, RequestKind,
};
use crate::transport::{HttpTransport, Transport};
use crate::types::{self, CategoryId, FacetGroupId, FacetId, IdList, ProductId};
use crate::{CatalogError, CatalogResult};

/// Default number of autocomplete suggestions
pub const DEFAULT_AUTOCOMPLETE_LIMIT: u32 = 50;

/// Catalog API client.
///
/// Clones share the transport, the caches and the image url prefix.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    factory: ModelFactory,
    endpoint: Endpoint,
    app_id: String,
}

impl CatalogClient {
    /// Client talking HTTP to the configured endpoint
    pub fn new(config: ClientConfig) -> CatalogResult<Self> {
        let transport = HttpTransport::new(&config)?;
        tracing::info!(app_id = %config.app_id, url = transport.api_url(), "catalog client created");
        Ok(Self::with_transport(&config, Arc::new(transport)))
    }

    /// Client using a custom transport (e.g. [`crate::MemoryTransport`])
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let image_prefix = ImageUrlPrefix::new(&config.image_base_url, &config.endpoint);
        Self {
            transport,
            factory: ModelFactory::new(image_prefix),
            endpoint: config.endpoint.clone(),
            app_id: config.app_id.clone(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Empty batch bound to this client
    pub fn query(&self) -> Query {
        Query::new(self.transport.clone(), self.factory.clone())
    }

    pub fn factory(&self) -> &ModelFactory {
        &self.factory
    }

    /// Cached categories, without fetching
    pub fn category_manager(&self) -> &CategoryManager {
        self.factory.category_manager()
    }

    /// Cached facets, without fetching
    pub fn facet_manager(&self) -> &FacetManager {
        self.factory.facet_manager()
    }

    /// Changes the image url prefix; applies to images built earlier too
    pub fn set_image_base_url(&self, base: ImageBaseUrl) {
        self.factory.image_prefix().set(&base, &self.endpoint);
    }

    /// Forgets cached categories and facets
    pub fn reset_caches(&self) {
        self.category_manager().reset();
        self.facet_manager().reset();
    }

    // ========== Products ==========

    pub fn fetch_products_by_ids(
        &self,
        ids: impl Into<IdList<ProductId>>,
        fields: &[ProductField],
    ) -> Promise<ProductsResult> {
        let query = self.query().fetch_products_by_ids(ids.into().into_vec(), fields);
        single(query, RequestKind::ProductsByIds, QueryResult::into_products)
    }

    pub fn fetch_products_by_eans(
        &self,
        eans: impl Into<IdList<String>>,
        fields: &[ProductField],
    ) -> Promise<ProductsEansResult> {
        let query = self.query().fetch_products_by_eans(eans.into().into_vec(), fields);
        single(query, RequestKind::ProductsByEans, QueryResult::into_products_eans)
    }

    pub fn fetch_product_search(&self, criteria: ProductSearchCriteria) -> Promise<ProductSearchResult> {
        let query = self.query().fetch_product_search(criteria);
        single(query, RequestKind::ProductSearch, QueryResult::into_product_search)
    }

    /// `limit` defaults to 50, `types` to products and categories
    pub fn fetch_autocomplete(
        &self,
        searchword: impl Into<String>,
        limit: Option<u32>,
        types: Option<&[AutocompleteType]>,
    ) -> Promise<Autocomplete> {
        let query = self.query().fetch_autocomplete(
            searchword,
            limit.unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT),
            types.unwrap_or(&AutocompleteType::ALL),
        );
        single(query, RequestKind::Autocomplete, QueryResult::into_autocomplete)
    }

    pub fn fetch_suggest(&self, searchword: impl Into<String>) -> Promise<Vec<String>> {
        let query = self.query().fetch_suggest(searchword);
        single(query, RequestKind::Suggest, QueryResult::into_suggest)
    }

    // ========== Categories ==========

    /// The category manager, fetching the tree first if it is empty and
    /// `fetch_if_empty` is set
    pub fn get_category_manager(&self, fetch_if_empty: bool) -> Promise<CategoryManager> {
        let manager = self.category_manager().clone();
        if !fetch_if_empty || !manager.is_empty() {
            return Promise::resolved(manager);
        }
        let query = self.query().require_category_tree();
        Promise::spawn(async move {
            query.run().await?;
            Ok::<_, CatalogError>(manager)
        })
    }

    /// Active root categories; served from the cache once fetched
    pub fn fetch_category_tree(&self) -> Promise<Vec<Arc<Category>>> {
        let managed = self.get_category_manager(true);
        Promise::spawn(async move {
            Ok::<_, CatalogError>(managed.await?.get_category_tree(ACTIVE_ONLY))
        })
    }

    /// Active categories for `ids`. Ids the tree does not contain at all are
    /// reported as not found; inactive ones are left out of both lists.
    pub fn fetch_categories_by_ids(
        &self,
        ids: impl Into<IdList<CategoryId>>,
    ) -> Promise<CategoriesResult> {
        let ids = ids.into().into_vec();
        let managed = self.get_category_manager(true);
        Promise::spawn(async move {
            let manager = managed.await?;
            Ok::<_, CatalogError>(CategoriesResult {
                categories: manager.get_categories(&ids, ACTIVE_ONLY),
                categories_not_found: ids
                    .iter()
                    .copied()
                    .filter(|id| manager.get_category(*id, false).is_none())
                    .collect(),
            })
        })
    }

    // ========== Facets ==========

    /// Facets of the given groups by facet id; an empty list means every group.
    ///
    /// Only groups missing from the cache are fetched.
    pub fn fetch_facets(
        &self,
        group_ids: impl Into<IdList<FacetGroupId>>,
    ) -> Promise<BTreeMap<FacetId, Arc<Facet>>> {
        let group_ids = group_ids.into().into_vec();
        let manager = self.facet_manager().clone();

        let fetch_all = group_ids.is_empty() && manager.is_empty();
        let missing = manager.missing_groups(&group_ids);
        if !fetch_all && missing.is_empty() {
            return Promise::resolved(lookup_facets(&manager, &group_ids));
        }

        let query = self.query().fetch_facets(missing);
        Promise::spawn(async move {
            query.run().await?;
            Ok::<_, CatalogError>(lookup_facets(&manager, &group_ids))
        })
    }

    /// Single facets looked up by (group id, facet id); the cache is not touched
    pub fn fetch_facet(&self, keys: impl Into<IdList<FacetKey>>) -> Promise<Vec<Facet>> {
        let query = self.query().fetch_facet(keys.into().into_vec());
        single(query, RequestKind::Facet, QueryResult::into_facet)
    }

    // ========== Helpers ==========

    /// Search criteria bound to `session_id`, or to a fresh random session
    pub fn product_search_criteria(&self, session_id: Option<&str>) -> ProductSearchCriteria {
        match session_id {
            Some(id) => ProductSearchCriteria::new(id),
            None => ProductSearchCriteria::new(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Known facet group ids and their names
    pub fn facet_group_names(&self) -> BTreeMap<FacetGroupId, &'static str> {
        types::facet_group_names()
    }
}

/// Empty `group_ids` means every cached group
fn lookup_facets(manager: &FacetManager, group_ids: &[FacetGroupId]) -> BTreeMap<FacetId, Arc<Facet>> {
    if group_ids.is_empty() {
        manager.get_facets_by_group_id(manager.group_ids())
    } else {
        manager.get_facets_by_group_id(group_ids.to_vec())
    }
}

/// Runs a one-item query and unwraps its result
fn single<T, F>(query: Query, expected: RequestKind, extract: F) -> Promise<T>
where
    T: Send + 'static,
    F: FnOnce(QueryResult) -> Option<T> + Send + 'static,
{
    Promise::spawn(async move {
        let result = query.run().await?.into_iter().next();
        let actual = result.as_ref().map(|r| r.kind()).unwrap_or("<missing>");
        result
            .and_then(extract)
            .ok_or_else(|| CatalogError::UnexpectedResult {
                position: 0,
                expected: expected.wire_key().to_string(),
                actual: actual.to_string(),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use serde_json::json;

    fn client() -> (Arc<MemoryTransport>, CatalogClient) {
        let transport = Arc::new(MemoryTransport::new());
        let config = ClientConfig::new("100", "secret");
        let client = CatalogClient::with_transport(&config, transport.clone());
        (transport, client)
    }

    #[test]
    fn test_search_criteria_session() {
        let (_, client) = client();
        assert_eq!(client.product_search_criteria(Some("abc")).session_id, "abc");

        let a = client.product_search_criteria(None);
        let b = client.product_search_criteria(None);
        assert!(!a.session_id.is_empty());
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_facet_group_names() {
        let (_, client) = client();
        assert_eq!(client.facet_group_names()[&0], "brand");
        assert_eq!(client.facet_group_names()[&206], "size_code");
    }

    #[tokio::test]
    async fn test_cached_manager_needs_no_request() {
        let (transport, client) = client();
        let manager = client.get_category_manager(false).await.unwrap();
        assert!(manager.is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_facets_only_requests_missing_groups() {
        let (transport, client) = client();
        transport.push_response(json!([{ "facets": { "facet": [
            { "facet_id": 264, "group_id": 0, "name": "Nike" }
        ]}}]));
        transport.push_response(json!([{ "facets": { "facet": [
            { "facet_id": 570, "group_id": 1, "name": "Rot" }
        ]}}]));

        let brands = client.fetch_facets(0i64).await.unwrap();
        assert_eq!(brands[&264].name, "Nike");

        let both = client.fetch_facets(vec![0i64, 1]).await.unwrap();
        assert_eq!(both.len(), 2);

        // everything cached now
        let again = client.fetch_facets(vec![1i64, 0]).await.unwrap();
        assert_eq!(again.len(), 2);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], json!([{ "facets": { "group_ids": [0] } }]));
        assert_eq!(requests[1], json!([{ "facets": { "group_ids": [1] } }]));
    }

    #[tokio::test]
    async fn test_transport_error_rejects_promise() {
        let (transport, client) = client();
        transport.push_error(CatalogError::application(500, "boom"));
        let outcome = client.fetch_suggest("sho").await;
        assert!(matches!(outcome, Err(CatalogError::Application { code: 500, .. })));
    }
}
