//! Batch queries
//!
//! A [`Query`] collects request items and sends them as one JSON array in a
//! single transport call. The response is an array of single-key sections in
//! the same order:
//!
//! ```json
//! [{"products": {"ids": [1, 2], "fields": ["categories"]}}, {"category_tree": {"version": "2"}}]
//! [{"products": {"ids": {...}}},                            {"category_tree": [...]}]
//! ```
//!
//! Requirements (`require_category_tree`, `require_facets`) make sure a cache
//! gets populated by the same call. They add an implicit item only when the
//! cache is empty and no declared item fetches the same data already.

mod criteria;
mod fields;
mod results;

pub use criteria::{
    ALL_FACET_GROUPS, AutocompleteType, FacetLimit, PriceFilter, ProductSearchCriteria,
    SearchFilter, SearchResultSpec, Sort, SortBy, SortDirection,
};
pub use fields::{ProductField, filter_fields};
pub use results::QueryResult;

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::deferred::Promise;
use crate::factory::ModelFactory;
use crate::models::{ACTIVE_ONLY, FacetKey, error_message_text};
use crate::transport::Transport;
use crate::types::{FacetGroupId, ProductId};
use crate::{CatalogError, CatalogResult};

/// Category tree format version requested from the API
const CATEGORY_TREE_VERSION: &str = "2";

/// Kind of a request item; doubles as the item's key on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    ProductsByIds,
    ProductsByEans,
    ProductSearch,
    Autocomplete,
    Suggest,
    CategoryTree,
    Facets,
    Facet,
}

impl RequestKind {
    pub fn wire_key(&self) -> &'static str {
        match self {
            RequestKind::ProductsByIds => "products",
            RequestKind::ProductsByEans => "products_eans",
            RequestKind::ProductSearch => "product_search",
            RequestKind::Autocomplete => "autocompletion",
            RequestKind::Suggest => "suggest",
            RequestKind::CategoryTree => "category_tree",
            RequestKind::Facets => "facets",
            RequestKind::Facet => "facet",
        }
    }
}

/// One request of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum QueryItem {
    ProductsByIds {
        ids: Vec<ProductId>,
        fields: Vec<ProductField>,
    },
    ProductsByEans {
        eans: Vec<String>,
        fields: Vec<ProductField>,
    },
    ProductSearch(ProductSearchCriteria),
    Autocomplete {
        searchword: String,
        limit: u32,
        types: Vec<AutocompleteType>,
    },
    Suggest {
        searchword: String,
    },
    CategoryTree,
    /// Facets of the given groups; an empty list fetches every group
    Facets {
        group_ids: Vec<FacetGroupId>,
    },
    Facet {
        keys: Vec<FacetKey>,
    },
}

impl QueryItem {
    pub fn kind(&self) -> RequestKind {
        match self {
            QueryItem::ProductsByIds { .. } => RequestKind::ProductsByIds,
            QueryItem::ProductsByEans { .. } => RequestKind::ProductsByEans,
            QueryItem::ProductSearch(_) => RequestKind::ProductSearch,
            QueryItem::Autocomplete { .. } => RequestKind::Autocomplete,
            QueryItem::Suggest { .. } => RequestKind::Suggest,
            QueryItem::CategoryTree => RequestKind::CategoryTree,
            QueryItem::Facets { .. } => RequestKind::Facets,
            QueryItem::Facet { .. } => RequestKind::Facet,
        }
    }

    fn requires_categories(&self) -> bool {
        match self {
            QueryItem::ProductsByIds { fields, .. } | QueryItem::ProductsByEans { fields, .. } => {
                fields::requires_categories(fields)
            }
            QueryItem::ProductSearch(criteria) => criteria.requires_categories(),
            QueryItem::Autocomplete { types, .. } => types.contains(&AutocompleteType::Categories),
            _ => false,
        }
    }

    fn requires_facets(&self) -> bool {
        match self {
            QueryItem::ProductsByIds { fields, .. } | QueryItem::ProductsByEans { fields, .. } => {
                fields::requires_facets(fields)
            }
            QueryItem::ProductSearch(criteria) => criteria.requires_facets(),
            _ => false,
        }
    }

    fn body(&self) -> CatalogResult<Value> {
        let body = match self {
            QueryItem::ProductsByIds { ids, fields } => json!({ "ids": ids, "fields": fields }),
            QueryItem::ProductsByEans { eans, fields } => json!({ "eans": eans, "fields": fields }),
            QueryItem::ProductSearch(criteria) => serde_json::to_value(criteria)?,
            QueryItem::Autocomplete {
                searchword,
                limit,
                types,
            } => json!({ "searchword": searchword, "limit": limit, "types": types }),
            QueryItem::Suggest { searchword } => json!({ "searchword": searchword }),
            QueryItem::CategoryTree => json!({ "version": CATEGORY_TREE_VERSION }),
            QueryItem::Facets { group_ids } if group_ids.is_empty() => json!({}),
            QueryItem::Facets { group_ids } => json!({ "group_ids": group_ids }),
            QueryItem::Facet { keys } => serde_json::to_value(keys)?,
        };
        Ok(body)
    }

    /// `{"<wire key>": body}`
    pub fn to_wire(&self) -> CatalogResult<Value> {
        let mut section = Map::new();
        section.insert(self.kind().wire_key().to_string(), self.body()?);
        Ok(Value::Object(section))
    }
}

/// Request item plus whether it was declared or added by a requirement
#[derive(Debug, Clone)]
struct Entry {
    item: QueryItem,
    implicit: bool,
}

/// Batch builder bound to one client
#[derive(Debug)]
pub struct Query {
    transport: Arc<dyn Transport>,
    factory: ModelFactory,
    items: Vec<QueryItem>,
    require_category_tree: bool,
    require_facets: bool,
}

impl Query {
    pub(crate) fn new(transport: Arc<dyn Transport>, factory: ModelFactory) -> Self {
        Self {
            transport,
            factory,
            items: Vec::new(),
            require_category_tree: false,
            require_facets: false,
        }
    }

    /// Appends a request item; its result lands at the same position
    pub fn declare(mut self, item: QueryItem) -> Self {
        if item.requires_categories() {
            self.require_category_tree = true;
        }
        if item.requires_facets() {
            self.require_facets = true;
        }
        self.items.push(item);
        self
    }

    pub fn items(&self) -> &[QueryItem] {
        &self.items
    }

    // ========== Shorthands ==========

    pub fn fetch_products_by_ids(self, ids: Vec<ProductId>, fields: &[ProductField]) -> Self {
        self.declare(QueryItem::ProductsByIds {
            ids,
            fields: filter_fields(fields),
        })
    }

    pub fn fetch_products_by_eans(self, eans: Vec<String>, fields: &[ProductField]) -> Self {
        self.declare(QueryItem::ProductsByEans {
            eans,
            fields: filter_fields(fields),
        })
    }

    pub fn fetch_product_search(self, criteria: ProductSearchCriteria) -> Self {
        self.declare(QueryItem::ProductSearch(criteria))
    }

    pub fn fetch_autocomplete(
        self,
        searchword: impl Into<String>,
        limit: u32,
        types: &[AutocompleteType],
    ) -> Self {
        self.declare(QueryItem::Autocomplete {
            searchword: searchword.into(),
            limit,
            types: types.to_vec(),
        })
    }

    pub fn fetch_suggest(self, searchword: impl Into<String>) -> Self {
        self.declare(QueryItem::Suggest {
            searchword: searchword.into(),
        })
    }

    pub fn fetch_category_tree(self) -> Self {
        self.declare(QueryItem::CategoryTree)
    }

    /// Fetches and caches the given facet groups; empty means every group
    pub fn fetch_facets(self, group_ids: Vec<FacetGroupId>) -> Self {
        self.declare(QueryItem::Facets { group_ids })
    }

    /// Looks up single facets without touching the cache
    pub fn fetch_facet(self, keys: Vec<FacetKey>) -> Self {
        self.declare(QueryItem::Facet { keys })
    }

    // ========== Requirements ==========

    /// Make sure the category cache is populated once the batch succeeded
    pub fn require_category_tree(mut self) -> Self {
        self.require_category_tree = true;
        self
    }

    /// Make sure the facet cache is populated once the batch succeeded
    pub fn require_facets(mut self) -> Self {
        self.require_facets = true;
        self
    }

    // ========== Execution ==========

    /// Declared items plus the implicit items the requirements still need
    fn entries(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .items
            .iter()
            .map(|item| Entry {
                item: item.clone(),
                implicit: false,
            })
            .collect();

        if self.require_category_tree
            && self.factory.category_manager().is_empty()
            && !self.items.contains(&QueryItem::CategoryTree)
        {
            entries.push(Entry {
                item: QueryItem::CategoryTree,
                implicit: true,
            });
        }

        let all_facets = QueryItem::Facets {
            group_ids: Vec::new(),
        };
        if self.require_facets
            && self.factory.facet_manager().is_empty()
            && !self.items.contains(&all_facets)
        {
            entries.push(Entry {
                item: all_facets,
                implicit: true,
            });
        }
        entries
    }

    /// The JSON array this query would send
    pub fn payload(&self) -> CatalogResult<Value> {
        self.entries()
            .iter()
            .map(|entry| entry.item.to_wire())
            .collect::<CatalogResult<Vec<_>>>()
            .map(Value::Array)
    }

    /// Sends the batch; one result per declared item, in declaration order.
    ///
    /// Resolves without a transport call when there is nothing to fetch.
    pub fn execute(self) -> Promise<Vec<QueryResult>> {
        match self.into_batch() {
            Ok(Some(batch)) => Promise::spawn(batch.run()),
            Ok(None) => Promise::resolved(Vec::new()),
            Err(e) => Promise::rejected(e),
        }
    }

    /// Like [`Query::execute`], resolving with the first result only
    pub fn execute_single(self) -> Promise<Option<QueryResult>> {
        match self.into_batch() {
            Ok(Some(batch)) => {
                Promise::spawn(async move {
                    Ok::<_, CatalogError>(batch.run().await?.into_iter().next())
                })
            }
            Ok(None) => Promise::resolved(None),
            Err(e) => Promise::rejected(e),
        }
    }

    /// Sends the batch on the current task
    pub(crate) async fn run(self) -> CatalogResult<Vec<QueryResult>> {
        match self.into_batch()? {
            Some(batch) => batch.run().await,
            None => Ok(Vec::new()),
        }
    }

    fn into_batch(self) -> CatalogResult<Option<Batch>> {
        let entries = self.entries();
        if entries.is_empty() {
            tracing::debug!("empty batch, nothing to send");
            return Ok(None);
        }
        let payload = entries
            .iter()
            .map(|entry| entry.item.to_wire())
            .collect::<CatalogResult<Vec<_>>>()?;
        tracing::debug!(
            items = entries.len(),
            implicit = entries.iter().filter(|e| e.implicit).count(),
            "assembled batch"
        );
        Ok(Some(Batch {
            transport: self.transport,
            factory: self.factory,
            entries,
            payload: Value::Array(payload),
        }))
    }
}

/// Assembled batch, ready to be sent
struct Batch {
    transport: Arc<dyn Transport>,
    factory: ModelFactory,
    entries: Vec<Entry>,
    payload: Value,
}

impl Batch {
    async fn run(self) -> CatalogResult<Vec<QueryResult>> {
        let response = self.transport.send(&self.payload).await?;
        let bodies = split_sections(&self.entries, response)?;
        self.commit_caches(&bodies)?;
        self.build_results(bodies)
    }

    /// Builds every cache snapshot of the batch, then swaps them in.
    /// Nothing is committed when one of them is malformed.
    fn commit_caches(&self, bodies: &[Value]) -> CatalogResult<()> {
        let mut trees = Vec::new();
        let mut facet_groups = Vec::new();
        for (entry, body) in self.entries.iter().zip(bodies) {
            match &entry.item {
                QueryItem::CategoryTree => trees.push(self.factory.create_category_tree(body)?),
                QueryItem::Facets { group_ids } => {
                    facet_groups.push((group_ids.as_slice(), self.factory.create_facets(body)?))
                }
                _ => {}
            }
        }
        for tree in trees {
            self.factory.category_manager().populate(tree);
        }
        for (group_ids, facets) in facet_groups {
            self.factory.facet_manager().populate(group_ids, facets);
        }
        Ok(())
    }

    fn build_results(&self, bodies: Vec<Value>) -> CatalogResult<Vec<QueryResult>> {
        let factory = &self.factory;
        let mut results = Vec::with_capacity(bodies.len());
        for (entry, body) in self.entries.iter().zip(bodies) {
            if entry.implicit {
                continue;
            }
            let result = match &entry.item {
                QueryItem::ProductsByIds { ids, .. } => {
                    QueryResult::Products(factory.create_products_result(&body, ids)?)
                }
                QueryItem::ProductsByEans { .. } => {
                    QueryResult::ProductsEans(factory.create_products_eans_result(&body)?)
                }
                QueryItem::ProductSearch(_) => {
                    QueryResult::ProductSearch(factory.create_product_search_result(&body)?)
                }
                QueryItem::Autocomplete { .. } => {
                    QueryResult::Autocomplete(factory.create_autocomplete(&body)?)
                }
                QueryItem::Suggest { .. } => QueryResult::Suggest(factory.create_suggest(&body)?),
                QueryItem::CategoryTree => QueryResult::CategoryTree(
                    factory.category_manager().get_category_tree(ACTIVE_ONLY),
                ),
                QueryItem::Facets { group_ids } => {
                    let facet_manager = factory.facet_manager();
                    let groups = if group_ids.is_empty() {
                        facet_manager.group_ids()
                    } else {
                        group_ids.clone()
                    };
                    QueryResult::Facets(facet_manager.get_facets_by_group_id(groups))
                }
                QueryItem::Facet { .. } => QueryResult::Facet(factory.create_facets(&body)?),
            };
            results.push(result);
        }
        Ok(results)
    }
}

/// Checks that the response lines up with the request and unwraps each section
fn split_sections(entries: &[Entry], response: Value) -> CatalogResult<Vec<Value>> {
    let Value::Array(sections) = response else {
        return Err(CatalogError::parse("batch response is not an array"));
    };
    if sections.len() < entries.len() {
        return Err(CatalogError::UnexpectedResult {
            position: sections.len(),
            expected: entries[sections.len()].item.kind().wire_key().to_string(),
            actual: "<missing>".to_string(),
        });
    }
    if sections.len() > entries.len() {
        return Err(CatalogError::UnexpectedResult {
            position: entries.len(),
            expected: "<end>".to_string(),
            actual: section_keys(&sections[entries.len()]),
        });
    }

    let mut bodies = Vec::with_capacity(sections.len());
    for (position, (entry, section)) in entries.iter().zip(sections).enumerate() {
        let expected = entry.item.kind().wire_key();
        let actual = section_keys(&section);
        let body = match section {
            Value::Object(map) if map.len() == 1 => map
                .into_iter()
                .next()
                .filter(|(key, _)| key == expected)
                .map(|(_, body)| body),
            _ => None,
        };
        let Some(body) = body else {
            return Err(CatalogError::UnexpectedResult {
                position,
                expected: expected.to_string(),
                actual,
            });
        };
        if let Some(code) = body.get("error_code") {
            let message = error_message_text(body.get("error_message"));
            tracing::warn!(section = expected, %message, "section reported an error");
            return Err(CatalogError::application(code.as_i64().unwrap_or_default(), message));
        }
        bodies.push(body);
    }
    Ok(bodies)
}

fn section_keys(section: &Value) -> String {
    match section {
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Endpoint, ImageBaseUrl};
    use crate::models::ImageUrlPrefix;
    use crate::transport::MemoryTransport;

    fn query() -> (Arc<MemoryTransport>, ModelFactory, Query) {
        let transport = Arc::new(MemoryTransport::new());
        let factory =
            ModelFactory::new(ImageUrlPrefix::new(&ImageBaseUrl::Relative, &Endpoint::Live));
        let query = Query::new(transport.clone(), factory.clone());
        (transport, factory, query)
    }

    #[test]
    fn test_wire_items() {
        let (_, _, query) = query();
        let query = query
            .fetch_products_by_ids(vec![1, 2], &[ProductField::Name])
            .fetch_suggest("sho")
            .fetch_facets(vec![0, 1])
            .fetch_facet(vec![FacetKey::new(0, 264)]);

        assert_eq!(
            query.payload().unwrap(),
            json!([
                { "products": { "ids": [1, 2], "fields": ["name"] } },
                { "suggest": { "searchword": "sho" } },
                { "facets": { "group_ids": [0, 1] } },
                { "facet": [{ "id": 264, "group_id": 0 }] }
            ])
        );
    }

    #[test]
    fn test_field_inference_adds_implicit_items() {
        let (_, _, query) = query();
        let query = query.fetch_products_by_ids(
            vec![1],
            &[ProductField::Categories, ProductField::BrandId],
        );

        let payload = query.payload().unwrap();
        assert_eq!(payload[1], json!({ "category_tree": { "version": "2" } }));
        assert_eq!(payload[2], json!({ "facets": {} }));
    }

    #[test]
    fn test_declared_tree_suppresses_implicit_item() {
        let (_, _, query) = query();
        let query = query
            .fetch_category_tree()
            .fetch_autocomplete("sh", 10, &AutocompleteType::ALL)
            .require_category_tree();

        let payload = query.payload().unwrap();
        assert_eq!(payload.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_populated_cache_needs_no_implicit_item() {
        let (_, factory, query) = query();
        factory
            .category_manager()
            .populate(factory.create_category_tree(&json!([{ "id": 1 }])).unwrap());

        let payload = query.require_category_tree().payload().unwrap();
        assert_eq!(payload, json!([]));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_transport() {
        let (transport, _, query) = query();
        assert!(query.execute().await.unwrap().is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_section_error_rejects_batch() {
        let (transport, _, query) = query();
        transport.push_response(json!([
            { "suggest": ["shoes"] },
            { "products": { "error_code": 401, "error_message": ["unauthorized"] } }
        ]));

        let outcome = query
            .fetch_suggest("sho")
            .fetch_products_by_ids(vec![1], &[])
            .execute()
            .await;
        assert!(matches!(outcome, Err(CatalogError::Application { code: 401, .. })));
    }

    #[tokio::test]
    async fn test_mismatched_sections_reject_batch() {
        let (transport, _, query) = query();
        transport.push_response(json!([{ "products": { "ids": {} } }]));
        let outcome = query.fetch_suggest("sho").execute().await;
        assert!(matches!(
            outcome,
            Err(CatalogError::UnexpectedResult { position: 0, .. })
        ));

        let (transport, _, query) = self::query();
        transport.push_response(json!([]));
        let outcome = query.fetch_suggest("sho").execute_single().await;
        assert!(matches!(
            outcome,
            Err(CatalogError::UnexpectedResult { position: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_tree_leaves_cache_untouched() {
        let (transport, factory, query) = query();
        transport.push_response(json!([
            { "facets": [{ "facet_id": 1, "group_id": 0, "name": "Brand" }] },
            { "category_tree": [{ "id": 1 }, { "id": 1 }] }
        ]));

        let outcome = query
            .fetch_facets(Vec::new())
            .fetch_category_tree()
            .execute()
            .await;
        assert!(matches!(outcome, Err(CatalogError::Parse(_))));
        assert!(factory.category_manager().is_empty());
        assert!(factory.facet_manager().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_product_section_keeps_committed_tree() {
        let (transport, factory, query) = query();
        transport.push_response(json!([
            { "category_tree": [{ "id": 1, "name": "Women" }] },
            { "products": { "ids": { "not-an-id": { "id": 1 } } } }
        ]));

        let outcome = query
            .fetch_category_tree()
            .fetch_products_by_ids(vec![1], &[])
            .execute()
            .await;

        // caches are committed before the product section is built
        assert!(matches!(outcome, Err(CatalogError::Parse(_))));
        assert_eq!(factory.category_manager().len(), 1);
    }
}
