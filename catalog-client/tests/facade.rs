// catalog-client/tests/facade.rs
// Client facade against canned responses

use std::sync::Arc;

use catalog_client::{
    AutocompleteType, CatalogClient, ClientConfig, Endpoint, FacetKey, ImageBaseUrl,
    MemoryTransport, ProductField, SortBy, SortDirection,
};
use serde_json::json;

fn client() -> (Arc<MemoryTransport>, CatalogClient) {
    let transport = Arc::new(MemoryTransport::new());
    let config = ClientConfig::new("100", "secret").with_endpoint(Endpoint::Stage);
    let client = CatalogClient::with_transport(&config, transport.clone());
    (transport, client)
}

fn tree_response() -> serde_json::Value {
    json!([{ "category_tree": [
        { "id": 1, "name": "Women", "sub_categories": [
            { "id": 10, "name": "Shoes", "active": false }
        ]},
        { "id": 2, "name": "Men" }
    ]}])
}

#[tokio::test]
async fn test_category_fetch_is_cached() {
    let (transport, client) = client();
    transport.push_response(tree_response());

    let first = client.fetch_categories_by_ids(vec![2, 1]).await.unwrap();
    let second = client.fetch_categories_by_ids(vec![1, 10, 99]).await.unwrap();

    assert_eq!(transport.request_count(), 1);
    assert_eq!(
        transport.requests()[0],
        json!([{ "category_tree": { "version": "2" } }])
    );

    let ids: Vec<_> = first.categories.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(first.categories_not_found.is_empty());

    // 10 exists but is inactive, 99 is unknown
    let ids: Vec<_> = second.categories.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(second.categories_not_found, vec![99]);

    let roots = client.fetch_category_tree().await.unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_reset_caches_refetches() {
    let (transport, client) = client();
    transport.push_response(tree_response());
    transport.push_response(tree_response());

    client.get_category_manager(true).await.unwrap();
    client.reset_caches();
    assert!(client.category_manager().is_empty());

    let manager = client.get_category_manager(true).await.unwrap();
    assert_eq!(manager.len(), 3);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_image_base_url_switch() {
    let (transport, client) = client();
    transport.push_response(json!([{ "products": { "ids": {
        "7": { "id": 7, "default_image": { "hash": "abc" } }
    }}}]));

    let result = client.fetch_products_by_ids(7i64, &[ProductField::DefaultImage]).await.unwrap();
    let image = result.products[0].default_image().unwrap().clone();
    assert_eq!(image.url(), "http://mndb.staging.aboutyou.de/mmdb/file/abc");

    client.set_image_base_url(ImageBaseUrl::Relative);
    assert_eq!(image.url(), "/abc");

    transport.push_response(json!([{ "products": { "ids": {
        "8": { "id": 8, "default_image": { "hash": "def" } }
    }}}]));
    let later = client.fetch_products_by_ids(8i64, &[ProductField::DefaultImage]).await.unwrap();
    assert_eq!(later.products[0].default_image().unwrap().url(), "/def");

    client.set_image_base_url(ImageBaseUrl::Url("https://img.example.com".into()));
    assert_eq!(image.url_with_size(200, 300), "https://img.example.com/abc?width=200&height=300");
}

#[tokio::test]
async fn test_products_not_found() {
    let (transport, client) = client();
    transport.push_response(json!([{ "products": { "ids": {
        "1": { "id": 1, "name": "Shirt" },
        "2": { "error_code": 404, "error_message": ["product not found"] }
    }, "pageHash": "p1" }}]));

    let result = client.fetch_products_by_ids(vec![2, 1], &[ProductField::Name]).await.unwrap();
    assert_eq!(result.products.len(), 1);
    assert_eq!(result.products_not_found, vec![2]);
    assert!(result.has_errors());
    assert_eq!(result.page_hash.as_deref(), Some("p1"));
}

#[tokio::test]
async fn test_product_search() {
    let (transport, client) = client();
    transport.push_response(json!([
        { "product_search": {
            "pageHash": "s1",
            "product_count": 120,
            "products": [{ "id": 1, "name": "Shirt", "sale": true }],
            "facets": {
                "0": { "total": 3, "terms": [{ "term": "264", "count": 3 }] },
                "sale": { "terms": [{ "term": "T", "count": 1 }, { "term": "F", "count": 119 }] }
            }
        }},
        { "facets": [{ "facet_id": 264, "group_id": 0, "name": "Nike" }] }
    ]));

    let criteria = client
        .product_search_criteria(Some("session"))
        .filter_by_searchword("shirt")
        .select_facets_by_group_id(0, 10)
        .sort_by(SortBy::Price, SortDirection::Desc)
        .set_limit(1, 0);
    let result = client.fetch_product_search(criteria).await.unwrap();

    assert_eq!(result.product_count, 120);
    assert_eq!(result.products[0].is_sale(), Some(true));
    assert_eq!(result.facet_counts[&0].count_for(264), 3);
    assert_eq!(result.sale_counts.unwrap().not_sale, 119);
    // the facet aggregation pulled in the facets
    assert_eq!(client.facet_manager().get_facet(0, 264).unwrap().name, "Nike");
    assert_eq!(transport.requests()[0][0]["product_search"]["session_id"], "session");
}

#[tokio::test]
async fn test_autocomplete_defaults() {
    let (transport, client) = client();
    transport.push_response(json!([
        { "autocompletion": {
            "products": [{ "id": 1, "name": "Shirt" }],
            "categories": [{ "id": 2, "name": "Men" }]
        }},
        { "category_tree": [{ "id": 2, "name": "Men" }] }
    ]));

    let result = client.fetch_autocomplete("shi", None, None).await.unwrap();
    assert_eq!(result.products.unwrap()[0].name(), Some("Shirt"));
    assert_eq!(result.categories.unwrap()[0].name(), "Men");
    assert_eq!(
        transport.requests()[0][0],
        json!({ "autocompletion": {
            "searchword": "shi", "limit": 50, "types": ["products", "categories"]
        }})
    );

    transport.push_response(json!([{ "autocompletion": { "products": [] } }]));
    let products_only = client
        .fetch_autocomplete("shi", Some(5), Some(&[AutocompleteType::Products]))
        .await
        .unwrap();
    assert!(products_only.categories.is_none());
    assert_eq!(transport.requests()[1].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_single_facet_lookup_bypasses_cache() {
    let (transport, client) = client();
    transport.push_response(json!([{ "facet": [
        { "facet_id": 264, "group_id": 0, "name": "Nike" }
    ]}]));

    let facets = client.fetch_facet(FacetKey::new(0, 264)).await.unwrap();
    assert_eq!(facets[0].name, "Nike");
    assert!(client.facet_manager().is_empty());
    assert_eq!(
        transport.requests()[0],
        json!([{ "facet": [{ "id": 264, "group_id": 0 }] }])
    );
}

#[tokio::test]
async fn test_fetch_all_facets_once() {
    let (transport, client) = client();
    transport.push_response(json!([{ "facets": { "facet": [
        { "facet_id": 264, "group_id": 0, "name": "Nike" },
        { "facet_id": 570, "group_id": 1, "name": "Rot" }
    ]}}]));

    let all = client.fetch_facets(Vec::<i64>::new()).await.unwrap();
    let again = client.fetch_facets(Vec::<i64>::new()).await.unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(again.len(), 2);
    assert_eq!(transport.request_count(), 1);
    assert_eq!(transport.requests()[0], json!([{ "facets": {} }]));
}
