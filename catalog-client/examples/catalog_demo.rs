// catalog-client/examples/catalog_demo.rs
// Fetches a few products plus the category tree in one batch
//
// CATALOG_APP_ID=100 CATALOG_APP_PASSWORD=... cargo run --example catalog_demo -- 123 456

use anyhow::Context;
use catalog_client::{CatalogClient, ClientConfig, ProductField, QueryResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_client=debug,catalog_demo=info".into()),
        )
        .init();

    let ids: Vec<i64> = std::env::args()
        .skip(1)
        .map(|arg| arg.parse().with_context(|| format!("invalid product id `{}`", arg)))
        .collect::<anyhow::Result<_>>()?;

    let config = ClientConfig::from_env().context("reading client configuration")?;
    let client = CatalogClient::new(config)?;

    let results = client
        .query()
        .fetch_products_by_ids(
            ids,
            &[
                ProductField::Name,
                ProductField::BrandId,
                ProductField::Categories,
                ProductField::DefaultImage,
                ProductField::Variants,
            ],
        )
        .fetch_suggest("shirt")
        .execute()
        .await?;

    for result in results {
        match result {
            QueryResult::Products(products) => {
                for product in &products.products {
                    let brand = product.brand().map(|b| b.name.clone()).unwrap_or_default();
                    let category = product
                        .category_with_longest_active_path()
                        .map(|c| c.name().to_string())
                        .unwrap_or_default();
                    println!(
                        "#{} {} | brand: {} | category: {} | variants: {} | image: {}",
                        product.id(),
                        product.name().unwrap_or("-"),
                        brand,
                        category,
                        product.variants().map(|v| v.len()).unwrap_or(0),
                        product.default_image().map(|i| i.url()).unwrap_or_default(),
                    );
                }
                if !products.products_not_found.is_empty() {
                    println!("not found: {:?}", products.products_not_found);
                }
            }
            QueryResult::Suggest(terms) => println!("suggestions: {}", terms.join(", ")),
            other => tracing::warn!(kind = other.kind(), "unexpected result"),
        }
    }

    let roots = client.category_manager().get_category_tree(true);
    println!("{} active root categories cached", roots.len());
    Ok(())
}
