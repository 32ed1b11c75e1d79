//! Integration tests for the HTTP catalog client.
//!
//! Each test starts its own fixture server on an ephemeral port.

use std::time::Duration;

use axum::http::StatusCode;
use stockroom_catalog::catalog::{CatalogApi, CatalogClient, CatalogError};
use stockroom_catalog::detail::load_product_detail;
use stockroom_catalog::overview::load_category_overview;
use stockroom_core::{ProductId, StockStatus};
use stockroom_integration_tests::{FIXTURE_PRODUCTS, FixtureServer};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_fetch_page_sends_paging_and_decodes() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let page = client.fetch_page(20, 40).await.expect("page");

    assert_eq!(page.total, FIXTURE_PRODUCTS);
    assert_eq!(page.skip, 40);
    assert_eq!(page.products.len(), 5);
    assert_eq!(page.products[0].id, ProductId::new(41));
    assert_eq!(page.products[0].price.to_string(), "$410.00");
    assert_eq!(server.requests(), vec!["/products?limit=20&skip=40"]);
}

#[tokio::test]
async fn test_search_encodes_query() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let page = client
        .fetch_by_search("phone 1", 20, 0, &CancellationToken::new())
        .await
        .expect("search");

    // Phone 10 through Phone 19
    assert_eq!(page.total, 10);
    assert_eq!(
        server.requests(),
        vec!["/products/search?q=phone+1&limit=20&skip=0"]
    );
}

#[tokio::test]
async fn test_fetch_by_category() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let page = client
        .fetch_by_category("laptops", 20, 0)
        .await
        .expect("category page");

    assert_eq!(page.total, 20);
    assert!(page.products.iter().all(|p| p.category == "laptops"));
    assert_eq!(
        server.requests(),
        vec!["/products/category/laptops?limit=20&skip=0"]
    );
}

// ============================================================================
// Single products
// ============================================================================

#[tokio::test]
async fn test_fetch_one_decodes_product() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let product = client.fetch_one(ProductId::new(12)).await.expect("product");

    assert_eq!(product.title, "Phone 12");
    assert_eq!(product.brand.as_deref(), Some("Fixture"));
    // 12 % 12 == 0
    assert_eq!(product.stock_status(), StockStatus::OutOfStock);
    assert!(product.is_discounted());
}

#[tokio::test]
async fn test_fetch_one_unknown_id_is_not_found() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let result = client.fetch_one(ProductId::new(999)).await;

    assert_eq!(result, Err(CatalogError::NotFound(ProductId::new(999))));
}

#[tokio::test]
async fn test_fetch_one_is_cached() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let first = client.fetch_one(ProductId::new(3)).await.expect("first");
    let second = client.fetch_one(ProductId::new(3)).await.expect("second");

    assert_eq!(first, second);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_categories_are_cached() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let categories = client.fetch_categories().await.expect("categories");
    client.fetch_categories().await.expect("cached categories");

    let slugs: Vec<&str> = categories.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, vec!["smartphones", "laptops"]);
    assert_eq!(server.requests(), vec!["/products/categories"]);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let server = FixtureServer::start().await;
    let client = server.client();
    server.fail_next(StatusCode::BAD_REQUEST, Some("Invalid skip parameter"));

    let result = client.fetch_page(20, 0).await;

    assert_eq!(
        result,
        Err(CatalogError::RequestFailed(
            "Invalid skip parameter".to_string()
        ))
    );
}

#[tokio::test]
async fn test_plain_error_uses_status_message() {
    let server = FixtureServer::start().await;
    let client = server.client();
    server.fail_next(StatusCode::SERVICE_UNAVAILABLE, None);

    let result = client.fetch_page(20, 0).await;

    assert_eq!(
        result,
        Err(CatalogError::RequestFailed(
            "Request failed with status code 503".to_string()
        ))
    );
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = FixtureServer::start().await;
    let config = stockroom_catalog::CatalogConfig {
        timeout: Duration::from_millis(200),
        ..server.config()
    };
    let client = CatalogClient::new(&config).expect("client");
    server.delay_search("slow", Duration::from_secs(3));

    let result = client
        .fetch_by_search("slow", 20, 0, &CancellationToken::new())
        .await;

    assert_eq!(
        result,
        Err(CatalogError::RequestFailed("Request timed out".to_string()))
    );
}

#[tokio::test]
async fn test_cancelled_search_returns_promptly() {
    let server = FixtureServer::start().await;
    let client = server.client();
    server.delay_search("phone", Duration::from_secs(3));
    let cancel = CancellationToken::new();

    let canceller = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        }
    });
    let started = tokio::time::Instant::now();
    let result = client.fetch_by_search("phone", 20, 0, &cancel).await;

    assert_eq!(result, Err(CatalogError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
    canceller.await.expect("canceller");
}

// ============================================================================
// Composite views
// ============================================================================

#[tokio::test]
async fn test_similar_requests_one_extra_and_excludes_self() {
    let server = FixtureServer::start().await;
    let client = server.client();
    let product = client.fetch_one(ProductId::new(2)).await.expect("product");

    let similar = client.fetch_similar(&product, 6).await.expect("similar");

    let ids: Vec<u32> = similar.iter().map(|p| p.id.as_u32()).collect();
    assert_eq!(ids, vec![1, 3, 4, 5, 6, 7]);
    assert_eq!(
        server.requests().last().map(String::as_str),
        Some("/products/category/smartphones?limit=7&skip=0")
    );
}

#[tokio::test]
async fn test_product_detail_end_to_end() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let detail = load_product_detail(&client, ProductId::new(30))
        .await
        .expect("detail");

    assert_eq!(detail.product.title, "Laptop 30");
    assert_eq!(detail.similar.len(), 6);
    assert!(detail.similar.iter().all(|p| p.id != ProductId::new(30)));
}

#[tokio::test]
async fn test_category_overview_end_to_end() {
    let server = FixtureServer::start().await;
    let client = server.client();

    let overview = load_category_overview(&client).await.expect("overview");

    let rows: Vec<(&str, Option<&str>)> = overview
        .iter()
        .map(|o| (o.category.slug.as_str(), o.thumbnail.as_deref()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("smartphones", Some("https://cdn.example.com/1/thumbnail.webp")),
            ("laptops", Some("https://cdn.example.com/26/thumbnail.webp")),
        ]
    );
}
