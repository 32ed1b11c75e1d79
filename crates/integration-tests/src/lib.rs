//! Integration tests for Stockroom.
//!
//! Runs the real HTTP client and product store against an in-process catalog
//! fixture served by `axum` on an ephemeral port. No network access needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockroom-integration-tests
//! ```
//!
//! # Fixture Catalog
//!
//! [`FixtureServer::start`] serves 45 products:
//! - ids 1-25: `smartphones`, titled `Phone 01`..`Phone 25`
//! - ids 26-45: `laptops`, titled `Laptop 26`..`Laptop 45`
//!
//! Prices are `id * 10` dollars.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use stockroom_catalog::{CatalogClient, CatalogConfig};
use tokio::task::JoinHandle;
use url::Url;

/// Number of products in the fixture catalog.
pub const FIXTURE_PRODUCTS: u32 = 45;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Fixture State
// =============================================================================

/// Injected failure for the next request.
#[derive(Debug, Clone)]
struct Failure {
    status: StatusCode,
    message: Option<String>,
}

#[derive(Default)]
struct FixtureState {
    products: Vec<Value>,
    requests: Mutex<Vec<String>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    next_failure: Mutex<Option<Failure>>,
}

impl FixtureState {
    fn matching(&self, predicate: impl Fn(&Value) -> bool) -> Vec<Value> {
        self.products.iter().filter(|p| predicate(p)).cloned().collect()
    }
}

/// Build a product document in the catalog's wire format.
#[must_use]
pub fn product_json(id: u32, title: &str, category: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{title} description"),
        "category": category,
        "price": id * 10,
        "discountPercentage": 5.5,
        "rating": 4.2,
        "stock": id % 12,
        "tags": [category],
        "brand": "Fixture",
        "sku": format!("FIX-{id:04}"),
        "thumbnail": format!("https://cdn.example.com/{id}/thumbnail.webp"),
        "images": [format!("https://cdn.example.com/{id}/1.webp")],
    })
}

fn fixture_products() -> Vec<Value> {
    (1..=FIXTURE_PRODUCTS)
        .map(|id| {
            if id <= 25 {
                product_json(id, &format!("Phone {id:02}"), "smartphones")
            } else {
                product_json(id, &format!("Laptop {id:02}"), "laptops")
            }
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    skip: usize,
}

const fn default_limit() -> usize {
    30
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    skip: usize,
}

fn page(matches: Vec<Value>, paging: &Paging) -> Json<Value> {
    let total = matches.len();
    let products: Vec<Value> = matches
        .into_iter()
        .skip(paging.skip)
        .take(paging.limit)
        .collect();
    Json(json!({
        "products": products,
        "total": total,
        "skip": paging.skip,
        "limit": paging.limit,
    }))
}

fn not_found(message: String) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
}

async fn list(State(state): State<Arc<FixtureState>>, Query(paging): Query<Paging>) -> Json<Value> {
    page(state.products.clone(), &paging)
}

async fn search(
    State(state): State<Arc<FixtureState>>,
    Query(params): Query<SearchParams>,
) -> Json<Value> {
    let delay = lock(&state.search_delays).get(&params.q).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let needle = params.q.to_lowercase();
    let matches = state.matching(|p| {
        p["title"]
            .as_str()
            .is_some_and(|t| t.to_lowercase().contains(&needle))
    });
    let paging = Paging {
        limit: params.limit,
        skip: params.skip,
    };
    page(matches, &paging)
}

async fn categories(State(state): State<Arc<FixtureState>>) -> Json<Value> {
    let mut slugs: Vec<&str> = state
        .products
        .iter()
        .filter_map(|p| p["category"].as_str())
        .collect();
    slugs.dedup();
    let list: Vec<Value> = slugs
        .into_iter()
        .map(|slug| {
            json!({
                "slug": slug,
                "name": slug.replace('-', " "),
                "url": format!("https://catalog.example.com/products/category/{slug}"),
            })
        })
        .collect();
    Json(Value::Array(list))
}

async fn by_category(
    State(state): State<Arc<FixtureState>>,
    Path(slug): Path<String>,
    Query(paging): Query<Paging>,
) -> Json<Value> {
    page(
        state.matching(|p| p["category"].as_str() == Some(slug.as_str())),
        &paging,
    )
}

async fn one(State(state): State<Arc<FixtureState>>, Path(id): Path<String>) -> Response {
    let found = id.parse::<u64>().ok().and_then(|id| {
        state
            .products
            .iter()
            .find(|p| p["id"].as_u64() == Some(id))
            .cloned()
    });
    match found {
        Some(product) => Json(product).into_response(),
        None => not_found(format!("Product with id '{id}' not found")),
    }
}

/// Record every request and serve any injected failure instead.
async fn intercept(State(state): State<Arc<FixtureState>>, request: Request, next: Next) -> Response {
    lock(&state.requests).push(request.uri().to_string());

    let failure = lock(&state.next_failure).take();
    if let Some(failure) = failure {
        return match failure.message {
            Some(message) => (failure.status, Json(json!({ "message": message }))).into_response(),
            None => (failure.status, "upstream unavailable").into_response(),
        };
    }

    next.run(request).await
}

// =============================================================================
// FixtureServer
// =============================================================================

/// In-process catalog server. Stops when dropped.
pub struct FixtureServer {
    base_url: Url,
    state: Arc<FixtureState>,
    task: JoinHandle<()>,
}

impl FixtureServer {
    /// Serve the standard fixture catalog.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        Self::with_products(fixture_products()).await
    }

    /// Serve an arbitrary product list.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn with_products(products: Vec<Value>) -> Self {
        let state = Arc::new(FixtureState {
            products,
            ..FixtureState::default()
        });

        let app = Router::new()
            .route("/products", get(list))
            .route("/products/search", get(search))
            .route("/products/categories", get(categories))
            .route("/products/category/{slug}", get(by_category))
            .route("/products/{id}", get(one))
            .layer(middleware::from_fn_with_state(Arc::clone(&state), intercept))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fixture listener");
        let addr = listener
            .local_addr()
            .expect("Fixture listener has no address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url =
            Url::parse(&format!("http://{addr}")).expect("Fixture address is a valid URL");
        Self {
            base_url,
            state,
            task,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Catalog config pointed at this server.
    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(5),
            ..CatalogConfig::default()
        }
    }

    /// A client for this server with default settings.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&self.config()).expect("Failed to build catalog client")
    }

    /// Path and query of every request served so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state.requests).clone()
    }

    /// Delay search responses for `query`.
    pub fn delay_search(&self, query: &str, delay: Duration) {
        lock(&self.state.search_delays).insert(query.to_string(), delay);
    }

    /// Fail the next request with `status`, with or without a JSON message.
    pub fn fail_next(&self, status: StatusCode, message: Option<&str>) {
        *lock(&self.state.next_failure) = Some(Failure {
            status,
            message: message.map(str::to_string),
        });
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
