//! HTTP implementation of [`CatalogApi`].
//!
//! Uses `reqwest` for transport with a per-request timeout.
//! Caches categories and single products using `moka` (config TTL).

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use stockroom_core::ProductId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::types::{Category, Product, ProductPage};
use super::{CatalogApi, CatalogError, cancellable};
use crate::config::CatalogConfig;

const MAX_CACHE_ENTRIES: u64 = 1000;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the remote product catalog.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Error document returned by the catalog on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Status and body of a completed HTTP exchange.
struct RawResponse {
    status: StatusCode,
    body: String,
}

impl RawResponse {
    /// Decode a successful body, or turn a failure status into `RequestFailed`.
    fn into_json<T: DeserializeOwned>(self) -> Result<T, CatalogError> {
        if !self.status.is_success() {
            return Err(self.failure());
        }

        serde_json::from_str(&self.body).map_err(|e| {
            warn!(
                error = %e,
                body = %self.body.chars().take(500).collect::<String>(),
                "Failed to decode catalog response"
            );
            CatalogError::request_failed(None, Some(&format!("Invalid response: {e}")))
        })
    }

    fn failure(&self) -> CatalogError {
        warn!(
            status = %self.status,
            body = %self.body.chars().take(500).collect::<String>(),
            "Catalog returned non-success status"
        );
        let body_message = serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message);
        let transport_message = format!(
            "Request failed with status code {}",
            self.status.as_u16()
        );
        CatalogError::request_failed(body_message.as_deref(), Some(&transport_message))
    }
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `RequestFailed` if the HTTP client cannot be built (e.g. the TLS
    /// backend fails to initialize).
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("stockroom/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::request_failed(None, Some(&e.to_string())))?;

        let cache = Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The origin requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `{base}/{segments...}?{query}`.
    ///
    /// Segments are percent-encoded, so slugs and ids can be passed verbatim.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::request_failed(Some("Invalid catalog base URL"), None))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Issue a GET and read the whole body.
    async fn get(&self, url: Url) -> Result<RawResponse, CatalogError> {
        debug!(url = %url, "GET");

        let response = self
            .inner
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        Ok(RawResponse { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        self.get(url).await?.into_json()
    }
}

// =============================================================================
// CatalogApi
// =============================================================================

impl CatalogApi for CatalogClient {
    #[instrument(skip(self))]
    async fn fetch_page(&self, limit: u32, skip: u32) -> Result<ProductPage, CatalogError> {
        let url = self.endpoint(&["products"], &paging(limit, skip))?;
        self.get_json(url).await
    }

    #[instrument(skip(self, cancel))]
    async fn fetch_by_search(
        &self,
        query: &str,
        limit: u32,
        skip: u32,
        cancel: &CancellationToken,
    ) -> Result<ProductPage, CatalogError> {
        let mut params = vec![("q", query.to_string())];
        params.extend(paging(limit, skip));
        let url = self.endpoint(&["products", "search"], &params)?;

        let result = cancellable(cancel, self.get_json(url)).await;
        if matches!(result, Err(CatalogError::Cancelled)) {
            debug!("Search request aborted");
        }
        result
    }

    #[instrument(skip(self))]
    async fn fetch_by_category(
        &self,
        slug: &str,
        limit: u32,
        skip: u32,
    ) -> Result<ProductPage, CatalogError> {
        let url = self.endpoint(&["products", "category", slug], &paging(limit, skip))?;
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories.as_ref().clone());
        }

        let url = self.endpoint(&["products", "categories"], &[])?;
        let categories: Vec<Category> = self.get_json(url).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::new(categories.clone())),
            )
            .await;

        Ok(categories)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn fetch_one(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product.as_ref().clone());
        }

        let id_segment = id.to_string();
        let url = self.endpoint(&["products", id_segment.as_str()], &[])?;
        let response = self.get(url).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        let product: Product = response.into_json()?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Arc::new(product.clone())))
            .await;

        Ok(product)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn paging(limit: u32, skip: u32) -> Vec<(&'static str, String)> {
    vec![("limit", limit.to_string()), ("skip", skip.to_string())]
}

/// Normalize a transport-level failure.
fn transport_error(e: reqwest::Error) -> CatalogError {
    warn!(error = %e, "Catalog request failed");
    if e.is_timeout() {
        return CatalogError::request_failed(None, Some("Request timed out"));
    }
    CatalogError::request_failed(None, Some(&e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> CatalogClient {
        let config = CatalogConfig {
            base_url: Url::parse(base).unwrap(),
            ..CatalogConfig::default()
        };
        CatalogClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments_and_query() {
        let client = client_for("https://dummyjson.com");
        let url = client
            .endpoint(&["products", "search"], &[("q", "phone case".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "https://dummyjson.com/products/search?q=phone+case");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client_for("http://localhost:8080/api/");
        let url = client
            .endpoint(&["products", "category", "mens-shirts"], &paging(20, 40))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/products/category/mens-shirts?limit=20&skip=40"
        );
    }

    #[test]
    fn test_endpoint_encodes_slug() {
        let client = client_for("https://dummyjson.com");
        let url = client.endpoint(&["products", "category", "a/b"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://dummyjson.com/products/category/a%2Fb");
    }

    #[test]
    fn test_failure_uses_body_message() {
        let raw = RawResponse {
            status: StatusCode::NOT_FOUND,
            body: r#"{"message":"Product with id '0' not found"}"#.to_string(),
        };
        let err = raw.into_json::<ProductPage>().unwrap_err();
        assert_eq!(err.to_string(), "Product with id '0' not found");
    }

    #[test]
    fn test_failure_without_body_uses_status() {
        let raw = RawResponse {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>bad gateway</html>".to_string(),
        };
        let err = raw.into_json::<ProductPage>().unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 502");
    }

    #[test]
    fn test_undecodable_success_body_is_request_failed() {
        let raw = RawResponse {
            status: StatusCode::OK,
            body: "{\"products\": 3}".to_string(),
        };
        let err = raw.into_json::<ProductPage>().unwrap_err();
        assert!(matches!(err, CatalogError::RequestFailed(ref m) if m.starts_with("Invalid response")));
    }
}
