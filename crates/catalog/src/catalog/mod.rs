//! Remote product catalog client.
//!
//! # Architecture
//!
//! - [`CatalogApi`] is the seam between the product state container and the
//!   network. [`CatalogClient`] implements it over HTTP with `reqwest`.
//! - The catalog is the source of truth - NO local persistence.
//! - Immutable lookups (categories, single products) are cached in memory via
//!   `moka` for the session.
//! - The client keeps no "latest search" state. Callers that need to supersede
//!   a request pass a [`CancellationToken`] and cancel it.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockroom_catalog::catalog::{CatalogApi, CatalogClient};
//!
//! let client = CatalogClient::new(&config)?;
//!
//! let page = client.fetch_page(20, 0).await?;
//! let phones = client.fetch_by_category("smartphones", 20, 0).await?;
//! let similar = client.fetch_similar(&page.products[0], 6).await?;
//! ```

mod cache;
mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

use std::future::Future;

use stockroom_core::ProductId;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use client::CatalogClient;
pub use types::*;

/// Number of products requested per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Number of similar products shown on a product detail view.
pub const SIMILAR_PRODUCTS_LIMIT: usize = 6;

/// Message used when a failure carries no usable detail.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Timeout, network failure, non-2xx status or undecodable body.
    ///
    /// The message is suitable for showing to the user.
    #[error("{0}")]
    RequestFailed(String),

    /// The request was superseded and aborted. Never user-visible.
    #[error("Request cancelled")]
    Cancelled,

    /// The requested product does not exist.
    #[error("Product with id '{0}' not found")]
    NotFound(ProductId),
}

impl CatalogError {
    /// Build a `RequestFailed` from the best available message.
    ///
    /// Prefers the response body's message, then the transport message, then
    /// a generic fallback.
    #[must_use]
    pub fn request_failed(body_message: Option<&str>, transport_message: Option<&str>) -> Self {
        let message = [body_message, transport_message]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|m| !m.is_empty())
            .unwrap_or(FALLBACK_ERROR_MESSAGE);
        Self::RequestFailed(message.to_string())
    }

    /// Whether this error should be swallowed rather than shown.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Operations the dashboard needs from the catalog service.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog service via [`CatalogClient`]
/// - **Fake** (store tests): canned responses without HTTP
pub trait CatalogApi: Send + Sync {
    /// Unfiltered listing page.
    fn fetch_page(
        &self,
        limit: u32,
        skip: u32,
    ) -> impl Future<Output = Result<ProductPage, CatalogError>> + Send;

    /// Free-text search page.
    ///
    /// Resolves to [`CatalogError::Cancelled`] as soon as `cancel` fires; the
    /// in-flight request is dropped rather than left running.
    fn fetch_by_search(
        &self,
        query: &str,
        limit: u32,
        skip: u32,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ProductPage, CatalogError>> + Send;

    /// Listing page restricted to one category.
    fn fetch_by_category(
        &self,
        slug: &str,
        limit: u32,
        skip: u32,
    ) -> impl Future<Output = Result<ProductPage, CatalogError>> + Send;

    /// All categories, in catalog order.
    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// A single product.
    ///
    /// Fails with [`CatalogError::NotFound`] if the id does not resolve.
    fn fetch_one(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Up to `limit` other products from the same category.
    ///
    /// Requests `limit + 1` products so that excluding the product itself still
    /// leaves a full row. Never pads when the category is smaller.
    fn fetch_similar(
        &self,
        product: &Product,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send {
        async move {
            let request_limit = u32::try_from(limit.saturating_add(1)).unwrap_or(u32::MAX);
            let page = self
                .fetch_by_category(&product.category, request_limit, 0)
                .await?;
            Ok(select_similar(page.products, product.id, limit))
        }
    }
}

/// Drop `exclude` from `candidates` and keep at most `limit`, preserving order.
#[must_use]
pub fn select_similar(candidates: Vec<Product>, exclude: ProductId, limit: usize) -> Vec<Product> {
    candidates
        .into_iter()
        .filter(|p| p.id != exclude)
        .take(limit)
        .collect()
}

/// Race `fut` against `cancel`, dropping `fut` if the token fires first.
///
/// # Errors
///
/// Returns [`CatalogError::Cancelled`] if `cancel` fires before `fut` resolves,
/// otherwise whatever `fut` returns.
pub async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, CatalogError>>,
) -> Result<T, CatalogError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CatalogError::Cancelled),
        result = fut => result,
    }
}
