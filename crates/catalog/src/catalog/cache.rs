//! Cache types for catalog API responses.

use std::sync::Arc;

use stockroom_core::ProductId;

use super::types::{Category, Product};

/// Cache key for immutable catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Product(Arc<Product>),
}
