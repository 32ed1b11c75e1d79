//! Listing state published by the product store.

use std::sync::Arc;

use stockroom_core::SortSpec;
use tokio_util::sync::CancellationToken;

use crate::catalog::{Category, Product};

/// Active listing criteria.
///
/// `search` and `category` are mutually exclusive; the store clears one when
/// the other is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filters {
    /// Free-text query; empty means inactive.
    pub search: String,
    /// Category slug; `None` means all categories.
    pub category: Option<String>,
    pub sort: SortSpec,
}

impl Filters {
    /// Which endpoint the current filters route to.
    #[must_use]
    pub fn query(&self) -> ListingQuery {
        if !self.search.is_empty() {
            ListingQuery::Search(self.search.clone())
        } else if let Some(slug) = &self.category {
            ListingQuery::Category(slug.clone())
        } else {
            ListingQuery::All
        }
    }
}

/// Endpoint a listing fetch is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingQuery {
    All,
    Search(String),
    Category(String),
}

/// Whether a fetch replaces or extends the loaded list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Reset,
    Append,
}

/// Coarse lifecycle of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    Loading(FetchKind),
    Loaded,
    Error,
}

/// Snapshot of everything a view needs to render the listing.
#[derive(Debug, Clone)]
pub struct ListingState {
    pub(super) filters: Filters,
    /// Loaded products in arrival order.
    pub(super) products: Vec<Arc<Product>>,
    /// Bumped whenever `products` changes.
    pub(super) revision: u64,
    pub(super) total: u32,
    pub(super) skip: u32,
    pub(super) has_more: bool,
    pub(super) loading: Option<FetchKind>,
    pub(super) error: Option<String>,
    pub(super) failed: Option<FetchKind>,
    pub(super) fetched: bool,
    pub(super) categories: Arc<Vec<Category>>,
    pub(super) categories_loading: bool,
    pub(super) categories_loaded: bool,
    pub(super) epoch: u64,
    pub(super) cancel: CancellationToken,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            products: Vec::new(),
            revision: 0,
            total: 0,
            skip: 0,
            has_more: true,
            loading: None,
            error: None,
            failed: None,
            fetched: false,
            categories: Arc::new(Vec::new()),
            categories_loading: false,
            categories_loaded: false,
            epoch: 0,
            cancel: CancellationToken::new(),
        }
    }
}

impl ListingState {
    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Loaded products in the order the server returned them.
    ///
    /// Use [`SortedView`](super::SortedView) for display order.
    #[must_use]
    pub fn products_unsorted(&self) -> &[Arc<Product>] {
        &self.products
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Server-reported number of matching products.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Offset the next page will be requested from.
    #[must_use]
    pub const fn skip(&self) -> u32 {
        self.skip
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// User-visible error message from the last failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub const fn categories_loading(&self) -> bool {
        self.categories_loading
    }

    /// Current epoch; bumped by every filter change and refresh.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        if let Some(kind) = self.loading {
            Phase::Loading(kind)
        } else if self.error.is_some() {
            Phase::Error
        } else if self.fetched {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }
}
