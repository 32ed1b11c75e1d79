//! Shared state container for the product listing.
//!
//! # Architecture
//!
//! - State lives in a `tokio::sync::watch` channel. Views subscribe to it and
//!   re-render on change; mutators update it atomically.
//! - Every filter change and refresh starts a new **epoch**. The previous
//!   epoch's [`CancellationToken`] is cancelled and any response tagged with
//!   an older epoch is discarded on arrival, so superseded requests can never
//!   overwrite newer results.
//! - Sorting is applied client-side through [`SortedView`] and never touches
//!   the network.
//! - No lock is held across an `.await`.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockroom_catalog::store::ProductStore;
//!
//! let store = ProductStore::new(client, config.page_size);
//! store.refresh().await;
//! store.set_category(Some("laptops".into())).await;
//! store.load_more().await;
//!
//! let state = store.snapshot();
//! for product in store.products().iter() {
//!     println!("{} {}", product.title, product.price);
//! }
//! ```

mod state;
mod view;

use std::sync::Arc;

use stockroom_core::{SortField, SortOrder, SortSpec};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::catalog::{CatalogApi, CatalogError, Product, ProductPage, cancellable};

pub use state::{FetchKind, Filters, ListingQuery, ListingState, Phase};
pub use view::{SortedView, sorted};

/// What happened to a requested fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the state.
    Applied,
    /// The fetch failed and the error was recorded in the state.
    Failed(CatalogError),
    /// A newer epoch began before the response arrived.
    Superseded,
    /// No request was made (already loading or nothing more to load).
    Skipped,
}

/// Everything needed to run one listing fetch and apply its result.
struct Ticket {
    epoch: u64,
    cancel: CancellationToken,
    query: ListingQuery,
    skip: u32,
    kind: FetchKind,
}

// =============================================================================
// ProductStore
// =============================================================================

/// Product listing state shared by every view.
///
/// Cheap to clone; clones share the same state.
pub struct ProductStore<A> {
    inner: Arc<StoreInner<A>>,
}

struct StoreInner<A> {
    api: A,
    page_size: u32,
    state: watch::Sender<ListingState>,
    view: SortedView,
}

impl<A> Clone for ProductStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for ProductStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore")
            .field("page_size", &self.inner.page_size)
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<A: CatalogApi> ProductStore<A> {
    /// Create an idle store. Nothing is fetched until a mutator is called.
    ///
    /// A `page_size` of zero is treated as one.
    pub fn new(api: A, page_size: u32) -> Self {
        let (state, _) = watch::channel(ListingState::default());
        Self {
            inner: Arc::new(StoreInner {
                api,
                page_size: page_size.max(1),
                state,
                view: SortedView::new(),
            }),
        }
    }

    /// The catalog this store reads from.
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.inner.state.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ListingState {
        self.inner.state.borrow().clone()
    }

    /// Loaded products in display order.
    #[must_use]
    pub fn products(&self) -> Arc<[Arc<Product>]> {
        let state = self.inner.state.borrow();
        self.inner.view.get(&state)
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Search by free text, clearing any category filter.
    ///
    /// An empty string returns the listing to unfiltered.
    #[instrument(skip(self, query), fields(query))]
    pub async fn set_search(&self, query: impl Into<String>) -> FetchOutcome {
        let query = query.into();
        tracing::Span::current().record("query", query.as_str());
        let ticket = self.begin_search(query);
        self.run(ticket).await
    }

    /// Restrict to one category (or `None` for all), clearing any search.
    #[instrument(skip(self))]
    pub async fn set_category(&self, slug: Option<String>) -> FetchOutcome {
        let ticket = self.begin_epoch(|filters| {
            filters.category = slug;
            filters.search.clear();
        });
        self.run(ticket).await
    }

    /// Change display order. Never fetches.
    pub fn set_sorting(&self, field: SortField, order: SortOrder) {
        let spec = SortSpec::new(field, order);
        self.inner.state.send_if_modified(|state| {
            if state.filters.sort == spec {
                return false;
            }
            debug!(sort = %spec, "Sort changed");
            state.filters.sort = spec;
            true
        });
    }

    /// Fetch the next page with the current filters and append it.
    ///
    /// Does nothing while a fetch is in flight or once everything is loaded.
    /// With nothing loaded yet (idle, or after a failed reset) the first page
    /// is fetched as a reset.
    #[instrument(skip(self))]
    pub async fn load_more(&self) -> FetchOutcome {
        let mut ticket = None;
        self.inner.state.send_if_modified(|state| {
            if state.loading.is_some() || !state.has_more {
                return false;
            }
            let kind = if state.products.is_empty() && state.skip == 0 {
                FetchKind::Reset
            } else {
                FetchKind::Append
            };
            state.loading = Some(kind);
            ticket = Some(Ticket {
                epoch: state.epoch,
                cancel: state.cancel.clone(),
                query: state.filters.query(),
                skip: state.skip,
                kind,
            });
            true
        });

        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => {
                debug!("Load more skipped");
                FetchOutcome::Skipped
            }
        }
    }

    /// Reload from the first page with the current filters.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> FetchOutcome {
        let ticket = self.begin_epoch(|_| {});
        self.run(ticket).await
    }

    /// Repeat whichever fetch last failed.
    ///
    /// A failed append is retried as an append; anything else refreshes.
    pub async fn retry(&self) -> FetchOutcome {
        let failed = self.inner.state.borrow().failed;
        if failed == Some(FetchKind::Append) {
            self.clear_error();
            self.load_more().await
        } else {
            self.refresh().await
        }
    }

    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|state| {
            state.failed = None;
            state.error.take().is_some()
        });
    }

    /// Fetch the category list once per store.
    ///
    /// Failures are logged and leave the list empty; the listing itself is
    /// unaffected.
    #[instrument(skip(self))]
    pub async fn load_categories(&self) {
        let mut start = false;
        self.inner.state.send_if_modified(|state| {
            if state.categories_loaded || state.categories_loading {
                return false;
            }
            state.categories_loading = true;
            start = true;
            true
        });
        if !start {
            return;
        }

        let result = self.inner.api.fetch_categories().await;

        self.inner.state.send_modify(|state| {
            state.categories_loading = false;
            match result {
                Ok(categories) => {
                    debug!(count = categories.len(), "Categories loaded");
                    state.categories = Arc::new(categories);
                    state.categories_loaded = true;
                }
                Err(e) => warn!(error = %e, "Failed to load categories"),
            }
        });
    }

    /// Apply each settled search string as it arrives.
    ///
    /// Epochs start here in arrival order, so the last value received is the
    /// one whose results stick; only the fetches run concurrently. Returns
    /// once `settled` closes and outstanding fetches finish.
    pub async fn follow_search_input(&self, mut settled: mpsc::Receiver<String>)
    where
        A: 'static,
    {
        let mut tasks = JoinSet::new();
        while let Some(query) = settled.recv().await {
            debug!(query = %query, "Settled search input");
            let ticket = self.begin_search(query);
            let store = self.clone();
            tasks.spawn(async move {
                store.run(ticket).await;
            });
            while tasks.try_join_next().is_some() {}
        }
        while tasks.join_next().await.is_some() {}
    }

    // =========================================================================
    // Fetch lifecycle
    // =========================================================================

    /// Set `query` as the search, clearing any category, in a new epoch.
    fn begin_search(&self, query: String) -> Ticket {
        self.begin_epoch(|filters| {
            filters.search = query;
            filters.category = None;
        })
    }

    /// Apply `update` to the filters, supersede the current epoch and clear
    /// the list for a first-page fetch.
    fn begin_epoch(&self, update: impl FnOnce(&mut Filters)) -> Ticket {
        let cancel = CancellationToken::new();
        let mut epoch = 0;
        let mut query = ListingQuery::All;

        self.inner.state.send_modify(|state| {
            update(&mut state.filters);

            state.cancel.cancel();
            state.cancel = cancel.clone();
            state.epoch += 1;

            state.products.clear();
            state.revision += 1;
            state.total = 0;
            state.skip = 0;
            state.has_more = true;
            state.error = None;
            state.failed = None;
            state.loading = Some(FetchKind::Reset);

            epoch = state.epoch;
            query = state.filters.query();
        });

        Ticket {
            epoch,
            cancel,
            query,
            skip: 0,
            kind: FetchKind::Reset,
        }
    }

    async fn run(&self, ticket: Ticket) -> FetchOutcome {
        let api = &self.inner.api;
        let limit = self.inner.page_size;
        let skip = ticket.skip;

        let result = match &ticket.query {
            ListingQuery::All => cancellable(&ticket.cancel, api.fetch_page(limit, skip)).await,
            ListingQuery::Search(query) => {
                api.fetch_by_search(query, limit, skip, &ticket.cancel)
                    .await
            }
            ListingQuery::Category(slug) => {
                cancellable(&ticket.cancel, api.fetch_by_category(slug, limit, skip)).await
            }
        };

        self.apply(&ticket, result)
    }

    fn apply(&self, ticket: &Ticket, result: Result<ProductPage, CatalogError>) -> FetchOutcome {
        let page_size = self.inner.page_size;
        let mut outcome = FetchOutcome::Superseded;

        self.inner.state.send_if_modified(|state| {
            if state.epoch != ticket.epoch {
                debug!(
                    epoch = ticket.epoch,
                    current = state.epoch,
                    "Discarding superseded response"
                );
                return false;
            }

            match result {
                Ok(page) => {
                    let received = u32::try_from(page.products.len()).unwrap_or(u32::MAX);
                    let fresh = page.products.into_iter().map(Arc::new);
                    match ticket.kind {
                        FetchKind::Reset => {
                            state.products = fresh.collect();
                            state.skip = page_size;
                        }
                        FetchKind::Append => {
                            state.products.extend(fresh);
                            state.skip = state.skip.saturating_add(page_size);
                        }
                    }
                    state.total = page.total;
                    state.has_more = ticket.skip.saturating_add(received) < page.total;
                    state.revision += 1;
                    state.loading = None;
                    state.error = None;
                    state.failed = None;
                    state.fetched = true;
                    debug!(
                        received,
                        total = page.total,
                        has_more = state.has_more,
                        "Page applied"
                    );
                    outcome = FetchOutcome::Applied;
                    true
                }
                // Only a newer epoch cancels, and that was handled above.
                Err(CatalogError::Cancelled) => false,
                Err(e) => {
                    warn!(error = %e, kind = ?ticket.kind, "Listing fetch failed");
                    state.loading = None;
                    state.error = Some(e.to_string());
                    state.failed = Some(ticket.kind);
                    outcome = FetchOutcome::Failed(e);
                    true
                }
            }
        });

        outcome
    }
}
