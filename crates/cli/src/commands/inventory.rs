//! One-shot inventory listing.

use stockroom_catalog::{CatalogClient, CatalogConfig, ProductStore};
use stockroom_core::SortSpec;

use super::{emit, ensure_loaded};
use crate::render;

/// Which listing to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Search(String),
    Category(String),
}

/// Load up to `pages` pages and print them in `sort` order.
///
/// Stops early once the catalog reports nothing more to load.
///
/// # Errors
///
/// Returns an error if the client cannot be built or any page fails to load.
pub async fn list(
    config: &CatalogConfig,
    filter: Filter,
    sort: SortSpec,
    pages: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = CatalogClient::new(config)?;
    let store = ProductStore::new(client, config.page_size);
    store.set_sorting(sort.field, sort.order);

    let first = match filter {
        Filter::All => store.refresh().await,
        Filter::Search(query) => store.set_search(query).await,
        Filter::Category(slug) => store.set_category(Some(slug)).await,
    };
    ensure_loaded(first)?;

    for _ in 1..pages {
        if !store.snapshot().has_more() {
            break;
        }
        ensure_loaded(store.load_more().await)?;
    }

    let state = store.snapshot();
    tracing::info!(
        loaded = state.products_unsorted().len(),
        total = state.total(),
        "Inventory loaded"
    );
    emit(&render::listing(&state, &store.products()));
    Ok(())
}
