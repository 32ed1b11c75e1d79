//! Category overview command.

use stockroom_catalog::overview::load_category_overview;
use stockroom_catalog::{CatalogClient, CatalogConfig};

use super::emit;
use crate::render;

/// Print every category with the thumbnail of its first product.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the category list cannot
/// be fetched. Individual thumbnail failures only blank that thumbnail.
pub async fn overview(config: &CatalogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = CatalogClient::new(config)?;
    let entries = load_category_overview(&client).await?;
    tracing::info!(categories = entries.len(), "Loaded category overview");
    emit(&render::overview(&entries));
    Ok(())
}
