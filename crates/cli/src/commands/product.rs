//! Product detail command.

use stockroom_catalog::detail::load_product_detail;
use stockroom_catalog::{CatalogClient, CatalogConfig};
use stockroom_core::ProductId;

use super::emit;
use crate::render;

/// Print one product with up to six similar products.
///
/// # Errors
///
/// Returns an error if the product does not exist or either lookup fails.
pub async fn show(config: &CatalogConfig, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let client = CatalogClient::new(config)?;
    let detail = load_product_detail(&client, id).await?;
    emit(&render::detail(&detail));
    Ok(())
}
