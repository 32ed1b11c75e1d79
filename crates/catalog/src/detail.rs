//! Product detail view: one product plus similar products.

use stockroom_core::ProductId;
use tracing::instrument;

use crate::catalog::{CatalogApi, CatalogError, Product, SIMILAR_PRODUCTS_LIMIT};

/// Everything the detail view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    /// Other products from the same category, at most
    /// [`SIMILAR_PRODUCTS_LIMIT`].
    pub similar: Vec<Product>,
}

/// Load a product and its similar products.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] for an unknown id, or any error from
/// either lookup.
#[instrument(skip(api), fields(product_id = %id))]
pub async fn load_product_detail<A: CatalogApi>(
    api: &A,
    id: ProductId,
) -> Result<ProductDetail, CatalogError> {
    let product = api.fetch_one(id).await?;
    let similar = api.fetch_similar(&product, SIMILAR_PRODUCTS_LIMIT).await?;
    Ok(ProductDetail { product, similar })
}
