//! Category overview: every category with a representative thumbnail.

use futures::future::join_all;
use tracing::{instrument, warn};

use crate::catalog::{CatalogApi, CatalogError, Category, CategoryOverview};

/// Pair each category with the thumbnail of its first product.
///
/// Lookups run concurrently. A category whose lookup fails, or which has no
/// products, gets no thumbnail; the overview itself never fails. Output order
/// matches `categories`.
pub async fn category_overview<A: CatalogApi>(
    api: &A,
    categories: &[Category],
) -> Vec<CategoryOverview> {
    join_all(categories.iter().map(|category| async move {
        let thumbnail = match api.fetch_by_category(&category.slug, 1, 0).await {
            Ok(page) => page
                .products
                .into_iter()
                .next()
                .map(|p| p.thumbnail)
                .filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(category = %category.slug, error = %e, "Thumbnail lookup failed");
                None
            }
        };
        CategoryOverview {
            category: category.clone(),
            thumbnail,
        }
    }))
    .await
}

/// Fetch the category list and build its overview.
///
/// # Errors
///
/// Returns `CatalogError` if the category list itself cannot be fetched.
#[instrument(skip(api))]
pub async fn load_category_overview<A: CatalogApi>(
    api: &A,
) -> Result<Vec<CategoryOverview>, CatalogError> {
    let categories = api.fetch_categories().await?;
    Ok(category_overview(api, &categories).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fake::{FakeCatalog, product_in};

    fn catalog() -> FakeCatalog {
        FakeCatalog::with_products([
            product_in(1, "phones"),
            product_in(2, "phones"),
            product_in(3, "laptops"),
            product_in(4, "tablets"),
        ])
    }

    #[tokio::test]
    async fn test_overview_uses_first_product_thumbnail() {
        let api = catalog();

        let overview = load_category_overview(&api).await.unwrap();

        let rows: Vec<(&str, Option<&str>)> = overview
            .iter()
            .map(|o| (o.category.slug.as_str(), o.thumbnail.as_deref()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("phones", Some("https://cdn.example.com/1/thumbnail.webp")),
                ("laptops", Some("https://cdn.example.com/3/thumbnail.webp")),
                ("tablets", Some("https://cdn.example.com/4/thumbnail.webp")),
            ]
        );
        assert!(api.calls().category_limits.iter().all(|&limit| limit == 1));
    }

    #[tokio::test]
    async fn test_failed_lookup_yields_no_thumbnail() {
        let api = catalog();
        api.fail(
            "category:laptops:0",
            CatalogError::RequestFailed("down".to_string()),
        );

        let overview = load_category_overview(&api).await.unwrap();

        assert_eq!(overview.len(), 3);
        assert!(overview[0].thumbnail.is_some());
        assert_eq!(overview[1].thumbnail, None);
        assert!(overview[2].thumbnail.is_some());
    }

    #[tokio::test]
    async fn test_empty_category_yields_no_thumbnail() {
        let api = catalog();
        let ghost = Category {
            slug: "ghost".to_string(),
            name: "Ghost".to_string(),
            url: String::new(),
        };

        let overview = category_overview(&api, &[ghost]).await;

        assert_eq!(overview[0].thumbnail, None);
    }

    #[tokio::test]
    async fn test_category_list_failure_is_an_error() {
        let api = catalog();
        api.fail("categories", CatalogError::RequestFailed("down".to_string()));

        let result = load_category_overview(&api).await;

        assert_eq!(result, Err(CatalogError::RequestFailed("down".to_string())));
    }
}
