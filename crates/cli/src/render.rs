//! Plain-text rendering of listings, overviews and product details.
//!
//! Everything here returns a `String`; commands decide where it goes.

use std::fmt::Write as _;
use std::sync::Arc;

use stockroom_catalog::catalog::{CategoryOverview, Product};
use stockroom_catalog::detail::ProductDetail;
use stockroom_catalog::store::{ListingState, Phase};

const TITLE_WIDTH: usize = 36;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// One inventory row: id, title, price, stock and status.
pub fn product_row(product: &Product) -> String {
    let price = if product.is_discounted() {
        format!("{} ({})", product.discounted_price(), product.price)
    } else {
        product.price.to_string()
    };
    format!(
        "{:>5}  {:<width$}  {:>18}  {:>5}  {}",
        product.id,
        truncate(&product.title, TITLE_WIDTH),
        price,
        product.stock,
        product.stock_status().label(),
        width = TITLE_WIDTH,
    )
}

fn describe_filters(state: &ListingState) -> String {
    let filters = state.filters();
    if !filters.search.is_empty() {
        format!("search \"{}\"", filters.search)
    } else if let Some(slug) = &filters.category {
        format!("category {slug}")
    } else {
        "all products".to_string()
    }
}

/// The listing as a table with a status header and footer.
pub fn listing(state: &ListingState, products: &[Arc<Product>]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} | {} of {} | sort {}",
        describe_filters(state),
        products.len(),
        state.total(),
        state.filters().sort,
    );

    for product in products {
        let _ = writeln!(out, "{}", product_row(product));
    }

    match state.phase() {
        Phase::Loading(_) => out.push_str("Loading...\n"),
        Phase::Error => {
            let _ = writeln!(out, "Error: {}", state.error().unwrap_or_default());
        }
        Phase::Loaded if products.is_empty() => out.push_str("No products found\n"),
        Phase::Loaded if state.has_more() => out.push_str("More available\n"),
        Phase::Idle | Phase::Loaded => {}
    }
    out
}

/// Category overview, one category per line.
pub fn overview(entries: &[CategoryOverview]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<24}  {}",
            entry.category.display_name(),
            entry.thumbnail.as_deref().unwrap_or("-"),
        );
    }
    if entries.is_empty() {
        out.push_str("No categories\n");
    }
    out
}

/// Product detail followed by its similar products.
pub fn detail(detail: &ProductDetail) -> String {
    let product = &detail.product;
    let mut out = String::new();

    let _ = writeln!(out, "{} (#{})", product.title, product.id);
    if let Some(brand) = &product.brand {
        let _ = writeln!(out, "Brand: {brand}");
    }
    let _ = writeln!(out, "Category: {}", product.category);
    if product.is_discounted() {
        let _ = writeln!(
            out,
            "Price: {} (was {}, -{}%)",
            product.discounted_price(),
            product.price,
            product.discount_percentage.round_dp(0),
        );
    } else {
        let _ = writeln!(out, "Price: {}", product.price);
    }
    let _ = writeln!(
        out,
        "Stock: {} ({})",
        product.stock,
        product.stock_status().label()
    );
    let _ = writeln!(out, "Rating: {:.1}", product.rating);
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }

    out.push_str("\nSimilar products:\n");
    if detail.similar.is_empty() {
        out.push_str("  none\n");
    }
    for similar in &detail.similar {
        let _ = writeln!(out, "  {:>5}  {}  {}", similar.id, similar.title, similar.price);
    }
    out
}
