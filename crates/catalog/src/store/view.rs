//! Client-side ordering of loaded products.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, PoisonError};

use stockroom_core::{SortField, SortOrder, SortSpec};

use super::state::ListingState;
use crate::catalog::Product;

/// Compare titles case-insensitively, putting lowercase first on ties.
fn compare_titles(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    // Uppercase code points sort before lowercase, so flip the raw comparison.
    folded.then_with(|| b.cmp(a))
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Title => compare_titles(&a.title, &b.title),
        SortField::Price => a.price.cmp(&b.price),
    }
}

/// Sort `products` by `spec` without touching the input.
///
/// The sort is stable, so products with equal keys keep arrival order in
/// both directions.
#[must_use]
pub fn sorted(products: &[Arc<Product>], spec: SortSpec) -> Vec<Arc<Product>> {
    let mut out = products.to_vec();
    out.sort_by(|a, b| {
        let ord = compare(a, b, spec.field);
        match spec.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    out
}

struct Memo {
    revision: u64,
    spec: SortSpec,
    view: Arc<[Arc<Product>]>,
}

/// Memoized display-order projection of a [`ListingState`].
///
/// Recomputes only when the loaded products or the sort criteria change.
#[derive(Default)]
pub struct SortedView {
    memo: Mutex<Option<Memo>>,
}

impl std::fmt::Debug for SortedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedView").finish_non_exhaustive()
    }
}

impl SortedView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Products of `state` in display order.
    pub fn get(&self, state: &ListingState) -> Arc<[Arc<Product>]> {
        let spec = state.filters().sort;
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(m) = memo.as_ref()
            && m.revision == state.revision()
            && m.spec == spec
        {
            return Arc::clone(&m.view);
        }

        let view: Arc<[Arc<Product>]> = sorted(state.products_unsorted(), spec).into();
        *memo = Some(Memo {
            revision: state.revision(),
            spec,
            view: Arc::clone(&view),
        });
        view
    }
}
