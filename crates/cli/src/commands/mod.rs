//! Subcommand implementations.

pub mod browse;
pub mod categories;
pub mod inventory;
pub mod product;

use stockroom_catalog::CatalogError;
use stockroom_catalog::store::FetchOutcome;

/// Write rendered output to stdout.
#[allow(clippy::print_stdout)]
fn emit(text: &str) {
    print!("{text}");
}

/// Turn a failed store fetch into an error.
fn ensure_loaded(outcome: FetchOutcome) -> Result<(), CatalogError> {
    match outcome {
        FetchOutcome::Failed(e) => Err(e),
        FetchOutcome::Applied | FetchOutcome::Superseded | FetchOutcome::Skipped => Ok(()),
    }
}
