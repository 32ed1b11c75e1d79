//! Stockroom - terminal inventory dashboard.
//!
//! # Usage
//!
//! ```bash
//! # First page of the inventory, cheapest first
//! stockroom inventory --sort price-asc
//!
//! # Search, loading three pages
//! stockroom inventory --search phone --pages 3
//!
//! # Category overview with thumbnails
//! stockroom categories
//!
//! # Product detail with similar products
//! stockroom product 42
//!
//! # Interactive listing driven by stdin
//! stockroom browse
//! ```
//!
//! # Environment Variables
//!
//! See [`stockroom_catalog::config`] for catalog settings. Additionally:
//! - `SENTRY_DSN` - Forward warnings and errors to Sentry (optional)
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (optional)
//! - `RUST_LOG` - Log filter (default: `stockroom_catalog=info,stockroom_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use stockroom_catalog::CatalogConfig;
use stockroom_core::{ProductId, SortSpec};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about = "Stockroom inventory dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with optional search, category and sort
    Inventory {
        /// Free-text search
        #[arg(short, long, conflicts_with = "category")]
        search: Option<String>,

        /// Category slug
        #[arg(short, long)]
        category: Option<String>,

        /// Display order (`title-asc`, `title-desc`, `price-asc`, `price-desc`)
        #[arg(long, default_value = "title-asc")]
        sort: SortSpec,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Show every category with a representative thumbnail
    Categories,
    /// Show one product and similar products
    Product {
        /// Product id
        id: ProductId,
    },
    /// Interactive listing; type to search, `:help` for commands
    Browse,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stockroom_catalog=info,stockroom_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;
    tracing::debug!(base_url = %config.base_url, page_size = config.page_size, "Loaded configuration");

    match cli.command {
        Commands::Inventory {
            search,
            category,
            sort,
            pages,
        } => {
            let filter = match (search, category) {
                (Some(query), _) => commands::inventory::Filter::Search(query),
                (None, Some(slug)) => commands::inventory::Filter::Category(slug),
                (None, None) => commands::inventory::Filter::All,
            };
            commands::inventory::list(&config, filter, sort, pages).await?;
        }
        Commands::Categories => commands::categories::overview(&config).await?,
        Commands::Product { id } => commands::product::show(&config, id).await?,
        Commands::Browse => commands::browse::interactive(&config).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_and_category_conflict() {
        let result = Cli::try_parse_from([
            "stockroom",
            "inventory",
            "--search",
            "phone",
            "--category",
            "laptops",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sort_is_parsed() {
        let cli = Cli::try_parse_from(["stockroom", "inventory", "--sort", "price-desc"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Inventory { sort, .. }) if sort.to_string() == "price-desc"
        ));
    }

    #[test]
    fn test_invalid_product_id_is_rejected() {
        assert!(Cli::try_parse_from(["stockroom", "product", "abc"]).is_err());
    }
}
