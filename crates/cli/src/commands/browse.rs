//! Interactive listing driven by stdin.
//!
//! Every plain line is treated as the current contents of a search box and is
//! debounced before it reaches the store, so typing `p`, `ph`, `pho` in quick
//! succession issues one search. Lines starting with `:` are commands.

use std::fmt::Write as _;

use stockroom_catalog::debounce::Debouncer;
use stockroom_catalog::store::{ListingState, SortedView};
use stockroom_catalog::{CatalogClient, CatalogConfig, ProductStore};
use stockroom_core::{ParseSortError, SortSpec};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use super::emit;
use crate::render;

const HELP: &str = "\
Type to search. Commands:
  :more              load the next page
  :sort <spec>       title-asc, title-desc, price-asc or price-desc
  :category <slug>   filter by category (`all` to clear)
  :categories        list category slugs
  :refresh           reload from the first page
  :retry             repeat the last failed load
  :help              show this help
  :quit              exit
";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    More,
    Sort(SortSpec),
    Category(Option<String>),
    Categories,
    Refresh,
    Retry,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Unknown command: {0} (try :help)")]
    Unknown(String),

    #[error("Missing argument for :{0}")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Sort(#[from] ParseSortError),
}

/// Parse one line of input.
///
/// # Errors
///
/// Returns `ParseCommandError` for unknown commands or bad arguments.
pub fn parse_line(line: &str) -> Result<BrowseCommand, ParseCommandError> {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Ok(BrowseCommand::Search(line.to_string()));
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));

    match name {
        "more" | "m" => Ok(BrowseCommand::More),
        "sort" | "s" => {
            if arg.is_empty() {
                return Err(ParseCommandError::MissingArgument("sort"));
            }
            Ok(BrowseCommand::Sort(arg.parse()?))
        }
        "category" | "c" => match arg {
            "" => Err(ParseCommandError::MissingArgument("category")),
            "all" => Ok(BrowseCommand::Category(None)),
            slug => Ok(BrowseCommand::Category(Some(slug.to_string()))),
        },
        "categories" => Ok(BrowseCommand::Categories),
        "refresh" | "r" => Ok(BrowseCommand::Refresh),
        "retry" => Ok(BrowseCommand::Retry),
        "help" | "h" => Ok(BrowseCommand::Help),
        "quit" | "q" => Ok(BrowseCommand::Quit),
        other => Err(ParseCommandError::Unknown(other.to_string())),
    }
}

/// Re-render the listing on every state change.
async fn render_updates(mut updates: watch::Receiver<ListingState>) {
    let view = SortedView::new();
    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        emit(&render::listing(&state, &view.get(&state)));
    }
}

fn category_list(state: &ListingState) -> String {
    if state.categories().is_empty() {
        return "No categories loaded\n".to_string();
    }
    let mut out = String::new();
    for category in state.categories() {
        let _ = writeln!(out, "  {:<24}  {}", category.slug, category.display_name());
    }
    out
}

/// Run the interactive listing until `:quit` or end of input.
///
/// # Errors
///
/// Returns an error if the client cannot be built or stdin cannot be read.
/// Fetch failures are shown in the listing, not returned.
pub async fn interactive(config: &CatalogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = CatalogClient::new(config)?;
    let store = ProductStore::new(client, config.page_size);
    let (debouncer, settled) = Debouncer::spawn(config.search_debounce);

    let renderer = tokio::spawn(render_updates(store.subscribe()));
    let follower = tokio::spawn({
        let store = store.clone();
        async move { store.follow_search_input(settled).await }
    });

    emit(HELP);
    store.refresh().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(BrowseCommand::Search(text)) => {
                debouncer.push(text);
            }
            Ok(BrowseCommand::More) => {
                store.load_more().await;
            }
            Ok(BrowseCommand::Sort(spec)) => store.set_sorting(spec.field, spec.order),
            Ok(BrowseCommand::Category(slug)) => {
                // The store clears the search, so retyping the last query
                // must reach it again.
                debouncer.forget();
                store.set_category(slug).await;
            }
            Ok(BrowseCommand::Categories) => {
                store.load_categories().await;
                emit(&category_list(&store.snapshot()));
            }
            Ok(BrowseCommand::Refresh) => {
                store.refresh().await;
            }
            Ok(BrowseCommand::Retry) => {
                store.retry().await;
            }
            Ok(BrowseCommand::Help) => emit(HELP),
            Ok(BrowseCommand::Quit) => break,
            Err(e) => emit(&format!("{e}\n")),
        }
    }

    // Dropping the debouncer discards any unsettled search and closes the
    // follower's input.
    drop(debouncer);
    follower.await?;
    renderer.abort();
    tracing::debug!("Browse session ended");
    Ok(())
}
