//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `CATALOG_BASE_URL` - Catalog service origin (default: <https://dummyjson.com>)
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `CATALOG_PAGE_SIZE` - Products per listing page (default: 20)
//! - `CATALOG_SEARCH_DEBOUNCE_MS` - Search input quiescence window (default: 300)
//! - `CATALOG_CACHE_TTL_SECS` - Lifetime of cached categories/products (default: 300)

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::catalog::DEFAULT_PAGE_SIZE;

/// Default catalog service origin.
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Remote catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Origin every request is made against
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Products requested per listing page
    pub page_size: u32,
    /// Quiescence window before search input is applied
    pub search_debounce: Duration,
    /// How long immutable lookups stay cached
    pub cache_ttl: Duration,
}

impl Default for CatalogConfig {
    // DEFAULT_BASE_URL is a literal absolute URL.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "CATALOG_BASE_URL",
            &lookup("CATALOG_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;
        let timeout = Duration::from_secs(parse_or_default(
            &lookup,
            "CATALOG_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let page_size = parse_or_default(&lookup, "CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let search_debounce = Duration::from_millis(parse_or_default(
            &lookup,
            "CATALOG_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE_MS,
        )?);
        let cache_ttl = Duration::from_secs(parse_or_default(
            &lookup,
            "CATALOG_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?);

        Ok(Self {
            base_url,
            timeout,
            page_size,
            search_debounce,
            cache_ttl,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse the catalog origin, accepting only http(s) URLs.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported URL: {raw}"),
        ));
    }
    Ok(url)
}
