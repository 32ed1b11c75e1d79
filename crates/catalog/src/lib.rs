//! Stockroom catalog library.
//!
//! Talks to the remote product catalog and keeps the shared listing state
//! that inventory views render from:
//!
//! - [`catalog`] - HTTP client behind the [`catalog::CatalogApi`] trait
//! - [`store`] - listing state with pagination, filters and client-side sort
//! - [`debounce`] - settles rapid search input before it reaches the store
//! - [`overview`] / [`detail`] - one-shot category and product views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod detail;
pub mod overview;
pub mod store;

pub use catalog::{CatalogApi, CatalogClient, CatalogError};
pub use config::{CatalogConfig, ConfigError};
pub use store::ProductStore;
