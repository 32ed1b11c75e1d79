//! Stockroom Core - Shared types library.
//!
//! This crate provides common types used across all Stockroom components:
//! - `catalog` - Remote catalog client, product state container, debounced input
//! - `cli` - Terminal front end for browsing the catalogue
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, stock and sort enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
