//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod sort;
pub mod status;

pub use id::*;
pub use price::Price;
pub use sort::{ParseSortError, SortField, SortOrder, SortSpec};
pub use status::*;
