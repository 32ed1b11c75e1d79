//! Client-side sort criteria for product listings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field a product listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Title,
    Price,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A `(field, order)` pair, written as `field-order` (e.g. `price-desc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

/// Error parsing a sort field, order, or spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort {kind}: {value}")]
pub struct ParseSortError {
    kind: &'static str,
    value: String,
}

impl SortSpec {
    #[must_use]
    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Price => write!(f, "price"),
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "price" => Ok(Self::Price),
            _ => Err(ParseSortError {
                kind: "field",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseSortError {
                kind: "order",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.field, self.order)
    }
}

impl std::str::FromStr for SortSpec {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = s.split_once('-').ok_or_else(|| ParseSortError {
            kind: "spec",
            value: s.to_string(),
        })?;
        Ok(Self {
            field: field.parse()?,
            order: order.parse()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_spec_round_trips_through_display() {
        for spec in ["title-asc", "title-desc", "price-asc", "price-desc"] {
            assert_eq!(spec.parse::<SortSpec>().unwrap().to_string(), spec);
        }
    }

    #[test]
    fn test_sort_spec_default_is_title_asc() {
        assert_eq!(
            SortSpec::default(),
            SortSpec::new(SortField::Title, SortOrder::Asc)
        );
    }

    #[test]
    fn test_sort_spec_rejects_garbage() {
        let err = "rating-asc".parse::<SortSpec>().unwrap_err();
        assert_eq!(err.to_string(), "invalid sort field: rating");
        assert!("price".parse::<SortSpec>().is_err());
        assert!("price-up".parse::<SortSpec>().is_err());
    }
}
