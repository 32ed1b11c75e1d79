//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog reports prices as plain JSON numbers in a single store
//! currency, so a `Price` is just a decimal amount. Comparisons are exact,
//! which keeps client-side price sorting stable.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Apply a percentage discount, rounding half-up to cents.
    ///
    /// Percentages outside `0..=100` are clamped.
    #[must_use]
    pub fn discounted(&self, percentage: Decimal) -> Self {
        let pct = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let factor = Decimal::ONE - pct / Decimal::ONE_HUNDRED;
        Self(
            (self.0 * factor)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("9.99").unwrap();
        assert_eq!(price, Price::from_cents(999));
    }

    #[test]
    fn test_price_display_two_decimals() {
        assert_eq!(Price::from_cents(1000).to_string(), "$10.00");
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
    }

    #[test]
    fn test_discounted_rounds_to_cents() {
        // 9.99 * (1 - 0.1048) = 8.943048
        let price = Price::from_cents(999);
        let discounted = price.discounted(Decimal::new(1048, 2));
        assert_eq!(discounted, Price::from_cents(894));
    }

    #[test]
    fn test_discounted_clamps_percentage() {
        let price = Price::from_cents(500);
        assert_eq!(price.discounted(Decimal::new(150, 0)), Price::from_cents(0));
        assert_eq!(price.discounted(Decimal::new(-5, 0)), price);
    }

    #[test]
    fn test_price_ordering_is_numeric() {
        assert!(Price::from_cents(1000) < Price::from_cents(2000));
        assert!(Price::from_cents(900) < Price::from_cents(1000));
    }
}
