//! Validated price type.
//!
//! Prices are stored as BSON doubles (the catalog was migrated from a system
//! that stored `Number` prices), so the wrapper is over `f64` with the
//! non-negative / finite invariant enforced at parse time.

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`Price`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// Negative prices are not allowed.
    #[error("price cannot be negative")]
    Negative,
    /// NaN / infinity.
    #[error("price must be a finite number")]
    NotFinite,
}

/// A non-negative, finite price in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// Validate a raw amount as a price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero and
    /// [`PriceError::NotFinite`] for NaN or infinite values.
    pub fn parse(amount: f64) -> Result<Self, PriceError> {
        if !amount.is_finite() {
            return Err(PriceError::NotFinite);
        }
        if amount < 0.0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The amount in dollars.
    #[must_use]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    /// The amount in whole cents, rounded half-up. Square's payments API
    /// takes amounts in the smallest currency unit.
    #[must_use]
    pub fn cents(&self) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        {
            (self.0 * 100.0).round() as i64
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Price::parse(0.0).is_ok());
        assert!(Price::parse(24.50).is_ok());
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse(-0.01), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_not_finite() {
        assert_eq!(Price::parse(f64::NAN), Err(PriceError::NotFinite));
        assert_eq!(Price::parse(f64::INFINITY), Err(PriceError::NotFinite));
    }

    #[test]
    fn test_cents() {
        assert_eq!(Price::parse(19.99).unwrap().cents(), 1999);
        assert_eq!(Price::parse(0.1).unwrap().cents(), 10);
        assert_eq!(Price::parse(7.0).unwrap().cents(), 700);
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::parse(5.5).unwrap().display(), "$5.50");
    }
}
