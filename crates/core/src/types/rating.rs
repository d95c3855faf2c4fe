//! Review rating type.

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    /// Rating outside the 1-5 star range.
    #[error("rating must be between 1 and 5")]
    OutOfRange,
}

/// A star rating between 1 and 5 (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    /// Validate a raw value as a rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] unless 1 <= value <= 5.
    pub fn parse(value: i32) -> Result<Self, RatingError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange)
        }
    }

    /// The number of stars.
    #[must_use]
    pub const fn stars(&self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounds() {
        assert!(Rating::parse(1).is_ok());
        assert!(Rating::parse(5).is_ok());
        assert_eq!(Rating::parse(0), Err(RatingError::OutOfRange));
        assert_eq!(Rating::parse(6), Err(RatingError::OutOfRange));
        assert_eq!(Rating::parse(-3), Err(RatingError::OutOfRange));
    }
}
