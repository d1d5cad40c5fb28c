//! Amount type
//!
//! Positive monetary value, validated when constructed. A movement request
//! carries its amount as a string; parsing it into an `Amount` is the only
//! validation that can run before the unit of work opens.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest movement the API accepts, one trillion.
const CEILING: Decimal = Decimal::from_parts(3567587328, 232, 0, false, 0);

/// Fractional digits beyond this are rejected rather than rounded.
const SCALE_LIMIT: u32 = 8;

/// A validated, strictly positive monetary amount.
///
/// Construction is the only way in; a value that exists is in range.
///
/// # Example
/// ```
/// use tesoro::domain::Amount;
///
/// let amount: Amount = "250.75".parse().unwrap();
/// assert_eq!(amount.to_string(), "250.75");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

/// Why a candidate value was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be greater than zero (got {0})")]
    NotPositive(Decimal),

    #[error("amount carries {0} decimal places, limit is {SCALE_LIMIT}")]
    TooManyDecimals(u32),

    #[error("amount exceeds the maximum of {CEILING}")]
    Overflow,

    #[error("invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Validate `value` and wrap it.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            Err(AmountError::NotPositive(value))
        } else if value.scale() > SCALE_LIMIT {
            Err(AmountError::TooManyDecimals(value.scale()))
        } else if value > CEILING {
            Err(AmountError::Overflow)
        } else {
            Ok(Self(value))
        }
    }

    /// The wrapped decimal, scale preserved.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .map_err(|e| AmountError::ParseError(e.to_string()))
            .and_then(Amount::new)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ceiling_constant_is_one_trillion() {
        assert_eq!(CEILING, Decimal::from_str("1000000000000").unwrap());
    }

    #[test]
    fn test_accepts_positive_value() {
        assert_eq!(Amount::new(dec!(42.50)).unwrap().value(), dec!(42.50));
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(matches!(
            Amount::new(Decimal::ZERO),
            Err(AmountError::NotPositive(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-0.01)),
            Err(AmountError::NotPositive(_))
        ));
    }

    #[test]
    fn test_rejects_excess_scale() {
        // Nine fractional digits, one over the limit
        let result = "0.000000001".parse::<Amount>();
        assert!(matches!(result, Err(AmountError::TooManyDecimals(9))));
    }

    #[test]
    fn test_ceiling_is_inclusive() {
        assert!("1000000000000".parse::<Amount>().is_ok());
        assert!(matches!(
            "1000000000000.01".parse::<Amount>(),
            Err(AmountError::Overflow)
        ));
    }

    #[test]
    fn test_parse_failure_reports_format() {
        let result = "ten dollars".parse::<Amount>();
        assert!(matches!(result, Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_string_roundtrip_keeps_scale() {
        let amount: Amount = "100.00".parse().unwrap();
        assert_eq!(String::from(amount), "100.00");
    }
}
