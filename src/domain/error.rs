//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

use super::MovementKind;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant
/// failures. They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Movement amount failed validation
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Invalid amount (format, scale, or limit)
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Movement kind is missing its required source account
    #[error("{0} requires a source account")]
    MissingSourceAccount(MovementKind),

    /// Movement kind is missing its required destination account
    #[error("{0} requires a destination account")]
    MissingDestinationAccount(MovementKind),

    /// Insufficient balance for a debit.
    /// Movement execution never raises this; debits may drive an account
    /// balance negative.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },
}

impl From<super::AmountError> for DomainError {
    fn from(err: super::AmountError) -> Self {
        match err {
            super::AmountError::NotPositive(_) => DomainError::NonPositiveAmount,
            other => DomainError::InvalidAmount(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_account_messages() {
        let err = DomainError::MissingSourceAccount(MovementKind::Withdrawal);
        assert_eq!(err.to_string(), "WITHDRAWAL requires a source account");

        let err = DomainError::MissingDestinationAccount(MovementKind::Deposit);
        assert_eq!(err.to_string(), "DEPOSIT requires a destination account");
    }

    #[test]
    fn test_non_positive_amount_from_amount_error() {
        let err: DomainError = super::super::AmountError::NotPositive(Decimal::ZERO).into();
        assert_eq!(err, DomainError::NonPositiveAmount);
        assert_eq!(err.to_string(), "amount must be greater than zero");
    }

    #[test]
    fn test_parse_error_maps_to_invalid_amount() {
        let err: DomainError =
            super::super::AmountError::ParseError("bad input".to_string()).into();
        assert!(matches!(err, DomainError::InvalidAmount(_)));
    }
}
