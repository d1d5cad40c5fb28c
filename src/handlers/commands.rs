//! Command definitions
//!
//! Commands represent intentions to change the system state.

use uuid::Uuid;

use crate::domain::{Amount, DomainError, MovementKind};

/// Command to execute a financial movement.
#[derive(Debug, Clone)]
pub struct MovementCommand {
    /// Tenant every referenced entity is scoped to
    pub tenant_id: Uuid,
    /// Source account (required for WITHDRAWAL and TRANSFER)
    pub from_account_id: Option<Uuid>,
    /// Destination account (required for DEPOSIT and TRANSFER)
    pub to_account_id: Option<Uuid>,
    /// Amount to move (as string for precise decimal)
    pub amount: String,
    /// Kind of movement
    pub kind: MovementKind,
}

impl MovementCommand {
    pub fn new(tenant_id: Uuid, kind: MovementKind, amount: String) -> Self {
        Self {
            tenant_id,
            from_account_id: None,
            to_account_id: None,
            amount,
            kind,
        }
    }

    pub fn with_from(mut self, account_id: Uuid) -> Self {
        self.from_account_id = Some(account_id);
        self
    }

    pub fn with_to(mut self, account_id: Uuid) -> Self {
        self.to_account_id = Some(account_id);
        self
    }

    /// Parse and validate the amount.
    ///
    /// This is the only validation that runs before the unit of work is
    /// opened; everything else needs data.
    pub fn parsed_amount(&self) -> Result<Amount, DomainError> {
        self.amount.parse::<Amount>().map_err(DomainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_command_builder() {
        let tenant_id = Uuid::new_v4();
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();

        let cmd = MovementCommand::new(tenant_id, MovementKind::Transfer, "100.00".to_string())
            .with_from(from)
            .with_to(to);

        assert_eq!(cmd.tenant_id, tenant_id);
        assert_eq!(cmd.from_account_id, Some(from));
        assert_eq!(cmd.to_account_id, Some(to));
        assert_eq!(cmd.kind, MovementKind::Transfer);
    }

    #[test]
    fn test_parsed_amount_valid() {
        let cmd = MovementCommand::new(Uuid::new_v4(), MovementKind::Deposit, "100.00".to_string());
        assert_eq!(cmd.parsed_amount().unwrap().value(), dec!(100.00));
    }

    #[test]
    fn test_parsed_amount_zero_rejected() {
        let cmd = MovementCommand::new(Uuid::new_v4(), MovementKind::Deposit, "0".to_string());
        assert_eq!(cmd.parsed_amount(), Err(DomainError::NonPositiveAmount));
    }

    #[test]
    fn test_parsed_amount_negative_rejected() {
        let cmd =
            MovementCommand::new(Uuid::new_v4(), MovementKind::Withdrawal, "-5.00".to_string());
        assert_eq!(cmd.parsed_amount(), Err(DomainError::NonPositiveAmount));
    }

    #[test]
    fn test_parsed_amount_garbage_rejected() {
        let cmd = MovementCommand::new(Uuid::new_v4(), MovementKind::Deposit, "abc".to_string());
        assert!(matches!(
            cmd.parsed_amount(),
            Err(DomainError::InvalidAmount(_))
        ));
    }
}
