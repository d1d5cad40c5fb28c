//! Movement kinds and ledger entry status

use serde::{Deserialize, Serialize};

/// Kind of financial movement recorded by a ledger entry.
///
/// Each kind carries its own required-field invariant:
/// - `Deposit` requires a destination account
/// - `Withdrawal` requires a source account
/// - `Transfer` requires both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl MovementKind {
    /// Get string representation for database and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a ledger entry.
///
/// Movement execution only ever writes `Completed`; `Pending` and `Failed`
/// belong to the separate entry update/delete flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
