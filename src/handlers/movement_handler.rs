//! Movement Handler
//!
//! Executes a financial movement inside a single database transaction:
//! account resolution, ownership authorization, balance mutation, ledger
//! entry insert, and profile aggregate refresh all commit or roll back
//! together. The post-commit notification lives outside that boundary.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthorizationGuard;
use crate::domain::{CallerIdentity, DomainError, EntryStatus, MovementKind};
use crate::error::AppResult;
use crate::events::EventDispatcher;
use crate::store::{Account, AccountStore, LedgerEntry, LedgerEntryStore, NewLedgerEntry, ProfileStore};

use super::MovementCommand;

/// Handler for deposits, withdrawals, and transfers.
pub struct MovementHandler {
    accounts: AccountStore,
    entries: LedgerEntryStore,
    profiles: ProfileStore,
    guard: AuthorizationGuard,
    dispatcher: EventDispatcher,
    pool: PgPool,
    tx_timeout_secs: u64,
}

impl MovementHandler {
    pub fn new(pool: PgPool, dispatcher: EventDispatcher) -> Self {
        Self {
            accounts: AccountStore::new(pool.clone()),
            entries: LedgerEntryStore::new(pool.clone()),
            profiles: ProfileStore::new(pool.clone()),
            guard: AuthorizationGuard::new(pool.clone()),
            dispatcher,
            pool,
            tx_timeout_secs: 0,
        }
    }

    /// Apply a statement timeout to movement transactions.
    /// Zero leaves the engine default in place.
    pub fn with_tx_timeout(mut self, secs: u64) -> Self {
        self.tx_timeout_secs = secs;
        self
    }

    /// Execute the movement command.
    pub async fn execute(
        &self,
        command: MovementCommand,
        caller: &CallerIdentity,
    ) -> AppResult<LedgerEntry> {
        // Fail fast: the transactional path is never entered on a bad amount.
        let amount = command.parsed_amount()?;

        let mut tx = self.pool.begin().await?;

        if self.tx_timeout_secs > 0 {
            sqlx::query(&format!(
                "SET LOCAL statement_timeout = '{}s'",
                self.tx_timeout_secs
            ))
            .execute(&mut *tx)
            .await?;
        }

        // Resolve every referenced account, scoped to the tenant.
        let from_account = match command.from_account_id {
            Some(account_id) => Some(
                self.accounts
                    .find_by_id(&mut tx, account_id, command.tenant_id)
                    .await?,
            ),
            None => None,
        };
        let to_account = match command.to_account_id {
            Some(account_id) => Some(
                self.accounts
                    .find_by_id(&mut tx, account_id, command.tenant_id)
                    .await?,
            ),
            None => None,
        };

        // Every profile-owned account requires ownership or master privilege.
        for account in [&from_account, &to_account].into_iter().flatten() {
            if let Some(profile_id) = account.profile_id {
                self.guard
                    .require_profile_owner_or_master(&mut tx, profile_id, command.tenant_id, caller)
                    .await?;
            }
        }

        // Each kind enforces its own required accounts and applies exactly
        // its balance deltas.
        let (from_id, to_id) = match command.kind {
            MovementKind::Transfer => {
                let from = from_account
                    .as_ref()
                    .ok_or(DomainError::MissingSourceAccount(command.kind))?;
                let to = to_account
                    .as_ref()
                    .ok_or(DomainError::MissingDestinationAccount(command.kind))?;

                self.accounts
                    .debit(&mut tx, from.id, command.tenant_id, &amount)
                    .await?;
                self.accounts
                    .credit(&mut tx, to.id, command.tenant_id, &amount)
                    .await?;

                (Some(from.id), Some(to.id))
            }
            MovementKind::Withdrawal => {
                let from = from_account
                    .as_ref()
                    .ok_or(DomainError::MissingSourceAccount(command.kind))?;

                self.accounts
                    .debit(&mut tx, from.id, command.tenant_id, &amount)
                    .await?;

                (Some(from.id), None)
            }
            MovementKind::Deposit => {
                let to = to_account
                    .as_ref()
                    .ok_or(DomainError::MissingDestinationAccount(command.kind))?;

                self.accounts
                    .credit(&mut tx, to.id, command.tenant_id, &amount)
                    .await?;

                (None, Some(to.id))
            }
        };

        let entry = self
            .entries
            .create(
                &mut tx,
                NewLedgerEntry {
                    tenant_id: command.tenant_id,
                    from_account_id: from_id,
                    to_account_id: to_id,
                    amount: amount.value(),
                    entry_type: command.kind,
                    status: EntryStatus::Completed,
                    created_by: caller.actor(),
                },
            )
            .await?;

        // A transfer between two accounts of one profile touches one
        // profile, not two.
        for profile_id in touched_profiles(&from_account, &to_account) {
            self.profiles
                .refresh_balance(&mut tx, profile_id, command.tenant_id)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            entry_id = %entry.id,
            tenant_id = %entry.tenant_id,
            kind = %entry.entry_type,
            amount = %entry.amount,
            "Movement committed"
        );

        // Best-effort; a lost notification never rolls back the entry.
        self.dispatcher.entry_recorded(&entry).await;

        Ok(entry)
    }
}

/// Distinct profile ids owning the touched accounts, in first-touch order.
fn touched_profiles(from: &Option<Account>, to: &Option<Account>) -> Vec<Uuid> {
    let mut profiles = Vec::new();
    for account in [from, to].into_iter().flatten() {
        if let Some(profile_id) = account.profile_id {
            if !profiles.contains(&profile_id) {
                profiles.push(profile_id);
            }
        }
    }
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn account(profile_id: Option<Uuid>) -> Account {
        Account {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            profile_id,
            name: "wallet".to_string(),
            balance: dec!(0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_touched_profiles_deduplicates() {
        let profile_id = Uuid::new_v4();
        let from = Some(account(Some(profile_id)));
        let to = Some(account(Some(profile_id)));

        assert_eq!(touched_profiles(&from, &to), vec![profile_id]);
    }

    #[test]
    fn test_touched_profiles_two_distinct() {
        let from = Some(account(Some(Uuid::new_v4())));
        let to = Some(account(Some(Uuid::new_v4())));

        let touched = touched_profiles(&from, &to);
        assert_eq!(touched.len(), 2);
    }

    #[test]
    fn test_touched_profiles_skips_unowned() {
        let profile_id = Uuid::new_v4();
        let from = Some(account(None));
        let to = Some(account(Some(profile_id)));

        assert_eq!(touched_profiles(&from, &to), vec![profile_id]);
    }

    #[test]
    fn test_touched_profiles_empty_for_system_accounts() {
        let from = Some(account(None));
        assert!(touched_profiles(&from, &None).is_empty());
    }
}
