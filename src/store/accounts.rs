//! Account store
//!
//! Tenant-scoped account lookups and balance mutation. Account balances are
//! written only through `debit`/`credit` here, always inside the movement
//! unit of work.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::Amount;
use crate::error::{AppError, AppResult};

/// Balance-holding account, optionally owned by a profile.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub name: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub tenant_id: Uuid,
    pub profile_id: Option<Uuid>,
    pub name: String,
}

/// Store for account rows.
#[derive(Debug, Clone)]
pub struct AccountStore {
    pool: PgPool,
}

impl AccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve an account inside the caller's transaction, scoped by tenant.
    /// Soft-deleted rows are treated as absent.
    pub async fn find_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        tenant_id: Uuid,
    ) -> AppResult<Account> {
        let account: Option<Account> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, profile_id, name, balance, created_at, updated_at, deleted_at
            FROM accounts
            WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(account_id)
        .bind(tenant_id)
        .fetch_optional(&mut **tx)
        .await?;

        account.ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))
    }

    /// Subtract `amount` from the account balance.
    /// No overdraft check; the balance may go negative.
    pub async fn debit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        tenant_id: Uuid,
        amount: &Amount,
    ) -> AppResult<()> {
        self.apply_delta(tx, account_id, tenant_id, -amount.value())
            .await
    }

    /// Add `amount` to the account balance.
    pub async fn credit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        tenant_id: Uuid,
        amount: &Amount,
    ) -> AppResult<()> {
        self.apply_delta(tx, account_id, tenant_id, amount.value())
            .await
    }

    /// Apply a signed balance delta and bump the modification timestamp.
    async fn apply_delta(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        tenant_id: Uuid,
        delta: Decimal,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(account_id)
        .bind(tenant_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::AccountNotFound(account_id.to_string()));
        }

        Ok(())
    }

    /// Create a new account with a zero balance.
    pub async fn create(&self, input: &CreateAccount) -> AppResult<Account> {
        let account: Account = sqlx::query_as(
            r#"
            INSERT INTO accounts (id, tenant_id, profile_id, name, balance)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING id, tenant_id, profile_id, name, balance, created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.tenant_id)
        .bind(input.profile_id)
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            account_id = %account.id,
            tenant_id = %account.tenant_id,
            "Account created"
        );

        Ok(account)
    }

    /// Read an account for the HTTP shell.
    pub async fn get(&self, account_id: Uuid, tenant_id: Uuid) -> AppResult<Option<Account>> {
        let account = sqlx::query_as(
            r#"
            SELECT id, tenant_id, profile_id, name, balance, created_at, updated_at, deleted_at
            FROM accounts
            WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(account_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// List a tenant's live accounts.
    pub async fn list_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<Account>> {
        let accounts = sqlx::query_as(
            r#"
            SELECT id, tenant_id, profile_id, name, balance, created_at, updated_at, deleted_at
            FROM accounts
            WHERE tenant_id = $1 AND deleted_at IS NULL
            ORDER BY created_at
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }
}
