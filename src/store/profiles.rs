//! Profile store and balance aggregation
//!
//! A profile's `balance` column is a cached aggregate over the accounts it
//! owns. It is recomputed from scratch inside every unit of work that touches
//! one of those accounts, never maintained incrementally.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppResult;

/// Tenant-scoped identity with a cached aggregate balance.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a profile.
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

/// Store for profile rows.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    pool: PgPool,
}

impl ProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sum the balances of the profile's live accounts.
    pub async fn calculate_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        profile_id: Uuid,
        tenant_id: Uuid,
    ) -> AppResult<Decimal> {
        let balance: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(balance), 0)
            FROM accounts
            WHERE profile_id = $1 AND tenant_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(profile_id)
        .bind(tenant_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(balance)
    }

    /// Recompute the aggregate balance and persist it onto the profile row.
    pub async fn refresh_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        profile_id: Uuid,
        tenant_id: Uuid,
    ) -> AppResult<Decimal> {
        let balance = self.calculate_balance(tx, profile_id, tenant_id).await?;

        sqlx::query(
            r#"
            UPDATE profiles
            SET balance = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(profile_id)
        .bind(tenant_id)
        .bind(balance)
        .execute(&mut **tx)
        .await?;

        tracing::debug!(
            profile_id = %profile_id,
            balance = %balance,
            "Profile balance recomputed"
        );

        Ok(balance)
    }

    /// Create a new profile with a zero aggregate balance.
    pub async fn create(&self, input: &CreateProfile) -> AppResult<Profile> {
        let profile: Profile = sqlx::query_as(
            r#"
            INSERT INTO profiles (id, tenant_id, user_id, balance)
            VALUES ($1, $2, $3, 0)
            RETURNING id, tenant_id, user_id, balance, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.tenant_id)
        .bind(input.user_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            profile_id = %profile.id,
            tenant_id = %profile.tenant_id,
            "Profile created"
        );

        Ok(profile)
    }

    /// Read a profile for the HTTP shell.
    pub async fn get(&self, profile_id: Uuid, tenant_id: Uuid) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as(
            r#"
            SELECT id, tenant_id, user_id, balance, created_at, updated_at
            FROM profiles
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(profile_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// List a tenant's profiles.
    pub async fn list_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<Profile>> {
        let profiles = sqlx::query_as(
            r#"
            SELECT id, tenant_id, user_id, balance, created_at, updated_at
            FROM profiles
            WHERE tenant_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }
}
