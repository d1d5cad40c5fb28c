//! Ledger entry store
//!
//! Persists the immutable record of a movement. One insert per executed
//! movement; entries are never created outside a unit of work that also
//! mutated the referenced balances.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{EntryStatus, MovementKind};
use crate::error::AppResult;

/// Immutable record of one financial movement.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    pub amount: Decimal,
    pub entry_type: MovementKind,
    pub status: EntryStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for persisting a new ledger entry.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub tenant_id: Uuid,
    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    pub amount: Decimal,
    pub entry_type: MovementKind,
    pub status: EntryStatus,
    pub created_by: String,
}

/// Store for ledger entry rows.
#[derive(Debug, Clone)]
pub struct LedgerEntryStore {
    pool: PgPool,
}

impl LedgerEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new entry inside the caller's transaction.
    /// Timestamps are assigned by the database server.
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: NewLedgerEntry,
    ) -> AppResult<LedgerEntry> {
        let persisted: LedgerEntry = sqlx::query_as(
            r#"
            INSERT INTO ledger_entries
                (id, tenant_id, from_account_id, to_account_id, amount, entry_type, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, tenant_id, from_account_id, to_account_id, amount, entry_type, status,
                      created_by, created_at, updated_by, updated_at, deleted_by, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.tenant_id)
        .bind(entry.from_account_id)
        .bind(entry.to_account_id)
        .bind(entry.amount)
        .bind(entry.entry_type)
        .bind(entry.status)
        .bind(&entry.created_by)
        .fetch_one(&mut **tx)
        .await?;

        Ok(persisted)
    }

    /// Read an entry for the HTTP shell.
    pub async fn find_by_id(
        &self,
        entry_id: Uuid,
        tenant_id: Uuid,
    ) -> AppResult<Option<LedgerEntry>> {
        let entry = sqlx::query_as(
            r#"
            SELECT id, tenant_id, from_account_id, to_account_id, amount, entry_type, status,
                   created_by, created_at, updated_by, updated_at, deleted_by, deleted_at
            FROM ledger_entries
            WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(entry_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// List the entries touching an account, newest first.
    pub async fn list_for_account(
        &self,
        account_id: Uuid,
        tenant_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as(
            r#"
            SELECT id, tenant_id, from_account_id, to_account_id, amount, entry_type, status,
                   created_by, created_at, updated_by, updated_at, deleted_by, deleted_at
            FROM ledger_entries
            WHERE tenant_id = $2 AND deleted_at IS NULL
              AND (from_account_id = $1 OR to_account_id = $1)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(account_id)
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
