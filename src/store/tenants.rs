//! Tenant store

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

/// Isolation boundary for all other entities.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Store for tenant rows.
#[derive(Debug, Clone)]
pub struct TenantStore {
    pool: PgPool,
}

impl TenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str) -> AppResult<Tenant> {
        let tenant: Tenant = sqlx::query_as(
            r#"
            INSERT INTO tenants (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(tenant_id = %tenant.id, "Tenant created");

        Ok(tenant)
    }

    pub async fn get(&self, tenant_id: Uuid) -> AppResult<Option<Tenant>> {
        let tenant = sqlx::query_as(
            r#"
            SELECT id, name, created_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }
}
