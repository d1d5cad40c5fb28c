//! Authorization guard
//!
//! Ownership and privilege checks for profile-owned accounts. Master users
//! pass every check; everyone else must own the profile being touched.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::CallerIdentity;
use crate::error::{AppError, AppResult};

/// Caller's resolved user record.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRecord {
    id: Uuid,
    is_master: bool,
    is_active: bool,
}

/// Guard enforcing profile ownership and master privilege.
#[derive(Debug, Clone)]
pub struct AuthorizationGuard {
    pool: PgPool,
}

impl AuthorizationGuard {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Require that the caller owns `profile_id` or is a master user.
    /// Runs inside the caller's transaction.
    pub async fn require_profile_owner_or_master(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        profile_id: Uuid,
        tenant_id: Uuid,
        caller: &CallerIdentity,
    ) -> AppResult<()> {
        let user = self.resolve_caller(tx, caller).await?;

        if user.is_master {
            return Ok(());
        }

        let owner_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM profiles
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(profile_id)
        .bind(tenant_id)
        .fetch_optional(&mut **tx)
        .await?;

        match owner_id {
            Some(owner_id) if owner_id == user.id => Ok(()),
            Some(_) => {
                tracing::warn!(
                    profile_id = %profile_id,
                    caller = %caller.actor(),
                    "Caller does not own profile"
                );
                Err(AppError::Forbidden(format!(
                    "caller does not own profile {}",
                    profile_id
                )))
            }
            None => Err(AppError::ProfileNotFound(profile_id.to_string())),
        }
    }

    /// Require a master caller. Used by master-only operations outside the
    /// movement path (e.g. tenant administration).
    pub async fn require_master(&self, caller: &CallerIdentity) -> AppResult<()> {
        let user_id = caller
            .user_id
            .ok_or_else(|| AppError::Forbidden("authenticated user required".to_string()))?;

        let user: Option<UserRecord> = sqlx::query_as(
            r#"
            SELECT id, is_master, is_active FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) if user.is_active && user.is_master => Ok(()),
            Some(_) => Err(AppError::Forbidden("master privilege required".to_string())),
            None => Err(AppError::Forbidden(format!("unknown user {}", user_id))),
        }
    }

    /// Resolve the caller's user record inside the transaction.
    async fn resolve_caller(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        caller: &CallerIdentity,
    ) -> AppResult<UserRecord> {
        let user_id = caller
            .user_id
            .ok_or_else(|| AppError::Forbidden("authenticated user required".to_string()))?;

        let user: Option<UserRecord> = sqlx::query_as(
            r#"
            SELECT id, is_master, is_active FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

        match user {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(AppError::Forbidden("user is deactivated".to_string())),
            None => Err(AppError::Forbidden(format!("unknown user {}", user_id))),
        }
    }
}
