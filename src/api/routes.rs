//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthorizationGuard;
use crate::domain::{CallerIdentity, EntryStatus, MovementKind};
use crate::error::{AppError, AppResult};
use crate::handlers::{MovementCommand, MovementHandler};
use crate::store::{
    Account, AccountStore, CreateAccount, CreateProfile, LedgerEntry, LedgerEntryStore, Profile,
    ProfileStore, Tenant, TenantStore,
};

use super::middleware::TenantContext;
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct ExecuteMovementRequest {
    #[serde(default)]
    pub from_account_id: Option<Uuid>,
    #[serde(default)]
    pub to_account_id: Option<Uuid>,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: MovementKind,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<Uuid>,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub status: EntryStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<LedgerEntry> for MovementResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            tenant_id: entry.tenant_id,
            from_account_id: entry.from_account_id,
            to_account_id: entry.to_account_id,
            amount: entry.amount,
            kind: entry.entry_type,
            status: entry.status,
            created_by: entry.created_by,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovementsListResponse {
    pub entries: Vec<MovementResponse>,
}

#[derive(Debug, Deserialize)]
pub struct MovementsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(default)]
    pub profile_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Movements
        .route("/movements", post(execute_movement))
        .route("/movements/:entry_id", get(get_movement))
        // Accounts
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/accounts/:account_id", get(get_account))
        .route("/accounts/:account_id/movements", get(list_account_movements))
        // Profiles
        .route("/profiles", post(create_profile).get(list_profiles))
        .route("/profiles/:profile_id", get(get_profile))
        // Tenants (master only)
        .route("/tenants", post(create_tenant))
        .route("/tenants/:tenant_id", get(get_tenant))
}

/// Tenant scope is mandatory on tenant-scoped endpoints.
fn require_tenant(tenant: Option<Extension<TenantContext>>) -> AppResult<Uuid> {
    tenant
        .map(|Extension(TenantContext(tenant_id))| tenant_id)
        .ok_or_else(|| AppError::MissingHeader("X-Tenant-Id".to_string()))
}

// =========================================================================
// Movement endpoints
// =========================================================================

async fn execute_movement(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<ExecuteMovementRequest>,
) -> AppResult<(StatusCode, Json<MovementResponse>)> {
    let tenant_id = require_tenant(tenant)?;

    let mut command = MovementCommand::new(tenant_id, request.kind, request.amount);
    if let Some(account_id) = request.from_account_id {
        command = command.with_from(account_id);
    }
    if let Some(account_id) = request.to_account_id {
        command = command.with_to(account_id);
    }

    let handler = MovementHandler::new(state.pool.clone(), state.dispatcher.clone())
        .with_tx_timeout(state.tx_timeout_secs);
    let entry = handler.execute(command, &caller).await?;

    Ok((StatusCode::CREATED, Json(entry.into())))
}

async fn get_movement(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<MovementResponse>> {
    let tenant_id = require_tenant(tenant)?;

    let entry = LedgerEntryStore::new(state.pool.clone())
        .find_by_id(entry_id, tenant_id)
        .await?
        .ok_or_else(|| AppError::EntryNotFound(entry_id.to_string()))?;

    Ok(Json(entry.into()))
}

async fn list_account_movements(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Path(account_id): Path<Uuid>,
    Query(query): Query<MovementsQuery>,
) -> AppResult<Json<MovementsListResponse>> {
    let tenant_id = require_tenant(tenant)?;

    let entries = LedgerEntryStore::new(state.pool.clone())
        .list_for_account(account_id, tenant_id, query.limit.clamp(1, 500))
        .await?;

    Ok(Json(MovementsListResponse {
        entries: entries.into_iter().map(Into::into).collect(),
    }))
}

// =========================================================================
// Account endpoints
// =========================================================================

async fn create_account(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Json(request): Json<CreateAccountRequest>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let tenant_id = require_tenant(tenant)?;

    if let Some(profile_id) = request.profile_id {
        ProfileStore::new(state.pool.clone())
            .get(profile_id, tenant_id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(profile_id.to_string()))?;
    }

    let account = AccountStore::new(state.pool.clone())
        .create(&CreateAccount {
            tenant_id,
            profile_id: request.profile_id,
            name: request.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_account(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<Account>> {
    let tenant_id = require_tenant(tenant)?;

    let account = AccountStore::new(state.pool.clone())
        .get(account_id, tenant_id)
        .await?
        .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;

    Ok(Json(account))
}

async fn list_accounts(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
) -> AppResult<Json<Vec<Account>>> {
    let tenant_id = require_tenant(tenant)?;

    let accounts = AccountStore::new(state.pool.clone())
        .list_by_tenant(tenant_id)
        .await?;

    Ok(Json(accounts))
}

// =========================================================================
// Profile endpoints
// =========================================================================

async fn create_profile(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Json(request): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    let tenant_id = require_tenant(tenant)?;

    let user_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND is_active)",
    )
    .bind(request.user_id)
    .fetch_one(&state.pool)
    .await?;

    if !user_exists {
        return Err(AppError::UserNotFound(request.user_id.to_string()));
    }

    let profile = ProfileStore::new(state.pool.clone())
        .create(&CreateProfile {
            tenant_id,
            user_id: request.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

async fn get_profile(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    let tenant_id = require_tenant(tenant)?;

    let profile = ProfileStore::new(state.pool.clone())
        .get(profile_id, tenant_id)
        .await?
        .ok_or_else(|| AppError::ProfileNotFound(profile_id.to_string()))?;

    Ok(Json(profile))
}

async fn list_profiles(
    State(state): State<AppState>,
    tenant: Option<Extension<TenantContext>>,
) -> AppResult<Json<Vec<Profile>>> {
    let tenant_id = require_tenant(tenant)?;

    let profiles = ProfileStore::new(state.pool.clone())
        .list_by_tenant(tenant_id)
        .await?;

    Ok(Json(profiles))
}

// =========================================================================
// Tenant endpoints
// =========================================================================

async fn create_tenant(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CreateTenantRequest>,
) -> AppResult<(StatusCode, Json<Tenant>)> {
    AuthorizationGuard::new(state.pool.clone())
        .require_master(&caller)
        .await?;

    let tenant = TenantStore::new(state.pool.clone())
        .create(&request.name)
        .await?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

async fn get_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<Json<Tenant>> {
    let tenant = TenantStore::new(state.pool.clone())
        .get(tenant_id)
        .await?
        .ok_or_else(|| AppError::TenantNotFound(tenant_id.to_string()))?;

    Ok(Json(tenant))
}
