//! API Middleware
//!
//! Authentication and request context extraction. The auth layer validates
//! the API key, then attaches tenant scope and caller identity so handlers
//! never read headers themselves.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::CallerIdentity;

use super::AppState;

/// Authenticated API key attached to the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedApiKey {
    pub id: Uuid,
    pub name: String,
}

/// Tenant scope attached to the request from the X-Tenant-Id header.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    name: String,
    is_active: bool,
}

/// Validate the X-API-Key header against the stored hash, then build the
/// caller identity and tenant scope for downstream handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let api_key = headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            reject(
                StatusCode::UNAUTHORIZED,
                "Missing X-API-Key header",
                "missing_api_key",
            )
        })?;

    let row: Option<ApiKeyRow> =
        sqlx::query_as("SELECT id, name, is_active FROM api_keys WHERE key_hash = $1")
            .bind(sha256_hex(api_key))
            .fetch_optional(&state.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "API key lookup failed");
                reject(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "database_error",
                )
            })?;

    let key = match row {
        Some(key) if key.is_active => key,
        Some(_) => {
            return Err(reject(
                StatusCode::UNAUTHORIZED,
                "API key is disabled",
                "api_key_disabled",
            ))
        }
        None => {
            return Err(reject(
                StatusCode::UNAUTHORIZED,
                "Invalid API key",
                "invalid_api_key",
            ))
        }
    };

    request.extensions_mut().insert(AuthenticatedApiKey {
        id: key.id,
        name: key.name,
    });

    if let Some(tenant_id) = header_uuid(&headers, "X-Tenant-Id", "invalid_tenant_id")? {
        request.extensions_mut().insert(TenantContext(tenant_id));
    }

    // A correlation id supplied by the caller wins over a fresh one
    let correlation_id = headers
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let mut caller = CallerIdentity::new(correlation_id, request.uri().path().to_string());
    if let Some(user_id) = header_uuid(&headers, "X-Request-User-Id", "invalid_user_id")? {
        caller = caller.with_user(user_id);
    }
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

/// Log every request with its outcome.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "Request handled"
    );

    response
}

/// Parse an optional UUID header; a malformed value is a 400, not a skip.
fn header_uuid(
    headers: &HeaderMap,
    name: &str,
    error_code: &str,
) -> Result<Option<Uuid>, Response> {
    match headers.get(name).and_then(|v| v.to_str().ok()) {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(raw).map(Some).map_err(|_| {
            reject(
                StatusCode::BAD_REQUEST,
                &format!("Invalid {} header format", name),
                error_code,
            )
        }),
    }
}

fn reject(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(json!({
            "error": message,
            "error_code": code
        })),
    )
        .into_response()
}

/// SHA-256 hex digest of an API key, matching the stored `key_hash`.
fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
