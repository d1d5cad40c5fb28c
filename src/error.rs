//! Error handling module
//!
//! One application-wide error enum; each variant knows the HTTP status and
//! machine-readable code it maps to.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    #[error("Ledger entry not found: {0}")]
    EntryNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    // Business-rule violations
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MissingHeader(_) | Self::Domain(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::AccountNotFound(_)
            | Self::ProfileNotFound(_)
            | Self::TenantNotFound(_)
            | Self::EntryNotFound(_)
            | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::MissingHeader(_) => "missing_header",
            Self::InvalidApiKey => "invalid_api_key",
            Self::Forbidden(_) => "forbidden",
            Self::AccountNotFound(_) => "account_not_found",
            Self::ProfileNotFound(_) => "profile_not_found",
            Self::TenantNotFound(_) => "tenant_not_found",
            Self::EntryNotFound(_) => "entry_not_found",
            Self::UserNotFound(_) => "user_not_found",
            Self::Domain(err) => match err {
                DomainError::NonPositiveAmount => "non_positive_amount",
                DomainError::InvalidAmount(_) => "invalid_amount",
                DomainError::MissingSourceAccount(_)
                | DomainError::MissingDestinationAccount(_) => "missing_account",
                DomainError::InsufficientBalance { .. } => "insufficient_balance",
            },
            Self::Database(_) => "database_error",
            Self::Internal(_) => "internal_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Detail string exposed to the caller. Server errors expose nothing.
    fn details(&self) -> Option<String> {
        match self {
            Self::InvalidRequest(msg) | Self::Forbidden(msg) => Some(msg.clone()),
            Self::MissingHeader(header) => Some(header.clone()),
            Self::AccountNotFound(id)
            | Self::ProfileNotFound(id)
            | Self::TenantNotFound(id)
            | Self::EntryNotFound(id)
            | Self::UserNotFound(id) => Some(id.clone()),
            Self::Domain(DomainError::NonPositiveAmount) => None,
            Self::Domain(err) => Some(err.to_string()),
            Self::InvalidApiKey | Self::Database(_) | Self::Internal(_) | Self::Config(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
            details: self.details(),
        };

        (self.status(), Json(body)).into_response()
    }
}
