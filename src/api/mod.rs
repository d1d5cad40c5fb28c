//! HTTP API
//!
//! Thin axum shell over the movement core: routing, request validation,
//! authentication, and context extraction.

pub mod middleware;
pub mod routes;

use sqlx::PgPool;

use crate::events::EventDispatcher;

pub use routes::create_router;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub dispatcher: EventDispatcher,
    /// Statement timeout for movement transactions (0 = engine default)
    pub tx_timeout_secs: u64,
}
