//! tesoro - Multi-Tenant Wallet Ledger Backend API
//!
//! Records deposits, withdrawals, and transfers between tenant-scoped
//! accounts, keeping account balances and profile aggregates consistent
//! within a single database transaction per movement.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tesoro::api::{self, AppState};
use tesoro::events::{EventDispatcher, RedisQueue};
use tesoro::{db, Config};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tesoro=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Assemble the router: auth and request logging wrap the API routes,
/// the health check stays outside both.
fn build_router(state: AppState) -> Router {
    let protected = api::create_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::middleware::auth_middleware,
        ))
        .layer(middleware::from_fn(api::middleware::logging_middleware));

    Router::new()
        .route("/health", axum::routing::get(|| async { "OK" }))
        .nest("/api/v1", protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(environment = %config.environment, "Starting tesoro");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    db::verify_connection(&pool).await?;
    if !db::check_schema(&pool).await? {
        anyhow::bail!("database schema incomplete, run migrations first");
    }
    tracing::info!("Database ready");

    let queue = RedisQueue::connect(&config.redis_url).await?;
    let dispatcher = EventDispatcher::new(Arc::new(queue));

    let state = AppState {
        pool: pool.clone(),
        dispatcher,
        tx_timeout_secs: config.tx_timeout_secs,
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    pool.close().await;

    Ok(())
}

/// Resolve when either SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
