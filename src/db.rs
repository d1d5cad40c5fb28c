//! Database module
//!
//! Connectivity and schema checks run at startup. Schema changes live as raw
//! SQL files under `migrations/`, applied out of band.

use sqlx::PgPool;

/// Tables the application refuses to start without.
const REQUIRED_TABLES: [&str; 6] = [
    "api_keys",
    "tenants",
    "users",
    "profiles",
    "accounts",
    "ledger_entries",
];

/// Round-trip a trivial query to confirm the pool is usable.
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Report whether every required table is present in the public schema.
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let found: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM information_schema.tables
        WHERE table_schema = 'public' AND table_name = ANY($1)
        "#,
    )
    .bind(&REQUIRED_TABLES[..])
    .fetch_one(pool)
    .await?;

    if found < REQUIRED_TABLES.len() as i64 {
        tracing::error!(
            found,
            expected = REQUIRED_TABLES.len(),
            "Schema is missing required tables; run the migrations first"
        );
        return Ok(false);
    }

    Ok(true)
}
