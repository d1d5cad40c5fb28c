//! Common test utilities
//!
//! Each test seeds its own tenant/users/accounts so tests can run
//! concurrently against one database.

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// API key seeded for every test run
pub const TEST_API_KEY: &str = "test_key_123";

/// Connect to the test database and seed the shared API key
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Hash computed the same way the auth middleware does
    let key_hash: String = sqlx::query_scalar("SELECT encode(sha256($1::bytea), 'hex')")
        .bind(TEST_API_KEY.as_bytes())
        .fetch_one(&pool)
        .await
        .unwrap();

    sqlx::query(
        r#"
        INSERT INTO api_keys (id, name, key_hash, key_prefix, is_active)
        VALUES ($1, 'Test Key', $2, 'test_', true)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&key_hash)
    .execute(&pool)
    .await
    .expect("Failed to seed API key");

    pool
}

pub async fn seed_tenant(pool: &PgPool) -> Uuid {
    let tenant_id = Uuid::new_v4();
    sqlx::query("INSERT INTO tenants (id, name) VALUES ($1, $2)")
        .bind(tenant_id)
        .bind(format!("tenant-{}", tenant_id))
        .execute(pool)
        .await
        .expect("Failed to seed tenant");
    tenant_id
}

pub async fn seed_user(pool: &PgPool, is_master: bool) -> Uuid {
    let user_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, email, is_master, is_active)
        VALUES ($1, $2, $3, true)
        "#,
    )
    .bind(user_id)
    .bind(format!("user-{}@test.internal", user_id))
    .bind(is_master)
    .execute(pool)
    .await
    .expect("Failed to seed user");
    user_id
}

pub async fn seed_profile(pool: &PgPool, tenant_id: Uuid, user_id: Uuid) -> Uuid {
    let profile_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO profiles (id, tenant_id, user_id, balance)
        VALUES ($1, $2, $3, 0)
        "#,
    )
    .bind(profile_id)
    .bind(tenant_id)
    .bind(user_id)
    .execute(pool)
    .await
    .expect("Failed to seed profile");
    profile_id
}

pub async fn seed_account(
    pool: &PgPool,
    tenant_id: Uuid,
    profile_id: Option<Uuid>,
    balance: Decimal,
) -> Uuid {
    let account_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO accounts (id, tenant_id, profile_id, name, balance)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(account_id)
    .bind(tenant_id)
    .bind(profile_id)
    .bind(format!("account-{}", account_id))
    .bind(balance)
    .execute(pool)
    .await
    .expect("Failed to seed account");
    account_id
}

pub async fn account_balance(pool: &PgPool, account_id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read account balance")
}

pub async fn profile_balance(pool: &PgPool, profile_id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read profile balance")
}

pub async fn entry_count_for_account(pool: &PgPool, account_id: Uuid) -> i64 {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM ledger_entries
        WHERE from_account_id = $1 OR to_account_id = $1
        "#,
    )
    .bind(account_id)
    .fetch_one(pool)
    .await
    .expect("Failed to count ledger entries")
}
