//! Database wiring: connection pool and schema bootstrap.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connection attempts made before giving up.
pub const CONNECT_ATTEMPTS: u32 = 3;

const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Open a pool, retrying a few times while the database comes up.
pub async fn connect(url: &str) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 1;
    loop {
        match PgPoolOptions::new().max_connections(10).connect(url).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "database connection failed; retrying");
                attempt += 1;
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(e),
        }
    }
}

const SCHEMA: &[&str] = &[
    r#"
    DO $$
    BEGIN
        IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'company_type') THEN
            CREATE TYPE company_type AS ENUM ('Corporations', 'NonProfit', 'Cooperative', 'Sole Proprietorship');
        END IF;
    END $$
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id                  UUID PRIMARY KEY,
        name                VARCHAR(15) NOT NULL UNIQUE,
        description         VARCHAR(3000) NOT NULL DEFAULT '',
        amount_of_employees INTEGER NOT NULL CHECK (amount_of_employees >= 1),
        registered          BOOLEAN NOT NULL,
        "type"              company_type NOT NULL,
        created_at          TIMESTAMPTZ NOT NULL,
        updated_at          TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Create the enum type and tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("database schema ready");
    Ok(())
}
