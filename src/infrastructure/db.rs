use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Row};
use std::str::FromStr;

use crate::domain::KanbanError;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<SqlitePool, KanbanError> {
    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_options)
        .await?;

    run_migrations(&pool).await?;

    tracing::debug!(database_url, "Database initialized with WAL mode enabled");

    Ok(pool)
}

/// Applies pending migrations. Versions already recorded in
/// `_sqlx_migrations` are skipped, so this is safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), KanbanError> {
    let before = applied_migrations(pool).await.map(|m| m.len()).unwrap_or(0);
    MIGRATOR.run(pool).await?;
    let after = applied_migrations(pool).await?.len();

    if after > before {
        tracing::info!(applied = after - before, total = after, "Applied database migrations");
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub description: String,
    pub installed_on: String,
    pub success: bool,
}

pub async fn applied_migrations(pool: &SqlitePool) -> Result<Vec<AppliedMigration>, KanbanError> {
    let migrations = sqlx::query_as(
        "SELECT version, description, CAST(installed_on AS TEXT) AS installed_on, success FROM _sqlx_migrations ORDER BY version ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(migrations)
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub journal_mode: String,
    pub tables: Vec<String>,
    pub migrations: Vec<AppliedMigration>,
    pub pending_migrations: Vec<i64>,
}

pub async fn status(pool: &SqlitePool) -> Result<DatabaseStatus, KanbanError> {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let migrations = applied_migrations(pool).await?;
    let pending_migrations = MIGRATOR
        .iter()
        .map(|m| m.version)
        .filter(|v| !migrations.iter().any(|a| a.version == *v))
        .collect();

    Ok(DatabaseStatus {
        journal_mode: journal_mode(pool).await?,
        tables,
        migrations,
        pending_migrations,
    })
}

pub async fn journal_mode(pool: &SqlitePool) -> Result<String, KanbanError> {
    let row = sqlx::query("PRAGMA journal_mode").fetch_one(pool).await?;

    Ok(row.get::<String, _>(0))
}
