use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the database file and schema. Used by `saral init`.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Idempotent schema setup on an open pool.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schemes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT 'N/A',
            category TEXT NOT NULL DEFAULT 'N/A',
            url TEXT,
            eligibility TEXT NOT NULL DEFAULT 'N/A',
            benefits TEXT NOT NULL DEFAULT 'N/A',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // scheme_id is a soft reference: no cascade, re-seed purges explicitly
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS translations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            scheme_id INTEGER NOT NULL,
            language TEXT NOT NULL,
            translated_title TEXT NOT NULL DEFAULT '',
            translated_description TEXT NOT NULL DEFAULT '',
            translated_eligibility TEXT NOT NULL DEFAULT '',
            translated_benefits TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL,
            UNIQUE(scheme_id, language)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS query_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            query TEXT NOT NULL,
            response TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_schemes_category ON schemes(category, title)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_query_log_timestamp ON query_log(timestamp DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
