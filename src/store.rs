//! SQLite-backed scheme store.
//!
//! [`SchemeStore`] owns the connection pool and exposes every persistence
//! operation the portal needs: bulk re-seed, ordered listing, lookup by id,
//! ranked substring search, category filter, the translation cache, the
//! query log and aggregate stats.
//!
//! Lookups that can miss return `Ok(None)`; errors are reserved for the
//! database itself failing.

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{truncate_chars, NewScheme, Scheme, SchemeFields, Stats, Translation};

/// Longest response stored in `query_log`, in characters.
pub const MAX_LOGGED_RESPONSE_CHARS: usize = 500;

const SCHEME_COLUMNS: &str =
    "id, title, description, category, url, eligibility, benefits, created_at";

#[derive(Clone)]
pub struct SchemeStore {
    pool: SqlitePool,
}

impl SchemeStore {
    /// Connect to the configured database and ensure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config)
            .await
            .with_context(|| format!("Failed to open database {}", config.db.path.display()))?;
        migrate::apply(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Replace the whole scheme collection.
    ///
    /// Cached translations are purged in the same transaction: ids are
    /// never reused, so old rows could only ever be orphans.
    pub async fn insert_all(&self, schemes: &[NewScheme]) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM translations")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM schemes").execute(&mut *tx).await?;

        let mut inserted = 0;
        for scheme in schemes {
            sqlx::query(
                r#"
                INSERT INTO schemes (title, description, category, url, eligibility, benefits, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&scheme.title)
            .bind(&scheme.description)
            .bind(&scheme.category)
            .bind(&scheme.url)
            .bind(&scheme.eligibility)
            .bind(&scheme.benefits)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        tracing::info!(inserted, "replaced scheme collection");
        Ok(inserted)
    }

    /// All schemes ordered by `(category, title)`.
    pub async fn get_all(&self) -> Result<Vec<Scheme>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM schemes ORDER BY category ASC, title ASC",
            SCHEME_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(scheme_from_row).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Scheme>> {
        let row = sqlx::query(&format!("SELECT {} FROM schemes WHERE id = ?", SCHEME_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(scheme_from_row))
    }

    /// Case-insensitive substring search over every text field.
    ///
    /// Title matches come first, then description matches, then matches in
    /// any other field; insertion order breaks ties. Matching is done on
    /// Unicode-lowercased text because SQLite `LIKE` only folds ASCII.
    pub async fn search(&self, term: &str) -> Result<Vec<Scheme>> {
        let needle = term.to_lowercase();

        let rows = sqlx::query(&format!(
            "SELECT {} FROM schemes ORDER BY id ASC",
            SCHEME_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut hits: Vec<(u8, Scheme)> = rows
            .iter()
            .map(scheme_from_row)
            .filter_map(|s| match_rank(&s, &needle).map(|rank| (rank, s)))
            .collect();
        hits.sort_by_key(|(rank, _)| *rank);

        Ok(hits.into_iter().map(|(_, s)| s).collect())
    }

    /// Exact category match, ordered by title.
    pub async fn filter_by_category(&self, category: &str) -> Result<Vec<Scheme>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM schemes WHERE category = ? ORDER BY title ASC",
            SCHEME_COLUMNS
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(scheme_from_row).collect())
    }

    /// Insert or overwrite the cached translation for `(scheme_id, language)`.
    pub async fn save_translation(
        &self,
        scheme_id: i64,
        language: &str,
        fields: &SchemeFields,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO translations
                (scheme_id, language, translated_title, translated_description,
                 translated_eligibility, translated_benefits, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(scheme_id, language) DO UPDATE SET
                translated_title = excluded.translated_title,
                translated_description = excluded.translated_description,
                translated_eligibility = excluded.translated_eligibility,
                translated_benefits = excluded.translated_benefits
            "#,
        )
        .bind(scheme_id)
        .bind(language)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.eligibility)
        .bind(&fields.benefits)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_translation(
        &self,
        scheme_id: i64,
        language: &str,
    ) -> Result<Option<Translation>> {
        let row = sqlx::query(
            r#"
            SELECT id, scheme_id, language, translated_title, translated_description,
                   translated_eligibility, translated_benefits, created_at
            FROM translations
            WHERE scheme_id = ? AND language = ?
            "#,
        )
        .bind(scheme_id)
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Translation {
            id: row.get("id"),
            scheme_id: row.get("scheme_id"),
            language: row.get("language"),
            fields: SchemeFields {
                title: row.get("translated_title"),
                description: row.get("translated_description"),
                eligibility: row.get("translated_eligibility"),
                benefits: row.get("translated_benefits"),
            },
            created_at: row.get("created_at"),
        }))
    }

    /// Append a query-log row. The response is cut to
    /// [`MAX_LOGGED_RESPONSE_CHARS`] characters.
    pub async fn log_query(&self, query: &str, response: &str) -> Result<()> {
        sqlx::query("INSERT INTO query_log (query, response, timestamp) VALUES (?, ?, ?)")
            .bind(query)
            .bind(truncate_chars(response, MAX_LOGGED_RESPONSE_CHARS))
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_stats(&self) -> Result<Stats> {
        let total_schemes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schemes")
            .fetch_one(&self.pool)
            .await?;

        let category_rows =
            sqlx::query("SELECT category, COUNT(*) AS n FROM schemes GROUP BY category")
                .fetch_all(&self.pool)
                .await?;
        let by_category = category_rows
            .iter()
            .map(|row| (row.get::<String, _>("category"), row.get::<i64, _>("n")))
            .collect();

        let total_translations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM translations")
            .fetch_one(&self.pool)
            .await?;

        let total_queries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM query_log")
            .fetch_one(&self.pool)
            .await?;

        Ok(Stats {
            total_schemes,
            by_category,
            total_translations,
            total_queries,
        })
    }
}

fn scheme_from_row(row: &SqliteRow) -> Scheme {
    Scheme {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        url: row.get("url"),
        eligibility: row.get("eligibility"),
        benefits: row.get("benefits"),
        created_at: row.get("created_at"),
    }
}

/// 0 for a title hit, 1 for description, 2 for any other field.
fn match_rank(scheme: &Scheme, needle: &str) -> Option<u8> {
    let hit = |field: &str| field.to_lowercase().contains(needle);
    if hit(&scheme.title) {
        Some(0)
    } else if hit(&scheme.description) {
        Some(1)
    } else if hit(&scheme.category) || hit(&scheme.eligibility) || hit(&scheme.benefits) {
        Some(2)
    } else {
        None
    }
}
