use std::collections::HashSet;

use chrono::{DateTime, Utc};
use quip_core::error::AppError;
use quip_core::models::{
    BatchInsertOutcome, DuplicateJoke, InsertedJoke, JokeFilter, JokeRecord, JokeStats,
    ProviderStats, SourcedJoke,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Repository for joke persistence in PostgreSQL.
///
/// Duplicate avoidance rests entirely on the `(external_id, provider)`
/// unique constraint; there is no application-level locking.
#[derive(Clone)]
pub struct JokeRepository {
    pool: PgPool,
}

impl JokeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a single joke keyed on `(external_id, provider)`. A conflict
    /// overwrites the payload, category, type, safe flag, and language and
    /// refreshes `updated_at`; the resulting row is returned either way.
    pub async fn insert_joke(&self, joke: &SourcedJoke) -> Result<JokeRecord, AppError> {
        let payload = serde_json::to_value(&joke.joke.payload)?;

        let row = sqlx::query_as::<_, JokeRow>(
            r#"
            INSERT INTO jokes (external_id, joke, category, type, safe, lang, provider)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (external_id, provider)
            DO UPDATE SET
                joke = EXCLUDED.joke,
                category = EXCLUDED.category,
                type = EXCLUDED.type,
                safe = EXCLUDED.safe,
                lang = EXCLUDED.lang,
                updated_at = NOW()
            RETURNING id, external_id, joke, category, type, safe, lang, provider,
                      created_at, updated_at
            "#,
        )
        .bind(&joke.joke.external_id)
        .bind(&payload)
        .bind(joke.joke.category.as_ref().map(|c| c.to_lowercase()))
        .bind(joke.joke.kind().as_str())
        .bind(joke.joke.safe)
        .bind(&joke.joke.lang)
        .bind(&joke.provider)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.into())
    }

    /// Bulk upsert via a column-wise `UNNEST` insert. Conflicting rows are
    /// skipped, not overwritten, and since `DO NOTHING` does not report
    /// which rows it skipped, the duplicates are recomputed here by diffing
    /// the input against the returned inserted set.
    pub async fn insert_jokes(&self, jokes: &[SourcedJoke]) -> Result<BatchInsertOutcome, AppError> {
        if jokes.is_empty() {
            return Ok(BatchInsertOutcome::empty());
        }

        let mut external_ids: Vec<Option<String>> = Vec::with_capacity(jokes.len());
        let mut payloads: Vec<serde_json::Value> = Vec::with_capacity(jokes.len());
        let mut categories: Vec<Option<String>> = Vec::with_capacity(jokes.len());
        let mut kinds: Vec<String> = Vec::with_capacity(jokes.len());
        let mut safe_flags: Vec<bool> = Vec::with_capacity(jokes.len());
        let mut languages: Vec<String> = Vec::with_capacity(jokes.len());
        let mut providers: Vec<String> = Vec::with_capacity(jokes.len());

        for j in jokes {
            external_ids.push(j.joke.external_id.clone());
            payloads.push(serde_json::to_value(&j.joke.payload)?);
            categories.push(j.joke.category.as_ref().map(|c| c.to_lowercase()));
            kinds.push(j.joke.kind().as_str().to_string());
            safe_flags.push(j.joke.safe);
            languages.push(j.joke.lang.clone());
            providers.push(j.provider.clone());
        }

        let result = sqlx::query_as::<_, InsertedRow>(
            r#"
            INSERT INTO jokes (external_id, joke, category, type, safe, lang, provider)
            SELECT * FROM UNNEST(
                $1::varchar[],
                $2::jsonb[],
                $3::varchar[],
                $4::varchar[],
                $5::boolean[],
                $6::varchar[],
                $7::varchar[]
            ) AS t(external_id, joke, category, type, safe, lang, provider)
            ON CONFLICT (external_id, provider) DO NOTHING
            RETURNING id, external_id, provider, created_at, updated_at
            "#,
        )
        .bind(&external_ids)
        .bind(&payloads)
        .bind(&categories)
        .bind(&kinds)
        .bind(&safe_flags)
        .bind(&languages)
        .bind(&providers)
        .fetch_all(&self.pool)
        .await;

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                // A sample of the failing batch makes constraint violations
                // diagnosable without dumping all 100 inputs.
                let sample: Vec<&SourcedJoke> = jokes.iter().take(3).collect();
                tracing::error!(
                    error = %e,
                    batch_size = jokes.len(),
                    sample = %serde_json::to_string(&sample).unwrap_or_default(),
                    "bulk joke insert failed"
                );
                return Err(AppError::Database(e.to_string()));
            }
        };

        let inserted: Vec<InsertedJoke> = rows.into_iter().map(Into::into).collect();
        let duplicates = reconcile_duplicates(jokes, &inserted);

        Ok(BatchInsertOutcome {
            inserted,
            duplicates,
            total_processed: jokes.len(),
        })
    }

    /// List jokes matching the optional equality filters, newest first.
    pub async fn get_jokes(&self, filter: &JokeFilter) -> Result<Vec<JokeRecord>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, external_id, joke, category, type, safe, lang, provider, \
             created_at, updated_at FROM jokes",
        );

        let mut prefix = " WHERE ";
        if let Some(category) = &filter.category {
            qb.push(prefix).push("category = ").push_bind(category.to_lowercase());
            prefix = " AND ";
        }
        if let Some(kind) = filter.kind {
            qb.push(prefix).push("type = ").push_bind(kind.as_str());
            prefix = " AND ";
        }
        if let Some(provider) = &filter.provider {
            qb.push(prefix).push("provider = ").push_bind(provider.clone());
            prefix = " AND ";
        }
        if let Some(safe) = filter.safe {
            qb.push(prefix).push("safe = ").push_bind(safe);
        }

        qb.push(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            qb.push(" OFFSET ").push_bind(offset);
        }

        let rows = qb
            .build_query_as::<JokeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Global aggregate counts.
    pub async fn get_joke_stats(&self) -> Result<JokeStats, AppError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*) AS total_jokes,
                COUNT(DISTINCT provider) AS total_providers,
                COUNT(DISTINCT category) AS total_categories,
                COUNT(*) FILTER (WHERE type = 'single') AS single_jokes,
                COUNT(*) FILTER (WHERE type = 'twopart') AS twopart_jokes,
                COUNT(*) FILTER (WHERE safe) AS safe_jokes,
                COUNT(*) FILTER (WHERE NOT safe) AS unsafe_jokes
            FROM jokes
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.into())
    }

    /// Per-provider counts, ordered by descending joke count, optionally
    /// restricted to one provider.
    pub async fn joke_count_by_provider(
        &self,
        provider: Option<&str>,
    ) -> Result<Vec<ProviderStats>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                provider,
                COUNT(*) AS joke_count,
                COUNT(*) FILTER (WHERE type = 'single') AS single_count,
                COUNT(*) FILTER (WHERE type = 'twopart') AS twopart_count,
                COUNT(*) FILTER (WHERE safe) AS safe_count,
                COUNT(*) FILTER (WHERE NOT safe) AS unsafe_count,
                MAX(created_at) AS last_added
            FROM jokes
            "#,
        );

        if let Some(provider) = provider {
            qb.push(" WHERE provider = ").push_bind(provider.to_string());
        }
        qb.push(" GROUP BY provider ORDER BY joke_count DESC");

        let rows = qb
            .build_query_as::<ProviderStatsRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Classify every input not present in the inserted set as a duplicate.
fn reconcile_duplicates(inputs: &[SourcedJoke], inserted: &[InsertedJoke]) -> Vec<DuplicateJoke> {
    let inserted_keys: HashSet<(Option<&str>, &str)> = inserted
        .iter()
        .map(|row| (row.external_id.as_deref(), row.provider.as_str()))
        .collect();

    inputs
        .iter()
        .filter(|j| {
            !inserted_keys.contains(&(j.joke.external_id.as_deref(), j.provider.as_str()))
        })
        .map(|j| DuplicateJoke {
            external_id: j.joke.external_id.clone(),
            provider: j.provider.clone(),
        })
        .collect()
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct JokeRow {
    id: Uuid,
    external_id: Option<String>,
    joke: serde_json::Value,
    category: Option<String>,
    #[sqlx(rename = "type")]
    kind: Option<String>,
    safe: bool,
    lang: String,
    provider: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JokeRow> for JokeRecord {
    fn from(row: JokeRow) -> Self {
        JokeRecord {
            id: row.id,
            external_id: row.external_id,
            joke: row.joke,
            category: row.category,
            kind: row.kind.and_then(|k| k.parse().ok()),
            safe: row.safe,
            lang: row.lang,
            provider: row.provider,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct InsertedRow {
    id: Uuid,
    external_id: Option<String>,
    provider: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InsertedRow> for InsertedJoke {
    fn from(row: InsertedRow) -> Self {
        InsertedJoke {
            id: row.id,
            external_id: row.external_id,
            provider: row.provider,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_jokes: i64,
    total_providers: i64,
    total_categories: i64,
    single_jokes: i64,
    twopart_jokes: i64,
    safe_jokes: i64,
    unsafe_jokes: i64,
}

impl From<StatsRow> for JokeStats {
    fn from(row: StatsRow) -> Self {
        JokeStats {
            total_jokes: row.total_jokes,
            total_providers: row.total_providers,
            total_categories: row.total_categories,
            single_jokes: row.single_jokes,
            twopart_jokes: row.twopart_jokes,
            safe_jokes: row.safe_jokes,
            unsafe_jokes: row.unsafe_jokes,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProviderStatsRow {
    provider: String,
    joke_count: i64,
    single_count: i64,
    twopart_count: i64,
    safe_count: i64,
    unsafe_count: i64,
    last_added: DateTime<Utc>,
}

impl From<ProviderStatsRow> for ProviderStats {
    fn from(row: ProviderStatsRow) -> Self {
        ProviderStats {
            provider: row.provider,
            joke_count: row.joke_count,
            single_count: row.single_count,
            twopart_count: row.twopart_count,
            safe_count: row.safe_count,
            unsafe_count: row.unsafe_count,
            last_added: row.last_added,
        }
    }
}
