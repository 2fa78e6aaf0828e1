use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quip_core::manager::ProviderInfo;
use quip_core::models::{
    BatchInsertOutcome, DuplicateJoke, InsertedJoke, JokeRecord, JokeStats, ProviderStats,
};

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Wire format of `/fetch`, kept camelCase for client compatibility.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub ok: bool,
    pub inserted: Vec<InsertedJokeResponse>,
    pub duplicates: Vec<DuplicateJokeResponse>,
    pub total_processed: usize,
}

impl From<BatchInsertOutcome> for FetchResponse {
    fn from(outcome: BatchInsertOutcome) -> Self {
        Self {
            ok: true,
            inserted: outcome.inserted.into_iter().map(Into::into).collect(),
            duplicates: outcome.duplicates.into_iter().map(Into::into).collect(),
            total_processed: outcome.total_processed,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InsertedJokeResponse {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InsertedJoke> for InsertedJokeResponse {
    fn from(row: InsertedJoke) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            provider: row.provider,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DuplicateJokeResponse {
    pub external_id: Option<String>,
    pub provider: String,
}

impl From<DuplicateJoke> for DuplicateJokeResponse {
    fn from(row: DuplicateJoke) -> Self {
        Self {
            external_id: row.external_id,
            provider: row.provider,
        }
    }
}

// ---------------------------------------------------------------------------
// Jokes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct JokesQuery {
    pub category: Option<String>,
    /// "single" or "twopart"
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub provider: Option<String>,
    pub safe: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JokeResponse {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub joke: serde_json::Value,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub safe: bool,
    pub lang: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JokeRecord> for JokeResponse {
    fn from(record: JokeRecord) -> Self {
        Self {
            id: record.id,
            external_id: record.external_id,
            joke: record.joke,
            category: record.category,
            kind: record.kind.map(|k| k.to_string()),
            safe: record.safe,
            lang: record.lang,
            provider: record.provider,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JokeListResponse {
    pub jokes: Vec<JokeResponse>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub total_jokes: i64,
    pub total_providers: i64,
    pub total_categories: i64,
    pub single_jokes: i64,
    pub twopart_jokes: i64,
    pub safe_jokes: i64,
    pub unsafe_jokes: i64,
}

impl From<JokeStats> for StatsResponse {
    fn from(stats: JokeStats) -> Self {
        Self {
            total_jokes: stats.total_jokes,
            total_providers: stats.total_providers,
            total_categories: stats.total_categories,
            single_jokes: stats.single_jokes,
            twopart_jokes: stats.twopart_jokes,
            safe_jokes: stats.safe_jokes,
            unsafe_jokes: stats.unsafe_jokes,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ProviderStatsQuery {
    pub provider: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProviderStatsResponse {
    pub provider: String,
    pub joke_count: i64,
    pub single_count: i64,
    pub twopart_count: i64,
    pub safe_count: i64,
    pub unsafe_count: i64,
    pub last_added: DateTime<Utc>,
}

impl From<ProviderStats> for ProviderStatsResponse {
    fn from(stats: ProviderStats) -> Self {
        Self {
            provider: stats.provider,
            joke_count: stats.joke_count,
            single_count: stats.single_count,
            twopart_count: stats.twopart_count,
            safe_count: stats.safe_count,
            unsafe_count: stats.unsafe_count,
            last_added: stats.last_added,
        }
    }
}

// ---------------------------------------------------------------------------
// Health & service info
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub service: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DbHealthResponse {
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ServiceInfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub providers: Vec<ProviderSummary>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProviderSummary {
    pub name: String,
    pub base_url: String,
    pub categories_count: usize,
}

impl From<ProviderInfo> for ProviderSummary {
    fn from(info: ProviderInfo) -> Self {
        Self {
            name: info.name,
            base_url: info.base_url,
            categories_count: info.categories.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
