use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::Utc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use quip_core::models::JokeFilter;

use crate::dto::{
    DbHealthResponse, ErrorResponse, FetchResponse, HealthResponse, JokeListResponse,
    JokeResponse, JokesQuery, ProviderStatsQuery, ProviderStatsResponse, ProviderSummary,
    ServiceInfoResponse, StatsResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Jokes pulled from random providers per `/fetch` call.
const FETCH_BATCH_SIZE: usize = 100;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/fetch", get(fetch))
        .route("/health", get(health))
        .route("/db/health", get(db_health))
        .route("/jokes", get(list_jokes))
        .route("/stats", get(stats))
        .route("/stats/providers", get(provider_stats))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/fetch",
    responses(
        (status = 200, description = "Batch fetched and upserted", body = FetchResponse),
        (status = 500, description = "Fetch or persistence failed", body = ErrorResponse),
    ),
    tag = "jokes"
)]
pub async fn fetch(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let jokes = state.manager.multiple_jokes(FETCH_BATCH_SIZE).await;
    tracing::info!(fetched = jokes.len(), requested = FETCH_BATCH_SIZE, "fetched joke batch");

    // An empty batch means every provider fetch failed; a 200 here would
    // mask total upstream failure.
    if jokes.is_empty() {
        tracing::error!(requested = FETCH_BATCH_SIZE, "no jokes could be fetched");
        let body = ErrorResponse {
            error: "Failed to fetch jokes".to_string(),
            message: "No joke could be fetched from any provider".to_string(),
        };
        return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
    }

    match state.db.joke_repo().insert_jokes(&jokes).await {
        Ok(outcome) => {
            tracing::info!(
                inserted = outcome.inserted.len(),
                duplicates = outcome.duplicates.len(),
                "joke batch persisted"
            );
            axum::Json(FetchResponse::from(outcome)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to persist joke batch");
            let body = ErrorResponse {
                error: "Failed to fetch jokes".to_string(),
                message: "Could not fetch and store the joke batch".to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Jokes
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/jokes",
    params(JokesQuery),
    responses(
        (status = 200, description = "Stored jokes, newest first", body = JokeListResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    ),
    tag = "jokes"
)]
pub async fn list_jokes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JokesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = match query.kind.as_deref() {
        None => None,
        Some(raw) => match raw.parse() {
            Ok(kind) => Some(kind),
            Err(_) => {
                let body = ErrorResponse {
                    error: "validation_error".to_string(),
                    message: "type must be \"single\" or \"twopart\"".to_string(),
                };
                return Ok((StatusCode::BAD_REQUEST, axum::Json(body)).into_response());
            }
        },
    };

    let filter = JokeFilter {
        category: query.category,
        kind,
        provider: query.provider,
        safe: query.safe,
        limit: Some(query.limit.unwrap_or(20).clamp(0, 100)),
        offset: query.offset.map(|o| o.max(0)),
    };

    let jokes = state.db.joke_repo().get_jokes(&filter).await?;
    let total = jokes.len();

    let response = JokeListResponse {
        jokes: jokes.into_iter().map(JokeResponse::from).collect(),
        total,
    };

    Ok(axum::Json(response).into_response())
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Global joke statistics", body = StatsResponse),
    ),
    tag = "stats"
)]
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.db.joke_repo().get_joke_stats().await?;
    Ok(axum::Json(StatsResponse::from(stats)))
}

#[utoipa::path(
    get,
    path = "/stats/providers",
    params(ProviderStatsQuery),
    responses(
        (status = 200, description = "Per-provider joke counts", body = [ProviderStatsResponse]),
    ),
    tag = "stats"
)]
pub async fn provider_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProviderStatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .db
        .joke_repo()
        .joke_count_by_provider(query.provider.as_deref())
        .await?;

    let response: Vec<ProviderStatsResponse> =
        rows.into_iter().map(ProviderStatsResponse::from).collect();
    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Health & service info
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        service: "quip",
    })
}

#[utoipa::path(
    get,
    path = "/db/health",
    responses(
        (status = 200, description = "Database reachable", body = DbHealthResponse),
        (status = 500, description = "Database unreachable", body = DbHealthResponse),
    ),
    tag = "system"
)]
pub async fn db_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.db.joke_repo().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(DbHealthResponse {
                database: "connected",
                timestamp: Utc::now(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "database health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(DbHealthResponse {
                    database: "error",
                    timestamp: Utc::now(),
                }),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service metadata and provider list", body = ServiceInfoResponse),
    ),
    tag = "system"
)]
pub async fn service_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let endpoints = [
        ("GET /fetch", "Fetch a batch of jokes and store them"),
        ("GET /health", "Service health check"),
        ("GET /db/health", "Database health check"),
        ("GET /jokes", "List stored jokes with filters"),
        ("GET /stats", "Global joke statistics"),
        ("GET /stats/providers", "Per-provider joke counts"),
    ]
    .into_iter()
    .collect();

    axum::Json(ServiceInfoResponse {
        name: "Quip",
        version: env!("CARGO_PKG_VERSION"),
        description: "Joke aggregator with multiple upstream providers",
        endpoints,
        providers: state
            .manager
            .providers()
            .into_iter()
            .map(ProviderSummary::from)
            .collect(),
    })
}
