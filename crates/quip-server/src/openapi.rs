use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quip API",
        version = "0.1.0",
        description = "Aggregates jokes from multiple upstream APIs into PostgreSQL."
    ),
    paths(
        crate::routes::fetch,
        crate::routes::list_jokes,
        crate::routes::stats,
        crate::routes::provider_stats,
        crate::routes::health,
        crate::routes::db_health,
        crate::routes::service_info,
    ),
    components(schemas(
        crate::dto::FetchResponse,
        crate::dto::InsertedJokeResponse,
        crate::dto::DuplicateJokeResponse,
        crate::dto::JokeResponse,
        crate::dto::JokeListResponse,
        crate::dto::StatsResponse,
        crate::dto::ProviderStatsResponse,
        crate::dto::HealthResponse,
        crate::dto::DbHealthResponse,
        crate::dto::ServiceInfoResponse,
        crate::dto::ProviderSummary,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "jokes", description = "Joke fetching and listing"),
        (name = "stats", description = "Aggregate statistics"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
