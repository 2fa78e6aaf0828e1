use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use quip_core::testutil::StaticProvider;

use crate::common::{setup_test_app, setup_test_app_with};

async fn get_json(
    router: axum::Router,
    uri: &str,
) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let (status, json) = get_json(app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "quip");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn db_health_reports_connected() {
    let app = setup_test_app().await;

    let (status, json) = get_json(app.router, "/db/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn service_info_lists_providers() {
    let app = setup_test_app().await;

    let (status, json) = get_json(app.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Quip");
    assert_eq!(json["providers"][0]["name"], "Static Jokes");
    assert_eq!(json["providers"][0]["categories_count"], 1);
    assert!(json["endpoints"]["GET /fetch"].is_string());
}

#[tokio::test]
async fn fetch_upserts_batch_and_reports_duplicates_on_repeat() {
    let app = setup_test_app().await;

    // The static provider serves one fixed joke, so the whole batch shares
    // a single (external_id, provider) key: exactly one row lands.
    let (status, json) = get_json(app.router.clone(), "/fetch").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["totalProcessed"], 100);
    assert_eq!(json["inserted"].as_array().unwrap().len(), 1);
    assert_eq!(json["inserted"][0]["provider"], "https://static.test");

    // Second run: the key already exists, every input is a duplicate.
    let (status, json) = get_json(app.router, "/fetch").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["inserted"].as_array().unwrap().len(), 0);
    assert_eq!(json["duplicates"].as_array().unwrap().len(), 100);
    assert_eq!(json["totalProcessed"], 100);
}

#[tokio::test]
async fn fetch_reports_error_when_every_provider_fails() {
    // No scripted responses and no fallback joke: every fetch errors.
    let app =
        setup_test_app_with(vec![StaticProvider::new("Broken Jokes", "https://broken.test")])
            .await;

    let (status, json) = get_json(app.router, "/fetch").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to fetch jokes");
}

#[tokio::test]
async fn jokes_listing_applies_filters() {
    let app = setup_test_app().await;

    let (status, _) = get_json(app.router.clone(), "/fetch").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get_json(
        app.router.clone(),
        "/jokes?provider=https://static.test&type=single",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["jokes"][0]["category"], "testing");
    assert_eq!(json["jokes"][0]["joke"]["content"], "It works on my machine.");

    let (status, json) = get_json(app.router.clone(), "/jokes?type=twopart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);

    let (status, json) = get_json(app.router, "/jokes?type=knock-knock").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn negative_pagination_values_are_clamped() {
    let app = setup_test_app().await;

    let (status, _) = get_json(app.router.clone(), "/fetch").await;
    assert_eq!(status, StatusCode::OK);

    // A negative limit clamps to zero rows instead of erroring in SQL.
    let (status, json) = get_json(app.router.clone(), "/jokes?limit=-5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);

    let (status, json) = get_json(app.router, "/jokes?offset=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
}

#[tokio::test]
async fn stats_reflect_inserted_jokes() {
    let app = setup_test_app().await;

    let (status, _) = get_json(app.router.clone(), "/fetch").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get_json(app.router.clone(), "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_jokes"], 1);
    assert_eq!(json["single_jokes"], 1);
    assert_eq!(json["safe_jokes"], 1);

    let (status, json) = get_json(app.router, "/stats/providers").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["provider"], "https://static.test");
    assert_eq!(rows[0]["joke_count"], 1);
}
