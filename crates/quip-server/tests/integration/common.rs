use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

use quip_core::models::Joke;
use quip_core::provider::JokeProvider;
use quip_core::testutil::StaticProvider;
use quip_core::JokeManager;
use quip_db::Database;
use quip_server::routes;
use quip_server::state::AppState;

const MIGRATIONS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS jokes (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        external_id VARCHAR(255),
        joke JSONB NOT NULL,
        category VARCHAR(100),
        type VARCHAR(20) CHECK (type IN ('single', 'twopart')),
        safe BOOLEAN NOT NULL DEFAULT true,
        lang VARCHAR(10) NOT NULL DEFAULT 'en',
        provider VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT unique_external_id_provider UNIQUE (external_id, provider),
        CONSTRAINT check_joke_type_content CHECK (
            (type = 'single'
                AND joke->>'content' IS NOT NULL
                AND joke->>'setup' IS NULL
                AND joke->>'punchline' IS NULL)
            OR
            (type = 'twopart'
                AND joke->>'content' IS NULL
                AND joke->>'setup' IS NOT NULL
                AND joke->>'punchline' IS NOT NULL)
        )
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_jokes_provider ON jokes(provider)"#,
    r#"CREATE INDEX IF NOT EXISTS idx_jokes_created_at ON jokes(created_at)"#,
    r#"CREATE OR REPLACE FUNCTION update_updated_at_column()
    RETURNS TRIGGER AS $$
    BEGIN
        NEW.updated_at = NOW();
        RETURN NEW;
    END;
    $$ LANGUAGE plpgsql"#,
    r#"CREATE TRIGGER update_jokes_updated_at
        BEFORE UPDATE ON jokes
        FOR EACH ROW
        EXECUTE FUNCTION update_updated_at_column()"#,
];

pub struct TestApp {
    pub router: Router,
    _container: ContainerAsync<GenericImage>,
}

/// Spins up a PostgreSQL container and builds the app router with a
/// deterministic single-provider manager (no real upstream calls).
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(vec![
        StaticProvider::new("Static Jokes", "https://static.test")
            .with_categories(&["testing"])
            .with_joke(
                Joke::single("It works on my machine.")
                    .with_external_id("static-1")
                    .with_category("testing"),
            ),
    ])
    .await
}

pub async fn setup_test_app_with(providers: Vec<StaticProvider>) -> TestApp {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "quip_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let connection_string = format!("postgresql://postgres:postgres@{host}:{port}/quip_test");

    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .connect(&connection_string)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to connect to database after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    };

    for migration in MIGRATIONS {
        sqlx::query(migration)
            .execute(&pool)
            .await
            .expect("Failed to run migration");
    }

    let db = Database::from_pool(pool);
    let manager = JokeManager::new(
        providers
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn JokeProvider>)
            .collect(),
    );

    let state = Arc::new(AppState { db, manager });

    TestApp {
        router: routes::router(state),
        _container: container,
    }
}
