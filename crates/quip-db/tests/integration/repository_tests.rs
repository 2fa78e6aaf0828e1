use quip_core::models::{Joke, JokeFilter, JokeKind, SourcedJoke};
use quip_db::JokeRepository;

use crate::common::setup_test_db;

const PROVIDER_A: &str = "https://a.example.com";
const PROVIDER_B: &str = "https://b.example.com";

fn single(external_id: &str, content: &str, provider: &str) -> SourcedJoke {
    SourcedJoke {
        joke: Joke::single(content).with_external_id(external_id),
        provider: provider.to_string(),
    }
}

async fn row_count(pool: &sqlx::PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jokes")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn insert_joke_is_an_idempotent_upsert() {
    let (pool, _container) = setup_test_db().await;
    let repo = JokeRepository::new(pool.clone());

    let first = repo
        .insert_joke(&single("j1", "original text", PROVIDER_A))
        .await
        .unwrap();
    assert_eq!(first.joke["content"], "original text");

    // Make the refreshed update timestamp observable.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let second = repo
        .insert_joke(&single("j1", "replacement text", PROVIDER_A))
        .await
        .unwrap();

    // Same row, new content, refreshed update timestamp.
    assert_eq!(row_count(&pool).await, 1);
    assert_eq!(second.id, first.id);
    assert_eq!(second.joke["content"], "replacement text");
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn bulk_insert_classifies_inserted_and_duplicates() {
    let (pool, _container) = setup_test_db().await;
    let repo = JokeRepository::new(pool);

    repo.insert_joke(&single("existing", "already here", PROVIDER_A))
        .await
        .unwrap();

    let batch = vec![
        single("existing", "colliding copy", PROVIDER_A),
        single("fresh", "new joke", PROVIDER_A),
    ];
    let outcome = repo.insert_jokes(&batch).await.unwrap();

    assert_eq!(outcome.total_processed, 2);
    assert_eq!(outcome.inserted.len(), 1);
    assert_eq!(outcome.inserted[0].external_id.as_deref(), Some("fresh"));
    assert_eq!(outcome.duplicates.len(), 1);
    assert_eq!(outcome.duplicates[0].external_id.as_deref(), Some("existing"));

    // A conflict-skip must not overwrite the existing row.
    let rows = repo
        .get_jokes(&JokeFilter {
            provider: Some(PROVIDER_A.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let existing = rows
        .iter()
        .find(|r| r.external_id.as_deref() == Some("existing"))
        .unwrap();
    assert_eq!(existing.joke["content"], "already here");
}

#[tokio::test]
async fn empty_batch_short_circuits() {
    let (pool, _container) = setup_test_db().await;
    let repo = JokeRepository::new(pool);

    let outcome = repo.insert_jokes(&[]).await.unwrap();
    assert!(outcome.inserted.is_empty());
    assert!(outcome.duplicates.is_empty());
    assert_eq!(outcome.total_processed, 0);
}

#[tokio::test]
async fn same_external_id_is_distinct_per_provider() {
    let (pool, _container) = setup_test_db().await;
    let repo = JokeRepository::new(pool.clone());

    let batch = vec![
        single("shared", "from a", PROVIDER_A),
        single("shared", "from b", PROVIDER_B),
    ];
    let outcome = repo.insert_jokes(&batch).await.unwrap();

    assert_eq!(outcome.inserted.len(), 2);
    assert!(outcome.duplicates.is_empty());
    assert_eq!(row_count(&pool).await, 2);
}

#[tokio::test]
async fn get_jokes_applies_filters_and_ordering() {
    let (pool, _container) = setup_test_db().await;
    let repo = JokeRepository::new(pool);

    let batch = vec![
        SourcedJoke {
            joke: Joke::single("one")
                .with_external_id("1")
                .with_category("Programming"),
            provider: PROVIDER_A.to_string(),
        },
        SourcedJoke {
            joke: Joke::twopart("setup", "punch")
                .with_external_id("2")
                .with_category("programming")
                .with_safe(false),
            provider: PROVIDER_A.to_string(),
        },
        SourcedJoke {
            joke: Joke::single("three").with_external_id("3").with_category("pun"),
            provider: PROVIDER_B.to_string(),
        },
    ];
    repo.insert_jokes(&batch).await.unwrap();

    // Category filter input is lowercased before matching.
    let programming = repo
        .get_jokes(&JokeFilter {
            category: Some("PROGRAMMING".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(programming.len(), 2);

    let single_only = repo
        .get_jokes(&JokeFilter {
            kind: Some(JokeKind::Single),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(single_only.len(), 2);

    let unsafe_only = repo
        .get_jokes(&JokeFilter {
            safe: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(unsafe_only.len(), 1);
    assert_eq!(unsafe_only[0].external_id.as_deref(), Some("2"));

    let limited = repo
        .get_jokes(&JokeFilter {
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn stats_counts_are_consistent() {
    let (pool, _container) = setup_test_db().await;
    let repo = JokeRepository::new(pool);

    let batch = vec![
        single("1", "one", PROVIDER_A),
        single("2", "two", PROVIDER_A),
        SourcedJoke {
            joke: Joke::twopart("s", "p").with_external_id("3").with_safe(false),
            provider: PROVIDER_B.to_string(),
        },
    ];
    repo.insert_jokes(&batch).await.unwrap();

    let stats = repo.get_joke_stats().await.unwrap();
    assert_eq!(stats.total_jokes, 3);
    assert_eq!(stats.total_providers, 2);
    assert_eq!(stats.single_jokes, 2);
    assert_eq!(stats.twopart_jokes, 1);
    assert!(stats.single_jokes + stats.twopart_jokes <= stats.total_jokes);
    assert_eq!(stats.safe_jokes + stats.unsafe_jokes, stats.total_jokes);
    assert_eq!(stats.unsafe_jokes, 1);
}

#[tokio::test]
async fn provider_counts_group_and_filter() {
    let (pool, _container) = setup_test_db().await;
    let repo = JokeRepository::new(pool);

    let batch = vec![
        single("1", "one", PROVIDER_A),
        single("2", "two", PROVIDER_A),
        single("3", "three", PROVIDER_A),
        single("4", "four", PROVIDER_B),
    ];
    repo.insert_jokes(&batch).await.unwrap();

    let all = repo.joke_count_by_provider(None).await.unwrap();
    assert_eq!(all.len(), 2);
    // Ordered by descending joke count.
    assert_eq!(all[0].provider, PROVIDER_A);
    assert_eq!(all[0].joke_count, 3);

    let only_a = repo.joke_count_by_provider(Some(PROVIDER_A)).await.unwrap();
    assert_eq!(only_a.len(), 1);
    assert_eq!(only_a[0].joke_count, 3);
    assert_eq!(only_a[0].single_count, 3);
}

#[tokio::test]
async fn health_check_succeeds_on_live_database() {
    let (pool, _container) = setup_test_db().await;
    let repo = JokeRepository::new(pool);

    repo.health_check().await.unwrap();
}
