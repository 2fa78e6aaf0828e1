use async_trait::async_trait;
use quip_core::{AppError, Joke, JokeProvider};
use reqwest::Client;

use crate::http::{build_client, get_json};

const NAME: &str = "Chuck Norris Jokes API";
const BASE_URL: &str = "https://api.chucknorris.io";

const CATEGORIES: &[&str] = &[
    "animal",
    "career",
    "celebrity",
    "dev",
    "explicit",
    "fashion",
    "food",
    "history",
    "money",
    "movie",
    "music",
    "political",
    "religion",
    "science",
    "sport",
    "travel",
];

/// api.chucknorris.io. Single-form only; uncategorized facts are tagged
/// "uncategorized".
#[derive(Clone)]
pub struct ChuckNorrisProvider {
    client: Client,
}

impl ChuckNorrisProvider {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            client: build_client()?,
        })
    }
}

#[async_trait]
impl JokeProvider for ChuckNorrisProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    fn supported_categories(&self) -> &[&str] {
        CATEGORIES
    }

    async fn random_joke(&self) -> Result<Joke, AppError> {
        let url = format!("{BASE_URL}/jokes/random");
        let data: ChuckNorrisResponse = get_json(&self.client, NAME, &url).await?;
        Ok(normalize(data, None))
    }

    async fn joke_by_category(&self, category: &str) -> Result<Joke, AppError> {
        let lowered = category.to_lowercase();
        if !CATEGORIES.contains(&lowered.as_str()) {
            return self.random_joke().await;
        }

        let url = format!("{BASE_URL}/jokes/random?category={lowered}");
        let data: ChuckNorrisResponse = get_json(&self.client, NAME, &url).await?;
        Ok(normalize(data, Some(&lowered)))
    }
}

#[derive(Debug, serde::Deserialize)]
struct ChuckNorrisResponse {
    id: String,
    value: String,
    #[serde(default)]
    categories: Vec<String>,
}

/// `requested` is the category the caller asked for; it stands in when the
/// response carries no category of its own.
fn normalize(data: ChuckNorrisResponse, requested: Option<&str>) -> Joke {
    let category = data
        .categories
        .first()
        .map(String::as_str)
        .or(requested)
        .unwrap_or("uncategorized");

    Joke::single(data.value)
        .with_external_id(data.id)
        .with_category(category)
}
