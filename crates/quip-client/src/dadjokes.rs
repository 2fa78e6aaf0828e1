use std::time::Duration;

use async_trait::async_trait;
use quip_core::{AppError, Joke, JokeProvider};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::http::{USER_AGENT, get_json};

const NAME: &str = "icanhazdadjoke";
const BASE_URL: &str = "https://icanhazdadjoke.com";

const CATEGORIES: &[&str] = &["dad jokes"];

/// icanhazdadjoke.com. Plain-text by default; the `Accept:
/// application/json` header switches it to JSON. No category endpoint, so
/// category requests take the trait's random-joke fallback.
#[derive(Clone)]
pub struct DadJokesProvider {
    client: Client,
}

impl DadJokesProvider {
    pub fn new() -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl JokeProvider for DadJokesProvider {
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
        let data: DadJokeResponse = get_json(&self.client, NAME, BASE_URL).await?;
        Ok(normalize(data))
    }
}

#[derive(Debug, serde::Deserialize)]
struct DadJokeResponse {
    id: String,
    joke: String,
}

fn normalize(data: DadJokeResponse) -> Joke {
    Joke::single(data.joke)
        .with_external_id(data.id)
        .with_category("dad jokes")
}
