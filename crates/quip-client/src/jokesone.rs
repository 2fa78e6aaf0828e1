use std::time::Duration;

use async_trait::async_trait;
use quip_core::{AppError, Joke, JokeProvider};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::http::USER_AGENT;

const NAME: &str = "Jokes One API";
const BASE_URL: &str = "https://api.jokes.one";
const API_KEY_HEADER: &str = "X-JokesOne-Api-Secret";

const CATEGORIES: &[&str] = &["general", "dad", "programming", "science"];

/// api.jokes.one joke-of-the-day. Free tier is unreliable and keyless, so
/// this provider never fails: any transport, status, or parse problem is
/// masked with a hardcoded fallback joke. This masking is specific to this
/// provider and intentionally not shared.
#[derive(Clone)]
pub struct JokesOneProvider {
    client: Client,
}

impl JokesOneProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&key)
                .map_err(|_| AppError::Config("invalid Jokes One API key".into()))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn fetch_jod(&self) -> Result<Joke, AppError> {
        let url = format!("{BASE_URL}/jod");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::upstream(NAME, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                NAME,
                format!("HTTP {} for {url}", status.as_u16()),
            ));
        }

        let data: JodResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(NAME, format!("unexpected response shape: {e}")))?;
        normalize(data)
    }
}

#[async_trait]
impl JokeProvider for JokesOneProvider {
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
        match self.fetch_jod().await {
            Ok(joke) => Ok(joke),
            Err(e) => {
                tracing::debug!(error = %e, "jokes.one unavailable, serving fallback joke");
                Ok(fallback_joke())
            }
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct JodResponse {
    joke: Option<JodJoke>,
    contents: Option<JodContents>,
}

#[derive(Debug, serde::Deserialize)]
struct JodContents {
    #[serde(default)]
    jokes: Vec<JodEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct JodEntry {
    joke: JodJoke,
}

#[derive(Debug, serde::Deserialize)]
struct JodJoke {
    id: Option<String>,
    text: Option<String>,
    category: Option<String>,
}

/// The joke lives either at the top level or nested under
/// `contents.jokes[0]`, depending on plan and endpoint mood.
fn normalize(data: JodResponse) -> Result<Joke, AppError> {
    let top = data.joke;
    let nested = data
        .contents
        .and_then(|c| c.jokes.into_iter().next())
        .map(|e| e.joke);

    let (text, id, category) = match (top, nested) {
        (Some(j), nested) => {
            let text = j.text.or(nested.and_then(|n| n.text));
            (text, j.id, j.category)
        }
        (None, Some(n)) => (n.text, n.id, n.category),
        (None, None) => (None, None, None),
    };

    let text = text.ok_or_else(|| AppError::upstream(NAME, "response carries no joke text"))?;

    let mut joke = Joke::single(text).with_category(category.as_deref().unwrap_or("general"));
    if let Some(id) = id {
        joke = joke.with_external_id(id);
    }
    Ok(joke)
}

fn fallback_joke() -> Joke {
    Joke::single("Why don't scientists trust atoms? Because they make up everything!")
        .with_category("science")
}
