use async_trait::async_trait;
use quip_core::{AppError, Joke, JokeProvider};
use reqwest::Client;

use crate::http::{build_client, get_json};

const NAME: &str = "JokesAPI (jokeapi.dev)";
const BASE_URL: &str = "https://v2.jokeapi.dev";

const CATEGORIES: &[&str] = &[
    "any",
    "miscellaneous",
    "programming",
    "dark",
    "pun",
    "spooky",
    "christmas",
];

/// jokeapi.dev v2. Serves both single and twopart jokes; safe-mode is always
/// requested.
#[derive(Clone)]
pub struct JokeApiProvider {
    client: Client,
}

impl JokeApiProvider {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            client: build_client()?,
        })
    }
}

#[async_trait]
impl JokeProvider for JokeApiProvider {
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
        let url = format!("{BASE_URL}/joke/Any?safe-mode");
        let data: JokeApiResponse = get_json(&self.client, NAME, &url).await?;
        normalize(data)
    }

    async fn joke_by_category(&self, category: &str) -> Result<Joke, AppError> {
        let url = format!("{BASE_URL}/joke/{}?safe-mode", valid_category(category));
        let data: JokeApiResponse = get_json(&self.client, NAME, &url).await?;
        normalize(data)
    }
}

/// Unknown categories degrade to `Any` rather than erroring.
fn valid_category(category: &str) -> String {
    let lowered = category.to_lowercase();
    if CATEGORIES.contains(&lowered.as_str()) {
        lowered
    } else {
        "Any".to_string()
    }
}

#[derive(Debug, serde::Deserialize)]
struct JokeApiResponse {
    #[serde(default)]
    error: bool,
    id: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    joke: Option<String>,
    setup: Option<String>,
    delivery: Option<String>,
    category: Option<String>,
    safe: Option<bool>,
    lang: Option<String>,
}

fn normalize(data: JokeApiResponse) -> Result<Joke, AppError> {
    if data.error {
        return Err(AppError::upstream(NAME, "upstream reported an error body"));
    }

    let mut joke = match (data.kind.as_deref(), data.joke, data.setup, data.delivery) {
        (Some("single"), Some(content), _, _) => Joke::single(content),
        (Some("twopart"), _, Some(setup), Some(delivery)) => Joke::twopart(setup, delivery),
        _ => {
            return Err(AppError::upstream(
                NAME,
                "response carries neither a single nor a twopart joke",
            ));
        }
    };

    if let Some(id) = data.id {
        joke = joke.with_external_id(id);
    }
    if let Some(category) = data.category.as_deref() {
        joke = joke.with_category(category);
    }
    if let Some(safe) = data.safe {
        joke = joke.with_safe(safe);
    }
    if let Some(lang) = data.lang {
        joke = joke.with_lang(lang);
    }
    Ok(joke)
}
