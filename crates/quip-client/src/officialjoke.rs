use async_trait::async_trait;
use quip_core::{AppError, Joke, JokeProvider};
use reqwest::Client;

use crate::http::{build_client, get_json};

const NAME: &str = "Official Joke API";
const BASE_URL: &str = "https://official-joke-api.appspot.com";

const CATEGORIES: &[&str] = &["general", "programming", "knock-knock", "dad"];

/// official-joke-api.appspot.com. Everything is setup/punchline; the
/// upstream `type` field is actually its category label.
#[derive(Clone)]
pub struct OfficialJokeProvider {
    client: Client,
}

impl OfficialJokeProvider {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            client: build_client()?,
        })
    }
}

#[async_trait]
impl JokeProvider for OfficialJokeProvider {
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
        let url = format!("{BASE_URL}/random_joke");
        let data: OfficialJokeResponse = get_json(&self.client, NAME, &url).await?;
        Ok(normalize(data))
    }

    async fn joke_by_category(&self, category: &str) -> Result<Joke, AppError> {
        let lowered = category.to_lowercase();
        let valid = if CATEGORIES.contains(&lowered.as_str()) {
            lowered
        } else {
            "general".to_string()
        };

        // The category endpoint returns a one-element array.
        let url = format!("{BASE_URL}/jokes/{valid}/random");
        let batch: Vec<OfficialJokeResponse> = get_json(&self.client, NAME, &url).await?;
        let data = batch
            .into_iter()
            .next()
            .ok_or_else(|| AppError::upstream(NAME, "category endpoint returned an empty list"))?;
        Ok(normalize(data))
    }
}

#[derive(Debug, serde::Deserialize)]
struct OfficialJokeResponse {
    id: Option<i64>,
    #[serde(rename = "type")]
    category: Option<String>,
    setup: String,
    punchline: String,
}

fn normalize(data: OfficialJokeResponse) -> Joke {
    let mut joke = Joke::twopart(data.setup, data.punchline);
    if let Some(id) = data.id {
        joke = joke.with_external_id(id);
    }
    if let Some(category) = data.category.as_deref() {
        joke = joke.with_category(category);
    }
    joke
}
