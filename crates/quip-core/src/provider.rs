use async_trait::async_trait;

use crate::error::AppError;
use crate::models::Joke;

/// An adapter to one upstream joke source.
///
/// Each implementation owns its upstream's parsing logic; the only shared
/// contract is the normalized [`Joke`] output. Category support is optional;
/// the default `joke_by_category` falls back to a random joke, matching the
/// behavior of sources with no category endpoint.
#[async_trait]
pub trait JokeProvider: Send + Sync {
    /// Human-readable provider name (used for provider lookup).
    fn name(&self) -> &str;

    /// Upstream base URL. Persisted as the `provider` column.
    fn base_url(&self) -> &str;

    /// Static list of categories this source supports, empty if none.
    fn supported_categories(&self) -> &[&str] {
        &[]
    }

    /// Fetch one joke and normalize it.
    async fn random_joke(&self) -> Result<Joke, AppError>;

    /// Fetch a joke in the given category, falling back to a random joke
    /// when the source does not support category filtering.
    async fn joke_by_category(&self, _category: &str) -> Result<Joke, AppError> {
        self.random_joke().await
    }
}

/// Case-insensitive membership test against a provider's category list.
pub fn supports_category(provider: &dyn JokeProvider, category: &str) -> bool {
    let wanted = category.to_lowercase();
    provider
        .supported_categories()
        .iter()
        .any(|c| c.to_lowercase().contains(&wanted))
}
