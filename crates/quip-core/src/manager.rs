use std::sync::Arc;

use rand::Rng;

use crate::error::AppError;
use crate::models::SourcedJoke;
use crate::provider::{JokeProvider, supports_category};

/// Read-only description of a registered provider.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderInfo {
    pub name: String,
    pub base_url: String,
    pub categories: Vec<String>,
}

/// Holds the provider collection and performs selection and fan-out.
///
/// The collection is supplied by the caller (all six concrete providers in
/// production, scripted test doubles in tests) and is immutable for the
/// process lifetime.
#[derive(Clone)]
pub struct JokeManager {
    providers: Vec<Arc<dyn JokeProvider>>,
}

impl JokeManager {
    pub fn new(providers: Vec<Arc<dyn JokeProvider>>) -> Self {
        Self { providers }
    }

    /// Fetch one joke from a uniformly random provider, tagged with that
    /// provider's base URL. Provider failures propagate to the caller.
    pub async fn random_joke(&self) -> Result<SourcedJoke, AppError> {
        let provider = self.pick(&self.providers)?;
        let joke = provider.random_joke().await?;
        Ok(SourcedJoke {
            joke,
            provider: provider.base_url().to_string(),
        })
    }

    /// Fetch a joke from the provider whose name contains `name`
    /// (case-insensitive).
    pub async fn joke_from_provider(&self, name: &str) -> Result<SourcedJoke, AppError> {
        let wanted = name.to_lowercase();
        let provider = self
            .providers
            .iter()
            .find(|p| p.name().to_lowercase().contains(&wanted))
            .ok_or_else(|| AppError::NotFound(format!("provider \"{name}\" not found")))?;

        let joke = provider.random_joke().await?;
        Ok(SourcedJoke {
            joke,
            provider: provider.base_url().to_string(),
        })
    }

    /// Fetch a joke in the given category from a random provider that
    /// supports it. Falls back to a fully random joke when no provider
    /// lists a matching category.
    pub async fn joke_by_category(&self, category: &str) -> Result<SourcedJoke, AppError> {
        let matching: Vec<&Arc<dyn JokeProvider>> = self
            .providers
            .iter()
            .filter(|p| supports_category(p.as_ref(), category))
            .collect();

        if matching.is_empty() {
            tracing::debug!(category, "no provider supports category, falling back to random");
            return self.random_joke().await;
        }

        let provider = self.pick(&matching)?;
        let joke = provider.joke_by_category(category).await?;
        Ok(SourcedJoke {
            joke,
            provider: provider.base_url().to_string(),
        })
    }

    /// Launch `count` independent random fetches concurrently and collect the
    /// successful ones in issue order. Individual failures are logged and
    /// skipped so one flaky upstream does not sink a whole batch.
    pub async fn multiple_jokes(&self, count: usize) -> Vec<SourcedJoke> {
        let fetches = (0..count).map(|_| self.random_joke());
        let results = futures::future::join_all(fetches).await;

        let mut jokes = Vec::with_capacity(count);
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(joke) => jokes.push(joke),
                Err(e) => tracing::warn!(index = i, error = %e, "joke fetch failed, skipping"),
            }
        }
        jokes
    }

    /// List all registered providers.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .map(|p| ProviderInfo {
                name: p.name().to_string(),
                base_url: p.base_url().to_string(),
                categories: p
                    .supported_categories()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            })
            .collect()
    }

    /// All categories across all providers, deduplicated and sorted.
    pub fn all_categories(&self) -> Vec<String> {
        let set: std::collections::BTreeSet<String> = self
            .providers
            .iter()
            .flat_map(|p| p.supported_categories().iter().map(|c| c.to_string()))
            .collect();
        set.into_iter().collect()
    }

    fn pick<'a, P>(&self, pool: &'a [P]) -> Result<&'a P, AppError> {
        if pool.is_empty() {
            return Err(AppError::NotFound("no providers registered".into()));
        }
        let idx = rand::rng().random_range(0..pool.len());
        Ok(&pool[idx])
    }
}
