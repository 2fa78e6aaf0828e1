//! Test utilities: a scripted [`JokeProvider`] for dependency injection.
//!
//! Handwritten mock using `Arc<Mutex<_>>` interior mutability so cloned
//! handles share the response queue and the recorded call log.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::Joke;
use crate::provider::JokeProvider;

/// Calls recorded by a [`StaticProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    RandomJoke,
    JokeByCategory(String),
}

/// A provider with a fixed identity and a scripted queue of responses.
///
/// Each fetch pops the front of the queue; an exhausted queue repeats the
/// last configured joke, or errors if none was ever configured.
#[derive(Clone)]
pub struct StaticProvider {
    name: String,
    base_url: String,
    categories: Vec<&'static str>,
    responses: Arc<Mutex<Vec<Result<Joke, AppError>>>>,
    fallback: Arc<Mutex<Option<Joke>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StaticProvider {
    pub fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            categories: Vec::new(),
            responses: Arc::new(Mutex::new(Vec::new())),
            fallback: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always serve this joke once the scripted queue is exhausted.
    pub fn with_joke(self, joke: Joke) -> Self {
        *self.fallback.lock().unwrap() = Some(joke);
        self
    }

    /// Script an exact sequence of responses.
    pub fn with_responses(self, responses: Vec<Result<Joke, AppError>>) -> Self {
        *self.responses.lock().unwrap() = responses;
        self
    }

    pub fn with_categories(mut self, categories: &[&'static str]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<Joke, AppError> {
        let mut queue = self.responses.lock().unwrap();
        if !queue.is_empty() {
            return queue.remove(0);
        }
        match self.fallback.lock().unwrap().as_ref() {
            Some(joke) => Ok(joke.clone()),
            None => Err(AppError::upstream(&self.name, "scripted queue exhausted")),
        }
    }
}

#[async_trait]
impl JokeProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn supported_categories(&self) -> &[&str] {
        &self.categories
    }

    async fn random_joke(&self) -> Result<Joke, AppError> {
        self.calls.lock().unwrap().push(RecordedCall::RandomJoke);
        self.next_response()
    }

    async fn joke_by_category(&self, category: &str) -> Result<Joke, AppError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::JokeByCategory(category.to_string()));
        self.next_response()
    }
}
