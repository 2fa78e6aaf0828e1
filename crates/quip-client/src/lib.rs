//! Upstream joke API adapters.
//!
//! One module per upstream. Each provider owns its response shape and
//! normalization; the only shared piece is the HTTP client builder.

pub mod chucknorris;
pub mod dadjokes;
mod http;
pub mod jokeapi;
pub mod jokesone;
pub mod officialjoke;
pub mod sv443;

use std::sync::Arc;

use quip_core::{AppError, JokeProvider};

pub use chucknorris::ChuckNorrisProvider;
pub use dadjokes::DadJokesProvider;
pub use jokeapi::JokeApiProvider;
pub use jokesone::JokesOneProvider;
pub use officialjoke::OfficialJokeProvider;
pub use sv443::Sv443JokeProvider;

/// The default six-provider set.
///
/// The Jokes One API key is read from `JOKES_ONE_API_KEY` if present.
pub fn all_providers() -> Result<Vec<Arc<dyn JokeProvider>>, AppError> {
    let jokes_one_key = std::env::var("JOKES_ONE_API_KEY").ok();

    Ok(vec![
        Arc::new(JokeApiProvider::new()?),
        Arc::new(DadJokesProvider::new()?),
        Arc::new(ChuckNorrisProvider::new()?),
        Arc::new(OfficialJokeProvider::new()?),
        Arc::new(Sv443JokeProvider::new()?),
        Arc::new(JokesOneProvider::new(jokes_one_key)?),
    ])
}
