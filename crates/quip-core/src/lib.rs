pub mod error;
pub mod manager;
pub mod models;
pub mod provider;
pub mod testutil;

pub use error::AppError;
pub use manager::{JokeManager, ProviderInfo};
pub use models::{
    BatchInsertOutcome, Joke, JokeFilter, JokeKind, JokePayload, JokeRecord, SourcedJoke,
};
pub use provider::JokeProvider;
