use thiserror::Error;

/// Application-wide error types for Quip.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream joke API returned a non-2xx response or an unparseable body.
    #[error("upstream error from {provider}: {message}")]
    Upstream { provider: String, message: String },

    /// A named provider (or category with no fallback) has no match.
    #[error("{0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Missing or invalid environment configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Shorthand for an [`AppError::Upstream`] tagged with the provider name.
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
