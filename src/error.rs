//! Error types for Murmur.

use thiserror::Error;

/// Library-level error type for Murmur operations.
#[derive(Error, Debug)]
pub enum MurmurError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0} is not set. Export it or add it to a .env file.")]
    MissingCredential(String),

    #[error("{service} request failed: {message}")]
    Upstream { service: String, message: String },

    #[error("Summarization failed: {0}")]
    Summarize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Chat completion API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

impl MurmurError {
    /// Build an upstream error for the named service.
    pub fn upstream(service: &str, message: impl Into<String>) -> Self {
        MurmurError::Upstream {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for Murmur operations.
pub type Result<T> = std::result::Result<T, MurmurError>;
