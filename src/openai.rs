//! OpenAI-compatible chat client used by the agent.
//!
//! Any endpoint speaking the chat-completions protocol works; the default
//! points at Gemini's compatibility layer so one key covers both the
//! summarizer and the agent.

use crate::config::{credential, AgentSettings};
use crate::error::Result;
use crate::http::create_http_client;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a chat client for the configured endpoint and API key variable.
pub fn create_client(settings: &AgentSettings, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let api_key = credential(&settings.api_key_env)?;
    create_client_with_key(&settings.api_base, &api_key, timeout)
}

/// Create a chat client with an explicit key.
pub fn create_client_with_key(
    api_base: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(create_http_client(timeout)?))
}
