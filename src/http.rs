//! Shared HTTP plumbing for the upstream adapters.

use crate::error::{MurmurError, Result};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// User agent sent with every upstream request.
pub const USER_AGENT: &str = concat!("murmur/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in error messages.
const ERROR_BODY_PREVIEW: usize = 300;

/// Create the HTTP client shared by all adapters.
pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Join an API path onto a configured base URL.
///
/// Unlike `Url::join`, a path on the base is kept and segments containing
/// a colon (`models/x:generateContent`) are not mistaken for a scheme.
pub fn endpoint(base: &Url, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&joined)?)
}

/// Read a JSON body, turning non-success statuses into upstream errors.
pub async fn read_json(response: reqwest::Response, service: &str) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
        return Err(MurmurError::upstream(
            service,
            format!("HTTP {}: {}", status, preview.trim()),
        ));
    }

    Ok(serde_json::from_str(&body)?)
}
