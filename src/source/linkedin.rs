//! LinkedIn source via Exa search-and-contents, restricted to configured domains.

use super::{DiscussionSource, SourceKind};
use crate::config::{credential, LinkedinSettings};
use crate::discussion::{into_discussions, Discussion};
use crate::error::Result;
use crate::http::{endpoint, read_json};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

const SERVICE: &str = "Exa";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    use_autoprompt: bool,
    include_domains: &'a [String],
    start_published_date: String,
    num_results: u32,
    contents: Contents,
}

#[derive(Debug, Serialize)]
struct Contents {
    text: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

/// One Exa hit, re-emitted with snake_case field names.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
struct SearchResult {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    published_date: Option<String>,
    author: Option<String>,
    text: Option<String>,
    score: Option<f64>,
}

/// Articles and posts from the configured domains (LinkedIn by default).
pub struct LinkedinSource {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    include_domains: Vec<String>,
    use_autoprompt: bool,
    num_results: u32,
}

impl LinkedinSource {
    /// Create a source restricted to linkedin.com.
    pub fn new(http: reqwest::Client, base_url: Url, api_key: impl Into<String>) -> Self {
        let defaults = LinkedinSettings::default();
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            include_domains: defaults.include_domains,
            use_autoprompt: defaults.use_autoprompt,
            num_results: defaults.num_results,
        }
    }

    /// Create a source from settings, reading the API key from the environment.
    pub fn from_settings(settings: &LinkedinSettings, http: reqwest::Client) -> Result<Self> {
        let api_key = credential(&settings.api_key_env)?;
        let mut source = Self::new(http, Url::parse(&settings.base_url)?, api_key);
        source.include_domains = settings.include_domains.clone();
        source.use_autoprompt = settings.use_autoprompt;
        source.num_results = settings.num_results;
        Ok(source)
    }

    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.include_domains = domains;
        self
    }
}

#[async_trait]
impl DiscussionSource for LinkedinSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Linkedin
    }

    #[instrument(skip(self), fields(source = "linkedin"))]
    async fn fetch(&self, query: &str, since: NaiveDate) -> Result<Vec<Discussion>> {
        let request = SearchRequest {
            query: query.trim(),
            use_autoprompt: self.use_autoprompt,
            include_domains: &self.include_domains,
            start_published_date: format!("{}T00:00:00.000Z", since.format("%Y-%m-%d")),
            num_results: self.num_results,
            contents: Contents { text: true },
        };

        let response = self
            .http
            .post(endpoint(&self.base_url, "search")?)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let body = read_json(response, SERVICE).await?;
        let parsed: SearchResponse = serde_json::from_value(body)?;

        let records = parsed
            .results
            .into_iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!("Fetched {} results", records.len());
        Ok(into_discussions(records, SERVICE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MurmurError;
    use crate::testing::{client, StubServer};
    use axum::http::StatusCode;
    use serde_json::json;

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_projects_results() {
        let server = StubServer::start(vec![(
            "/search",
            StatusCode::OK,
            json!({
                "requestId": "r1",
                "results": [{
                    "id": "https://www.linkedin.com/posts/jane_cursor",
                    "title": "Why our team moved to Cursor",
                    "url": "https://www.linkedin.com/posts/jane_cursor",
                    "publishedDate": "2025-03-15T00:00:00.000Z",
                    "author": "Jane Doe",
                    "text": "We switched last month...",
                    "score": 0.42
                }]
            }),
        )])
        .await;

        let source = LinkedinSource::new(client(), server.base_url.clone(), "exa-key");
        let results = source.fetch("cursor", since()).await.unwrap();

        assert_eq!(results.len(), 1);
        let record = results[0].fields();
        assert_eq!(record["published_date"], "2025-03-15T00:00:00.000Z");
        assert_eq!(record["author"], "Jane Doe");
        assert_eq!(record["score"], 0.42);
        assert!(!record.contains_key("publishedDate"));

        let request = &server.requests()[0];
        assert_eq!(request.header("x-api-key"), Some("exa-key"));
        let body = request.json();
        assert_eq!(body["query"], "cursor");
        assert_eq!(body["includeDomains"], json!(["linkedin.com"]));
        assert_eq!(body["useAutoprompt"], true);
        assert_eq!(body["startPublishedDate"], "2025-03-12T00:00:00.000Z");
        assert_eq!(body["contents"]["text"], true);
    }

    #[tokio::test]
    async fn test_no_results_is_empty_list() {
        let server = StubServer::start(vec![(
            "/search",
            StatusCode::OK,
            json!({ "requestId": "r2", "results": [] }),
        )])
        .await;

        let source = LinkedinSource::new(client(), server.base_url.clone(), "k");
        let results = source.fetch("cursor", since()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_missing_optional_fields_become_null() {
        let server = StubServer::start(vec![(
            "/search",
            StatusCode::OK,
            json!({ "results": [{ "url": "https://www.linkedin.com/pulse/x" }] }),
        )])
        .await;

        let source = LinkedinSource::new(client(), server.base_url.clone(), "k")
            .with_domains(vec!["linkedin.com".to_string(), "medium.com".to_string()]);
        let results = source.fetch("cursor", since()).await.unwrap();

        assert_eq!(results[0].fields()["author"], serde_json::Value::Null);
        assert_eq!(
            server.requests()[0].json()["includeDomains"],
            json!(["linkedin.com", "medium.com"])
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let server = StubServer::start(vec![("/search", StatusCode::OK, json!({ "error": "x" }))]).await;

        let source = LinkedinSource::new(client(), server.base_url.clone(), "k");
        let err = source.fetch("cursor", since()).await.unwrap_err();
        assert!(matches!(err, MurmurError::Json(_)));
    }
}
