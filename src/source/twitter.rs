//! Twitter source via the twitterapi.io advanced search endpoint.

use super::{DiscussionSource, SourceKind};
use crate::config::{credential, TwitterSettings};
use crate::discussion::{into_discussions, Discussion};
use crate::error::{MurmurError, Result};
use crate::http::{endpoint, read_json};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

const SERVICE: &str = "twitterapi.io";
const SEARCH_PATH: &str = "twitter/tweet/advanced_search";

/// Tweets matching a query, newest-first or top-ranked.
pub struct TwitterSource {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    query_type: String,
    max_pages: u32,
}

impl TwitterSource {
    /// Create a source with the default ranking ("Top") and a single page.
    pub fn new(http: reqwest::Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            query_type: "Top".to_string(),
            max_pages: 1,
        }
    }

    /// Create a source from settings, reading the API key from the environment.
    pub fn from_settings(settings: &TwitterSettings, http: reqwest::Client) -> Result<Self> {
        let api_key = credential(&settings.api_key_env)?;
        Ok(Self::new(http, Url::parse(&settings.base_url)?, api_key)
            .with_query_type(&settings.query_type)
            .with_max_pages(settings.max_pages))
    }

    pub fn with_query_type(mut self, query_type: &str) -> Self {
        self.query_type = query_type.to_string();
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Advanced-search expression for a query and date filter.
    pub fn search_query(query: &str, since: NaiveDate) -> String {
        format!("{} since:{}", query.trim(), since.format("%Y-%m-%d"))
    }
}

#[async_trait]
impl DiscussionSource for TwitterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Twitter
    }

    #[instrument(skip(self), fields(source = "twitter"))]
    async fn fetch(&self, query: &str, since: NaiveDate) -> Result<Vec<Discussion>> {
        let url = endpoint(&self.base_url, SEARCH_PATH)?;
        let search = Self::search_query(query, since);

        let mut tweets = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 1..=self.max_pages {
            debug!("Requesting tweets page {}", page);
            let mut request = self
                .http
                .get(url.clone())
                .header("X-API-Key", &self.api_key)
                .query(&[("query", search.as_str()), ("queryType", self.query_type.as_str())]);
            if let Some(c) = cursor.as_deref() {
                request = request.query(&[("cursor", c)]);
            }
            let response = request.send().await?;
            let mut body = read_json(response, SERVICE).await?;

            match body.get_mut("tweets").map(Value::take) {
                Some(Value::Array(items)) => tweets.extend(items),
                Some(Value::Null) => {}
                _ => {
                    return Err(MurmurError::upstream(
                        SERVICE,
                        "response has no 'tweets' array",
                    ))
                }
            }

            let has_next = body["has_next_page"].as_bool().unwrap_or(false);
            cursor = body["next_cursor"]
                .as_str()
                .filter(|c| !c.is_empty())
                .map(String::from);
            if !has_next || cursor.is_none() {
                break;
            }
        }

        info!("Fetched {} tweets", tweets.len());
        Ok(into_discussions(tweets, SERVICE))
    }
}
