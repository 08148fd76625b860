//! YouTube source via an Apify scraper actor.
//!
//! The actor is started with a job configuration, awaited until it reaches
//! a terminal status, and its default dataset is read back as records.

use super::{DiscussionSource, SourceKind};
use crate::config::{credential, YoutubeSettings};
use crate::discussion::{into_discussions, Discussion};
use crate::error::{MurmurError, Result};
use crate::http::{endpoint, read_json};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use url::Url;

const SERVICE: &str = "Apify";

/// Longest single wait the run API accepts.
const MAX_WAIT_PER_REQUEST_SECS: u64 = 60;

/// Job configuration understood by the YouTube scraper actor.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeInput {
    pub oldest_post_date: String,
    pub date_filter: String,
    pub download_subtitles: bool,
    pub max_result_streams: u32,
    pub max_results: u32,
    pub max_results_shorts: u32,
    pub prefer_auto_generated_subtitles: bool,
    #[serde(rename = "saveSubsToKVS")]
    pub save_subs_to_kvs: bool,
    pub search_queries: Vec<String>,
    pub subtitles_language: String,
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    data: ActorRun,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActorRun {
    id: String,
    status: String,
    default_dataset_id: String,
}

impl ActorRun {
    fn is_finished(&self) -> bool {
        matches!(
            self.status.as_str(),
            "SUCCEEDED" | "FAILED" | "ABORTED" | "TIMED-OUT"
        )
    }
}

/// Videos (with subtitles) matching a query.
pub struct YoutubeSource {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    actor_id: String,
    settings: YoutubeSettings,
}

impl YoutubeSource {
    /// Create a source for an actor with default job settings.
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        token: impl Into<String>,
        actor_id: &str,
    ) -> Self {
        Self {
            http,
            base_url,
            token: token.into(),
            actor_id: actor_id.to_string(),
            settings: YoutubeSettings::default(),
        }
    }

    /// Create a source from settings, reading the token from the environment.
    pub fn from_settings(settings: &YoutubeSettings, http: reqwest::Client) -> Result<Self> {
        let token = credential(&settings.token_env)?;
        let mut source = Self::new(http, Url::parse(&settings.base_url)?, token, &settings.actor_id);
        source.settings = settings.clone();
        Ok(source)
    }

    /// Build the job configuration for a query.
    pub fn scrape_input(&self, query: &str, since: NaiveDate) -> ScrapeInput {
        ScrapeInput {
            oldest_post_date: since.format("%Y-%m-%d").to_string(),
            date_filter: self.settings.date_filter.clone(),
            download_subtitles: self.settings.download_subtitles,
            max_result_streams: 0,
            max_results: self.settings.max_results,
            max_results_shorts: 0,
            prefer_auto_generated_subtitles: self.settings.prefer_auto_generated_subtitles,
            save_subs_to_kvs: self.settings.save_subs_to_kvs,
            search_queries: vec![query.trim().to_string()],
            subtitles_language: self.settings.subtitles_language.clone(),
        }
    }

    fn wait_secs(&self) -> u64 {
        self.settings.max_wait_secs.min(MAX_WAIT_PER_REQUEST_SECS)
    }

    async fn start_run(&self, input: &ScrapeInput) -> Result<ActorRun> {
        let url = endpoint(&self.base_url, &format!("v2/acts/{}/runs", self.actor_id))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .query(&[("waitForFinish", self.wait_secs())])
            .json(input)
            .send()
            .await?;
        let body = read_json(response, SERVICE).await?;
        Ok(serde_json::from_value::<RunEnvelope>(body)?.data)
    }

    async fn poll_run(&self, run_id: &str) -> Result<ActorRun> {
        let url = endpoint(&self.base_url, &format!("v2/actor-runs/{}", run_id))?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("waitForFinish", self.wait_secs())])
            .send()
            .await?;
        let body = read_json(response, SERVICE).await?;
        Ok(serde_json::from_value::<RunEnvelope>(body)?.data)
    }

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>> {
        let url = endpoint(&self.base_url, &format!("v2/datasets/{}/items", dataset_id))?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("format", "json"), ("clean", "true")])
            .send()
            .await?;

        match read_json(response, SERVICE).await? {
            Value::Array(items) => Ok(items),
            other => Err(MurmurError::upstream(
                SERVICE,
                format!("dataset {} is not a list: {}", dataset_id, other),
            )),
        }
    }
}

#[async_trait]
impl DiscussionSource for YoutubeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Youtube
    }

    #[instrument(skip(self), fields(source = "youtube", actor = %self.actor_id))]
    async fn fetch(&self, query: &str, since: NaiveDate) -> Result<Vec<Discussion>> {
        let input = self.scrape_input(query, since);
        let started = Instant::now();
        let budget = Duration::from_secs(self.settings.max_wait_secs);

        let mut run = self.start_run(&input).await?;
        debug!("Actor run {} is {}", run.id, run.status);

        while !run.is_finished() {
            if started.elapsed() >= budget {
                return Err(MurmurError::upstream(
                    SERVICE,
                    format!(
                        "actor run {} still {} after {}s",
                        run.id,
                        run.status,
                        budget.as_secs()
                    ),
                ));
            }
            run = self.poll_run(&run.id).await?;
            debug!("Actor run {} is {}", run.id, run.status);
        }

        if run.status != "SUCCEEDED" {
            return Err(MurmurError::upstream(
                SERVICE,
                format!("actor run {} finished with status {}", run.id, run.status),
            ));
        }

        let items = self.dataset_items(&run.default_dataset_id).await?;
        info!("Fetched {} videos", items.len());
        Ok(into_discussions(items, SERVICE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client, StubServer};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    const ACTOR: &str = "h7sDV53CddomktSi5";

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    fn runs_path() -> String {
        format!("/v2/acts/{}/runs", ACTOR)
    }

    fn run(status: &str) -> Value {
        json!({ "data": { "id": "run1", "status": status, "defaultDatasetId": "ds1" } })
    }

    #[test]
    fn test_scrape_input_uses_query() {
        let source = YoutubeSource::new(client(), Url::parse("http://localhost").unwrap(), "t", ACTOR);
        let input = serde_json::to_value(source.scrape_input(" cursor ", since())).unwrap();

        assert_eq!(input["searchQueries"], json!(["cursor"]));
        assert_eq!(input["oldestPostDate"], "2025-03-12");
        assert_eq!(input["dateFilter"], "week");
        assert_eq!(input["maxResults"], 10);
        assert_eq!(input["maxResultStreams"], 0);
        assert_eq!(input["maxResultsShorts"], 0);
        assert_eq!(input["saveSubsToKVS"], true);
        assert_eq!(input["subtitlesLanguage"], "en");
    }

    #[tokio::test]
    async fn test_fetch_waits_for_run_then_reads_dataset() {
        let server = StubServer::start(vec![
            (runs_path().as_str(), StatusCode::CREATED, run("RUNNING")),
            ("/v2/actor-runs/run1", StatusCode::OK, run("SUCCEEDED")),
            (
                "/v2/datasets/ds1/items",
                StatusCode::OK,
                json!([
                    { "title": "Cursor in 100 seconds", "channelName": "Fireship", "url": "https://youtu.be/x" },
                    "not a record"
                ]),
            ),
        ])
        .await;

        let source = YoutubeSource::new(client(), server.base_url.clone(), "token", ACTOR);
        let videos = source.fetch("cursor", since()).await.unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].citation().author.as_deref(), Some("Fireship"));

        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].header("authorization"), Some("Bearer token"));
        assert_eq!(requests[0].json()["searchQueries"], json!(["cursor"]));
        assert_eq!(requests[0].query_param("waitForFinish").as_deref(), Some("60"));
        assert_eq!(requests[2].query_param("clean").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_empty_dataset_is_empty_list() {
        let server = StubServer::start(vec![
            (runs_path().as_str(), StatusCode::CREATED, run("SUCCEEDED")),
            ("/v2/datasets/ds1/items", StatusCode::OK, json!([])),
        ])
        .await;

        let source = YoutubeSource::new(client(), server.base_url.clone(), "token", ACTOR);
        let videos = source.fetch("cursor", since()).await.unwrap();

        assert!(videos.is_empty());
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_run_is_error() {
        let server = StubServer::start(vec![(
            runs_path().as_str(),
            StatusCode::CREATED,
            run("FAILED"),
        )])
        .await;

        let source = YoutubeSource::new(client(), server.base_url.clone(), "token", ACTOR);
        let err = source.fetch("cursor", since()).await.unwrap_err();
        assert!(err.to_string().contains("FAILED"));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_run_payload_is_json_error() {
        let server = StubServer::start(vec![(
            runs_path().as_str(),
            StatusCode::CREATED,
            json!({ "unexpected": true }),
        )])
        .await;

        let source = YoutubeSource::new(client(), server.base_url.clone(), "token", ACTOR);
        let err = source.fetch("cursor", since()).await.unwrap_err();
        assert!(matches!(err, MurmurError::Json(_)));
    }
}
