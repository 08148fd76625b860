//! Gemini `generateContent` summarizer.

use super::Summarizer;
use crate::config::{credential, Prompts, SummarizerSettings};
use crate::error::{MurmurError, Result};
use crate::http::{endpoint, read_json};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

const SERVICE: &str = "Gemini";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why no text came back, if the API said.
    fn empty_reason(&self) -> String {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return format!("prompt blocked ({})", reason);
        }
        match self.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            Some(reason) => format!("no text in response (finish reason {})", reason),
            None => "no candidates in response".to_string(),
        }
    }
}

/// Summarizer backed by a hosted Gemini model.
pub struct GeminiSummarizer {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    model: String,
    instruction: String,
}

impl GeminiSummarizer {
    /// Create a summarizer with the default instruction.
    pub fn new(http: reqwest::Client, base_url: Url, api_key: impl Into<String>, model: &str) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            model: model.to_string(),
            instruction: Prompts::default().summary_instruction(),
        }
    }

    /// Create a summarizer from settings and prompts, reading the key from the environment.
    pub fn from_settings(
        settings: &SummarizerSettings,
        prompts: &Prompts,
        http: reqwest::Client,
    ) -> Result<Self> {
        let api_key = credential(&settings.api_key_env)?;
        Ok(
            Self::new(http, Url::parse(&settings.base_url)?, api_key, &settings.model)
                .with_instruction(&prompts.summary_instruction()),
        )
    }

    pub fn with_instruction(mut self, instruction: &str) -> Self {
        self.instruction = instruction.to_string();
        self
    }

    /// Model identifier used for generation.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full prompt for a serialized discussion.
    pub fn prompt(&self, discussion: &str) -> String {
        format!("{}\n\n{}", self.instruction.trim_end(), discussion)
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    #[instrument(skip(self, discussion), fields(model = %self.model, chars = discussion.len()))]
    async fn summarize(&self, discussion: &str) -> Result<String> {
        let url = endpoint(
            &self.base_url,
            &format!("v1beta/models/{}:generateContent", self.model),
        )?;
        let request = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": self.prompt(discussion) }]
            }]
        });

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let body = read_json(response, SERVICE).await?;
        let parsed: GenerateResponse = serde_json::from_value(body)?;

        let text = parsed
            .text()
            .ok_or_else(|| MurmurError::Summarize(parsed.empty_reason()))?;
        debug!("Summary is {} chars", text.len());
        Ok(text)
    }
}
