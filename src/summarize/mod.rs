//! Discussion summarization.

mod gemini;

pub use gemini::GeminiSummarizer;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

/// Trait for turning a serialized discussion into bullet points.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize a serialized discussion; returns the model's text unmodified.
    async fn summarize(&self, discussion: &str) -> Result<String>;
}

/// Serialize a discussion of any shape for a prompt.
///
/// JSON when possible; values serde cannot express as JSON (maps with
/// non-string keys, failing `Serialize` impls) fall back to their debug form.
pub fn render_discussion<T: Serialize + Debug + ?Sized>(discussion: &T) -> String {
    match serde_json::to_string(discussion) {
        Ok(json) => json,
        Err(e) => {
            debug!("Discussion is not JSON-serializable ({}), using debug form", e);
            format!("{:?}", discussion)
        }
    }
}

/// Render and summarize a discussion value.
pub async fn summarize_value<T: Serialize + Debug + Sync + ?Sized>(
    summarizer: &dyn Summarizer,
    discussion: &T,
) -> Result<String> {
    summarizer.summarize(&render_discussion(discussion)).await
}
