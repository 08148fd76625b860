//! Tool definitions and implementations for the agent system.

use crate::error::{MurmurError, Result};
use crate::report::write_report;
use crate::source::{DiscussionSource, SourceKind};
use crate::summarize::{summarize_value, Summarizer};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Available tools for the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Fetch discussions from one source.
    Fetch { source: SourceKind, query: String },

    /// Summarize a discussion into bullet points.
    SummarizeDiscussion { discussion: Value },

    /// Write content to a local file.
    SaveToLocalFile { content: String, filename: String },
}

/// Tool name for fetching from a source.
pub fn fetch_tool_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Twitter => "get_latest_tweets_from_twitter",
        SourceKind::Youtube => "get_latest_discussion_from_youtube",
        SourceKind::Linkedin => "get_latest_discussion_from_linkedin",
    }
}

fn fetch_tool_source(name: &str) -> Option<SourceKind> {
    SourceKind::all()
        .iter()
        .copied()
        .find(|k| fetch_tool_name(*k) == name)
}

/// Tool execution context with access to sources, summarizer and the date filter.
pub struct ToolContext {
    sources: HashMap<SourceKind, Arc<dyn DiscussionSource>>,
    summarizer: Arc<dyn Summarizer>,
    since: NaiveDate,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(
        sources: Vec<Arc<dyn DiscussionSource>>,
        summarizer: Arc<dyn Summarizer>,
        since: NaiveDate,
    ) -> Self {
        Self {
            sources: sources.into_iter().map(|s| (s.kind(), s)).collect(),
            summarizer,
            since,
        }
    }

    /// Sources that can be fetched, in canonical order.
    pub fn available_sources(&self) -> Vec<SourceKind> {
        SourceKind::all()
            .iter()
            .copied()
            .filter(|k| self.sources.contains_key(k))
            .collect()
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::Fetch { source, query } => self.execute_fetch(*source, query).await,
            ToolCall::SummarizeDiscussion { discussion } => {
                self.execute_summarize(discussion).await
            }
            ToolCall::SaveToLocalFile { content, filename } => {
                let path = write_report(content, Path::new(filename))?;
                Ok(path.display().to_string())
            }
        }
    }

    async fn execute_fetch(&self, kind: SourceKind, query: &str) -> Result<String> {
        let source = self.sources.get(&kind).ok_or_else(|| {
            MurmurError::Agent(format!("Source '{}' is not enabled", kind))
        })?;

        let discussions = source.fetch(query, self.since).await?;
        Ok(serde_json::to_string(&discussions)?)
    }

    async fn execute_summarize(&self, discussion: &Value) -> Result<String> {
        // Models often pass the fetched JSON back as a string; send it as-is.
        match discussion {
            Value::String(text) => self.summarizer.summarize(text).await,
            other => summarize_value(self.summarizer.as_ref(), other).await,
        }
    }
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions(sources: &[SourceKind]) -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    let mut tools: Vec<ChatCompletionTool> = sources
        .iter()
        .map(|kind| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: fetch_tool_name(*kind).to_string(),
                description: Some(format!(
                    "Get the latest discussion from {}. \
                    Returns a JSON list of discussion records (author, date, text, link and \
                    other source-specific fields).",
                    kind.label()
                )),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The query to search for"
                        }
                    },
                    "required": ["query"]
                })),
                strict: None,
            },
        })
        .collect();

    tools.push(ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: "summarize_discussion".to_string(),
            description: Some(
                "Summarize a discussion into bullet points. \
                Returns the summarized discussion in bullet point format."
                    .to_string(),
            ),
            parameters: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "discussion": {
                        "type": "string",
                        "description": "The discussion to summarize, as text: pass the JSON returned by a get_latest_* tool unchanged"
                    }
                },
                "required": ["discussion"]
            })),
            strict: None,
        },
    });

    tools.push(ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: "save_to_local_file".to_string(),
            description: Some(
                "Save the content to a local file, replacing any existing content. \
                Returns the path to the saved file."
                    .to_string(),
            ),
            parameters: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "The content to save"
                    },
                    "filename": {
                        "type": "string",
                        "description": "The filename to save the content to"
                    }
                },
                "required": ["content", "filename"]
            })),
            strict: None,
        },
    });

    tools
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: Value = serde_json::from_str(arguments)
        .map_err(|e| MurmurError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let string_arg = |key: &str| -> Result<String> {
        args[key]
            .as_str()
            .map(String::from)
            .ok_or_else(|| MurmurError::Agent(format!("Missing '{}' argument", key)))
    };

    if let Some(source) = fetch_tool_source(name) {
        return Ok(ToolCall::Fetch {
            source,
            query: string_arg("query")?,
        });
    }

    match name {
        "summarize_discussion" => match args.get("discussion") {
            Some(discussion) if !discussion.is_null() => Ok(ToolCall::SummarizeDiscussion {
                discussion: discussion.clone(),
            }),
            _ => Err(MurmurError::Agent("Missing 'discussion' argument".to_string())),
        },
        "save_to_local_file" => Ok(ToolCall::SaveToLocalFile {
            content: string_arg("content")?,
            filename: string_arg("filename")?,
        }),
        _ => Err(MurmurError::Agent(format!("Unknown tool: {}", name))),
    }
}
