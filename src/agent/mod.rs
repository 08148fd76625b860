//! Tool-calling agent mode.
//!
//! Instead of the fixed pipeline, a chat model decides which channels to
//! query, what to summarize and when to save the report, using the same
//! source adapters, summarizer and report writer as tools.

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{fetch_tool_name, parse_tool_call, tool_definitions, ToolCall, ToolContext};
