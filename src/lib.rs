//! Murmur - what people are saying, across channels
//!
//! Gathers recent discussion about a topic from several channels, summarizes it
//! with a hosted language model and writes a markdown report.
//!
//! # Overview
//!
//! Murmur allows you to:
//! - Search recent tweets (twitterapi.io), YouTube videos (Apify) and LinkedIn posts (Exa)
//! - Summarize each channel's discussion into bullet points with Gemini
//! - Write one report with author, date, summary and citation link per discussion
//! - Hand the same tools to a chat model and let it drive the run (agent mode)
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `source` - Discussion source adapters (Twitter, YouTube, LinkedIn)
//! - `discussion` - Loosely-typed discussion records and citations
//! - `summarize` - Summarizer abstraction and the Gemini adapter
//! - `report` - Markdown rendering and the file writer
//! - `orchestrator` - The sequential report pipeline
//! - `agent` - Tool-calling agent over the same adapters
//!
//! # Example
//!
//! ```rust,no_run
//! use murmur::config::Settings;
//! use murmur::orchestrator::{since_days_ago, Orchestrator};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings, &settings.search.sources)?;
//!
//!     let since = since_days_ago(settings.search.lookback_days)?;
//!     let result = orchestrator.run("cursor", since, Path::new("cursor.md")).await?;
//!     println!("Wrote {} discussions to {}", result.discussions, result.path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod discussion;
pub mod error;
pub mod http;
pub mod openai;
pub mod orchestrator;
pub mod report;
pub mod source;
pub mod summarize;

#[cfg(test)]
mod testing;

pub use error::{MurmurError, Result};
