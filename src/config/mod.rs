//! Configuration module for Murmur.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts, SummaryPrompts};
pub use settings::{
    credential, AgentSettings, GeneralSettings, LinkedinSettings, PromptSettings,
    ReportSettings, SearchSettings, Settings, SummarizerSettings, SummaryMode,
    TwitterSettings, YoutubeSettings,
};
