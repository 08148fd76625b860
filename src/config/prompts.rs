//! Prompt templates for Murmur.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub agent: AgentPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompt for discussion summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    /// Prepended to the serialized discussion.
    pub instruction: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            instruction: "Summarize the following discussion into clear, concise bullet points. \
                Focus on the main topics, key opinions, and important facts:"
                .to_string(),
        }
    }
}

/// Prompts for the tool-calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    pub task: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a research assistant that tracks what people are saying about a topic across channels.

You have tools to fetch recent discussion from Twitter, YouTube and LinkedIn, to summarize a discussion into bullet points, and to save text to a local file.

Guidelines:
- Consult every channel before writing anything
- Summarize the discussions you fetched with 'summarize_discussion'
- Never invent authors, dates or links; only use what the tools returned
- Call 'save_to_local_file' exactly once with the complete report

When the file is saved, reply with a short confirmation that names the file."#
                .to_string(),

            task: r#"What's the latest discussion about {{query}} on all channels?
Save discussions to a local markdown file with a standardized format, named {{filename}}.
Each discussion should contain author, date, bullet point summarization, and a citation link."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// The summary instruction with custom variables applied.
    pub fn summary_instruction(&self) -> String {
        Self::render(&self.summary.instruction, &self.variables)
    }

    /// The agent task for a query and report filename.
    pub fn agent_task(&self, query: &str, filename: &str) -> String {
        let mut vars = std::collections::HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert("filename".to_string(), filename.to_string());
        self.render_with_custom(&self.agent.task, &vars)
    }
}
