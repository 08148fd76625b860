//! Agent command implementation.

use crate::agent::{Agent, ToolContext};
use crate::cli::output::truncate;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::http::create_http_client;
use crate::openai::create_client;
use crate::orchestrator::since_days_ago;
use crate::source::{create_sources, dedup_kinds};
use crate::summarize::{GeminiSummarizer, Summarizer};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

/// Run the agent command.
pub async fn run_agent(
    query: &str,
    output: Option<String>,
    since: Option<NaiveDate>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Query must not be empty");
    }

    let kinds = dedup_kinds(&settings.search.sources);
    if let Err(e) = preflight::check(&settings, Operation::Agent(&kinds)) {
        Output::error(&format!("{}", e));
        Output::info("Run 'murmur doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let timeout = Duration::from_secs(settings.general.request_timeout_secs);
    let http = create_http_client(timeout)?;

    let since = match since {
        Some(date) => date,
        None => since_days_ago(settings.search.lookback_days)?,
    };
    let filename = settings.report_path(output.as_deref());
    let model = model.unwrap_or_else(|| settings.agent.model.clone());

    let summarizer: Arc<dyn Summarizer> = Arc::new(GeminiSummarizer::from_settings(
        &settings.summarizer,
        &prompts,
        http.clone(),
    )?);
    let tool_context = ToolContext::new(create_sources(&kinds, &settings, http)?, summarizer, since);

    let agent = Agent::new(create_client(&settings.agent, timeout)?, tool_context, &model)
        .with_system_prompt(&prompts.agent.system)
        .with_max_iterations(settings.agent.max_iterations);

    let task = prompts.agent_task(query, &filename.display().to_string());

    let spinner = Output::spinner("Agent working...");
    let result = agent.run(&task).await;
    spinner.finish_and_clear();

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    };

    if !response.content.trim().is_empty() {
        println!("\n{}\n", response.content.trim());
    }

    if !response.tool_calls.is_empty() {
        Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
        for call in &response.tool_calls {
            let line = format!("{} {}", call.name, truncate(&call.arguments, 60));
            if call.failed {
                Output::list_item(&format!("{} (failed: {})", line, truncate(&call.result, 80)));
            } else {
                Output::list_item(&line);
            }
        }
        println!();
    }

    match response.saved_files().last() {
        Some(path) => Output::success(&format!(
            "Report written to {} in {} iteration(s)",
            path, response.iterations
        )),
        None => Output::warning(&format!(
            "Agent finished in {} iteration(s) without saving a report",
            response.iterations
        )),
    }

    Ok(())
}
