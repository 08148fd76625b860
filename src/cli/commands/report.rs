//! Report command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Settings, SummaryMode};
use crate::orchestrator::{since_days_ago, Orchestrator};
use crate::source::{dedup_kinds, SourceKind};
use anyhow::Result;
use chrono::NaiveDate;

/// Run the report pipeline.
pub async fn run_report(
    query: &str,
    output: Option<String>,
    since: Option<NaiveDate>,
    sources: Vec<SourceKind>,
    per_discussion: bool,
    settings: Settings,
) -> Result<()> {
    let kinds = resolve_sources(&sources, &settings.search.sources);
    if kinds.is_empty() {
        anyhow::bail!("No sources enabled. Pass --sources or set search.sources in the config.");
    }

    if let Err(e) = preflight::check(&settings, Operation::Report(&kinds)) {
        Output::error(&format!("{}", e));
        Output::info("Run 'murmur doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let since = match since {
        Some(date) => date,
        None => since_days_ago(settings.search.lookback_days)?,
    };
    let path = settings.report_path(output.as_deref());

    let mut orchestrator = Orchestrator::new(&settings, &kinds)?;
    if per_discussion {
        orchestrator = orchestrator.with_mode(SummaryMode::PerDiscussion);
    }

    let labels: Vec<&str> = kinds.iter().map(|k| k.label()).collect();
    Output::info(&format!(
        "Gathering discussion about '{}' since {} from {}",
        query,
        since,
        labels.join(", ")
    ));

    let result = orchestrator.run(query, since, &path).await?;

    Output::success(&format!(
        "Report written to {} ({} discussion(s), {} summary call(s))",
        result.path.display(),
        result.discussions,
        result.summaries
    ));

    Ok(())
}

/// Sources named on the command line, else the configured ones, without repeats.
fn resolve_sources(requested: &[SourceKind], configured: &[SourceKind]) -> Vec<SourceKind> {
    if requested.is_empty() {
        dedup_kinds(configured)
    } else {
        dedup_kinds(requested)
    }
}
