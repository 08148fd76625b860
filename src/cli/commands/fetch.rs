//! Fetch command - raw records from one source.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::http::create_http_client;
use crate::orchestrator::since_days_ago;
use crate::report::write_report;
use crate::source::{create_source, SourceKind};
use anyhow::Result;
use chrono::NaiveDate;
use std::time::Duration;

/// Run the fetch command.
pub async fn run_fetch(
    kind: SourceKind,
    query: &str,
    since: Option<NaiveDate>,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Query must not be empty");
    }

    if let Err(e) = preflight::check(&settings, Operation::Fetch(kind)) {
        Output::error(&format!("{}", e));
        Output::info("Run 'murmur doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let since = match since {
        Some(date) => date,
        None => since_days_ago(settings.search.lookback_days)?,
    };
    let http = create_http_client(Duration::from_secs(settings.general.request_timeout_secs))?;
    let source = create_source(kind, &settings, http)?;

    let spinner = Output::spinner(&format!("Fetching {}...", kind.label()));
    let result = source.fetch(query, since).await;
    spinner.finish_and_clear();
    let discussions = result?;

    let json = serde_json::to_string_pretty(&discussions)?;
    match output {
        Some(file) => {
            let path = write_report(&json, Settings::expand_path(&file))?;
            Output::success(&format!(
                "Wrote {} {} record(s) to {}",
                discussions.len(),
                kind.label(),
                path.display()
            ));
        }
        None => println!("{}", json),
    }

    Ok(())
}
