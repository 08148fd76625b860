//! Report pipeline for Murmur.
//!
//! Gathers discussions from each source in turn, summarizes them and writes
//! one markdown report. Sources are consulted sequentially and any adapter
//! failure aborts the run before anything is written.

use crate::config::{Prompts, Settings, SummaryMode};
use crate::error::{MurmurError, Result};
use crate::http::create_http_client;
use crate::report::{write_report, Report, ReportEntry, ReportSection};
use crate::source::{create_sources, DiscussionSource, SourceBatch, SourceKind};
use crate::summarize::{render_discussion, GeminiSummarizer, Summarizer};
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Date `lookback_days` before today (UTC).
pub fn since_days_ago(lookback_days: u32) -> Result<NaiveDate> {
    Utc::now()
        .date_naive()
        .checked_sub_signed(chrono::Duration::days(i64::from(lookback_days)))
        .ok_or_else(|| {
            MurmurError::Config(format!(
                "search.lookback_days = {} reaches past the supported date range",
                lookback_days
            ))
        })
}

/// The report pipeline.
pub struct Orchestrator {
    sources: Vec<Arc<dyn DiscussionSource>>,
    summarizer: Arc<dyn Summarizer>,
    mode: SummaryMode,
}

impl Orchestrator {
    /// Create an orchestrator for the given sources from settings and environment credentials.
    pub fn new(settings: &Settings, kinds: &[SourceKind]) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let http = create_http_client(Duration::from_secs(settings.general.request_timeout_secs))?;
        let sources = create_sources(kinds, settings, http.clone())?;
        let summarizer: Arc<dyn Summarizer> = Arc::new(GeminiSummarizer::from_settings(
            &settings.summarizer,
            &prompts,
            http,
        )?);

        info!(
            "Using {} source(s), summarizing with {} ({} mode)",
            sources.len(),
            settings.summarizer.model,
            settings.summarizer.mode
        );

        Ok(Self::with_components(sources, summarizer, settings.summarizer.mode))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        sources: Vec<Arc<dyn DiscussionSource>>,
        summarizer: Arc<dyn Summarizer>,
        mode: SummaryMode,
    ) -> Self {
        Self {
            sources,
            summarizer,
            mode,
        }
    }

    /// Override the summary mode.
    pub fn with_mode(mut self, mode: SummaryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sources consulted, in order.
    pub fn source_kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// Fetch discussions from every source, one at a time.
    #[instrument(skip(self))]
    pub async fn gather(&self, query: &str, since: NaiveDate) -> Result<Vec<SourceBatch>> {
        if query.trim().is_empty() {
            return Err(MurmurError::InvalidInput("Query must not be empty".to_string()));
        }

        let mut batches = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let kind = source.kind();
            eprintln!("  Fetching {}...", kind.label());
            let discussions = source.fetch(query, since).await?;
            eprintln!("  {}: {} discussion(s)", kind.label(), discussions.len());
            batches.push(SourceBatch { kind, discussions });
        }

        Ok(batches)
    }

    /// Summarize gathered batches into a report.
    #[instrument(skip(self, batches), fields(batches = batches.len()))]
    pub async fn summarize(
        &self,
        query: &str,
        since: NaiveDate,
        batches: Vec<SourceBatch>,
    ) -> Result<Report> {
        let mut report = Report::new(query, since);

        for batch in batches {
            if batch.discussions.is_empty() {
                report.sections.push(ReportSection {
                    kind: batch.kind,
                    summary: None,
                    entries: Vec::new(),
                });
                continue;
            }

            eprintln!("  Summarizing {}...", batch.kind.label());
            let section = match self.mode {
                SummaryMode::Batch => {
                    let summary = self
                        .summarizer
                        .summarize(&render_discussion(&batch.discussions))
                        .await?;
                    ReportSection {
                        kind: batch.kind,
                        summary: Some(summary),
                        entries: batch
                            .discussions
                            .iter()
                            .map(|d| ReportEntry {
                                citation: d.citation(),
                                summary: None,
                            })
                            .collect(),
                    }
                }
                SummaryMode::PerDiscussion => {
                    let mut entries = Vec::with_capacity(batch.discussions.len());
                    for discussion in &batch.discussions {
                        let summary = self
                            .summarizer
                            .summarize(&render_discussion(discussion))
                            .await?;
                        entries.push(ReportEntry {
                            citation: discussion.citation(),
                            summary: Some(summary),
                        });
                    }
                    ReportSection {
                        kind: batch.kind,
                        summary: None,
                        entries,
                    }
                }
            };
            report.sections.push(section);
        }

        Ok(report)
    }

    /// Gather, summarize and write the report to `output`.
    #[instrument(skip(self), fields(output = %output.display()))]
    pub async fn run(&self, query: &str, since: NaiveDate, output: &Path) -> Result<RunResult> {
        let batches = self.gather(query, since).await?;
        let report = self.summarize(query, since, batches).await?;

        let path = write_report(&report.to_markdown(), output)?;

        Ok(RunResult {
            path,
            sources: report.sections.len(),
            discussions: report.discussion_count(),
            summaries: report
                .sections
                .iter()
                .map(|s| {
                    usize::from(s.summary.is_some())
                        + s.entries.iter().filter(|e| e.summary.is_some()).count()
                })
                .sum(),
        })
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct RunResult {
    /// Where the report was written.
    pub path: PathBuf,
    /// Number of sources consulted.
    pub sources: usize,
    /// Number of discussions in the report.
    pub discussions: usize,
    /// Number of summaries generated.
    pub summaries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::Discussion;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubSource {
        kind: SourceKind,
        records: Vec<Discussion>,
        fail: bool,
    }

    impl StubSource {
        fn with(kind: SourceKind, count: usize) -> Arc<dyn DiscussionSource> {
            let records = (0..count)
                .map(|i| {
                    Discussion::from_value(json!({
                        "author": format!("{}-author-{}", kind, i),
                        "date": "2025-03-14",
                        "title": format!("{} post {}", kind, i),
                        "url": format!("https://{}.example/{}", kind, i)
                    }))
                    .unwrap()
                })
                .collect();
            Arc::new(Self {
                kind,
                records,
                fail: false,
            })
        }

        fn failing(kind: SourceKind) -> Arc<dyn DiscussionSource> {
            Arc::new(Self {
                kind,
                records: Vec::new(),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl DiscussionSource for StubSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn fetch(&self, _query: &str, _since: NaiveDate) -> Result<Vec<Discussion>> {
            if self.fail {
                return Err(MurmurError::upstream("stub", "HTTP 500"));
            }
            Ok(self.records.clone())
        }
    }

    #[derive(Default)]
    struct CountingSummarizer {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Summarizer for CountingSummarizer {
        async fn summarize(&self, discussion: &str) -> Result<String> {
            self.calls.lock().unwrap().push(discussion.to_string());
            Ok("- a key point".to_string())
        }
    }

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    fn all_sources(count: usize) -> Vec<Arc<dyn DiscussionSource>> {
        SourceKind::all()
            .iter()
            .map(|k| StubSource::with(*k, count))
            .collect()
    }

    #[tokio::test]
    async fn test_run_batch_mode_writes_every_section() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cursor.md");
        let summarizer = Arc::new(CountingSummarizer::default());
        let orchestrator =
            Orchestrator::with_components(all_sources(1), summarizer.clone(), SummaryMode::Batch);

        let result = orchestrator.run("cursor", since(), &output).await.unwrap();

        assert_eq!(result.path, output);
        assert_eq!(result.sources, 3);
        assert_eq!(result.discussions, 3);
        assert_eq!(result.summaries, 3);

        let calls = summarizer.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with('['));
        assert!(calls[0].contains("twitter-author-0"));

        let md = std::fs::read_to_string(&output).unwrap();
        let twitter = md.find("## Twitter").unwrap();
        let youtube = md.find("## YouTube").unwrap();
        let linkedin = md.find("## LinkedIn").unwrap();
        assert!(twitter < youtube && youtube < linkedin);
        assert!(md.contains("[youtube post 0](https://youtube.example/0)"));
    }

    #[tokio::test]
    async fn test_per_discussion_mode_summarizes_each_record() {
        let summarizer = Arc::new(CountingSummarizer::default());
        let orchestrator = Orchestrator::with_components(
            vec![StubSource::with(SourceKind::Twitter, 2)],
            summarizer.clone(),
            SummaryMode::Batch,
        )
        .with_mode(SummaryMode::PerDiscussion);

        let batches = orchestrator.gather("cursor", since()).await.unwrap();
        let report = orchestrator.summarize("cursor", since(), batches).await.unwrap();

        let calls = summarizer.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].starts_with('{'));
        assert!(report.sections[0].summary.is_none());
        assert!(report.sections[0]
            .entries
            .iter()
            .all(|e| e.summary.as_deref() == Some("- a key point")));
    }

    #[tokio::test]
    async fn test_empty_source_skips_summarizer() {
        let summarizer = Arc::new(CountingSummarizer::default());
        let orchestrator = Orchestrator::with_components(
            vec![
                StubSource::with(SourceKind::Twitter, 0),
                StubSource::with(SourceKind::Linkedin, 1),
            ],
            summarizer.clone(),
            SummaryMode::Batch,
        );

        let batches = orchestrator.gather("cursor", since()).await.unwrap();
        let report = orchestrator.summarize("cursor", since(), batches).await.unwrap();

        assert_eq!(summarizer.calls.lock().unwrap().len(), 1);
        assert!(report.to_markdown().contains("## Twitter\n\n_No discussions found._"));
    }

    #[tokio::test]
    async fn test_failing_source_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.md");
        let summarizer = Arc::new(CountingSummarizer::default());
        let orchestrator = Orchestrator::with_components(
            vec![
                StubSource::with(SourceKind::Twitter, 1),
                StubSource::failing(SourceKind::Youtube),
            ],
            summarizer.clone(),
            SummaryMode::Batch,
        );

        let err = orchestrator.run("cursor", since(), &output).await.unwrap_err();

        assert!(matches!(err, MurmurError::Upstream { .. }));
        assert!(!output.exists());
        assert!(summarizer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let orchestrator = Orchestrator::with_components(
            all_sources(1),
            Arc::new(CountingSummarizer::default()),
            SummaryMode::Batch,
        );
        let err = orchestrator.gather("  ", since()).await.unwrap_err();
        assert!(matches!(err, MurmurError::InvalidInput(_)));
    }

    #[test]
    fn test_since_days_ago() {
        let today = Utc::now().date_naive();
        assert_eq!(since_days_ago(0).unwrap(), today);
        assert_eq!((today - since_days_ago(7).unwrap()).num_days(), 7);
    }

    #[test]
    fn test_since_days_ago_out_of_range() {
        let err = since_days_ago(u32::MAX).unwrap_err();
        assert!(matches!(err, MurmurError::Config(_)));
    }

    #[test]
    fn test_source_kinds_in_order() {
        let orchestrator = Orchestrator::with_components(
            all_sources(0),
            Arc::new(CountingSummarizer::default()),
            SummaryMode::Batch,
        );
        assert_eq!(orchestrator.source_kinds(), SourceKind::all().to_vec());
    }
}
