//! Configuration settings for Murmur.

use crate::error::{MurmurError, Result};
use crate::source::SourceKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub twitter: TwitterSettings,
    pub youtube: YoutubeSettings,
    pub linkedin: LinkedinSettings,
    pub summarizer: SummarizerSettings,
    pub report: ReportSettings,
    pub agent: AgentSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Timeout applied to every outbound HTTP request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 300,
        }
    }
}

/// Longest accepted `search.lookback_days`.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

/// Which channels to consult and how far back to look.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Sources consulted by the report pipeline, in order.
    pub sources: Vec<SourceKind>,
    /// Only discussions published within this many days are requested.
    pub lookback_days: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            sources: SourceKind::all().to_vec(),
            lookback_days: 7,
        }
    }
}

/// twitterapi.io advanced search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterSettings {
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Search ranking ("Top" or "Latest").
    pub query_type: String,
    /// Maximum number of result pages to follow.
    pub max_pages: u32,
}

impl Default for TwitterSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitterapi.io".to_string(),
            api_key_env: "TWITTER_IO_API_KEY".to_string(),
            query_type: "Top".to_string(),
            max_pages: 1,
        }
    }
}

/// Apify YouTube scraper actor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    pub base_url: String,
    /// Environment variable holding the Apify API token.
    pub token_env: String,
    /// Actor to run (YouTube scraper).
    pub actor_id: String,
    /// Upload date filter understood by the actor ("hour", "today", "week", "month", "year").
    pub date_filter: String,
    pub max_results: u32,
    pub download_subtitles: bool,
    pub prefer_auto_generated_subtitles: bool,
    pub save_subs_to_kvs: bool,
    pub subtitles_language: String,
    /// Total time to wait for the actor run to finish, in seconds.
    pub max_wait_secs: u64,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.apify.com".to_string(),
            token_env: "APIFY_API_TOKEN".to_string(),
            actor_id: "h7sDV53CddomktSi5".to_string(),
            date_filter: "week".to_string(),
            max_results: 10,
            download_subtitles: true,
            prefer_auto_generated_subtitles: false,
            save_subs_to_kvs: true,
            subtitles_language: "en".to_string(),
            max_wait_secs: 300,
        }
    }
}

/// Exa search-and-contents settings, restricted to a set of domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedinSettings {
    pub base_url: String,
    /// Environment variable holding the Exa API key.
    pub api_key_env: String,
    pub include_domains: Vec<String>,
    pub use_autoprompt: bool,
    pub num_results: u32,
}

impl Default for LinkedinSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.exa.ai".to_string(),
            api_key_env: "EXA_API_KEY".to_string(),
            include_domains: vec!["linkedin.com".to_string()],
            use_autoprompt: true,
            num_results: 10,
        }
    }
}

/// How discussions are grouped before summarization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    /// One summary per source batch.
    #[default]
    Batch,
    /// One summary per discussion.
    PerDiscussion,
}

impl std::str::FromStr for SummaryMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "batch" => Ok(SummaryMode::Batch),
            "per_discussion" | "each" => Ok(SummaryMode::PerDiscussion),
            _ => Err(format!("Unknown summary mode: {}", s)),
        }
    }
}

impl std::fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryMode::Batch => write!(f, "batch"),
            SummaryMode::PerDiscussion => write!(f, "per_discussion"),
        }
    }
}

/// Gemini summarizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    pub base_url: String,
    /// Environment variable holding the Gemini API key.
    pub api_key_env: String,
    pub model: String,
    pub mode: SummaryMode,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-2.0-flash".to_string(),
            mode: SummaryMode::Batch,
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Default report filename when none is given on the command line.
    pub filename: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            filename: "report.md".to_string(),
        }
    }
}

/// Tool-calling agent settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub api_base: String,
    /// Environment variable holding the API key for `api_base`.
    pub api_key_env: String,
    pub model: String,
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-2.0-flash".to_string(),
            max_iterations: 15,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check that every configured endpoint is a usable URL.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("twitter.base_url", &self.twitter.base_url),
            ("youtube.base_url", &self.youtube.base_url),
            ("linkedin.base_url", &self.linkedin.base_url),
            ("summarizer.base_url", &self.summarizer.base_url),
            ("agent.api_base", &self.agent.api_base),
        ] {
            Url::parse(value)
                .map_err(|e| MurmurError::Config(format!("{} ({}): {}", name, value, e)))?;
        }

        if self.search.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(MurmurError::Config(format!(
                "search.lookback_days must be at most {} (got {})",
                MAX_LOOKBACK_DAYS, self.search.lookback_days
            )));
        }

        if self.agent.max_iterations == 0 {
            return Err(MurmurError::Config(
                "agent.max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MurmurError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("murmur")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Resolve the report path: the given filename, or the configured default.
    pub fn report_path(&self, filename: Option<&str>) -> PathBuf {
        Self::expand_path(filename.unwrap_or(&self.report.filename))
    }

    /// Environment variable names of the credentials needed by a source.
    pub fn credential_env(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Twitter => &self.twitter.api_key_env,
            SourceKind::Youtube => &self.youtube.token_env,
            SourceKind::Linkedin => &self.linkedin.api_key_env,
        }
    }
}

/// Read a credential from the environment.
///
/// Unset and empty variables are both reported as missing.
pub fn credential(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MurmurError::MissingCredential(var.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_known_endpoints() {
        let settings = Settings::default();
        assert_eq!(settings.twitter.query_type, "Top");
        assert_eq!(settings.youtube.actor_id, "h7sDV53CddomktSi5");
        assert_eq!(settings.linkedin.include_domains, vec!["linkedin.com"]);
        assert_eq!(settings.summarizer.model, "gemini-2.0-flash");
        assert_eq!(settings.search.sources, SourceKind::all().to_vec());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [search]
            sources = ["youtube"]
            lookback_days = 3

            [summarizer]
            mode = "per_discussion"
            "#,
        )
        .unwrap();

        assert_eq!(settings.search.sources, vec![SourceKind::Youtube]);
        assert_eq!(settings.search.lookback_days, 3);
        assert_eq!(settings.summarizer.mode, SummaryMode::PerDiscussion);
        assert_eq!(settings.summarizer.api_key_env, "GEMINI_API_KEY");
        assert_eq!(settings.report.filename, "report.md");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut settings = Settings::default();
        settings.linkedin.base_url = "not a url".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("linkedin.base_url"));
    }

    #[test]
    fn test_huge_lookback_rejected() {
        let settings: Settings = toml::from_str("[search]\nlookback_days = 100000000\n").unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, MurmurError::Config(ref m) if m.contains("search.lookback_days")));

        let mut settings = Settings::default();
        settings.search.lookback_days = MAX_LOOKBACK_DAYS;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_summary_mode_parse() {
        assert_eq!("batch".parse::<SummaryMode>().unwrap(), SummaryMode::Batch);
        assert_eq!(
            "per-discussion".parse::<SummaryMode>().unwrap(),
            SummaryMode::PerDiscussion
        );
        assert!("weekly".parse::<SummaryMode>().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.report.filename = "cursor.md".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.report.filename, "cursor.md");
    }

    #[test]
    fn test_missing_credential() {
        let err = credential("MURMUR_TEST_SURELY_UNSET_VAR").unwrap_err();
        assert!(matches!(err, MurmurError::MissingCredential(ref v) if v == "MURMUR_TEST_SURELY_UNSET_VAR"));
    }
}
