//! Discussion sources.
//!
//! Each source wraps one external API behind the same shape: a free-text
//! query and a date filter in, a list of discussion records out.

mod linkedin;
mod twitter;
mod youtube;

pub use linkedin::LinkedinSource;
pub use twitter::TwitterSource;
pub use youtube::YoutubeSource;

use crate::config::Settings;
use crate::discussion::Discussion;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Channel a discussion comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Twitter,
    Youtube,
    Linkedin,
}

impl SourceKind {
    /// Every known source, in default pipeline order.
    pub fn all() -> &'static [SourceKind] {
        &[SourceKind::Twitter, SourceKind::Youtube, SourceKind::Linkedin]
    }

    /// Human-readable name used as a report heading.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Twitter => "Twitter",
            SourceKind::Youtube => "YouTube",
            SourceKind::Linkedin => "LinkedIn",
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" => Ok(SourceKind::Twitter),
            "youtube" | "yt" => Ok(SourceKind::Youtube),
            "linkedin" => Ok(SourceKind::Linkedin),
            _ => Err(format!(
                "Unknown source: {} (expected twitter, youtube or linkedin)",
                s
            )),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Twitter => write!(f, "twitter"),
            SourceKind::Youtube => write!(f, "youtube"),
            SourceKind::Linkedin => write!(f, "linkedin"),
        }
    }
}

/// Trait for discussion source adapters.
#[async_trait]
pub trait DiscussionSource: Send + Sync {
    /// The channel this source reads.
    fn kind(&self) -> SourceKind;

    /// Fetch discussions matching `query` published on or after `since`.
    ///
    /// Transport and deserialization failures are returned as errors;
    /// an empty list means the upstream found nothing.
    async fn fetch(&self, query: &str, since: NaiveDate) -> Result<Vec<Discussion>>;
}

/// Discussions returned by one source.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub kind: SourceKind,
    pub discussions: Vec<Discussion>,
}

/// Build the adapter for one source from settings and environment credentials.
pub fn create_source(
    kind: SourceKind,
    settings: &Settings,
    http: reqwest::Client,
) -> Result<Arc<dyn DiscussionSource>> {
    let source: Arc<dyn DiscussionSource> = match kind {
        SourceKind::Twitter => Arc::new(TwitterSource::from_settings(&settings.twitter, http)?),
        SourceKind::Youtube => Arc::new(YoutubeSource::from_settings(&settings.youtube, http)?),
        SourceKind::Linkedin => {
            Arc::new(LinkedinSource::from_settings(&settings.linkedin, http)?)
        }
    };
    Ok(source)
}

/// Drop repeated kinds, keeping the first occurrence of each.
pub fn dedup_kinds(kinds: &[SourceKind]) -> Vec<SourceKind> {
    let mut unique = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !unique.contains(kind) {
            unique.push(*kind);
        }
    }
    unique
}

/// Build adapters for several sources, preserving order and dropping duplicates.
pub fn create_sources(
    kinds: &[SourceKind],
    settings: &Settings,
    http: reqwest::Client,
) -> Result<Vec<Arc<dyn DiscussionSource>>> {
    dedup_kinds(kinds)
        .into_iter()
        .map(|kind| create_source(kind, settings, http.clone()))
        .collect()
}
