//! Discussion records and their citations.
//!
//! A discussion is whatever JSON object an upstream API returned for one
//! post, video or article. Nothing about its shape is enforced; citations
//! are recovered by probing the field names each source is known to use.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Field paths probed for the author, in priority order.
const AUTHOR_FIELDS: &[&str] = &[
    "author.userName",
    "author.name",
    "author",
    "channelName",
    "channel",
];

/// Field paths probed for the publication date.
const DATE_FIELDS: &[&str] = &["createdAt", "published_date", "publishedDate", "date", "uploadDate"];

/// Field paths probed for the citation link.
const URL_FIELDS: &[&str] = &["url", "twitterUrl", "link"];

/// Longest title derived from a discussion's text.
const TITLE_FROM_TEXT_CHARS: usize = 80;

/// One fetched post, video or article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discussion(Map<String, Value>);

impl Discussion {
    /// Wrap a JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Accept a JSON value if it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Raw fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Look up a dotted path (`author.userName`) to a non-empty string or number.
    pub fn lookup(&self, path: &str) -> Option<String> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }

        match current {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn first_of(&self, paths: &[&str]) -> Option<String> {
        paths.iter().find_map(|p| self.lookup(p))
    }

    /// Project the record onto author, date, title and link.
    pub fn citation(&self) -> Citation {
        let title = self.lookup("title").or_else(|| {
            self.lookup("text").map(|text| {
                let line = text.lines().next().unwrap_or_default();
                if line.chars().count() > TITLE_FROM_TEXT_CHARS {
                    let cut: String = line.chars().take(TITLE_FROM_TEXT_CHARS).collect();
                    format!("{}...", cut.trim_end())
                } else {
                    line.to_string()
                }
            })
        });

        Citation {
            author: self.first_of(AUTHOR_FIELDS),
            date: self.first_of(DATE_FIELDS),
            title,
            url: self.first_of(URL_FIELDS),
        }
    }
}

impl From<Map<String, Value>> for Discussion {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Keep the object elements of an upstream list, skipping anything else.
pub fn into_discussions(values: Vec<Value>, service: &str) -> Vec<Discussion> {
    let total = values.len();
    let discussions: Vec<Discussion> = values.into_iter().filter_map(Discussion::from_value).collect();

    if discussions.len() < total {
        warn!(
            "{}: skipped {} non-object record(s)",
            service,
            total - discussions.len()
        );
    }

    discussions
}

/// Best-effort provenance of a discussion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub author: Option<String>,
    pub date: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn discussion(value: Value) -> Discussion {
        Discussion::from_value(value).unwrap()
    }

    #[test]
    fn test_tweet_citation() {
        let tweet = discussion(json!({
            "id": "1899",
            "url": "https://x.com/dev/status/1899",
            "text": "Cursor's new agent mode is wild\nsecond line",
            "createdAt": "Tue Mar 18 10:00:00 +0000 2025",
            "author": { "userName": "dev", "name": "A Dev" }
        }));

        let citation = tweet.citation();
        assert_eq!(citation.author.as_deref(), Some("dev"));
        assert_eq!(citation.date.as_deref(), Some("Tue Mar 18 10:00:00 +0000 2025"));
        assert_eq!(citation.title.as_deref(), Some("Cursor's new agent mode is wild"));
        assert_eq!(citation.url.as_deref(), Some("https://x.com/dev/status/1899"));
    }

    #[test]
    fn test_video_citation() {
        let video = discussion(json!({
            "title": "Cursor vs Copilot",
            "channelName": "Fireship",
            "date": "2025-03-14T16:00:00.000Z",
            "url": "https://www.youtube.com/watch?v=abc"
        }));

        let citation = video.citation();
        assert_eq!(citation.author.as_deref(), Some("Fireship"));
        assert_eq!(citation.title.as_deref(), Some("Cursor vs Copilot"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let citation = discussion(json!({ "author": null, "text": "   " })).citation();
        assert_eq!(citation, Citation::default());
    }

    #[test]
    fn test_long_text_title_truncated() {
        let text = "word ".repeat(40);
        let citation = discussion(json!({ "text": text })).citation();
        let title = citation.title.unwrap();
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= TITLE_FROM_TEXT_CHARS + 3);
    }

    #[test]
    fn test_into_discussions_skips_non_objects() {
        let values = vec![json!({"a": 1}), json!("stray"), json!(3), json!({"b": 2})];
        let discussions = into_discussions(values, "test");
        assert_eq!(discussions.len(), 2);
        assert_eq!(discussions[1].lookup("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let d = discussion(json!({"author": "x"}));
        assert_eq!(serde_json::to_string(&d).unwrap(), r#"{"author":"x"}"#);
    }
}
