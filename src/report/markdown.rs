//! Markdown rendering of a gathered and summarized report.

use crate::discussion::Citation;
use crate::source::SourceKind;
use chrono::{DateTime, NaiveDate, Utc};

const UNKNOWN: &str = "unknown";

/// A summarized discussion and where it came from.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub citation: Citation,
    /// Per-discussion summary, when discussions are summarized one by one.
    pub summary: Option<String>,
}

/// Everything gathered from one source.
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub kind: SourceKind,
    /// Batch summary, when the source's discussions are summarized together.
    pub summary: Option<String>,
    pub entries: Vec<ReportEntry>,
}

/// A complete report for one query.
#[derive(Debug, Clone)]
pub struct Report {
    pub query: String,
    pub since: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(query: &str, since: NaiveDate) -> Self {
        Self {
            query: query.to_string(),
            since,
            generated_at: Utc::now(),
            sections: Vec::new(),
        }
    }

    /// Total discussions across all sections.
    pub fn discussion_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Render as markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# Latest discussion: {}\n\n", self.query);

        let channels = self
            .sections
            .iter()
            .map(|s| s.kind.label())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "_Generated {} from {}. Discussions since {}._\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC"),
            if channels.is_empty() { "no channels" } else { channels.as_str() },
            self.since.format("%Y-%m-%d"),
        ));

        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n", section.kind.label()));
            render_section(section, &mut out);
        }

        out
    }
}

fn render_section(section: &ReportSection, out: &mut String) {
    if section.entries.is_empty() {
        out.push_str("_No discussions found._\n");
        return;
    }

    if let Some(summary) = &section.summary {
        out.push_str("### Summary\n\n");
        out.push_str(summary.trim());
        out.push_str("\n\n### Discussions\n\n");
        for (i, entry) in section.entries.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, citation_line(&entry.citation)));
        }
        return;
    }

    for (i, entry) in section.entries.iter().enumerate() {
        let c = &entry.citation;
        out.push_str(&format!(
            "### {}. {}\n\n",
            i + 1,
            c.title.as_deref().unwrap_or("Untitled discussion")
        ));
        out.push_str(&format!("- **Author:** {}\n", c.author.as_deref().unwrap_or(UNKNOWN)));
        out.push_str(&format!("- **Date:** {}\n", c.date.as_deref().unwrap_or(UNKNOWN)));
        out.push_str(&format!("- **Link:** {}\n\n", c.url.as_deref().unwrap_or(UNKNOWN)));
        if let Some(summary) = &entry.summary {
            out.push_str(summary.trim());
            out.push_str("\n\n");
        }
    }
}

/// `**author** · date · [title](url)`
fn citation_line(c: &Citation) -> String {
    let title = c.title.as_deref().unwrap_or("link");
    let link = match &c.url {
        Some(url) => format!("[{}]({})", escape_link_text(title), url),
        None => title.to_string(),
    };
    format!(
        "**{}** · {} · {}",
        c.author.as_deref().unwrap_or(UNKNOWN),
        c.date.as_deref().unwrap_or(UNKNOWN),
        link
    )
}

/// Backslash-escape brackets so upstream titles cannot end the link text early.
fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
