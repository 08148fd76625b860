//! CLI module for Murmur.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::source::SourceKind;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Murmur - what people are saying, across channels
///
/// Gathers recent discussion about a topic from Twitter, YouTube and LinkedIn,
/// summarizes it with Gemini and writes a markdown report.
#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Gather, summarize and write a report for a query
    Report {
        /// Topic to search for
        query: String,

        /// Report file (default from config, report.md)
        #[arg(short, long)]
        output: Option<String>,

        /// Only include discussions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Comma-separated sources to consult (twitter,youtube,linkedin)
        #[arg(short, long, value_delimiter = ',')]
        sources: Vec<SourceKind>,

        /// Summarize each discussion separately instead of one summary per source
        #[arg(long)]
        per_discussion: bool,
    },

    /// Fetch raw discussion records from one source
    Fetch {
        /// Source to query (twitter, youtube, linkedin)
        source: SourceKind,

        /// Topic to search for
        query: String,

        /// Only include discussions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Write JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Let a tool-calling model gather discussion and write the report
    Agent {
        /// Topic to search for
        query: String,

        /// Report file the agent is asked to write
        #[arg(short, long)]
        output: Option<String>,

        /// Only include discussions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Check credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_args() {
        let cli = Cli::try_parse_from([
            "murmur",
            "-vv",
            "report",
            "cursor",
            "-s",
            "twitter,linkedin",
            "--since",
            "2025-03-12",
            "--per-discussion",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Report {
                query,
                output,
                since,
                sources,
                per_discussion,
            } => {
                assert_eq!(query, "cursor");
                assert_eq!(output, None);
                assert_eq!(since, NaiveDate::from_ymd_opt(2025, 3, 12));
                assert_eq!(sources, vec![SourceKind::Twitter, SourceKind::Linkedin]);
                assert!(per_discussion);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_rejects_unknown_source() {
        assert!(Cli::try_parse_from(["murmur", "fetch", "reddit", "cursor"]).is_err());
        assert!(Cli::try_parse_from(["murmur", "fetch", "yt", "cursor"]).is_ok());
    }

    #[test]
    fn test_bad_since_is_rejected() {
        assert!(Cli::try_parse_from(["murmur", "report", "cursor", "--since", "last week"]).is_err());
    }
}
