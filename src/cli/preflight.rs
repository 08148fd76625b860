//! Pre-flight checks before network operations.
//!
//! Validates that the credentials an operation needs are present before any
//! request goes out, so a run never fails halfway through for a missing key.

use crate::config::{credential, Settings};
use crate::error::Result;
use crate::source::SourceKind;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// The report pipeline needs every source key plus the summarizer key.
    Report(&'a [SourceKind]),
    /// A raw fetch needs only the source key.
    Fetch(SourceKind),
    /// The agent needs the chat key plus everything the report needs.
    Agent(&'a [SourceKind]),
}

/// Environment variables required by an operation, deduplicated, in check order.
pub fn required_credentials<'s>(settings: &'s Settings, operation: Operation<'_>) -> Vec<&'s str> {
    let mut vars: Vec<&str> = Vec::new();
    let mut push = |var: &'s str| {
        if !vars.contains(&var) {
            vars.push(var);
        }
    };

    match operation {
        Operation::Report(kinds) => {
            for kind in kinds {
                push(settings.credential_env(*kind));
            }
            push(settings.summarizer.api_key_env.as_str());
        }
        Operation::Fetch(kind) => push(settings.credential_env(kind)),
        Operation::Agent(kinds) => {
            push(settings.agent.api_key_env.as_str());
            for kind in kinds {
                push(settings.credential_env(*kind));
            }
            push(settings.summarizer.api_key_env.as_str());
        }
    }

    vars
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or the first missing credential.
pub fn check(settings: &Settings, operation: Operation<'_>) -> Result<()> {
    for var in required_credentials(settings, operation) {
        credential(var)?;
    }
    Ok(())
}
