//! Report rendering and output.

mod markdown;

pub use markdown::{Report, ReportEntry, ReportSection};

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write report content to `filename`, replacing anything already there.
///
/// Parent directories are not created. Returns the path written.
pub fn write_report(content: &str, filename: impl AsRef<Path>) -> Result<PathBuf> {
    let path = filename.as_ref();
    std::fs::write(path, content)?;
    info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(path.to_path_buf())
}
