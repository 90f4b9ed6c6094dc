//! Output formatting for the packager CLI.

use crate::pipeline::RunSummary;
use std::io::Write;

/// Write one progress line, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress reporting.
    }
}

/// Format the completion message printed after a successful run.
#[must_use]
pub fn completion_message(summary: &RunSummary) -> String {
    let plural = if summary.artifact_count == 1 {
        "artifact"
    } else {
        "artifacts"
    };
    format!(
        "Release complete: {} ({} {plural}, sha256 {})",
        summary.archive_path, summary.artifact_count, summary.archive_digest
    )
}
