//! Error types for the CME release packager.
//!
//! Each variant corresponds to one failure surface of the pipeline, so the
//! binary can report exactly which stage aborted a run. Cleanup failures are
//! deliberately separate: they are logged and never mask the primary error.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during a packaging run.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The version file was not found in the project root.
    #[error("version file not found at {path}")]
    MissingVersionFile {
        /// Path where the file was expected.
        path: Utf8PathBuf,
    },

    /// The version file exists but holds no token after trimming.
    #[error("version file at {path} is empty")]
    EmptyVersionFile {
        /// Path to the empty file.
        path: Utf8PathBuf,
    },

    /// The `packager.toml` override file could not be parsed.
    #[error("invalid packager.toml at {path}: {reason}")]
    InvalidConfig {
        /// Path to the invalid file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// A staging or distribution directory from a previous run is in the way.
    #[error("workspace directory {path} already exists; remove it and re-run")]
    WorkspaceAlreadyExists {
        /// The pre-existing directory.
        path: Utf8PathBuf,
    },

    /// Another run holds the invocation-directory lock.
    #[error("another packaging run is active in {path}")]
    WorkspaceLocked {
        /// Directory whose lock could not be acquired.
        path: Utf8PathBuf,
    },

    /// A required buildable input could not be copied into staging.
    #[error("staging copy failed: {reason}")]
    StagingCopyFailed {
        /// Description of the copy failure.
        reason: String,
    },

    /// The Python interpreter driving the build could not be probed.
    #[error("build toolchain {python} not usable: {reason}")]
    ToolchainNotFound {
        /// Interpreter that failed the probe.
        python: Utf8PathBuf,
        /// Description of the probe failure.
        reason: String,
    },

    /// The package-build invocation failed or produced nothing.
    #[error("package build failed: {reason}")]
    BuildFailed {
        /// Description of the build failure.
        reason: String,
    },

    /// The archive could not be written to the invocation directory.
    #[error("archive write failed: {reason}")]
    ArchiveWriteFailed {
        /// Description of the write failure.
        reason: String,
    },

    /// Workspace teardown left something behind. Logged, non-fatal.
    #[error("cleanup failed for {path}: {reason}")]
    CleanupFailed {
        /// Directory that could not be removed.
        path: Utf8PathBuf,
        /// Description of the removal failure.
        reason: String,
    },

    /// An I/O operation failed outside any more specific stage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
