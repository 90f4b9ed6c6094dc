//! Package-builder invocation.
//!
//! The build tool is consumed as a black box: `pip wheel` is run against the
//! staging directory with its artifact cache and discovery path redirected
//! into the run's cache subdirectory. The redirection travels as environment
//! variables on the child process only; the packager's own environment is
//! never mutated, so nothing can leak between sequential runs.

use crate::command::{CommandRunner, CommandSpec};
use crate::error::{PackagerError, Result};
use crate::toolchain::Toolchain;
use camino::Utf8PathBuf;
use std::time::Duration;

/// Environment variables that redirect pip's cache and discovery path.
pub const BUILDER_ENV_VARS: &[&str] = &["PIP_CACHE_DIR", "PIP_WHEEL_DIR", "PIP_FIND_LINKS"];

/// File suffix of the artifacts the builder is expected to produce.
const ARTIFACT_SUFFIX: &str = ".whl";

/// Configuration for one build invocation.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Interpreter driving the build.
    pub toolchain: Toolchain,
    /// Directory holding the staged sources; the build's working directory.
    pub staging_dir: Utf8PathBuf,
    /// Artifact cache subdirectory all outputs are redirected into.
    pub cache_dir: Utf8PathBuf,
    /// Upper bound on the invocation.
    pub timeout: Duration,
    /// Build-tool output verbosity (repeatable `-v`).
    pub verbosity: u8,
}

/// Result of a successful build invocation.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Artifact files found in the cache subdirectory, in directory order.
    pub artifacts: Vec<Utf8PathBuf>,
}

/// Runs the package build against a staged source tree.
pub struct Builder {
    config: BuildConfig,
}

impl Builder {
    /// Create a builder with the given configuration.
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Invoke `pip wheel` and verify that artifacts were produced.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::BuildFailed`] if the invocation cannot be
    /// spawned, times out, exits non-zero, or leaves the cache subdirectory
    /// without a single artifact.
    pub fn build(&self, runner: &dyn CommandRunner) -> Result<BuildOutcome> {
        let spec = self.command_spec();

        let output = runner.run(&spec).map_err(|e| PackagerError::BuildFailed {
            reason: format!("failed to invoke {}: {e}", spec.program),
        })?;

        if !output.status.success() {
            return Err(PackagerError::BuildFailed {
                reason: stderr_message(&output.stderr),
            });
        }

        let artifacts = self.collect_artifacts()?;
        if artifacts.is_empty() {
            return Err(PackagerError::BuildFailed {
                reason: format!("no artifacts produced in {}", self.config.cache_dir),
            });
        }

        Ok(BuildOutcome { artifacts })
    }

    fn command_spec(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(
            self.config.toolchain.python().as_str(),
            &["-m", "pip", "wheel", "."],
        );
        for _ in 0..self.config.verbosity {
            spec.args.push("-v".to_owned());
        }
        spec.current_dir = Some(self.config.staging_dir.clone());
        spec.env = BUILDER_ENV_VARS
            .iter()
            .map(|&var| (var.to_owned(), self.config.cache_dir.to_string()))
            .collect();
        spec.timeout = Some(self.config.timeout);
        spec
    }

    fn collect_artifacts(&self) -> Result<Vec<Utf8PathBuf>> {
        let mut artifacts = Vec::new();

        for entry in self.config.cache_dir.read_dir_utf8()? {
            let entry = entry?;
            if entry.file_type()?.is_file() && entry.file_name().ends_with(ARTIFACT_SUFFIX) {
                artifacts.push(entry.path().to_owned());
            }
        }

        Ok(artifacts)
    }
}

fn stderr_message(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "build tool exited unsuccessfully".to_owned()
    } else {
        trimmed.to_owned()
    }
}
