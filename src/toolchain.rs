//! Build-toolchain selection for the packager.
//!
//! The package builder is driven by a Python interpreter. Selection replaces
//! the historical "activate the virtual environment" step: the project's
//! virtual-environment interpreter is used when present, otherwise the
//! system `python3`, and either can be overridden explicitly. The chosen
//! interpreter is always invoked by path; nothing is sourced into the
//! packager's own environment.

use crate::command::{CommandRunner, CommandSpec};
use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Name of the project virtual-environment directory.
const VENV_DIR: &str = "cmeinit_venv";

/// Interpreter used when no virtual environment is found.
const SYSTEM_PYTHON: &str = "python3";

/// The Python interpreter that drives the package build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    python: Utf8PathBuf,
}

impl Toolchain {
    /// Select the interpreter for `project_root`.
    ///
    /// Prefers `<project_root>/cmeinit_venv/bin/python`; falls back to
    /// `python3` on the search path.
    #[must_use]
    pub fn detect(project_root: &Utf8Path) -> Self {
        let venv_python = project_root.join(VENV_DIR).join("bin").join("python");
        if venv_python.is_file() {
            return Self { python: venv_python };
        }
        Self {
            python: Utf8PathBuf::from(SYSTEM_PYTHON),
        }
    }

    /// Use an explicitly-chosen interpreter, bypassing detection.
    #[must_use]
    pub fn with_override(python: impl Into<Utf8PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Return the interpreter path.
    #[must_use]
    pub fn python(&self) -> &Utf8Path {
        &self.python
    }

    /// Probe the interpreter with `--version`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ToolchainNotFound`] if the interpreter cannot
    /// be spawned or exits unsuccessfully.
    pub fn verify_installed(&self, runner: &dyn CommandRunner) -> Result<()> {
        let spec = CommandSpec::new(self.python.as_str(), &["--version"]);

        let output = runner.run(&spec).map_err(|e| PackagerError::ToolchainNotFound {
            python: self.python.clone(),
            reason: e.to_string(),
        })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(PackagerError::ToolchainNotFound {
            python: self.python.clone(),
            reason: stderr.trim().to_owned(),
        })
    }
}
