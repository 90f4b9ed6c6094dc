//! Release pipeline orchestration.
//!
//! Drives one packaging run end to end: read the version, allocate the
//! workspace, stage sources, invoke the package build, archive the
//! distribution, and tear the workspace down. The flow is strictly linear
//! and fail-fast; whatever happens after the workspace exists, both
//! ephemeral directories are removed before control returns to the caller.

use crate::archiver::{Archiver, compute_sha256};
use crate::builder::{BuildConfig, Builder};
use crate::command::CommandRunner;
use crate::config::PackagerConfig;
use crate::error::Result;
use crate::naming::ArchiveName;
use crate::output::write_stderr_line;
use crate::stager::Stager;
use crate::toolchain::Toolchain;
use crate::version::{Version, read_version};
use crate::workspace::Workspace;
use camino::Utf8PathBuf;
use log::warn;
use std::io::Write;
use std::time::Duration;

/// Inputs for one packaging run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root of the versioned source tree.
    pub project_root: Utf8PathBuf,
    /// Directory the workspace lives under and the archive lands in.
    pub invocation_dir: Utf8PathBuf,
    /// Explicit interpreter, bypassing virtual-environment detection.
    pub python_override: Option<Utf8PathBuf>,
    /// Build timeout override from the command line.
    pub timeout_override: Option<Duration>,
    /// Build-tool output verbosity (repeatable `-v`).
    pub verbosity: u8,
    /// Suppress progress output.
    pub quiet: bool,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Version token the archive was named with.
    pub version: Version,
    /// Path of the finished archive.
    pub archive_path: Utf8PathBuf,
    /// SHA-256 digest of the finished archive, lowercase hex.
    pub archive_digest: String,
    /// Number of artifact files the builder produced.
    pub artifact_count: usize,
}

/// Execute a packaging run.
///
/// Configuration, version, and toolchain problems fail before any directory
/// is created. Once the workspace exists, cleanup runs on every outcome;
/// cleanup failures are logged and reported but never mask a stage error.
///
/// # Errors
///
/// Returns the first stage error encountered; see [`crate::error::PackagerError`].
pub fn run(
    options: &RunOptions,
    runner: &dyn CommandRunner,
    stderr: &mut dyn Write,
) -> Result<RunSummary> {
    let config = PackagerConfig::load(&options.project_root)?;
    let version = read_version(&options.project_root, &config.version_file)?;

    if !options.quiet {
        write_stderr_line(
            stderr,
            format!("Packaging {} release v{version}...", config.project_id),
        );
    }

    let toolchain = match &options.python_override {
        Some(python) => Toolchain::with_override(python.clone()),
        None => Toolchain::detect(&options.project_root),
    };
    toolchain.verify_installed(runner)?;

    let workspace = Workspace::create(&options.invocation_dir)?;

    let context = StageContext {
        options,
        config: &config,
        version: &version,
        toolchain: &toolchain,
        workspace: &workspace,
    };
    let outcome = run_stages(&context, runner, stderr);

    if let Err(cleanup_err) = workspace.destroy() {
        warn!("{cleanup_err}");
        write_stderr_line(stderr, format!("warning: {cleanup_err}"));
    }

    outcome
}

/// Everything the staged/built/archived phase needs.
#[derive(Clone, Copy)]
struct StageContext<'a> {
    options: &'a RunOptions,
    config: &'a PackagerConfig,
    version: &'a Version,
    toolchain: &'a Toolchain,
    workspace: &'a Workspace,
}

/// The stages that run between workspace creation and teardown.
fn run_stages(
    context: &StageContext<'_>,
    runner: &dyn CommandRunner,
    stderr: &mut dyn Write,
) -> Result<RunSummary> {
    let StageContext {
        options,
        config,
        version,
        toolchain,
        workspace,
    } = *context;

    if !options.quiet {
        write_stderr_line(
            stderr,
            format!("Staging sources to {}...", workspace.staging_dir()),
        );
    }
    Stager::new(&options.project_root, workspace.staging_dir(), config).stage()?;

    if !options.quiet {
        write_stderr_line(
            stderr,
            format!("Building package artifacts with {}...", toolchain.python()),
        );
    }
    let build_config = BuildConfig {
        toolchain: toolchain.clone(),
        staging_dir: workspace.staging_dir().to_owned(),
        cache_dir: workspace.cache_dir().to_owned(),
        timeout: options.timeout_override.unwrap_or_else(|| config.build_timeout()),
        verbosity: options.verbosity,
    };
    let build = Builder::new(build_config).build(runner)?;

    let archive_name = ArchiveName::from_config(config, version.clone());
    if !options.quiet {
        write_stderr_line(stderr, format!("Writing {archive_name}..."));
    }
    let archiver = Archiver::new(workspace.dist_dir(), &options.invocation_dir);
    archiver.place_version_file(workspace.staging_dir(), &config.version_file)?;
    let archive_path = archiver.create(&archive_name)?;
    let archive_digest = compute_sha256(&archive_path)?;

    Ok(RunSummary {
        version: version.clone(),
        archive_path,
        archive_digest,
        artifact_count: build.artifacts.len(),
    })
}
