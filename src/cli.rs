//! CLI argument definitions for the packager.
//!
//! Separated from the entrypoint to keep the binary focused on
//! orchestration. The zero-argument invocation packages the project in the
//! current directory; flags only refine that default.

use camino::Utf8PathBuf;
use clap::Parser;

/// Package a CME software release into a deployable archive.
#[derive(Parser, Debug)]
#[command(name = "cme-release")]
#[command(version, about)]
#[command(long_about = concat!(
    "Package a CME software release into a deployable archive.\n\n",
    "The pipeline stages the buildable sources into a clean directory, runs ",
    "pip wheel against them with the artifact cache redirected into the ",
    "run's own wheelhouse, and compresses the result into a single ",
    "versioned .tgz in the invocation directory. Staging and distribution ",
    "directories are removed when the run ends, whatever the outcome.\n\n",
    "With no arguments, the project in the current directory is packaged.",
))]
pub struct Cli {
    /// Project root containing the version file and source package tree
    /// [default: current directory].
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<Utf8PathBuf>,

    /// Python interpreter driving the build [default: project virtual
    /// environment, then python3].
    #[arg(long, value_name = "PATH")]
    pub python: Option<Utf8PathBuf>,

    /// Override the build timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Increase diagnostic verbosity (repeatable).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            project_root: None,
            python: None,
            timeout_secs: None,
            verbosity: 0,
            quiet: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_selects_defaults() {
        let cli = Cli::parse_from(["cme-release"]);
        assert!(cli.project_root.is_none());
        assert!(cli.python.is_none());
        assert!(cli.timeout_secs.is_none());
        assert_eq!(cli.verbosity, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn overrides_are_accepted() {
        let cli = Cli::parse_from([
            "cme-release",
            "--project-root",
            "/srv/cme",
            "--python",
            "/usr/bin/python3.11",
            "--timeout-secs",
            "120",
        ]);
        assert_eq!(cli.project_root.as_deref(), Some(camino::Utf8Path::new("/srv/cme")));
        assert_eq!(
            cli.python.as_deref(),
            Some(camino::Utf8Path::new("/usr/bin/python3.11"))
        );
        assert_eq!(cli.timeout_secs, Some(120));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["cme-release", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn verbosity_is_repeatable() {
        let cli = Cli::parse_from(["cme-release", "-vv"]);
        assert_eq!(cli.verbosity, 2);
    }
}
