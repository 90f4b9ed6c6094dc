//! CME release packager CLI entrypoint.
//!
//! Packages the project in the current (or given) directory into a single
//! versioned `.tgz` archive and prints a completion message. Exits non-zero
//! with the failing stage's error on any failure.

use camino::Utf8PathBuf;
use clap::Parser;
use cme_release::cli::Cli;
use cme_release::command::SystemCommandRunner;
use cme_release::error::{PackagerError, Result};
use cme_release::output::{completion_message, write_stderr_line};
use cme_release::pipeline::{RunOptions, run};
use std::io::Write;
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = execute(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn execute(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let options = run_options_for_cli(cli)?;
    let summary = run(&options, &SystemCommandRunner, stderr)?;
    write_stderr_line(stderr, completion_message(&summary));
    Ok(())
}

fn run_options_for_cli(cli: &Cli) -> Result<RunOptions> {
    let invocation_dir = current_dir_utf8()?;
    let project_root = cli
        .project_root
        .clone()
        .unwrap_or_else(|| invocation_dir.clone());

    Ok(RunOptions {
        project_root,
        invocation_dir,
        python_override: cli.python.clone(),
        timeout_override: cli.timeout_secs.map(Duration::from_secs),
        verbosity: cli.verbosity,
        quiet: cli.quiet,
    })
}

fn current_dir_utf8() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| {
        PackagerError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("current directory is not valid UTF-8: {e}"),
        ))
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = PackagerError::BuildFailed {
            reason: "pip exited with status 1".to_owned(),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("package build failed"));
    }

    #[test]
    fn run_options_default_project_root_to_invocation_dir() {
        let cli = Cli::default();
        let options = run_options_for_cli(&cli).expect("options should resolve");
        assert_eq!(options.project_root, options.invocation_dir);
        assert!(options.python_override.is_none());
        assert!(options.timeout_override.is_none());
    }

    #[test]
    fn run_options_honour_cli_overrides() {
        let cli = Cli {
            project_root: Some(Utf8PathBuf::from("/srv/cme")),
            python: Some(Utf8PathBuf::from("/usr/bin/python3.11")),
            timeout_secs: Some(120),
            ..Cli::default()
        };

        let options = run_options_for_cli(&cli).expect("options should resolve");
        assert_eq!(options.project_root, Utf8PathBuf::from("/srv/cme"));
        assert_eq!(
            options.python_override,
            Some(Utf8PathBuf::from("/usr/bin/python3.11"))
        );
        assert_eq!(options.timeout_override, Some(Duration::from_secs(120)));
    }
}
