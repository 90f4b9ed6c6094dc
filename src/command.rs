//! External command execution.
//!
//! Every process the pipeline spawns goes through [`CommandRunner`], so tests
//! can substitute canned outcomes. A [`CommandSpec`] carries the working
//! directory and environment explicitly; the parent process environment and
//! current directory are never touched.

use camino::Utf8PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// A fully-described external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory for the child process, if any.
    pub current_dir: Option<Utf8PathBuf>,
    /// Environment variables set on the child process only.
    pub env: Vec<(String, String)>,
    /// Upper bound on the invocation; expiry kills the child.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Create a spec for `program` with `args` and no further context.
    #[must_use]
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|&a| a.to_owned()).collect(),
            current_dir: None,
            env: Vec::new(),
            timeout: None,
        }
    }

    /// Look up an environment variable set on this spec.
    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run the described command and return the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning or waiting, including
    /// an [`std::io::ErrorKind::TimedOut`] error when the spec's timeout
    /// expires.
    fn run(&self, spec: &CommandSpec) -> std::io::Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<Output> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir.as_std_path());
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let Some(timeout) = spec.timeout else {
            return cmd.output();
        };

        let mut child = cmd.spawn()?;

        match child.wait_timeout(timeout)? {
            Some(status) => {
                let stdout = child
                    .stdout
                    .take()
                    .map(std::io::read_to_string)
                    .transpose()?
                    .unwrap_or_default();
                let stderr = child
                    .stderr
                    .take()
                    .map(std::io::read_to_string)
                    .transpose()?
                    .unwrap_or_default();

                Ok(Output {
                    status,
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                })
            }
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("command timed out after {} seconds", timeout.as_secs()),
                ))
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use stub::{StubRunner, stub_output};

#[cfg(any(test, feature = "test-support"))]
mod stub {
    use super::{CommandRunner, CommandSpec};
    use std::process::{ExitStatus, Output};

    /// A [`CommandRunner`] that answers every invocation from a handler
    /// closure instead of spawning a process.
    pub struct StubRunner {
        handler: Box<dyn Fn(&CommandSpec) -> std::io::Result<Output> + Send + Sync>,
    }

    impl StubRunner {
        /// Create a stub that delegates every invocation to `handler`.
        pub fn new<F>(handler: F) -> Self
        where
            F: Fn(&CommandSpec) -> std::io::Result<Output> + Send + Sync + 'static,
        {
            Self {
                handler: Box::new(handler),
            }
        }

        /// Create a stub that reports success with empty output for every
        /// invocation.
        #[must_use]
        pub fn always_succeeding() -> Self {
            Self::new(|_| Ok(stub_output(0, "", "")))
        }
    }

    impl CommandRunner for StubRunner {
        fn run(&self, spec: &CommandSpec) -> std::io::Result<Output> {
            (self.handler)(spec)
        }
    }

    /// Build a canned [`Output`] with the given exit code and streams.
    #[must_use]
    pub fn stub_output(code: i32, stdout: &str, stderr: &str) -> Output {
        Output {
            status: exit_status(code),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        // Wait status encoding: exit code in the high byte.
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}
