//! Packager configuration.
//!
//! The defaults describe the CME release exactly; a `packager.toml` in the
//! project root may override individual fields when the pipeline is pointed
//! at a different source tree. An absent file means defaults; a malformed
//! file is an error rather than a silent fallback.

use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use serde::Deserialize;
use std::time::Duration;

/// Name of the optional override file in the project root.
pub const CONFIG_FILE_NAME: &str = "packager.toml";

fn default_project_id() -> String {
    "1500-004".to_owned()
}

fn default_archive_suffix() -> String {
    "SWARE-CME_INIT".to_owned()
}

fn default_package_dir() -> String {
    "cmeinit".to_owned()
}

fn default_descriptor() -> String {
    "setup.py".to_owned()
}

fn default_version_file() -> String {
    "VERSION".to_owned()
}

fn default_build_timeout_secs() -> u64 {
    600
}

/// Settings for a packaging run.
#[derive(Debug, Clone, Deserialize)]
pub struct PackagerConfig {
    /// Deployment project identifier, the first archive-name component.
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Fixed archive-name suffix identifying the shipped software unit.
    #[serde(default = "default_archive_suffix")]
    pub archive_suffix: String,

    /// Name of the buildable source package directory in the project root.
    #[serde(default = "default_package_dir")]
    pub package_dir: String,

    /// Name of the project descriptor file the build tool reads.
    #[serde(default = "default_descriptor")]
    pub descriptor: String,

    /// Name of the version file in the project root.
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Upper bound on the package-build invocation, in seconds.
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            archive_suffix: default_archive_suffix(),
            package_dir: default_package_dir(),
            descriptor: default_descriptor(),
            version_file: default_version_file(),
            build_timeout_secs: default_build_timeout_secs(),
        }
    }
}

impl PackagerConfig {
    /// Load configuration for `project_root`.
    ///
    /// Reads `packager.toml` if present, otherwise returns the CME defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidConfig`] if the file exists but cannot
    /// be parsed.
    pub fn load(project_root: &Utf8Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(PackagerError::Io(e)),
        };

        toml::from_str(&contents).map_err(|e| PackagerError::InvalidConfig {
            path,
            reason: e.to_string(),
        })
    }

    /// The build-invocation timeout as a [`Duration`].
    #[must_use]
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }
}
