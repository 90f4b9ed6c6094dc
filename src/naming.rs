//! Archive naming policy.
//!
//! Constructs the deterministic release archive name
//! `<project-id>-v<version>-<suffix>.tgz`, for example
//! `1500-004-v2.3.1-SWARE-CME_INIT.tgz`.

use crate::config::PackagerConfig;
use crate::version::Version;
use std::fmt;

/// The fixed file extension for release archives.
const ARCHIVE_EXTENSION: &str = ".tgz";

/// A fully-qualified release archive name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    project_id: String,
    version: Version,
    suffix: String,
}

impl ArchiveName {
    /// Create an archive name from its components.
    #[must_use]
    pub fn new(project_id: impl Into<String>, version: Version, suffix: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            version,
            suffix: suffix.into(),
        }
    }

    /// Create an archive name from the run configuration and version.
    #[must_use]
    pub fn from_config(config: &PackagerConfig, version: Version) -> Self {
        Self::new(config.project_id.clone(), version, config.archive_suffix.clone())
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-v{}-{}{}",
            self.project_id, self.version, self.suffix, ARCHIVE_EXTENSION
        )
    }
}
