//! Release version token handling.
//!
//! The version is an opaque string read once per run from a well-known file
//! in the project root. It is used verbatim in the archive filename; no
//! parsing beyond trimming is performed.

use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use std::fmt;

/// An opaque release version token.
///
/// This newtype keeps version strings from being confused with other path or
/// name strings in the pipeline. The only guarantee is that the token is
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Get the version token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read the version token from `file_name` under `project_root`.
///
/// The file's contents are trimmed of surrounding whitespace; whatever
/// remains is accepted verbatim.
///
/// # Errors
///
/// Returns [`PackagerError::MissingVersionFile`] if the file does not exist
/// and [`PackagerError::EmptyVersionFile`] if the trimmed token is empty.
pub fn read_version(project_root: &Utf8Path, file_name: &str) -> Result<Version> {
    let path = project_root.join(file_name);

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PackagerError::MissingVersionFile { path });
        }
        Err(e) => return Err(PackagerError::Io(e)),
    };

    let token = contents.trim();
    if token.is_empty() {
        return Err(PackagerError::EmptyVersionFile { path });
    }

    Ok(Version(token.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct TempRoot {
        _temp: TempDir,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn temp_root() -> TempRoot {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = Utf8PathBuf::try_from(temp.path().to_owned()).expect("non-UTF8 temp path");
        TempRoot { _temp: temp, path }
    }

    #[rstest]
    #[case::plain("2.3.1", "2.3.1")]
    #[case::trailing_newline("2.3.1\n", "2.3.1")]
    #[case::surrounding_whitespace("  7.0.0-rc1 \n", "7.0.0-rc1")]
    #[case::opaque_token("build-1234", "build-1234")]
    fn read_version_trims_and_accepts_any_token(
        temp_root: TempRoot,
        #[case] contents: &str,
        #[case] expected: &str,
    ) {
        std::fs::write(temp_root.path.join("VERSION"), contents).expect("write VERSION");

        let version = read_version(&temp_root.path, "VERSION").expect("version should read");
        assert_eq!(version.as_str(), expected);
    }

    #[rstest]
    fn read_version_fails_when_file_absent(temp_root: TempRoot) {
        let err = read_version(&temp_root.path, "VERSION").expect_err("expected failure");
        assert!(matches!(err, PackagerError::MissingVersionFile { .. }));
    }

    #[rstest]
    fn read_version_rejects_whitespace_only_file(temp_root: TempRoot) {
        std::fs::write(temp_root.path.join("VERSION"), " \n\t").expect("write VERSION");

        let err = read_version(&temp_root.path, "VERSION").expect_err("expected failure");
        assert!(matches!(err, PackagerError::EmptyVersionFile { .. }));
    }

    #[test]
    fn version_displays_verbatim() {
        let version = Version::from("2.3.1");
        assert_eq!(version.to_string(), "2.3.1");
    }
}
