//! Source staging.
//!
//! Copies the minimal buildable inputs from the project root into the
//! staging directory: the source package tree, the version file, and the
//! project descriptor. The copy set is an explicit allow-list so the build
//! tool never sees incidental repository files, however the repository
//! grows. Within the package tree, tool caches are filtered out.

use crate::config::PackagerConfig;
use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use std::fs;

/// Directory entries never copied even inside the allow-listed tree.
const FILTERED_DIRS: &[&str] = &["__pycache__", ".git"];

/// File suffixes never copied even inside the allow-listed tree.
const FILTERED_SUFFIXES: &[&str] = &[".pyc"];

/// Copies the declared build inputs into the staging directory.
pub struct Stager<'a> {
    project_root: &'a Utf8Path,
    staging_dir: &'a Utf8Path,
    config: &'a PackagerConfig,
}

impl<'a> Stager<'a> {
    /// Create a stager for one run.
    #[must_use]
    pub fn new(
        project_root: &'a Utf8Path,
        staging_dir: &'a Utf8Path,
        config: &'a PackagerConfig,
    ) -> Self {
        Self {
            project_root,
            staging_dir,
            config,
        }
    }

    /// Copy the allow-list: package tree, version file, project descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingCopyFailed`] if any required input is
    /// missing or unreadable.
    pub fn stage(&self) -> Result<()> {
        let package_src = self.project_root.join(&self.config.package_dir);
        if !package_src.is_dir() {
            return Err(PackagerError::StagingCopyFailed {
                reason: format!("source package tree {package_src} is missing"),
            });
        }

        copy_tree(&package_src, &self.staging_dir.join(&self.config.package_dir))?;
        self.copy_file(&self.config.version_file)?;
        self.copy_file(&self.config.descriptor)?;

        Ok(())
    }

    fn copy_file(&self, name: &str) -> Result<()> {
        let src = self.project_root.join(name);
        let dest = self.staging_dir.join(name);

        fs::copy(&src, &dest).map_err(|e| PackagerError::StagingCopyFailed {
            reason: format!("failed to copy {src} to {dest}: {e}"),
        })?;
        Ok(())
    }
}

/// Recursively copy `src` to `dest`, skipping tool caches.
fn copy_tree(src: &Utf8Path, dest: &Utf8Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| PackagerError::StagingCopyFailed {
        reason: format!("failed to create {dest}: {e}"),
    })?;

    let entries = src.read_dir_utf8().map_err(|e| PackagerError::StagingCopyFailed {
        reason: format!("failed to read {src}: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| PackagerError::StagingCopyFailed {
            reason: format!("failed to read entry under {src}: {e}"),
        })?;
        let name = entry.file_name();
        let file_type = entry.file_type().map_err(|e| PackagerError::StagingCopyFailed {
            reason: format!("failed to stat {}: {e}", entry.path()),
        })?;

        if file_type.is_dir() {
            if FILTERED_DIRS.contains(&name) {
                continue;
            }
            copy_tree(entry.path(), &dest.join(name))?;
        } else {
            if FILTERED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                continue;
            }
            let target = dest.join(name);
            fs::copy(entry.path(), &target).map_err(|e| PackagerError::StagingCopyFailed {
                reason: format!("failed to copy {} to {target}: {e}", entry.path()),
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct StagingFixture {
        _temp: TempDir,
        project_root: Utf8PathBuf,
        staging_dir: Utf8PathBuf,
        config: PackagerConfig,
    }

    #[fixture]
    fn fixture() -> StagingFixture {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_owned()).expect("non-UTF8 temp path");
        let project_root = root.join("project");
        let staging_dir = root.join("stage");
        fs::create_dir_all(&project_root).expect("create project root");
        fs::create_dir_all(&staging_dir).expect("create staging dir");
        StagingFixture {
            _temp: temp,
            project_root,
            staging_dir,
            config: PackagerConfig::default(),
        }
    }

    fn write_buildable_inputs(root: &Utf8Path) {
        let package = root.join("cmeinit");
        fs::create_dir_all(package.join("common")).expect("create package tree");
        fs::write(package.join("__init__.py"), "").expect("write __init__.py");
        fs::write(package.join("common").join("config.py"), "TIMEOUT = 5\n")
            .expect("write config.py");
        fs::write(root.join("VERSION"), "2.3.1\n").expect("write VERSION");
        fs::write(root.join("setup.py"), "from setuptools import setup\n").expect("write setup.py");
    }

    #[rstest]
    fn stage_copies_exactly_the_allow_list(fixture: StagingFixture) {
        write_buildable_inputs(&fixture.project_root);
        // Incidental repository files that must never reach staging.
        fs::write(fixture.project_root.join("README.md"), "# CME").expect("write README");
        fs::create_dir_all(fixture.project_root.join(".git")).expect("create .git");
        fs::create_dir_all(fixture.project_root.join("cmeinit_venv").join("bin"))
            .expect("create venv");

        let stager = Stager::new(&fixture.project_root, &fixture.staging_dir, &fixture.config);
        stager.stage().expect("staging should succeed");

        assert!(fixture.staging_dir.join("cmeinit").join("__init__.py").is_file());
        assert!(fixture
            .staging_dir
            .join("cmeinit")
            .join("common")
            .join("config.py")
            .is_file());
        assert!(fixture.staging_dir.join("VERSION").is_file());
        assert!(fixture.staging_dir.join("setup.py").is_file());

        assert!(!fixture.staging_dir.join("README.md").exists());
        assert!(!fixture.staging_dir.join(".git").exists());
        assert!(!fixture.staging_dir.join("cmeinit_venv").exists());
    }

    #[rstest]
    fn stage_filters_caches_inside_the_package_tree(fixture: StagingFixture) {
        write_buildable_inputs(&fixture.project_root);
        let package = fixture.project_root.join("cmeinit");
        fs::create_dir_all(package.join("__pycache__")).expect("create __pycache__");
        fs::write(package.join("__pycache__").join("main.cpython-39.pyc"), b"")
            .expect("write cached module");
        fs::write(package.join("main.pyc"), b"").expect("write stray pyc");

        let stager = Stager::new(&fixture.project_root, &fixture.staging_dir, &fixture.config);
        stager.stage().expect("staging should succeed");

        let staged_package = fixture.staging_dir.join("cmeinit");
        assert!(!staged_package.join("__pycache__").exists());
        assert!(!staged_package.join("main.pyc").exists());
    }

    #[rstest]
    #[case::missing_package_tree("cmeinit")]
    #[case::missing_version_file("VERSION")]
    #[case::missing_descriptor("setup.py")]
    fn stage_fails_when_a_required_input_is_missing(
        fixture: StagingFixture,
        #[case] removed: &str,
    ) {
        write_buildable_inputs(&fixture.project_root);
        let victim = fixture.project_root.join(removed);
        if victim.is_dir() {
            fs::remove_dir_all(&victim).expect("remove input dir");
        } else {
            fs::remove_file(&victim).expect("remove input file");
        }

        let stager = Stager::new(&fixture.project_root, &fixture.staging_dir, &fixture.config);
        let err = stager.stage().expect_err("expected staging failure");
        assert!(matches!(err, PackagerError::StagingCopyFailed { .. }));
    }

    #[rstest]
    fn stage_respects_configured_input_names(fixture: StagingFixture) {
        let mut config = PackagerConfig::default();
        config.package_dir = "sensors".to_owned();
        config.descriptor = "pyproject.toml".to_owned();
        config.version_file = "RELEASE".to_owned();

        let package = fixture.project_root.join("sensors");
        fs::create_dir_all(&package).expect("create package tree");
        fs::write(package.join("__init__.py"), "").expect("write __init__.py");
        fs::write(fixture.project_root.join("RELEASE"), "0.9\n").expect("write RELEASE");
        fs::write(fixture.project_root.join("pyproject.toml"), "[project]\n")
            .expect("write descriptor");

        let stager = Stager::new(&fixture.project_root, &fixture.staging_dir, &config);
        stager.stage().expect("staging should succeed");

        assert!(fixture.staging_dir.join("sensors").join("__init__.py").is_file());
        assert!(fixture.staging_dir.join("RELEASE").is_file());
        assert!(fixture.staging_dir.join("pyproject.toml").is_file());
    }
}
