//! Ephemeral workspace lifecycle.
//!
//! A run owns two directory trees under the invocation directory: `stage/`
//! (the clean copy of buildable sources) and `dist/` (collected build
//! outputs, including the `wheelhouse/` artifact cache). This module owns
//! their entire lifecycle: nothing else in the pipeline may create or delete
//! them. Removal is guaranteed on every exit path; a `Drop` backstop covers
//! panics, and the explicit [`Workspace::destroy`] reports failures so they
//! can be logged.
//!
//! An exclusive advisory lock on `.cme-release.lock` is held for the
//! workspace lifetime so that two runs targeting the same invocation
//! directory cannot interleave.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use std::fs;

/// Name of the staging directory under the invocation directory.
pub const STAGING_DIR_NAME: &str = "stage";

/// Name of the distribution directory under the invocation directory.
pub const DIST_DIR_NAME: &str = "dist";

/// Name of the artifact cache subdirectory inside the distribution tree.
pub const CACHE_DIR_NAME: &str = "wheelhouse";

/// Name of the lock file guarding the invocation directory.
const LOCK_FILE_NAME: &str = ".cme-release.lock";

/// Exclusive hold on the invocation directory for one run.
#[derive(Debug)]
struct WorkspaceLock {
    file: fs::File,
    path: Utf8PathBuf,
}

impl WorkspaceLock {
    fn acquire(invocation_dir: &Utf8Path) -> Result<Self> {
        let path = invocation_dir.join(LOCK_FILE_NAME);
        let file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;

        file.try_lock_exclusive()
            .map_err(|_| PackagerError::WorkspaceLocked {
                path: invocation_dir.to_owned(),
            })?;

        Ok(Self { file, path })
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        // Release before removing so a waiting run never sees a locked,
        // half-deleted file.
        let _ = FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}

/// The pair of ephemeral directories owned by one packaging run.
#[derive(Debug)]
pub struct Workspace {
    staging_dir: Utf8PathBuf,
    dist_dir: Utf8PathBuf,
    cache_dir: Utf8PathBuf,
    _lock: WorkspaceLock,
    cleaned: bool,
}

impl Workspace {
    /// Allocate the staging and distribution trees under `invocation_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::WorkspaceLocked`] if another run holds the
    /// invocation-directory lock, and [`PackagerError::WorkspaceAlreadyExists`]
    /// if either directory pre-exists (stale state is never merged into).
    /// Nothing is created on any error path.
    pub fn create(invocation_dir: &Utf8Path) -> Result<Self> {
        let lock = WorkspaceLock::acquire(invocation_dir)?;

        let staging_dir = invocation_dir.join(STAGING_DIR_NAME);
        let dist_dir = invocation_dir.join(DIST_DIR_NAME);

        for existing in [&staging_dir, &dist_dir] {
            if existing.exists() {
                return Err(PackagerError::WorkspaceAlreadyExists {
                    path: existing.clone(),
                });
            }
        }

        let cache_dir = dist_dir.join(CACHE_DIR_NAME);
        fs::create_dir(&staging_dir)?;
        fs::create_dir_all(&cache_dir)?;

        Ok(Self {
            staging_dir,
            dist_dir,
            cache_dir,
            _lock: lock,
            cleaned: false,
        })
    }

    /// Path of the staging directory.
    #[must_use]
    pub fn staging_dir(&self) -> &Utf8Path {
        &self.staging_dir
    }

    /// Path of the distribution directory.
    #[must_use]
    pub fn dist_dir(&self) -> &Utf8Path {
        &self.dist_dir
    }

    /// Path of the artifact cache subdirectory.
    #[must_use]
    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    /// Recursively remove both trees and release the lock.
    ///
    /// Safe to call with partial build output present. Both trees are
    /// attempted even if the first removal fails.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::CleanupFailed`] for the first tree that could
    /// not be removed.
    pub fn destroy(mut self) -> Result<()> {
        self.cleaned = true;

        let mut failure = None;
        for dir in [&self.staging_dir, &self.dist_dir] {
            if let Err(e) = remove_tree(dir) {
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.cleaned {
            let _ = fs::remove_dir_all(&self.staging_dir);
            let _ = fs::remove_dir_all(&self.dist_dir);
        }
    }
}

fn remove_tree(dir: &Utf8Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    fs::remove_dir_all(dir).map_err(|e| PackagerError::CleanupFailed {
        path: dir.to_owned(),
        reason: e.to_string(),
    })
}
