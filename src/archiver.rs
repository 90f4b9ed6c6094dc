//! Release archive creation.
//!
//! Compresses the distribution directory's contents into a single named
//! `.tgz` in the invocation directory. The archive root is the directory's
//! contents, not the directory itself, so unpacking yields `VERSION` and
//! `wheelhouse/` directly. The archive is written under a temporary name and
//! atomically renamed on success; a failed compression never leaves a
//! truncated file behind.

use crate::error::{PackagerError, Result};
use crate::naming::ArchiveName;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use tempfile::NamedTempFile;

/// Builds the final release archive from the distribution tree.
pub struct Archiver<'a> {
    dist_dir: &'a Utf8Path,
    invocation_dir: &'a Utf8Path,
}

impl<'a> Archiver<'a> {
    /// Create an archiver for one run.
    #[must_use]
    pub fn new(dist_dir: &'a Utf8Path, invocation_dir: &'a Utf8Path) -> Self {
        Self {
            dist_dir,
            invocation_dir,
        }
    }

    /// Copy the version file from the staging tree into the distribution
    /// root so it ships inside the archive.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ArchiveWriteFailed`] if the copy fails.
    pub fn place_version_file(&self, staging_dir: &Utf8Path, file_name: &str) -> Result<()> {
        let src = staging_dir.join(file_name);
        let dest = self.dist_dir.join(file_name);

        fs::copy(&src, &dest).map_err(|e| PackagerError::ArchiveWriteFailed {
            reason: format!("failed to copy {src} to {dest}: {e}"),
        })?;
        Ok(())
    }

    /// Compress the distribution directory's contents into `<name>` in the
    /// invocation directory and return the archive path.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ArchiveWriteFailed`] on any I/O error; the
    /// temporary file is discarded and no partial archive remains.
    pub fn create(&self, name: &ArchiveName) -> Result<Utf8PathBuf> {
        let archive_path = self.invocation_dir.join(name.filename());

        let tmp = NamedTempFile::new_in(self.invocation_dir.as_std_path())
            .map_err(|e| archive_error("failed to create temporary archive", &e))?;

        self.write_archive(&tmp)?;

        tmp.persist(archive_path.as_std_path())
            .map_err(|e| archive_error("failed to finalize archive", &e))?;

        Ok(archive_path)
    }

    fn write_archive(&self, tmp: &NamedTempFile) -> Result<()> {
        let encoder = GzEncoder::new(tmp.as_file(), Compression::default());
        let mut archive = tar::Builder::new(encoder);

        let entries = self
            .dist_dir
            .read_dir_utf8()
            .map_err(|e| archive_error("failed to read distribution directory", &e))?;

        for entry in entries {
            let entry = entry.map_err(|e| archive_error("failed to read entry", &e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| archive_error("failed to stat entry", &e))?;

            // Entries are added under their bare names so the archive has no
            // wrapping directory prefix.
            if file_type.is_dir() {
                archive
                    .append_dir_all(entry.file_name(), entry.path())
                    .map_err(|e| archive_error("failed to append directory", &e))?;
            } else {
                archive
                    .append_path_with_name(entry.path(), entry.file_name())
                    .map_err(|e| archive_error("failed to append file", &e))?;
            }
        }

        let encoder = archive
            .into_inner()
            .map_err(|e| archive_error("failed to finish tar stream", &e))?;
        encoder
            .finish()
            .map_err(|e| archive_error("failed to finish compression", &e))?;

        Ok(())
    }
}

fn archive_error(context: &str, err: &dyn std::fmt::Display) -> PackagerError {
    PackagerError::ArchiveWriteFailed {
        reason: format!("{context}: {err}"),
    }
}

/// Compute the SHA-256 digest of a file as lowercase hex.
///
/// # Errors
///
/// Returns [`PackagerError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Utf8Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
