//! Content files holding the payload of a single leaf node

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{MirrorError, Result};

/// Name of the file holding a leaf's raw payload inside its mirror directory
pub const CONTENT_FILE: &str = "content";

/// Name of the reserved metadata marker at the snapshot root
pub const MANIFEST_FILE: &str = ".manifest.json";

/// Reads and writes leaf payloads in mirror directories
///
/// Payload bytes are stored verbatim. A branch directory never gets a content
/// file, so its presence alone decides leaf versus branch on restore.
pub struct LeafStore;

impl LeafStore {
    /// Path of the content file for a mirror directory
    pub fn content_path(dir: &Path) -> PathBuf {
        dir.join(CONTENT_FILE)
    }

    /// Check whether a mirror directory holds a content file
    pub fn has_content(dir: &Path) -> bool {
        Self::content_path(dir).is_file()
    }

    /// Read the payload stored in a mirror directory
    pub fn read_content(dir: &Path) -> Result<Vec<u8>> {
        let path = Self::content_path(dir);
        fs::read(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => MirrorError::ContentNotFound(dir.to_path_buf()),
            _ => MirrorError::ContentRead { path, source },
        })
    }

    /// Write a payload into a mirror directory, creating the directory first
    ///
    /// Fails rather than overwrite an existing content file.
    pub fn write_content(dir: &Path, payload: &[u8]) -> Result<PathBuf> {
        let path = Self::content_path(dir);
        let write_error = |source| MirrorError::ContentWrite {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(write_error)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(write_error)?;
        file.write_all(payload).map_err(write_error)?;

        Ok(path)
    }
}
