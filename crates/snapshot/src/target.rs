use anyhow::{anyhow, bail, Context, Result};
use derive_more::Display;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::id::SnapshotId;

/// The kinds of storage target that can be selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TargetKind {
    /// Interactive mode: the mirror stays on disk, nothing is archived
    #[display(fmt = "tty")]
    Tty,
    /// Archives are kept in a local directory
    #[display(fmt = "local")]
    Local,
}

impl FromStr for TargetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tty" => Ok(TargetKind::Tty),
            "local" => Ok(TargetKind::Local),
            other => Err(anyhow!("Unknown storage target {:?}", other)),
        }
    }
}

/// Where snapshot archives go after backup and come from before restore
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageTarget {
    /// No archive, no transfer
    #[default]
    Tty,
    /// A directory on the local filesystem
    Local(PathBuf),
}

impl StorageTarget {
    /// Build a target from its kind and optional directory
    pub fn from_kind(kind: TargetKind, dir: Option<PathBuf>) -> Result<Self> {
        match kind {
            TargetKind::Tty => Ok(StorageTarget::Tty),
            TargetKind::Local => dir
                .map(StorageTarget::Local)
                .ok_or_else(|| anyhow!("The local storage target needs a target directory")),
        }
    }

    /// The kind of this target
    pub fn kind(&self) -> TargetKind {
        match self {
            StorageTarget::Tty => TargetKind::Tty,
            StorageTarget::Local(_) => TargetKind::Local,
        }
    }

    /// Whether snapshots are archived and transferred at all
    pub fn is_storage(&self) -> bool {
        !matches!(self, StorageTarget::Tty)
    }

    /// Transfer an archive to the target, returning where it now lives
    pub fn store(&self, artifact: &Path) -> Result<PathBuf> {
        let StorageTarget::Local(dir) = self else {
            bail!("The {} target does not store archives", self.kind());
        };

        let name = artifact
            .file_name()
            .ok_or_else(|| anyhow!("Archive path {} has no file name", artifact.display()))?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create target directory {}", dir.display()))?;
        let destination = dir.join(name);

        if same_file(artifact, &destination) {
            debug!("Archive {} is already in place", artifact.display());
            return Ok(destination);
        }

        fs::copy(artifact, &destination).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                artifact.display(),
                destination.display()
            )
        })?;
        fs::remove_file(artifact)
            .with_context(|| format!("Failed to remove staged archive {}", artifact.display()))?;
        info!("Stored snapshot archive at {}", destination.display());

        Ok(destination)
    }

    /// Locate the archive for a snapshot on the target
    pub fn fetch(&self, id: &SnapshotId) -> Result<PathBuf> {
        let StorageTarget::Local(dir) = self else {
            bail!("Cannot restore from the {} target", self.kind());
        };

        let artifact = dir.join(id.archive_name());
        if !artifact.is_file() {
            bail!("No archive for snapshot {} at {}", id, artifact.display());
        }
        debug!("Found snapshot archive {}", artifact.display());

        Ok(artifact)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
