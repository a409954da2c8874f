use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::id::SnapshotId;

/// A snapshot unpacked from an archive
///
/// The staging directory, and the mirror inside it, are deleted on drop.
pub struct Unpacked {
    _staging: TempDir,
    root: PathBuf,
}

impl Unpacked {
    /// The mirror root, ready for restore
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Stages mirror directories and packs them into transportable archives
pub struct SnapshotAssembler {
    /// Directory where mirrors and archives are staged
    work_dir: PathBuf,
}

impl SnapshotAssembler {
    /// Create an assembler staging under `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// The staging directory
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Path of the mirror root for a snapshot
    pub fn mirror_root(&self, id: &SnapshotId) -> PathBuf {
        self.work_dir.join(id.as_str())
    }

    /// Create an empty mirror root for a new backup
    ///
    /// Fails if anything already exists at that path, so backups never mix
    /// with an older mirror.
    pub fn prepare(&self, id: &SnapshotId) -> Result<PathBuf> {
        fs::create_dir_all(&self.work_dir).with_context(|| {
            format!("Failed to create work directory {}", self.work_dir.display())
        })?;

        let root = self.mirror_root(id);
        fs::create_dir(&root)
            .with_context(|| format!("Failed to create mirror root {}", root.display()))?;
        debug!("Prepared mirror root {}", root.display());

        Ok(root)
    }

    /// Pack a snapshot's mirror into `<id>.tgz` in the work directory
    ///
    /// The mirror directory is removed once the archive is complete.
    pub fn archive(&self, id: &SnapshotId) -> Result<PathBuf> {
        let root = self.mirror_root(id);
        let artifact = self.work_dir.join(id.archive_name());

        let file = File::create(&artifact)
            .with_context(|| format!("Failed to create archive {}", artifact.display()))?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(id.as_str(), &root)
            .with_context(|| format!("Failed to add {} to archive", root.display()))?;
        let encoder = builder.into_inner().context("Failed to finish tar archive")?;
        encoder.finish().context("Failed to finish gzip compression")?;

        fs::remove_dir_all(&root)
            .with_context(|| format!("Failed to remove mirror {}", root.display()))?;
        info!("Archived snapshot {} to {}", id, artifact.display());

        Ok(artifact)
    }

    /// Unpack a snapshot archive into a fresh staging directory
    pub fn unarchive(&self, artifact: &Path, id: &SnapshotId) -> Result<Unpacked> {
        fs::create_dir_all(&self.work_dir).with_context(|| {
            format!("Failed to create work directory {}", self.work_dir.display())
        })?;
        let staging = tempfile::Builder::new()
            .prefix(".restore-")
            .tempdir_in(&self.work_dir)
            .context("Failed to create staging directory")?;

        let file = File::open(artifact)
            .with_context(|| format!("Failed to open archive {}", artifact.display()))?;
        tar::Archive::new(GzDecoder::new(file))
            .unpack(staging.path())
            .with_context(|| format!("Failed to unpack archive {}", artifact.display()))?;

        let root = staging.path().join(id.as_str());
        if !root.is_dir() {
            bail!(
                "Archive {} does not contain snapshot {}",
                artifact.display(),
                id
            );
        }
        info!("Unpacked snapshot {} into {}", id, root.display());

        Ok(Unpacked {
            _staging: staging,
            root,
        })
    }
}
