use anyhow::{Context, Result};
use mirror::{WalkReport, MANIFEST_FILE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::id::SnapshotId;

/// Metadata marker written at the root of every mirror
///
/// Restore never turns it into a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Kind of tree service the snapshot came from
    pub service: String,
    /// Endpoint the snapshot was taken from
    pub endpoint: String,
    /// Snapshot identifier, equal to the mirror root directory name
    pub snapshot_id: String,
    /// Creation time in Unix seconds
    pub created_at: u64,
    /// Storage target the snapshot was sent to
    pub target: String,
    /// Leaves discovered during backup
    pub leaves: usize,
    /// Subtrees that could not be read during backup
    pub skipped_subtrees: usize,
    /// Leaves that could not be written to the mirror
    pub failed_reaps: usize,
}

impl Manifest {
    /// Describe a finished backup walk
    pub fn new(
        service: impl Into<String>,
        endpoint: impl Into<String>,
        id: &SnapshotId,
        target: impl Into<String>,
        report: &WalkReport,
    ) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self {
            service: service.into(),
            endpoint: endpoint.into(),
            snapshot_id: id.to_string(),
            created_at,
            target: target.into(),
            leaves: report.leaves,
            skipped_subtrees: report.skipped_subtrees,
            failed_reaps: report.failed_reaps,
        }
    }

    /// True when the backup captured every leaf it found
    pub fn is_complete(&self) -> bool {
        self.skipped_subtrees == 0 && self.failed_reaps == 0
    }

    /// Write the manifest into a mirror root
    pub fn write(&self, mirror_root: &Path) -> Result<()> {
        let path = mirror_root.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).context("Failed to serialise manifest")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write manifest {}", path.display()))
    }

    /// Read the manifest from a mirror root
    pub fn read(mirror_root: &Path) -> Result<Self> {
        let path = mirror_root.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }
}
