use anyhow::{Context, Result};
use log::{error, info, warn};
use mirror::{MirrorWalker, RestoreReport, TreeService, TreeWalker, WalkReport};
use snapshot::{Manifest, SnapshotAssembler, SnapshotId};
use std::path::PathBuf;
use zk::ZkTree;

use crate::config::Config;

/// Service kind recorded in snapshot manifests
const SERVICE_KIND: &str = "zk";

/// Result of a backup that ran to completion
#[derive(Debug, Clone)]
pub struct BackupOutcome {
    /// Identifier of the new snapshot
    pub snapshot_id: SnapshotId,
    /// Counts from the tree walk, including anything skipped
    pub report: WalkReport,
    /// The stored archive, or the mirror directory for the tty target
    pub location: PathBuf,
}

/// Back up the configured ZooKeeper tree
///
/// Returns true once the mirror has been written and, for a real storage
/// target, archived and transferred. Subtrees that could not be read are
/// logged and counted in the manifest but do not fail the backup.
pub fn backup(config: &Config) -> bool {
    if config.endpoint.is_empty() {
        error!("No ZooKeeper endpoint configured");
        return false;
    }

    let service = match ZkTree::connect(&config.endpoint) {
        Ok(service) => service,
        Err(e) => {
            error!("{}", e);
            return false;
        }
    };

    let result = backup_with(config, &service);
    service.close();

    match result {
        Ok(_) => true,
        Err(e) => {
            error!("Backup failed: {:#}", e);
            false
        }
    }
}

/// Back up the tree behind `service` according to `config`
pub fn backup_with<S: TreeService>(config: &Config, service: S) -> Result<BackupOutcome> {
    let id = config.snapshot_id.clone().unwrap_or_else(SnapshotId::now);
    let assembler = SnapshotAssembler::new(&config.work_dir);

    let root = assembler.prepare(&id)?;
    info!("Backing up {} into {}", config.endpoint, root.display());
    let report = TreeWalker::new(service).mirror_into(&root);
    if !report.is_complete() {
        warn!(
            "Snapshot {} is partial: {} subtrees skipped, {} leaves not written",
            id, report.skipped_subtrees, report.failed_reaps
        );
    }

    Manifest::new(
        SERVICE_KIND,
        config.endpoint.as_str(),
        &id,
        config.target.kind().to_string(),
        &report,
    )
    .write(&root)?;

    let location = if config.target.is_storage() {
        let artifact = assembler.archive(&id)?;
        config
            .target
            .store(&artifact)
            .with_context(|| format!("Failed to transfer snapshot {}", id))?
    } else {
        root
    };
    info!(
        "Snapshot {} with {} leaves written to {}",
        id,
        report.reaped(),
        location.display()
    );

    Ok(BackupOutcome {
        snapshot_id: id,
        report,
        location,
    })
}

/// Restore a stored snapshot into the configured ZooKeeper tree
///
/// Only absent nodes are created. Returns false if the target cannot hold
/// snapshots, the snapshot cannot be fetched, or any node operation fails.
pub fn restore(config: &Config, id: &SnapshotId) -> bool {
    if !config.target.is_storage() {
        error!("Cannot restore from the {} target", config.target.kind());
        return false;
    }
    if config.endpoint.is_empty() {
        error!("No ZooKeeper endpoint configured");
        return false;
    }

    let service = match ZkTree::connect(&config.endpoint) {
        Ok(service) => service,
        Err(e) => {
            error!("{}", e);
            return false;
        }
    };

    let result = restore_with(config, id, &service);
    service.close();

    match result {
        Ok(_) => true,
        Err(e) => {
            error!("Restore failed: {:#}", e);
            false
        }
    }
}

/// Restore snapshot `id` into the tree behind `service`
pub fn restore_with<S: TreeService>(
    config: &Config,
    id: &SnapshotId,
    service: S,
) -> Result<RestoreReport> {
    let artifact = config.target.fetch(id)?;
    let unpacked = SnapshotAssembler::new(&config.work_dir).unarchive(&artifact, id)?;

    match Manifest::read(unpacked.root()) {
        Ok(manifest) => {
            info!(
                "Restoring snapshot {} taken from {} at {}",
                manifest.snapshot_id, manifest.endpoint, manifest.created_at
            );
            if !manifest.is_complete() {
                warn!(
                    "Snapshot {} was partial when taken: {} subtrees skipped",
                    id, manifest.skipped_subtrees
                );
            }
        }
        Err(e) => warn!("{:#}", e),
    }

    let report = MirrorWalker::with_options(service, config.mirror_options())
        .restore(unpacked.root())
        .with_context(|| format!("Restore of snapshot {} aborted", id))?;

    Ok(report)
}
