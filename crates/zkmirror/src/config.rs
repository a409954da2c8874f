use mirror::{Acl, MirrorOptions};
use snapshot::{SnapshotId, StorageTarget};
use std::path::PathBuf;

/// Settings for one backup or restore run
#[derive(Debug, Clone)]
pub struct Config {
    /// ZooKeeper connect string, `host:port[,host:port]`
    pub endpoint: String,

    /// Where archives are sent to and fetched from
    pub target: StorageTarget,

    /// Directory where mirrors and archives are staged
    pub work_dir: PathBuf,

    /// ACL given to nodes created during restore
    pub acl: Acl,

    /// Name for the next backup; the current Unix time when unset
    pub snapshot_id: Option<SnapshotId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            target: StorageTarget::Tty,
            work_dir: PathBuf::from("."),
            acl: Acl::Open,
            snapshot_id: None,
        }
    }
}

impl Config {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ZooKeeper endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the storage target
    pub fn target(mut self, target: StorageTarget) -> Self {
        self.target = target;
        self
    }

    /// Set the staging directory
    pub fn work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Set the ACL for restored nodes
    pub fn acl(mut self, acl: Acl) -> Self {
        self.acl = acl;
        self
    }

    /// Set the name of the next backup
    pub fn snapshot_id(mut self, id: SnapshotId) -> Self {
        self.snapshot_id = Some(id);
        self
    }

    /// Restore options derived from this config
    pub fn mirror_options(&self) -> MirrorOptions {
        MirrorOptions::new().acl(self.acl)
    }
}
