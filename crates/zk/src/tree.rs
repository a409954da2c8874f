use log::{debug, info, warn};
use mirror::{Acl, MirrorError, ServiceError, TreeService};
use std::time::Duration;
use zookeeper::{Acl as ZkAcl, CreateMode, WatchedEvent, Watcher, ZkError, ZooKeeper};

/// How long to wait for the ensemble when connecting
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Logs session events; the mirror never sets watches
struct SessionLogger;

impl Watcher for SessionLogger {
    fn handle(&self, event: WatchedEvent) {
        debug!("ZooKeeper session event: {:?}", event);
    }
}

/// A tree service over a ZooKeeper connection
pub struct ZkTree {
    /// The underlying client session
    inner: ZooKeeper,
    /// Comma-separated `host:port` list the session was opened with
    endpoint: String,
}

impl ZkTree {
    /// Connect to the ensemble at `endpoint`
    pub fn connect(endpoint: &str) -> Result<Self, MirrorError> {
        let unreachable = |reason: String| MirrorError::ServiceUnreachable {
            endpoint: endpoint.to_string(),
            reason,
        };

        if endpoint.trim().is_empty() {
            return Err(unreachable("no endpoint configured".to_string()));
        }

        let inner = ZooKeeper::connect(endpoint, CONNECT_TIMEOUT, SessionLogger)
            .map_err(|e| unreachable(format!("{:?}", e)))?;
        info!("Connected to ZooKeeper at {}", endpoint);

        Ok(Self {
            inner,
            endpoint: endpoint.to_string(),
        })
    }

    /// The endpoint this session was opened with
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Close the session
    pub fn close(self) {
        if let Err(e) = self.inner.close() {
            warn!("Failed to close ZooKeeper session to {}: {:?}", self.endpoint, e);
        }
    }
}

impl TreeService for ZkTree {
    fn list_children(&self, path: &str) -> Result<Vec<String>, ServiceError> {
        self.inner
            .get_children(path, false)
            .map_err(|e| map_error(e, path))
    }

    fn get_value(&self, path: &str) -> Result<Vec<u8>, ServiceError> {
        self.inner
            .get_data(path, false)
            .map(|(data, _stat)| data)
            .map_err(|e| map_error(e, path))
    }

    fn exists(&self, path: &str) -> Result<bool, ServiceError> {
        self.inner
            .exists(path, false)
            .map(|stat| stat.is_some())
            .map_err(|e| map_error(e, path))
    }

    fn create(&self, path: &str, payload: &[u8], acl: Acl) -> Result<String, ServiceError> {
        self.inner
            .create(path, payload.to_vec(), acl_list(acl), CreateMode::Persistent)
            .map_err(|e| map_error(e, path))
    }
}

/// Translate a ZooKeeper error for the node at `path`
fn map_error(error: ZkError, path: &str) -> ServiceError {
    match error {
        ZkError::NoNode => ServiceError::NoNode(path.to_string()),
        ZkError::NodeExists => ServiceError::NodeExists(path.to_string()),
        other => ServiceError::Unavailable(format!("{:?} at {}", other, path)),
    }
}

/// The ZooKeeper ACL list for a mirror ACL
fn acl_list(acl: Acl) -> Vec<ZkAcl> {
    match acl {
        Acl::Open => ZkAcl::open_unsafe().clone(),
        Acl::ReadOnly => ZkAcl::read_unsafe().clone(),
        Acl::CreatorAll => ZkAcl::creator_all().clone(),
    }
}
