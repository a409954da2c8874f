//! The tree service collaborator and an in-memory implementation

use derive_more::Display;
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::codec::{PathCodec, ROOT};
use crate::error::ServiceError;

/// Permission set attached to nodes created during restore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Acl {
    /// Anyone may perform any operation
    #[default]
    #[display(fmt = "open")]
    Open,
    /// Anyone may read, nobody may write
    #[display(fmt = "read-only")]
    ReadOnly,
    /// Only the creating session's identity has access
    #[display(fmt = "creator-all")]
    CreatorAll,
}

/// The remote operations the mirror depends on
///
/// Connection setup, authentication and timeouts belong to whoever builds
/// the implementation. Every call is a blocking round trip and is never
/// retried by the walkers.
pub trait TreeService {
    /// Names of the direct children of `path`, in service order
    fn list_children(&self, path: &str) -> Result<Vec<String>, ServiceError>;

    /// The payload stored at `path`
    fn get_value(&self, path: &str) -> Result<Vec<u8>, ServiceError>;

    /// Whether a node exists at `path`
    fn exists(&self, path: &str) -> Result<bool, ServiceError>;

    /// Create a node at `path` whose parent already exists
    ///
    /// Returns the path of the created node.
    fn create(&self, path: &str, payload: &[u8], acl: Acl) -> Result<String, ServiceError>;
}

impl<T: TreeService + ?Sized> TreeService for &T {
    fn list_children(&self, path: &str) -> Result<Vec<String>, ServiceError> {
        (**self).list_children(path)
    }

    fn get_value(&self, path: &str) -> Result<Vec<u8>, ServiceError> {
        (**self).get_value(path)
    }

    fn exists(&self, path: &str) -> Result<bool, ServiceError> {
        (**self).exists(path)
    }

    fn create(&self, path: &str, payload: &[u8], acl: Acl) -> Result<String, ServiceError> {
        (**self).create(path, payload, acl)
    }
}

impl<T: TreeService + ?Sized> TreeService for Box<T> {
    fn list_children(&self, path: &str) -> Result<Vec<String>, ServiceError> {
        (**self).list_children(path)
    }

    fn get_value(&self, path: &str) -> Result<Vec<u8>, ServiceError> {
        (**self).get_value(path)
    }

    fn exists(&self, path: &str) -> Result<bool, ServiceError> {
        (**self).exists(path)
    }

    fn create(&self, path: &str, payload: &[u8], acl: Acl) -> Result<String, ServiceError> {
        (**self).create(path, payload, acl)
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    payload: Vec<u8>,
    acl: Acl,
}

/// A tree service held entirely in memory
///
/// Follows the same rules as a coordination service: the root always
/// exists, a node can only be created under an existing parent, and creating
/// an existing node fails. Children are listed in name order.
#[derive(Debug)]
pub struct MemoryTree {
    nodes: RefCell<BTreeMap<String, MemoryNode>>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            ROOT.to_string(),
            MemoryNode {
                payload: Vec::new(),
                acl: Acl::Open,
            },
        );
        Self {
            nodes: RefCell::new(nodes),
        }
    }
}

impl MemoryTree {
    /// Create a tree holding only the root node
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the payload at `path`, creating it and any missing ancestors
    ///
    /// Missing ancestors get an empty payload. An existing node keeps its
    /// children and has its payload replaced.
    pub fn insert(&self, path: &str, payload: &[u8]) {
        let mut nodes = self.nodes.borrow_mut();

        let mut ancestor = PathCodec::parent_path(path);
        while let Some(parent) = ancestor {
            nodes.entry(parent.to_string()).or_insert_with(|| MemoryNode {
                payload: Vec::new(),
                acl: Acl::Open,
            });
            ancestor = PathCodec::parent_path(parent);
        }

        nodes.insert(
            path.to_string(),
            MemoryNode {
                payload: payload.to_vec(),
                acl: Acl::Open,
            },
        );
    }

    /// The payload at `path`, if the node exists
    pub fn value(&self, path: &str) -> Option<Vec<u8>> {
        self.nodes.borrow().get(path).map(|n| n.payload.clone())
    }

    /// The ACL the node at `path` was created with
    pub fn acl(&self, path: &str) -> Option<Acl> {
        self.nodes.borrow().get(path).map(|n| n.acl)
    }

    /// All node paths, root included, in name order
    pub fn paths(&self) -> Vec<String> {
        self.nodes.borrow().keys().cloned().collect()
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// True when only the root exists
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }
}

impl TreeService for MemoryTree {
    fn list_children(&self, path: &str) -> Result<Vec<String>, ServiceError> {
        let nodes = self.nodes.borrow();
        if !nodes.contains_key(path) {
            return Err(ServiceError::NoNode(path.to_string()));
        }

        let children = nodes
            .keys()
            .filter(|candidate| PathCodec::parent_path(candidate) == Some(path))
            .filter_map(|candidate| candidate.rsplit('/').next())
            .map(str::to_string)
            .collect();
        Ok(children)
    }

    fn get_value(&self, path: &str) -> Result<Vec<u8>, ServiceError> {
        self.value(path)
            .ok_or_else(|| ServiceError::NoNode(path.to_string()))
    }

    fn exists(&self, path: &str) -> Result<bool, ServiceError> {
        Ok(self.nodes.borrow().contains_key(path))
    }

    fn create(&self, path: &str, payload: &[u8], acl: Acl) -> Result<String, ServiceError> {
        let mut nodes = self.nodes.borrow_mut();
        if nodes.contains_key(path) {
            return Err(ServiceError::NodeExists(path.to_string()));
        }

        let parent = PathCodec::parent_path(path)
            .ok_or_else(|| ServiceError::NodeExists(path.to_string()))?;
        if !nodes.contains_key(parent) {
            return Err(ServiceError::NoNode(parent.to_string()));
        }

        nodes.insert(
            path.to_string(),
            MemoryNode {
                payload: payload.to_vec(),
                acl,
            },
        );
        Ok(path.to_string())
    }
}
