//! Restore-direction traversal of a mirror directory

use derive_more::Display;
use log::{debug, error, info, trace};
use path_clean::PathClean;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::codec::PathCodec;
use crate::error::{MirrorError, Result};
use crate::leaf::{LeafStore, MANIFEST_FILE};
use crate::node::NodeKind;
use crate::service::{Acl, TreeService};

/// Options controlling how nodes are recreated
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    /// ACL given to every node created during restore
    pub acl: Acl,
}

impl MirrorOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ACL for created nodes
    pub fn acl(mut self, acl: Acl) -> Self {
        self.acl = acl;
        self
    }
}

/// What happened to a single mirror entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryOutcome {
    /// The snapshot root or its manifest, never a tree node
    #[display(fmt = "reserved")]
    Reserved,
    /// A plain file, consumed by its directory's visit
    #[display(fmt = "not a directory")]
    NotADirectory,
    /// The node was already present and was left untouched
    #[display(fmt = "exists")]
    Exists,
    /// The node was absent and has been created
    #[display(fmt = "created {}", _0)]
    Created(NodeKind),
}

/// Counts gathered while restoring a mirror
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Directories that mapped to a tree path
    pub visited: usize,
    /// Nodes left alone because they already existed
    pub existing: usize,
    /// Leaves created with their mirrored payload
    pub created_leaves: usize,
    /// Branches created with an empty payload
    pub created_branches: usize,
}

impl RestoreReport {
    /// Total nodes created
    pub fn created(&self) -> usize {
        self.created_leaves + self.created_branches
    }

    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Reserved | EntryOutcome::NotADirectory => return,
            EntryOutcome::Exists => self.existing += 1,
            EntryOutcome::Created(NodeKind::Leaf) => self.created_leaves += 1,
            EntryOutcome::Created(NodeKind::Branch) => self.created_branches += 1,
        }
        self.visited += 1;
    }
}

/// Recreates tree nodes from a mirror directory
///
/// Restore only ever adds: a node that already exists is skipped, whatever
/// the mirror holds for it. Any service or read failure stops the walk,
/// since continuing could create children under parents that were never
/// created.
pub struct MirrorWalker<S> {
    service: S,
    options: MirrorOptions,
}

impl<S: TreeService> MirrorWalker<S> {
    /// Create a walker writing to the given service connection
    pub fn new(service: S) -> Self {
        Self::with_options(service, MirrorOptions::default())
    }

    /// Create a walker with explicit options
    pub fn with_options(service: S, options: MirrorOptions) -> Self {
        Self { service, options }
    }

    /// The underlying service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Restore every node mirrored under `snapshot_root`
    ///
    /// Entries are visited parent first, siblings in file name order.
    pub fn restore(&self, snapshot_root: &Path) -> Result<RestoreReport> {
        let root = snapshot_root.clean();
        let mut report = RestoreReport::default();

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            let outcome = self.visit(&root, &entry).map_err(|e| {
                error!("{}", e);
                e
            })?;
            trace!("{}: {}", entry.path().display(), outcome);
            report.record(outcome);
        }

        info!(
            "Restore from {} visited {} nodes: {} leaves and {} branches created, {} already present",
            root.display(),
            report.visited,
            report.created_leaves,
            report.created_branches,
            report.existing
        );
        Ok(report)
    }

    fn visit(&self, root: &Path, entry: &DirEntry) -> Result<EntryOutcome> {
        if is_reserved(entry) {
            return Ok(EntryOutcome::Reserved);
        }
        if !entry.file_type().is_dir() {
            return Ok(EntryOutcome::NotADirectory);
        }

        let relative =
            pathdiff::diff_paths(entry.path(), root).ok_or_else(|| MirrorError::PathDecode {
                path: entry.path().to_path_buf(),
                reason: "not below the snapshot root".to_string(),
            })?;
        let node = PathCodec::to_tree_path(&relative)?;

        let present = self
            .service
            .exists(&node)
            .map_err(|source| MirrorError::ExistenceCheck {
                path: node.clone(),
                source,
            })?;
        if present {
            info!("Node {} exists already", node);
            return Ok(EntryOutcome::Exists);
        }

        let kind = NodeKind::from_content_file(LeafStore::has_content(entry.path()));
        debug!("Attempting to insert {} as {} node", node, kind);
        let payload = match kind {
            NodeKind::Leaf => LeafStore::read_content(entry.path())?,
            NodeKind::Branch => Vec::new(),
        };

        self.service
            .create(&node, &payload, self.options.acl)
            .map_err(|source| MirrorError::NodeCreate {
                path: node.clone(),
                source,
            })?;
        info!("Created {} node {}", kind, node);

        Ok(EntryOutcome::Created(kind))
    }
}

/// The snapshot root itself and the manifest beside it are not tree nodes
fn is_reserved(entry: &DirEntry) -> bool {
    match entry.depth() {
        0 => true,
        1 => entry.file_name() == MANIFEST_FILE,
        _ => false,
    }
}
