//! Backup-direction traversal of a live tree

use log::{debug, error, warn};
use std::path::Path;

use crate::codec::{PathCodec, ROOT};
use crate::error::{MirrorError, Result};
use crate::leaf::LeafStore;
use crate::node::NodeKind;
use crate::service::TreeService;

/// Counts gathered while walking a tree
///
/// A walk never fails as a whole, so this is the only place partial losses
/// show up besides the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Nodes whose children were requested
    pub visited: usize,
    /// Leaves whose payload was fetched and handed to the reap function
    pub leaves: usize,
    /// Subtrees abandoned because listing children or fetching a value failed
    pub skipped_subtrees: usize,
    /// Leaves the reap function rejected
    pub failed_reaps: usize,
}

impl WalkReport {
    /// True when every discovered leaf was reaped
    pub fn is_complete(&self) -> bool {
        self.skipped_subtrees == 0 && self.failed_reaps == 0
    }

    /// Leaves that were reaped successfully
    pub fn reaped(&self) -> usize {
        self.leaves - self.failed_reaps
    }
}

/// Depth-first walker over a tree service
///
/// Each visit queries live state; nothing is cached between visits. The walk
/// uses an explicit stack, so tree depth is bounded only by memory.
pub struct TreeWalker<S> {
    service: S,
}

impl<S: TreeService> TreeWalker<S> {
    /// Create a walker over the given service connection
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// The underlying service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Walk the subtree at `path`, calling `reap` once per leaf
    ///
    /// Leaves are reaped in depth-first pre-order, children in the order the
    /// service lists them. A failure to list children or fetch a value is
    /// logged and abandons only that subtree; siblings are still visited.
    pub fn walk<F>(&self, path: &str, mut reap: F) -> WalkReport
    where
        F: FnMut(&str, &[u8]) -> Result<()>,
    {
        let mut report = WalkReport::default();
        let mut stack = vec![path.to_string()];

        while let Some(current) = stack.pop() {
            debug!("On node {}", current);
            report.visited += 1;

            let children = match self.service.list_children(&current) {
                Ok(children) => children,
                Err(source) => {
                    error!("{}", MirrorError::ChildList { path: current, source });
                    report.skipped_subtrees += 1;
                    continue;
                }
            };
            debug!("{} has {} children", current, children.len());

            match NodeKind::from_child_count(children.len()) {
                NodeKind::Branch => {
                    // Reversed so the first listed child is popped first
                    for child in children.iter().rev() {
                        let child_path = PathCodec::child_path(&current, child);
                        debug!("Next visiting child {}", child_path);
                        stack.push(child_path);
                    }
                }
                NodeKind::Leaf => match self.service.get_value(&current) {
                    Ok(payload) => {
                        report.leaves += 1;
                        if let Err(e) = reap(&current, &payload) {
                            error!("Failed to reap {}: {}", current, e);
                            report.failed_reaps += 1;
                        }
                    }
                    Err(source) => {
                        error!("{}", MirrorError::ValueFetch { path: current, source });
                        report.skipped_subtrees += 1;
                    }
                },
            }
        }

        report
    }

    /// Mirror the whole tree into `mirror_root`, one directory per node
    ///
    /// Each leaf's payload lands in the content file of its directory. A tree
    /// whose root has no children produces an empty mirror, and the root is
    /// not counted among the reported leaves.
    pub fn mirror_into(&self, mirror_root: &Path) -> WalkReport {
        let mut root_is_leaf = false;
        let mut report = self.walk(ROOT, |path, payload| {
            if path == ROOT {
                debug!("Root has no children, nothing to mirror");
                root_is_leaf = true;
                return Ok(());
            }
            let dir = mirror_root.join(PathCodec::to_mirror_path(path)?);
            LeafStore::write_content(&dir, payload)?;
            Ok(())
        });
        if root_is_leaf {
            report.leaves -= 1;
        }

        if !report.is_complete() {
            warn!(
                "Mirror of {} is partial: {} subtrees skipped, {} leaves not written",
                mirror_root.display(),
                report.skipped_subtrees,
                report.failed_reaps
            );
        }
        report
    }
}
