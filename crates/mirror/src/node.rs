//! Leaf/branch classification shared by both traversal directions

use derive_more::Display;

/// The kind of a tree node, as seen by the mirror
///
/// Only leaf payloads are persisted; a branch is recreated with an empty
/// payload on restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    /// A node with one or more children (a directory without content file)
    #[display(fmt = "branch")]
    Branch,
    /// A node with no children (a directory holding a content file)
    #[display(fmt = "leaf")]
    Leaf,
}

impl NodeKind {
    /// Classify a node from its live child count
    pub const fn from_child_count(count: usize) -> Self {
        if count == 0 {
            NodeKind::Leaf
        } else {
            NodeKind::Branch
        }
    }

    /// Classify a mirror directory by the presence of its content file
    pub const fn from_content_file(present: bool) -> Self {
        if present {
            NodeKind::Leaf
        } else {
            NodeKind::Branch
        }
    }

    /// Returns true if this is a branch node
    pub const fn is_branch(self) -> bool {
        matches!(self, NodeKind::Branch)
    }

    /// Returns true if this is a leaf node
    pub const fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Leaf)
    }
}
