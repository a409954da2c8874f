//! Bidirectional mirroring between a hierarchical key-value tree and a
//! local directory structure.
//!
//! # Core Concepts
//!
//! - **TreeService**: the four remote operations the mirror depends on
//! - **TreeWalker**: depth-first backup traversal, reaping every leaf
//! - **MirrorWalker**: pre-order restore traversal, creating absent nodes
//! - **PathCodec** / **LeafStore**: the on-disk layout of a mirror
//!
//! # Example
//!
//! ```
//! use mirror::{MemoryTree, MirrorWalker, TreeWalker};
//!
//! let source = MemoryTree::new();
//! source.insert("/app/config", b"debug=true");
//!
//! let dir = tempfile::tempdir().unwrap();
//! let report = TreeWalker::new(&source).mirror_into(dir.path());
//! assert_eq!(report.leaves, 1);
//!
//! let target = MemoryTree::new();
//! MirrorWalker::new(&target).restore(dir.path()).unwrap();
//! assert_eq!(target.value("/app/config").as_deref(), Some(&b"debug=true"[..]));
//! ```

mod codec;
mod error;
mod leaf;
mod node;
mod restore;
mod service;
mod walker;

pub use codec::{PathCodec, ESCAPED_COLON, ROOT};
pub use error::{MirrorError, Result, ServiceError};
pub use leaf::{LeafStore, CONTENT_FILE, MANIFEST_FILE};
pub use node::NodeKind;
pub use restore::{EntryOutcome, MirrorOptions, MirrorWalker, RestoreReport};
pub use service::{Acl, MemoryTree, TreeService};
pub use walker::{TreeWalker, WalkReport};
