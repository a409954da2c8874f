// ZooKeeper integration for zkmirror
// This crate provides the tree service backed by a live ensemble

mod tree;

pub use tree::{ZkTree, CONNECT_TIMEOUT};
