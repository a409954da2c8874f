//! Error types for tree mirroring

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a tree service collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("node {0} does not exist")]
    NoNode(String),

    #[error("node {0} already exists")]
    NodeExists(String),

    #[error("tree service unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while mirroring a tree to disk or restoring it
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("tree service at {endpoint} is unreachable: {reason}")]
    ServiceUnreachable { endpoint: String, reason: String },

    // Backup direction, localized to one subtree
    #[error("failed to list children of {path}: {source}")]
    ChildList { path: String, source: ServiceError },

    #[error("failed to fetch value of {path}: {source}")]
    ValueFetch { path: String, source: ServiceError },

    // Restore direction, fatal for the whole walk
    #[error("failed to check existence of {path}: {source}")]
    ExistenceCheck { path: String, source: ServiceError },

    #[error("failed to create node {path}: {source}")]
    NodeCreate { path: String, source: ServiceError },

    // Leaf content files
    #[error("no content file in {0}")]
    ContentNotFound(PathBuf),

    #[error("failed to read content file {path}: {source}")]
    ContentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write content file {path}: {source}")]
    ContentWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk mirror directory: {0}")]
    MirrorWalk(#[from] walkdir::Error),

    // Path mapping
    #[error("cannot map tree path {path} into a mirror: {reason}")]
    PathEncode { path: String, reason: String },

    #[error("cannot map mirror entry {path} to a tree path: {reason}")]
    PathDecode { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, MirrorError>;
