// Snapshot packaging for zkmirror
// This crate turns mirror directories into transportable archives and back

mod assembler;
mod id;
mod manifest;
mod target;

pub use assembler::{SnapshotAssembler, Unpacked};
pub use id::SnapshotId;
pub use manifest::Manifest;
pub use target::{StorageTarget, TargetKind};
