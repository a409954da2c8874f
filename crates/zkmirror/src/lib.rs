//! Backup and restore of a ZooKeeper tree through a local mirror
//!
//! The binary parses arguments into a [`Config`] and calls [`backup`] or
//! [`restore`]. Both report a plain success flag; per-node detail goes to
//! the log.

mod config;
mod ops;

pub use config::Config;
pub use ops::{backup, backup_with, restore, restore_with, BackupOutcome};
