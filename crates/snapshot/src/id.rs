use anyhow::{bail, Result};
use derive_more::Display;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Names one backup: the mirror root directory and the archive stem
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// An identifier for a snapshot taken now (Unix seconds)
    pub fn now() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        SnapshotId(seconds.to_string())
    }

    /// Validate an identifier supplied by the user
    ///
    /// It becomes a directory and file name, so it must be a single
    /// non-hidden path component.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            bail!("Snapshot identifier is empty");
        }
        if id.starts_with('.') || id.contains(|c| c == '/' || c == '\\') {
            bail!("Snapshot identifier {:?} is not a plain file name", id);
        }
        Ok(SnapshotId(id))
    }

    /// The identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the archive for this snapshot
    pub fn archive_name(&self) -> String {
        format!("{}.tgz", self.0)
    }
}

impl FromStr for SnapshotId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        SnapshotId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_numeric() {
        let id = SnapshotId::now();
        assert!(id.as_str().parse::<u64>().unwrap() > 0);
    }

    #[test]
    fn test_validation() {
        assert!(SnapshotId::new("1700000000").is_ok());
        assert!(SnapshotId::new("nightly-01").is_ok());
        assert!(SnapshotId::new("").is_err());
        assert!(SnapshotId::new("..").is_err());
        assert!(SnapshotId::new(".manifest.json").is_err());
        assert!(SnapshotId::new("a/b").is_err());
    }

    #[test]
    fn test_archive_name() {
        let id: SnapshotId = "1700000000".parse().unwrap();
        assert_eq!(id.archive_name(), "1700000000.tgz");
        assert_eq!(id.to_string(), "1700000000");
    }
}
