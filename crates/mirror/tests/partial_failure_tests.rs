use mirror::{
    Acl, LeafStore, MemoryTree, MirrorError, MirrorWalker, ServiceError, TreeService, TreeWalker,
};
use std::cell::RefCell;
use tempfile::TempDir;

/// Wraps a memory tree and fails selected calls
#[derive(Default)]
struct FaultyTree {
    inner: MemoryTree,
    fail_children: Vec<&'static str>,
    fail_value: Vec<&'static str>,
    fail_exists: Vec<&'static str>,
    fail_create: Vec<&'static str>,
    exists_calls: RefCell<Vec<String>>,
}

fn hits(list: &[&str], path: &str) -> bool {
    list.iter().any(|candidate| *candidate == path)
}

fn unavailable(path: &str) -> ServiceError {
    ServiceError::Unavailable(format!("injected failure at {path}"))
}

impl TreeService for FaultyTree {
    fn list_children(&self, path: &str) -> Result<Vec<String>, ServiceError> {
        if hits(&self.fail_children, path) {
            return Err(unavailable(path));
        }
        self.inner.list_children(path)
    }

    fn get_value(&self, path: &str) -> Result<Vec<u8>, ServiceError> {
        if hits(&self.fail_value, path) {
            return Err(unavailable(path));
        }
        self.inner.get_value(path)
    }

    fn exists(&self, path: &str) -> Result<bool, ServiceError> {
        self.exists_calls.borrow_mut().push(path.to_string());
        if hits(&self.fail_exists, path) {
            return Err(unavailable(path));
        }
        self.inner.exists(path)
    }

    fn create(&self, path: &str, payload: &[u8], acl: Acl) -> Result<String, ServiceError> {
        if hits(&self.fail_create, path) {
            return Err(unavailable(path));
        }
        self.inner.create(path, payload, acl)
    }
}

fn populated() -> MemoryTree {
    let tree = MemoryTree::new();
    tree.insert("/a/one", b"1");
    tree.insert("/b/two", b"2");
    tree.insert("/b/three", b"3");
    tree.insert("/c", b"4");
    tree
}

#[test]
fn test_child_list_failure_skips_only_that_subtree() {
    let faulty = FaultyTree {
        inner: populated(),
        fail_children: vec!["/b"],
        ..Default::default()
    };

    let mut reaped = Vec::new();
    let report = TreeWalker::new(&faulty).walk("/", |path, _| {
        reaped.push(path.to_string());
        Ok(())
    });

    assert_eq!(reaped, vec!["/a/one", "/c"]);
    assert_eq!(report.skipped_subtrees, 1);
    assert!(!report.is_complete());
}

#[test]
fn test_value_failure_skips_only_that_leaf() {
    let faulty = FaultyTree {
        inner: populated(),
        fail_value: vec!["/b/three"],
        ..Default::default()
    };

    let temp = TempDir::new().unwrap();
    let report = TreeWalker::new(&faulty).mirror_into(temp.path());

    assert_eq!(report.leaves, 3);
    assert_eq!(report.skipped_subtrees, 1);
    assert!(LeafStore::has_content(&temp.path().join("a/one")));
    assert!(LeafStore::has_content(&temp.path().join("b/two")));
    assert!(!temp.path().join("b/three").exists());
    assert!(LeafStore::has_content(&temp.path().join("c")));
}

#[test]
fn test_root_listing_failure_yields_empty_mirror() {
    let faulty = FaultyTree {
        inner: populated(),
        fail_children: vec!["/"],
        ..Default::default()
    };

    let temp = TempDir::new().unwrap();
    let report = TreeWalker::new(&faulty).mirror_into(temp.path());
    assert_eq!(report.visited, 1);
    assert_eq!(report.leaves, 0);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_exists_failure_aborts_restore() {
    let temp = TempDir::new().unwrap();
    TreeWalker::new(populated()).mirror_into(temp.path());

    let faulty = FaultyTree {
        fail_exists: vec!["/b"],
        ..Default::default()
    };
    let err = MirrorWalker::new(&faulty).restore(temp.path()).unwrap_err();

    assert!(matches!(err, MirrorError::ExistenceCheck { ref path, .. } if path == "/b"));
    // Nothing after the failing entry was examined
    assert_eq!(*faulty.exists_calls.borrow(), vec!["/a", "/a/one", "/b"]);
    assert_eq!(faulty.inner.paths(), vec!["/", "/a", "/a/one"]);
}

#[test]
fn test_create_failure_aborts_restore() {
    let temp = TempDir::new().unwrap();
    TreeWalker::new(populated()).mirror_into(temp.path());

    let faulty = FaultyTree {
        fail_create: vec!["/a/one"],
        ..Default::default()
    };
    let err = MirrorWalker::new(&faulty).restore(temp.path()).unwrap_err();

    assert!(matches!(err, MirrorError::NodeCreate { ref path, .. } if path == "/a/one"));
    assert_eq!(faulty.inner.paths(), vec!["/", "/a"]);
}

// /proc/self/mem fails with EIO at offset zero regardless of privileges
#[cfg(target_os = "linux")]
#[test]
fn test_unreadable_content_aborts_restore() {
    let temp = TempDir::new().unwrap();
    TreeWalker::new(populated()).mirror_into(temp.path());

    let content = LeafStore::content_path(&temp.path().join("a/one"));
    std::fs::remove_file(&content).unwrap();
    std::os::unix::fs::symlink("/proc/self/mem", &content).unwrap();

    let tree = MemoryTree::new();
    let err = MirrorWalker::new(&tree).restore(temp.path()).unwrap_err();

    assert!(matches!(err, MirrorError::ContentRead { ref path, .. } if *path == content));
    assert_eq!(tree.paths(), vec!["/", "/a"]);
}

// Some unix filesystems refuse names that are not valid UTF-8
#[cfg(target_os = "linux")]
#[test]
fn test_undecodable_name_aborts_restore() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    LeafStore::write_content(&temp.path().join("a"), b"1").unwrap();
    LeafStore::write_content(&temp.path().join(OsStr::from_bytes(&[b'b', 0xff])), b"2").unwrap();
    LeafStore::write_content(&temp.path().join("c"), b"3").unwrap();

    let tree = MemoryTree::new();
    let err = MirrorWalker::new(&tree).restore(temp.path()).unwrap_err();

    assert!(matches!(err, MirrorError::PathDecode { .. }));
    assert_eq!(tree.value("/a"), Some(b"1".to_vec()));
    assert_eq!(tree.paths(), vec!["/", "/a"]);
}
