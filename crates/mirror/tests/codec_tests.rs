use mirror::{MirrorError, PathCodec, ESCAPED_COLON, MANIFEST_FILE};
use proptest::prelude::*;
use std::path::Path;

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.:-]{1,16}"
        .prop_filter("relative segments are not node names", |s| s != "." && s != "..")
        .prop_filter("reserved for the snapshot manifest", |s| s != MANIFEST_FILE)
        .prop_filter("placeholder collides with escaped colons", |s| {
            !s.contains(ESCAPED_COLON)
        })
}

fn tree_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..8).prop_map(|segments| {
        if segments.is_empty() {
            "/".to_string()
        } else {
            segments.iter().map(|s| format!("/{s}")).collect()
        }
    })
}

proptest! {
    #[test]
    fn roundtrip(path in tree_path()) {
        let mirror = PathCodec::to_mirror_path(&path).unwrap();
        prop_assert_eq!(PathCodec::to_tree_path(&mirror).unwrap(), path);
    }

    #[test]
    fn mirror_paths_hold_no_colons(path in tree_path()) {
        let mirror = PathCodec::to_mirror_path(&path).unwrap();
        prop_assert!(!mirror.to_string_lossy().contains(':'));
        prop_assert!(mirror.is_relative());
    }

    #[test]
    fn depth_is_preserved(path in tree_path()) {
        let mirror = PathCodec::to_mirror_path(&path).unwrap();
        let depth = path.split('/').filter(|s| !s.is_empty()).count();
        prop_assert_eq!(mirror.components().count(), depth);
    }
}

#[test]
fn test_colon_segment_example() {
    let mirror = PathCodec::to_mirror_path("/a:b/c").unwrap();
    assert_eq!(mirror, Path::new(&format!("a{ESCAPED_COLON}b")).join("c"));
    assert_eq!(PathCodec::to_tree_path(&mirror).unwrap(), "/a:b/c");
}

#[test]
fn test_placeholder_in_name_is_refused() {
    let path = format!("/pre{ESCAPED_COLON}post");
    assert!(matches!(
        PathCodec::to_mirror_path(&path),
        Err(MirrorError::PathEncode { .. })
    ));
}

#[test]
fn test_non_utf8_entry_fails_to_decode() {
    #[cfg(unix)]
    {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = Path::new(OsStr::from_bytes(&[b'a', 0xff, b'b']));
        assert!(matches!(
            PathCodec::to_tree_path(name),
            Err(MirrorError::PathDecode { .. })
        ));
    }
}
