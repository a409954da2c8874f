//! Mapping between tree node paths and mirror-relative filesystem paths

use std::path::{Component, Path, PathBuf};

use crate::error::{MirrorError, Result};
use crate::leaf::MANIFEST_FILE;

/// The tree root, represented on disk by the snapshot root directory itself
pub const ROOT: &str = "/";

/// Placeholder written to the filesystem in place of every `:` in a node name
pub const ESCAPED_COLON: &str = "_ESC_COLON_";

/// Converts between absolute tree paths and paths relative to a snapshot root
///
/// Colons are legal in node names but not on every filesystem, so each one is
/// replaced by [`ESCAPED_COLON`] on the way out and restored on the way back.
/// Names that already contain the placeholder, and a top-level node named like
/// the snapshot manifest, are refused when encoding, which keeps every mirror
/// that does get written exactly decodable.
pub struct PathCodec;

impl PathCodec {
    /// Map an absolute tree path to a path relative to the snapshot root
    ///
    /// `/` maps to the empty path.
    pub fn to_mirror_path(tree_path: &str) -> Result<PathBuf> {
        let relative = tree_path
            .strip_prefix(ROOT)
            .ok_or_else(|| encode_error(tree_path, "not an absolute path"))?;

        let mut mirror_path = PathBuf::new();
        if relative.is_empty() {
            return Ok(mirror_path);
        }

        for (depth, segment) in relative.split('/').enumerate() {
            match segment {
                "" => return Err(encode_error(tree_path, "empty path segment")),
                MANIFEST_FILE if depth == 0 => {
                    return Err(encode_error(
                        tree_path,
                        "top-level name is reserved for the snapshot manifest",
                    ))
                }
                "." | ".." => return Err(encode_error(tree_path, "relative path segment")),
                _ if segment.contains(ESCAPED_COLON) => {
                    return Err(encode_error(
                        tree_path,
                        "segment contains the colon escape placeholder",
                    ))
                }
                _ => mirror_path.push(segment.replace(':', ESCAPED_COLON)),
            }
        }

        Ok(mirror_path)
    }

    /// Map a path relative to the snapshot root back to an absolute tree path
    pub fn to_tree_path(relative: &Path) -> Result<String> {
        let mut tree_path = String::new();

        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name
                        .to_str()
                        .ok_or_else(|| decode_error(relative, "entry name is not valid UTF-8"))?;
                    tree_path.push('/');
                    tree_path.push_str(&name.replace(ESCAPED_COLON, ":"));
                }
                Component::CurDir => continue,
                _ => return Err(decode_error(relative, "path escapes the snapshot root")),
            }
        }

        if tree_path.is_empty() {
            tree_path.push_str(ROOT);
        }
        Ok(tree_path)
    }

    /// Join a child name onto a parent tree path
    pub fn child_path(parent: &str, child: &str) -> String {
        if parent == ROOT {
            format!("{ROOT}{child}")
        } else {
            format!("{parent}/{child}")
        }
    }

    /// The parent of a tree path, or `None` for the root
    pub fn parent_path(tree_path: &str) -> Option<&str> {
        if tree_path == ROOT {
            return None;
        }
        match tree_path.rfind('/')? {
            0 => Some(ROOT),
            idx => Some(&tree_path[..idx]),
        }
    }
}

fn encode_error(path: &str, reason: &str) -> MirrorError {
    MirrorError::PathEncode {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn decode_error(path: &Path, reason: &str) -> MirrorError {
    MirrorError::PathDecode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_maps_to_empty_path() {
        assert_eq!(PathCodec::to_mirror_path("/").unwrap(), PathBuf::new());
        assert_eq!(PathCodec::to_tree_path(Path::new("")).unwrap(), "/");
    }

    #[test]
    fn test_nested_path() {
        let mirror = PathCodec::to_mirror_path("/y/z/w").unwrap();
        assert_eq!(mirror, Path::new("y").join("z").join("w"));
        assert_eq!(PathCodec::to_tree_path(&mirror).unwrap(), "/y/z/w");
    }

    #[test]
    fn test_colon_is_escaped() {
        let mirror = PathCodec::to_mirror_path("/a:b/c").unwrap();
        assert_eq!(mirror, Path::new("a_ESC_COLON_b").join("c"));
        assert_eq!(PathCodec::to_tree_path(&mirror).unwrap(), "/a:b/c");
    }

    #[test]
    fn test_rejects_placeholder_collision() {
        let err = PathCodec::to_mirror_path("/a_ESC_COLON_b").unwrap_err();
        assert!(matches!(err, MirrorError::PathEncode { .. }));
    }

    #[test]
    fn test_rejects_top_level_manifest_name() {
        let err = PathCodec::to_mirror_path("/.manifest.json").unwrap_err();
        assert!(matches!(err, MirrorError::PathEncode { .. }));
        assert!(PathCodec::to_mirror_path("/.manifest.json/child").is_err());

        let nested = PathCodec::to_mirror_path("/a/.manifest.json").unwrap();
        assert_eq!(nested, Path::new("a").join(".manifest.json"));
    }

    #[test]
    fn test_rejects_malformed_tree_paths() {
        assert!(PathCodec::to_mirror_path("relative/path").is_err());
        assert!(PathCodec::to_mirror_path("/a//b").is_err());
        assert!(PathCodec::to_mirror_path("/a/").is_err());
        assert!(PathCodec::to_mirror_path("/a/../b").is_err());
    }

    #[test]
    fn test_rejects_escaping_mirror_paths() {
        let err = PathCodec::to_tree_path(Path::new("../outside")).unwrap_err();
        assert!(matches!(err, MirrorError::PathDecode { .. }));
        assert!(PathCodec::to_tree_path(Path::new("/abs")).is_err());
    }

    #[test]
    fn test_child_path() {
        assert_eq!(PathCodec::child_path("/", "a"), "/a");
        assert_eq!(PathCodec::child_path("/a", "b"), "/a/b");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(PathCodec::parent_path("/"), None);
        assert_eq!(PathCodec::parent_path("/a"), Some("/"));
        assert_eq!(PathCodec::parent_path("/a/b/c"), Some("/a/b"));
    }
}
