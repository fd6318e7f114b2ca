use std::path::{Component, Path};

/// A path is hidden when any of its `/`-separated segments is a dotfile name.
/// `.` and `..` are navigation, not hidden names.
pub fn is_hidden_path(relative_path: &str) -> bool {
    relative_path
        .split('/')
        .any(|segment| segment.starts_with('.') && segment != "." && segment != "..")
}

/// Turn a path below `root` into the forward-slash form used as the selection key.
///
/// Returns `None` when `path` is not below `root`, is `root` itself,
/// or has a component that is not valid UTF-8.
pub fn to_relative_key(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn hidden_segments() {
        assert!(is_hidden_path(".env"));
        assert!(is_hidden_path(".hidden/b.txt"));
        assert!(is_hidden_path("src/.cache/x"));
        assert!(!is_hidden_path("a.txt"));
        assert!(!is_hidden_path("src/c.go"));
        assert!(!is_hidden_path("./src/c.go"));
        assert!(!is_hidden_path("../src/c.go"));
        assert!(!is_hidden_path("dir.with.dots/file.rs"));
    }

    #[test]
    fn relative_key_uses_forward_slashes() {
        let root = PathBuf::from("/tmp/root");
        let path = root.join("src").join("nested").join("lib.rs");
        assert_eq!(
            to_relative_key(&path, &root).as_deref(),
            Some("src/nested/lib.rs")
        );
    }

    #[test]
    fn relative_key_rejects_root_and_outsiders() {
        let root = PathBuf::from("/tmp/root");
        assert_eq!(to_relative_key(&root, &root), None);
        assert_eq!(to_relative_key(Path::new("/elsewhere/a"), &root), None);
    }
}
